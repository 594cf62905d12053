//! The operand model
//!
//! Operands are small `Copy` handles: instructions hold them by value,
//! and the same operand value may appear in any number of instructions.
//! An operand's width is fixed at creation and never changes.
//!
//! Storage locations are deliberately not part of the operand. Frame
//! layout assigns every procedure-resident operand an offset exactly
//! once, after lowering and before emission (see
//! [`crate::proc::Procedure::layout`]); globals and string constants get
//! data-section labels from the [`crate::program::Program`]. A literal
//! never has a location at all.

use dlc_common::{StrId, SymbolId, TempId, Width};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opd {
    /// Named variable, backed 1:1 by a resolver symbol
    Sym { sym: SymbolId, width: Width },
    /// Literal value; supports loading only
    Lit { val: i64, width: Width },
    /// Compiler-synthesized temporary, no symbol behind it
    Tmp { id: TempId, width: Width },
    /// Address-of location: the slot holds a pointer, and value
    /// operations go through one level of indirection
    Addr { id: TempId, width: Width },
    /// Pooled string constant; its value is the address of the text
    Str { id: StrId },
}

impl Opd {
    pub fn int_lit(val: i64) -> Opd {
        Opd::Lit {
            val,
            width: Width::Quad,
        }
    }

    pub fn bool_lit(val: bool) -> Opd {
        Opd::Lit {
            val: val as i64,
            width: Width::Byte,
        }
    }

    pub fn width(&self) -> Width {
        match self {
            Opd::Sym { width, .. }
            | Opd::Lit { width, .. }
            | Opd::Tmp { width, .. }
            | Opd::Addr { width, .. } => *width,
            Opd::Str { .. } => Width::Quad,
        }
    }

    /// Literals and pooled strings have no frame slot
    pub fn is_constant(&self) -> bool {
        matches!(self, Opd::Lit { .. } | Opd::Str { .. })
    }
}
