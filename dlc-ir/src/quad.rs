//! The quad (3AC instruction) model
//!
//! A closed, tagged instruction set: every pass over the IR is an
//! exhaustive match, so a new instruction kind cannot be forgotten by
//! the printer or the emitter without a build error.
//!
//! Instructions are immutable after construction. Each carries zero or
//! more label anchors; a jump target resolves to the one instruction in
//! the same procedure anchoring that label (validated before emission).

use crate::opd::Opd;
use dlc_common::{LabelId, SymbolId, Width};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mult,
    Div,
    And,
    Or,
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
}

impl BinOp {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Neq | BinOp::Lt | BinOp::Gt | BinOp::Lte | BinOp::Gte
        )
    }

    /// Width-suffixed mnemonic for IR dumps, e.g. `ADD64`
    pub fn mnemonic(&self, width: Width) -> String {
        let base = match self {
            BinOp::Add => "ADD",
            BinOp::Sub => "SUB",
            BinOp::Mult => "MULT",
            BinOp::Div => "DIV",
            BinOp::And => "AND",
            BinOp::Or => "OR",
            BinOp::Eq => "EQ",
            BinOp::Neq => "NEQ",
            BinOp::Lt => "LT",
            BinOp::Gt => "GT",
            BinOp::Lte => "LTE",
            BinOp::Gte => "GTE",
        };
        format!("{}{}", base, width)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn mnemonic(&self, width: Width) -> String {
        let base = match self {
            UnaryOp::Neg => "NEG",
            UnaryOp::Not => "NOT",
        };
        format!("{}{}", base, width)
    }
}

/// Value class for the built-in read/write instructions; selects which
/// runtime routine the emitter calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoKind {
    Int,
    Bool,
    Str,
}

/// Callee of a `Call` quad
///
/// User procedures are called through their resolver symbol and get the
/// `fun_` label prefix at emission. Runtime targets (currently only the
/// hidden boolean oracle behind `maybe`/`eh?`) are part of the frozen
/// runtime ABI and are called by their bare names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallTarget {
    Sym(SymbolId),
    Runtime(&'static str),
}

/// The runtime boolean-source symbol backing `maybe` and `eh?`
pub const ORACLE: CallTarget = CallTarget::Runtime("randBool");

#[derive(Debug, Clone, PartialEq)]
pub enum Quad {
    BinOp {
        dst: Opd,
        op: BinOp,
        src1: Opd,
        src2: Opd,
    },
    Unary {
        dst: Opd,
        op: UnaryOp,
        src: Opd,
    },
    Assign {
        dst: Opd,
        src: Opd,
    },
    Goto(LabelId),
    /// Conditional jump taken when the condition is zero
    Ifz {
        cond: Opd,
        target: LabelId,
    },
    /// Label anchor / no-op
    Nop,
    Read {
        dst: Opd,
        kind: IoKind,
    },
    Write {
        src: Opd,
        kind: IoKind,
    },
    Call {
        callee: CallTarget,
        arity: usize,
    },
    /// Marshal one argument; indices are 1-based
    SetArg {
        index: usize,
        src: Opd,
    },
    /// Receive one formal at procedure entry; indices are 1-based
    GetArg {
        index: usize,
        dst: Opd,
    },
    SetRet {
        src: Opd,
    },
    GetRet {
        dst: Opd,
    },
    Enter,
    Leave,
}

impl Quad {
    /// The label this instruction jumps to, if it is a jump
    pub fn jump_target(&self) -> Option<LabelId> {
        match self {
            Quad::Goto(target) | Quad::Ifz { target, .. } => Some(*target),
            _ => None,
        }
    }
}

/// One instruction in a procedure body: a quad plus its label anchors
#[derive(Debug, Clone, PartialEq)]
pub struct Inst {
    pub labels: Vec<LabelId>,
    pub kind: Quad,
}

impl Inst {
    pub fn new(kind: Quad) -> Self {
        Inst {
            labels: Vec::new(),
            kind,
        }
    }

    pub fn labeled(label: LabelId, kind: Quad) -> Self {
        Inst {
            labels: vec![label],
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mnemonics() {
        assert_eq!(BinOp::Add.mnemonic(Width::Quad), "ADD64");
        assert_eq!(BinOp::Or.mnemonic(Width::Byte), "OR8");
        assert_eq!(UnaryOp::Not.mnemonic(Width::Byte), "NOT8");
    }

    #[test]
    fn test_jump_targets() {
        assert_eq!(Quad::Goto(3).jump_target(), Some(3));
        let ifz = Quad::Ifz {
            cond: Opd::bool_lit(false),
            target: 7,
        };
        assert_eq!(ifz.jump_target(), Some(7));
        assert_eq!(Quad::Nop.jump_target(), None);
    }
}
