//! Per-operand load/store protocol
//!
//! Every instruction template moves values exclusively through these
//! four operations, so the rules live in one place: which operand kinds
//! can be read, which can be written, and which expose an address.
//!
//! - `Lit` supports loading only.
//! - `Sym` and `Tmp` support value load/store; being stack- or
//!   data-resident, they also expose their own address.
//! - `Addr` slots hold a pointer; value operations dereference through
//!   `r11`, and the address itself can be loaded or stored directly.
//! - `Str` loads as the address of the pooled text.
//!
//! Byte-wide loads zero the full scratch register first so the high
//! bits never carry stale data into a 64-bit compare.

use crate::error::CodegenError;
use crate::regs::Reg;
use dlc_common::Width;
use dlc_frontend::SymbolTable;
use dlc_ir::{FrameLayout, Opd, Program};
use std::fmt::Write;

pub struct OperandCtx<'a> {
    layout: &'a FrameLayout,
    program: &'a Program,
    symbols: &'a SymbolTable,
}

impl<'a> OperandCtx<'a> {
    pub fn new(layout: &'a FrameLayout, program: &'a Program, symbols: &'a SymbolTable) -> Self {
        OperandCtx {
            layout,
            program,
            symbols,
        }
    }

    fn describe(&self, opd: &Opd) -> String {
        opd.display(self.symbols).to_string()
    }

    /// The memory operand naming this operand's storage: a frame slot
    /// for procedure-resident operands, a data label for globals
    fn location(&self, opd: &Opd) -> Result<String, CodegenError> {
        if let Some(offset) = self.layout.offset(opd) {
            return Ok(format!("{}(%rbp)", offset));
        }
        if let Opd::Sym { sym, .. } = opd {
            if self.program.global_opd(*sym).is_some() {
                let name = self
                    .symbols
                    .name(*sym)
                    .ok_or(CodegenError::UnknownSymbol(*sym))?;
                return Ok(format!("(gbl_{})", name));
            }
        }
        Err(CodegenError::UnplacedOperand(self.describe(opd)))
    }

    fn mov(width: Width) -> &'static str {
        match width {
            Width::Byte => "movb",
            Width::Quad => "movq",
        }
    }

    pub fn load_val(&self, out: &mut String, opd: &Opd, reg: Reg) -> Result<(), CodegenError> {
        match opd {
            Opd::Lit { val, .. } => {
                writeln!(out, "\tmovq ${}, {}", val, reg.name64())?;
            }
            Opd::Str { id } => {
                writeln!(out, "\tmovq ${}, {}", Program::string_label(*id), reg.name64())?;
            }
            Opd::Sym { width, .. } | Opd::Tmp { width, .. } => {
                let loc = self.location(opd)?;
                if *width == Width::Byte {
                    writeln!(out, "\tmovq $0, {}", reg.name64())?;
                }
                writeln!(out, "\t{} {}, {}", Self::mov(*width), loc, reg.name(*width))?;
            }
            Opd::Addr { width, .. } => {
                let loc = self.location(opd)?;
                writeln!(out, "\tmovq {}, {}", loc, Reg::R11.name64())?;
                if *width == Width::Byte {
                    writeln!(out, "\tmovq $0, {}", reg.name64())?;
                }
                writeln!(out, "\t{} (%r11), {}", Self::mov(*width), reg.name(*width))?;
            }
        }
        Ok(())
    }

    pub fn store_val(&self, out: &mut String, opd: &Opd, reg: Reg) -> Result<(), CodegenError> {
        match opd {
            Opd::Sym { width, .. } | Opd::Tmp { width, .. } => {
                let loc = self.location(opd)?;
                writeln!(out, "\t{} {}, {}", Self::mov(*width), reg.name(*width), loc)?;
                Ok(())
            }
            Opd::Addr { width, .. } => {
                let loc = self.location(opd)?;
                writeln!(out, "\tmovq {}, {}", loc, Reg::R11.name64())?;
                writeln!(out, "\t{} {}, (%r11)", Self::mov(*width), reg.name(*width))?;
                Ok(())
            }
            Opd::Lit { .. } | Opd::Str { .. } => Err(CodegenError::InvalidOperandOperation {
                op: "store value",
                operand: self.describe(opd),
            }),
        }
    }

    pub fn load_addr(&self, out: &mut String, opd: &Opd, reg: Reg) -> Result<(), CodegenError> {
        match opd {
            Opd::Sym { .. } | Opd::Tmp { .. } => {
                let loc = self.location(opd)?;
                writeln!(out, "\tleaq {}, {}", loc, reg.name64())?;
                Ok(())
            }
            Opd::Addr { .. } => {
                let loc = self.location(opd)?;
                writeln!(out, "\tmovq {}, {}", loc, reg.name64())?;
                Ok(())
            }
            Opd::Lit { .. } | Opd::Str { .. } => Err(CodegenError::InvalidOperandOperation {
                op: "load address",
                operand: self.describe(opd),
            }),
        }
    }

    pub fn store_addr(&self, out: &mut String, opd: &Opd, reg: Reg) -> Result<(), CodegenError> {
        match opd {
            Opd::Addr { .. } => {
                let loc = self.location(opd)?;
                writeln!(out, "\tmovq {}, {}", reg.name64(), loc)?;
                Ok(())
            }
            _ => Err(CodegenError::InvalidOperandOperation {
                op: "store address",
                operand: self.describe(opd),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlc_common::Type;
    use dlc_frontend::symbols::SymbolKind;
    use dlc_ir::Procedure;
    use pretty_assertions::assert_eq;

    fn ctx_fixture() -> (Procedure, Program, SymbolTable) {
        let mut symbols = SymbolTable::new();
        let x = symbols.add("x", Type::Int, SymbolKind::Var);
        let g = symbols.add("g", Type::Int, SymbolKind::Var);
        let mut proc = Procedure::new("f");
        proc.gather_local(x, Width::Quad);
        let mut program = Program::new();
        program.gather_global(g, Width::Quad);
        (proc, program, symbols)
    }

    #[test]
    fn test_local_loads_from_frame_slot() {
        let (mut proc, program, symbols) = ctx_fixture();
        let opd = proc.sym_opd(0).unwrap();
        let layout = proc.layout();
        let ctx = OperandCtx::new(&layout, &program, &symbols);
        let mut out = String::new();
        ctx.load_val(&mut out, &opd, Reg::A).unwrap();
        assert_eq!(out, "\tmovq -24(%rbp), %rax\n");
    }

    #[test]
    fn test_global_loads_from_data_label() {
        let (proc, program, symbols) = ctx_fixture();
        let opd = program.global_opd(1).unwrap();
        let layout = proc.layout();
        let ctx = OperandCtx::new(&layout, &program, &symbols);
        let mut out = String::new();
        ctx.load_val(&mut out, &opd, Reg::A).unwrap();
        assert_eq!(out, "\tmovq (gbl_g), %rax\n");
    }

    #[test]
    fn test_byte_load_zeroes_the_scratch_register() {
        let (mut proc, program, symbols) = ctx_fixture();
        let tmp = proc.make_tmp(Width::Byte);
        let layout = proc.layout();
        let ctx = OperandCtx::new(&layout, &program, &symbols);
        let mut out = String::new();
        ctx.load_val(&mut out, &tmp, Reg::B).unwrap();
        assert_eq!(out, "\tmovq $0, %rbx\n\tmovb -32(%rbp), %bl\n");
    }

    #[test]
    fn test_address_slot_dereferences_through_r11() {
        let (mut proc, program, symbols) = ctx_fixture();
        let addr = proc.make_addr(Width::Quad);
        let layout = proc.layout();
        let ctx = OperandCtx::new(&layout, &program, &symbols);

        let mut out = String::new();
        ctx.load_val(&mut out, &addr, Reg::A).unwrap();
        assert_eq!(out, "\tmovq -32(%rbp), %r11\n\tmovq (%r11), %rax\n");

        out.clear();
        ctx.store_val(&mut out, &addr, Reg::A).unwrap();
        assert_eq!(out, "\tmovq -32(%rbp), %r11\n\tmovq %rax, (%r11)\n");

        out.clear();
        ctx.load_addr(&mut out, &addr, Reg::A).unwrap();
        assert_eq!(out, "\tmovq -32(%rbp), %rax\n");
    }

    #[test]
    fn test_literals_reject_stores() {
        let (proc, program, symbols) = ctx_fixture();
        let layout = proc.layout();
        let ctx = OperandCtx::new(&layout, &program, &symbols);
        let mut out = String::new();
        let err = ctx
            .store_val(&mut out, &Opd::int_lit(3), Reg::A)
            .unwrap_err();
        assert!(matches!(
            err,
            CodegenError::InvalidOperandOperation { op: "store value", .. }
        ));
        let err = ctx
            .load_addr(&mut out, &Opd::int_lit(3), Reg::A)
            .unwrap_err();
        assert!(matches!(
            err,
            CodegenError::InvalidOperandOperation { op: "load address", .. }
        ));
    }

    #[test]
    fn test_string_loads_pool_address() {
        let (proc, mut program, symbols) = ctx_fixture();
        let opd = program.intern_string("hi");
        let layout = proc.layout();
        let ctx = OperandCtx::new(&layout, &program, &symbols);
        let mut out = String::new();
        ctx.load_val(&mut out, &opd, Reg::Di).unwrap();
        assert_eq!(out, "\tmovq $str_0, %rdi\n");
    }
}
