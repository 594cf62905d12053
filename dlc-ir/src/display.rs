//! Human-readable 3AC dumps
//!
//! Symbol names live in the resolver's table, so the printers take it
//! as context instead of baking name strings into operands. Used by the
//! driver's `--dump-ir` flag and by tests.

use crate::opd::Opd;
use crate::proc::Procedure;
use crate::program::Program;
use crate::quad::{CallTarget, Inst, Quad};
use dlc_frontend::SymbolTable;
use std::fmt;

pub struct OpdDisplay<'a> {
    opd: Opd,
    symbols: &'a SymbolTable,
}

impl Opd {
    pub fn display<'a>(&self, symbols: &'a SymbolTable) -> OpdDisplay<'a> {
        OpdDisplay { opd: *self, symbols }
    }
}

impl fmt::Display for OpdDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opd {
            Opd::Sym { sym, .. } => {
                let name = self.symbols.name(sym).unwrap_or("<unknown>");
                write!(f, "[{}]", name)
            }
            Opd::Lit { val, .. } => write!(f, "{}", val),
            Opd::Tmp { id, .. } => write!(f, "[tmp_{}]", id),
            Opd::Addr { id, .. } => write!(f, "[[addr_{}]]", id),
            Opd::Str { id } => write!(f, "[{}]", Program::string_label(id)),
        }
    }
}

pub struct InstDisplay<'a> {
    inst: &'a Inst,
    proc: &'a Procedure,
    symbols: &'a SymbolTable,
}

impl Inst {
    pub fn display<'a>(
        &'a self,
        proc: &'a Procedure,
        symbols: &'a SymbolTable,
    ) -> InstDisplay<'a> {
        InstDisplay {
            inst: self,
            proc,
            symbols,
        }
    }
}

impl fmt::Display for InstDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &label in &self.inst.labels {
            let name = self.proc.label_name(label).unwrap_or("<bad-label>");
            write!(f, "{}: ", name)?;
        }
        let syms = self.symbols;
        match &self.inst.kind {
            Quad::BinOp { dst, op, src1, src2 } => write!(
                f,
                "{} := {} {} {}",
                dst.display(syms),
                src1.display(syms),
                op.mnemonic(src1.width()),
                src2.display(syms)
            ),
            Quad::Unary { dst, op, src } => write!(
                f,
                "{} := {} {}",
                dst.display(syms),
                op.mnemonic(src.width()),
                src.display(syms)
            ),
            Quad::Assign { dst, src } => {
                write!(f, "{} := {}", dst.display(syms), src.display(syms))
            }
            Quad::Goto(target) => {
                write!(f, "goto {}", self.proc.label_name(*target).unwrap_or("?"))
            }
            Quad::Ifz { cond, target } => write!(
                f,
                "ifz {} goto {}",
                cond.display(syms),
                self.proc.label_name(*target).unwrap_or("?")
            ),
            Quad::Nop => write!(f, "nop"),
            Quad::Read { dst, .. } => write!(f, "read {}", dst.display(syms)),
            Quad::Write { src, .. } => write!(f, "write {}", src.display(syms)),
            Quad::Call { callee, .. } => match callee {
                CallTarget::Sym(sym) => {
                    write!(f, "call {}", syms.name(*sym).unwrap_or("<unknown>"))
                }
                CallTarget::Runtime(name) => write!(f, "call {}", name),
            },
            Quad::SetArg { index, src } => {
                write!(f, "setarg {} {}", index, src.display(syms))
            }
            Quad::GetArg { index, dst } => {
                write!(f, "getarg {} {}", index, dst.display(syms))
            }
            Quad::SetRet { src } => write!(f, "setret {}", src.display(syms)),
            Quad::GetRet { dst } => write!(f, "getret {}", dst.display(syms)),
            Quad::Enter => write!(f, "enter {}", self.proc.name()),
            Quad::Leave => write!(f, "leave {}", self.proc.name()),
        }
    }
}

pub struct ProcDisplay<'a> {
    proc: &'a Procedure,
    symbols: &'a SymbolTable,
}

impl Procedure {
    pub fn display<'a>(&'a self, symbols: &'a SymbolTable) -> ProcDisplay<'a> {
        ProcDisplay { proc: self, symbols }
    }
}

impl fmt::Display for ProcDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "proc {}", self.proc.name())?;
        for inst in self.proc.body() {
            writeln!(f, "    {}", inst.display(self.proc, self.symbols))?;
        }
        Ok(())
    }
}

pub struct ProgramDisplay<'a> {
    program: &'a Program,
    symbols: &'a SymbolTable,
}

impl Program {
    pub fn display<'a>(&'a self, symbols: &'a SymbolTable) -> ProgramDisplay<'a> {
        ProgramDisplay {
            program: self,
            symbols,
        }
    }
}

impl fmt::Display for ProgramDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[BEGIN GLOBALS]")?;
        for &(sym, width) in self.program.globals() {
            let name = self.symbols.name(sym).unwrap_or("<unknown>");
            writeln!(f, "{} ({} bytes)", name, width.bytes())?;
        }
        for (id, text) in self.program.strings() {
            writeln!(f, "{} {:?}", Program::string_label(id), text)?;
        }
        writeln!(f, "[END GLOBALS]")?;
        write!(f, "{}", self.program.init_proc().display(self.symbols))?;
        for proc in self.program.procs() {
            write!(f, "{}", proc.display(self.symbols))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quad::BinOp;
    use dlc_common::{Type, Width};
    use dlc_frontend::SymbolKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_quad_repr() {
        let mut symbols = SymbolTable::new();
        let x = symbols.add("x", Type::Int, SymbolKind::Var);

        let mut proc = Procedure::new("main");
        proc.gather_local(x, Width::Quad);
        let tmp = proc.make_tmp(Width::Quad);
        proc.push(Quad::BinOp {
            dst: tmp,
            op: BinOp::Mult,
            src1: Opd::int_lit(4),
            src2: Opd::int_lit(2),
        });
        proc.push(Quad::Assign {
            dst: proc.sym_opd(x).unwrap(),
            src: tmp,
        });

        let body = proc.body();
        assert_eq!(
            body[1].display(&proc, &symbols).to_string(),
            "[tmp_0] := 4 MULT64 2"
        );
        assert_eq!(
            body[2].display(&proc, &symbols).to_string(),
            "[x] := [tmp_0]"
        );
    }

    #[test]
    fn test_labeled_inst_repr() {
        let mut symbols = SymbolTable::new();
        symbols.add("f", Type::Void, SymbolKind::Fn);

        let mut proc = Procedure::new("f");
        let lbl = proc.make_label();
        proc.push(Quad::Goto(lbl));
        proc.anchor(lbl);
        let body = proc.body();
        assert_eq!(
            body[1].display(&proc, &symbols).to_string(),
            "goto lbl_f_1"
        );
        assert_eq!(
            body[2].display(&proc, &symbols).to_string(),
            "lbl_f_1: nop"
        );
    }
}
