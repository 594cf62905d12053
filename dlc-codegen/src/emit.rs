//! Instruction templates and section emission
//!
//! Output is AT&T-syntax x86-64 in two sections: `.data` holds
//! zero-initialized globals and the pooled strings, `.text` holds one
//! labeled block per procedure. Binary and unary templates always
//! compute in `rax`/`rbx` and store the result back to the
//! destination's slot; no value stays live in a register across
//! instructions.
//!
//! Calling convention: the first six arguments travel in
//! rdi, rsi, rdx, rcx, rax, rbx; further arguments are pushed, and the
//! caller pops them back after the call returns. The return value
//! travels in rax. User procedures are labeled `fun_<name>`; runtime
//! symbols keep their bare names.

use crate::error::CodegenError;
use crate::operand::OperandCtx;
use crate::regs::{arg_reg, Reg};
use dlc_common::Width;
use dlc_frontend::SymbolTable;
use dlc_ir::{BinOp, CallTarget, IoKind, Procedure, Program, Quad, UnaryOp};
use log::{debug, info};
use std::fmt::Write;

/// Emit the whole program as assembly text
pub fn emit_program(program: &Program, symbols: &SymbolTable) -> Result<String, CodegenError> {
    program.validate()?;
    info!(
        "emitting {} procedures, {} globals, {} strings",
        program.procs().len(),
        program.globals().len(),
        program.strings().count()
    );

    let mut out = String::new();
    emit_data(&mut out, program, symbols)?;
    writeln!(out, ".globl main")?;
    writeln!(out, ".text")?;
    emit_proc(&mut out, program.init_proc(), program, symbols)?;
    for proc in program.procs() {
        emit_proc(&mut out, proc, program, symbols)?;
    }
    Ok(out)
}

fn emit_data(out: &mut String, program: &Program, symbols: &SymbolTable) -> Result<(), CodegenError> {
    writeln!(out, ".data")?;
    for &(sym, width) in program.globals() {
        let name = symbols.name(sym).ok_or(CodegenError::UnknownSymbol(sym))?;
        let directive = match width {
            Width::Byte => ".byte",
            Width::Quad => ".quad",
        };
        writeln!(out, "gbl_{}: {} 0", name, directive)?;
    }
    for (id, text) in program.strings() {
        writeln!(out, "{}: .asciz {:?}", Program::string_label(id), text)?;
        writeln!(out, ".align 8")?;
    }
    Ok(())
}

fn proc_label(name: &str) -> String {
    if name == "__init" {
        name.to_string()
    } else {
        format!("fun_{}", name)
    }
}

fn emit_proc(
    out: &mut String,
    proc: &Procedure,
    program: &Program,
    symbols: &SymbolTable,
) -> Result<(), CodegenError> {
    debug!("emitting procedure '{}'", proc.name());
    let layout = proc.layout();
    let ctx = OperandCtx::new(&layout, program, symbols);

    writeln!(out, "{}:", proc_label(proc.name()))?;
    if proc.name() == "main" {
        // The entry-point alias the loader actually resolves.
        writeln!(out, "main:")?;
    }

    for inst in proc.body() {
        for &label in &inst.labels {
            writeln!(out, "{}:", proc.label_name(label)?)?;
        }
        writeln!(out, "\t# {}", inst.display(proc, symbols))?;
        emit_quad(out, &inst.kind, proc, &ctx, layout.alloc_bytes(), symbols)?;
    }
    Ok(())
}

fn emit_quad(
    out: &mut String,
    quad: &Quad,
    proc: &Procedure,
    ctx: &OperandCtx<'_>,
    alloc_bytes: usize,
    symbols: &SymbolTable,
) -> Result<(), CodegenError> {
    match quad {
        Quad::BinOp {
            dst,
            op,
            src1,
            src2,
        } => {
            // Left operand first: subtraction, division, and the
            // ordering comparisons depend on it.
            ctx.load_val(out, src1, Reg::A)?;
            ctx.load_val(out, src2, Reg::B)?;
            emit_bin_op(out, *op, src1.width())?;
            ctx.store_val(out, dst, Reg::A)?;
        }
        Quad::Unary { dst, op, src } => {
            ctx.load_val(out, src, Reg::A)?;
            match op {
                UnaryOp::Neg => writeln!(out, "\tnegq %rax")?,
                UnaryOp::Not => {
                    writeln!(out, "\tcmpq $0, %rax")?;
                    writeln!(out, "\tsetz %al")?;
                }
            }
            ctx.store_val(out, dst, Reg::A)?;
        }
        Quad::Assign { dst, src } => {
            ctx.load_val(out, src, Reg::A)?;
            ctx.store_val(out, dst, Reg::A)?;
        }
        Quad::Goto(target) => {
            writeln!(out, "\tjmp {}", proc.label_name(*target)?)?;
        }
        Quad::Ifz { cond, target } => {
            ctx.load_val(out, cond, Reg::A)?;
            writeln!(out, "\tcmpq $0, %rax")?;
            writeln!(out, "\tje {}", proc.label_name(*target)?)?;
        }
        Quad::Nop => {
            writeln!(out, "\tnop")?;
        }
        Quad::Read { dst, kind } => {
            let callee = match kind {
                IoKind::Int => "getInt",
                IoKind::Bool => "getBool",
                IoKind::Str => {
                    return Err(CodegenError::InvalidOperandOperation {
                        op: "read",
                        operand: dst.display(symbols).to_string(),
                    })
                }
            };
            writeln!(out, "\tcallq {}", callee)?;
            ctx.store_val(out, dst, Reg::A)?;
        }
        Quad::Write { src, kind } => {
            ctx.load_val(out, src, Reg::Di)?;
            let callee = match kind {
                IoKind::Int => "printInt",
                IoKind::Bool => "printBool",
                IoKind::Str => "printString",
            };
            writeln!(out, "\tcallq {}", callee)?;
        }
        Quad::Call { callee, arity } => {
            match callee {
                CallTarget::Sym(sym) => {
                    let name = symbols.name(*sym).ok_or(CodegenError::UnknownSymbol(*sym))?;
                    writeln!(out, "\tcallq {}", proc_label(name))?;
                }
                CallTarget::Runtime(name) => {
                    writeln!(out, "\tcallq {}", name)?;
                }
            }
            // Caller pops the stack-passed arguments back.
            if *arity > 6 {
                writeln!(out, "\taddq ${}, %rsp", 8 * (arity - 6))?;
            }
        }
        Quad::SetArg { index, src } => match arg_reg(*index) {
            Some(reg) => {
                ctx.load_val(out, src, reg)?;
            }
            None => {
                ctx.load_val(out, src, Reg::R10)?;
                writeln!(out, "\tpushq %r10")?;
            }
        },
        Quad::GetArg { index, dst } => {
            // Register-passed formals spill to their home slots;
            // stack-passed formals are already addressable above the
            // frame base.
            if let Some(reg) = arg_reg(*index) {
                ctx.store_val(out, dst, reg)?;
            }
        }
        Quad::SetRet { src } => {
            ctx.load_val(out, src, Reg::A)?;
        }
        Quad::GetRet { dst } => {
            ctx.store_val(out, dst, Reg::A)?;
        }
        Quad::Enter => {
            writeln!(out, "\tpushq %rbp")?;
            writeln!(out, "\tmovq %rsp, %rbp")?;
            writeln!(out, "\taddq $16, %rbp")?;
            writeln!(out, "\tsubq ${}, %rsp", alloc_bytes)?;
        }
        Quad::Leave => {
            writeln!(out, "\taddq ${}, %rsp", alloc_bytes)?;
            writeln!(out, "\tpopq %rbp")?;
            writeln!(out, "\tretq")?;
        }
    }
    Ok(())
}

fn emit_bin_op(out: &mut String, op: BinOp, width: Width) -> Result<(), CodegenError> {
    if op.is_comparison() {
        let setcc = match op {
            BinOp::Eq => "sete",
            BinOp::Neq => "setne",
            BinOp::Lt => "setl",
            BinOp::Gt => "setg",
            BinOp::Lte => "setle",
            BinOp::Gte => "setge",
            _ => unreachable!(),
        };
        writeln!(out, "\tcmpq %rbx, %rax")?;
        writeln!(out, "\t{} %al", setcc)?;
        return Ok(());
    }
    match op {
        BinOp::Mult => {
            writeln!(out, "\timulq %rbx")?;
        }
        BinOp::Div => {
            writeln!(out, "\tmovq $0, %rdx")?;
            writeln!(out, "\tidivq %rbx")?;
        }
        BinOp::Add | BinOp::Sub | BinOp::And | BinOp::Or => {
            let base = match op {
                BinOp::Add => "add",
                BinOp::Sub => "sub",
                BinOp::And => "and",
                BinOp::Or => "or",
                _ => unreachable!(),
            };
            let (suffix, a, b) = match width {
                Width::Byte => ("b", Reg::A.name8(), Reg::B.name8()),
                Width::Quad => ("q", Reg::A.name64(), Reg::B.name64()),
            };
            writeln!(out, "\t{}{} {}, {}", base, suffix, b, a)?;
        }
        _ => unreachable!(),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlc_backend::lower_unit;
    use dlc_common::Type;
    use dlc_frontend::ast::{BinaryOp, ExprId, Stmt};
    use dlc_frontend::{CompilationUnit, UnitBuilder};

    fn assemble(unit: &CompilationUnit) -> String {
        let program = lower_unit(unit).unwrap();
        emit_program(&program, &unit.symbols).unwrap()
    }

    fn call_with_n_args(n: usize) -> CompilationUnit {
        let mut b = UnitBuilder::new();
        let main = b.func("main", vec![], Type::Void);
        let f = b.func("f", vec![Type::Int; n], Type::Void);
        let args: Vec<ExprId> = (0..n).map(|i| b.int_lit(i as i64)).collect();
        let call = b.call(f, args);
        let stmt = b.stmt(Stmt::Call(call));
        b.function(main, vec![], vec![stmt]);
        let formals: Vec<_> = (0..n).map(|i| b.var(&format!("p{}", i), Type::Int)).collect();
        b.function(f, formals, vec![]);
        b.finish()
    }

    #[test]
    fn test_six_args_stay_in_registers() {
        let asm = assemble(&call_with_n_args(6));
        assert!(!asm.contains("pushq %r10"));
        assert!(!asm.contains("addq $8, %rsp"));
        for reg in ["%rdi", "%rsi", "%rdx", "%rcx", "%rax", "%rbx"] {
            assert!(asm.contains(&format!(", {}", reg)), "missing {}", reg);
        }
    }

    #[test]
    fn test_seventh_arg_pushed_and_cleaned_up() {
        let asm = assemble(&call_with_n_args(7));
        assert!(asm.contains("pushq %r10"));
        let call_at = asm.find("callq fun_f").unwrap();
        let after = &asm[call_at..];
        assert!(after.contains("addq $8, %rsp"));
    }

    #[test]
    fn test_nine_args_clean_up_three_slots() {
        let asm = assemble(&call_with_n_args(9));
        assert_eq!(asm.matches("pushq %r10").count(), 3);
        assert!(asm.contains("addq $24, %rsp"));
    }

    #[test]
    fn test_comparisons_set_correct_condition_codes() {
        let cases = [
            (BinaryOp::Eq, "sete %al"),
            (BinaryOp::Neq, "setne %al"),
            (BinaryOp::Lt, "setl %al"),
            (BinaryOp::Gt, "setg %al"),
            (BinaryOp::Lte, "setle %al"),
            (BinaryOp::Gte, "setge %al"),
        ];
        for (op, expected) in cases {
            let mut b = UnitBuilder::new();
            let main = b.func("main", vec![], Type::Void);
            let x = b.var("x", Type::Bool);
            let decl = b.stmt(Stmt::VarDecl { sym: Some(x) });
            let lhs = b.int_lit(1);
            let rhs = b.int_lit(2);
            let cmp = b.binary(op, lhs, rhs, Type::Bool);
            let dst = b.ident(x);
            let assign = b.stmt(Stmt::Assign { dst, src: cmp });
            b.function(main, vec![], vec![decl, assign]);
            let asm = assemble(&b.finish());
            assert!(
                asm.contains("cmpq %rbx, %rax"),
                "{:?}: missing compare",
                op
            );
            assert!(asm.contains(expected), "{:?}: missing {}", op, expected);
        }
    }

    #[test]
    fn test_enter_and_leave_bracket_the_frame() {
        // One local rounds up to a 16-byte frame.
        let mut b = UnitBuilder::new();
        let main = b.func("main", vec![], Type::Void);
        let x = b.var("x", Type::Int);
        let decl = b.stmt(Stmt::VarDecl { sym: Some(x) });
        let dst = b.ident(x);
        let one = b.int_lit(1);
        let assign = b.stmt(Stmt::Assign { dst, src: one });
        b.function(main, vec![], vec![decl, assign]);
        let asm = assemble(&b.finish());

        let prologue = "\tpushq %rbp\n\tmovq %rsp, %rbp\n\taddq $16, %rbp\n\tsubq $16, %rsp\n";
        assert!(asm.contains(prologue));
        let epilogue = "\taddq $16, %rsp\n\tpopq %rbp\n\tretq\n";
        assert!(asm.contains(epilogue));
    }

    #[test]
    fn test_data_section_sizes_directives_to_width() {
        let mut b = UnitBuilder::new();
        let i = b.var("count", Type::Int);
        let f = b.var("flag", Type::Bool);
        b.global_var(i);
        b.global_var(f);
        let main = b.func("main", vec![], Type::Void);
        let msg = b.str_lit("hi there");
        let w = b.stmt(Stmt::Write(msg));
        b.function(main, vec![], vec![w]);
        let asm = assemble(&b.finish());

        assert!(asm.starts_with(".data\n"));
        assert!(asm.contains("gbl_count: .quad 0\n"));
        assert!(asm.contains("gbl_flag: .byte 0\n"));
        assert!(asm.contains("str_0: .asciz \"hi there\"\n.align 8\n"));
    }

    #[test]
    fn test_main_gets_entry_point_alias() {
        let mut b = UnitBuilder::new();
        let main = b.func("main", vec![], Type::Void);
        b.function(main, vec![], vec![]);
        let asm = assemble(&b.finish());
        assert!(asm.contains(".globl main\n"));
        assert!(asm.contains("fun_main:\nmain:\n"));
    }

    #[test]
    fn test_runtime_symbols_called_bare() {
        let mut b = UnitBuilder::new();
        let main = b.func("main", vec![], Type::Void);
        let x = b.var("x", Type::Int);
        let decl = b.stmt(Stmt::VarDecl { sym: Some(x) });
        let target = b.ident(x);
        let read = b.stmt(Stmt::Read(target));
        let src = b.ident(x);
        let write = b.stmt(Stmt::Write(src));
        let maybe = b.stmt(Stmt::Maybe {
            means_body: vec![],
            otherwise_body: vec![],
        });
        b.function(main, vec![], vec![decl, read, write, maybe]);
        let asm = assemble(&b.finish());

        assert!(asm.contains("\tcallq getInt\n"));
        assert!(asm.contains("\tcallq printInt\n"));
        assert!(asm.contains("\tcallq randBool\n"));
        assert!(!asm.contains("callq fun_getInt"));
        assert!(!asm.contains("callq fun_randBool"));
    }

    #[test]
    fn test_register_formals_spill_to_home_slots() {
        let mut b = UnitBuilder::new();
        let f = b.func("f", vec![Type::Int, Type::Int], Type::Int);
        let p0 = b.var("a", Type::Int);
        let p1 = b.var("b", Type::Int);
        let lhs = b.ident(p0);
        let rhs = b.ident(p1);
        let sum = b.binary(BinaryOp::Add, lhs, rhs, Type::Int);
        let ret = b.stmt(Stmt::Return(Some(sum)));
        b.function(f, vec![p0, p1], vec![ret]);
        let asm = assemble(&b.finish());

        assert!(asm.contains("\tmovq %rdi, -24(%rbp)\n"));
        assert!(asm.contains("\tmovq %rsi, -32(%rbp)\n"));
    }

    #[test]
    fn test_division_clears_rdx_before_dividing() {
        let mut b = UnitBuilder::new();
        let main = b.func("main", vec![], Type::Void);
        let x = b.var("x", Type::Int);
        let decl = b.stmt(Stmt::VarDecl { sym: Some(x) });
        let lhs = b.int_lit(10);
        let rhs = b.int_lit(3);
        let quot = b.binary(BinaryOp::Div, lhs, rhs, Type::Int);
        let dst = b.ident(x);
        let assign = b.stmt(Stmt::Assign { dst, src: quot });
        b.function(main, vec![], vec![decl, assign]);
        let asm = assemble(&b.finish());
        assert!(asm.contains("\tmovq $0, %rdx\n\tidivq %rbx\n"));
    }

    #[test]
    fn test_boolean_ops_use_byte_forms() {
        let mut b = UnitBuilder::new();
        let main = b.func("main", vec![], Type::Void);
        let x = b.var("x", Type::Bool);
        let decl = b.stmt(Stmt::VarDecl { sym: Some(x) });
        let lhs = b.bool_lit(true);
        let rhs = b.bool_lit(false);
        let both = b.binary(BinaryOp::And, lhs, rhs, Type::Bool);
        let dst = b.ident(x);
        let assign = b.stmt(Stmt::Assign { dst, src: both });
        b.function(main, vec![], vec![decl, assign]);
        let asm = assemble(&b.finish());
        assert!(asm.contains("\tandb %bl, %al\n"));
    }
}
