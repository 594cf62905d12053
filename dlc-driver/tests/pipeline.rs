//! End-to-end runs of the `dlc` binary over a JSON compilation unit

use dlc_frontend::ast::{BinaryOp, Stmt};
use dlc_frontend::{CompilationUnit, UnitBuilder};
use dlc_common::Type;
use std::path::PathBuf;
use std::process::Command;

fn sample_unit() -> CompilationUnit {
    // g: int; main() { x: int; x = g + 2; write x; return; }
    let mut b = UnitBuilder::new();
    let g = b.var("g", Type::Int);
    b.global_var(g);
    let main = b.func("main", vec![], Type::Void);
    let x = b.var("x", Type::Int);
    let decl = b.stmt(Stmt::VarDecl { sym: Some(x) });
    let lhs = b.ident(g);
    let two = b.int_lit(2);
    let sum = b.binary(BinaryOp::Add, lhs, two, Type::Int);
    let dst = b.ident(x);
    let assign = b.stmt(Stmt::Assign { dst, src: sum });
    let out = b.ident(x);
    let write = b.stmt(Stmt::Write(out));
    let ret = b.stmt(Stmt::Return(None));
    b.function(main, vec![], vec![decl, assign, write, ret]);
    b.finish()
}

fn write_unit(unit: &CompilationUnit, stem: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("dlc-pipeline-{}-{}.json", stem, std::process::id()));
    let json = serde_json::to_string(unit).unwrap();
    std::fs::write(&path, json).unwrap();
    path
}

#[test]
fn test_unit_compiles_to_assembly_on_stdout() {
    let input = write_unit(&sample_unit(), "stdout");
    let out = Command::new(env!("CARGO_BIN_EXE_dlc"))
        .arg(&input)
        .output()
        .unwrap();
    std::fs::remove_file(&input).ok();

    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let asm = String::from_utf8(out.stdout).unwrap();
    assert!(asm.contains(".data"));
    assert!(asm.contains("gbl_g: .quad 0"));
    assert!(asm.contains(".globl main"));
    assert!(asm.contains("fun_main:"));
    assert!(asm.contains("callq printInt"));
    assert!(asm.contains("retq"));
}

#[test]
fn test_dump_ir_prints_quads_before_assembly() {
    let input = write_unit(&sample_unit(), "dumpir");
    let out = Command::new(env!("CARGO_BIN_EXE_dlc"))
        .arg(&input)
        .arg("--dump-ir")
        .output()
        .unwrap();
    std::fs::remove_file(&input).ok();

    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    assert!(text.contains("[tmp_0] := [g] ADD64 2"));
    assert!(text.contains("enter main"));
}

#[test]
fn test_output_flag_writes_file() {
    let input = write_unit(&sample_unit(), "outfile");
    let mut asm_path = std::env::temp_dir();
    asm_path.push(format!("dlc-pipeline-out-{}.s", std::process::id()));
    let out = Command::new(env!("CARGO_BIN_EXE_dlc"))
        .arg(&input)
        .arg("-o")
        .arg(&asm_path)
        .output()
        .unwrap();
    std::fs::remove_file(&input).ok();

    assert!(out.status.success());
    let asm = std::fs::read_to_string(&asm_path).unwrap();
    std::fs::remove_file(&asm_path).ok();
    assert!(asm.contains("fun_main:"));
}

#[test]
fn test_malformed_input_exits_nonzero() {
    let mut path = std::env::temp_dir();
    path.push(format!("dlc-pipeline-bad-{}.json", std::process::id()));
    std::fs::write(&path, "{ not json").unwrap();
    let out = Command::new(env!("CARGO_BIN_EXE_dlc"))
        .arg(&path)
        .output()
        .unwrap();
    std::fs::remove_file(&path).ok();

    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("decoding compilation unit"));
}
