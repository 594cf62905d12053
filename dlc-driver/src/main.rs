//! Della Compiler Driver
//!
//! Reads a resolved compilation unit (JSON produced by the front end),
//! lowers it to 3AC, and emits x86-64 assembly. The front end is a
//! separate program; by the time input reaches `dlc` it is
//! diagnostic-clean, so every failure here exits non-zero as an
//! internal error.

use anyhow::{Context, Result};
use clap::Parser;
use dlc_backend::lower_unit;
use dlc_codegen::emit_program;
use dlc_frontend::CompilationUnit;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "dlc",
    version,
    about = "Della compiler backend: resolved AST to x86-64 assembly"
)]
struct Args {
    /// Resolved compilation unit (JSON)
    input: PathBuf,

    /// Output assembly file (defaults to stdout)
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Print the 3AC program to stdout before emission
    #[clap(long)]
    dump_ir: bool,

    /// Verbose output
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        env_logger::init();
    }

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let unit: CompilationUnit =
        serde_json::from_str(&text).context("decoding compilation unit")?;

    let program = lower_unit(&unit).context("lowering to 3AC")?;
    if args.dump_ir {
        print!("{}", program.display(&unit.symbols));
    }

    let asm = emit_program(&program, &unit.symbols).context("emitting assembly")?;
    match &args.output {
        Some(path) => fs::write(path, asm)
            .with_context(|| format!("writing {}", path.display()))?,
        None => print!("{}", asm),
    }
    Ok(())
}
