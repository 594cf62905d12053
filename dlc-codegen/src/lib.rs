//! Della Compiler - x86-64 Assembly Emission
//!
//! The final phase: turning a lowered [`dlc_ir::Program`] into AT&T
//! x86-64 assembly text. It includes:
//!
//! - the fixed scratch and argument register set
//! - the per-operand load/store protocol
//! - per-instruction templates and section layout
//!
//! There is no register allocation and no optimization; every value
//! round-trips through its stack slot between instructions.

pub mod emit;
pub mod error;
pub mod operand;
pub mod regs;

pub use emit::emit_program;
pub use error::CodegenError;
pub use operand::OperandCtx;
pub use regs::{arg_reg, Reg};
