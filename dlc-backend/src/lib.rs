//! Della Compiler - AST to 3AC Lowering
//!
//! Walks a resolved compilation unit and populates a
//! [`dlc_ir::Program`]: expressions flatten to operand-producing
//! instruction sequences, statements to control-flow sequences. By the
//! time this crate runs, the AST is diagnostic-clean; every error here
//! is an internal fault.

pub mod lower;

pub use lower::{lower_unit, LowerError};
