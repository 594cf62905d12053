//! Della Compiler - Common Types and Utilities
//!
//! This crate contains the shared vocabulary of the Della compiler
//! backend: id handles, the operand width model, and the resolved type
//! representation every other crate speaks.

pub mod types;

pub use types::*;
