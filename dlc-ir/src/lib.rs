//! Della Compiler - Three-Address-Code Intermediate Representation
//!
//! This crate defines the linear 3AC the backend lowers into and the
//! containers that own it:
//!
//! - [`opd`]: the operand model (named variables, literals,
//!   temporaries, address-of slots, pooled string constants)
//! - [`quad`]: the closed instruction set
//! - [`proc`]: procedures, their instruction lists, operand
//!   collections, and the stack-frame layout algorithm
//! - [`program`]: the whole-program container with globals and the
//!   string pool
//!
//! Ownership is strictly hierarchical: `Program` owns `Procedure`s,
//! procedures own their instructions and operand collections, and
//! instructions refer to operands and labels by value/handle only.

pub mod display;
pub mod error;
pub mod opd;
pub mod proc;
pub mod program;
pub mod quad;

pub use error::IrError;
pub use opd::Opd;
pub use proc::{FrameLayout, Procedure};
pub use program::Program;
pub use quad::{BinOp, CallTarget, Inst, IoKind, Quad, UnaryOp, ORACLE};
