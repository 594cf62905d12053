//! Emission failures
//!
//! Everything here is an internal fault: the lowering either produced
//! an instruction the templates cannot express or handed over an
//! operand with no storage. These abort compilation; none of them is a
//! user diagnostic.

use dlc_common::SymbolId;
use dlc_ir::IrError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("operation '{op}' is not supported on operand {operand}")]
    InvalidOperandOperation { op: &'static str, operand: String },

    #[error("operand {0} was never assigned a storage location")]
    UnplacedOperand(String),

    #[error("no symbol with id {0}")]
    UnknownSymbol(SymbolId),

    #[error(transparent)]
    Ir(#[from] IrError),

    #[error("formatting failure: {0}")]
    Fmt(#[from] std::fmt::Error),
}
