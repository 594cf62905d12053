//! Internal faults raised by IR construction and validation
//!
//! Nothing in here is a user diagnostic: every variant means an earlier
//! phase (or the backend itself) is defective, and compilation aborts.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrError {
    #[error("dangling label '{label}' in procedure '{proc}'")]
    DanglingLabel { label: String, proc: String },

    #[error("label '{label}' anchored to {count} instructions in procedure '{proc}'")]
    MultiplyAnchored {
        label: String,
        proc: String,
        count: usize,
    },

    #[error("procedure '{proc}' does not have exactly one enter and one leave")]
    MalformedFrame { proc: String },

    #[error("label id {id} out of range in procedure '{proc}'")]
    UnknownLabel { id: u32, proc: String },
}
