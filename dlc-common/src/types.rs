//! Common types shared across compiler phases
//!
//! This module defines the data types that cross crate boundaries:
//! symbol identities handed over by name analysis, operand widths used
//! by the IR and the emitter, and the Della type representation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbol identifier, issued by name analysis
pub type SymbolId = u32;

/// Compiler-synthesized temporary identifier
pub type TempId = u32;

/// Pooled string-constant identifier
pub type StrId = u32;

/// Label identifier, local to one procedure
pub type LabelId = u32;

/// Operand width in bytes
///
/// Della has exactly two storage widths: 1-byte booleans and 8-byte
/// integers/addresses. An operand's width is fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Width {
    /// 1 byte (booleans)
    Byte,
    /// 8 bytes (integers, addresses)
    Quad,
}

impl Width {
    /// Size in bytes
    pub fn bytes(&self) -> usize {
        match self {
            Width::Byte => 1,
            Width::Quad => 8,
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Width::Byte => write!(f, "8"),
            Width::Quad => write!(f, "64"),
        }
    }
}

/// Static types of the Della language
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    Int,
    Bool,
    /// String literals; only ever read, written, or passed along
    Str,
    Void,
    Fn { params: Vec<Type>, ret: Box<Type> },
}

impl Type {
    /// The storage width of a value of this type, if it has one.
    /// Void has no width; functions are addresses.
    pub fn width(&self) -> Option<Width> {
        match self {
            Type::Int => Some(Width::Quad),
            Type::Bool => Some(Width::Byte),
            Type::Str => Some(Width::Quad),
            Type::Fn { .. } => Some(Width::Quad),
            Type::Void => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// Return type of a function type, if this is one
    pub fn return_type(&self) -> Option<&Type> {
        match self {
            Type::Fn { ret, .. } => Some(ret),
            _ => None,
        }
    }

    /// Arity of a function type, if this is one
    pub fn arity(&self) -> Option<usize> {
        match self {
            Type::Fn { params, .. } => Some(params.len()),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Bool => write!(f, "bool"),
            Type::Str => write!(f, "str"),
            Type::Void => write!(f, "void"),
            Type::Fn { params, ret } => {
                write!(f, "(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ") -> {}", ret)
            }
        }
    }
}
