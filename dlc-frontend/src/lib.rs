//! Della Compiler - Resolved AST Contract
//!
//! This crate defines the hand-off between the Della front end (lexing,
//! parsing, name analysis, type analysis, all external collaborators) and
//! the backend: an arena-allocated AST whose identifier nodes carry
//! resolved symbols, together with the symbol table and a per-expression
//! type map. The whole contract derives serde, so a front end can
//! deliver a compilation unit as JSON and the `dlc` driver can pick it
//! up from there.
//!
//! The backend fails fast with an internal error if a symbol or type
//! that this contract promises is missing; that is a defect in the
//! producing phase, never a user diagnostic.

pub mod ast;
pub mod build;
pub mod symbols;

pub use ast::{Ast, BinaryOp, Decl, Expr, ExprId, Stmt, StmtId, TypeMap, UnaryOp};
pub use build::UnitBuilder;
pub use symbols::{Symbol, SymbolKind, SymbolTable};

use serde::{Deserialize, Serialize};

/// One fully resolved compilation unit, ready for lowering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilationUnit {
    pub symbols: SymbolTable,
    pub ast: Ast,
    pub types: TypeMap,
}
