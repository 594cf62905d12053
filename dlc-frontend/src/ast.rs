//! Arena-allocated AST with resolved-symbol annotations
//!
//! Nodes live in flat arenas inside [`Ast`] and refer to each other by
//! index handles (`ExprId`, `StmtId`). The arena is the single owner;
//! there are no parent pointers and no reference cycles.
//!
//! Identifier and call nodes carry `Option<SymbolId>`: the resolver
//! contract says these are always `Some` by the time lowering runs.
//! `None` means the producing phase is defective and lowering aborts.

use dlc_common::{SymbolId, Type};
use serde::{Deserialize, Serialize};

/// Handle to an expression node in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExprId(pub u32);

/// Handle to a statement node in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StmtId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    IntLit(i64),
    True,
    False,
    StrLit(String),
    /// The `eh?` oracle expression: a hidden boolean source
    Eh,
    Ident(Option<SymbolId>),
    Call {
        callee: Option<SymbolId>,
        args: Vec<ExprId>,
    },
    Unary {
        op: UnaryOp,
        expr: ExprId,
    },
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// Local variable declaration; storage gathering only
    VarDecl { sym: Option<SymbolId> },
    Assign { dst: ExprId, src: ExprId },
    PostInc(ExprId),
    PostDec(ExprId),
    /// Built-in output of an int, bool, or string value
    Write(ExprId),
    /// Built-in input into an int or bool location
    Read(ExprId),
    If {
        cond: ExprId,
        body: Vec<StmtId>,
    },
    IfElse {
        cond: ExprId,
        then_body: Vec<StmtId>,
        else_body: Vec<StmtId>,
    },
    While {
        cond: ExprId,
        body: Vec<StmtId>,
    },
    /// Non-deterministic branch on the hidden boolean oracle
    Maybe {
        means_body: Vec<StmtId>,
        otherwise_body: Vec<StmtId>,
    },
    /// Call in statement position; any return value is discarded
    Call(ExprId),
    Return(Option<ExprId>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decl {
    Var {
        sym: Option<SymbolId>,
    },
    Fn {
        sym: Option<SymbolId>,
        formals: Vec<Option<SymbolId>>,
        body: Vec<StmtId>,
    },
}

/// The node arenas plus the ordered top-level declaration list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ast {
    pub exprs: Vec<Expr>,
    pub stmts: Vec<Stmt>,
    pub decls: Vec<Decl>,
}

impl Ast {
    pub fn expr(&self, id: ExprId) -> Option<&Expr> {
        self.exprs.get(id.0 as usize)
    }

    pub fn stmt(&self, id: StmtId) -> Option<&Stmt> {
        self.stmts.get(id.0 as usize)
    }
}

/// Resolved static type per expression node, parallel to `Ast::exprs`
///
/// Populated by type analysis; `get` returning `None` for a live node
/// is a precondition violation the backend turns into an internal error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeMap {
    types: Vec<Option<Type>>,
}

impl TypeMap {
    pub fn record(&mut self, id: ExprId, ty: Type) {
        let idx = id.0 as usize;
        if self.types.len() <= idx {
            self.types.resize(idx + 1, None);
        }
        self.types[idx] = Some(ty);
    }

    pub fn get(&self, id: ExprId) -> Option<&Type> {
        self.types.get(id.0 as usize).and_then(|t| t.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_arena_handles() {
        let mut ast = Ast::default();
        ast.exprs.push(Expr::IntLit(3));
        ast.exprs.push(Expr::IntLit(4));
        ast.exprs.push(Expr::Binary {
            op: BinaryOp::Add,
            lhs: ExprId(0),
            rhs: ExprId(1),
        });
        assert_eq!(ast.expr(ExprId(0)), Some(&Expr::IntLit(3)));
        assert!(matches!(
            ast.expr(ExprId(2)),
            Some(Expr::Binary { op: BinaryOp::Add, .. })
        ));
        assert_eq!(ast.expr(ExprId(9)), None);
    }

    #[test]
    fn test_type_map_sparse() {
        let mut types = TypeMap::default();
        types.record(ExprId(4), Type::Bool);
        assert_eq!(types.get(ExprId(4)), Some(&Type::Bool));
        assert_eq!(types.get(ExprId(0)), None);
        assert_eq!(types.get(ExprId(99)), None);
    }
}
