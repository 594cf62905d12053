//! Builder for assembling resolved compilation units
//!
//! Front ends (and the backend's own tests) construct units through
//! this API instead of pushing into the arenas by hand: every
//! expression is recorded together with its resolved type, so a unit
//! built here always satisfies the lowering preconditions.

use crate::ast::{Ast, BinaryOp, Decl, Expr, ExprId, Stmt, StmtId, TypeMap, UnaryOp};
use crate::symbols::{SymbolKind, SymbolTable};
use crate::CompilationUnit;
use dlc_common::{SymbolId, Type};

#[derive(Debug, Default)]
pub struct UnitBuilder {
    symbols: SymbolTable,
    ast: Ast,
    types: TypeMap,
}

impl UnitBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symbol(&mut self, name: &str, ty: Type, kind: SymbolKind) -> SymbolId {
        self.symbols.add(name, ty, kind)
    }

    /// Shorthand for a variable symbol
    pub fn var(&mut self, name: &str, ty: Type) -> SymbolId {
        self.symbol(name, ty, SymbolKind::Var)
    }

    /// Shorthand for a function symbol
    pub fn func(&mut self, name: &str, params: Vec<Type>, ret: Type) -> SymbolId {
        self.symbol(
            name,
            Type::Fn {
                params,
                ret: Box::new(ret),
            },
            SymbolKind::Fn,
        )
    }

    /// Add an expression node with its resolved type
    pub fn expr(&mut self, expr: Expr, ty: Type) -> ExprId {
        let id = ExprId(self.ast.exprs.len() as u32);
        self.ast.exprs.push(expr);
        self.types.record(id, ty);
        id
    }

    pub fn int_lit(&mut self, val: i64) -> ExprId {
        self.expr(Expr::IntLit(val), Type::Int)
    }

    pub fn bool_lit(&mut self, val: bool) -> ExprId {
        let expr = if val { Expr::True } else { Expr::False };
        self.expr(expr, Type::Bool)
    }

    pub fn str_lit(&mut self, text: &str) -> ExprId {
        self.expr(Expr::StrLit(text.to_string()), Type::Str)
    }

    /// Identifier expression; the type comes from the symbol
    pub fn ident(&mut self, sym: SymbolId) -> ExprId {
        let ty = self
            .symbols
            .get(sym)
            .map(|s| s.ty.clone())
            .unwrap_or(Type::Void);
        self.expr(Expr::Ident(Some(sym)), ty)
    }

    pub fn unary(&mut self, op: UnaryOp, expr: ExprId, ty: Type) -> ExprId {
        self.expr(Expr::Unary { op, expr }, ty)
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId, ty: Type) -> ExprId {
        self.expr(Expr::Binary { op, lhs, rhs }, ty)
    }

    /// Call expression; the result type comes from the callee's return type
    pub fn call(&mut self, callee: SymbolId, args: Vec<ExprId>) -> ExprId {
        let ret = self
            .symbols
            .get(callee)
            .and_then(|s| s.ty.return_type().cloned())
            .unwrap_or(Type::Void);
        self.expr(
            Expr::Call {
                callee: Some(callee),
                args,
            },
            ret,
        )
    }

    pub fn stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId(self.ast.stmts.len() as u32);
        self.ast.stmts.push(stmt);
        id
    }

    pub fn global_var(&mut self, sym: SymbolId) {
        self.ast.decls.push(Decl::Var { sym: Some(sym) });
    }

    pub fn function(&mut self, sym: SymbolId, formals: Vec<SymbolId>, body: Vec<StmtId>) {
        self.ast.decls.push(Decl::Fn {
            sym: Some(sym),
            formals: formals.into_iter().map(Some).collect(),
            body,
        });
    }

    pub fn finish(self) -> CompilationUnit {
        CompilationUnit {
            symbols: self.symbols,
            ast: self.ast,
            types: self.types,
        }
    }
}
