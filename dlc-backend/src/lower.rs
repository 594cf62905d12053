//! The lowering driver: one pass, two mutually recursive translations
//!
//! `flatten` turns an expression into an operand, emitting the
//! instructions that compute it along the way; `lower_stmt` turns a
//! statement into a control-flow instruction sequence. Composite
//! expressions get exactly one fresh temporary and one instruction.
//!
//! Two deliberate points of the translation scheme, inherited from the
//! language definition rather than accidents:
//!
//! - `and`/`or` do NOT short-circuit: both sides are always flattened
//!   and combined with a bitwise instruction, so a side-effecting call
//!   on the right-hand side always executes.
//! - every `return` jumps to the procedure's single leave label; the
//!   epilogue is emitted exactly once no matter how many returns the
//!   source had.

use dlc_common::{SymbolId, Type, Width};
use dlc_frontend::ast::{BinaryOp, Decl, Expr, ExprId, Stmt, StmtId, UnaryOp};
use dlc_frontend::{CompilationUnit, Symbol};
use dlc_ir::quad::ORACLE;
use dlc_ir::{BinOp, CallTarget, IoKind, IrError, Opd, Procedure, Program, Quad};
use log::{debug, info, trace};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LowerError {
    #[error("identifier node {0:?} has no resolved symbol")]
    MissingSymbol(ExprId),

    #[error("expression node {0:?} has no resolved type")]
    MissingType(ExprId),

    #[error("no symbol with id {0}")]
    UnknownSymbol(SymbolId),

    #[error("symbol '{0}' was never gathered into a procedure or the globals")]
    UngatheredSymbol(String),

    #[error("declaration is missing its resolved symbol")]
    UnresolvedDecl,

    #[error("AST handle out of range")]
    BadHandle,

    #[error("void value used where an operand is required")]
    VoidOperand,

    #[error("expression of type {0} has no storable width")]
    NoWidth(Type),

    #[error("read/write of unsupported type {0}")]
    BadIoType(Type),

    #[error(transparent)]
    Ir(#[from] IrError),
}

/// Lower one resolved compilation unit into a 3AC program
pub fn lower_unit(unit: &CompilationUnit) -> Result<Program, LowerError> {
    info!(
        "lowering unit: {} declarations, {} symbols",
        unit.ast.decls.len(),
        unit.symbols.len()
    );
    let mut lowering = Lowering {
        unit,
        program: Program::new(),
    };

    // Globals first, so any procedure body can reference them.
    for decl in &unit.ast.decls {
        if let Decl::Var { sym } = decl {
            let sym = sym.ok_or(LowerError::UnresolvedDecl)?;
            let width = lowering.sym_width(sym)?;
            lowering.program.gather_global(sym, width);
        }
    }
    lowering.program.init_proc_mut().seal();

    for decl in &unit.ast.decls {
        if let Decl::Fn { sym, formals, body } = decl {
            let sym = sym.ok_or(LowerError::UnresolvedDecl)?;
            lowering.lower_function(sym, formals, body)?;
        }
    }

    lowering.program.validate()?;
    Ok(lowering.program)
}

struct Lowering<'a> {
    unit: &'a CompilationUnit,
    program: Program,
}

impl<'a> Lowering<'a> {
    fn symbol(&self, sym: SymbolId) -> Result<&'a Symbol, LowerError> {
        self.unit
            .symbols
            .get(sym)
            .ok_or(LowerError::UnknownSymbol(sym))
    }

    fn sym_width(&self, sym: SymbolId) -> Result<Width, LowerError> {
        let ty = &self.symbol(sym)?.ty;
        ty.width().ok_or_else(|| LowerError::NoWidth(ty.clone()))
    }

    fn expr_ty(&self, id: ExprId) -> Result<&'a Type, LowerError> {
        self.unit.types.get(id).ok_or(LowerError::MissingType(id))
    }

    fn expr_width(&self, id: ExprId) -> Result<Width, LowerError> {
        let ty = self.expr_ty(id)?;
        ty.width().ok_or_else(|| LowerError::NoWidth(ty.clone()))
    }

    fn lower_function(
        &mut self,
        sym: SymbolId,
        formals: &[Option<SymbolId>],
        body: &[StmtId],
    ) -> Result<(), LowerError> {
        let name = self.symbol(sym)?.name.clone();
        debug!("lowering function '{}' ({} formals)", name, formals.len());

        let mut proc = Procedure::new(&name);
        for formal in formals {
            let formal = formal.ok_or(LowerError::UnresolvedDecl)?;
            let width = self.sym_width(formal)?;
            proc.gather_formal(formal, width);
        }

        // Receive register-passed arguments into their home slots.
        for (i, &(formal, width)) in proc.formals().to_vec().iter().enumerate() {
            proc.push(Quad::GetArg {
                index: i + 1,
                dst: Opd::Sym { sym: formal, width },
            });
        }

        for &stmt in body {
            self.lower_stmt(&mut proc, stmt)?;
        }

        proc.seal();
        self.program.add_proc(proc);
        Ok(())
    }

    fn lower_stmt(&mut self, proc: &mut Procedure, id: StmtId) -> Result<(), LowerError> {
        let unit = self.unit;
        let stmt = unit.ast.stmt(id).ok_or(LowerError::BadHandle)?;
        trace!("lowering statement {:?}", id);
        match stmt {
            Stmt::VarDecl { sym } => {
                let sym = sym.ok_or(LowerError::UnresolvedDecl)?;
                let width = self.sym_width(sym)?;
                proc.gather_local(sym, width);
            }
            Stmt::Assign { dst, src } => {
                let dst = self.flatten_value(proc, *dst)?;
                let src = self.flatten_value(proc, *src)?;
                proc.push(Quad::Assign { dst, src });
            }
            Stmt::PostInc(loc) => {
                let opd = self.flatten_value(proc, *loc)?;
                proc.push(Quad::BinOp {
                    dst: opd,
                    op: BinOp::Add,
                    src1: opd,
                    src2: Opd::int_lit(1),
                });
            }
            Stmt::PostDec(loc) => {
                let opd = self.flatten_value(proc, *loc)?;
                proc.push(Quad::BinOp {
                    dst: opd,
                    op: BinOp::Sub,
                    src1: opd,
                    src2: Opd::int_lit(1),
                });
            }
            Stmt::Write(src) => {
                let kind = self.io_kind(*src)?;
                let opd = self.flatten_value(proc, *src)?;
                proc.push(Quad::Write { src: opd, kind });
            }
            Stmt::Read(dst) => {
                let kind = self.io_kind(*dst)?;
                if kind == IoKind::Str {
                    return Err(LowerError::BadIoType(self.expr_ty(*dst)?.clone()));
                }
                let opd = self.flatten_value(proc, *dst)?;
                proc.push(Quad::Read { dst: opd, kind });
            }
            Stmt::If { cond, body } => {
                let exit = proc.make_label();
                let cond = self.flatten_value(proc, *cond)?;
                proc.push(Quad::Ifz { cond, target: exit });
                for &stmt in body {
                    self.lower_stmt(proc, stmt)?;
                }
                proc.anchor(exit);
            }
            Stmt::IfElse {
                cond,
                then_body,
                else_body,
            } => {
                let else_lbl = proc.make_label();
                let exit = proc.make_label();
                let cond = self.flatten_value(proc, *cond)?;
                proc.push(Quad::Ifz {
                    cond,
                    target: else_lbl,
                });
                for &stmt in then_body {
                    self.lower_stmt(proc, stmt)?;
                }
                proc.push(Quad::Goto(exit));
                proc.anchor(else_lbl);
                for &stmt in else_body {
                    self.lower_stmt(proc, stmt)?;
                }
                proc.anchor(exit);
            }
            Stmt::While { cond, body } => {
                let loop_lbl = proc.make_label();
                let exit = proc.make_label();
                proc.anchor(loop_lbl);
                // The condition re-evaluates on every iteration.
                let cond = self.flatten_value(proc, *cond)?;
                proc.push(Quad::Ifz { cond, target: exit });
                for &stmt in body {
                    self.lower_stmt(proc, stmt)?;
                }
                proc.push(Quad::Goto(loop_lbl));
                proc.anchor(exit);
            }
            Stmt::Maybe {
                means_body,
                otherwise_body,
            } => {
                // Branch on the hidden oracle: the one place control
                // flow depends on an opaque runtime call rather than
                // user-visible state.
                let verdict = self.flatten_oracle(proc);
                let otherwise_lbl = proc.make_label();
                let exit = proc.make_label();
                proc.push(Quad::Ifz {
                    cond: verdict,
                    target: otherwise_lbl,
                });
                for &stmt in means_body {
                    self.lower_stmt(proc, stmt)?;
                }
                proc.push(Quad::Goto(exit));
                proc.anchor(otherwise_lbl);
                for &stmt in otherwise_body {
                    self.lower_stmt(proc, stmt)?;
                }
                proc.anchor(exit);
            }
            Stmt::Call(expr) => {
                // Statement position: any return value is discarded.
                self.flatten(proc, *expr)?;
            }
            Stmt::Return(value) => {
                if let Some(value) = value {
                    let src = self.flatten_value(proc, *value)?;
                    proc.push(Quad::SetRet { src });
                }
                proc.push(Quad::Goto(proc.leave_label()));
            }
        }
        Ok(())
    }

    /// Flatten an expression into an operand, emitting the computing
    /// instructions. Returns `None` only for calls to void procedures.
    fn flatten(&mut self, proc: &mut Procedure, id: ExprId) -> Result<Option<Opd>, LowerError> {
        let unit = self.unit;
        let expr = unit.ast.expr(id).ok_or(LowerError::BadHandle)?;
        match expr {
            Expr::IntLit(val) => Ok(Some(Opd::int_lit(*val))),
            Expr::True => Ok(Some(Opd::bool_lit(true))),
            Expr::False => Ok(Some(Opd::bool_lit(false))),
            Expr::StrLit(text) => Ok(Some(self.program.intern_string(text))),
            Expr::Eh => Ok(Some(self.flatten_oracle(proc))),
            Expr::Ident(sym) => {
                let sym = sym.ok_or(LowerError::MissingSymbol(id))?;
                proc.sym_opd(sym)
                    .or_else(|| self.program.global_opd(sym))
                    .map(Some)
                    .ok_or_else(|| {
                        let name = self
                            .unit
                            .symbols
                            .name(sym)
                            .unwrap_or("<unknown>")
                            .to_string();
                        LowerError::UngatheredSymbol(name)
                    })
            }
            Expr::Unary { op, expr } => {
                let src = self.flatten_value(proc, *expr)?;
                let dst = proc.make_tmp(self.expr_width(id)?);
                let op = match op {
                    UnaryOp::Neg => dlc_ir::UnaryOp::Neg,
                    UnaryOp::Not => dlc_ir::UnaryOp::Not,
                };
                proc.push(Quad::Unary { dst, op, src });
                Ok(Some(dst))
            }
            Expr::Binary { op, lhs, rhs } => {
                // Left operand first; subtraction, division, and the
                // ordering comparisons depend on it.
                let src1 = self.flatten_value(proc, *lhs)?;
                let src2 = self.flatten_value(proc, *rhs)?;
                let dst = proc.make_tmp(self.expr_width(id)?);
                proc.push(Quad::BinOp {
                    dst,
                    op: bin_op(*op),
                    src1,
                    src2,
                });
                Ok(Some(dst))
            }
            Expr::Call { callee, args } => {
                let callee = callee.ok_or(LowerError::MissingSymbol(id))?;
                for (i, &arg) in args.iter().enumerate() {
                    let src = self.flatten_value(proc, arg)?;
                    proc.push(Quad::SetArg { index: i + 1, src });
                }
                proc.push(Quad::Call {
                    callee: CallTarget::Sym(callee),
                    arity: args.len(),
                });

                let ret = self
                    .symbol(callee)?
                    .ty
                    .return_type()
                    .cloned()
                    .unwrap_or(Type::Void);
                if ret.is_void() {
                    Ok(None)
                } else {
                    let width = ret.width().ok_or(LowerError::NoWidth(ret))?;
                    let dst = proc.make_tmp(width);
                    proc.push(Quad::GetRet { dst });
                    Ok(Some(dst))
                }
            }
        }
    }

    /// Flatten in a context that requires a value
    fn flatten_value(&mut self, proc: &mut Procedure, id: ExprId) -> Result<Opd, LowerError> {
        self.flatten(proc, id)?.ok_or(LowerError::VoidOperand)
    }

    /// Call the runtime boolean oracle and capture its verdict
    fn flatten_oracle(&mut self, proc: &mut Procedure) -> Opd {
        proc.push(Quad::Call {
            callee: ORACLE,
            arity: 0,
        });
        let dst = proc.make_tmp(Width::Byte);
        proc.push(Quad::GetRet { dst });
        dst
    }

    fn io_kind(&self, id: ExprId) -> Result<IoKind, LowerError> {
        match self.expr_ty(id)? {
            Type::Int => Ok(IoKind::Int),
            Type::Bool => Ok(IoKind::Bool),
            Type::Str => Ok(IoKind::Str),
            other => Err(LowerError::BadIoType(other.clone())),
        }
    }
}

fn bin_op(op: BinaryOp) -> BinOp {
    match op {
        BinaryOp::Add => BinOp::Add,
        BinaryOp::Sub => BinOp::Sub,
        BinaryOp::Mul => BinOp::Mult,
        BinaryOp::Div => BinOp::Div,
        BinaryOp::And => BinOp::And,
        BinaryOp::Or => BinOp::Or,
        BinaryOp::Eq => BinOp::Eq,
        BinaryOp::Neq => BinOp::Neq,
        BinaryOp::Lt => BinOp::Lt,
        BinaryOp::Gt => BinOp::Gt,
        BinaryOp::Lte => BinOp::Lte,
        BinaryOp::Gte => BinOp::Gte,
    }
}
