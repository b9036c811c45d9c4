//! Lowering structured control flow into labeled blocks.
//!
//! Consumes a checked AST and produces a flat instruction list.
//! Expressions lower in left-to-right post-order; `if` and `while`
//! become labeled blocks with explicit jumps. The IR is a contract, not
//! an optimization: no block merging, no dead-code removal.

use crate::inst::{Constant, Inst, Label};
use gonec_par::ast::*;

/// Lower a program to its instruction list.
pub fn lower(ast: &Ast) -> Vec<Inst> {
    Generator::new().lower_program(ast)
}

/// IR generator with a monotonically increasing label counter.
pub struct Generator {
    code: Vec<Inst>,
    label: u32,
}

impl Generator {
    pub fn new() -> Self {
        Self {
            code: Vec::new(),
            label: 0,
        }
    }

    /// Mint a fresh block label.
    fn new_block(&mut self) -> Label {
        self.label += 1;
        Label(self.label)
    }

    fn emit(&mut self, inst: Inst) {
        self.code.push(inst);
    }

    /// Lower all statements and return the finished instruction list.
    pub fn lower_program(mut self, ast: &Ast) -> Vec<Inst> {
        for stmt in ast {
            self.lower_stmt(stmt);
        }
        self.code
    }

    fn lower_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Const(decl) => {
                self.lower_expr(&decl.value);
                self.emit(Inst::StoreGlobal(decl.name));
            }
            Stmt::Var(decl) => {
                // An uninitialized var reserves its cell but stores
                // nothing
                if let Some(value) = &decl.value {
                    self.lower_expr(value);
                    self.emit(Inst::StoreGlobal(decl.name));
                }
            }
            Stmt::Assign(assign) => {
                self.lower_expr(&assign.value);
                self.emit(Inst::StoreGlobal(assign.location.name));
            }
            Stmt::Print(print) => {
                self.lower_expr(&print.value);
                self.emit(Inst::Print);
            }
            Stmt::If(stmt) => self.lower_if(stmt),
            Stmt::While(stmt) => self.lower_while(stmt),
        }
    }

    /// Lower `if test { A } else { B }`:
    ///
    /// ```text
    ///     <test>
    ///     JUMP_IF_FALSE L_else
    ///     BLOCK L_then
    ///     <A>
    ///     JUMP L_merge
    ///     BLOCK L_else
    ///     <B>            (empty if there is no else clause)
    ///     BLOCK L_merge
    /// ```
    fn lower_if(&mut self, stmt: &IfStmt) {
        self.lower_expr(&stmt.test);

        let then_block = self.new_block();
        let else_block = self.new_block();
        let merge_block = self.new_block();

        self.emit(Inst::JumpIfFalse(else_block));

        self.emit(Inst::Block(then_block));
        for stmt in &stmt.body {
            self.lower_stmt(stmt);
        }
        self.emit(Inst::Jump(merge_block));

        self.emit(Inst::Block(else_block));
        for stmt in &stmt.orelse {
            self.lower_stmt(stmt);
        }

        self.emit(Inst::Block(merge_block));
    }

    /// Lower `while test { body }`:
    ///
    /// ```text
    ///     BLOCK L_start
    ///     <test>
    ///     JUMP_IF_FALSE L_end
    ///     BLOCK L_body
    ///     <body>
    ///     JUMP L_start
    ///     BLOCK L_end
    /// ```
    fn lower_while(&mut self, stmt: &WhileStmt) {
        let start_block = self.new_block();
        let body_block = self.new_block();
        let end_block = self.new_block();

        self.emit(Inst::Block(start_block));
        self.lower_expr(&stmt.test);
        self.emit(Inst::JumpIfFalse(end_block));

        self.emit(Inst::Block(body_block));
        for stmt in &stmt.body {
            self.lower_stmt(stmt);
        }
        self.emit(Inst::Jump(start_block));

        self.emit(Inst::Block(end_block));
    }

    /// Lower an expression in post-order: operands first, then the
    /// operation.
    fn lower_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Int(lit) => self.emit(Inst::LoadConst(Constant::Int(lit.value))),
            Expr::Float(lit) => self.emit(Inst::LoadConst(Constant::Float(lit.value))),
            Expr::Char(lit) => self.emit(Inst::LoadConst(Constant::Char(lit.value))),
            Expr::Bool(lit) => self.emit(Inst::LoadConst(Constant::Bool(lit.value))),
            Expr::Unary(unary) => {
                self.lower_expr(&unary.operand);
                self.emit(Inst::Unary(unary.op));
            }
            Expr::Binary(binary) => {
                self.lower_expr(&binary.left);
                self.lower_expr(&binary.right);
                self.emit(Inst::Binary(binary.op));
            }
            Expr::Read(read) => self.emit(Inst::LoadGlobal(read.location.name)),
        }
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}
