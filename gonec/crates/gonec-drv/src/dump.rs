//! Typed-tree dump for `check --show-types`.
//!
//! Prints every expression node in walk order with its source line and
//! resolved type, indented by tree depth.

use gonec_par::ast::*;
use gonec_sem::{TypeContext, TypeRegistry};

/// Print the typed tree of a checked program.
pub fn show_types(ast: &Ast, context: &TypeContext, registry: &TypeRegistry) {
    for stmt in ast {
        show_stmt(stmt, context, registry, 0);
    }
}

fn show_stmt(stmt: &Stmt, context: &TypeContext, registry: &TypeRegistry, depth: usize) {
    match stmt {
        Stmt::Const(decl) => {
            line(decl.span.line, depth, &format!("ConstDecl {}", decl.name));
            show_expr(&decl.value, context, registry, depth + 1);
        }
        Stmt::Var(decl) => {
            line(decl.span.line, depth, &format!("VarDecl {}", decl.name));
            line(
                decl.datatype.span.line,
                depth + 1,
                &format!(
                    "SimpleType {} type: {}",
                    decl.datatype.name,
                    type_name(context, registry, decl.datatype.id)
                ),
            );
            if let Some(value) = &decl.value {
                show_expr(value, context, registry, depth + 1);
            }
        }
        Stmt::Assign(assign) => {
            line(assign.span.line, depth, "Assignment");
            line(
                assign.location.span.line,
                depth + 1,
                &format!(
                    "SimpleLocation {} type: {}",
                    assign.location.name,
                    type_name(context, registry, assign.location.id)
                ),
            );
            show_expr(&assign.value, context, registry, depth + 1);
        }
        Stmt::Print(print) => {
            line(print.span.line, depth, "PrintStatement");
            show_expr(&print.value, context, registry, depth + 1);
        }
        Stmt::If(stmt) => {
            line(stmt.span.line, depth, "IfStatement");
            show_expr(&stmt.test, context, registry, depth + 1);
            for inner in &stmt.body {
                show_stmt(inner, context, registry, depth + 1);
            }
            for inner in &stmt.orelse {
                show_stmt(inner, context, registry, depth + 1);
            }
        }
        Stmt::While(stmt) => {
            line(stmt.span.line, depth, "WhileStatement");
            show_expr(&stmt.test, context, registry, depth + 1);
            for inner in &stmt.body {
                show_stmt(inner, context, registry, depth + 1);
            }
        }
    }
}

fn show_expr(expr: &Expr, context: &TypeContext, registry: &TypeRegistry, depth: usize) {
    let summary = match expr {
        Expr::Int(lit) => format!("IntegerLiteral {}", lit.value),
        Expr::Float(lit) => format!("FloatLiteral {}", lit.value),
        Expr::Char(lit) => format!("CharLiteral '{}'", lit.value),
        Expr::Bool(lit) => format!("BooleanLiteral {}", lit.value),
        Expr::Unary(unary) => format!("UnaryOp {}", unop_symbol(unary.op)),
        Expr::Binary(binary) => format!("BinOp {}", binop_symbol(binary.op)),
        Expr::Read(read) => format!("ReadValue {}", read.location.name),
    };
    line(
        expr.span().line,
        depth,
        &format!("{summary} type: {}", type_name(context, registry, expr.id())),
    );

    match expr {
        Expr::Unary(unary) => show_expr(&unary.operand, context, registry, depth + 1),
        Expr::Binary(binary) => {
            show_expr(&binary.left, context, registry, depth + 1);
            show_expr(&binary.right, context, registry, depth + 1);
        }
        _ => {}
    }
}

fn type_name(
    context: &TypeContext,
    registry: &TypeRegistry,
    id: gonec_util::NodeId,
) -> &'static str {
    match context.type_of(id) {
        Some(ty) => registry.name(ty),
        None => "None",
    }
}

fn line(lineno: u32, depth: usize, text: &str) {
    println!("{lineno}: {}{text}", "    ".repeat(depth));
}

fn binop_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Eq => "==",
        BinOp::Ne => "!=",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
        BinOp::And => "&&",
        BinOp::Or => "||",
    }
}

fn unop_symbol(op: UnOp) -> &'static str {
    match op {
        UnOp::Pos => "+",
        UnOp::Neg => "-",
        UnOp::Not => "!",
    }
}
