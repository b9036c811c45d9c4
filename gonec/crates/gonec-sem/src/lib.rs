//! gonec-sem - Semantic analysis for the Gone language.
//!
//! Walks the AST post-order, resolves names through a flat symbol
//! table, and assigns a registry type to every expression, location,
//! and datatype node. Annotations land in a [`TypeContext`] side table
//! keyed by node id, so the AST itself stays immutable. Errors are
//! collected in the handler, never thrown across the walk; an erroneous
//! subtree gets the error sentinel, which suppresses follow-on
//! diagnostics from the same cause.

mod symtab;
mod types;

pub use symtab::{DeclSite, SymbolEntry, SymbolKind, SymbolTable};
pub use types::{OperatorError, TypeDef, TypeId, TypeRegistry};

use gonec_par::ast::*;
use gonec_util::{FxHashMap, Handler, NodeId};

/// How a location is being used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    Read,
    Write,
}

/// Per-node annotations produced by checking.
#[derive(Default)]
pub struct TypeContext {
    /// Resolved type of every expression, location, and datatype node
    types: FxHashMap<NodeId, TypeId>,

    /// Usage tag of every location node
    usages: FxHashMap<NodeId, Usage>,
}

impl TypeContext {
    /// Type assigned to a node, if the checker reached it.
    pub fn type_of(&self, id: NodeId) -> Option<TypeId> {
        self.types.get(&id).copied()
    }

    /// Usage tag of a location node.
    pub fn usage_of(&self, id: NodeId) -> Option<Usage> {
        self.usages.get(&id).copied()
    }

    fn set_type(&mut self, id: NodeId, ty: TypeId) {
        self.types.insert(id, ty);
    }

    fn set_usage(&mut self, id: NodeId, usage: Usage) {
        self.usages.insert(id, usage);
    }
}

/// Check a program, returning its annotations.
pub fn check(ast: &Ast, registry: &TypeRegistry, handler: &Handler) -> TypeContext {
    Checker::new(registry, handler).check_program(ast)
}

/// The program checker.
pub struct Checker<'a> {
    registry: &'a TypeRegistry,
    handler: &'a Handler,
    symbols: SymbolTable,
    context: TypeContext,
}

impl<'a> Checker<'a> {
    /// Create a checker with a symbol table seeded from the registry.
    pub fn new(registry: &'a TypeRegistry, handler: &'a Handler) -> Self {
        Self {
            registry,
            handler,
            symbols: SymbolTable::new(registry),
            context: TypeContext::default(),
        }
    }

    /// Walk the whole program and return the annotation tables.
    pub fn check_program(mut self, ast: &Ast) -> TypeContext {
        for stmt in ast {
            self.check_stmt(stmt);
        }
        self.context
    }

    fn check_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Const(decl) => self.check_const_decl(decl),
            Stmt::Var(decl) => self.check_var_decl(decl),
            Stmt::Assign(assign) => self.check_assignment(assign),
            Stmt::Print(print) => {
                self.check_expr(&print.value);
            }
            Stmt::If(stmt) => self.check_if(stmt),
            Stmt::While(stmt) => self.check_while(stmt),
        }
    }

    /// A constant takes its type from its initializer.
    fn check_const_decl(&mut self, decl: &ConstDecl) {
        let ty = self.check_expr(&decl.value);
        self.declare(decl.name, SymbolKind::Const, ty, decl.span.line);
    }

    /// A variable's declared type must match its initializer, when one
    /// is present.
    fn check_var_decl(&mut self, decl: &VarDecl) {
        let declared = self.check_datatype(&decl.datatype);

        if let Some(value) = &decl.value {
            let value_ty = self.check_expr(value);
            if declared != value_ty && declared != TypeId::ERROR && value_ty != TypeId::ERROR {
                self.handler.error(
                    decl.span.line,
                    format!(
                        "type error. {} = {}",
                        self.registry.name(declared),
                        self.registry.name(value_ty)
                    ),
                );
            }
        }

        self.declare(decl.name, SymbolKind::Var, declared, decl.span.line);
    }

    /// Insert a declaration, reporting redefinition against the
    /// existing entry. The first declaration always stays in force.
    fn declare(&mut self, name: gonec_util::Symbol, kind: SymbolKind, ty: TypeId, line: u32) {
        if let Some(existing) = self.symbols.get(name) {
            self.handler.error(
                line,
                format!(
                    "{name} redefined. Previous definition on {}",
                    existing.site
                ),
            );
        } else {
            self.symbols.define(
                name,
                SymbolEntry {
                    kind,
                    ty,
                    site: DeclSite::Line(line),
                },
            );
        }
    }

    fn check_assignment(&mut self, assign: &Assignment) {
        let lhs = self.check_location(&assign.location, Usage::Write);
        let rhs = self.check_expr(&assign.value);

        if lhs != rhs && lhs != TypeId::ERROR && rhs != TypeId::ERROR {
            self.handler.error(
                assign.span.line,
                format!(
                    "type error. {} = {}",
                    self.registry.name(lhs),
                    self.registry.name(rhs)
                ),
            );
        }
    }

    fn check_if(&mut self, stmt: &IfStmt) {
        let test = self.check_expr(&stmt.test);
        if test != self.registry.bool_type() && test != TypeId::ERROR {
            self.handler.error(
                stmt.span.line,
                format!("if condition must be bool, not {}", self.registry.name(test)),
            );
        }

        // The bodies are checked regardless so their own errors surface
        for stmt in &stmt.body {
            self.check_stmt(stmt);
        }
        for stmt in &stmt.orelse {
            self.check_stmt(stmt);
        }
    }

    fn check_while(&mut self, stmt: &WhileStmt) {
        let test = self.check_expr(&stmt.test);
        if test != self.registry.bool_type() && test != TypeId::ERROR {
            self.handler.error(
                stmt.span.line,
                format!(
                    "while condition must be bool, not {}",
                    self.registry.name(test)
                ),
            );
        }

        for stmt in &stmt.body {
            self.check_stmt(stmt);
        }
    }

    /// Check an expression, record its type, and return it.
    fn check_expr(&mut self, expr: &Expr) -> TypeId {
        let ty = match expr {
            Expr::Int(_) => self.registry.int_type(),
            Expr::Float(_) => self.registry.float_type(),
            Expr::Char(_) => self.registry.char_type(),
            Expr::Bool(_) => self.registry.bool_type(),
            Expr::Unary(unary) => self.check_unary(unary),
            Expr::Binary(binary) => self.check_binary(binary),
            Expr::Read(read) => self.check_location(&read.location, Usage::Read),
        };

        self.context.set_type(expr.id(), ty);
        ty
    }

    fn check_unary(&mut self, unary: &UnaryExpr) -> TypeId {
        let operand = self.check_expr(&unary.operand);

        match self
            .registry
            .check_unaryop(registry_unop_name(unary.op), operand)
        {
            Ok(ty) => ty,
            Err(err) => {
                self.handler.error(unary.span.line, err.to_string());
                TypeId::ERROR
            }
        }
    }

    fn check_binary(&mut self, binary: &BinaryExpr) -> TypeId {
        let lhs = self.check_expr(&binary.left);
        let rhs = self.check_expr(&binary.right);

        match self
            .registry
            .check_binop(lhs, registry_binop_name(binary.op), rhs)
        {
            Ok(ty) => ty,
            Err(err) => {
                self.handler.error(binary.span.line, err.to_string());
                TypeId::ERROR
            }
        }
    }

    /// Resolve a location, record its type and usage, and return the
    /// type.
    fn check_location(&mut self, location: &SimpleLocation, usage: Usage) -> TypeId {
        self.context.set_usage(location.id, usage);

        let ty = match self.symbols.get(location.name) {
            None => {
                self.handler
                    .error(location.span.line, format!("{} undefined", location.name));
                TypeId::ERROR
            }
            Some(entry) => {
                if usage == Usage::Write && entry.kind != SymbolKind::Var {
                    self.handler.error(
                        location.span.line,
                        format!("Can't assign to {}", location.name),
                    );
                    TypeId::ERROR
                } else if usage == Usage::Read && entry.kind == SymbolKind::Type {
                    self.handler.error(
                        location.span.line,
                        format!("Can't read from {}", location.name),
                    );
                    TypeId::ERROR
                } else {
                    entry.ty
                }
            }
        };

        self.context.set_type(location.id, ty);
        ty
    }

    /// Resolve a datatype name through the symbol table.
    fn check_datatype(&mut self, datatype: &SimpleType) -> TypeId {
        let ty = match self.symbols.get(datatype.name) {
            Some(entry) if entry.kind == SymbolKind::Type => entry.ty,
            _ => {
                self.handler.error(
                    datatype.span.line,
                    format!("unknown type name {}", datatype.name),
                );
                TypeId::ERROR
            }
        };

        self.context.set_type(datatype.id, ty);
        ty
    }
}

/// Registry spelling of a binary operator. The parser's `&&`, `||`
/// spellings normalize to the table's `and`/`or`; everything else keeps
/// its symbol.
fn registry_binop_name(op: BinOp) -> &'static str {
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
        BinOp::And => "and",
        BinOp::Or => "or",
    }
}

/// Registry spelling of a unary operator; `!` normalizes to `not`.
fn registry_unop_name(op: UnOp) -> &'static str {
    match op {
        UnOp::Pos => "+",
        UnOp::Neg => "-",
        UnOp::Not => "not",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gonec_par::parse;

    fn check_source(source: &str) -> (TypeContext, Vec<String>, Ast) {
        let handler = Handler::new();
        let ast = parse(source, &handler);
        assert!(
            !handler.has_errors(),
            "parse errors in test input: {:?}",
            handler.diagnostics()
        );
        let registry = TypeRegistry::new();
        let context = check(&ast, &registry, &handler);
        let messages = handler.diagnostics().into_iter().map(|d| d.message).collect();
        (context, messages, ast)
    }

    fn check_messages(source: &str) -> Vec<String> {
        check_source(source).1
    }

    #[test]
    fn test_good_program_has_no_errors() {
        let errors = check_messages("var n int = 5;\nwhile n > 0 {\n    print n;\n    n = n - 1;\n}");
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_every_expression_is_typed() {
        let (context, errors, ast) = check_source("var n int = 1 + 2 * 3;\nprint n < 4 && true;");
        assert!(errors.is_empty());

        fn assert_typed(expr: &Expr, context: &TypeContext) {
            assert!(context.type_of(expr.id()).is_some(), "untyped: {expr:?}");
            match expr {
                Expr::Unary(u) => assert_typed(&u.operand, context),
                Expr::Binary(b) => {
                    assert_typed(&b.left, context);
                    assert_typed(&b.right, context);
                }
                Expr::Read(r) => assert!(context.type_of(r.location.id).is_some()),
                _ => {}
            }
        }
        for stmt in &ast {
            match stmt {
                Stmt::Var(d) => {
                    assert!(context.type_of(d.datatype.id).is_some());
                    if let Some(v) = &d.value {
                        assert_typed(v, &context);
                    }
                }
                Stmt::Print(p) => assert_typed(&p.value, &context),
                _ => {}
            }
        }
    }

    #[test]
    fn test_literal_types() {
        let (context, _, ast) = check_source("print 1;\nprint 2.5;\nprint 'x';\nprint true;");
        let registry = TypeRegistry::new();
        let expected = [
            registry.int_type(),
            registry.float_type(),
            registry.char_type(),
            registry.bool_type(),
        ];
        for (stmt, want) in ast.iter().zip(expected) {
            match stmt {
                Stmt::Print(p) => assert_eq!(context.type_of(p.value.id()), Some(want)),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_const_takes_initializer_type() {
        let (context, errors, ast) = check_source("const a = 4.2;\nvar b float = a;");
        assert!(errors.is_empty(), "{errors:?}");
        match &ast[1] {
            Stmt::Var(d) => {
                let registry = TypeRegistry::new();
                let value = d.value.as_ref().unwrap();
                assert_eq!(context.type_of(value.id()), Some(registry.float_type()));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_undefined_name() {
        let errors = check_messages("a = 3;\nvar a int;");
        assert_eq!(errors, vec!["a undefined"]);
    }

    #[test]
    fn test_undefined_name_line() {
        let handler = Handler::new();
        let ast = parse("print 1;\nprint oops;", &handler);
        let registry = TypeRegistry::new();
        check(&ast, &registry, &handler);
        let diags = handler.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].line, 2);
        assert_eq!(diags[0].message, "oops undefined");
    }

    #[test]
    fn test_redefinition() {
        let errors = check_messages("var n int;\nvar n int;");
        assert_eq!(errors, vec!["n redefined. Previous definition on 1"]);
    }

    #[test]
    fn test_redefinition_of_const() {
        let errors = check_messages("const a = 1;\nconst a = 2;");
        assert_eq!(errors, vec!["a redefined. Previous definition on 1"]);
    }

    #[test]
    fn test_redefining_builtin_type_name() {
        let errors = check_messages("var int int;");
        assert_eq!(
            errors,
            vec!["int redefined. Previous definition on <builtin type>"]
        );
    }

    #[test]
    fn test_first_declaration_wins_after_redefinition() {
        // The second `n` is not inserted; uses keep resolving to int
        let errors = check_messages("var n int;\nvar n float;\nn = 3;");
        assert_eq!(errors, vec!["n redefined. Previous definition on 1"]);
    }

    #[test]
    fn test_assign_to_const() {
        let errors = check_messages("const b = 42;\nb = 37;");
        assert_eq!(errors, vec!["Can't assign to b"]);
    }

    #[test]
    fn test_assign_to_type_name() {
        let errors = check_messages("int = 3;");
        assert_eq!(errors, vec!["Can't assign to int"]);
    }

    #[test]
    fn test_read_from_type_name() {
        let errors = check_messages("print bool;");
        assert_eq!(errors, vec!["Can't read from bool"]);
    }

    #[test]
    fn test_unknown_type_name() {
        let errors = check_messages("var x banana;");
        assert_eq!(errors, vec!["unknown type name banana"]);
    }

    #[test]
    fn test_declaration_type_mismatch() {
        let errors = check_messages("var a int = 4.5;");
        assert_eq!(errors, vec!["type error. int = float"]);
    }

    #[test]
    fn test_assignment_type_mismatch() {
        let errors = check_messages("var a int;\na = 4.5;");
        assert_eq!(errors, vec!["type error. int = float"]);
    }

    #[test]
    fn test_unsupported_char_addition() {
        let errors = check_messages("const c = 'a' + 'b';");
        assert_eq!(errors, vec!["Unsupported operation char + char"]);
    }

    #[test]
    fn test_unsupported_mixed_operands() {
        let errors = check_messages("var a int = 2;\nvar b float = 3.5;\nprint a + b;");
        assert_eq!(errors, vec!["Unsupported operation int + float"]);
    }

    #[test]
    fn test_logical_ops_normalize_spelling() {
        let errors = check_messages("print 1 && 2;");
        assert_eq!(errors, vec!["Unsupported operation int and int"]);

        let errors = check_messages("print 1.5 || 2.5;");
        assert_eq!(errors, vec!["Unsupported operation float or float"]);
    }

    #[test]
    fn test_not_normalizes_spelling() {
        let errors = check_messages("print !1;");
        assert_eq!(errors, vec!["Unsupported operation not int"]);
    }

    #[test]
    fn test_unary_minus_on_bool() {
        let errors = check_messages("print -true;");
        assert_eq!(errors, vec!["Unsupported operation - bool"]);
    }

    #[test]
    fn test_char_unary_ok() {
        let errors = check_messages("var c char = +'a';\nvar d char = -'b';");
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_bool_logic_ok() {
        let errors = check_messages("var t bool = true && false || !true;");
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_if_condition_must_be_bool() {
        let errors = check_messages("var x int = 1;\nif x { print x; } else { print x; }");
        assert_eq!(errors, vec!["if condition must be bool, not int"]);
    }

    #[test]
    fn test_while_condition_must_be_bool() {
        let errors = check_messages("while 1 { }");
        assert_eq!(errors, vec!["while condition must be bool, not int"]);
    }

    #[test]
    fn test_body_checked_despite_bad_condition() {
        let errors = check_messages("if 1 { print undefined_name; }");
        assert_eq!(
            errors,
            vec!["if condition must be bool, not int", "undefined_name undefined"]
        );
    }

    #[test]
    fn test_error_type_suppresses_operator_cascade() {
        // `z` is undefined; the additions above it stay silent
        let errors = check_messages("print z + 1 + 2 + 3;");
        assert_eq!(errors, vec!["z undefined"]);
    }

    #[test]
    fn test_error_type_suppresses_declaration_cascade() {
        let errors = check_messages("const c = 'a' + 'b';\nvar d int = c;");
        assert_eq!(errors, vec!["Unsupported operation char + char"]);
    }

    #[test]
    fn test_error_type_suppresses_condition_cascade() {
        let errors = check_messages("if z { }");
        assert_eq!(errors, vec!["z undefined"]);
    }

    #[test]
    fn test_usage_tags() {
        let (context, errors, ast) = check_source("var n int;\nn = 1;\nprint n;");
        assert!(errors.is_empty());
        match (&ast[1], &ast[2]) {
            (Stmt::Assign(assign), Stmt::Print(print)) => {
                assert_eq!(context.usage_of(assign.location.id), Some(Usage::Write));
                match &print.value {
                    Expr::Read(read) => {
                        assert_eq!(context.usage_of(read.location.id), Some(Usage::Read));
                    }
                    other => panic!("unexpected {other:?}"),
                }
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_checking_is_idempotent() {
        let source = "var a int = 1;\na = 'x';\nprint b;\nif a { }";
        let handler = Handler::new();
        let ast = parse(source, &handler);
        let registry = TypeRegistry::new();

        let first = Handler::new();
        check(&ast, &registry, &first);
        let second = Handler::new();
        check(&ast, &registry, &second);

        assert_eq!(first.diagnostics(), second.diagnostics());
        assert!(first.error_count() > 0);
    }

    #[test]
    fn test_diagnostics_in_source_order() {
        let handler = Handler::new();
        let ast = parse("print a;\nprint b;\nprint c;", &handler);
        let registry = TypeRegistry::new();
        check(&ast, &registry, &handler);
        let lines: Vec<u32> = handler.diagnostics().iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![1, 2, 3]);
    }
}
