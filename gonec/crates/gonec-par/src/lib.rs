//! gonec-par - Parser for the Gone language.
//!
//! A recursive descent parser over the lexer's token stream. Statements
//! dispatch on their leading token; expressions use Pratt parsing (see
//! `expr.rs`). On a syntax error the parser reports the offending
//! token's line and lexeme and terminates the current parse; the driver
//! halts the pipeline when any parse error was recorded.

pub mod ast;
mod expr;

pub use ast::*;

use gonec_lex::{tokenize, Token, TokenWithSpan};
use gonec_util::{Handler, NodeId, Span};

/// Parse a source string into an AST.
///
/// Lexical and syntax errors land in `handler`; the returned tree is
/// only meaningful when no errors were reported.
pub fn parse(source: &str, handler: &Handler) -> Ast {
    let tokens = tokenize(source, handler);
    Parser::new(tokens, handler).parse()
}

/// Recursive descent parser.
pub struct Parser<'a> {
    /// Token stream from the lexer
    tokens: Vec<TokenWithSpan>,

    /// Current position in the token stream
    position: usize,

    /// Error handler
    handler: &'a Handler,

    /// Next node id to issue
    next_node_id: u32,
}

impl<'a> Parser<'a> {
    /// Create a parser from tokens.
    pub fn new(tokens: Vec<TokenWithSpan>, handler: &'a Handler) -> Self {
        Self {
            tokens,
            position: 0,
            handler,
            next_node_id: 0,
        }
    }

    /// Parse a complete program.
    ///
    /// A program is a possibly-empty list of statements. The first
    /// syntax error terminates the parse.
    pub fn parse(&mut self) -> Ast {
        let mut stmts = Vec::new();

        while !self.is_at_end() {
            match self.parse_stmt() {
                Some(stmt) => stmts.push(stmt),
                None => break,
            }
        }

        stmts
    }

    /// Parse a single statement.
    fn parse_stmt(&mut self) -> Option<Stmt> {
        match self.current_token() {
            Token::Const => self.parse_const_decl(),
            Token::Var => self.parse_var_decl(),
            Token::Print => self.parse_print_stmt(),
            Token::If => self.parse_if_stmt(),
            Token::While => self.parse_while_stmt(),
            Token::Ident(_) => self.parse_assignment(),
            _ => {
                self.syntax_error();
                None
            }
        }
    }

    /// `const ID = expression ;`
    fn parse_const_decl(&mut self) -> Option<Stmt> {
        let span = self.current_span();
        self.expect(Token::Const)?;

        let name = self.expect_ident()?;
        self.expect(Token::Assign)?;
        let value = self.parse_expr()?;
        self.expect(Token::Semicolon)?;

        Some(Stmt::Const(ConstDecl { name, value, span }))
    }

    /// `var ID datatype [= expression] ;`
    fn parse_var_decl(&mut self) -> Option<Stmt> {
        let span = self.current_span();
        self.expect(Token::Var)?;

        let name = self.expect_ident()?;

        let type_span = self.current_span();
        let type_name = self.expect_ident()?;
        let datatype = SimpleType {
            id: self.next_id(),
            name: type_name,
            span: type_span,
        };

        let value = if self.match_token(Token::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };

        self.expect(Token::Semicolon)?;

        Some(Stmt::Var(VarDecl {
            name,
            datatype,
            value,
            span,
        }))
    }

    /// `location = expression ;`
    fn parse_assignment(&mut self) -> Option<Stmt> {
        let span = self.current_span();
        let location = self.parse_location()?;

        self.expect(Token::Assign)?;
        let value = self.parse_expr()?;
        self.expect(Token::Semicolon)?;

        Some(Stmt::Assign(Assignment {
            location,
            value,
            span,
        }))
    }

    /// `print expression ;`
    fn parse_print_stmt(&mut self) -> Option<Stmt> {
        let span = self.current_span();
        self.expect(Token::Print)?;

        let value = self.parse_expr()?;
        self.expect(Token::Semicolon)?;

        Some(Stmt::Print(PrintStmt { value, span }))
    }

    /// `if expression { statements } [else { statements }]`
    ///
    /// A missing else stores an empty else-body.
    fn parse_if_stmt(&mut self) -> Option<Stmt> {
        let span = self.current_span();
        self.expect(Token::If)?;

        let test = self.parse_expr()?;
        let body = self.parse_block()?;

        let orelse = if self.match_token(Token::Else) {
            self.parse_block()?
        } else {
            Vec::new()
        };

        Some(Stmt::If(IfStmt {
            test,
            body,
            orelse,
            span,
        }))
    }

    /// `while expression { statements }`
    fn parse_while_stmt(&mut self) -> Option<Stmt> {
        let span = self.current_span();
        self.expect(Token::While)?;

        let test = self.parse_expr()?;
        let body = self.parse_block()?;

        Some(Stmt::While(WhileStmt { test, body, span }))
    }

    /// `{ statements }` - the list may be empty.
    fn parse_block(&mut self) -> Option<Vec<Stmt>> {
        self.expect(Token::LBrace)?;

        let mut stmts = Vec::new();
        while !self.is_at_end() && self.current_token() != Token::RBrace {
            stmts.push(self.parse_stmt()?);
        }

        self.expect(Token::RBrace)?;
        Some(stmts)
    }

    /// Parse a bare location (an identifier).
    pub(crate) fn parse_location(&mut self) -> Option<SimpleLocation> {
        let span = self.current_span();
        let name = self.expect_ident()?;
        Some(SimpleLocation {
            id: self.next_id(),
            name,
            span,
        })
    }

    // ========================================================================
    // Token stream helpers
    // ========================================================================

    pub(crate) fn current_token(&self) -> Token {
        self.tokens
            .get(self.position)
            .map(|t| t.token)
            .unwrap_or(Token::Eof)
    }

    pub(crate) fn current_span(&self) -> Span {
        self.tokens
            .get(self.position)
            .map(|t| t.span)
            .unwrap_or_else(|| self.last_span())
    }

    /// Span of the last token, for errors at end of input.
    fn last_span(&self) -> Span {
        self.tokens.last().map(|t| t.span).unwrap_or(Span::DUMMY)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    pub(crate) fn advance(&mut self) {
        if !self.is_at_end() {
            self.position += 1;
        }
    }

    /// Consume the expected token or report a syntax error.
    pub(crate) fn expect(&mut self, expected: Token) -> Option<()> {
        if self.current_token() == expected {
            self.advance();
            Some(())
        } else {
            self.syntax_error();
            None
        }
    }

    /// Consume an identifier token, returning its symbol.
    fn expect_ident(&mut self) -> Option<gonec_util::Symbol> {
        match self.current_token() {
            Token::Ident(name) => {
                self.advance();
                Some(name)
            }
            _ => {
                self.syntax_error();
                None
            }
        }
    }

    /// Consume the token if it matches.
    pub(crate) fn match_token(&mut self, expected: Token) -> bool {
        if self.current_token() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Issue the next node id.
    pub(crate) fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    /// Report a syntax error at the current token.
    pub(crate) fn syntax_error(&self) {
        if self.is_at_end() {
            self.handler
                .error(self.last_span().line, "Syntax error. No more input.");
        } else {
            let token = self.current_token();
            self.handler.error(
                self.current_span().line,
                format!("Syntax error in input at token '{token}'"),
            );
        }
    }
}
