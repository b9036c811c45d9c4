//! Expression parsing using Pratt parsing (top-down operator precedence).
//!
//! # Operator precedence (lowest to highest)
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | 1 | `\|\|` | Left |
//! | 2 | `&&` | Left |
//! | 3 | `==`, `!=`, `<`, `<=`, `>`, `>=` | Left |
//! | 4 | `+`, `-` | Left |
//! | 5 | `*`, `/` | Left |
//! | 6 | unary `!`, `+`, `-` | Right (prefix) |
//!
//! Parentheses override precedence without materializing a node.

use crate::ast::*;
use crate::Parser;
use gonec_lex::Token;

/// Binding power levels; higher numbers bind tighter.
/// Left-associative operators use `right = left + 1`.
mod bp {
    pub const LOGICAL_OR: (u8, u8) = (1, 2);
    pub const LOGICAL_AND: (u8, u8) = (3, 4);
    pub const COMPARISON: (u8, u8) = (5, 6);
    pub const ADDITIVE: (u8, u8) = (7, 8);
    pub const MULTIPLICATIVE: (u8, u8) = (9, 10);

    /// Prefix operators bind tighter than any infix operator.
    pub const PREFIX: u8 = 11;
}

impl<'a> Parser<'a> {
    /// Parse a complete expression.
    pub(crate) fn parse_expr(&mut self) -> Option<Expr> {
        self.parse_expr_with_min_bp(0)
    }

    /// Pratt parser core: parse an expression consuming only operators
    /// whose left binding power is at least `min_bp`.
    fn parse_expr_with_min_bp(&mut self, min_bp: u8) -> Option<Expr> {
        let mut lhs = self.parse_prefix()?;

        loop {
            let (_, rbp) = match infix_binding_power(self.current_token()) {
                Some(bp) if bp.0 >= min_bp => bp,
                _ => break,
            };

            let op_token = self.current_token();
            self.advance();

            let rhs = self.parse_expr_with_min_bp(rbp)?;
            let span = lhs.span();
            lhs = Expr::Binary(BinaryExpr {
                id: self.next_id(),
                op: token_to_binop(op_token),
                left: Box::new(lhs),
                right: Box::new(rhs),
                span,
            });
        }

        Some(lhs)
    }

    /// Parse a prefix expression: an atom or a unary operator.
    fn parse_prefix(&mut self) -> Option<Expr> {
        let span = self.current_span();

        match self.current_token() {
            // Prefix operators
            Token::Plus => self.parse_unary(UnOp::Pos),
            Token::Minus => self.parse_unary(UnOp::Neg),
            Token::Not => self.parse_unary(UnOp::Not),

            // Literals
            Token::Int(value) => {
                self.advance();
                Some(Expr::Int(IntLiteral {
                    id: self.next_id(),
                    value,
                    span,
                }))
            }
            Token::Float(value) => {
                self.advance();
                Some(Expr::Float(FloatLiteral {
                    id: self.next_id(),
                    value,
                    span,
                }))
            }
            Token::Char(value) => {
                self.advance();
                Some(Expr::Char(CharLiteral {
                    id: self.next_id(),
                    value,
                    span,
                }))
            }
            Token::True => {
                self.advance();
                Some(Expr::Bool(BoolLiteral {
                    id: self.next_id(),
                    value: true,
                    span,
                }))
            }
            Token::False => {
                self.advance();
                Some(Expr::Bool(BoolLiteral {
                    id: self.next_id(),
                    value: false,
                    span,
                }))
            }

            // A location read as an rvalue
            Token::Ident(_) => {
                let location = self.parse_location()?;
                Some(Expr::Read(ReadValue {
                    id: self.next_id(),
                    location,
                    span,
                }))
            }

            // Grouping; no AST node materialized
            Token::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Some(inner)
            }

            _ => {
                self.syntax_error();
                None
            }
        }
    }

    fn parse_unary(&mut self, op: UnOp) -> Option<Expr> {
        let span = self.current_span();
        self.advance();

        let operand = self.parse_expr_with_min_bp(bp::PREFIX)?;
        Some(Expr::Unary(UnaryExpr {
            id: self.next_id(),
            op,
            operand: Box::new(operand),
            span,
        }))
    }
}

/// Binding powers for infix operators, `None` for non-operators.
fn infix_binding_power(token: Token) -> Option<(u8, u8)> {
    match token {
        Token::OrOr => Some(bp::LOGICAL_OR),
        Token::AndAnd => Some(bp::LOGICAL_AND),
        Token::EqEq | Token::NotEq | Token::Lt | Token::LtEq | Token::Gt | Token::GtEq => {
            Some(bp::COMPARISON)
        }
        Token::Plus | Token::Minus => Some(bp::ADDITIVE),
        Token::Star | Token::Slash => Some(bp::MULTIPLICATIVE),
        _ => None,
    }
}

fn token_to_binop(token: Token) -> BinOp {
    match token {
        Token::Plus => BinOp::Add,
        Token::Minus => BinOp::Sub,
        Token::Star => BinOp::Mul,
        Token::Slash => BinOp::Div,
        Token::EqEq => BinOp::Eq,
        Token::NotEq => BinOp::Ne,
        Token::Lt => BinOp::Lt,
        Token::LtEq => BinOp::Le,
        Token::Gt => BinOp::Gt,
        Token::GtEq => BinOp::Ge,
        Token::AndAnd => BinOp::And,
        Token::OrOr => BinOp::Or,
        // infix_binding_power() gates which tokens reach here
        _ => unreachable!("not an infix operator: {token:?}"),
    }
}
