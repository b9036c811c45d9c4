//! Lexer for Gone source code.
//!
//! Transforms source text into a token stream ending in [`Token::Eof`].
//! Lexical errors are reported to the handler and the offending input is
//! dropped, so lexing always runs to the end of the file.

use gonec_util::{Handler, Span};

use crate::cursor::Cursor;
use crate::token::{keyword_from_ident, Token, TokenWithSpan};

/// The Gone lexer.
pub struct Lexer<'a> {
    /// Character cursor over the source.
    cursor: Cursor<'a>,

    /// Diagnostic sink for lexical errors.
    handler: &'a Handler,

    /// Start position of the current token.
    token_start: usize,

    /// Start line of the current token.
    token_start_line: u32,

    /// Start column of the current token.
    token_start_column: u32,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over `source`, reporting errors to `handler`.
    pub fn new(source: &'a str, handler: &'a Handler) -> Self {
        Self {
            cursor: Cursor::new(source),
            handler,
            token_start: 0,
            token_start_line: 1,
            token_start_column: 1,
        }
    }

    /// Return the next token and its span.
    ///
    /// Skips whitespace and `//` comments. On a lexical error the
    /// offending characters are consumed and scanning continues, so this
    /// never returns an error token.
    pub fn next_token(&mut self) -> TokenWithSpan {
        loop {
            self.skip_whitespace_and_comments();

            self.token_start = self.cursor.position();
            self.token_start_line = self.cursor.line();
            self.token_start_column = self.cursor.column();

            if self.cursor.is_at_end() {
                return self.spanned(Token::Eof);
            }

            let token = match self.cursor.current_char() {
                '(' => {
                    self.cursor.advance();
                    Some(Token::LParen)
                }
                ')' => {
                    self.cursor.advance();
                    Some(Token::RParen)
                }
                '{' => {
                    self.cursor.advance();
                    Some(Token::LBrace)
                }
                '}' => {
                    self.cursor.advance();
                    Some(Token::RBrace)
                }
                ';' => {
                    self.cursor.advance();
                    Some(Token::Semicolon)
                }
                '+' => {
                    self.cursor.advance();
                    Some(Token::Plus)
                }
                '-' => {
                    self.cursor.advance();
                    Some(Token::Minus)
                }
                '*' => {
                    self.cursor.advance();
                    Some(Token::Star)
                }
                '/' => {
                    // Comments were consumed above, so this is division
                    self.cursor.advance();
                    Some(Token::Slash)
                }
                '=' => {
                    self.cursor.advance();
                    if self.cursor.current_char() == '=' {
                        self.cursor.advance();
                        Some(Token::EqEq)
                    } else {
                        Some(Token::Assign)
                    }
                }
                '!' => {
                    self.cursor.advance();
                    if self.cursor.current_char() == '=' {
                        self.cursor.advance();
                        Some(Token::NotEq)
                    } else {
                        Some(Token::Not)
                    }
                }
                '<' => {
                    self.cursor.advance();
                    if self.cursor.current_char() == '=' {
                        self.cursor.advance();
                        Some(Token::LtEq)
                    } else {
                        Some(Token::Lt)
                    }
                }
                '>' => {
                    self.cursor.advance();
                    if self.cursor.current_char() == '=' {
                        self.cursor.advance();
                        Some(Token::GtEq)
                    } else {
                        Some(Token::Gt)
                    }
                }
                '&' => {
                    if self.cursor.peek_char(1) == '&' {
                        self.cursor.advance();
                        self.cursor.advance();
                        Some(Token::AndAnd)
                    } else {
                        self.report_illegal_char('&');
                        self.cursor.advance();
                        None
                    }
                }
                '|' => {
                    if self.cursor.peek_char(1) == '|' {
                        self.cursor.advance();
                        self.cursor.advance();
                        Some(Token::OrOr)
                    } else {
                        self.report_illegal_char('|');
                        self.cursor.advance();
                        None
                    }
                }
                '\'' => self.lex_char(),
                c if c.is_ascii_digit() => self.lex_number(),
                c if is_ident_start(c) => Some(self.lex_identifier()),
                c => {
                    self.report_illegal_char(c);
                    self.cursor.advance();
                    None
                }
            };

            if let Some(token) = token {
                return self.spanned(token);
            }
        }
    }

    /// Lex an identifier or keyword.
    fn lex_identifier(&mut self) -> Token {
        while is_ident_continue(self.cursor.current_char()) {
            self.cursor.advance();
        }

        let text = self.cursor.slice_from(self.token_start);
        keyword_from_ident(text).unwrap_or_else(|| Token::Ident(gonec_util::Symbol::intern(text)))
    }

    /// Lex an integer or float literal.
    ///
    /// A float is a digit sequence with a single `.` and optional
    /// trailing digits (`4.` is a float, `.5` is not a number start).
    fn lex_number(&mut self) -> Option<Token> {
        while self.cursor.current_char().is_ascii_digit() {
            self.cursor.advance();
        }

        let is_float = self.cursor.current_char() == '.';
        if is_float {
            self.cursor.advance();
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }

        let text = self.cursor.slice_from(self.token_start);
        if is_float {
            match text.parse::<f64>() {
                Ok(value) => Some(Token::Float(value)),
                Err(_) => {
                    self.handler
                        .error(self.token_start_line, format!("bad float literal '{text}'"));
                    None
                }
            }
        } else {
            match text.parse::<i64>() {
                Ok(value) => Some(Token::Int(value)),
                Err(_) => {
                    self.handler.error(
                        self.token_start_line,
                        format!("bad integer literal '{text}'"),
                    );
                    None
                }
            }
        }
    }

    /// Lex a character literal, decoding escapes.
    ///
    /// Returns `None` after reporting if the literal is malformed; the
    /// consumed characters are dropped.
    fn lex_char(&mut self) -> Option<Token> {
        self.cursor.advance(); // opening quote

        if self.at_char_literal_end() {
            self.report_unterminated_char();
            return None;
        }

        let value = match self.cursor.advance() {
            '\\' => {
                if self.at_char_literal_end() {
                    self.report_unterminated_char();
                    return None;
                }
                let escape = self.cursor.advance();
                match decode_escape(escape) {
                    Some(value) => value,
                    None => {
                        self.report_illegal_char(escape);
                        self.skip_to_char_literal_end();
                        return None;
                    }
                }
            }
            c => c,
        };

        if self.cursor.current_char() == '\'' {
            self.cursor.advance();
            Some(Token::Char(value))
        } else {
            self.report_unterminated_char();
            self.skip_to_char_literal_end();
            None
        }
    }

    /// Whether the cursor sits where a char literal cannot continue.
    fn at_char_literal_end(&self) -> bool {
        self.cursor.is_at_end() || self.cursor.current_char() == '\n'
    }

    /// Consume up to and including a closing quote on the same line.
    fn skip_to_char_literal_end(&mut self) {
        while !self.at_char_literal_end() {
            if self.cursor.advance() == '\'' {
                break;
            }
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            let c = self.cursor.current_char();
            if c.is_whitespace() && !self.cursor.is_at_end() {
                self.cursor.advance();
            } else if c == '/' && self.cursor.peek_char(1) == '/' {
                while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
                    self.cursor.advance();
                }
            } else {
                break;
            }
        }
    }

    fn report_illegal_char(&self, c: char) {
        self.handler
            .error(self.cursor.line(), format!("illegal character '{c}'"));
    }

    fn report_unterminated_char(&self) {
        self.handler
            .error(self.token_start_line, "unterminated character constant");
    }

    fn spanned(&self, token: Token) -> TokenWithSpan {
        TokenWithSpan::new(
            token,
            Span::new(
                self.token_start,
                self.cursor.position(),
                self.token_start_line,
                self.token_start_column,
            ),
        )
    }
}

/// Lex an entire source string, excluding the trailing EOF token.
pub fn tokenize(source: &str, handler: &Handler) -> Vec<TokenWithSpan> {
    let mut lexer = Lexer::new(source, handler);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        if token.token == Token::Eof {
            break;
        }
        tokens.push(token);
    }
    tokens
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn decode_escape(c: char) -> Option<char> {
    match c {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '\\' => Some('\\'),
        '\'' => Some('\''),
        '0' => Some('\0'),
        _ => None,
    }
}
