//! gonec-lex - Lexical analyzer for the Gone language.
//!
//! Transforms source text into a stream of tokens with line numbers.
//! Keywords, identifiers, integer/float/char literals, the operator set,
//! and `//` line comments are recognized here; anything else is reported
//! as a lexical error and dropped so that scanning continues.

mod cursor;
mod lexer;
mod token;

pub use cursor::Cursor;
pub use lexer::{tokenize, Lexer};
pub use token::{keyword_from_ident, Token, TokenWithSpan};
