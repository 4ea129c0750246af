//! Lexical analysis for Quark
//!
//! Converts source text into a flat stream of word, string and bracket tokens.

mod sexpr_scanner;
mod token;

pub use sexpr_scanner::SExprScanner;
pub use token::{Token, TokenKind};
