use serde::{Deserialize, Serialize};

/// A single token from the source code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// The type of token
    pub kind: TokenKind,
    /// Original text of the token (string tokens keep both quotes)
    pub lexeme: String,
    /// Line number where token appears (1-indexed)
    pub line: usize,
    /// Column number where token starts (1-indexed)
    pub column: usize,
}

impl Token {
    /// Creates a new token with the given properties
    pub fn new(kind: TokenKind, lexeme: String, line: usize, column: usize) -> Self {
        Token {
            kind,
            lexeme,
            line,
            column,
        }
    }

    /// True for `(` and `{`
    pub fn is_opening(&self) -> bool {
        self.kind == TokenKind::Bracket && matches!(self.lexeme.as_str(), "(" | "{")
    }

    /// True for `)` and `}`
    pub fn is_closing(&self) -> bool {
        self.kind == TokenKind::Bracket && matches!(self.lexeme.as_str(), ")" | "}")
    }
}

/// All possible token types in Quark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    /// Bare word: identifier, keyword, operator or number text
    Word,
    /// Double-quoted string literal, quotes included
    String,
    /// One of `(`, `)`, `{`, `}`
    Bracket,
}

impl TokenKind {
    /// Returns true if `c` is a structural bracket character
    pub fn is_bracket(c: char) -> bool {
        matches!(c, '(' | ')' | '{' | '}')
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.lexeme)
    }
}
