use super::token::{Token, TokenKind};
use crate::error::{Error, Result};

/// A source character together with its original position
#[derive(Debug, Clone, Copy)]
struct SourceChar {
    ch: char,
    line: usize,
    column: usize,
}

/// Scanner for Quark S-expression syntax
///
/// Lines are trimmed and concatenated before scanning, so line breaks never
/// separate tokens. Positions still refer to the original text.
pub struct SExprScanner {
    /// Normalized source characters
    source: Vec<SourceChar>,
    /// Accumulated tokens
    tokens: Vec<Token>,
    /// Pending characters of the current word or string
    buffer: String,
    /// Position of the first buffered character
    buffer_start: (usize, usize),
    /// Inside a string literal
    in_string: bool,
    /// Position of the opening quote of the current string literal
    string_start: (usize, usize),
}

impl SExprScanner {
    /// Creates a new scanner from source code
    pub fn new(source: &str) -> Self {
        SExprScanner {
            source: normalize(source),
            tokens: Vec::new(),
            buffer: String::new(),
            buffer_start: (1, 1),
            in_string: false,
            string_start: (1, 1),
        }
    }

    /// Scans all tokens from source code and returns them as a vector
    pub fn scan_tokens(&mut self) -> Result<Vec<Token>> {
        self.tokens.clear();
        self.buffer.clear();
        self.in_string = false;

        let source = std::mem::take(&mut self.source);
        for &sc in &source {
            self.scan_char(sc);
        }
        self.source = source;

        if self.in_string {
            let (line, column) = self.string_start;
            return Err(Error::malformed(line, column, "unterminated string literal"));
        }
        self.flush(TokenKind::Word);

        Ok(std::mem::take(&mut self.tokens))
    }

    fn scan_char(&mut self, sc: SourceChar) {
        match sc.ch {
            c if TokenKind::is_bracket(c) && !self.in_string => {
                self.flush(TokenKind::Word);
                self.tokens.push(Token::new(
                    TokenKind::Bracket,
                    c.to_string(),
                    sc.line,
                    sc.column,
                ));
            }
            '"' => {
                self.push_char(sc);
                if self.in_string {
                    self.in_string = false;
                    self.flush(TokenKind::String);
                } else {
                    self.in_string = true;
                    self.string_start = (sc.line, sc.column);
                }
            }
            ' ' if self.in_string => self.push_char(sc),
            ' ' => self.flush(TokenKind::Word),
            _ => self.push_char(sc),
        }
    }

    fn push_char(&mut self, sc: SourceChar) {
        if self.buffer.is_empty() {
            self.buffer_start = (sc.line, sc.column);
        }
        self.buffer.push(sc.ch);
    }

    /// Emits the pending buffer as a token of `kind`; empty text is dropped
    fn flush(&mut self, kind: TokenKind) {
        let text = self.buffer.trim();
        if !text.is_empty() {
            let (line, column) = self.buffer_start;
            self.tokens
                .push(Token::new(kind, text.to_string(), line, column));
        }
        self.buffer.clear();
    }
}

/// Trims every line and joins them without separators
fn normalize(source: &str) -> Vec<SourceChar> {
    let mut chars = Vec::with_capacity(source.len());
    for (line_idx, raw_line) in source.split('\n').enumerate() {
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        let leading = line.chars().take_while(|c| c.is_whitespace()).count();
        for (offset, ch) in line.trim().chars().enumerate() {
            chars.push(SourceChar {
                ch,
                line: line_idx + 1,
                column: leading + offset + 1,
            });
        }
    }
    chars
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexemes(source: &str) -> Vec<String> {
        let mut scanner = SExprScanner::new(source);
        scanner
            .scan_tokens()
            .unwrap()
            .into_iter()
            .map(|t| t.lexeme)
            .collect()
    }

    #[test]
    fn test_simple_sexpr() {
        let source = "(+ 1 2)";
        let mut scanner = SExprScanner::new(source);
        let tokens = scanner.scan_tokens().unwrap();

        assert_eq!(tokens.len(), 5); // ( + 1 2 )
        assert_eq!(tokens[0].kind, TokenKind::Bracket);
        assert_eq!(tokens[1].kind, TokenKind::Word);
        assert_eq!(tokens[1].lexeme, "+");
        assert_eq!(tokens[2].lexeme, "1");
        assert_eq!(tokens[3].lexeme, "2");
        assert_eq!(tokens[4].kind, TokenKind::Bracket);
        assert_eq!(tokens[4].lexeme, ")");
    }

    #[test]
    fn test_string_keeps_spaces_and_brackets() {
        let source = r#"(print "a (b) c")"#;
        let mut scanner = SExprScanner::new(source);
        let tokens = scanner.scan_tokens().unwrap();

        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[2].lexeme, "\"a (b) c\"");
    }

    #[test]
    fn test_lines_are_trimmed_and_joined() {
        // No separator survives between lines
        assert_eq!(lexemes("(+ a\n   b)"), vec!["(", "+", "ab", ")"]);
        assert_eq!(lexemes("(let x 1)\r\n  x"), vec!["(", "let", "x", "1", ")", "x"]);
    }

    #[test]
    fn test_braces_are_brackets() {
        assert_eq!(lexemes("{a}"), vec!["{", "a", "}"]);
    }

    #[test]
    fn test_repeated_spaces_produce_no_empty_tokens() {
        assert_eq!(lexemes("(  +   1    2 )"), vec!["(", "+", "1", "2", ")"]);
        assert!(lexemes("   ").is_empty());
        assert!(lexemes("").is_empty());
    }

    #[test]
    fn test_trailing_word_is_kept() {
        assert_eq!(lexemes("x"), vec!["x"]);
    }

    #[test]
    fn test_token_positions_refer_to_original_text() {
        let mut scanner = SExprScanner::new("(let x 1)\n    (print x)");
        let tokens = scanner.scan_tokens().unwrap();

        let print = tokens.iter().find(|t| t.lexeme == "print").unwrap();
        assert_eq!((print.line, print.column), (2, 6));
    }

    #[test]
    fn test_unterminated_string() {
        let mut scanner = SExprScanner::new("(print \"oops)");
        let err = scanner.scan_tokens().unwrap_err();

        assert!(matches!(
            err,
            Error::MalformedSource {
                line: 1,
                column: 8,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_string_literal() {
        assert_eq!(lexemes("(let s \"\")"), vec!["(", "let", "s", "\"\"", ")"]);
    }

    #[test]
    fn test_rescanning_yields_same_tokens() {
        let mut scanner = SExprScanner::new("(let x \"a b\") x");
        let first = scanner.scan_tokens().unwrap();
        let second = scanner.scan_tokens().unwrap();

        assert_eq!(first.len(), 6);
        assert_eq!(first, second);
    }
}
