//! # Quark - an embeddable interpreter for a minimal Lisp-like language
//!
//! Quark programs are parenthesis-delimited S-expressions evaluated by a
//! tree-walking interpreter with a dynamic-scope frame stack.
//!
//! ## Quick Start
//!
//! ```rust
//! use quark::{Evaluator, Parser, Scanner, Value};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let code = r#"
//!     (let fact (fn (n) (
//!       (if (<= n 1)
//!         (return 1)
//!         (return (* n (fact (- n 1)))))
//!     )))
//!     (fact 5)
//! "#;
//!
//! // Tokenize (scan)
//! let mut scanner = Scanner::new(code);
//! let tokens = scanner.scan_tokens()?;
//!
//! // Build the tree
//! let mut parser = Parser::new(tokens);
//! let program = parser.parse()?;
//!
//! // Execute
//! let mut evaluator = Evaluator::new();
//! let result = evaluator.execute(&program)?;
//!
//! assert_eq!(result, Value::Integer(120));
//! # Ok(())
//! # }
//! ```
//!
//! Or in one step:
//!
//! ```rust
//! assert_eq!(quark::run("(+ 1 2)").unwrap(), quark::Value::Integer(3));
//! ```
//!
//! ## Language Overview
//!
//! - **Literals**: integers `42`, strings `"text"` (no escapes), the word `none`
//! - **Forms**: `let`, `set`, `fn`, `if`, `return`, `while`, `list`, `index`,
//!   `print`, `import`
//! - **Operators**: `+ - * /` and `< > <= >= = !=`
//! - A block whose members are all blocks is a body: it gets its own frame
//!   and yields `none` unless a `return` fires inside it.
//!
//! Line breaks are removed before scanning, so `(+ a` followed by a line
//! `b)` reads as `(+ ab)`.
//!
//! ## Architecture
//!
//! ```text
//! Source Code → Scanner → Tokens → Parser → Block tree → Evaluator → Value
//! ```
//!
//! - [`Scanner`] - Tokenizes source code into tokens
//! - [`Parser`] - Builds the nested block tree
//! - [`Evaluator`] - Executes the tree and returns results
//! - [`Value`] / [`ValueCell`] - Runtime values and the shared objects holding them
//! - [`FrameStack`] - Variable storage with dynamic scoping

/// Version of the Quark interpreter
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod lexer;
pub mod parser;
pub mod runtime;

// Re-export main types
pub use error::{Error, ErrorSeverity, Result};
pub use lexer::{SExprScanner, Token, TokenKind};
pub use parser::{Block, Element, Node, SExprParser};
pub use runtime::{
    CapturedOutput, EvaluatorConfig, Flow, FrameStack, QuarkEvaluator, RunOutcome, Value,
    ValueCell, ValueSnapshot,
};

/// Type alias for the S-expression scanner (lexer).
/// Converts raw source text into tokens for the parser.
pub type Scanner = SExprScanner;

/// Type alias for the S-expression tree builder.
/// Converts tokens into the nested block tree.
pub type Parser = SExprParser;

/// Type alias for the tree-walking evaluator.
/// Executes the tree and produces runtime values.
pub type Evaluator = QuarkEvaluator;

/// Tokenizes source text
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    SExprScanner::new(source).scan_tokens()
}

/// Tokenizes and builds the tree for source text
pub fn parse(source: &str) -> Result<Block> {
    SExprParser::new(tokenize(source)?).parse()
}

/// Runs source text with a fresh evaluator printing to stdout
pub fn run(source: &str) -> Result<Value> {
    QuarkEvaluator::new().eval_str(source)
}
