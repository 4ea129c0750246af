//! Error types for the Quark interpreter

use thiserror::Error;

/// Quark interpreter errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Source errors
    /// Source text ended in the middle of a construct
    ///
    /// **Triggered by:** An unterminated string literal or an unclosed bracket
    /// **Example:** `(print "hello` or `(let x (list 1 2)`
    #[error("Malformed source at line {line}, column {column}: {message}")]
    MalformedSource {
        /// Line of the construct that was left open (1-indexed)
        line: usize,
        /// Column of the construct that was left open (1-indexed)
        column: usize,
        /// Error description
        message: String,
    },

    /// Closing bracket with no open ancestor
    ///
    /// **Triggered by:** More closing brackets than opening ones
    /// **Example:** `(+ 1 2))`
    #[error("Unmatched '{bracket}' at line {line}, column {column}")]
    StructuralMismatch {
        /// Line of the stray bracket (1-indexed)
        line: usize,
        /// Column of the stray bracket (1-indexed)
        column: usize,
        /// The bracket character
        bracket: char,
    },

    // Runtime errors
    /// Mutation of a name that was never declared
    ///
    /// **Triggered by:** `set` on a name no active frame binds
    /// **Example:** `(set y 2)` without a prior `(let y ...)`
    /// **Prevention:** Declare with `(let y value)` first
    #[error("Variable {name} does not exist")]
    UndefinedVariable {
        /// Variable name
        name: String,
    },

    /// `let`/`set` target that is neither a name nor an index form
    #[error("Invalid assignment target: {target}")]
    InvalidAssignmentTarget {
        /// Rendered target expression
        target: String,
    },

    /// Formal parameter that is not a bare word
    #[error("Invalid function parameter: {name}")]
    InvalidParameter {
        /// Rendered parameter
        name: String,
    },

    /// Form head that is neither keyword, bound name, nor literal
    ///
    /// **Triggered by:** Calling an unbound name
    /// **Example:** `(frobnicate 1 2)`
    #[error("Can't recognize this expression: {expression}")]
    UnrecognizedExpression {
        /// Rendered head of the form
        expression: String,
    },

    // Resource errors
    /// Too many loop iterations
    #[error("Too many iterations (limit: {limit})")]
    TooManyIterations {
        /// Maximum allowed iterations
        limit: usize,
    },

    // Host errors
    /// Writing `print` output to the sink failed
    #[error("Output error: {message}")]
    OutputFailed {
        /// Error message
        message: String,
    },

    /// Configuration could not be loaded
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Error message
        message: String,
    },

    /// The background task running a program did not complete
    #[error("Host task failed: {message}")]
    HostTaskFailed {
        /// Error message
        message: String,
    },
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// The program text itself is broken; re-running cannot help
    Fatal,
    /// The program ran and failed; a host may report and continue
    Recoverable,
}

impl Error {
    /// Create a malformed-source error at a position
    pub fn malformed(line: usize, column: usize, msg: impl Into<String>) -> Self {
        Error::MalformedSource {
            line,
            column,
            message: msg.into(),
        }
    }

    /// Classify error severity
    pub fn classify(&self) -> ErrorSeverity {
        match self {
            Error::MalformedSource { .. } => ErrorSeverity::Fatal,
            Error::StructuralMismatch { .. } => ErrorSeverity::Fatal,
            Error::InvalidConfig { .. } => ErrorSeverity::Fatal,
            _ => ErrorSeverity::Recoverable,
        }
    }
}

/// Result type for Quark operations
pub type Result<T> = std::result::Result<T, Error>;
