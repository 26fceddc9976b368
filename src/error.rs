//! Error types for csgraph.
//!
//! This module provides a unified error type [`CsgError`]. Parsing can only
//! fail with [`CsgError::SyntaxError`]; the remaining variants belong to the
//! front ends (CLI file loading, framing output).

use thiserror::Error;

/// Result type alias using [`CsgError`].
pub type Result<T> = std::result::Result<T, CsgError>;

/// Unified error type for all csgraph operations.
#[derive(Error, Debug)]
pub enum CsgError {
    // ============ DSL Errors ============
    /// Any grammar violation: unexpected token, unterminated block,
    /// malformed expression, missing arguments, duplicate instrument id.
    #[error("Syntax error at line {line}, column {column}: {message}")]
    SyntaxError {
        line: usize,
        column: usize,
        message: String,
    },

    // ============ I/O Errors ============
    /// Error reading a score file
    #[error("Failed to read score file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error writing framing or formatted output
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

impl CsgError {
    /// Create a syntax error
    pub fn syntax(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::SyntaxError {
            line,
            column,
            message: message.into(),
        }
    }

    /// Whether this error is a grammar violation.
    pub fn is_syntax_error(&self) -> bool {
        matches!(self, Self::SyntaxError { .. })
    }

    /// Source line of a syntax error.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::SyntaxError { line, .. } => Some(*line),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_display() {
        let err = CsgError::syntax(3, 7, "expected 'end'");
        assert!(err.is_syntax_error());
        assert_eq!(err.line(), Some(3));
        assert_eq!(
            err.to_string(),
            "Syntax error at line 3, column 7: expected 'end'"
        );
    }

    #[test]
    fn test_io_error_is_not_syntax() {
        let err: CsgError = std::io::Error::new(std::io::ErrorKind::Other, "closed").into();
        assert!(!err.is_syntax_error());
        assert_eq!(err.line(), None);
    }
}
