//! Compiler diagnostics.
//!
//! Every failure the grammar compiler can surface is rendered the same way:
//! `file:line: message`. A [`CompileError`] carries those three pieces and
//! implements [`std::error::Error`], so it can cross crate boundaries with
//! `?` and still print exactly the line the grammar author needs to look at.
//!
//! # Example
//!
//! ```
//! use weft_base::CompileError;
//!
//! let err = CompileError::new("numbers.grm", 12, "Undefined symbol: digit");
//! assert_eq!(err.to_string(), "numbers.grm:12: Undefined symbol: digit");
//! ```

use std::fmt;

/// A compilation failure pinned to a source file and line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// Grammar file the failure was detected in.
    pub file: String,
    /// 1-based source line; 0 when no line applies (e.g. I/O failures).
    pub line: u32,
    /// Human-readable description.
    pub message: String,
}

impl CompileError {
    /// Creates an error for the given file and line.
    pub fn new(file: impl Into<String>, line: u32, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// Creates an error with no meaningful source line, such as a missing
    /// input file.
    pub fn file_level(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(file, 0, message)
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            write!(f, "{}: {}", self.file, self.message)
        } else {
            write!(f, "{}:{}: {}", self.file, self.line, self.message)
        }
    }
}

impl std::error::Error for CompileError {}

/// Alias for `std::result::Result<T, CompileError>`.
pub type Result<T> = std::result::Result<T, CompileError>;
