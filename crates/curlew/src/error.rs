//! Error types for Curlew operations.
//!
//! This module provides the main error type [`CurlewError`] which wraps
//! the error conditions that can occur while loading and parsing templates.

use std::io;

use thiserror::Error;

use curlew_parser::error::{Diagnostic, ParseError};

/// The main error type for Curlew operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the template source next to the diagnostics so
/// that their line/column locations can be rendered as source snippets.
#[derive(Debug, Error)]
pub enum CurlewError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CurlewError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }

    /// The parser diagnostics carried by this error. Empty for I/O and
    /// configuration failures.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::Parse { err, .. } => err.diagnostics(),
            Self::Io(_) | Self::Config(_) => &[],
        }
    }
}
