//! Error codes for the Curlew diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Grammar errors
//! - `E2xx` - Tree building errors
//! - `E3xx` - Traversal contract violations

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unexpected character.
    ///
    /// A character was encountered inside a tag that starts no token.
    E001,

    /// Unterminated comment.
    ///
    /// A `{{!` or `{{!--` comment was never closed.
    E002,

    /// Unterminated string literal.
    ///
    /// A string was opened with a quote but never closed.
    E003,

    /// Unterminated raw block.
    ///
    /// A `{{{{name}}}}` raw block has no matching `{{{{/name}}}}`.
    E004,

    // =========================================================================
    // Grammar Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    ///
    /// The parser encountered a token it did not expect at this position.
    E100,

    /// Incomplete input.
    ///
    /// The input ended before a complete construct was parsed.
    E101,

    // =========================================================================
    // Tree Building Errors (E2xx)
    // =========================================================================
    /// Invalid path.
    ///
    /// `this`, `.` or `..` appeared after a regular path segment.
    E200,

    /// Mismatched close tag.
    ///
    /// A block was closed with a different name than it was opened with.
    E201,

    /// Block open is not a path.
    ///
    /// A block, raw block or partial block was opened with a literal or
    /// sub-expression where a path is required.
    E202,

    /// Inverse section on a decorator block.
    E203,

    /// Malformed else chain.
    ///
    /// An `{{else ...}}` continuation did not produce a block statement.
    E204,

    // =========================================================================
    // Traversal Errors (E3xx)
    // =========================================================================
    /// A visitor removed a required child.
    E300,

    /// A visitor returned a node of the wrong kind.
    E301,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            // Lexer errors
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            // Grammar errors
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            // Tree building errors
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
            // Traversal errors
            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unexpected character",
            ErrorCode::E002 => "unterminated comment",
            ErrorCode::E003 => "unterminated string literal",
            ErrorCode::E004 => "unterminated raw block",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E200 => "invalid path",
            ErrorCode::E201 => "mismatched close tag",
            ErrorCode::E202 => "block open is not a path",
            ErrorCode::E203 => "inverse section on decorator",
            ErrorCode::E204 => "malformed else chain",
            ErrorCode::E300 => "required child removed",
            ErrorCode::E301 => "unexpected visitor return",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
