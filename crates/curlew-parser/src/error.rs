//! Error and diagnostic system for the Curlew parser.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Labeled source locations for error context
//! - Severity levels
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with optional error code, source
//! locations, and help text. Diagnostics are wrapped in [`ParseError`] for
//! returning from the parse lifecycle (lexing, grammar, building, and
//! whitespace normalization).
//!
//! # Example
//!
//! ```
//! # use curlew_parser::error::{Diagnostic, ErrorCode};
//! # use curlew_parser::{LocInfo, SourceLocation};
//!
//! let loc = SourceLocation::new(
//!     None,
//!     LocInfo { first_line: 1, first_column: 0, last_line: 1, last_column: 7 },
//! );
//!
//! let diag = Diagnostic::error("foo doesn't match bar")
//!     .with_code(ErrorCode::E201)
//!     .with_label(loc, "opened here")
//!     .with_help("close the block with `{{/foo}}`");
//!
//! assert_eq!(diag.to_string(), "error[E201]: foo doesn't match bar - 1:0");
//! ```

mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use parse_error::Result;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::{Label, LabelKind};
pub use parse_error::ParseError;
pub use severity::Severity;
