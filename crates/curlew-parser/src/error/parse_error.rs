//! The error returned by the parse entry points.

use std::fmt;

use crate::{
    error::{Diagnostic, ErrorCode},
    visit_mut::VisitError,
};

/// Result of a single builder or grammar step.
pub type Result<T> = std::result::Result<T, Diagnostic>;

/// One or more diagnostics from lexing, parsing, building or whitespace
/// normalization.
#[derive(Debug)]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Whether parsing failed only because the input stopped early: an
    /// unclosed block, comment, string or raw block.
    ///
    /// An editor can use this to keep reading instead of reporting.
    pub fn is_incomplete(&self) -> bool {
        !self.diagnostics.is_empty()
            && self.diagnostics.iter().all(|diag| {
                matches!(
                    diag.code(),
                    Some(ErrorCode::E002 | ErrorCode::E003 | ErrorCode::E004 | ErrorCode::E101)
                )
            })
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((first, rest)) = self.diagnostics.split_first() else {
            return f.write_str("template could not be parsed");
        };
        write!(f, "{first}")?;
        if !rest.is_empty() {
            write!(f, " (+{} more)", rest.len())?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self::new(vec![diagnostic])
    }
}

impl From<Vec<Diagnostic>> for ParseError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self::new(diagnostics)
    }
}

impl From<VisitError> for ParseError {
    fn from(err: VisitError) -> Self {
        Diagnostic::from(err).into()
    }
}
