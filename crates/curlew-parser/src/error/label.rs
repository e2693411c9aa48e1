//! Source locations attached to a diagnostic.

use crate::span::SourceLocation;

/// Whether a label marks the fault itself or context around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// The offending construct, such as the unmatched block opener.
    Primary,
    /// Supporting context, such as the `{{/x}}` that failed to match.
    Secondary,
}

/// A message anchored on a line/column range of the template.
#[derive(Debug, Clone)]
pub struct Label {
    kind: LabelKind,
    loc: SourceLocation,
    message: String,
}

impl Label {
    pub fn primary(loc: SourceLocation, message: impl Into<String>) -> Self {
        Self::new(LabelKind::Primary, loc, message)
    }

    pub fn secondary(loc: SourceLocation, message: impl Into<String>) -> Self {
        Self::new(LabelKind::Secondary, loc, message)
    }

    fn new(kind: LabelKind, loc: SourceLocation, message: impl Into<String>) -> Self {
        Self {
            kind,
            loc,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> LabelKind {
        self.kind
    }

    pub fn loc(&self) -> &SourceLocation {
        &self.loc
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.kind == LabelKind::Primary
    }
}
