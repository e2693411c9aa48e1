//! Severity levels for diagnostics.

use std::fmt;

/// How serious a diagnostic is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Severity {
    /// Advisory only. A tree was still produced.
    Warning,
    /// The template could not be turned into a tree.
    #[default]
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }

    pub fn is_error(&self) -> bool {
        *self == Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_outrank_warnings() {
        let worst = [Severity::Warning, Severity::Error, Severity::Warning]
            .into_iter()
            .max();
        assert_eq!(worst, Some(Severity::Error));
        assert!(worst.is_some_and(|s| s.is_error()));
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::default().to_string(), "error");
        assert_eq!(Severity::Warning.to_string(), "warning");
    }
}
