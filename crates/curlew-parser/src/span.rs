//! Source positions for tokens and tree nodes.
//!
//! Tokens carry a byte-range [`Span`]. Tree nodes carry a line/column
//! [`SourceLocation`], which is what the builder receives from the grammar
//! (as a raw [`LocInfo`]) and what diagnostics report. [`LineIndex`] converts
//! between the two.

use std::{fmt, ops::Range, sync::Arc};

/// A byte range in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Create a new span from a byte range
    pub fn new(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }

    /// Get the start offset of the span
    pub fn start(&self) -> usize {
        self.start
    }

    /// Get the end offset of the span
    pub fn end(&self) -> usize {
        self.end
    }

    /// Get the length of the span
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the span is empty
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Create a union of two spans (encompassing both)
    pub fn union(&self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// The byte range covered by this span.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A line/column pair. Lines are 1-based, columns are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The raw first/last line and column span the grammar reports for a
/// matched production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocInfo {
    pub first_line: usize,
    pub first_column: usize,
    pub last_line: usize,
    pub last_column: usize,
}

/// The location attached to every tree node.
///
/// `source` is the caller-supplied source name (if any), shared by every
/// node of one tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub source: Option<Arc<str>>,
    pub start: Position,
    pub end: Position,
}

impl SourceLocation {
    /// Wrap a raw grammar span, tagging it with `source`.
    pub fn new(source: Option<Arc<str>>, loc: LocInfo) -> Self {
        Self {
            source,
            start: Position::new(loc.first_line, loc.first_column),
            end: Position::new(loc.last_line, loc.last_column),
        }
    }

    /// A location spanning from the start of `self` to the end of `other`.
    pub fn to(&self, other: &SourceLocation) -> SourceLocation {
        SourceLocation {
            source: self.source.clone(),
            start: self.start,
            end: other.end,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "{source}:")?;
        }
        write!(f, "{}", self.start)
    }
}

/// Line-start table for one source text.
#[derive(Debug, Clone)]
pub struct LineIndex<'src> {
    source: &'src str,
    line_starts: Vec<usize>,
}

impl<'src> LineIndex<'src> {
    pub fn new(source: &'src str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            source,
            line_starts,
        }
    }

    /// Line/column of a byte offset. Columns count characters.
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next_line) => next_line - 1,
        };
        let line_start = self.line_starts[line];
        let column = self.source[line_start..offset].chars().count();
        Position::new(line + 1, column)
    }

    /// The grammar-style location info for a byte span.
    pub fn loc_info(&self, span: Span) -> LocInfo {
        let start = self.position(span.start());
        let end = self.position(span.end());
        LocInfo {
            first_line: start.line,
            first_column: start.column,
            last_line: end.line,
            last_column: end.column,
        }
    }

    /// The node location for a byte span, tagged with `source`.
    pub fn location(&self, span: Span, source: Option<Arc<str>>) -> SourceLocation {
        SourceLocation::new(source, self.loc_info(span))
    }

    /// Byte offset of a line/column position, if it lies within the source.
    pub fn offset(&self, position: Position) -> Option<usize> {
        let line_start = *self.line_starts.get(position.line.checked_sub(1)?)?;
        let line_end = self
            .line_starts
            .get(position.line)
            .copied()
            .unwrap_or(self.source.len());
        let line = &self.source[line_start..line_end];
        match line.char_indices().nth(position.column) {
            Some((i, _)) => Some(line_start + i),
            None if line.chars().count() == position.column => Some(line_end),
            None => None,
        }
    }
}
