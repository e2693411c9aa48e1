//! Options accepted by the parse entry points.

use crate::{
    ast::{Expression, Hash},
    span::SourceLocation,
};

/// Options for [`parse`](crate::parse) and
/// [`parse_without_processing`](crate::parse_without_processing).
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Source identifier echoed into every node location.
    pub src_name: Option<String>,
    pub syntax: SyntaxOptions,
    /// Skip standalone-tag detection. Explicit `~` trimming still applies.
    pub ignore_standalone: bool,
}

impl ParseOptions {
    pub fn with_src_name(mut self, src_name: impl Into<String>) -> Self {
        self.src_name = Some(src_name.into());
        self
    }

    pub fn with_ignore_standalone(mut self, ignore_standalone: bool) -> Self {
        self.ignore_standalone = ignore_standalone;
        self
    }

    pub fn with_square(mut self, square: SquareSyntax) -> Self {
        self.syntax.square = square;
        self
    }

    pub fn with_hash(mut self, hash: HashSyntax) -> Self {
        self.syntax.hash = hash;
        self
    }
}

/// Hooks for the collection literal syntaxes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntaxOptions {
    pub square: SquareSyntax,
    pub hash: HashSyntax,
}

/// How `[a b c]` inside a tag is read.
#[derive(Debug, Clone, Copy, Default)]
pub enum SquareSyntax {
    /// `[...]` is a bracketed path segment.
    #[default]
    String,
    /// `[...]` is an [`ArrayLiteral`](crate::ast::ArrayLiteral).
    Node,
    /// `[...]` is an array literal built by the given function.
    Custom(fn(Vec<Expression>, SourceLocation) -> Expression),
}

impl SquareSyntax {
    /// Whether `[` opens an array literal.
    pub fn is_literal(&self) -> bool {
        !matches!(self, SquareSyntax::String)
    }
}

/// How a parenthesised group of `key=value` pairs is read.
#[derive(Debug, Clone, Copy, Default)]
pub enum HashSyntax {
    /// Build a [`HashLiteral`](crate::ast::HashLiteral).
    #[default]
    Node,
    /// Build the literal with the given function.
    Custom(fn(Hash, SourceLocation) -> Expression),
}
