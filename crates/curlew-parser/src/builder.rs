//! Semantic actions that turn matched grammar productions into tree nodes.
//!
//! The grammar hands the [`Builder`] already-parsed pieces (expressions,
//! programs, raw token text and locations) and gets back finished nodes.
//! Structural checks that the grammar cannot express live here: block
//! open/close name matching, `..`/`this` placement in paths and inverse
//! sections on decorator blocks.

use std::sync::Arc;

use log::{debug, trace};

use crate::{
    ast::{
        ArrayLiteral, BlockStatement, BooleanLiteral, CommentStatement, ContentStatement,
        Expression, Hash, HashLiteral, MustacheStatement, NullLiteral, NumberLiteral,
        PartialBlockStatement, PartialStatement, PathExpression, PathHead, Program, Statement,
        StringLiteral, StripFlags, SubExpression, UndefinedLiteral,
    },
    error::{Diagnostic, ErrorCode, Result},
    options::{HashSyntax, ParseOptions, SquareSyntax, SyntaxOptions},
    span::{LocInfo, SourceLocation},
};

/// The separator written before a path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    Dot,
    Slash,
    /// `.#`, marking a private member access.
    Private,
}

impl Separator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Separator::Dot => ".",
            Separator::Slash => "/",
            Separator::Private => ".#",
        }
    }
}

/// One segment of a path as the grammar saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    /// The identifier with `[...]` brackets removed.
    pub part: String,
    /// The identifier as written.
    pub original: String,
    /// The separator before this segment; `None` for the first one.
    pub separator: Option<Separator>,
}

impl PathSegment {
    pub fn new(original: impl Into<String>, separator: Option<Separator>) -> Self {
        let original = original.into();
        Self {
            part: Builder::id(&original).to_string(),
            original,
            separator,
        }
    }
}

/// The opening tag of a block, inverse section, inverse chain link or
/// partial block.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenBlock {
    /// The opener token text, e.g. `{{#*` or `{{~^`.
    pub open: String,
    pub path: Expression,
    pub params: Vec<Expression>,
    pub hash: Option<Hash>,
    pub block_params: Option<Vec<String>>,
    pub strip: StripFlags,
}

/// The opening tag of a raw block.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenRawBlock {
    pub path: Expression,
    pub params: Vec<Expression>,
    pub hash: Option<Hash>,
}

/// The `{{/name}}` closing tag of a block.
///
/// Synthetic closers for `{{else if}}` continuations carry only strip
/// flags.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseBlock {
    pub path: Option<Expression>,
    pub strip: StripFlags,
}

/// The `{{else}}` or `{{else if}}` part of a block.
#[derive(Debug, Clone, PartialEq)]
pub struct InverseChain {
    pub strip: StripFlags,
    pub program: Program,
    /// Set when `program` wraps a nested chained block.
    pub chain: bool,
}

/// Builds tree nodes, tagging every location with the source name.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    source: Option<Arc<str>>,
    syntax: SyntaxOptions,
}

impl Builder {
    pub fn new(options: &ParseOptions) -> Self {
        Self {
            source: options.src_name.as_deref().map(Arc::from),
            syntax: options.syntax,
        }
    }

    /// The shared source name attached to every location.
    pub fn source(&self) -> Option<&Arc<str>> {
        self.source.as_ref()
    }

    // ============================================================================
    // Token Helpers
    // ============================================================================

    /// Wrap a raw grammar span into a node location.
    pub fn locate(&self, loc: LocInfo) -> SourceLocation {
        SourceLocation::new(self.source.clone(), loc)
    }

    /// Strip the brackets from a `[...]` identifier.
    pub fn id(token: &str) -> &str {
        match token.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
            Some(inner) => inner,
            None => token,
        }
    }

    /// Read the `~` markers off a tag's opening and closing token text.
    pub fn strip_flags(open: &str, close: &str) -> StripFlags {
        StripFlags::new(
            open.chars().nth(2) == Some('~'),
            close.chars().rev().nth(2) == Some('~'),
        )
    }

    /// Remove the comment delimiters (with their `~` and `--`) from a comment
    /// tag.
    pub fn strip_comment(comment: &str) -> &str {
        let body = comment
            .strip_prefix("{{")
            .map(|s| s.strip_prefix('~').unwrap_or(s))
            .and_then(|s| s.strip_prefix('!'))
            .map(|s| s.strip_prefix('-').unwrap_or(s))
            .map(|s| s.strip_prefix('-').unwrap_or(s))
            .unwrap_or(comment);

        body.strip_suffix("}}")
            .map(|s| s.strip_suffix('~').unwrap_or(s))
            .map(|s| s.strip_suffix('-').unwrap_or(s))
            .map(|s| s.strip_suffix('-').unwrap_or(s))
            .unwrap_or(body)
    }

    // ============================================================================
    // Expressions
    // ============================================================================

    /// Build a path from its segments.
    ///
    /// `..` segments raise the depth, `.` and `this` are dropped, and all
    /// three are only allowed before the first named segment.
    pub fn build_path(
        &self,
        data: bool,
        head: Option<SubExpression>,
        segments: Vec<PathSegment>,
        loc: LocInfo,
    ) -> Result<PathExpression> {
        let loc = self.locate(loc);
        let mut original = match (&head, data) {
            (Some(sexpr), _) => format!("{}.", sexpr.original),
            (None, true) => "@".to_string(),
            (None, false) => String::new(),
        };

        let mut tail = Vec::with_capacity(segments.len());
        let mut depth = 0;
        for segment in segments {
            let literal = segment.original != segment.part;
            if let Some(separator) = segment.separator {
                original.push_str(separator.as_str());
            }
            original.push_str(&segment.part);

            if !literal && matches!(segment.part.as_str(), ".." | "." | "this") {
                if !tail.is_empty() {
                    return Err(Diagnostic::error(format!("Invalid path: {original}"))
                        .with_code(ErrorCode::E200)
                        .with_label(loc, "invalid path")
                        .with_help("`..`, `.` and `this` may only start a path"));
                }
                if segment.part == ".." {
                    depth += 1;
                }
            } else if segment.separator == Some(Separator::Private) {
                tail.push(format!("#{}", segment.part));
            } else {
                tail.push(segment.part);
            }
        }

        let head = match head {
            Some(sexpr) => Some(PathHead::SubExpression(Box::new(sexpr))),
            None if tail.is_empty() => None,
            None => Some(PathHead::Segment(tail.remove(0))),
        };

        trace!(original = original.as_str(), depth; "Built path");
        Ok(PathExpression {
            data,
            this: original.starts_with("this."),
            depth,
            head,
            tail,
            original,
            loc,
        })
    }

    pub fn build_sub_expression(
        &self,
        path: Expression,
        params: Vec<Expression>,
        hash: Option<Hash>,
        original: impl Into<String>,
        loc: LocInfo,
    ) -> SubExpression {
        SubExpression {
            path: Box::new(path),
            params,
            hash,
            original: original.into(),
            loc: self.locate(loc),
        }
    }

    pub fn build_string(&self, value: String, loc: LocInfo) -> Expression {
        Expression::String(StringLiteral {
            original: value.clone(),
            value,
            loc: self.locate(loc),
        })
    }

    pub fn build_number(&self, text: &str, loc: LocInfo) -> Expression {
        Expression::Number(NumberLiteral {
            value: text.parse().unwrap_or(f64::NAN),
            original: text.to_string(),
            loc: self.locate(loc),
        })
    }

    pub fn build_boolean(&self, value: bool, loc: LocInfo) -> Expression {
        Expression::Boolean(BooleanLiteral {
            value,
            original: value.to_string(),
            loc: self.locate(loc),
        })
    }

    pub fn build_undefined(&self, loc: LocInfo) -> Expression {
        Expression::Undefined(UndefinedLiteral {
            loc: self.locate(loc),
        })
    }

    pub fn build_null(&self, loc: LocInfo) -> Expression {
        Expression::Null(NullLiteral {
            loc: self.locate(loc),
        })
    }

    /// Build a `[a b c]` literal through the configured square syntax.
    pub fn build_array_literal(&self, items: Vec<Expression>, loc: LocInfo) -> Expression {
        let loc = self.locate(loc);
        match self.syntax.square {
            SquareSyntax::Custom(build) => build(items, loc),
            SquareSyntax::Node | SquareSyntax::String => {
                Expression::Array(ArrayLiteral { items, loc })
            }
        }
    }

    /// Build a `(key=value ...)` literal through the configured hash syntax.
    pub fn build_hash_literal(&self, hash: Hash, loc: LocInfo) -> Expression {
        let loc = self.locate(loc);
        match self.syntax.hash {
            HashSyntax::Custom(build) => build(hash, loc),
            HashSyntax::Node => Expression::Hash(HashLiteral {
                pairs: hash.pairs,
                loc,
            }),
        }
    }

    // ============================================================================
    // Statements
    // ============================================================================

    pub fn build_content(&self, text: &str, loc: LocInfo) -> Statement {
        Statement::Content(ContentStatement::new(text, self.locate(loc)))
    }

    pub fn build_comment(&self, text: &str, loc: LocInfo) -> Statement {
        Statement::Comment(CommentStatement {
            value: Self::strip_comment(text).to_string(),
            strip: Self::strip_flags(text, text),
            loc: self.locate(loc),
        })
    }

    /// Build a mustache, or a decorator when the opener contains `*`.
    ///
    /// `{{{` and `{{&` openers produce unescaped output.
    pub fn build_mustache(
        &self,
        open: &str,
        path: Expression,
        params: Vec<Expression>,
        hash: Option<Hash>,
        strip: StripFlags,
        loc: LocInfo,
    ) -> Statement {
        let flag = open.chars().nth(3).or_else(|| open.chars().nth(2));
        let mustache = MustacheStatement {
            path,
            params,
            hash,
            escaped: !matches!(flag, Some('{' | '&')),
            strip,
            loc: self.locate(loc),
        };

        if open.contains('*') {
            Statement::Decorator(mustache)
        } else {
            Statement::Mustache(mustache)
        }
    }

    pub fn build_partial(
        &self,
        name: Expression,
        params: Vec<Expression>,
        hash: Option<Hash>,
        strip: StripFlags,
        loc: LocInfo,
    ) -> Statement {
        Statement::Partial(PartialStatement {
            name,
            params,
            hash,
            indent: String::new(),
            strip,
            loc: self.locate(loc),
        })
    }

    /// Build a raw block. The body is kept verbatim as the block's program.
    pub fn build_raw_block(
        &self,
        open: OpenRawBlock,
        contents: Vec<Statement>,
        close: &str,
        loc: LocInfo,
    ) -> Result<Statement> {
        Self::validate_close(&open.path, Some(close))?;

        let loc = self.locate(loc);
        debug!(close, statements = contents.len(); "Built raw block");
        Ok(Statement::Block(BlockStatement {
            path: open.path,
            params: open.params,
            hash: open.hash,
            program: Some(Program {
                body: contents,
                block_params: None,
                chained: false,
                loc: Some(loc.clone()),
            }),
            inverse: None,
            open_strip: StripFlags::default(),
            inverse_strip: StripFlags::default(),
            close_strip: StripFlags::default(),
            loc,
        }))
    }

    /// Build a block, inverse section or decorator block.
    ///
    /// With `inverted` set (a `{{^x}}` section) the main program and the
    /// inverse swap places. A chained inverse hands the closing strip flags
    /// to the nested block it wraps.
    pub fn build_block(
        &self,
        open: OpenBlock,
        mut program: Program,
        inverse_chain: Option<InverseChain>,
        close: Option<CloseBlock>,
        inverted: bool,
        loc: LocInfo,
    ) -> Result<Statement> {
        let loc = self.locate(loc);

        if let Some(close_path) = close.as_ref().and_then(|close| close.path.as_ref()) {
            Self::validate_close(&open.path, close_path.original()).map_err(|diag| {
                diag.with_secondary_label(close_path.loc().clone(), "closed here")
            })?;
        }

        let decorator = open.open.contains('*');
        let close_strip = close.map(|close| close.strip).unwrap_or_default();
        program.block_params = open.block_params;

        let mut inverse = None;
        let mut inverse_strip = StripFlags::default();
        if let Some(mut chain) = inverse_chain {
            if decorator {
                return Err(Diagnostic::error("Unexpected inverse block on decorator")
                    .with_code(ErrorCode::E203)
                    .with_label(loc, "decorator block")
                    .with_help("decorator blocks cannot have an `{{else}}` section"));
            }

            if chain.chain {
                match chain.program.body.first_mut() {
                    Some(Statement::Block(first)) => first.close_strip = close_strip,
                    _ => {
                        return Err(Diagnostic::error(
                            "else chain must continue with a block statement",
                        )
                        .with_code(ErrorCode::E204)
                        .with_label(loc, "chained block"));
                    }
                }
            }

            inverse_strip = chain.strip;
            inverse = Some(chain.program);
        }

        let (program, inverse) = if inverted {
            (inverse, Some(program))
        } else {
            (Some(program), inverse)
        };

        let block = BlockStatement {
            path: open.path,
            params: open.params,
            hash: open.hash,
            program,
            inverse,
            open_strip: open.strip,
            inverse_strip,
            close_strip,
            loc,
        };

        Ok(if decorator {
            Statement::DecoratorBlock(block)
        } else {
            Statement::Block(block)
        })
    }

    pub fn build_partial_block(
        &self,
        open: OpenBlock,
        program: Program,
        close: CloseBlock,
        loc: LocInfo,
    ) -> Result<Statement> {
        let close_name = close.path.as_ref().and_then(Expression::original);
        Self::validate_close(&open.path, close_name)?;

        Ok(Statement::PartialBlock(PartialBlockStatement {
            name: open.path,
            params: open.params,
            hash: open.hash,
            program,
            open_strip: open.strip,
            close_strip: close.strip,
            loc: self.locate(loc),
        }))
    }

    /// Build a program. Without an explicit location, a non-empty program
    /// spans from its first statement to its last.
    pub fn build_program(
        &self,
        statements: Vec<Statement>,
        loc: Option<SourceLocation>,
    ) -> Program {
        let loc = loc.or_else(|| match statements.as_slice() {
            [] => None,
            [only] => Some(only.loc().clone()),
            [first, .., last] => Some(first.loc().to(last.loc())),
        });

        Program {
            body: statements,
            block_params: None,
            chained: false,
            loc,
        }
    }

    /// Wrap the block built for an `{{else if}}` link in its own program.
    pub fn build_chained_program(&self, block: Statement, loc: Option<SourceLocation>) -> Program {
        let mut program = self.build_program(vec![block], loc);
        program.chained = true;
        program
    }

    // ============================================================================
    // Validation
    // ============================================================================

    /// Check that a block is opened with a path and closed with the same
    /// name.
    fn validate_close(open: &Expression, close: Option<&str>) -> Result<()> {
        let Expression::Path(open_path) = open else {
            return Err(
                Diagnostic::error("Unexpected block open (expected a path)")
                    .with_code(ErrorCode::E202)
                    .with_label(open.loc().clone(), "expected a path")
                    .with_help("blocks must be opened with a helper or property name"),
            );
        };

        let close = close.unwrap_or("undefined");
        if open_path.original != close {
            return Err(Diagnostic::error(format!(
                "{} doesn't match {}",
                open_path.original, close
            ))
            .with_code(ErrorCode::E201)
            .with_label(open_path.loc.clone(), "block opened here")
            .with_help(format!("close the block with `{{{{/{}}}}}`", open_path.original)));
        }

        Ok(())
    }
}
