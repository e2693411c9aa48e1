//! Parser for template tokens.
//!
//! This module turns the token stream from the [`lexer`](super::lexer) into a
//! [`Program`] by driving the [`Builder`] in derivation order: every rule
//! hands its parts and its line/column span to the matching `build_*`
//! operation. The public entry point is [`build_program`].

use winnow::{
    Parser as _,
    combinator::{opt, peek, repeat},
    error::{AddContext, ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use crate::{
    ast::{Expression, Hash, HashPair, Program, Statement, SubExpression},
    builder::{Builder, CloseBlock, InverseChain, OpenBlock, OpenRawBlock, PathSegment, Separator},
    error::{Diagnostic, ErrorCode},
    span::{LineIndex, LocInfo, Span},
    tokens::{PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone)]
pub(crate) enum Context {
    /// Description of what is currently being parsed
    Label(&'static str),
    /// Remaining token count (`eof_offset()`) at error start position
    ///
    /// Used to calculate start_offset as: `tokens.len() - start_offset_value`
    StartOffset(usize),
    /// A builder operation rejected the parsed construct
    Build(Box<Diagnostic>),
}

type Input<'src> = TokenSlice<'src, PositionedToken<'src>>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;

fn with_context(
    error: ContextError<Context>,
    input: &Input<'_>,
    context: Context,
) -> ContextError<Context> {
    error.add_context(input, &input.checkpoint(), context)
}

fn cut_err<'src, O, F>(input: &mut Input<'src>, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    let start_remaining = input.eof_offset();

    match f(input) {
        Ok(o) => Ok(o),
        Err(ErrMode::Backtrack(e)) | Err(ErrMode::Cut(e)) => Err(ErrMode::Cut(with_context(
            e,
            input,
            Context::StartOffset(start_remaining),
        ))),
        Err(e) => Err(e),
    }
}

/// Helper to create a Backtrack error carrying a label
fn backtrack(input: &Input<'_>, label: &'static str) -> ErrMode<ContextError<Context>> {
    ErrMode::Backtrack(with_context(ContextError::new(), input, Context::Label(label)))
}

/// Surface a builder failure as a committed parse error
fn lift<T>(input: &Input<'_>, result: Result<T, Diagnostic>) -> IResult<T> {
    result.map_err(|diag| {
        let context = Context::Build(Box::new(diag));
        ErrMode::Cut(with_context(ContextError::new(), input, context))
    })
}

/// Look at the next token without consuming it
fn peek_token<'src>(input: &mut Input<'src>) -> Option<&'src Token<'src>> {
    peek(any::<_, ErrMode<ContextError<Context>>>)
        .parse_next(input)
        .ok()
        .map(|positioned| &positioned.token)
}

/// Match one token, mapping it through `select`
fn token<'src, O>(
    input: &mut Input<'src>,
    label: &'static str,
    select: fn(&'src Token<'src>) -> Option<O>,
) -> IResult<O> {
    any.verify_map(|positioned: &'src PositionedToken<'src>| select(&positioned.token))
        .context(Context::Label(label))
        .parse_next(input)
}

/// Parse a tag closer: `}}` or `~}}`
fn close<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    token(input, "`}}`", |t| match t {
        Token::Close(text) => Some(*text),
        _ => None,
    })
}

/// Parse an identifier as written, brackets included
fn identifier<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    token(input, "identifier", |t| match t {
        Token::Id(text) => Some(&**text),
        _ => None,
    })
}

fn equals<'src>(input: &mut Input<'src>) -> IResult<()> {
    token(input, "`=`", |t| matches!(t, Token::Equals).then_some(()))
}

/// Parse a path separator: `.`, `/` or `.#`
fn separator<'src>(input: &mut Input<'src>) -> IResult<Separator> {
    token(input, "path separator", |t| match t {
        Token::Sep("/") => Some(Separator::Slash),
        Token::Sep(_) => Some(Separator::Dot),
        Token::PrivateSep => Some(Separator::Private),
        _ => None,
    })
}

/// Recursive-descent grammar over one token slice.
struct Grammar<'g, 'src> {
    builder: &'g Builder,
    index: &'g LineIndex<'src>,
    source: &'src str,
    tokens: &'src [PositionedToken<'src>],
}

impl<'g, 'src> Grammar<'g, 'src> {
    // ============================================================================
    // Spans
    // ============================================================================

    /// Byte span of the tokens consumed since `start` (an `eof_offset()`
    /// reading).
    fn span_since(&self, start: usize, input: &Input<'src>) -> Span {
        let first = self.tokens.len() - start;
        let last = (self.tokens.len() - input.eof_offset())
            .saturating_sub(1)
            .max(first);

        match (self.tokens.get(first), self.tokens.get(last)) {
            (Some(first), Some(last)) => first.span.union(last.span),
            (Some(only), None) | (None, Some(only)) => only.span,
            (None, None) => Span::new(self.source.len()..self.source.len()),
        }
    }

    fn loc_since(&self, start: usize, input: &Input<'src>) -> LocInfo {
        self.index.loc_info(self.span_since(start, input))
    }

    // ============================================================================
    // Programs and Statements
    // ============================================================================

    /// Parse a whole template: a program followed by the end of input.
    fn root(&self, input: &mut Input<'src>) -> IResult<Program> {
        let program = self.program(input)?;
        if input.eof_offset() != 0 {
            let error = with_context(ContextError::new(), input, Context::Label("end of input"));
            return Err(ErrMode::Cut(with_context(
                error,
                input,
                Context::StartOffset(input.eof_offset()),
            )));
        }
        Ok(program)
    }

    /// Parse statements up to the next `{{/`, `{{else` or end of input.
    fn program(&self, input: &mut Input<'src>) -> IResult<Program> {
        let statements: Vec<Statement> =
            repeat(0.., |input: &mut Input<'src>| self.statement(input)).parse_next(input)?;
        Ok(self.builder.build_program(statements, None))
    }

    fn statement(&self, input: &mut Input<'src>) -> IResult<Statement> {
        match peek_token(input) {
            Some(Token::Content(_)) => self.content(input),
            Some(Token::Comment(_)) => self.comment(input),
            Some(Token::Open(_) | Token::OpenUnescaped(_)) => self.mustache(input),
            Some(Token::OpenBlock(_) | Token::OpenInverse(_)) => self.block(input),
            Some(Token::OpenPartial(_)) => self.partial(input),
            Some(Token::OpenPartialBlock(_)) => self.partial_block(input),
            Some(Token::OpenRawBlock) => self.raw_block(input),
            _ => Err(backtrack(input, "statement")),
        }
    }

    fn content(&self, input: &mut Input<'src>) -> IResult<Statement> {
        let start = input.eof_offset();
        let text = token(input, "content", |t| match t {
            Token::Content(text) => Some(*text),
            _ => None,
        })?;
        Ok(self.builder.build_content(text, self.loc_since(start, input)))
    }

    fn comment(&self, input: &mut Input<'src>) -> IResult<Statement> {
        let start = input.eof_offset();
        let text = token(input, "comment", |t| match t {
            Token::Comment(text) => Some(*text),
            _ => None,
        })?;
        Ok(self.builder.build_comment(text, self.loc_since(start, input)))
    }

    /// Parse `{{path params hash}}` or `{{{path params hash}}}`.
    fn mustache(&self, input: &mut Input<'src>) -> IResult<Statement> {
        let start = input.eof_offset();
        let (open, unescaped) = token(input, "mustache", |t| match t {
            Token::Open(text) => Some((*text, false)),
            Token::OpenUnescaped(text) => Some((*text, true)),
            _ => None,
        })?;

        cut_err(input, |input| {
            let (path, params, hash) = self.call(input)?;
            let close = if unescaped {
                token(input, "`}}}`", |t| match t {
                    Token::CloseUnescaped(text) => Some(*text),
                    _ => None,
                })?
            } else {
                close(input)?
            };

            let strip = Builder::strip_flags(open, close);
            Ok(self.builder.build_mustache(
                open,
                path,
                params,
                hash,
                strip,
                self.loc_since(start, input),
            ))
        })
    }

    /// Parse `{{> name params hash}}`.
    fn partial(&self, input: &mut Input<'src>) -> IResult<Statement> {
        let start = input.eof_offset();
        let open = token(input, "partial", |t| match t {
            Token::OpenPartial(text) => Some(*text),
            _ => None,
        })?;

        cut_err(input, |input| {
            let (name, params, hash) = self.call(input)?;
            let close = close(input)?;
            Ok(self.builder.build_partial(
                name,
                params,
                hash,
                Builder::strip_flags(open, close),
                self.loc_since(start, input),
            ))
        })
    }

    /// Parse `{{#> name}}...{{/name}}`.
    fn partial_block(&self, input: &mut Input<'src>) -> IResult<Statement> {
        let start = input.eof_offset();
        let open = self.open_block(
            input,
            "partial block",
            |t| match t {
                Token::OpenPartialBlock(text) => Some(*text),
                _ => None,
            },
            false,
        )?;

        cut_err(input, |input| {
            let program = self.program(input)?;
            let close = self.close_block(input)?;
            let loc = self.loc_since(start, input);
            lift(input, self.builder.build_partial_block(open, program, close, loc))
        })
    }

    /// Parse `{{{{name}}}}...{{{{/name}}}}`.
    fn raw_block(&self, input: &mut Input<'src>) -> IResult<Statement> {
        let start = input.eof_offset();
        token(input, "raw block", |t| matches!(t, Token::OpenRawBlock).then_some(()))?;

        cut_err(input, |input| {
            let (path, params, hash) = self.call(input)?;
            token(input, "`}}}}`", |t| matches!(t, Token::CloseRawBlock).then_some(()))?;

            let contents: Vec<Statement> =
                repeat(0.., |input: &mut Input<'src>| self.content(input)).parse_next(input)?;
            let close = token(input, "raw block close", |t| match t {
                Token::EndRawBlock(name) => Some(*name),
                _ => None,
            })?;

            let open = OpenRawBlock { path, params, hash };
            let loc = self.loc_since(start, input);
            lift(input, self.builder.build_raw_block(open, contents, close, loc))
        })
    }

    // ============================================================================
    // Blocks
    // ============================================================================

    /// Parse `{{#x}}...{{/x}}` or the inverted `{{^x}}...{{/x}}`.
    fn block(&self, input: &mut Input<'src>) -> IResult<Statement> {
        let start = input.eof_offset();
        let inverted = matches!(peek_token(input), Some(Token::OpenInverse(_)));
        let open = self.open_block(
            input,
            "block",
            |t| match t {
                Token::OpenBlock(text) | Token::OpenInverse(text) => Some(*text),
                _ => None,
            },
            true,
        )?;

        cut_err(input, |input| {
            let program = self.program(input)?;
            let inverse = if inverted {
                self.inverse_and_program(input)?
            } else {
                self.inverse_chain(input)?
            };
            let close = self.close_block(input)?;

            let loc = self.loc_since(start, input);
            lift(
                input,
                self.builder
                    .build_block(open, program, inverse, Some(close), inverted, loc),
            )
        })
    }

    /// Parse a block opener: the open token, the call, optional block
    /// params and the closing `}}`.
    fn open_block(
        &self,
        input: &mut Input<'src>,
        label: &'static str,
        select: fn(&'src Token<'src>) -> Option<&'src str>,
        allow_block_params: bool,
    ) -> IResult<OpenBlock> {
        let open = token(input, label, select)?;

        cut_err(input, |input| {
            let (path, params, hash) = self.call(input)?;
            let block_params = if allow_block_params {
                opt(|input: &mut Input<'src>| self.block_params(input)).parse_next(input)?
            } else {
                None
            };
            let close = close(input)?;

            Ok(OpenBlock {
                open: open.to_string(),
                path,
                params,
                hash,
                block_params,
                strip: Builder::strip_flags(open, close),
            })
        })
    }

    /// Parse `as |a b|`.
    fn block_params(&self, input: &mut Input<'src>) -> IResult<Vec<String>> {
        token(input, "`as |`", |t| matches!(t, Token::OpenBlockParams).then_some(()))?;

        cut_err(input, |input| {
            let names: Vec<&'src str> = repeat(1.., identifier).parse_next(input)?;
            token(input, "`|`", |t| matches!(t, Token::CloseBlockParams).then_some(()))?;
            Ok(names
                .into_iter()
                .map(|name| Builder::id(name).to_string())
                .collect())
        })
    }

    /// Parse `{{/path}}`.
    fn close_block(&self, input: &mut Input<'src>) -> IResult<CloseBlock> {
        let open = token(input, "block close", |t| match t {
            Token::OpenEndBlock(text) => Some(*text),
            _ => None,
        })?;

        cut_err(input, |input| {
            let path = self.expr(input)?;
            let close = close(input)?;
            Ok(CloseBlock {
                path: Some(path),
                strip: Builder::strip_flags(open, close),
            })
        })
    }

    /// Parse an optional `{{else}}` / `{{^}}` section.
    fn inverse_and_program(&self, input: &mut Input<'src>) -> IResult<Option<InverseChain>> {
        let Some(tag) = opt(|input: &mut Input<'src>| {
            token(input, "`{{else}}`", |t| match t {
                Token::Inverse(text) => Some(*text),
                _ => None,
            })
        })
        .parse_next(input)?
        else {
            return Ok(None);
        };

        let program = self.program(input)?;
        Ok(Some(InverseChain {
            strip: Builder::strip_flags(tag, tag),
            program,
            chain: false,
        }))
    }

    /// Parse an optional inverse section, which may be an `{{else if ...}}`
    /// chain.
    ///
    /// Each chain link becomes a block wrapped in a chained program. The
    /// link's closing strip flags come from the section after it.
    fn inverse_chain(&self, input: &mut Input<'src>) -> IResult<Option<InverseChain>> {
        if !matches!(peek_token(input), Some(Token::OpenInverseChain(_))) {
            return self.inverse_and_program(input);
        }

        let start = input.eof_offset();
        let open = self.open_block(
            input,
            "`{{else ...}}`",
            |t| match t {
                Token::OpenInverseChain(text) => Some(*text),
                _ => None,
            },
            true,
        )?;

        cut_err(input, |input| {
            let program = self.program(input)?;
            let program_loc = program.loc.clone();
            let nested = self.inverse_chain(input)?;
            let close = nested.as_ref().map(|chain| CloseBlock {
                path: None,
                strip: chain.strip,
            });

            let strip = open.strip;
            let loc = self.loc_since(start, input);
            let block = lift(
                input,
                self.builder
                    .build_block(open, program, nested, close, false, loc),
            )?;

            Ok(Some(InverseChain {
                strip,
                program: self.builder.build_chained_program(block, program_loc),
                chain: true,
            }))
        })
    }

    // ============================================================================
    // Expressions
    // ============================================================================

    /// Parse a helper call: a head expression, positional params and an
    /// optional hash.
    fn call(
        &self,
        input: &mut Input<'src>,
    ) -> IResult<(Expression, Vec<Expression>, Option<Hash>)> {
        let path = self.expr(input)?;
        let params = self.params(input)?;
        let hash = self.hash(input)?;
        Ok((path, params, hash))
    }

    /// Parse expressions until the first hash pair or non-expression token.
    fn params(&self, input: &mut Input<'src>) -> IResult<Vec<Expression>> {
        let mut params = Vec::new();
        while !self.at_hash_pair(input) {
            let checkpoint = input.checkpoint();
            match self.expr(input) {
                Ok(param) => params.push(param),
                Err(ErrMode::Backtrack(_)) => {
                    input.reset(&checkpoint);
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(params)
    }

    /// Whether the next tokens are `key =`.
    fn at_hash_pair(&self, input: &mut Input<'src>) -> bool {
        let checkpoint = input.checkpoint();
        let found = (identifier, equals).parse_next(input).is_ok();
        input.reset(&checkpoint);
        found
    }

    /// Parse an optional run of `key=value` pairs.
    fn hash(&self, input: &mut Input<'src>) -> IResult<Option<Hash>> {
        if !self.at_hash_pair(input) {
            return Ok(None);
        }

        let start = input.eof_offset();
        let mut pairs = Vec::new();
        while self.at_hash_pair(input) {
            pairs.push(self.hash_pair(input)?);
        }

        Ok(Some(Hash {
            pairs,
            loc: self.builder.locate(self.loc_since(start, input)),
        }))
    }

    fn hash_pair(&self, input: &mut Input<'src>) -> IResult<HashPair> {
        let start = input.eof_offset();
        let key = identifier(input)?;
        equals(input)?;
        let value = cut_err(input, |input| self.expr(input))?;

        Ok(HashPair {
            key: Builder::id(key).to_string(),
            value,
            loc: self.builder.locate(self.loc_since(start, input)),
        })
    }

    /// Parse one expression: a path, data path, literal, sub-expression,
    /// hash literal or array literal.
    ///
    /// Fails without consuming input when the next token cannot start an
    /// expression.
    fn expr(&self, input: &mut Input<'src>) -> IResult<Expression> {
        match peek_token(input) {
            Some(Token::Id(_)) => self.path(input),
            Some(Token::Data) => self.data_name(input),
            Some(Token::OpenSexpr) => self.paren_expr(input),
            Some(Token::OpenArray) => self.array_literal(input),
            Some(
                Token::StringLiteral(_)
                | Token::Number(_)
                | Token::Boolean(_)
                | Token::Undefined
                | Token::Null,
            ) => self.literal(input),
            _ => Err(backtrack(input, "expression")),
        }
    }

    fn literal(&self, input: &mut Input<'src>) -> IResult<Expression> {
        any.verify_map(|positioned: &'src PositionedToken<'src>| {
            let loc = self.index.loc_info(positioned.span);
            match &positioned.token {
                Token::StringLiteral(value) => Some(self.builder.build_string(value.clone(), loc)),
                Token::Number(text) => Some(self.builder.build_number(text, loc)),
                Token::Boolean(value) => Some(self.builder.build_boolean(*value, loc)),
                Token::Undefined => Some(self.builder.build_undefined(loc)),
                Token::Null => Some(self.builder.build_null(loc)),
                _ => None,
            }
        })
        .context(Context::Label("literal"))
        .parse_next(input)
    }

    /// Parse `segment (sep segment)*`.
    fn path_segments(&self, input: &mut Input<'src>) -> IResult<Vec<PathSegment>> {
        let first = identifier(input)?;
        let mut segments = vec![PathSegment::new(first, None)];

        while let Some(separator) = opt(separator).parse_next(input)? {
            let part = cut_err(input, identifier)?;
            segments.push(PathSegment::new(part, Some(separator)));
        }
        Ok(segments)
    }

    fn path(&self, input: &mut Input<'src>) -> IResult<Expression> {
        let start = input.eof_offset();
        let segments = self.path_segments(input)?;
        self.finish_path(input, start, false, None, segments)
    }

    /// Parse `@segment (sep segment)*`.
    fn data_name(&self, input: &mut Input<'src>) -> IResult<Expression> {
        let start = input.eof_offset();
        token(input, "`@`", |t| matches!(t, Token::Data).then_some(()))?;
        let segments = cut_err(input, |input| self.path_segments(input))?;
        self.finish_path(input, start, true, None, segments)
    }

    fn finish_path(
        &self,
        input: &mut Input<'src>,
        start: usize,
        data: bool,
        head: Option<SubExpression>,
        segments: Vec<PathSegment>,
    ) -> IResult<Expression> {
        let loc = self.loc_since(start, input);
        lift(input, self.builder.build_path(data, head, segments, loc)).map(Expression::Path)
    }

    /// Parse a parenthesised group.
    ///
    /// `(key=value ...)` is a hash literal. Anything else is a
    /// sub-expression, which becomes the head of a dynamic path when a
    /// separator follows it.
    fn paren_expr(&self, input: &mut Input<'src>) -> IResult<Expression> {
        let start = input.eof_offset();
        token(input, "`(`", |t| matches!(t, Token::OpenSexpr).then_some(()))?;

        cut_err(input, |input| {
            if self.at_hash_pair(input) {
                let hash = self.hash(input)?;
                close_sexpr(input)?;
                let loc = self.loc_since(start, input);
                let hash = hash.unwrap_or_else(|| Hash {
                    pairs: Vec::new(),
                    loc: self.builder.locate(loc),
                });
                return Ok(self.builder.build_hash_literal(hash, loc));
            }

            let (path, params, hash) = self.call(input)?;
            close_sexpr(input)?;

            let span = self.span_since(start, input);
            let sexpr = self.builder.build_sub_expression(
                path,
                params,
                hash,
                &self.source[span.range()],
                self.index.loc_info(span),
            );

            if opt(separator).parse_next(input)?.is_none() {
                return Ok(Expression::SubExpression(sexpr));
            }
            let segments = self.path_segments(input)?;
            self.finish_path(input, start, false, Some(sexpr), segments)
        })
    }

    /// Parse `[item ...]` when square brackets are array literals.
    fn array_literal(&self, input: &mut Input<'src>) -> IResult<Expression> {
        let start = input.eof_offset();
        token(input, "`[`", |t| matches!(t, Token::OpenArray).then_some(()))?;

        cut_err(input, |input| {
            let mut items = Vec::new();
            loop {
                let checkpoint = input.checkpoint();
                match self.expr(input) {
                    Ok(item) => items.push(item),
                    Err(ErrMode::Backtrack(_)) => {
                        input.reset(&checkpoint);
                        break;
                    }
                    Err(e) => return Err(e),
                }
            }
            token(input, "`]`", |t| matches!(t, Token::CloseArray).then_some(()))?;

            Ok(self
                .builder
                .build_array_literal(items, self.loc_since(start, input)))
        })
    }

    // ============================================================================
    // Errors
    // ============================================================================

    /// Convert a winnow error into a diagnostic
    ///
    /// Builder failures are returned as they are. Otherwise the span is
    /// computed from the StartOffset context and the remaining token count.
    fn convert_error(
        &self,
        error: ErrMode<ContextError<Context>>,
        current_remaining: usize,
    ) -> Diagnostic {
        let tokens = self.tokens;
        let source_name = self.builder.source().cloned();

        let e = match error {
            ErrMode::Backtrack(e) | ErrMode::Cut(e) => e,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(diag) = e.context().find_map(|ctx| match ctx {
            Context::Build(diag) => Some((**diag).clone()),
            _ => None,
        }) {
            return diag;
        }

        let start_remaining = e.context().find_map(|ctx| match ctx {
            Context::StartOffset(n) => Some(*n),
            _ => None,
        });

        // Calculate offsets from remaining token counts
        let end_offset = tokens.len() - current_remaining;
        let start_offset = start_remaining.map(|r| tokens.len() - r).unwrap_or(0);

        let contexts: Vec<String> = e
            .context()
            .filter_map(|ctx| match ctx {
                Context::Label(label) => Some(format!("expected {label}")),
                _ => None,
            })
            .collect();

        if end_offset >= tokens.len() {
            let error_span = tokens
                .last()
                .map(|t| t.span)
                .unwrap_or_else(|| Span::new(self.source.len()..self.source.len()));
            let message = if contexts.is_empty() {
                "more tokens expected".to_string()
            } else {
                contexts.join(" → ")
            };

            return Diagnostic::error(format!("incomplete input: {message}"))
                .with_code(ErrorCode::E101)
                .with_label(self.index.location(error_span, source_name), "input ends here")
                .with_help("close every open tag and block");
        }

        let message = if contexts.is_empty() {
            "unexpected token or end of input".to_string()
        } else {
            contexts.join(" → ")
        };

        let examine_range = if start_offset < end_offset {
            // Parser consumed tokens - examine that range
            start_offset..end_offset + 1
        } else {
            end_offset..end_offset + 1
        };
        let slice = &tokens[examine_range];
        let error_span = slice[0].span.union(slice[slice.len() - 1].span);

        Diagnostic::error(format!("unexpected token: {message}"))
            .with_code(ErrorCode::E100)
            .with_label(self.index.location(error_span, source_name), "unexpected token")
            .with_help("check tag syntax and nesting")
    }
}

fn close_sexpr<'src>(input: &mut Input<'src>) -> IResult<()> {
    token(input, "`)`", |t| matches!(t, Token::CloseSexpr).then_some(()))
}

/// Parse a token slice into a program.
///
/// `index` must be built over the same `source` the tokens were lexed from.
///
/// # Returns
///
/// - `Ok(program)` - The whole token stream formed a template
/// - `Err(Diagnostic)` - The first grammar or build error
pub(crate) fn build_program<'src>(
    tokens: &'src [PositionedToken<'src>],
    source: &'src str,
    index: &LineIndex<'src>,
    builder: &Builder,
) -> Result<Program, Diagnostic> {
    let grammar = Grammar {
        builder,
        index,
        source,
        tokens,
    };
    let mut token_slice = TokenSlice::new(tokens);

    match grammar.root(&mut token_slice) {
        Ok(program) => Ok(program),
        Err(e) => {
            let current_remaining = token_slice.eof_offset();
            Err(grammar.convert_error(e, current_remaining))
        }
    }
}
