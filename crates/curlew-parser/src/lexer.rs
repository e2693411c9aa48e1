//! Lexical analyzer for template source text.
//!
//! The lexer alternates between three modes. Outside of tags it emits
//! [`Token::Content`] runs up to the next `{{`. Inside a tag it emits
//! delimiter, path and literal tokens until the tag closes. After the
//! `}}}}` of a raw block opener it captures everything up to the matching
//! `{{{{/name}}}}` verbatim.
//!
//! The public entry point is [`tokenize`]. Lexing stops at the first error,
//! which is returned together with the tokens read before it.

use std::{borrow::Cow, sync::Arc};

use winnow::{
    Parser as _,
    ascii::{digit1, multispace0, multispace1},
    combinator::{alt, opt, peek},
    error::{AddContext, ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{one_of, take_while},
};

use crate::{
    error::{Diagnostic, ErrorCode},
    span::{LineIndex, Span},
    tokens::{PositionedToken, Token},
};

/// Diagnostic information for lexer errors.
///
/// Attached to winnow errors via `.context()`; `start` is where the failed
/// construct began.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<'a, O> = ModalResult<O, ContextError<LexerDiagnostic>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Content,
    Mustache,
    Raw,
}

/// Characters that may follow an identifier or a `.` path segment.
const ID_LOOKAHEAD: &[char] = &['=', '~', '}', '/', '.', ')', '|'];

/// Characters that may follow a keyword or number literal.
const LITERAL_LOOKAHEAD: &[char] = &['~', '}', ')'];

/// Whether `c` can appear in an unbracketed identifier.
fn is_id_char(c: char) -> bool {
    !(c.is_whitespace()
        || matches!(
            c,
            '!' | '"'
                | '#'
                | '%'
                | '&'
                | '\''
                | '('
                | ')'
                | '*'
                | '+'
                | ','
                | '.'
                | '/'
                | ';'
                | '<'
                | '='
                | '>'
                | '@'
                | '['
                | '\\'
                | ']'
                | '^'
                | '`'
                | '{'
                | '|'
                | '}'
                | '~'
        ))
}

/// Succeeds without consuming when the next character is whitespace, one of
/// `allowed`, a `]` in square-literal mode, or the end of input.
fn boundary<'a>(input: &mut Input<'a>, allowed: &[char], square: bool) -> IResult<'a, ()> {
    match input.chars().next() {
        None => Ok(()),
        Some(c) if c.is_whitespace() || allowed.contains(&c) || (square && c == ']') => Ok(()),
        Some(_) => Err(ErrMode::Backtrack(ContextError::new())),
    }
}

/// Build a committed error carrying `diagnostic` at the current position.
fn cut_error<'a>(
    input: &Input<'a>,
    diagnostic: LexerDiagnostic,
) -> ErrMode<ContextError<LexerDiagnostic>> {
    ErrMode::Cut(ContextError::new().add_context(input, &input.checkpoint(), diagnostic))
}

/// Parse a comment tag: `{{! ... }}` or `{{!-- ... --}}`.
///
/// The long form ends at the first `--}}` (or `--~}}`), the short form at
/// the first `}}`.
fn comment<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let start = input.current_token_start();
    let text: &'a str = **input;

    let opener = comment_opener(input)?;
    let body: &'a str = **input;

    let end = if body.starts_with("--") {
        (0..body.len())
            .filter(|&i| body.is_char_boundary(i))
            .find_map(|i| {
                let rest = &body[i..];
                if rest.starts_with("--}}") {
                    Some(i + 4)
                } else if rest.starts_with("--~}}") {
                    Some(i + 5)
                } else {
                    None
                }
            })
    } else {
        body.find("}}").map(|i| i + 2)
    };

    match end {
        Some(len) => {
            input.next_slice(len);
            Ok(Token::Comment(&text[..opener.len() + len]))
        }
        None => {
            input.finish();
            Err(cut_error(
                input,
                LexerDiagnostic {
                    code: ErrorCode::E002,
                    message: "unterminated comment",
                    help: Some("close the comment with `}}` (or `--}}` for `{{!--` comments)"),
                    start,
                },
            ))
        }
    }
}

fn comment_opener<'a>(input: &mut Input<'a>) -> IResult<'a, &'a str> {
    ("{{", opt('~'), '!').take().parse_next(input)
}

/// Parse a tag opener: every token that starts with `{{` inside a tag.
fn open_tag<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    alt((
        ("{{", opt('~'), '>').take().map(Token::OpenPartial),
        ("{{", opt('~'), "#>").take().map(Token::OpenPartialBlock),
        ("{{", opt('~'), '#', opt('*')).take().map(Token::OpenBlock),
        ("{{", opt('~'), '/').take().map(Token::OpenEndBlock),
        ("{{", opt('~'), '^', multispace0, opt('~'), "}}")
            .take()
            .map(Token::Inverse),
        ("{{", opt('~'), multispace0, "else", multispace0, opt('~'), "}}")
            .take()
            .map(Token::Inverse),
        ("{{", opt('~'), '^').take().map(Token::OpenInverse),
        ("{{", opt('~'), multispace0, "else", peek(else_boundary))
            .take()
            .map(Token::OpenInverseChain),
        ("{{", opt('~'), '{').take().map(Token::OpenUnescaped),
        ("{{", opt('~'), '&').take().map(Token::Open),
        comment,
        ("{{", opt('~'), opt('*')).take().map(Token::Open),
    ))
    .parse_next(input)
}

/// `else` must end at something that cannot continue an identifier, so
/// `{{elsewhere}}` stays a plain mustache.
fn else_boundary<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    match input.chars().next() {
        Some(c) if is_id_char(c) => Err(ErrMode::Backtrack(ContextError::new())),
        _ => Ok(()),
    }
}

/// Parse `..`, `.` (as a path segment), `.#` or a `.` / `/` separator.
fn dots<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    alt((
        "..".map(|s: &'a str| Token::Id(Cow::Borrowed(s))),
        ('.', peek(|i: &mut Input<'a>| boundary(i, ID_LOOKAHEAD, false)))
            .take()
            .map(|s: &'a str| Token::Id(Cow::Borrowed(s))),
        ".#".value(Token::PrivateSep),
        one_of(['.', '/']).take().map(Token::Sep),
    ))
    .parse_next(input)
}

/// Parse a double- or single-quoted string.
///
/// A backslash before the quote character escapes it; any other backslash
/// is kept as written.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let start = input.current_token_start();
    let quote = opening_quote(input)?;
    let body: &'a str = **input;

    let mut end = None;
    let mut last_escaped_quote = None;
    let mut chars = body.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == '\\' && chars.peek().is_some_and(|&(_, next)| next == quote) {
            chars.next();
            last_escaped_quote = Some(i + 1);
        } else if c == quote {
            end = Some(i);
            break;
        }
    }

    // Without a plain closing quote, the last escaped one closes the string.
    let Some(end) = end.or(last_escaped_quote) else {
        input.finish();
        return Err(cut_error(
            input,
            LexerDiagnostic {
                code: ErrorCode::E003,
                message: "unterminated string literal",
                help: Some("add the closing quote"),
                start,
            },
        ));
    };

    input.next_slice(end + quote.len_utf8());
    let escaped: String = [quote].iter().collect();
    let value = body[..end].replace(&format!("\\{escaped}"), &escaped);
    Ok(Token::StringLiteral(value))
}

fn opening_quote<'a>(input: &mut Input<'a>) -> IResult<'a, char> {
    one_of(['"', '\'']).parse_next(input)
}

/// Parse `true`, `false`, `undefined` and `null`.
fn keyword_literal<'a>(input: &mut Input<'a>, square: bool) -> IResult<'a, Token<'a>> {
    (
        alt((
            "true".value(Token::Boolean(true)),
            "false".value(Token::Boolean(false)),
            "undefined".value(Token::Undefined),
            "null".value(Token::Null),
        )),
        peek(|i: &mut Input<'a>| boundary(i, LITERAL_LOOKAHEAD, square)),
    )
        .map(|(token, ())| token)
        .parse_next(input)
}

/// Parse an integer or decimal number, optionally negative.
fn number<'a>(input: &mut Input<'a>, square: bool) -> IResult<'a, Token<'a>> {
    (
        (opt('-'), digit1, opt(('.', digit1))).take(),
        peek(|i: &mut Input<'a>| boundary(i, LITERAL_LOOKAHEAD, square)),
    )
        .map(|(text, ())| Token::Number(text))
        .parse_next(input)
}

/// Parse an unbracketed identifier.
fn identifier<'a>(input: &mut Input<'a>, square: bool) -> IResult<'a, Token<'a>> {
    (
        take_while(1.., is_id_char),
        peek(|i: &mut Input<'a>| boundary(i, ID_LOOKAHEAD, square)),
    )
        .map(|(text, ())| Token::Id(Cow::Borrowed(text)))
        .parse_next(input)
}

/// Parse a bracketed identifier: `[any text]`, with `\]` and `\\` escapes.
fn bracket_identifier<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let body: &'a str = **input;
    if !body.starts_with('[') {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }

    let mut chars = body.char_indices().skip(1).peekable();
    let mut needs_unescape = false;
    let mut end = None;
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' if chars.peek().is_some_and(|&(_, next)| next == ']') => {
                chars.next();
                needs_unescape = true;
            }
            ']' => {
                end = Some(i + 1);
                break;
            }
            _ => {}
        }
    }

    let Some(end) = end else {
        return Err(ErrMode::Backtrack(ContextError::new()));
    };
    let text = input.next_slice(end);

    if needs_unescape || text.contains("\\\\") {
        let mut unescaped = String::with_capacity(text.len());
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\\' && matches!(chars.peek(), Some('\\' | ']')) {
                if let Some(next) = chars.next() {
                    unescaped.push(next);
                }
            } else {
                unescaped.push(c);
            }
        }
        Ok(Token::Id(Cow::Owned(unescaped)))
    } else {
        Ok(Token::Id(Cow::Borrowed(text)))
    }
}

/// Parse `[` / `]` as array literal delimiters.
///
/// Only active with square literal syntax. A `[` right after a path
/// separator still starts a bracketed segment.
fn array_delimiter<'a>(
    input: &mut Input<'a>,
    square: bool,
    after_sep: bool,
) -> IResult<'a, Token<'a>> {
    if !square {
        return Err(ErrMode::Backtrack(ContextError::new()));
    }
    if after_sep {
        ']'.value(Token::CloseArray).parse_next(input)
    } else {
        alt(('['.value(Token::OpenArray), ']'.value(Token::CloseArray))).parse_next(input)
    }
}

fn skip_whitespace<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    multispace0.void().parse_next(input)
}

/// Parse a single token inside a tag.
fn mustache_token<'a>(
    input: &mut Input<'a>,
    square: bool,
    after_sep: bool,
) -> IResult<'a, Token<'a>> {
    alt((
        "{{{{".value(Token::OpenRawBlock),
        "}}}}".value(Token::CloseRawBlock),
        open_tag,
        ('}', opt('~'), "}}").take().map(Token::CloseUnescaped),
        (opt('~'), "}}").take().map(Token::Close),
        '('.value(Token::OpenSexpr),
        ')'.value(Token::CloseSexpr),
        '='.value(Token::Equals),
        dots,
        string_literal,
        '@'.value(Token::Data),
        |i: &mut Input<'a>| keyword_literal(i, square),
        |i: &mut Input<'a>| number(i, square),
        ("as", multispace1, '|').value(Token::OpenBlockParams),
        '|'.value(Token::CloseBlockParams),
        |i: &mut Input<'a>| array_delimiter(i, square, after_sep),
        |i: &mut Input<'a>| identifier(i, square),
        bracket_identifier,
    ))
    .parse_next(input)
}

/// Lexer that accumulates tokens while switching modes.
struct Lexer<'a> {
    square: bool,
    mode: Mode,
    tokens: Vec<PositionedToken<'a>>,
    /// Start of the most recent `{{{{` raw block opener.
    raw_start: usize,
}

impl<'a> Lexer<'a> {
    fn new(square: bool) -> Self {
        Self {
            square,
            mode: Mode::Content,
            tokens: Vec::new(),
            raw_start: 0,
        }
    }

    fn push(&mut self, token: Token<'a>, start: usize, end: usize) {
        self.tokens
            .push(PositionedToken::new(token, Span::new(start..end)));
    }

    fn push_content(&mut self, text: &'a str, start: usize, end: usize) {
        if !text.is_empty() {
            self.push(Token::Content(text), start, end);
        }
    }

    /// Tokenize the whole input.
    fn run(&mut self, input: &mut Input<'a>) -> IResult<'a, ()> {
        while !input.is_empty() {
            match self.mode {
                Mode::Content => self.content(input)?,
                Mode::Mustache => self.mustache(input)?,
                Mode::Raw => self.raw(input)?,
            }
        }
        if self.mode == Mode::Raw {
            return Err(self.unterminated_raw_block(input));
        }
        Ok(())
    }

    /// Lex text up to the next tag.
    ///
    /// `\{{` escapes a tag: the backslash is dropped and the tag text is
    /// emitted as content. `\\{{` drops one backslash and opens the tag.
    fn content(&mut self, input: &mut Input<'a>) -> IResult<'a, ()> {
        let start = input.current_token_start();
        let text: &'a str = **input;

        let Some(open) = text.find("{{") else {
            let rest = input.finish();
            self.push_content(rest, start, start + rest.len());
            return Ok(());
        };

        let before = input.next_slice(open);
        let end = start + open;
        if before.ends_with("\\\\") {
            self.push_content(&before[..before.len() - 1], start, end);
            self.mode = Mode::Mustache;
        } else if let Some(stripped) = before.strip_suffix('\\') {
            self.push_content(stripped, start, end);
            self.escaped_content(input);
        } else {
            self.push_content(before, start, end);
            self.mode = Mode::Mustache;
        }
        Ok(())
    }

    /// Emit an escaped tag as content, up to the next possible tag start.
    fn escaped_content(&mut self, input: &mut Input<'a>) {
        let start = input.current_token_start();
        let text: &'a str = **input;

        let end = text
            .char_indices()
            .map(|(i, _)| i)
            .filter(|&i| i >= 2)
            .find(|&i| {
                let rest = &text[i..];
                rest.starts_with("{{") || rest.starts_with("\\{{") || rest.starts_with("\\\\{{")
            })
            .unwrap_or(text.len());

        let escaped = input.next_slice(end);
        self.push_content(escaped, start, start + end);
    }

    /// Lex one token inside a tag.
    fn mustache(&mut self, input: &mut Input<'a>) -> IResult<'a, ()> {
        skip_whitespace(input)?;
        if input.is_empty() {
            return Ok(());
        }

        let start = input.current_token_start();
        let after_sep = matches!(
            self.tokens.last().map(|t| &t.token),
            Some(Token::Sep(_) | Token::PrivateSep)
        );

        let token = match mustache_token(input, self.square, after_sep) {
            Ok(token) => token,
            Err(ErrMode::Backtrack(_)) => {
                input.next_token();
                return Err(cut_error(
                    input,
                    LexerDiagnostic {
                        code: ErrorCode::E001,
                        message: "unexpected character",
                        help: None,
                        start,
                    },
                ));
            }
            Err(e) => return Err(e),
        };
        let end = input.current_token_start();

        match token {
            Token::Close(_) | Token::CloseUnescaped(_) | Token::Inverse(_) | Token::Comment(_) => {
                self.mode = Mode::Content;
            }
            Token::OpenRawBlock => self.raw_start = start,
            Token::CloseRawBlock => self.mode = Mode::Raw,
            _ => {}
        }

        self.push(token, start, end);
        Ok(())
    }

    /// Capture a raw block body up to its `{{{{/name}}}}` closer.
    ///
    /// Nested `{{{{name}}}}` openers are part of the body and must be
    /// balanced by their own closers.
    fn raw(&mut self, input: &mut Input<'a>) -> IResult<'a, ()> {
        let start = input.current_token_start();
        let text: &'a str = **input;

        let mut depth = 0usize;
        let mut offset = 0;
        while let Some(found) = text[offset..].find("{{{{") {
            let at = offset + found;
            let rest = &text[at..];

            match raw_close_name(rest) {
                Some(name) if depth == 0 => {
                    let close_len = "{{{{/".len() + name.len() + "}}}}".len();
                    self.push_content(&text[..at], start, start + at);
                    self.push(
                        Token::EndRawBlock(name),
                        start + at,
                        start + at + close_len,
                    );
                    input.next_slice(at + close_len);
                    self.mode = Mode::Content;
                    return Ok(());
                }
                Some(name) => {
                    depth -= 1;
                    offset = at + "{{{{/".len() + name.len() + "}}}}".len();
                }
                None => {
                    if !rest[4..].starts_with('/') {
                        depth += 1;
                    }
                    offset = at + 4;
                }
            }
        }

        input.finish();
        Err(self.unterminated_raw_block(input))
    }

    fn unterminated_raw_block(&self, input: &Input<'a>) -> ErrMode<ContextError<LexerDiagnostic>> {
        cut_error(
            input,
            LexerDiagnostic {
                code: ErrorCode::E004,
                message: "unterminated raw block",
                help: Some("close the raw block with `{{{{/name}}}}`"),
                start: self.raw_start,
            },
        )
    }

    /// Convert a lexer error into a diagnostic.
    ///
    /// Extracts the `LexerDiagnostic` context. Falls back to E001
    /// (unexpected character) if no context is present.
    fn convert_err_mode(
        err: ErrMode<ContextError<LexerDiagnostic>>,
        error_pos: usize,
        index: &LineIndex<'_>,
        source_name: Option<Arc<str>>,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let loc = index.location(Span::new(*start..error_pos), source_name);
            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(loc, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let loc = index.location(Span::new(error_pos..error_pos), source_name);
        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E001)
            .with_label(loc, ErrorCode::E001.description())
    }
}

/// The name of a `{{{{/name}}}}` closer at the start of `text`.
fn raw_close_name(text: &str) -> Option<&str> {
    let rest = text.strip_prefix("{{{{/")?;
    let len = rest
        .char_indices()
        .find(|&(_, c)| !is_id_char(c))
        .map_or(rest.len(), |(i, _)| i);
    (len > 0 && rest[len..].starts_with("}}}}")).then(|| &rest[..len])
}

/// A lexical error and the tokens read before it.
#[derive(Debug)]
pub struct LexError<'a> {
    pub tokens: Vec<PositionedToken<'a>>,
    pub diagnostic: Diagnostic,
}

/// Split template source into positioned tokens.
///
/// With `square_literals` set, `[` and `]` delimit array literals instead
/// of bracketed path segments (except directly after a path separator).
///
/// # Returns
///
/// - `Ok(tokens)` - The whole input was tokenized
/// - `Err(LexError)` - The first lexical error, located in `source_name`
pub fn tokenize<'a>(
    input: &'a str,
    square_literals: bool,
    source_name: Option<&Arc<str>>,
) -> Result<Vec<PositionedToken<'a>>, LexError<'a>> {
    let mut located_input = LocatingSlice::new(input);
    let mut lexer = Lexer::new(square_literals);

    match lexer.run(&mut located_input) {
        Ok(()) => Ok(lexer.tokens),
        Err(e) => {
            let error_pos = located_input.current_token_start();
            let index = LineIndex::new(input);
            Err(LexError {
                diagnostic: Lexer::convert_err_mode(e, error_pos, &index, source_name.cloned()),
                tokens: lexer.tokens,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<Token<'_>> {
        tokenize(input, false, None)
            .expect("input should tokenize")
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    fn lex_error(input: &str) -> Diagnostic {
        tokenize(input, false, None)
            .expect_err("input should fail to tokenize")
            .diagnostic
    }

    fn id(text: &str) -> Token<'_> {
        Token::Id(Cow::Borrowed(text))
    }

    #[test]
    fn test_content_only() {
        assert_eq!(lex("hello\nworld"), vec![Token::Content("hello\nworld")]);
        assert!(lex("").is_empty());
    }

    #[test]
    fn test_simple_mustache() {
        assert_eq!(
            lex("a {{foo}} b"),
            vec![
                Token::Content("a "),
                Token::Open("{{"),
                id("foo"),
                Token::Close("}}"),
                Token::Content(" b"),
            ]
        );
    }

    #[test]
    fn test_strip_markers_stay_in_delimiters() {
        assert_eq!(
            lex("{{~#if x~}}"),
            vec![
                Token::OpenBlock("{{~#"),
                id("if"),
                id("x"),
                Token::Close("~}}"),
            ]
        );
    }

    #[test]
    fn test_tag_openers() {
        assert_eq!(lex("{{{x}}}")[0], Token::OpenUnescaped("{{{"));
        assert_eq!(lex("{{&x}}")[0], Token::Open("{{&"));
        assert_eq!(lex("{{*x}}")[0], Token::Open("{{*"));
        assert_eq!(lex("{{#*x}}")[0], Token::OpenBlock("{{#*"));
        assert_eq!(lex("{{>x}}")[0], Token::OpenPartial("{{>"));
        assert_eq!(lex("{{#>x}}")[0], Token::OpenPartialBlock("{{#>"));
        assert_eq!(lex("{{/x}}")[0], Token::OpenEndBlock("{{/"));
        assert_eq!(lex("{{^x}}")[0], Token::OpenInverse("{{^"));
        assert_eq!(lex("{{{x}}}")[2], Token::CloseUnescaped("}}}"));
    }

    #[test]
    fn test_inverse_tags() {
        assert_eq!(lex("{{^}}"), vec![Token::Inverse("{{^}}")]);
        assert_eq!(lex("{{ else }}"), vec![Token::Inverse("{{ else }}")]);
        assert_eq!(lex("{{~else~}}"), vec![Token::Inverse("{{~else~}}")]);
        assert_eq!(
            lex("{{else if x}}"),
            vec![
                Token::OpenInverseChain("{{else"),
                id("if"),
                id("x"),
                Token::Close("}}"),
            ]
        );
    }

    #[test]
    fn test_else_prefix_is_not_inverse_chain() {
        assert_eq!(
            lex("{{elsewhere}}"),
            vec![Token::Open("{{"), id("elsewhere"), Token::Close("}}")]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            lex("a{{! note }}b"),
            vec![
                Token::Content("a"),
                Token::Comment("{{! note }}"),
                Token::Content("b"),
            ]
        );
        assert_eq!(
            lex("{{!-- has }} inside --}}"),
            vec![Token::Comment("{{!-- has }} inside --}}")]
        );
        assert_eq!(lex("{{!--}}"), vec![Token::Comment("{{!--}}")]);
        assert_eq!(lex("{{~!-- x --~}}"), vec![Token::Comment("{{~!-- x --~}}")]);
    }

    #[test]
    fn test_unterminated_comment() {
        let diag = lex_error("{{!-- never closed }}");
        assert_eq!(diag.code(), Some(ErrorCode::E002));
    }

    #[test]
    fn test_paths_and_separators() {
        assert_eq!(
            lex("{{../foo.bar/baz}}"),
            vec![
                Token::Open("{{"),
                id(".."),
                Token::Sep("/"),
                id("foo"),
                Token::Sep("."),
                id("bar"),
                Token::Sep("/"),
                id("baz"),
                Token::Close("}}"),
            ]
        );
        assert_eq!(
            lex("{{.}}"),
            vec![Token::Open("{{"), id("."), Token::Close("}}")]
        );
        assert_eq!(
            lex("{{foo.#bar}}"),
            vec![
                Token::Open("{{"),
                id("foo"),
                Token::PrivateSep,
                id("bar"),
                Token::Close("}}"),
            ]
        );
    }

    #[test]
    fn test_bracket_identifiers() {
        assert_eq!(
            lex("{{foo.[bar baz]}}"),
            vec![
                Token::Open("{{"),
                id("foo"),
                Token::Sep("."),
                id("[bar baz]"),
                Token::Close("}}"),
            ]
        );
        assert_eq!(lex("{{[a\\]b]}}")[1], Token::Id(Cow::Owned("[a]b]".to_string())));
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            lex("{{f \"a\\\"b\" 'c' 12 -1.5 true false undefined null}}"),
            vec![
                Token::Open("{{"),
                id("f"),
                Token::StringLiteral("a\"b".to_string()),
                Token::StringLiteral("c".to_string()),
                Token::Number("12"),
                Token::Number("-1.5"),
                Token::Boolean(true),
                Token::Boolean(false),
                Token::Undefined,
                Token::Null,
                Token::Close("}}"),
            ]
        );
    }

    #[test]
    fn test_literal_prefixes_lex_as_identifiers() {
        assert_eq!(lex("{{trueish}}")[1], id("trueish"));
        assert_eq!(lex("{{12px}}")[1], id("12px"));
    }

    #[test]
    fn test_hash_and_block_params() {
        assert_eq!(
            lex("{{#each xs key=1 as |x i|}}"),
            vec![
                Token::OpenBlock("{{#"),
                id("each"),
                id("xs"),
                id("key"),
                Token::Equals,
                Token::Number("1"),
                Token::OpenBlockParams,
                id("x"),
                id("i"),
                Token::CloseBlockParams,
                Token::Close("}}"),
            ]
        );
    }

    #[test]
    fn test_sub_expressions_and_data() {
        assert_eq!(
            lex("{{f (g @index)}}"),
            vec![
                Token::Open("{{"),
                id("f"),
                Token::OpenSexpr,
                id("g"),
                Token::Data,
                id("index"),
                Token::CloseSexpr,
                Token::Close("}}"),
            ]
        );
    }

    #[test]
    fn test_escaped_mustache() {
        assert_eq!(
            lex("a\\{{b}} {{c}}"),
            vec![
                Token::Content("a"),
                Token::Content("{{b}} "),
                Token::Open("{{"),
                id("c"),
                Token::Close("}}"),
            ]
        );
    }

    #[test]
    fn test_escaped_backslash_opens_mustache() {
        assert_eq!(
            lex("a\\\\{{b}}"),
            vec![
                Token::Content("a\\"),
                Token::Open("{{"),
                id("b"),
                Token::Close("}}"),
            ]
        );
    }

    #[test]
    fn test_raw_block() {
        assert_eq!(
            lex("{{{{raw}}}} {{x}} {{{{/raw}}}}"),
            vec![
                Token::OpenRawBlock,
                id("raw"),
                Token::CloseRawBlock,
                Token::Content(" {{x}} "),
                Token::EndRawBlock("raw"),
            ]
        );
    }

    #[test]
    fn test_nested_raw_block_is_content() {
        let tokens = lex("{{{{a}}}}{{{{b}}}}x{{{{/b}}}}{{{{/a}}}}");
        assert_eq!(tokens[3], Token::Content("{{{{b}}}}x{{{{/b}}}}"));
        assert_eq!(tokens[4], Token::EndRawBlock("a"));
    }

    #[test]
    fn test_unterminated_raw_block() {
        let diag = lex_error("{{{{raw}}}} body");
        assert_eq!(diag.code(), Some(ErrorCode::E004));
        assert_eq!(diag.location().map(|l| l.start.column), Some(0));
    }

    #[test]
    fn test_unterminated_string() {
        let diag = lex_error("{{foo \"bar}}");
        assert_eq!(diag.code(), Some(ErrorCode::E003));
        assert_eq!(diag.location().map(|l| l.start.column), Some(6));
    }

    #[test]
    fn test_unexpected_character() {
        let diag = lex_error("line\n{{foo %}}");
        assert_eq!(diag.code(), Some(ErrorCode::E001));
        let loc = diag.location().expect("diagnostic has a location");
        assert_eq!((loc.start.line, loc.start.column), (2, 6));
    }

    #[test]
    fn test_square_literal_mode() {
        let tokens: Vec<_> = tokenize("{{f [1 2] a.[b]}}", true, None)
            .expect("input should tokenize")
            .into_iter()
            .map(|t| t.token)
            .collect();
        assert_eq!(
            tokens,
            vec![
                Token::Open("{{"),
                id("f"),
                Token::OpenArray,
                Token::Number("1"),
                Token::Number("2"),
                Token::CloseArray,
                id("a"),
                Token::Sep("."),
                id("[b]"),
                Token::Close("}}"),
            ]
        );
    }

    #[test]
    fn test_error_keeps_earlier_tokens() {
        let err = tokenize("{{{{raw}}}}{{{{/notraw}}}}{{{{/raw}}}}", false, None)
            .expect_err("input should fail to tokenize");
        assert_eq!(err.diagnostic.code(), Some(ErrorCode::E004));
        assert_eq!(err.tokens[3].token, Token::EndRawBlock("notraw"));
        assert!(err.tokens[3].ends_tag());
    }

    #[test]
    fn test_token_spans() {
        let tokens = tokenize("ab{{c}}", false, None).expect("input should tokenize");
        let spans: Vec<_> = tokens.iter().map(|t| t.span.range()).collect();
        assert_eq!(spans, vec![0..2, 2..4, 4..5, 5..7]);
    }
}
