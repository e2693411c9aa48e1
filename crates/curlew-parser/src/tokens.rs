use std::{borrow::Cow, fmt};

use winnow::stream::Location;

use crate::span::Span;

/// Token types for the template language.
///
/// Tag delimiters keep their source text so the grammar can read `~` strip
/// markers and the `*`, `{` and `&` modifiers back out of them.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    /// Literal text outside of tags.
    Content(&'src str),
    /// A whole `{{! }}` or `{{!-- --}}` comment.
    Comment(&'src str),

    // Tag openers
    Open(&'src str),             // {{  {{&  {{*
    OpenUnescaped(&'src str),    // {{{
    OpenBlock(&'src str),        // {{#  {{#*
    OpenEndBlock(&'src str),     // {{/
    OpenInverse(&'src str),      // {{^
    OpenInverseChain(&'src str), // {{else
    OpenPartial(&'src str),      // {{>
    OpenPartialBlock(&'src str), // {{#>
    /// A complete `{{^}}` or `{{else}}` tag.
    Inverse(&'src str),
    OpenRawBlock,           // {{{{
    CloseRawBlock,          // }}}}
    EndRawBlock(&'src str), // {{{{/name}}}}

    // Tag closers
    Close(&'src str),         // }}
    CloseUnescaped(&'src str), // }}}

    // Expressions
    OpenSexpr,        // (
    CloseSexpr,       // )
    OpenArray,        // [
    CloseArray,       // ]
    OpenBlockParams,  // as |
    CloseBlockParams, // |
    Equals,           // =
    Data,             // @
    Sep(&'src str),   // . /
    PrivateSep,       // .#
    /// An identifier as written, including `[...]` brackets. Escaped `\]`
    /// inside brackets is already unescaped.
    Id(Cow<'src, str>),
    StringLiteral(String),
    Number(&'src str),
    Boolean(bool),
    Undefined,
    Null,
}

impl Token<'_> {
    /// Whether this token finishes a tag, leaving the lexer back in text.
    pub fn ends_tag(&self) -> bool {
        matches!(
            self,
            Token::Close(_)
                | Token::CloseUnescaped(_)
                | Token::CloseRawBlock
                | Token::EndRawBlock(_)
                | Token::Inverse(_)
                | Token::Comment(_)
        )
    }
}

/// A token with position information for winnow integration
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

impl<'src> std::ops::Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl<'src> fmt::Display for PositionedToken<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}

impl<'src> Location for PositionedToken<'src> {
    fn previous_token_end(&self) -> usize {
        self.span.start()
    }

    fn current_token_start(&self) -> usize {
        self.span.start()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Content(text) => write!(f, "{text:?}"),
            Token::Comment(text)
            | Token::Open(text)
            | Token::OpenUnescaped(text)
            | Token::OpenBlock(text)
            | Token::OpenEndBlock(text)
            | Token::OpenInverse(text)
            | Token::OpenInverseChain(text)
            | Token::OpenPartial(text)
            | Token::OpenPartialBlock(text)
            | Token::Inverse(text)
            | Token::Close(text)
            | Token::CloseUnescaped(text)
            | Token::Sep(text)
            | Token::Number(text) => write!(f, "{text}"),
            Token::Id(text) => write!(f, "{text}"),
            Token::OpenRawBlock => write!(f, "{{{{{{{{"),
            Token::CloseRawBlock => write!(f, "}}}}}}}}"),
            Token::EndRawBlock(name) => write!(f, "{{{{{{{{/{name}}}}}}}}}"),
            Token::OpenSexpr => write!(f, "("),
            Token::CloseSexpr => write!(f, ")"),
            Token::OpenArray => write!(f, "["),
            Token::CloseArray => write!(f, "]"),
            Token::OpenBlockParams => write!(f, "as |"),
            Token::CloseBlockParams => write!(f, "|"),
            Token::Equals => write!(f, "="),
            Token::Data => write!(f, "@"),
            Token::PrivateSep => write!(f, ".#"),
            Token::StringLiteral(s) => write!(f, "{s:?}"),
            Token::Boolean(b) => write!(f, "{b}"),
            Token::Undefined => write!(f, "undefined"),
            Token::Null => write!(f, "null"),
        }
    }
}
