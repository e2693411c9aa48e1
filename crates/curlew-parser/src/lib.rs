//! # Curlew Parser
//!
//! Front end for Mustache-family templates. This crate turns template text
//! into a syntax tree, normalizes the whitespace around standalone and `~`
//! tags, and offers read-only and mutating traversals over the result.
//!
//! ## Usage
//!
//! ```
//! # use curlew_parser::{parse, print, ParseError, ParseOptions};
//!
//! fn main() -> Result<(), ParseError> {
//!     let program = parse("Hello {{name}}!", &ParseOptions::default())?;
//!     assert_eq!(
//!         print(&program),
//!         "CONTENT[ 'Hello ' ]\n{{ p%name [] }}\nCONTENT[ '!' ]\n"
//!     );
//!     Ok(())
//! }
//! ```

pub mod ast;
pub mod builder;
pub mod error;
mod grammar;
#[cfg(test)]
mod grammar_tests;
mod lexer;
mod options;
mod printer;
mod span;
mod tokens;
pub mod visit;
pub mod visit_mut;
pub mod whitespace;

pub use error::{Diagnostic, ParseError};
pub use options::{HashSyntax, ParseOptions, SquareSyntax, SyntaxOptions};
pub use printer::print;
pub use span::{LineIndex, LocInfo, Position, SourceLocation, Span};

use log::debug;

use ast::Program;
use builder::Builder;
use error::ErrorCode;
use tokens::PositionedToken;
use whitespace::WhitespaceControl;

/// Parse template text into a normalized syntax tree.
///
/// This is the main entry point. It runs the whole front end:
///
/// 1. **Tokenize** - Split the source into positioned tokens
/// 2. **Parse** - Build the tree from the tokens
/// 3. **Normalize** - Apply standalone and `~` whitespace trimming
///
/// # Errors
///
/// Returns a [`ParseError`] carrying the first lexical, grammar or build
/// diagnostic, with its location in `source`.
pub fn parse(source: &str, options: &ParseOptions) -> Result<Program, ParseError> {
    let mut program = parse_without_processing(source, options)?;
    normalize(&mut program, options)?;
    Ok(program)
}

/// Parse template text into a syntax tree, leaving all whitespace as
/// written.
pub fn parse_without_processing(
    source: &str,
    options: &ParseOptions,
) -> Result<Program, ParseError> {
    let builder = Builder::new(options);

    let index = LineIndex::new(source);
    let square = options.syntax.square.is_literal();
    let tokens = match lexer::tokenize(source, square, builder.source()) {
        Ok(tokens) => tokens,
        Err(err) => {
            let earlier = earlier_error(&err.tokens, source, &index, &builder);
            return Err(earlier.unwrap_or(err.diagnostic).into());
        }
    };
    debug!(tokens = tokens.len(); "Tokenized template");

    let program = grammar::build_program(&tokens, source, &index, &builder)?;
    debug!(statements = program.body.len(); "Built template tree");

    Ok(program)
}

/// A grammar or build error among the tags completed before a lexical
/// error. It sits earlier in the source, so it is the one reported.
fn earlier_error<'src>(
    tokens: &'src [PositionedToken<'src>],
    source: &'src str,
    index: &LineIndex<'src>,
    builder: &Builder,
) -> Option<Diagnostic> {
    let complete = tokens.iter().rposition(|t| t.ends_tag()).map_or(0, |i| i + 1);
    let diagnostic = grammar::build_program(&tokens[..complete], source, index, builder)
        .err()
        .filter(|diagnostic| diagnostic.code() != Some(ErrorCode::E101))?;
    debug!(code:? = diagnostic.code(); "Grammar error precedes lexical error");
    Some(diagnostic)
}

/// Run whitespace normalization over a tree the caller already holds.
pub fn normalize(program: &mut Program, options: &ParseOptions) -> Result<(), ParseError> {
    WhitespaceControl::new(options.ignore_standalone).normalize(program)?;
    debug!(
        statements = program.body.len(),
        ignore_standalone = options.ignore_standalone;
        "Normalized whitespace"
    );
    Ok(())
}
