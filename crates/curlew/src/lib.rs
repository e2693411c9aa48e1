//! Curlew - the front end of a logic-less Mustache-family template language.
//!
//! Parses template text into a syntax tree, normalizes the whitespace around
//! standalone tags, and renders trees in a canonical debug format. The
//! traversal API for writing template analyses and rewrites is re-exported
//! from `curlew-parser`.

pub mod config;

mod error;

pub use curlew_parser::{ast, visit, visit_mut};

pub use error::CurlewError;

use log::{debug, info, trace};

use ast::Program;
use config::AppConfig;
use curlew_parser::ParseOptions;

/// Builder for parsing and printing templates.
///
/// # Examples
///
/// ```
/// use curlew::{TemplateBuilder, config::AppConfig};
///
/// let builder = TemplateBuilder::new(AppConfig::default());
/// let program = builder.parse("Hello {{name}}!").expect("Failed to parse");
///
/// assert_eq!(
///     builder.print(&program),
///     "CONTENT[ 'Hello ' ]\n{{ p%name [] }}\nCONTENT[ '!' ]\n"
/// );
/// ```
#[derive(Debug, Default)]
pub struct TemplateBuilder {
    config: AppConfig,
    source_name: Option<String>,
}

impl TemplateBuilder {
    /// Create a new template builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            source_name: None,
        }
    }

    /// Name the template being parsed. Overrides the configured source
    /// name.
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    /// Parse a template and normalize its whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`CurlewError::Parse`] with the template source attached for
    /// lexical, grammar and tree-building errors.
    pub fn parse(&self, source: &str) -> Result<Program, CurlewError> {
        info!(source_name:? = self.source_name; "Parsing template");

        let program = curlew_parser::parse(source, &self.options())
            .map_err(|err| CurlewError::new_parse_error(err, source))?;

        debug!(statements = program.body.len(); "Template parsed successfully");
        trace!(program:?; "Parsed template");
        Ok(program)
    }

    /// Parse a template, leaving its whitespace exactly as written.
    ///
    /// # Errors
    ///
    /// Same as [`TemplateBuilder::parse`].
    pub fn parse_without_processing(&self, source: &str) -> Result<Program, CurlewError> {
        info!(source_name:? = self.source_name; "Parsing template without whitespace control");

        curlew_parser::parse_without_processing(source, &self.options())
            .map_err(|err| CurlewError::new_parse_error(err, source))
    }

    /// Render a tree in the canonical debug format.
    pub fn print(&self, program: &Program) -> String {
        curlew_parser::print(program)
    }

    fn options(&self) -> ParseOptions {
        let options = self.config.parser().parse_options();
        match &self.source_name {
            Some(name) => options.with_src_name(name.as_str()),
            None => options,
        }
    }
}
