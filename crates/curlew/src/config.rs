//! Configuration types for Curlew template parsing.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from
//! TOML or any other serde format. Every field has a default, so an empty
//! document is a valid configuration.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration.
//! - [`ParserConfig`] - Options handed to the parser for every template.
//! - [`SquareMode`] - How `[...]` is read inside tags.
//!
//! # Example
//!
//! ```
//! # use curlew::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(!config.parser().ignore_standalone());
//! ```

use serde::Deserialize;

use curlew_parser::{ParseOptions, SquareSyntax};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Parser configuration section.
    #[serde(default)]
    parser: ParserConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the given parser section.
    pub fn new(parser: ParserConfig) -> Self {
        Self { parser }
    }

    /// Returns the parser configuration.
    pub fn parser(&self) -> &ParserConfig {
        &self.parser
    }
}

/// How square brackets inside tags are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SquareMode {
    /// `[...]` is a literal path segment.
    #[default]
    String,
    /// `[a b]` outside a path is an array literal.
    Node,
}

/// Options for parsing templates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParserConfig {
    /// Keep the padding around standalone tags.
    #[serde(default)]
    ignore_standalone: bool,

    #[serde(default)]
    square: SquareMode,

    /// Name recorded on every node location.
    #[serde(default)]
    source_name: Option<String>,
}

impl ParserConfig {
    /// Creates a new [`ParserConfig`].
    ///
    /// # Arguments
    ///
    /// * `ignore_standalone` - Skip standalone whitespace removal.
    /// * `square` - Reading of `[...]` inside tags.
    /// * `source_name` - Optional name attached to node locations.
    pub fn new(ignore_standalone: bool, square: SquareMode, source_name: Option<String>) -> Self {
        Self {
            ignore_standalone,
            square,
            source_name,
        }
    }

    pub fn ignore_standalone(&self) -> bool {
        self.ignore_standalone
    }

    pub fn square(&self) -> SquareMode {
        self.square
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// The parser options described by this section.
    pub fn parse_options(&self) -> ParseOptions {
        let square = match self.square {
            SquareMode::String => SquareSyntax::String,
            SquareMode::Node => SquareSyntax::Node,
        };

        let options = ParseOptions::default()
            .with_ignore_standalone(self.ignore_standalone)
            .with_square(square);
        match &self.source_name {
            Some(name) => options.with_src_name(name.as_str()),
            None => options,
        }
    }
}
