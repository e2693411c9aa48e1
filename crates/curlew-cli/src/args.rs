//! Command-line argument definitions for the Curlew CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, whitespace handling and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Curlew template tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input template
    #[arg(help = "Path to the input template")]
    pub input: String,

    /// Path to write the printed tree to (stdout when absent)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Print the tree as parsed, without whitespace normalization
    #[arg(long)]
    pub raw: bool,

    /// Keep the padding around standalone tags
    #[arg(long)]
    pub ignore_standalone: bool,
}
