//! Curlew CLI library
//!
//! This module contains the core CLI logic for the Curlew template tool.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs,
    io::{self, Write},
};

use log::info;

use curlew::{CurlewError, TemplateBuilder};

/// Run the Curlew CLI application
///
/// Parses the input template and writes its printed tree to the output
/// file, or to stdout when no output path is given.
///
/// # Errors
///
/// Returns `CurlewError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Template parse errors
pub fn run(args: &Args) -> Result<(), CurlewError> {
    info!(
        input_path = args.input,
        output_path:? = args.output,
        raw = args.raw;
        "Processing template"
    );

    let app_config = config::resolve(args)?;
    let source = fs::read_to_string(&args.input)?;

    let builder = TemplateBuilder::new(app_config);
    let program = if args.raw {
        builder.parse_without_processing(&source)?
    } else {
        builder.parse(&source)?
    };
    let printed = builder.print(&program);

    match &args.output {
        Some(path) => {
            fs::write(path, printed)?;
            info!(output_file = path; "Tree written successfully");
        }
        None => io::stdout().write_all(printed.as_bytes())?,
    }

    Ok(())
}
