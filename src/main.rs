//! cdlparse - CDL syntax and semantics checker
//!
//! Parses one CDL file, prints its diagnostics and, on request, the
//! canonical CDL of the parsed dataset.
//!
//! # Usage
//!
//! ```bash
//! cdlparse sample.cdl
//! cdlparse --strict --max-errors 20 sample.cdl
//! RUST_LOG=cdl_parser=debug cdlparse --emit sample.cdl
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use cdl_parser::{parse_file, CdlError, ParseOptions};
use tracing_subscriber::EnvFilter;

/// Check a CDL (netCDF Common Data form Language) file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the CDL file
    #[arg(value_name = "CDL_FILE")]
    file: PathBuf,

    /// Treat warnings as errors
    #[arg(long)]
    strict: bool,

    /// Stop after this many errors
    #[arg(long, default_value_t = cdl_parser::config::DEFAULT_MAX_ERRORS)]
    max_errors: usize,

    /// Reject unlimited dimensions
    #[arg(long)]
    no_unlimited: bool,

    /// Print the parsed dataset as canonical CDL
    #[arg(long)]
    emit: bool,
}

fn main() -> ExitCode {
    // Log to stderr so --emit output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cdl_parser=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let options = ParseOptions::new()
        .with_strict(args.strict)
        .with_max_errors(args.max_errors)
        .with_unlimited_dimension(!args.no_unlimited);

    match parse_file(&args.file, options) {
        Ok(output) => {
            for warning in output.warnings() {
                eprintln!("{}:{}", args.file.display(), warning);
            }
            let dataset = &output.dataset;
            eprintln!(
                "{}: ok: {} dimension(s), {} variable(s), {} attribute(s), {} warning(s)",
                args.file.display(),
                dataset.dimensions.len(),
                dataset.variables.len(),
                dataset.attributes.len() + dataset.variable_attribute_count(),
                output.warnings().len()
            );
            if args.emit {
                print!("{}", dataset);
            }
            ExitCode::SUCCESS
        }
        Err(CdlError::ParseFailed {
            errors,
            diagnostics,
        }) => {
            for diagnostic in &diagnostics {
                eprintln!("{}:{}", args.file.display(), diagnostic);
            }
            eprintln!(
                "{}: failed: {} error(s), {} warning(s)",
                args.file.display(),
                errors,
                diagnostics.len() - errors
            );
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
