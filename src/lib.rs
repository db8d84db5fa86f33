//! # CDL Parser
//!
//! A parser for CDL (Common Data form Language), the text notation of
//! classic netCDF datasets.
//!
//! This library provides:
//! - A tokenizer and recovering recursive-descent parser for CDL text
//! - A two-pass semantic builder that resolves names declared in any order
//! - Literal typing and coercion against declared variable types
//! - A validated, queryable [`Dataset`] model that renders back to CDL
//!
//! ## Architecture
//!
//! - [`cdl`] - Lexer, parse tree and parser
//! - [`model`] - Dataset model, semantic builder and validator
//! - [`diagnostics`] - Positioned warnings and errors collected per parse
//! - [`session`] - The staged pipeline tying the pieces together
//! - [`config`] - Parse options
//!
//! Problems in the input never panic and never stop the parse early (up to
//! the configured error limit). They are recorded as [`Diagnostic`]s; the
//! parse fails only if at least one of them is an error.
//!
//! ## Usage
//!
//! ```
//! let cdl = r#"
//! netcdf sample {
//! dimensions:
//!     lat = 2 ;
//! variables:
//!     float lat(lat) ;
//!         lat:units = "degrees_north" ;
//! data:
//!     lat = 10.5f, 20.5f ;
//! }"#;
//!
//! let output = cdl_parser::parse(cdl).unwrap();
//! let lat = output.dataset.variable("lat").unwrap();
//! assert_eq!(output.dataset.shape(lat), vec![2]);
//! ```
//!
//! ### CLI
//!
//! ```bash
//! cdlparse sample.cdl --emit
//! ```

pub mod cdl;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod model;
pub mod session;

// Re-export main types for convenience
pub use cdl::{parse, parse_with_options};
#[cfg(feature = "cli")]
pub use cdl::parse_file;
pub use config::ParseOptions;
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Position, Severity};
pub use error::{CdlError, Result};
pub use model::{Dataset, NcType, Value};
pub use session::{ParseOutput, ParseSession, ParseStage};
