//! Error types for the CDL parser.
//!
//! Problems found *inside* a CDL document are not Rust errors: they are
//! recorded as [`Diagnostic`]s while parsing continues. [`CdlError`] covers the
//! conditions that end a parse invocation: a document that failed (at least one
//! error-severity diagnostic), rejected options, or an unreadable input file.

use thiserror::Error;

use crate::diagnostics::{Diagnostic, Severity};

/// Result type alias using [`CdlError`].
pub type Result<T> = std::result::Result<T, CdlError>;

/// Unified error type for all parser operations.
#[derive(Error, Debug)]
pub enum CdlError {
    /// The document produced one or more error diagnostics.
    #[error("CDL parsing failed with {errors} error(s)")]
    ParseFailed {
        /// Number of error-severity diagnostics.
        errors: usize,
        /// All diagnostics of the session, sorted by source position.
        diagnostics: Vec<Diagnostic>,
    },

    /// Invalid parse configuration
    #[error("Invalid parse option: {message}")]
    InvalidOption { message: String },

    /// Error reading a CDL file
    #[error("Failed to read CDL file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CdlError {
    /// Create a parse failure from a session's diagnostics.
    pub fn parse_failed(diagnostics: Vec<Diagnostic>) -> Self {
        let errors = diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        Self::ParseFailed {
            errors,
            diagnostics,
        }
    }

    /// Create an invalid option error
    pub fn invalid_option(message: impl Into<String>) -> Self {
        Self::InvalidOption {
            message: message.into(),
        }
    }

    /// Diagnostics attached to a failed parse (empty for other errors).
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::ParseFailed { diagnostics, .. } => diagnostics,
            _ => &[],
        }
    }
}
