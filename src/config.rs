//! Parse configuration.

use crate::error::{CdlError, Result};

/// Default number of errors after which a session stops.
pub const DEFAULT_MAX_ERRORS: usize = 100;

/// Options for a single parse invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Treat warnings as errors (default: false).
    pub strict: bool,
    /// Stop after this many errors (default: 100).
    pub max_errors: usize,
    /// Accept an `unlimited` dimension (default: true).
    pub allow_unlimited_dimension: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict: false,
            max_errors: DEFAULT_MAX_ERRORS,
            allow_unlimited_dimension: true,
        }
    }
}

impl ParseOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that fail on any diagnostic.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors;
        self
    }

    pub fn with_unlimited_dimension(mut self, allow: bool) -> Self {
        self.allow_unlimited_dimension = allow;
        self
    }

    /// Check that the options describe a usable session.
    pub fn validate(&self) -> Result<()> {
        if self.max_errors == 0 {
            return Err(CdlError::invalid_option("max_errors must be at least 1"));
        }
        Ok(())
    }
}
