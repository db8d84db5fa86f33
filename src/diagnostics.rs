//! Diagnostics collected during one parse session.
//!
//! Every stage of the pipeline reports problems into a [`Diagnostics`]
//! collector instead of returning early. The collector decides whether the
//! session succeeds, applies the strict-mode promotion of warnings, and tracks
//! the error limit configured in [`ParseOptions`].

use std::fmt;

use tracing::trace;

use crate::config::ParseOptions;

/// A position in CDL source text (1-indexed line and column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number in characters (1-indexed)
    pub column: usize,
}

impl Position {
    /// Create a new source position.
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// What went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DiagnosticKind {
    /// Malformed token (bad constant, unterminated string, stray character)
    Lexical,
    /// Statement does not match the grammar
    Syntax,
    /// Name collision for a dimension, variable, attribute or data block
    DuplicateDefinition,
    /// Dimension or variable name not found
    UnresolvedReference,
    /// Literal type differs from its target type
    TypeMismatch,
    /// Literal value outside the range of its type
    Overflow,
    /// More data values than a fixed-size variable can hold
    CapacityExceeded,
    /// Bad dimension size or misuse of the unlimited dimension
    InvalidDimension,
    /// The configured error limit stopped the session
    ErrorLimit,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lexical => "lexical",
            Self::Syntax => "syntax",
            Self::DuplicateDefinition => "duplicate-definition",
            Self::UnresolvedReference => "unresolved-reference",
            Self::TypeMismatch => "type-mismatch",
            Self::Overflow => "overflow",
            Self::CapacityExceeded => "capacity-exceeded",
            Self::InvalidDimension => "invalid-dimension",
            Self::ErrorLimit => "error-limit",
        };
        f.write_str(name)
    }
}

/// A single recorded problem.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
    pub position: Position,
    /// What the parser did to continue, if anything was skipped
    pub recovery: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic
    pub fn error(kind: DiagnosticKind, position: Position, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            message: message.into(),
            position,
            recovery: None,
        }
    }

    /// Create a warning diagnostic
    pub fn warning(kind: DiagnosticKind, position: Position, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            message: message.into(),
            position,
            recovery: None,
        }
    }

    /// Attach the recovery action taken by the parser.
    pub fn with_recovery(mut self, recovery: impl Into<String>) -> Self {
        self.recovery = Some(recovery.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}[{}]: {}",
            self.position, self.severity, self.kind, self.message
        )?;
        if let Some(recovery) = &self.recovery {
            write!(f, " ({})", recovery)?;
        }
        Ok(())
    }
}

/// Per-session diagnostic accumulator.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    strict: bool,
    max_errors: usize,
    errors: usize,
    /// Diagnostics dropped after the error limit was reached
    suppressed: usize,
}

impl Diagnostics {
    /// Create an empty collector configured from the parse options.
    pub fn new(options: &ParseOptions) -> Self {
        Self {
            entries: Vec::new(),
            strict: options.strict,
            max_errors: options.max_errors,
            errors: 0,
            suppressed: 0,
        }
    }

    /// Record a diagnostic. In strict mode warnings are recorded as errors.
    /// Once the error limit is reached further diagnostics are dropped.
    pub fn record(&mut self, mut diagnostic: Diagnostic) {
        if self.limit_reached() {
            trace!(%diagnostic, "dropped diagnostic past the error limit");
            self.suppressed += 1;
            return;
        }
        if self.strict {
            diagnostic.severity = Severity::Error;
        }
        if diagnostic.is_error() {
            self.errors += 1;
        }
        trace!(%diagnostic, "recorded diagnostic");
        self.entries.push(diagnostic);
    }

    pub fn error(&mut self, kind: DiagnosticKind, position: Position, message: impl Into<String>) {
        self.record(Diagnostic::error(kind, position, message));
    }

    pub fn warning(&mut self, kind: DiagnosticKind, position: Position, message: impl Into<String>) {
        self.record(Diagnostic::warning(kind, position, message));
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn error_count(&self) -> usize {
        self.errors
    }

    pub fn warning_count(&self) -> usize {
        self.entries.len() - self.errors
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True once the configured number of errors has been recorded.
    pub fn limit_reached(&self) -> bool {
        self.errors >= self.max_errors
    }

    /// Record the final diagnostic for a session stopped by the error limit.
    pub fn abort(&mut self) {
        let position = self
            .entries
            .iter()
            .map(|d| d.position)
            .max()
            .unwrap_or_default();
        let mut message = format!(
            "too many errors ({} reached the limit of {}); parsing stopped",
            self.errors, self.max_errors
        );
        if self.suppressed > 0 {
            message.push_str(&format!(", {} later diagnostic(s) not shown", self.suppressed));
        }
        self.errors += 1;
        self.entries
            .push(Diagnostic::error(DiagnosticKind::ErrorLimit, position, message));
    }

    /// Number of diagnostics dropped after the error limit was reached.
    pub fn suppressed(&self) -> usize {
        self.suppressed
    }

    /// All diagnostics sorted by source position (stable for equal positions).
    pub fn summary(&self) -> Vec<Diagnostic> {
        let mut entries = self.entries.clone();
        entries.sort_by_key(|d| d.position);
        entries
    }

    /// Consume the collector, returning the sorted diagnostics.
    pub fn into_summary(mut self) -> Vec<Diagnostic> {
        self.entries.sort_by_key(|d| d.position);
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_sorted_by_position() {
        let mut diags = Diagnostics::new(&ParseOptions::default());
        diags.error(DiagnosticKind::Syntax, Position::new(5, 2), "second");
        diags.warning(DiagnosticKind::TypeMismatch, Position::new(1, 9), "first");
        diags.error(DiagnosticKind::Overflow, Position::new(5, 2), "third");

        let summary = diags.summary();
        let messages: Vec<_> = summary.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
        assert_eq!(diags.error_count(), 2);
        assert_eq!(diags.warning_count(), 1);
    }

    #[test]
    fn test_strict_promotes_warnings() {
        let mut diags = Diagnostics::new(&ParseOptions::default().with_strict(true));
        diags.warning(DiagnosticKind::TypeMismatch, Position::new(1, 1), "converted");
        assert!(diags.has_errors());
        assert_eq!(diags.summary()[0].severity, Severity::Error);
    }

    #[test]
    fn test_error_limit() {
        let mut diags = Diagnostics::new(&ParseOptions::default().with_max_errors(2));
        diags.error(DiagnosticKind::Syntax, Position::new(1, 1), "a");
        assert!(!diags.limit_reached());
        diags.warning(DiagnosticKind::TypeMismatch, Position::new(2, 1), "w");
        assert!(!diags.limit_reached());
        diags.error(DiagnosticKind::Syntax, Position::new(3, 1), "b");
        assert!(diags.limit_reached());

        diags.error(DiagnosticKind::Syntax, Position::new(4, 1), "c");
        diags.warning(DiagnosticKind::TypeMismatch, Position::new(5, 1), "w2");
        assert_eq!(diags.error_count(), 2);
        assert_eq!(diags.len(), 3);
        assert_eq!(diags.suppressed(), 2);

        diags.abort();
        assert_eq!(diags.error_count(), 3);
        let last = diags.summary().pop().unwrap();
        assert_eq!(last.kind, DiagnosticKind::ErrorLimit);
        assert_eq!(last.position, Position::new(3, 1));
        assert!(last.message.contains("2 later diagnostic(s) not shown"));
    }

    #[test]
    fn test_display_includes_recovery() {
        let diag = Diagnostic::error(DiagnosticKind::Syntax, Position::new(4, 7), "expected ';'")
            .with_recovery("skipped 2 token(s) through ';'");
        assert_eq!(
            diag.to_string(),
            "4:7: error[syntax]: expected ';' (skipped 2 token(s) through ';')"
        );
    }
}
