//! Parse sessions.
//!
//! A [`ParseSession`] runs one input through the pipeline
//! `Start → Tokenizing → Parsing → ResolvingDeclarations →
//! ResolvingReferences → Validating → Succeeded | Failed`. Each run owns a
//! fresh [`Diagnostics`] collector; nothing is shared between sessions.

use std::fmt;

use tracing::{debug, warn};

use crate::cdl::{Lexer, Parser};
use crate::config::ParseOptions;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{CdlError, Result};
use crate::model::{validate, Dataset, DatasetBuilder};

/// Pipeline stage of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
    Start,
    Tokenizing,
    Parsing,
    /// Builder pass 1
    ResolvingDeclarations,
    /// Builder pass 2
    ResolvingReferences,
    Validating,
    Succeeded,
    Failed,
}

impl fmt::Display for ParseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Tokenizing => "tokenizing",
            Self::Parsing => "parsing",
            Self::ResolvingDeclarations => "resolving declarations",
            Self::ResolvingReferences => "resolving references",
            Self::Validating => "validating",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A successful parse: the dataset and any warnings.
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub dataset: Dataset,
    /// Warnings sorted by source position (never errors)
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutput {
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// One parse of one input.
#[derive(Debug, Clone)]
pub struct ParseSession<'a> {
    input: &'a str,
    options: ParseOptions,
    stage: ParseStage,
}

impl<'a> ParseSession<'a> {
    /// Create a session. Fails if the options are invalid.
    pub fn new(input: &'a str, options: ParseOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            input,
            options,
            stage: ParseStage::Start,
        })
    }

    pub fn stage(&self) -> ParseStage {
        self.stage
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    fn enter(&mut self, stage: ParseStage) {
        debug!(from = %self.stage, to = %stage, "parse stage");
        self.stage = stage;
    }

    /// Run the whole pipeline.
    ///
    /// Returns the dataset with its warnings, or [`CdlError::ParseFailed`]
    /// carrying every diagnostic when at least one error was recorded. The
    /// session stops after the current stage once `max_errors` errors exist.
    pub fn run(&mut self) -> Result<ParseOutput> {
        self.stage = ParseStage::Start;
        let mut diagnostics = Diagnostics::new(&self.options);

        self.enter(ParseStage::Tokenizing);
        let lexer = Lexer::new(self.input);
        debug!(bytes = self.input.len(), "tokenizing input");

        self.enter(ParseStage::Parsing);
        let ast = Parser::new(lexer, &mut diagnostics).parse();
        debug!(
            dataset = %ast.name,
            sections = ast.sections.len(),
            statements = ast.statements().count(),
            "parsed"
        );
        if diagnostics.limit_reached() {
            return self.abort(diagnostics);
        }

        self.enter(ParseStage::ResolvingDeclarations);
        let mut builder = DatasetBuilder::new(ast.name.clone(), &self.options);
        builder.register(&ast, &mut diagnostics);
        if diagnostics.limit_reached() {
            return self.abort(diagnostics);
        }

        self.enter(ParseStage::ResolvingReferences);
        let build = builder.resolve(&ast, &mut diagnostics);
        debug!(
            dimensions = build.dataset.dimensions.len(),
            variables = build.dataset.variables.len(),
            attributes = build.attributes.len(),
            data = build.data.len(),
            "resolved"
        );
        if diagnostics.limit_reached() {
            return self.abort(diagnostics);
        }

        self.enter(ParseStage::Validating);
        let dataset = validate(build, &mut diagnostics);
        if diagnostics.limit_reached() {
            return self.abort(diagnostics);
        }

        self.finish(dataset, diagnostics)
    }

    fn abort(&mut self, mut diagnostics: Diagnostics) -> Result<ParseOutput> {
        warn!(
            stage = %self.stage,
            errors = diagnostics.error_count(),
            suppressed = diagnostics.suppressed(),
            "error limit reached, parse stopped"
        );
        diagnostics.abort();
        self.enter(ParseStage::Failed);
        Err(CdlError::parse_failed(diagnostics.into_summary()))
    }

    fn finish(&mut self, dataset: Dataset, diagnostics: Diagnostics) -> Result<ParseOutput> {
        if diagnostics.has_errors() {
            warn!(
                dataset = %dataset.name,
                errors = diagnostics.error_count(),
                warnings = diagnostics.warning_count(),
                "parse failed"
            );
            self.enter(ParseStage::Failed);
            return Err(CdlError::parse_failed(diagnostics.into_summary()));
        }

        debug!(
            dataset = %dataset.name,
            dimensions = dataset.dimensions.len(),
            variables = dataset.variables.len(),
            warnings = diagnostics.warning_count(),
            "parse succeeded"
        );
        self.enter(ParseStage::Succeeded);
        Ok(ParseOutput {
            dataset,
            diagnostics: diagnostics.into_summary(),
        })
    }
}
