//! Semantic builder: turns the raw parse tree into a dataset skeleton.
//!
//! Declarations may appear in any order, so construction runs in two passes.
//! [`DatasetBuilder::register`] records every dimension and variable;
//! [`DatasetBuilder::resolve`] then resolves dimension references and binds
//! attributes and data to their owners. Literal values stay untyped until
//! the validator converts them.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::trace;

use super::dataset::{
    AttributeOwner, Dataset, Dimension, DimensionSize, Variable, MAX_DIMENSION_LENGTH,
};
use crate::cdl::ast::{CdlAst, DimensionDecl, DimensionRef, DimensionSpec, Literal, Statement, VariableDecl};
use crate::cdl::lexer::LiteralValue;
use crate::config::ParseOptions;
use crate::diagnostics::{DiagnosticKind, Diagnostics, Position};

/// An attribute bound to an existing owner, values not yet typed.
#[derive(Debug, Clone)]
pub struct PendingAttribute {
    pub owner: AttributeOwner,
    pub name: String,
    pub values: Vec<Literal>,
    pub position: Position,
}

/// Data bound to an existing variable, values not yet typed.
#[derive(Debug, Clone)]
pub struct PendingData {
    pub variable: String,
    pub values: Vec<Literal>,
    pub position: Position,
}

/// Result of both builder passes.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Dimensions and variables; attributes and data are still pending
    pub dataset: Dataset,
    pub attributes: Vec<PendingAttribute>,
    pub data: Vec<PendingData>,
}

/// Two-pass dataset builder.
#[derive(Debug)]
pub struct DatasetBuilder {
    allow_unlimited: bool,
    dataset: Dataset,
    /// Declaration position and dimension references of each registered variable
    shapes: IndexMap<String, (Position, Vec<DimensionRef>)>,
    /// Dimensions that were declared but rejected, so references to them
    /// are not reported a second time
    rejected_dimensions: HashSet<String>,
}

impl DatasetBuilder {
    pub fn new(name: impl Into<String>, options: &ParseOptions) -> Self {
        Self {
            allow_unlimited: options.allow_unlimited_dimension,
            dataset: Dataset::new(name),
            shapes: IndexMap::new(),
            rejected_dimensions: HashSet::new(),
        }
    }

    /// Pass 1: register every dimension and variable declaration.
    pub fn register(&mut self, ast: &CdlAst, diagnostics: &mut Diagnostics) {
        for statement in ast.statements() {
            if diagnostics.limit_reached() {
                return;
            }
            match statement {
                Statement::Dimension(decl) => self.register_dimension(decl, diagnostics),
                Statement::Variable(decl) => self.register_variable(decl, diagnostics),
                Statement::Attribute(_) | Statement::Data(_) => {}
            }
        }
    }

    fn register_dimension(&mut self, decl: &DimensionDecl, diagnostics: &mut Diagnostics) {
        if self.dataset.dimension(&decl.name).is_some()
            || self.rejected_dimensions.contains(&decl.name)
        {
            diagnostics.error(
                DiagnosticKind::DuplicateDefinition,
                decl.position,
                format!("dimension '{}' is already defined", decl.name),
            );
            return;
        }

        let size = match &decl.size {
            DimensionSpec::Unlimited => {
                let problem = if !self.allow_unlimited {
                    Some(format!(
                        "unlimited dimension '{}' is not allowed by the parse options",
                        decl.name
                    ))
                } else {
                    self.dataset.unlimited_dimension().map(|existing| {
                        format!(
                            "dimension '{}' cannot be unlimited: '{}' is already the unlimited dimension",
                            decl.name, existing.name
                        )
                    })
                };
                if let Some(message) = problem {
                    diagnostics.error(DiagnosticKind::InvalidDimension, decl.position, message);
                    self.rejected_dimensions.insert(decl.name.clone());
                    return;
                }
                DimensionSize::Unlimited
            }
            DimensionSpec::Size(literal) => match dimension_length(literal) {
                Some(len) => DimensionSize::Fixed(len),
                None => {
                    diagnostics.error(
                        DiagnosticKind::InvalidDimension,
                        literal.position,
                        format!(
                            "dimension '{}' has invalid size {}: sizes must be integers from 1 to {}",
                            decl.name, literal.text, MAX_DIMENSION_LENGTH
                        ),
                    );
                    self.rejected_dimensions.insert(decl.name.clone());
                    return;
                }
            },
        };

        trace!(dimension = %decl.name, %size, "registered dimension");
        self.dataset.dimensions.push(Dimension::new(decl.name.clone(), size));
    }

    fn register_variable(&mut self, decl: &VariableDecl, diagnostics: &mut Diagnostics) {
        if self.dataset.variables.contains_key(&decl.name) {
            diagnostics.error(
                DiagnosticKind::DuplicateDefinition,
                decl.position,
                format!("variable '{}' is already defined", decl.name),
            );
            return;
        }
        trace!(variable = %decl.name, nc_type = %decl.nc_type, "registered variable");
        self.dataset
            .variables
            .insert(decl.name.clone(), Variable::new(decl.name.clone(), decl.nc_type));
        self.shapes
            .insert(decl.name.clone(), (decl.position, decl.dimensions.clone()));
    }

    /// Pass 2: resolve dimension references and bind attributes and data.
    pub fn resolve(mut self, ast: &CdlAst, diagnostics: &mut Diagnostics) -> BuildOutput {
        for (variable, (position, refs)) in std::mem::take(&mut self.shapes) {
            if diagnostics.limit_reached() {
                break;
            }
            let dimensions = self.resolve_shape(&variable, &refs, diagnostics);
            if let Some(var) = self.dataset.variables.get_mut(&variable) {
                var.dimensions = dimensions;
            }
            if let Some(var) = self.dataset.variables.get(&variable) {
                if self.dataset.record_size(var).is_none() {
                    diagnostics.error(
                        DiagnosticKind::InvalidDimension,
                        position,
                        format!("variable '{}' has more values than can be addressed", variable),
                    );
                }
            }
        }

        let mut attributes = Vec::new();
        let mut data = Vec::new();
        let mut with_data = HashSet::new();
        for statement in ast.statements() {
            if diagnostics.limit_reached() {
                break;
            }
            match statement {
                Statement::Attribute(assign) => {
                    let owner = match &assign.variable {
                        None => AttributeOwner::Global,
                        Some(name) if self.dataset.variables.contains_key(name) => {
                            AttributeOwner::Variable(name.clone())
                        }
                        Some(name) => {
                            diagnostics.error(
                                DiagnosticKind::UnresolvedReference,
                                assign.position,
                                format!(
                                    "attribute '{}:{}' refers to undefined variable '{}'",
                                    name, assign.name, name
                                ),
                            );
                            continue;
                        }
                    };
                    attributes.push(PendingAttribute {
                        owner,
                        name: assign.name.clone(),
                        values: assign.values.clone(),
                        position: assign.position,
                    });
                }
                Statement::Data(assign) => {
                    if !self.dataset.variables.contains_key(&assign.variable) {
                        diagnostics.error(
                            DiagnosticKind::UnresolvedReference,
                            assign.position,
                            format!("data for undefined variable '{}'", assign.variable),
                        );
                        continue;
                    }
                    if !with_data.insert(assign.variable.clone()) {
                        diagnostics.error(
                            DiagnosticKind::DuplicateDefinition,
                            assign.position,
                            format!(
                                "variable '{}' already has data; this assignment is ignored",
                                assign.variable
                            ),
                        );
                        continue;
                    }
                    data.push(PendingData {
                        variable: assign.variable.clone(),
                        values: assign.values.clone(),
                        position: assign.position,
                    });
                }
                Statement::Dimension(_) | Statement::Variable(_) => {}
            }
        }

        BuildOutput {
            dataset: self.dataset,
            attributes,
            data,
        }
    }

    fn resolve_shape(
        &self,
        variable: &str,
        refs: &[DimensionRef],
        diagnostics: &mut Diagnostics,
    ) -> Vec<String> {
        let mut dimensions = Vec::with_capacity(refs.len());
        for (index, dim_ref) in refs.iter().enumerate() {
            match self.dataset.dimension(&dim_ref.name) {
                Some(dimension) => {
                    if dimension.is_unlimited() && index > 0 {
                        diagnostics.warning(
                            DiagnosticKind::InvalidDimension,
                            dim_ref.position,
                            format!(
                                "unlimited dimension '{}' is not the outermost dimension of '{}'",
                                dim_ref.name, variable
                            ),
                        );
                    }
                    dimensions.push(dim_ref.name.clone());
                }
                None if self.rejected_dimensions.contains(&dim_ref.name) => {}
                None => diagnostics.error(
                    DiagnosticKind::UnresolvedReference,
                    dim_ref.position,
                    format!(
                        "variable '{}' references undefined dimension '{}'",
                        variable, dim_ref.name
                    ),
                ),
            }
        }
        dimensions
    }
}

/// Run both passes.
pub fn build(ast: &CdlAst, options: &ParseOptions, diagnostics: &mut Diagnostics) -> BuildOutput {
    let mut builder = DatasetBuilder::new(ast.name.clone(), options);
    builder.register(ast, diagnostics);
    builder.resolve(ast, diagnostics)
}

/// A positive integer, or an integral floating-point constant, no larger
/// than [`MAX_DIMENSION_LENGTH`].
fn dimension_length(literal: &Literal) -> Option<usize> {
    let len = match literal.value {
        LiteralValue::Int { value, .. } => usize::try_from(value).ok()?,
        LiteralValue::Float { value, .. }
            if value.fract() == 0.0 && (1.0..=MAX_DIMENSION_LENGTH as f64).contains(&value) =>
        {
            value as usize
        }
        _ => return None,
    };
    (1..=MAX_DIMENSION_LENGTH).contains(&len).then_some(len)
}
