//! Raw parse tree for CDL.
//!
//! Names are unresolved and literals are untyped here; the semantic
//! builder turns this tree into a [`Dataset`](crate::model::Dataset).

use crate::diagnostics::Position;
use crate::model::NcType;

use super::lexer::LiteralValue;

/// Complete parse tree of one `netcdf <name> { ... }` block.
#[derive(Debug, Clone, Default)]
pub struct CdlAst {
    /// Dataset name from the header (empty if the header was malformed)
    pub name: String,
    /// Position of the header
    pub position: Position,
    /// Sections in source order; a keyword may occur more than once
    pub sections: Vec<Section>,
}

impl CdlAst {
    /// Create an empty parse tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// All statements across sections, in source order.
    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.sections.iter().flat_map(|s| s.statements.iter())
    }
}

/// Section kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Dimensions,
    Variables,
    Data,
}

/// One occurrence of a section keyword and the statements after it.
#[derive(Debug, Clone)]
pub struct Section {
    pub kind: SectionKind,
    pub position: Position,
    pub statements: Vec<Statement>,
}

/// A raw statement.
#[derive(Debug, Clone)]
pub enum Statement {
    Dimension(DimensionDecl),
    Variable(VariableDecl),
    Attribute(AttributeAssign),
    Data(DataAssign),
}

/// Declared size of a dimension.
#[derive(Debug, Clone)]
pub enum DimensionSpec {
    /// A numeric constant, checked by the builder
    Size(Literal),
    Unlimited,
}

/// `name = size`
#[derive(Debug, Clone)]
pub struct DimensionDecl {
    pub name: String,
    pub size: DimensionSpec,
    pub position: Position,
}

/// A dimension name inside a variable declaration.
#[derive(Debug, Clone)]
pub struct DimensionRef {
    pub name: String,
    pub position: Position,
}

/// `type name(dim, ...)`
#[derive(Debug, Clone)]
pub struct VariableDecl {
    pub name: String,
    pub nc_type: NcType,
    pub dimensions: Vec<DimensionRef>,
    pub position: Position,
}

/// `var:name = values` or `:name = values`
#[derive(Debug, Clone)]
pub struct AttributeAssign {
    /// Owning variable, `None` for a global attribute
    pub variable: Option<String>,
    pub name: String,
    pub values: Vec<Literal>,
    pub position: Position,
}

/// `var = values` in the data section
#[derive(Debug, Clone)]
pub struct DataAssign {
    pub variable: String,
    pub values: Vec<Literal>,
    pub position: Position,
}

/// An untyped literal with its source text.
#[derive(Debug, Clone)]
pub struct Literal {
    pub value: LiteralValue,
    /// Source text, used in diagnostics
    pub text: String,
    pub position: Position,
}
