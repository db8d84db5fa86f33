//! The dataset model produced by a successful parse.

use std::fmt;

use indexmap::IndexMap;

use super::types::{NcType, Value, FILL_VALUE_ATTRIBUTE};

/// Largest dimension length of the classic netCDF format.
pub const MAX_DIMENSION_LENGTH: usize = i32::MAX as usize;

/// Size of a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DimensionSize {
    /// Fixed, positive length
    Fixed(usize),
    /// Record dimension; its length is implied by the data
    Unlimited,
}

impl fmt::Display for DimensionSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => write!(f, "{}", n),
            Self::Unlimited => write!(f, "UNLIMITED"),
        }
    }
}

/// A named axis.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimension {
    pub name: String,
    pub size: DimensionSize,
}

impl Dimension {
    pub fn new(name: impl Into<String>, size: DimensionSize) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.size == DimensionSize::Unlimited
    }

    /// Fixed length, `None` for the unlimited dimension.
    pub fn len(&self) -> Option<usize> {
        match self.size {
            DimensionSize::Fixed(n) => Some(n),
            DimensionSize::Unlimited => None,
        }
    }
}

/// Owner of an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeOwner {
    Global,
    Variable(String),
}

/// Value of an attribute: text, or a list of numbers of one type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeValue {
    Text(String),
    Values(Vec<Value>),
}

impl AttributeValue {
    /// Element type (`char` for text).
    pub fn nc_type(&self) -> NcType {
        match self {
            Self::Text(_) => NcType::Char,
            Self::Values(values) => values.first().map(Value::nc_type).unwrap_or(NcType::Int),
        }
    }

    /// Number of elements (bytes for text).
    pub fn len(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Values(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Values(_) => None,
        }
    }

    pub fn as_values(&self) -> Option<&[Value]> {
        match self {
            Self::Text(_) => None,
            Self::Values(values) => Some(values),
        }
    }
}

/// A named metadata value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attribute {
    pub name: String,
    pub owner: AttributeOwner,
    pub value: AttributeValue,
}

/// A typed field defined over a list of dimensions.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variable {
    pub name: String,
    pub nc_type: NcType,
    /// Dimension names, outermost first
    pub dimensions: Vec<String>,
    pub attributes: IndexMap<String, Attribute>,
}

impl Variable {
    pub fn new(name: impl Into<String>, nc_type: NcType) -> Self {
        Self {
            name: name.into(),
            nc_type,
            dimensions: Vec::new(),
            attributes: IndexMap::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn is_scalar(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Value used for `_` literals and padding: the first element of the
    /// `_FillValue` attribute, or the type's default fill value.
    pub fn fill_value(&self) -> Value {
        match self.attribute(FILL_VALUE_ATTRIBUTE).map(|a| &a.value) {
            Some(AttributeValue::Values(values)) => match values.first() {
                Some(value) if value.nc_type() == self.nc_type => *value,
                _ => self.nc_type.default_fill(),
            },
            Some(AttributeValue::Text(text)) if self.nc_type == NcType::Char => {
                Value::Char(text.bytes().next().unwrap_or(0))
            }
            _ => self.nc_type.default_fill(),
        }
    }
}

/// Literal data for one variable, in row-major order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataAssignment {
    pub variable: String,
    pub values: Vec<Value>,
}

impl DataAssignment {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A complete parsed CDL dataset.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dataset {
    /// Name from the `netcdf <name>` header
    pub name: String,
    /// Dimensions in declaration order
    pub dimensions: Vec<Dimension>,
    /// Variables keyed by name, in declaration order
    pub variables: IndexMap<String, Variable>,
    /// Global attributes in declaration order
    pub attributes: IndexMap<String, Attribute>,
    /// Data assignments in source order
    pub data: Vec<DataAssignment>,
}

impl Dataset {
    /// Create an empty dataset.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Global attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn unlimited_dimension(&self) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.is_unlimited())
    }

    /// Data assigned to a variable.
    pub fn data_for(&self, variable: &str) -> Option<&DataAssignment> {
        self.data.iter().find(|d| d.variable == variable)
    }

    /// Total number of variable-scoped attributes.
    pub fn variable_attribute_count(&self) -> usize {
        self.variables.values().map(|v| v.attributes.len()).sum()
    }

    fn is_unlimited(&self, dimension: &str) -> bool {
        self.dimension(dimension).is_some_and(Dimension::is_unlimited)
    }

    /// Number of values a variable can hold. `None` if it uses the
    /// unlimited dimension or the product of its lengths overflows.
    pub fn capacity(&self, variable: &Variable) -> Option<usize> {
        variable.dimensions.iter().try_fold(1usize, |total, name| {
            let len = self.dimension(name).and_then(Dimension::len)?;
            total.checked_mul(len)
        })
    }

    /// Number of values in one record: the product of all fixed dimensions.
    /// `None` if that product overflows.
    pub fn record_size(&self, variable: &Variable) -> Option<usize> {
        variable
            .dimensions
            .iter()
            .filter_map(|name| self.dimension(name).and_then(Dimension::len))
            .try_fold(1usize, |total, len| total.checked_mul(len))
    }

    /// Length of one string in a `char` variable: its innermost dimension, when fixed.
    pub fn string_length(&self, variable: &Variable) -> Option<usize> {
        let inner = variable.dimensions.last()?;
        self.dimension(inner)?.len()
    }

    /// Current length of the unlimited dimension: the largest number of
    /// records written by any variable whose outermost dimension is unlimited.
    pub fn record_count(&self) -> usize {
        self.data
            .iter()
            .filter_map(|assignment| {
                let variable = self.variable(&assignment.variable)?;
                let outer = variable.dimensions.first()?;
                if !self.is_unlimited(outer) {
                    return None;
                }
                Some(assignment.len().div_ceil(self.record_size(variable)?))
            })
            .max()
            .unwrap_or(0)
    }

    /// Current shape of a variable, with the unlimited dimension at its record count.
    pub fn shape(&self, variable: &Variable) -> Vec<usize> {
        let records = self.record_count();
        variable
            .dimensions
            .iter()
            .map(|name| {
                self.dimension(name)
                    .map(|d| d.len().unwrap_or(records))
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Row-major data of a variable padded with its fill value to the current
    /// shape. `None` for an unknown variable or a shape too large to allocate.
    pub fn padded_data(&self, variable: &str) -> Option<Vec<Value>> {
        let var = self.variable(variable)?;
        let total = self
            .shape(var)
            .into_iter()
            .try_fold(1usize, |total, len| total.checked_mul(len))?;
        let mut values = self
            .data_for(variable)
            .map(|d| d.values.clone())
            .unwrap_or_default();
        if values.len() < total {
            values.try_reserve_exact(total - values.len()).ok()?;
            values.resize(total, var.fill_value());
        }
        Some(values)
    }
}
