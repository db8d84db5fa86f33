//! Typed dataset model and the passes that build it from a parse tree.
//!
//! - [`builder`]: two-pass registration and name resolution
//! - [`validate`]: literal typing, coercion and capacity checks
//! - [`dataset`]: the resulting [`Dataset`] and its read accessors
//! - `display`: rendering a [`Dataset`] back to CDL

pub mod builder;
pub mod dataset;
mod display;
pub mod types;
pub mod validate;

pub use builder::{build, BuildOutput, DatasetBuilder};
pub use dataset::{
    Attribute, AttributeOwner, AttributeValue, DataAssignment, Dataset, Dimension, DimensionSize,
    Variable, MAX_DIMENSION_LENGTH,
};
pub use types::{
    NcType, Value, FILL_BYTE, FILL_CHAR, FILL_DOUBLE, FILL_FLOAT, FILL_INT, FILL_SHORT,
    FILL_VALUE_ATTRIBUTE,
};
pub use validate::{coerce, validate, Number};
