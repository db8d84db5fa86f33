//! Type and literal validation.
//!
//! Every literal left by the builder is given a storage type here: its
//! explicit suffix, or the inferred default (`int` for integers that fit in
//! 32 bits, `double` otherwise and for unsuffixed floats). Values are then
//! converted to the type of their target. Attributes are validated before
//! data, so `_FillValue` overrides are in place when `_` and padding are
//! expanded.

use std::collections::HashSet;

use tracing::trace;

use super::builder::{BuildOutput, PendingAttribute, PendingData};
use super::dataset::{Attribute, AttributeOwner, AttributeValue, DataAssignment, Dataset, Variable};
use super::types::{NcType, Value, FILL_VALUE_ATTRIBUTE};
use crate::cdl::ast::Literal;
use crate::cdl::lexer::LiteralValue;
use crate::diagnostics::{DiagnosticKind, Diagnostics, Position};

/// A numeric value before conversion to a storage type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Self::Int(v) => v as f64,
            Self::Float(v) => v,
        }
    }

    /// Integer value, truncating floats. `None` when not representable.
    fn integral(self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(v),
            Self::Float(v) if v.is_finite() && v >= i64::MIN as f64 && v < i64::MAX as f64 => {
                Some(v.trunc() as i64)
            }
            Self::Float(_) => None,
        }
    }
}

/// Convert a number to a storage type. Returns `None` when the value is
/// outside the range of the type.
pub fn coerce(number: Number, nc_type: NcType) -> Option<Value> {
    match nc_type {
        NcType::Byte => number
            .integral()
            .and_then(|v| i8::try_from(v).ok())
            .map(Value::Byte),
        NcType::Char => number
            .integral()
            .and_then(|v| u8::try_from(v).ok())
            .map(Value::Char),
        NcType::Short => number
            .integral()
            .and_then(|v| i16::try_from(v).ok())
            .map(Value::Short),
        NcType::Int => number
            .integral()
            .and_then(|v| i32::try_from(v).ok())
            .map(Value::Int),
        NcType::Float => {
            let v = number.as_f64();
            if v.is_finite() && v.abs() > f32::MAX as f64 {
                None
            } else {
                Some(Value::Float(v as f32))
            }
        }
        NcType::Double => Some(Value::Double(number.as_f64())),
    }
}

/// A numeric literal with its storage type.
#[derive(Debug, Clone, Copy)]
struct Typed {
    number: Number,
    nc_type: NcType,
    /// Type came from a suffix or a character constant
    explicit: bool,
    /// Source byte of a character constant
    char_byte: Option<u8>,
}

impl Typed {
    /// `None` for strings and `_`.
    fn classify(value: &LiteralValue) -> Option<Self> {
        let typed = match *value {
            LiteralValue::Int {
                value,
                suffix: Some(suffix),
            } => Self::explicit(Number::Int(value), suffix.nc_type()),
            LiteralValue::Int { value, suffix: None } => {
                let nc_type = if i32::try_from(value).is_ok() {
                    NcType::Int
                } else {
                    NcType::Double
                };
                Self::inferred(Number::Int(value), nc_type)
            }
            LiteralValue::Float {
                value,
                suffix: Some(suffix),
            } => Self::explicit(Number::Float(value), suffix.nc_type()),
            LiteralValue::Float { value, suffix: None } => {
                Self::inferred(Number::Float(value), NcType::Double)
            }
            LiteralValue::Char(byte) => Self {
                char_byte: Some(byte),
                ..Self::explicit(Number::Int(byte as i8 as i64), NcType::Byte)
            },
            LiteralValue::Text(_) | LiteralValue::Fill => return None,
        };
        Some(typed)
    }

    fn explicit(number: Number, nc_type: NcType) -> Self {
        Self {
            number,
            nc_type,
            explicit: true,
            char_byte: None,
        }
    }

    fn inferred(number: Number, nc_type: NcType) -> Self {
        Self {
            number,
            nc_type,
            explicit: false,
            char_byte: None,
        }
    }

    /// An explicitly typed constant must fit its own type (`300b` does not).
    fn fits_own_type(&self) -> bool {
        !self.explicit || coerce(self.number, self.nc_type).is_some()
    }

    fn is_float_constant(&self) -> bool {
        matches!(self.number, Number::Float(_))
    }

    /// Convert to a target type, handling character constants in `char` targets.
    fn convert(&self, target: NcType) -> Option<Value> {
        match (self.char_byte, target) {
            (Some(byte), NcType::Char) => Some(Value::Char(byte)),
            _ => coerce(self.number, target),
        }
    }

    /// Whether storing this constant in `target` changes its type.
    fn mismatches(&self, target: NcType) -> bool {
        if self.explicit {
            self.nc_type != target && !(self.nc_type == NcType::Byte && target == NcType::Char)
        } else {
            self.is_float_constant() && target.is_integral()
        }
    }
}

/// Run the validator over the builder output and produce the final dataset.
pub fn validate(build: BuildOutput, diagnostics: &mut Diagnostics) -> Dataset {
    let BuildOutput {
        mut dataset,
        attributes,
        data,
    } = build;

    for attribute in attributes {
        if diagnostics.limit_reached() {
            break;
        }
        let target = match &attribute.owner {
            AttributeOwner::Global => None,
            AttributeOwner::Variable(name) => dataset.variable(name).map(|v| v.nc_type),
        };
        let fill_target = target.filter(|_| attribute.name == FILL_VALUE_ATTRIBUTE);
        let Some(value) = attribute_value(&attribute, fill_target, diagnostics) else {
            continue;
        };
        attach_attribute(&mut dataset, attribute, value, diagnostics);
    }

    let mut assignments = Vec::with_capacity(data.len());
    for pending in data {
        if diagnostics.limit_reached() {
            break;
        }
        let Some(variable) = dataset.variable(&pending.variable) else {
            continue;
        };
        let assignment = convert_data(&dataset, variable, pending, diagnostics);
        trace!(variable = %assignment.variable, values = assignment.len(), "validated data");
        assignments.push(assignment);
    }
    dataset.data = assignments;
    dataset
}

fn attach_attribute(
    dataset: &mut Dataset,
    pending: PendingAttribute,
    value: AttributeValue,
    diagnostics: &mut Diagnostics,
) {
    let (map, label) = match &pending.owner {
        AttributeOwner::Global => (&mut dataset.attributes, format!(":{}", pending.name)),
        AttributeOwner::Variable(name) => match dataset.variables.get_mut(name) {
            Some(variable) => (
                &mut variable.attributes,
                format!("{}:{}", name, pending.name),
            ),
            None => return,
        },
    };
    if map.contains_key(&pending.name) {
        diagnostics.warning(
            DiagnosticKind::DuplicateDefinition,
            pending.position,
            format!("attribute '{}' is redefined; the later value is kept", label),
        );
    }
    trace!(attribute = %label, "validated attribute");
    map.insert(
        pending.name.clone(),
        Attribute {
            name: pending.name,
            owner: pending.owner,
            value,
        },
    );
}

/// Type an attribute's literal list. `fill_target` is the owning variable's
/// type when the attribute is `_FillValue`.
fn attribute_value(
    attribute: &PendingAttribute,
    fill_target: Option<NcType>,
    diagnostics: &mut Diagnostics,
) -> Option<AttributeValue> {
    let label = match &attribute.owner {
        AttributeOwner::Global => format!(":{}", attribute.name),
        AttributeOwner::Variable(name) => format!("{}:{}", name, attribute.name),
    };

    if let Some(fill) = attribute
        .values
        .iter()
        .find(|l| matches!(l.value, LiteralValue::Fill))
    {
        diagnostics.error(
            DiagnosticKind::TypeMismatch,
            fill.position,
            format!("'_' is not a valid value for attribute '{}'", label),
        );
        return None;
    }

    let texts: Vec<&[u8]> = attribute
        .values
        .iter()
        .filter_map(|l| match &l.value {
            LiteralValue::Text(bytes) => Some(bytes.as_slice()),
            _ => None,
        })
        .collect();
    if texts.len() == attribute.values.len() {
        if fill_target.is_some_and(|t| t != NcType::Char) {
            diagnostics.error(
                DiagnosticKind::TypeMismatch,
                attribute.position,
                format!("attribute '{}' must be numeric", label),
            );
            return None;
        }
        return Some(AttributeValue::Text(
            String::from_utf8_lossy(&texts.concat()).into_owned(),
        ));
    }
    if !texts.is_empty() {
        diagnostics.error(
            DiagnosticKind::TypeMismatch,
            attribute.position,
            format!("attribute '{}' mixes strings and numbers", label),
        );
        return None;
    }

    let mut typed = Vec::with_capacity(attribute.values.len());
    for literal in &attribute.values {
        let Some(t) = Typed::classify(&literal.value) else {
            continue;
        };
        if t.fits_own_type() {
            typed.push((t, literal.position));
        } else {
            report_out_of_range(diagnostics, literal, t.nc_type);
        }
    }
    if typed.is_empty() {
        return None;
    }

    match fill_target {
        Some(target) => fill_value_attribute(&label, &typed, target, attribute.position, diagnostics),
        None => numeric_attribute(&label, &typed, attribute.position, diagnostics),
    }
}

/// `_FillValue` takes the type of its variable.
fn fill_value_attribute(
    label: &str,
    typed: &[(Typed, Position)],
    target: NcType,
    position: Position,
    diagnostics: &mut Diagnostics,
) -> Option<AttributeValue> {
    let mut values = Vec::with_capacity(typed.len());
    for (t, at) in typed {
        match t.convert(target) {
            Some(value) => values.push(value),
            None => {
                diagnostics.error(
                    DiagnosticKind::Overflow,
                    *at,
                    format!("value of '{}' does not fit the variable type {}", label, target),
                );
                return None;
            }
        }
    }
    if let Some((t, _)) = typed.iter().find(|(t, _)| t.explicit && t.mismatches(target)) {
        diagnostics.warning(
            DiagnosticKind::TypeMismatch,
            position,
            format!("'{}' converted from {} to {}", label, t.nc_type, target),
        );
    }
    Some(AttributeValue::Values(values))
}

/// A numeric attribute takes the widest explicit type, widened further if
/// unsuffixed constants do not fit it.
fn numeric_attribute(
    label: &str,
    typed: &[(Typed, Position)],
    position: Position,
    diagnostics: &mut Diagnostics,
) -> Option<AttributeValue> {
    let explicit: HashSet<NcType> = typed
        .iter()
        .filter(|(t, _)| t.explicit)
        .map(|(t, _)| t.nc_type)
        .collect();
    let mut target = explicit
        .iter()
        .copied()
        .reduce(NcType::widest)
        .or_else(|| typed.iter().map(|(t, _)| t.nc_type).reduce(NcType::widest))?;

    if !explicit.is_empty() {
        for (t, _) in typed.iter().filter(|(t, _)| !t.explicit) {
            let lossy = t.is_float_constant() && target.is_integral();
            if lossy || coerce(t.number, target).is_none() {
                target = target.widest(t.nc_type);
            }
        }
    }
    // Lists of unsuffixed constants take their widest type silently
    let widened = !explicit.is_empty() && typed.iter().any(|(t, _)| t.nc_type != target);
    if widened {
        diagnostics.warning(
            DiagnosticKind::TypeMismatch,
            position,
            format!("attribute '{}' mixes types; values widened to {}", label, target),
        );
    }

    let mut values = Vec::with_capacity(typed.len());
    for (t, at) in typed {
        match coerce(t.number, target) {
            Some(value) => values.push(value),
            None => diagnostics.error(
                DiagnosticKind::Overflow,
                *at,
                format!("value in '{}' does not fit {}", label, target),
            ),
        }
    }
    (!values.is_empty()).then_some(AttributeValue::Values(values))
}

fn report_out_of_range(diagnostics: &mut Diagnostics, literal: &Literal, nc_type: NcType) {
    diagnostics.error(
        DiagnosticKind::Overflow,
        literal.position,
        format!("constant {} is out of range for {}", literal.text, nc_type),
    );
}

/// Convert one data assignment to the variable's type.
fn convert_data(
    dataset: &Dataset,
    variable: &Variable,
    pending: PendingData,
    diagnostics: &mut Diagnostics,
) -> DataAssignment {
    let target = variable.nc_type;
    let fill = variable.fill_value();
    let string_length = dataset.string_length(variable);
    let capacity = dataset.capacity(variable);

    let mut values = Vec::with_capacity(pending.values.len());
    let mut mismatch: Option<(Position, NcType)> = None;
    let mut excess_at: Option<Position> = None;

    for literal in &pending.values {
        match &literal.value {
            LiteralValue::Fill => values.push(fill),
            LiteralValue::Text(bytes) if target == NcType::Char => {
                values.extend(pad_string(bytes, string_length).into_iter().map(Value::Char));
            }
            LiteralValue::Text(_) => {
                diagnostics.error(
                    DiagnosticKind::TypeMismatch,
                    literal.position,
                    format!(
                        "string constant in data of {} variable '{}'; replaced by the fill value",
                        target, variable.name
                    ),
                );
                values.push(fill);
            }
            other => match Typed::classify(other) {
                Some(t) if !t.fits_own_type() => {
                    report_out_of_range(diagnostics, literal, t.nc_type);
                    values.push(fill);
                }
                Some(t) => match t.convert(target) {
                    Some(value) => {
                        if mismatch.is_none() && t.mismatches(target) {
                            mismatch = Some((literal.position, t.nc_type));
                        }
                        values.push(value);
                    }
                    None => {
                        diagnostics.error(
                            DiagnosticKind::Overflow,
                            literal.position,
                            format!(
                                "constant {} overflows {} variable '{}'; replaced by the fill value",
                                literal.text, target, variable.name
                            ),
                        );
                        values.push(fill);
                    }
                },
                None => values.push(fill),
            },
        }
        if excess_at.is_none() && capacity.is_some_and(|c| values.len() > c) {
            excess_at = Some(literal.position);
        }
    }

    if let Some((position, from)) = mismatch {
        diagnostics.warning(
            DiagnosticKind::TypeMismatch,
            position,
            format!(
                "data for {} variable '{}' converted from {}",
                target, variable.name, from
            ),
        );
    }
    if let (Some(position), Some(capacity)) = (excess_at, capacity) {
        diagnostics.error(
            DiagnosticKind::CapacityExceeded,
            position,
            format!(
                "variable '{}' holds {} value(s) but {} were given; extra values discarded",
                variable.name,
                capacity,
                values.len()
            ),
        );
        values.truncate(capacity);
    }

    DataAssignment {
        variable: pending.variable,
        values,
    }
}

/// Expand a string for a `char` variable, NUL-padding it to a whole number
/// of rows. An empty string still fills one row.
fn pad_string(bytes: &[u8], string_length: Option<usize>) -> Vec<u8> {
    let mut padded = bytes.to_vec();
    if let Some(len) = string_length.filter(|&len| len > 0) {
        let rows = bytes.len().div_ceil(len).max(1);
        padded.resize(rows * len, 0);
    }
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdl::parse_tree;
    use crate::config::ParseOptions;
    use crate::model::builder::build;
    use approx::assert_relative_eq;

    fn run(input: &str) -> (Dataset, Diagnostics) {
        let options = ParseOptions::default();
        let mut diagnostics = Diagnostics::new(&options);
        let ast = parse_tree(input, &mut diagnostics);
        let output = build(&ast, &options, &mut diagnostics);
        let dataset = validate(output, &mut diagnostics);
        (dataset, diagnostics)
    }

    fn kinds(diagnostics: &Diagnostics) -> Vec<(DiagnosticKind, bool)> {
        diagnostics
            .summary()
            .iter()
            .map(|d| (d.kind, d.is_error()))
            .collect()
    }

    #[test]
    fn test_coerce_ranges() {
        assert_eq!(coerce(Number::Int(127), NcType::Byte), Some(Value::Byte(127)));
        assert_eq!(coerce(Number::Int(128), NcType::Byte), None);
        assert_eq!(coerce(Number::Int(-32768), NcType::Short), Some(Value::Short(-32768)));
        assert_eq!(coerce(Number::Int(1 << 31), NcType::Int), None);
        assert_eq!(coerce(Number::Float(2.9), NcType::Int), Some(Value::Int(2)));
        assert_eq!(coerce(Number::Float(f64::NAN), NcType::Short), None);
        assert_eq!(coerce(Number::Float(1e300), NcType::Float), None);
        assert!(matches!(
            coerce(Number::Float(f64::INFINITY), NcType::Float),
            Some(Value::Float(v)) if v.is_infinite()
        ));
        assert_eq!(coerce(Number::Int(65), NcType::Char), Some(Value::Char(b'A')));
    }

    #[test]
    fn test_inferred_types() {
        let t = Typed::classify(&LiteralValue::Int { value: 5, suffix: None }).unwrap();
        assert_eq!(t.nc_type, NcType::Int);
        let t = Typed::classify(&LiteralValue::Int {
            value: 3_000_000_000,
            suffix: None,
        })
        .unwrap();
        assert_eq!(t.nc_type, NcType::Double);
        let t = Typed::classify(&LiteralValue::Float {
            value: 1.0,
            suffix: None,
        })
        .unwrap();
        assert_eq!(t.nc_type, NcType::Double);
        assert!(!t.explicit);
    }

    #[test]
    fn test_unsuffixed_integers_fit_any_numeric_variable() {
        let input = "netcdf x { dimensions: n = 3 ; variables: float f(n) ; short s(n) ; data: f = 1, 2, 3 ; s = -1, 0, 1 ; }";
        let (dataset, diagnostics) = run(input);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.summary());
        assert_eq!(dataset.data_for("f").unwrap().values[2], Value::Float(3.0));
        assert_eq!(dataset.data_for("s").unwrap().values[0], Value::Short(-1));
    }

    #[test]
    fn test_mismatch_warns_once_per_assignment() {
        let input = "netcdf x { dimensions: n = 3 ; variables: int v(n) ; data: v = 1.5, 2.5f, 3s ; }";
        let (dataset, diagnostics) = run(input);
        assert_eq!(kinds(&diagnostics), vec![(DiagnosticKind::TypeMismatch, false)]);
        let values = &dataset.data_for("v").unwrap().values;
        assert_eq!(values, &vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn test_overflow_replaced_by_fill() {
        let input = "netcdf x { dimensions: n = 3 ; variables: byte b(n) ; b:_FillValue = -1b ; data: b = 1, 300, 400b ; }";
        let (dataset, diagnostics) = run(input);
        assert_eq!(
            kinds(&diagnostics),
            vec![(DiagnosticKind::Overflow, true), (DiagnosticKind::Overflow, true)]
        );
        assert_eq!(
            dataset.data_for("b").unwrap().values,
            vec![Value::Byte(1), Value::Byte(-1), Value::Byte(-1)]
        );
    }

    #[test]
    fn test_capacity_exceeded_truncates() {
        let input = "netcdf x { dimensions: a = 2, b = 3 ; variables: int v(a, b) ; data: v = 0,1,2,3,4,5,6 ; }";
        let (dataset, diagnostics) = run(input);
        assert_eq!(kinds(&diagnostics), vec![(DiagnosticKind::CapacityExceeded, true)]);
        assert_eq!(dataset.data_for("v").unwrap().len(), 6);
    }

    #[test]
    fn test_fill_placeholder_uses_fill_value() {
        let input = "netcdf x { dimensions: n = 3 ; variables: float t(n) ; t:_FillValue = -999 ; int i(n) ; data: t = 1, _, 3 ; i = _, 2, _ ; }";
        let (dataset, diagnostics) = run(input);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.summary());
        let t = &dataset.data_for("t").unwrap().values;
        match t[1] {
            Value::Float(v) => assert_relative_eq!(v, -999.0),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            dataset.variable("t").unwrap().attribute("_FillValue").unwrap().value,
            AttributeValue::Values(vec![Value::Float(-999.0)])
        );
        assert_eq!(dataset.data_for("i").unwrap().values[0], NcType::Int.default_fill());
    }

    #[test]
    fn test_fill_value_explicit_type_mismatch_warns() {
        let input = "netcdf x { variables: short s ; s:_FillValue = -1 ; double d ; d:_FillValue = 1.5f ; }";
        let (dataset, diagnostics) = run(input);
        assert_eq!(kinds(&diagnostics), vec![(DiagnosticKind::TypeMismatch, false)]);
        assert_eq!(dataset.variable("s").unwrap().fill_value(), Value::Short(-1));
        assert_eq!(dataset.variable("d").unwrap().fill_value(), Value::Double(1.5));
    }

    #[test]
    fn test_char_variable_strings_are_padded() {
        let input = r#"netcdf x { dimensions: n = 2, len = 4 ; variables: char names(n, len) ; char letter ; data: names = "ab", "" ; letter = 'z' ; }"#;
        let (dataset, diagnostics) = run(input);
        assert!(diagnostics.is_empty(), "{:?}", diagnostics.summary());
        let names: Vec<u8> = dataset
            .data_for("names")
            .unwrap()
            .values
            .iter()
            .map(|v| v.as_i64().unwrap() as u8)
            .collect();
        assert_eq!(names, b"ab\0\0\0\0\0\0".to_vec());
        assert_eq!(dataset.data_for("letter").unwrap().values, vec![Value::Char(b'z')]);
    }

    #[test]
    fn test_string_in_numeric_variable_is_error() {
        let input = r#"netcdf x { variables: int v ; data: v = "one" ; }"#;
        let (dataset, diagnostics) = run(input);
        assert_eq!(kinds(&diagnostics), vec![(DiagnosticKind::TypeMismatch, true)]);
        assert_eq!(dataset.data_for("v").unwrap().values, vec![Value::Int(crate::model::FILL_INT)]);
    }

    #[test]
    fn test_attribute_typing() {
        let input = r#"netcdf x {
variables:
    int v ;
    v:valid_range = 0s, 100s ;
    v:scale = 1.5f ;
    v:mixed = 1b, 2.5f ;
    v:wide = 1b, 1000 ;
    :history = "created ", "today" ;
    :bad = "a", 1 ;
    :big = 300b ;
}"#;
        let (dataset, diagnostics) = run(input);
        let v = dataset.variable("v").unwrap();
        assert_eq!(
            v.attribute("valid_range").unwrap().value,
            AttributeValue::Values(vec![Value::Short(0), Value::Short(100)])
        );
        assert_eq!(v.attribute("scale").unwrap().value.nc_type(), NcType::Float);
        assert_eq!(
            v.attribute("mixed").unwrap().value,
            AttributeValue::Values(vec![Value::Float(1.0), Value::Float(2.5)])
        );
        assert_eq!(
            v.attribute("wide").unwrap().value,
            AttributeValue::Values(vec![Value::Int(1), Value::Int(1000)])
        );
        assert_eq!(
            dataset.attribute("history").unwrap().value.as_text(),
            Some("created today")
        );
        assert!(dataset.attribute("bad").is_none());
        assert!(dataset.attribute("big").is_none());
        assert_eq!(
            kinds(&diagnostics),
            vec![
                (DiagnosticKind::TypeMismatch, false),
                (DiagnosticKind::TypeMismatch, false),
                (DiagnosticKind::TypeMismatch, true),
                (DiagnosticKind::Overflow, true),
            ]
        );
    }

    #[test]
    fn test_attribute_suffixed_and_unsuffixed_mix_warns() {
        let input = r#"netcdf x {
variables:
    int v ;
    v:scale = 1.5f, 2 ;
    v:offset = 2.5d, 1.0 ;
    v:range = 1, 2.5 ;
}"#;
        let (dataset, diagnostics) = run(input);
        let v = dataset.variable("v").unwrap();
        assert_eq!(
            v.attribute("scale").unwrap().value,
            AttributeValue::Values(vec![Value::Float(1.5), Value::Float(2.0)])
        );
        assert_eq!(v.attribute("offset").unwrap().value.nc_type(), NcType::Double);
        assert_eq!(v.attribute("range").unwrap().value.nc_type(), NcType::Double);
        let summary = diagnostics.summary();
        assert_eq!(kinds(&diagnostics), vec![(DiagnosticKind::TypeMismatch, false)]);
        assert_eq!(summary[0].position.line, 4);
        assert!(summary[0].message.contains("v:scale"));
    }

    #[test]
    fn test_duplicate_attribute_replaces() {
        let input = r#"netcdf x { variables: int v ; v:units = "m" ; v:units = "km" ; }"#;
        let (dataset, diagnostics) = run(input);
        assert_eq!(kinds(&diagnostics), vec![(DiagnosticKind::DuplicateDefinition, false)]);
        assert_eq!(
            dataset.variable("v").unwrap().attribute("units").unwrap().value.as_text(),
            Some("km")
        );
    }

    #[test]
    fn test_pad_string() {
        assert_eq!(pad_string(b"abcde", Some(4)), b"abcde\0\0\0".to_vec());
        assert_eq!(pad_string(b"", Some(3)), vec![0, 0, 0]);
        assert_eq!(pad_string(b"xy", None), b"xy".to_vec());
    }
}
