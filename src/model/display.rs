//! Rendering of a dataset back to CDL, in the layout `ncdump` uses.
//!
//! The output re-parses to an equal [`Dataset`]: names that would lex as
//! keywords are escaped, and every value carries the suffix of its type.

use std::fmt;

use super::dataset::{AttributeValue, DataAssignment, Dataset, DimensionSize, Variable};
use super::types::{escape_char, NcType, Value};

/// Words the lexer treats specially when they appear unescaped.
const RESERVED: [&str; 15] = [
    "netcdf",
    "NETCDF",
    "netCDF",
    "dimensions",
    "DIMENSIONS",
    "variables",
    "VARIABLES",
    "data",
    "DATA",
    "NaN",
    "nan",
    "Infinity",
    "infinity",
    "Inf",
    "inf",
];

fn is_reserved(name: &str) -> bool {
    name == "_"
        || RESERVED.contains(&name)
        || name
            .strip_suffix('f')
            .is_some_and(|base| RESERVED[9..].contains(&base))
        || NcType::from_keyword(name).is_some()
        || name.eq_ignore_ascii_case("unlimited")
}

/// Escape a name so that it lexes back as the same identifier.
pub(crate) fn escape_name(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for (i, ch) in name.chars().enumerate() {
        let plain = if i == 0 {
            (ch.is_ascii_alphabetic() || ch == '_' || !ch.is_ascii()) && !is_reserved(name)
        } else {
            ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '@' | '+' | '-') || !ch.is_ascii()
        };
        if !plain {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Quote bytes as a CDL string. Valid UTF-8 keeps its non-ASCII characters.
fn quote_bytes(bytes: &[u8]) -> String {
    let mut quoted = String::from("\"");
    match std::str::from_utf8(bytes) {
        Ok(text) => {
            for ch in text.chars() {
                if ch.is_ascii() {
                    quoted.push_str(&escape_char(ch as u8));
                } else {
                    quoted.push(ch);
                }
            }
        }
        Err(_) => {
            for &byte in bytes {
                quoted.push_str(&escape_char(byte));
            }
        }
    }
    quoted.push('"');
    quoted
}

fn join_values(values: &[Value]) -> String {
    values
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn char_bytes(values: &[Value]) -> Vec<u8> {
    values
        .iter()
        .map(|v| match *v {
            Value::Char(c) => c,
            other => other.as_i64().unwrap_or(0) as u8,
        })
        .collect()
}

/// Character data as one string per row, trailing NULs stripped; a partial
/// final row is written as character constants.
fn render_char_data(values: &[Value], string_length: Option<usize>) -> String {
    let bytes = char_bytes(values);
    let Some(len) = string_length.filter(|&len| len > 0) else {
        return quote_bytes(&bytes);
    };
    let mut parts = Vec::new();
    let mut rows = bytes.chunks_exact(len);
    for row in rows.by_ref() {
        let end = row.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        parts.push(quote_bytes(&row[..end]));
    }
    for &byte in rows.remainder() {
        parts.push(format!("'{}'", escape_char(byte)));
    }
    parts.join(", ")
}

fn render_attribute_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Text(text) => quote_bytes(text.as_bytes()),
        AttributeValue::Values(values) => join_values(values),
    }
}

impl Dataset {
    fn render_variable(&self, f: &mut fmt::Formatter<'_>, variable: &Variable) -> fmt::Result {
        let name = escape_name(&variable.name);
        write!(f, "\t{} {}", variable.nc_type, name)?;
        if !variable.is_scalar() {
            let dims: Vec<_> = variable.dimensions.iter().map(|d| escape_name(d)).collect();
            write!(f, "({})", dims.join(", "))?;
        }
        writeln!(f, " ;")?;
        for attribute in variable.attributes.values() {
            writeln!(
                f,
                "\t\t{}:{} = {} ;",
                name,
                escape_name(&attribute.name),
                render_attribute_value(&attribute.value)
            )?;
        }
        Ok(())
    }

    fn render_data(&self, assignment: &DataAssignment) -> String {
        let mut line = format!(" {} = ", escape_name(&assignment.variable));
        let variable = self.variable(&assignment.variable);
        match variable {
            Some(var) if var.nc_type == NcType::Char => {
                line.push_str(&render_char_data(&assignment.values, self.string_length(var)));
            }
            _ => line.push_str(&join_values(&assignment.values)),
        }
        line.push_str(" ;");
        line
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "netcdf {} {{", escape_name(&self.name))?;

        if !self.dimensions.is_empty() {
            writeln!(f, "dimensions:")?;
            for dimension in &self.dimensions {
                let name = escape_name(&dimension.name);
                match dimension.size {
                    DimensionSize::Fixed(len) => writeln!(f, "\t{} = {} ;", name, len)?,
                    DimensionSize::Unlimited => writeln!(
                        f,
                        "\t{} = UNLIMITED ; // ({} currently)",
                        name,
                        self.record_count()
                    )?,
                }
            }
        }

        if !self.variables.is_empty() || !self.attributes.is_empty() {
            writeln!(f, "variables:")?;
            for variable in self.variables.values() {
                self.render_variable(f, variable)?;
            }
            if !self.attributes.is_empty() {
                writeln!(f)?;
                writeln!(f, "// global attributes:")?;
                for attribute in self.attributes.values() {
                    writeln!(
                        f,
                        "\t\t:{} = {} ;",
                        escape_name(&attribute.name),
                        render_attribute_value(&attribute.value)
                    )?;
                }
            }
        }

        if !self.data.is_empty() {
            writeln!(f, "data:")?;
            for assignment in &self.data {
                writeln!(f)?;
                writeln!(f, "{}", self.render_data(assignment))?;
            }
        }

        writeln!(f, "}}")
    }
}
