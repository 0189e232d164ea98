//! Defines the format tags used to bind values into statements, and how a value's format is resolved.
//!
//! A column's declared format always wins. Columns that are not declared (for example the keys of
//! an ad-hoc predicate) get a format guessed from the value itself.
use std::str::FromStr;
use thiserror::Error;

use crate::row::Columns;
use crate::sql_value::SqlValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// These are the formats a value can be bound with.
/// They correspond to the `%d`, `%f` and `%s` placeholders of a statement template.
pub enum Format {
    Int,
    Float,
    Text,
}

impl Format {
    /// returns the placeholder that binds a value with this format.
    pub fn placeholder(&self) -> &'static str {
        match self {
            Format::Int => "%d",
            Format::Float => "%f",
            Format::Text => "%s",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.placeholder().fmt(f)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Unable to parse Format from: {0}.")]
    ParseFormatError(String),
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "%d" | "int" | "integer" => Ok(Format::Int),
            "%f" | "float" | "real" | "double" => Ok(Format::Float),
            "%s" | "text" | "string" => Ok(Format::Text),
            x => Err(Error::ParseFormatError(String::from(x))),
        }
    }
}

fn guess_numeric_text(s: &str) -> Format {
    let s = s.trim();
    if s.parse::<i64>().is_ok() {
        return Format::Int;
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && s.chars().any(|c| c.is_ascii_digit()) => guess_float(f),
        _ => Format::Text,
    }
}

fn guess_float(f: f64) -> Format {
    match f.fract() == 0.0 {
        true => Format::Int,
        false => Format::Float,
    }
}

/// guesses the format of a value.
/// Numbers, and text that reads as a number, are integers when they have no fractional part and
/// floats otherwise. Everything else is text.
pub fn guess_format(value: &SqlValue) -> Format {
    match value {
        SqlValue::Int(_) => Format::Int,
        SqlValue::Real(f) if f.is_finite() => guess_float(*f),
        SqlValue::Real(_) => Format::Text,
        SqlValue::Text(s) => guess_numeric_text(s),
        SqlValue::Null => Format::Text,
    }
}

/// returns the format `columns` declares for `column`, if any.
pub fn column_format(columns: &Columns, column: &str) -> Option<Format> {
    columns.get(column).copied()
}

/// returns the declared format of `column`, or the format guessed from `value` when the column is
/// not declared.
pub fn resolve_format(columns: &Columns, column: &str, value: &SqlValue) -> Format {
    column_format(columns, column).unwrap_or_else(|| guess_format(value))
}

#[test]
fn test_format_from_str() {
    let cases = vec![
        ("%d", Format::Int),
        ("INTEGER", Format::Int),
        ("%f", Format::Float),
        ("real", Format::Float),
        ("%s", Format::Text),
        ("String", Format::Text),
    ];
    for (input, expected) in cases {
        assert_eq!(Format::from_str(input), Ok(expected));
    }
    assert_eq!(
        Format::from_str("blob"),
        Err(Error::ParseFormatError(String::from("blob")))
    );
}

#[test]
fn test_guess_format() {
    use SqlValue::*;
    let cases = vec![
        (Text(String::from("string")), Format::Text),
        (Real(1.2334234), Format::Float),
        (Text(String::from("1.2334234")), Format::Float),
        (Int(3), Format::Int),
        (Text(String::from("3")), Format::Int),
        (Real(3.0), Format::Int),
        (Text(String::from("-7")), Format::Int),
        (Text(String::from("inf")), Format::Text),
        (Text(String::from("NaN")), Format::Text),
        (Text(String::from("")), Format::Text),
        (Null, Format::Text),
    ];
    for (value, expected) in cases {
        assert_eq!(guess_format(&value), expected, "guessing {:?}", value);
    }
}

#[test]
fn test_resolve_format_prefers_declared_format() {
    let mut columns = Columns::new();
    columns.insert(String::from("user_id"), Format::Int);
    columns.insert(String::from("name"), Format::Text);

    // A stringified number still binds with the column's declared format.
    assert_eq!(
        resolve_format(&columns, "name", &SqlValue::from("12")),
        Format::Text
    );
    assert_eq!(
        resolve_format(&columns, "user_id", &SqlValue::from("12")),
        Format::Int
    );
    assert_eq!(
        resolve_format(&columns, "undeclared", &SqlValue::from(0.5)),
        Format::Float
    );
    assert_eq!(column_format(&columns, "user_id"), Some(Format::Int));
    assert_eq!(column_format(&columns, "not_a_model_column"), None);
}
