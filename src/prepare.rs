//! binds values into a statement template.
//!
//! Templates use the placeholders `%d` (integer), `%f` (float) and `%s` (string); `%%` stands for a
//! literal percent sign. Each placeholder consumes the next value. The value is converted to the
//! placeholder's format first, so a `%d` bound to the text `"12"` renders as `12`, and a `%s`
//! bound to the integer 12 renders as `'12'`. `NULL` renders as `NULL` whatever the placeholder.
//!
//! Floats render with six digits after the decimal point.

use crate::dialect::Dialect;
use crate::format::Format;
use crate::sql_value::SqlValue;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Template has more placeholders than the {0} values supplied.")]
    TooFewValues(usize),
    #[error("Template has {placeholders} placeholders but {values} values were supplied.")]
    TooManyValues { placeholders: usize, values: usize },
    #[error("Unsupported placeholder %{0} in template.")]
    UnsupportedPlaceholder(char),
    #[error("Template ends with a lone %.")]
    TrailingPercent,
}

/// renders `value` as a SQL literal in `format`.
pub fn render_value(dialect: Dialect, format: Format, value: &SqlValue) -> String {
    if matches!(value, SqlValue::Null) {
        return String::from("NULL");
    }
    match format {
        Format::Int => value.to_i64().to_string(),
        Format::Float => format!("{:.6}", value.to_f64()),
        Format::Text => dialect.quote_string(&value.to_string()),
    }
}

/// replaces each placeholder of `template` with the matching value, rendered as a literal.
pub fn prepare(dialect: Dialect, template: &str, values: &[SqlValue]) -> Result<String, Error> {
    let mut out = String::with_capacity(template.len() + values.len() * 8);
    let mut values_iter = values.iter();
    let mut placeholders = 0;
    let mut chars = template.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let format = match chars.next() {
            Some('%') => {
                out.push('%');
                continue;
            }
            Some('d') => Format::Int,
            Some('f') => Format::Float,
            Some('s') => Format::Text,
            Some(x) => return Err(Error::UnsupportedPlaceholder(x)),
            None => return Err(Error::TrailingPercent),
        };
        placeholders += 1;
        let value = values_iter
            .next()
            .ok_or(Error::TooFewValues(values.len()))?;
        out.push_str(&render_value(dialect, format, value));
    }
    if placeholders != values.len() {
        return Err(Error::TooManyValues {
            placeholders,
            values: values.len(),
        });
    }
    Ok(out)
}

#[test]
fn test_prepare() {
    let cases: Vec<(&str, Vec<SqlValue>, &str)> = vec![
        ("WHERE `a` = %d", vec![SqlValue::from(1)], "WHERE `a` = 1"),
        ("%d", vec![SqlValue::from("12")], "12"),
        ("%d", vec![SqlValue::from(3.9)], "3"),
        ("%f", vec![SqlValue::from(0.1234)], "0.123400"),
        ("%f", vec![SqlValue::from(2)], "2.000000"),
        ("%s", vec![SqlValue::from("string")], "'string'"),
        ("%s", vec![SqlValue::from(12)], "'12'"),
        ("%s", vec![SqlValue::from("O'Brien")], "'O''Brien'"),
        ("%s, %d", vec![SqlValue::Null, SqlValue::Null], "NULL, NULL"),
        ("100%% of %d", vec![SqlValue::from(5)], "100% of 5"),
        ("no placeholders", vec![], "no placeholders"),
    ];
    for (template, values, expected) in cases {
        assert_eq!(
            prepare(Dialect::Sqlite, template, &values),
            Ok(String::from(expected)),
            "template {}",
            template
        );
    }
}

#[test]
fn test_prepare_rejects_bad_templates() {
    assert_eq!(
        prepare(Dialect::MySql, "%d %d", &[SqlValue::from(1)]),
        Err(Error::TooFewValues(1))
    );
    assert_eq!(
        prepare(Dialect::MySql, "%d", &[SqlValue::from(1), SqlValue::from(2)]),
        Err(Error::TooManyValues {
            placeholders: 1,
            values: 2
        })
    );
    assert_eq!(
        prepare(Dialect::MySql, "LIKE 'a%'", &[]),
        Err(Error::UnsupportedPlaceholder('\''))
    );
    assert_eq!(prepare(Dialect::MySql, "50%", &[]), Err(Error::TrailingPercent));
}

#[test]
fn test_values_never_reopen_the_template() {
    // A value containing a placeholder is rendered as text, not bound again.
    let sql = prepare(
        Dialect::Sqlite,
        "SELECT %s, %d",
        &[SqlValue::from("%d'; DROP TABLE t; --"), SqlValue::from(1)],
    )
    .unwrap();
    assert_eq!(sql, "SELECT '%d''; DROP TABLE t; --', 1");
}
