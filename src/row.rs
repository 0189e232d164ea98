//! provides the row types and the routines that normalize rows before they are written.
//!
//! Rows are ordered maps: the order a caller inserts fields in is kept, and it matters. A batch
//! statement lists its columns once, in the order of its first row, so every row of the batch must
//! carry its fields in that same order.
//!
//! Normalizing a row fills in declared defaults for fields the caller left out, and drops fields
//! that are not declared columns of the table. Defaulted fields come first, in the order the
//! defaults are declared, followed by the caller's remaining fields in the caller's order.

use indexmap::IndexMap;

use crate::format::Format;
use crate::sql_value::SqlValue;

/// holds one record as a map from column name to value.
pub type Row = IndexMap<String, SqlValue>;

/// maps each storable column of a table to the format its values are bound with.
pub type Columns = IndexMap<String, Format>;

/// builds a `Row` from `column => value` pairs, keeping the order they are written in.
///
/// ```
/// let r = tablekit::row! { "user_id" => 1, "name" => "ann" };
/// assert_eq!(r.keys().collect::<Vec<_>>(), vec!["user_id", "name"]);
/// ```
#[macro_export]
macro_rules! row {
    () => {
        $crate::row::Row::new()
    };
    ($($column:expr => $value:expr),+ $(,)?) => {{
        let mut r = $crate::row::Row::new();
        $(
            r.insert(::std::string::String::from($column), $crate::sql_value::SqlValue::from($value));
        )+
        r
    }};
}

/// builds a `Columns` map from `column => format` pairs.
#[macro_export]
macro_rules! columns {
    ($($column:expr => $format:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut c = $crate::row::Columns::new();
        $(
            c.insert(::std::string::String::from($column), $format);
        )*
        c
    }};
}

/// returns `row` with every default it does not already set filled in.
/// Values already in `row` are never overwritten.
pub fn set_missing_defaults(defaults: &Row, row: &Row) -> Row {
    let mut merged = Row::with_capacity(defaults.len() + row.len());
    for (column, default) in defaults {
        let value = row.get(column).unwrap_or(default);
        merged.insert(column.clone(), value.clone());
    }
    for (column, value) in row {
        if !merged.contains_key(column) {
            merged.insert(column.clone(), value.clone());
        }
    }
    merged
}

/// returns `row` without the fields that are not declared in `columns`.
pub fn remove_extraneous_fields(columns: &Columns, row: &Row) -> Row {
    row.iter()
        .filter(|(column, _)| columns.contains_key(column.as_str()))
        .map(|(column, value)| (column.clone(), value.clone()))
        .collect()
}

/// fills in defaults, then drops undeclared fields.
/// Normalizing an already normalized row returns it unchanged.
pub fn normalize_row(columns: &Columns, defaults: &Row, row: &Row) -> Row {
    remove_extraneous_fields(columns, &set_missing_defaults(defaults, row))
}

/// normalizes each row, keeping the rows in order.
pub fn normalize_rows(columns: &Columns, defaults: &Row, rows: &[Row]) -> Vec<Row> {
    rows.iter()
        .map(|r| normalize_row(columns, defaults, r))
        .collect()
}

/// returns the declared format of each field of `row`, in the row's own field order.
/// Fields that are not declared columns get a format guessed from their value.
pub fn ordered_formats(columns: &Columns, row: &Row) -> Vec<Format> {
    row.iter()
        .map(|(column, value)| crate::format::resolve_format(columns, column, value))
        .collect()
}

#[cfg(test)]
fn test_columns() -> Columns {
    columns! {
        "user_id" => Format::Int,
        "post_id" => Format::Int,
        "type_id" => Format::Int,
        "created_at" => Format::Text,
        "updated_at" => Format::Text,
    }
}

#[cfg(test)]
fn test_defaults() -> Row {
    row! { "type_id" => 1 }
}

#[test]
fn test_set_missing_defaults() {
    let data = set_missing_defaults(&test_defaults(), &row! { "post_id" => 1, "user_id" => 2 });
    assert_eq!(data.get("type_id"), Some(&SqlValue::Int(1)));
    assert_eq!(
        data.keys().collect::<Vec<_>>(),
        vec!["type_id", "post_id", "user_id"]
    );

    // An explicit value wins over the default.
    let data = set_missing_defaults(&test_defaults(), &row! { "user_id" => 2, "type_id" => 9 });
    assert_eq!(data.get("type_id"), Some(&SqlValue::Int(9)));
    assert_eq!(data.len(), 2);
}

#[test]
fn test_remove_extraneous_fields() {
    let data = remove_extraneous_fields(
        &test_columns(),
        &row! { "post_id" => 1, "user_id" => 2, "some_extraneous_field" => "value" },
    );
    assert_eq!(data.len(), 2);
    assert!(!data.contains_key("some_extraneous_field"));
}

#[test]
fn test_normalize_row() {
    let normalized = row! { "type_id" => 1, "user_id" => 1, "post_id" => 1 };
    let abnormal = row! { "user_id" => 1, "post_id" => 1, "bogus" => "x" };
    let columns = test_columns();
    let defaults = test_defaults();
    assert_eq!(normalize_row(&columns, &defaults, &abnormal), normalized);
    assert_eq!(normalize_row(&columns, &defaults, &normalized), normalized);
}

#[test]
fn test_normalize_row_is_idempotent() {
    let columns = test_columns();
    let defaults = row! { "type_id" => 1, "created_at" => "2020-01-01 00:00:00" };
    let cases = vec![
        row! {},
        row! { "post_id" => 3, "user_id" => 4 },
        row! { "type_id" => 5, "extra" => 0.5, "user_id" => 1 },
        row! { "updated_at" => "later", "created_at" => "now" },
    ];
    for case in cases {
        let once = normalize_row(&columns, &defaults, &case);
        let twice = normalize_row(&columns, &defaults, &once);
        assert_eq!(once, twice);
        assert!(once.keys().eq(twice.keys()));
    }
}

#[test]
fn test_normalize_rows_keeps_order() {
    let abnormal = vec![
        row! { "user_id" => 1, "post_id" => 1 },
        row! { "post_id" => 2, "user_id" => 1, "type_id" => 1 },
        row! { "user_id" => 1, "post_id" => 3, "type_id" => 1 },
    ];
    let normalized = normalize_rows(&test_columns(), &test_defaults(), &abnormal);
    assert_eq!(normalized.len(), 3);
    for (i, r) in normalized.iter().enumerate() {
        assert_eq!(r.get("post_id"), Some(&SqlValue::Int(i as i64 + 1)));
        assert_eq!(r.get("type_id"), Some(&SqlValue::Int(1)));
        assert_eq!(r.len(), 3);
    }
}

#[test]
fn test_ordered_formats() {
    let mut columns = test_columns();
    columns.insert(String::from("score"), Format::Float);
    let formats = ordered_formats(&columns, &row! { "score" => 1, "created_at" => "x", "user_id" => "5" });
    assert_eq!(formats, vec![Format::Float, Format::Text, Format::Int]);
}
