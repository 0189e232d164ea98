//! checks the structure of row sets and primary key arguments before any statement is built.

use std::collections::HashSet;

use itertools::Itertools;

use crate::row::Row;
use crate::sql_value::SqlValue;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("The row set is empty.")]
    EmptyRowSet,
    #[error("Row {row} is missing a value for primary key column {column}.")]
    MissingPrimaryKey { row: usize, column: String },
    #[error("Row {row} has {found} fields, expected {expected}.")]
    InconsistentFieldCount {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Row {row} does not have the same fields, in the same order, as the first row.")]
    InconsistentKeyStructure { row: usize },
    #[error("Row {row} repeats the primary key ({key}) of an earlier row.")]
    DuplicatePrimaryKey { row: usize, key: String },
}

/// identifies a record by its primary key.
///
/// A table with a single primary key column accepts a bare `Scalar`. A composite key accepts a
/// `Tuple` holding one value per key column, in key order, or a `Keyed` map naming every key
/// column in any order.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyArg {
    Scalar(SqlValue),
    Tuple(Vec<SqlValue>),
    Keyed(Row),
}

impl From<SqlValue> for KeyArg {
    fn from(v: SqlValue) -> Self {
        KeyArg::Scalar(v)
    }
}

impl From<i64> for KeyArg {
    fn from(i: i64) -> Self {
        KeyArg::Scalar(i.into())
    }
}

impl From<i32> for KeyArg {
    fn from(i: i32) -> Self {
        KeyArg::Scalar(i.into())
    }
}

impl From<&str> for KeyArg {
    fn from(s: &str) -> Self {
        KeyArg::Scalar(s.into())
    }
}

impl From<String> for KeyArg {
    fn from(s: String) -> Self {
        KeyArg::Scalar(s.into())
    }
}

impl From<Vec<SqlValue>> for KeyArg {
    fn from(v: Vec<SqlValue>) -> Self {
        KeyArg::Tuple(v)
    }
}

impl<T: Into<SqlValue>, const N: usize> From<[T; N]> for KeyArg {
    fn from(values: [T; N]) -> Self {
        KeyArg::Tuple(values.into_iter().map(Into::into).collect())
    }
}

impl From<Row> for KeyArg {
    fn from(r: Row) -> Self {
        KeyArg::Keyed(r)
    }
}

/// checks that `key` has the shape `primary_key` requires.
pub fn validate_inbound_primary_key(primary_key: &[&str], key: &KeyArg) -> bool {
    match key {
        KeyArg::Scalar(_) => primary_key.len() == 1,
        KeyArg::Tuple(values) => values.len() == primary_key.len(),
        KeyArg::Keyed(r) => {
            r.len() == primary_key.len() && primary_key.iter().all(|c| r.contains_key(*c))
        }
    }
}

/// turns a key argument into a predicate that names each key column, in key order.
/// Returns `None` when the key does not have the shape `primary_key` requires.
pub fn primary_key_predicate(primary_key: &[&str], key: &KeyArg) -> Option<Row> {
    if !validate_inbound_primary_key(primary_key, key) {
        return None;
    }
    let predicate = match key {
        KeyArg::Scalar(v) => primary_key
            .iter()
            .map(|c| (String::from(*c), v.clone()))
            .collect(),
        KeyArg::Tuple(values) => primary_key
            .iter()
            .zip(values)
            .map(|(c, v)| (String::from(*c), v.clone()))
            .collect(),
        KeyArg::Keyed(r) => primary_key
            .iter()
            .filter_map(|c| r.get(*c).map(|v| (String::from(*c), v.clone())))
            .collect(),
    };
    Some(predicate)
}

/// validates that `rows` can be written with one multi-row statement.
///
/// The checks run in order and the first failure is returned:
///   - every row has a non-NULL value for each primary key column,
///   - every row has the same number of fields,
///   - every row has the same fields in the same order as the first row,
///   - no two rows have the same primary key values.
pub fn validate_rows(primary_key: &[&str], rows: &[Row]) -> Result<(), Error> {
    let first = rows.first().ok_or(Error::EmptyRowSet)?;

    for (i, r) in rows.iter().enumerate() {
        for column in primary_key {
            match r.get(*column) {
                Some(v) if !matches!(v, SqlValue::Null) => (),
                _ => {
                    return Err(Error::MissingPrimaryKey {
                        row: i,
                        column: String::from(*column),
                    })
                }
            }
        }
    }

    if let Some((i, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != first.len()) {
        return Err(Error::InconsistentFieldCount {
            row: i,
            expected: first.len(),
            found: r.len(),
        });
    }

    if let Some((i, _)) = rows
        .iter()
        .enumerate()
        .find(|(_, r)| !r.keys().eq(first.keys()))
    {
        return Err(Error::InconsistentKeyStructure { row: i });
    }

    // Keys compare by their text so that 1 and "1" collide, as they would in the table.
    let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(rows.len());
    for (i, r) in rows.iter().enumerate() {
        let key: Vec<String> = primary_key
            .iter()
            .filter_map(|c| r.get(*c))
            .map(|v| v.to_string())
            .collect();
        if !seen.insert(key.clone()) {
            return Err(Error::DuplicatePrimaryKey {
                row: i,
                key: key.iter().join(", "),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
const SINGLE: &[&str] = &["user_id"];
#[cfg(test)]
const COMPOSITE: &[&str] = &["user_id", "post_id"];

#[test]
fn test_validate_rows_accepts_valid_sets() {
    let valid = vec![
        row! { "user_id" => 1, "post_id" => 1 },
        row! { "user_id" => 2, "post_id" => 1 },
    ];
    let valid_composite = vec![
        row! { "user_id" => 1, "post_id" => 1 },
        row! { "user_id" => 1, "post_id" => 2 },
        row! { "user_id" => 2, "post_id" => 1 },
    ];
    assert_eq!(validate_rows(SINGLE, &valid), Ok(()));
    assert_eq!(validate_rows(COMPOSITE, &valid_composite), Ok(()));
}

#[test]
fn test_validate_rows_rejects_empty_set() {
    assert_eq!(validate_rows(SINGLE, &[]), Err(Error::EmptyRowSet));
}

#[test]
fn test_validate_rows_rejects_inconsistent_count() {
    let rows = vec![
        row! { "user_id" => 1, "post_id" => 1 },
        row! { "user_id" => 1, "post_id" => 2, "type_id" => 1 },
        row! { "user_id" => 2, "post_id" => 1 },
    ];
    assert_eq!(
        validate_rows(COMPOSITE, &rows),
        Err(Error::InconsistentFieldCount {
            row: 1,
            expected: 2,
            found: 3
        })
    );
}

#[test]
fn test_validate_rows_rejects_inconsistent_order() {
    // Same key sets, different order.
    let rows = vec![
        row! { "user_id" => 1, "post_id" => 1 },
        row! { "post_id" => 1, "user_id" => 2 },
    ];
    assert_eq!(
        validate_rows(SINGLE, &rows),
        Err(Error::InconsistentKeyStructure { row: 1 })
    );
    let rows = vec![
        row! { "user_id" => 1, "post_id" => 1 },
        row! { "post_id" => 2, "user_id" => 1 },
        row! { "user_id" => 2, "post_id" => 1 },
    ];
    assert_eq!(
        validate_rows(COMPOSITE, &rows),
        Err(Error::InconsistentKeyStructure { row: 1 })
    );
}

#[test]
fn test_validate_rows_rejects_missing_keys() {
    let rows = vec![
        row! { "user_id" => 1, "post_id" => 1 },
        row! { "type_id" => 9, "post_id" => 1 },
    ];
    assert_eq!(
        validate_rows(SINGLE, &rows),
        Err(Error::MissingPrimaryKey {
            row: 1,
            column: String::from("user_id")
        })
    );
    let rows = vec![
        row! { "user_id" => 1, "post_id" => 1 },
        row! { "user_id" => SqlValue::Null, "post_id" => 2 },
    ];
    assert!(matches!(
        validate_rows(COMPOSITE, &rows),
        Err(Error::MissingPrimaryKey { row: 1, .. })
    ));
}

#[test]
fn test_validate_rows_rejects_duplicate_keys() {
    let rows = vec![
        row! { "user_id" => 1, "post_id" => 1 },
        row! { "user_id" => 1, "post_id" => 2 },
    ];
    assert!(matches!(
        validate_rows(SINGLE, &rows),
        Err(Error::DuplicatePrimaryKey { row: 1, .. })
    ));
    let rows = vec![
        row! { "user_id" => 1, "post_id" => 1 },
        row! { "user_id" => 1, "post_id" => 1 },
        row! { "user_id" => 1, "post_id" => 2 },
    ];
    assert_eq!(
        validate_rows(COMPOSITE, &rows),
        Err(Error::DuplicatePrimaryKey {
            row: 1,
            key: String::from("1, 1")
        })
    );
    // A stringified number collides with the number.
    let rows = vec![row! { "user_id" => 7 }, row! { "user_id" => "7" }];
    assert!(validate_rows(SINGLE, &rows).is_err());
}

#[test]
fn test_validate_inbound_primary_key() {
    assert!(validate_inbound_primary_key(SINGLE, &KeyArg::from(9)));
    assert!(validate_inbound_primary_key(SINGLE, &KeyArg::from("string")));

    assert!(validate_inbound_primary_key(COMPOSITE, &KeyArg::from([1, 2])));
    assert!(validate_inbound_primary_key(
        COMPOSITE,
        &KeyArg::from(row! { "user_id" => 1, "post_id" => 2 })
    ));
    assert!(validate_inbound_primary_key(
        COMPOSITE,
        &KeyArg::from(row! { "post_id" => 2, "user_id" => 1 })
    ));
    assert!(!validate_inbound_primary_key(COMPOSITE, &KeyArg::from(1)));
    assert!(!validate_inbound_primary_key(COMPOSITE, &KeyArg::from([1])));
    assert!(!validate_inbound_primary_key(
        COMPOSITE,
        &KeyArg::from(row! { "wrong_key" => 1, "post_id" => 2 })
    ));
}

#[test]
fn test_primary_key_predicate_uses_key_order() {
    let p = primary_key_predicate(
        COMPOSITE,
        &KeyArg::from(row! { "post_id" => 3, "user_id" => 4 }),
    )
    .unwrap();
    assert_eq!(p.keys().collect::<Vec<_>>(), vec!["user_id", "post_id"]);
    assert_eq!(p.get("user_id"), Some(&SqlValue::Int(4)));

    let p = primary_key_predicate(COMPOSITE, &KeyArg::from([4, 3])).unwrap();
    assert_eq!(p.get("post_id"), Some(&SqlValue::Int(3)));

    assert_eq!(primary_key_predicate(COMPOSITE, &KeyArg::from(4)), None);
}
