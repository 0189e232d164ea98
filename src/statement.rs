//! composes complete statements from clauses.
//!
//! Rows passed here are expected to be normalized already, and batches validated. Formats are
//! positional: `formats[i]` binds the `i`th field of each row.

use crate::clause::{values_clause, where_clause, Error, Statement};
use crate::dialect::Dialect;
use crate::format::Format;
use crate::row::{Columns, Row};

fn insert_head(dialect: Dialect, table: &str, fields: &[&str]) -> Statement {
    let mut stmt = Statement::new();
    stmt.push_sql("INSERT INTO ")
        .push_identifier(dialect, table)
        .push_sql(" (")
        .push_fields(dialect, fields)
        .push_sql(") ");
    stmt
}

fn field_names(row: &Row) -> Vec<&str> {
    row.keys().map(String::as_str).collect()
}

/// `INSERT INTO `t` (`a`,`b`) VALUES (%d,%s)`
pub fn insert(dialect: Dialect, table: &str, row: &Row, formats: &[Format]) -> Statement {
    let mut stmt = insert_head(dialect, table, &field_names(row));
    stmt.append(values_clause(std::slice::from_ref(row), formats));
    stmt
}

/// an insert that overwrites the row's non-key fields when its primary key already exists.
/// A row holding only key fields leaves the existing row as it is.
pub fn upsert(
    dialect: Dialect,
    table: &str,
    row: &Row,
    formats: &[Format],
    primary_key: &[&str],
) -> Statement {
    let mut stmt = insert(dialect, table, row, formats);
    let update_columns: Vec<&str> = field_names(row)
        .into_iter()
        .filter(|c| !primary_key.contains(c))
        .collect();
    dialect.push_upsert_clause(&mut stmt, primary_key, &update_columns);
    stmt
}

/// inserts a whole batch with one statement, listing the fields in the first row's order.
pub fn insert_rows(dialect: Dialect, table: &str, rows: &[Row], formats: &[Format]) -> Statement {
    let fields = rows.first().map(field_names).unwrap_or_default();
    let mut stmt = insert_head(dialect, table, &fields);
    stmt.append(values_clause(rows, formats));
    stmt
}

/// a batch insert that overwrites every field of rows whose primary key already exists.
pub fn upsert_rows(
    dialect: Dialect,
    table: &str,
    rows: &[Row],
    formats: &[Format],
    primary_key: &[&str],
) -> Statement {
    let mut stmt = insert_rows(dialect, table, rows, formats);
    let fields = rows.first().map(field_names).unwrap_or_default();
    dialect.push_upsert_clause(&mut stmt, primary_key, &fields);
    stmt
}

/// `UPDATE `t` SET `a` = %d, `b` = %s WHERE ...`
pub fn update(
    dialect: Dialect,
    table: &str,
    row: &Row,
    formats: &[Format],
    columns: &Columns,
    predicate: &Row,
) -> Result<Statement, Error> {
    let mut stmt = Statement::new();
    stmt.push_sql("UPDATE ")
        .push_identifier(dialect, table)
        .push_sql(" SET ");
    for (i, ((column, value), format)) in row.iter().zip(formats).enumerate() {
        if i > 0 {
            stmt.push_sql(", ");
        }
        stmt.push_identifier(dialect, column)
            .push_sql(" = ")
            .push_value(*format, value.clone());
    }
    stmt.push_sql(" ")
        .append(where_clause(dialect, columns, predicate)?);
    Ok(stmt)
}

/// `SELECT * FROM `t` WHERE ...`, with `LIMIT` and `OFFSET` added only when they are positive.
pub fn select_where(
    dialect: Dialect,
    table: &str,
    columns: &Columns,
    predicate: &Row,
    limit: u64,
    offset: u64,
) -> Result<Statement, Error> {
    let mut stmt = Statement::new();
    stmt.push_sql("SELECT * FROM ")
        .push_identifier(dialect, table)
        .push_sql(" ")
        .append(where_clause(dialect, columns, predicate)?);
    if limit > 0 {
        stmt.push_sql(" LIMIT ")
            .push_value(Format::Int, (limit.min(i64::MAX as u64) as i64).into());
    } else if offset > 0 {
        stmt.push_sql(" LIMIT ")
            .push_value(Format::Int, dialect.unbounded_limit().into());
    }
    if offset > 0 {
        stmt.push_sql(" OFFSET ")
            .push_value(Format::Int, (offset.min(i64::MAX as u64) as i64).into());
    }
    Ok(stmt)
}

/// `DELETE FROM `t` WHERE ...`
pub fn delete_where(
    dialect: Dialect,
    table: &str,
    columns: &Columns,
    predicate: &Row,
) -> Result<Statement, Error> {
    let mut stmt = Statement::new();
    stmt.push_sql("DELETE FROM ")
        .push_identifier(dialect, table)
        .push_sql(" ")
        .append(where_clause(dialect, columns, predicate)?);
    Ok(stmt)
}

/// `SELECT count(*) FROM `t``
pub fn count(dialect: Dialect, table: &str) -> Statement {
    let mut stmt = Statement::new();
    stmt.push_sql("SELECT count(*) FROM ")
        .push_identifier(dialect, table);
    stmt
}

/// `DROP TABLE `t``
pub fn drop_table(dialect: Dialect, table: &str) -> Statement {
    let mut stmt = Statement::new();
    stmt.push_sql("DROP TABLE ").push_identifier(dialect, table);
    stmt
}

#[cfg(test)]
fn render(dialect: Dialect, stmt: &Statement) -> String {
    crate::prepare::prepare(dialect, stmt.template(), stmt.values()).unwrap()
}

#[test]
fn test_insert() {
    let row = row! { "type_id" => 1, "user_id" => 2, "post_id" => "3" };
    let stmt = insert(
        Dialect::MySql,
        "wp_model_table",
        &row,
        &[Format::Int, Format::Int, Format::Int],
    );
    assert_eq!(
        render(Dialect::MySql, &stmt),
        "INSERT INTO `wp_model_table` (`type_id`,`user_id`,`post_id`) VALUES (1,2,3)"
    );
}

#[test]
fn test_upsert() {
    let row = row! { "user_id" => 4, "post_id" => 3, "type_id" => 6 };
    let formats = [Format::Int, Format::Int, Format::Int];
    let stmt = upsert(Dialect::MySql, "t", &row, &formats, &["user_id"]);
    assert_eq!(
        render(Dialect::MySql, &stmt),
        "INSERT INTO `t` (`user_id`,`post_id`,`type_id`) VALUES (4,3,6) \
         ON DUPLICATE KEY UPDATE `post_id` = VALUES(`post_id`), `type_id` = VALUES(`type_id`)"
    );
    let stmt = upsert(Dialect::Sqlite, "t", &row, &formats, &["user_id", "post_id"]);
    assert_eq!(
        render(Dialect::Sqlite, &stmt),
        "INSERT INTO `t` (`user_id`,`post_id`,`type_id`) VALUES (4,3,6) \
         ON CONFLICT (`user_id`,`post_id`) DO UPDATE SET `type_id` = excluded.`type_id`"
    );
}

#[test]
fn test_insert_rows_and_upsert_rows_share_values() {
    let rows = vec![
        row! { "user_id" => 1, "post_id" => 1 },
        row! { "user_id" => 2, "post_id" => 1 },
    ];
    let formats = [Format::Int, Format::Int];
    let stmt = insert_rows(Dialect::Sqlite, "t", &rows, &formats);
    assert_eq!(
        render(Dialect::Sqlite, &stmt),
        "INSERT INTO `t` (`user_id`,`post_id`) VALUES (1,1),(2,1)"
    );
    let stmt = upsert_rows(Dialect::Sqlite, "t", &rows, &formats, &["user_id"]);
    assert_eq!(
        render(Dialect::Sqlite, &stmt),
        "INSERT INTO `t` (`user_id`,`post_id`) VALUES (1,1),(2,1) \
         ON CONFLICT (`user_id`) DO UPDATE SET `user_id` = excluded.`user_id`, `post_id` = excluded.`post_id`"
    );
}

#[test]
fn test_update() {
    let columns = columns! { "user_id" => Format::Int, "post_id" => Format::Int, "type_id" => Format::Int };
    let stmt = update(
        Dialect::MySql,
        "t",
        &row! { "type_id" => 9 },
        &[Format::Int],
        &columns,
        &row! { "post_id" => "2", "user_id" => 3 },
    )
    .unwrap();
    assert_eq!(
        render(Dialect::MySql, &stmt),
        "UPDATE `t` SET `type_id` = 9 WHERE `post_id` = 2 AND `user_id` = 3"
    );
    assert!(update(Dialect::MySql, "t", &row! { "a" => 1 }, &[Format::Int], &columns, &row! {}).is_err());
}

#[test]
fn test_select_where_limit_and_offset() {
    let columns = Columns::new();
    let predicate = row! { "post_id" => 1 };
    let cases = vec![
        (0, 0, "SELECT * FROM `t` WHERE `post_id` = 1"),
        (5, 0, "SELECT * FROM `t` WHERE `post_id` = 1 LIMIT 5"),
        (5, 5, "SELECT * FROM `t` WHERE `post_id` = 1 LIMIT 5 OFFSET 5"),
        (0, 3, "SELECT * FROM `t` WHERE `post_id` = 1 LIMIT -1 OFFSET 3"),
    ];
    for (limit, offset, expected) in cases {
        let stmt = select_where(Dialect::Sqlite, "t", &columns, &predicate, limit, offset).unwrap();
        assert_eq!(render(Dialect::Sqlite, &stmt), expected);
    }
}

#[test]
fn test_delete_count_drop() {
    let stmt = delete_where(Dialect::MySql, "t", &Columns::new(), &row! { "user_id" => 4 }).unwrap();
    assert_eq!(render(Dialect::MySql, &stmt), "DELETE FROM `t` WHERE `user_id` = 4");
    assert_eq!(
        delete_where(Dialect::MySql, "t", &Columns::new(), &row! {}),
        Err(Error::EmptyPredicate)
    );
    assert_eq!(count(Dialect::MySql, "t").template(), "SELECT count(*) FROM `t`");
    assert_eq!(drop_table(Dialect::MySql, "t").template(), "DROP TABLE `t`");
}
