//! Defines the SQL dialects a gateway can speak, and the few places where the generated SQL differs
//! between them.
//!
//! Both dialects accept backtick-quoted identifiers, `LIMIT .. OFFSET ..` and multi-row `VALUES`
//! lists, so most statements are identical. They differ in how string literals are escaped, how an
//! upsert is spelled, how a table's existence is looked up, and which column options DDL may use.

use crate::clause::Statement;
use crate::format::Format;
use crate::sql_value::SqlValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Sqlite,
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::MySql => "mysql".fmt(f),
            Dialect::Sqlite => "sqlite".fmt(f),
        }
    }
}

impl Dialect {
    /// quotes an identifier with backticks, doubling any backtick inside it.
    pub fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    /// quotes a string literal.
    /// MySQL treats backslash as an escape character inside literals; SQLite does not.
    pub fn quote_string(&self, s: &str) -> String {
        let escaped = match self {
            Dialect::MySql => s.replace('\\', "\\\\").replace('\'', "''"),
            Dialect::Sqlite => s.replace('\'', "''"),
        };
        format!("'{}'", escaped)
    }

    /// the `LIMIT` value that means "no limit", for statements that need an `OFFSET` alone.
    pub fn unbounded_limit(&self) -> i64 {
        match self {
            Dialect::MySql => i64::MAX,
            Dialect::Sqlite => -1,
        }
    }

    /// appends the clause that turns an insert into an upsert.
    /// On a primary key conflict, each of `update_columns` takes the value the insert tried to write.
    pub fn push_upsert_clause(
        &self,
        stmt: &mut Statement,
        primary_key: &[&str],
        update_columns: &[&str],
    ) {
        match self {
            Dialect::MySql => {
                // Assigning a key column to itself keeps a key-only upsert valid.
                let update_columns = match update_columns.is_empty() {
                    true => primary_key,
                    false => update_columns,
                };
                stmt.push_sql(" ON DUPLICATE KEY UPDATE ");
                for (i, column) in update_columns.iter().enumerate() {
                    if i > 0 {
                        stmt.push_sql(", ");
                    }
                    stmt.push_identifier(*self, column)
                        .push_sql(" = VALUES(")
                        .push_identifier(*self, column)
                        .push_sql(")");
                }
            }
            Dialect::Sqlite => {
                stmt.push_sql(" ON CONFLICT (")
                    .push_fields(*self, primary_key)
                    .push_sql(")");
                if update_columns.is_empty() {
                    stmt.push_sql(" DO NOTHING");
                    return;
                }
                stmt.push_sql(" DO UPDATE SET ");
                for (i, column) in update_columns.iter().enumerate() {
                    if i > 0 {
                        stmt.push_sql(", ");
                    }
                    stmt.push_identifier(*self, column)
                        .push_sql(" = excluded.")
                        .push_identifier(*self, column);
                }
            }
        }
    }

    /// builds the statement that returns `table`'s name when the table exists.
    pub fn table_exists_statement(&self, table: &str) -> Statement {
        let mut stmt = Statement::new();
        match self {
            Dialect::MySql => {
                let pattern = table
                    .replace('\\', "\\\\")
                    .replace('_', "\\_")
                    .replace('%', "\\%");
                stmt.push_sql("SHOW TABLES LIKE ")
                    .push_value(Format::Text, SqlValue::Text(pattern));
            }
            Dialect::Sqlite => {
                stmt.push_sql("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ")
                    .push_value(Format::Text, SqlValue::from(table));
            }
        }
        stmt
    }

    /// whether a column may declare `ON UPDATE CURRENT_TIMESTAMP`.
    pub fn supports_on_update_timestamp(&self) -> bool {
        matches!(self, Dialect::MySql)
    }
}

#[test]
fn test_quote_identifier() {
    assert_eq!(Dialect::MySql.quote_identifier("user_id"), "`user_id`");
    assert_eq!(Dialect::Sqlite.quote_identifier("we`ird"), "`we``ird`");
}

#[test]
fn test_quote_string() {
    assert_eq!(Dialect::MySql.quote_string("it's"), "'it''s'");
    assert_eq!(Dialect::MySql.quote_string("a\\'"), "'a\\\\'''");
    assert_eq!(Dialect::Sqlite.quote_string("a\\'"), "'a\\'''");
}

#[test]
fn test_upsert_clause() {
    let mut stmt = Statement::new();
    Dialect::MySql.push_upsert_clause(&mut stmt, &["user_id"], &["post_id", "type_id"]);
    assert_eq!(
        stmt.template(),
        " ON DUPLICATE KEY UPDATE `post_id` = VALUES(`post_id`), `type_id` = VALUES(`type_id`)"
    );

    let mut stmt = Statement::new();
    Dialect::Sqlite.push_upsert_clause(&mut stmt, &["user_id", "post_id"], &["type_id"]);
    assert_eq!(
        stmt.template(),
        " ON CONFLICT (`user_id`,`post_id`) DO UPDATE SET `type_id` = excluded.`type_id`"
    );

    let mut stmt = Statement::new();
    Dialect::Sqlite.push_upsert_clause(&mut stmt, &["user_id"], &[]);
    assert_eq!(stmt.template(), " ON CONFLICT (`user_id`) DO NOTHING");

    let mut stmt = Statement::new();
    Dialect::MySql.push_upsert_clause(&mut stmt, &["user_id"], &[]);
    assert_eq!(
        stmt.template(),
        " ON DUPLICATE KEY UPDATE `user_id` = VALUES(`user_id`)"
    );
}

#[test]
fn test_table_exists_statement_escapes_like_wildcards() {
    let stmt = Dialect::MySql.table_exists_statement("wp_model_table");
    assert_eq!(stmt.template(), "SHOW TABLES LIKE %s");
    assert_eq!(
        stmt.values(),
        &[SqlValue::from("wp\\_model\\_table")]
    );

    let stmt = Dialect::Sqlite.table_exists_statement("wp_model_table");
    assert_eq!(stmt.values(), &[SqlValue::from("wp_model_table")]);
}
