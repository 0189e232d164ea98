//! Defines the interfaces to the database: the `Gateway` that runs statements, and the
//! `SchemaApplier` that creates or alters tables from DDL.
//!
//! Tables never look a gateway up from global state. One is handed to each `Table` when it is
//! built.

use indexmap::IndexMap;

use crate::dialect::Dialect;
use crate::format::Format;
use crate::row::{Columns, Row};
use crate::sql_value::SqlValue;

/// maps each table (`name`) or column (`table.column`) a schema apply changed to a description of
/// the change.
pub type SchemaChanges = IndexMap<String, String>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Unable to bind statement values: {0}")]
    Prepare(#[from] crate::prepare::Error),
    #[error("Unable to build statement: {0}")]
    Clause(#[from] crate::clause::Error),
    #[error("Statement failed: {0}")]
    Statement(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Schema apply failed: {0}")]
    Schema(String),
}

/// runs statements against one database.
pub trait Gateway {
    fn dialect(&self) -> Dialect;

    /// the prefix prepended to every table name.
    fn prefix(&self) -> String;

    /// the character set and collation clause appended to `CREATE TABLE` statements.
    fn charset_collate(&self) -> String {
        String::new()
    }

    /// binds `values` to the placeholders of `template`.
    fn prepare(&self, template: &str, values: &[SqlValue]) -> Result<String, Error> {
        Ok(crate::prepare::prepare(self.dialect(), template, values)?)
    }

    /// runs a statement that returns no rows, returning the number of rows it affected.
    fn execute(&self, sql: &str) -> Result<u64, Error>;

    /// returns the first column of the first row, or `None` when there are no rows.
    fn query_scalar(&self, sql: &str) -> Result<Option<SqlValue>, Error>;

    /// returns the first row, or `None` when there are no rows.
    fn query_row(&self, sql: &str) -> Result<Option<Row>, Error>;

    fn query_rows(&self, sql: &str) -> Result<Vec<Row>, Error>;

    /// the row id generated by the most recent insert.
    fn last_insert_id(&self) -> i64;

    /// inserts one row, binding each field with the format at the same position in `formats`.
    fn insert(&self, table: &str, row: &Row, formats: &[Format]) -> Result<u64, Error> {
        let stmt = crate::statement::insert(self.dialect(), table, row, formats);
        let sql = self.prepare(stmt.template(), stmt.values())?;
        self.execute(&sql)
    }

    /// sets the fields of `row` on every row matching `predicate`.
    /// Predicate values are bound with their column's format in `columns`, or a guessed one.
    fn update(
        &self,
        table: &str,
        row: &Row,
        predicate: &Row,
        formats: &[Format],
        columns: &Columns,
    ) -> Result<u64, Error> {
        let stmt = crate::statement::update(self.dialect(), table, row, formats, columns, predicate)?;
        let sql = self.prepare(stmt.template(), stmt.values())?;
        self.execute(&sql)
    }
}

/// creates or alters tables so they match their `CREATE TABLE` statement.
pub trait SchemaApplier {
    /// applies `ddl`, creating the table or adding missing columns, and returns what changed.
    /// Applying the same DDL twice changes nothing the second time.
    fn apply_schema(&self, ddl: &str) -> Result<SchemaChanges, Error>;
}
