//! gives a `TableDefinition` its schema lifecycle and its read and write operations.
//!
//! A `Table` pairs a definition with the gateway it runs statements through and the schema applier
//! that creates it. Every row written goes through normalization first, and every batch through
//! validation. Nothing is cached between calls: the full table name, row counts and existence are
//! looked up again each time.

use crate::clause::{where_clause, Statement};
use crate::format::Format;
use crate::gateway::{Gateway, SchemaApplier};
use crate::report::ErrorReporter;
use crate::row::{Columns, Row};
use crate::sql_value::SqlValue;
use crate::statement;
use crate::table_definition::{DdlContext, TableDefinition};
use crate::validate::KeyArg;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Key does not match the primary key ({}) of the table.", .expected.join(", "))]
    InvalidKey { expected: Vec<String> },
    #[error("Invalid predicate: {0}")]
    InvalidPredicate(#[from] crate::clause::Error),
    #[error("Invalid row set: {0}")]
    InvalidRows(#[from] crate::validate::Error),
    #[error("Table {0} may not be dropped unless its definition allows it or the drop is forced.")]
    DropNotAllowed(String),
    #[error("Insert into {0} wrote no rows.")]
    NothingInserted(String),
    #[error("Row for {0} has no fields that are columns of the table.")]
    EmptyRow(String),
    #[error("Unexpected value {value} returned by {query}.")]
    UnexpectedValue { query: &'static str, value: SqlValue },
    #[error(transparent)]
    Gateway(#[from] crate::gateway::Error),
}

/// provides access to one table of a database.
pub struct Table<'g, D: TableDefinition> {
    gateway: &'g dyn Gateway,
    schema_applier: &'g dyn SchemaApplier,
    definition: D,
    reporter: ErrorReporter,
}

impl<'g, D: TableDefinition> Table<'g, D> {
    pub fn new(
        gateway: &'g dyn Gateway,
        schema_applier: &'g dyn SchemaApplier,
        definition: D,
    ) -> Self {
        Table {
            gateway,
            schema_applier,
            definition,
            reporter: Box::new(crate::report::log_error),
        }
    }

    /// replaces the reporter that failed operations hand their errors to.
    pub fn with_reporter(mut self, reporter: impl Fn(&str, &Error) + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn definition(&self) -> &D {
        &self.definition
    }

    fn report<T>(&self, result: Result<T, Error>) -> Result<T, Error> {
        if let Err(e) = &result {
            (self.reporter)(&self.full_table_name(), e);
        }
        result
    }

    /// normalizes a single row to write, rejecting one left with no fields.
    fn row_to_write(&self, row: &Row) -> Result<(Row, Vec<Format>), Error> {
        let row = self.normalize_row(row);
        if row.is_empty() {
            return Err(Error::EmptyRow(self.full_table_name()));
        }
        let formats = self.ordered_formats(&row);
        Ok((row, formats))
    }

    fn run(&self, stmt: &Statement) -> Result<u64, Error> {
        Ok(self.gateway.execute(&stmt.prepare(self.gateway)?)?)
    }

    /// the table name without the gateway's prefix.
    pub fn table_name(&self) -> &str {
        self.definition.table_name()
    }

    /// the table name with the gateway's current prefix.
    pub fn full_table_name(&self) -> String {
        format!("{}{}", self.gateway.prefix(), self.definition.table_name())
    }

    pub fn columns(&self) -> Columns {
        self.definition.columns()
    }

    pub fn primary_key(&self) -> &[&str] {
        self.definition.primary_key()
    }

    /// the definition's `CREATE TABLE` statement, written for this table's gateway.
    pub fn schema(&self) -> String {
        let ddl = DdlContext::new(
            &self.full_table_name(),
            &self.gateway.charset_collate(),
            self.gateway.dialect(),
        );
        self.definition.schema(&ddl)
    }

    // -- Schema lifecycle --

    /// creates the table, or alters it to match the schema.
    /// Returns whether the schema applier reported a change to this table.
    pub fn create_table(&self) -> Result<bool, Error> {
        let result = self
            .schema_applier
            .apply_schema(&self.schema())
            .map_err(Error::from)
            .map(|changes| {
                let name = self.full_table_name();
                let quoted = self.gateway.dialect().quote_identifier(&name);
                changes.contains_key(&name) || changes.contains_key(&quoted)
            });
        self.report(result)
    }

    pub fn table_exists(&self) -> Result<bool, Error> {
        let name = self.full_table_name();
        let result = (|| -> Result<bool, Error> {
            let stmt = self.gateway.dialect().table_exists_statement(&name);
            let found = self.gateway.query_scalar(&stmt.prepare(self.gateway)?)?;
            Ok(found.as_ref().and_then(SqlValue::as_text) == Some(&name))
        })();
        self.report(result)
    }

    /// drops the table.
    /// Unless `force` is set, the drop only happens when the definition allows it; otherwise
    /// `Error::DropNotAllowed` is reported and returned and the table is left alone.
    pub fn drop_table(&self, force: bool) -> Result<(), Error> {
        let name = self.full_table_name();
        let result = match self.definition.allow_drop() || force {
            false => Err(Error::DropNotAllowed(name.clone())),
            true => self
                .run(&statement::drop_table(self.gateway.dialect(), &name))
                .map(|_| ()),
        };
        self.report(result)
    }

    /// counts the rows of the table.
    /// Failures are reported, and count as 0.
    pub fn count(&self) -> u64 {
        let result = (|| -> Result<u64, Error> {
            let stmt = statement::count(self.gateway.dialect(), &self.full_table_name());
            match self.gateway.query_scalar(&stmt.prepare(self.gateway)?)? {
                None => Ok(0),
                Some(SqlValue::Int(n)) if n >= 0 => Ok(n as u64),
                // Some drivers return every column as text.
                Some(SqlValue::Text(t)) => match t.trim().parse::<u64>() {
                    Ok(n) => Ok(n),
                    Err(_) => Err(Error::UnexpectedValue {
                        query: "count",
                        value: SqlValue::Text(t),
                    }),
                },
                Some(value) => Err(Error::UnexpectedValue {
                    query: "count",
                    value,
                }),
            }
        })();
        self.report(result).unwrap_or(0)
    }

    /// the id generated by the gateway's most recent insert.
    pub fn insert_id(&self) -> i64 {
        self.gateway.last_insert_id()
    }

    // -- Row preparation --

    pub fn set_missing_defaults(&self, row: &Row) -> Row {
        crate::row::set_missing_defaults(&self.definition.column_defaults(), row)
    }

    pub fn remove_extraneous_fields(&self, row: &Row) -> Row {
        crate::row::remove_extraneous_fields(&self.definition.columns(), row)
    }

    pub fn normalize_row(&self, row: &Row) -> Row {
        crate::row::normalize_row(
            &self.definition.columns(),
            &self.definition.column_defaults(),
            row,
        )
    }

    pub fn normalize_rows(&self, rows: &[Row]) -> Vec<Row> {
        crate::row::normalize_rows(
            &self.definition.columns(),
            &self.definition.column_defaults(),
            rows,
        )
    }

    pub fn ordered_formats(&self, row: &Row) -> Vec<Format> {
        crate::row::ordered_formats(&self.definition.columns(), row)
    }

    pub fn column_format(&self, column: &str) -> Option<Format> {
        crate::format::column_format(&self.definition.columns(), column)
    }

    /// checks a raw batch against this table's primary key. See `validate::validate_rows`.
    pub fn validate_rows(&self, rows: &[Row]) -> Result<(), Error> {
        let result = crate::validate::validate_rows(self.definition.primary_key(), rows)
            .map_err(Error::from);
        self.report(result)
    }

    pub fn validate_inbound_primary_key(&self, key: &KeyArg) -> bool {
        crate::validate::validate_inbound_primary_key(self.definition.primary_key(), key)
    }

    /// builds a `WHERE` clause with its values bound, e.g. ``WHERE `user_id` = 4``.
    pub fn build_where_clause(&self, predicate: &Row) -> Result<String, Error> {
        let result = (|| -> Result<String, Error> {
            let stmt = where_clause(self.gateway.dialect(), &self.definition.columns(), predicate)?;
            Ok(stmt.prepare(self.gateway)?)
        })();
        self.report(result)
    }

    // -- Writes --

    /// inserts one row.
    /// Fails when the database rejects it, for example on a duplicate primary key.
    pub fn insert(&self, row: &Row) -> Result<(), Error> {
        let name = self.full_table_name();
        let result = self
            .row_to_write(row)
            .and_then(|(row, formats)| Ok(self.gateway.insert(&name, &row, &formats)?))
            .and_then(|n| match n {
                0 => Err(Error::NothingInserted(name.clone())),
                _ => Ok(()),
            });
        self.report(result)
    }

    /// sets the fields of `row` on every row matching `predicate`.
    /// Returns false when no row was changed.
    pub fn update(&self, row: &Row, predicate: &Row) -> Result<bool, Error> {
        let result = self
            .row_to_write(row)
            .and_then(|(row, formats)| {
                Ok(self.gateway.update(
                    &self.full_table_name(),
                    &row,
                    predicate,
                    &formats,
                    &self.definition.columns(),
                )?)
            })
            .map(|n| n > 0);
        self.report(result)
    }

    /// inserts one row, or overwrites the non-key fields of the row with the same primary key.
    pub fn insert_or_update(&self, row: &Row) -> Result<(), Error> {
        let result = self.row_to_write(row).and_then(|(row, formats)| {
            let stmt = statement::upsert(
                self.gateway.dialect(),
                &self.full_table_name(),
                &row,
                &formats,
                self.definition.primary_key(),
            );
            self.run(&stmt).map(|_| ())
        });
        self.report(result)
    }

    fn prepare_batch(&self, rows: &[Row]) -> Result<(Vec<Row>, Vec<Format>), Error> {
        let rows = self.normalize_rows(rows);
        crate::validate::validate_rows(self.definition.primary_key(), &rows)?;
        let formats = self.ordered_formats(&rows[0]);
        Ok((rows, formats))
    }

    /// inserts a batch of rows with one statement.
    /// Nothing is written when the batch fails validation.
    pub fn insert_rows(&self, rows: &[Row]) -> Result<(), Error> {
        let result = self.prepare_batch(rows).and_then(|(rows, formats)| {
            let stmt = statement::insert_rows(
                self.gateway.dialect(),
                &self.full_table_name(),
                &rows,
                &formats,
            );
            self.run(&stmt).map(|_| ())
        });
        self.report(result)
    }

    /// inserts a batch of rows with one statement, overwriting rows whose primary key exists.
    pub fn insert_or_update_rows(&self, rows: &[Row]) -> Result<(), Error> {
        let result = self.prepare_batch(rows).and_then(|(rows, formats)| {
            let stmt = statement::upsert_rows(
                self.gateway.dialect(),
                &self.full_table_name(),
                &rows,
                &formats,
                self.definition.primary_key(),
            );
            self.run(&stmt).map(|_| ())
        });
        self.report(result)
    }

    /// deletes every row matching `predicate`. Returns false when nothing was deleted.
    pub fn delete_where(&self, predicate: &Row) -> Result<bool, Error> {
        let result = statement::delete_where(
            self.gateway.dialect(),
            &self.full_table_name(),
            &self.definition.columns(),
            predicate,
        )
        .map_err(Error::from)
        .and_then(|stmt| self.run(&stmt))
        .map(|n| n > 0);
        self.report(result)
    }

    // -- Reads --

    /// finds the row with primary key `key`.
    ///
    /// A single-column key takes a bare value. A composite key takes an array of values in key
    /// order, or a `Row` naming each key column. Any other shape fails with `Error::InvalidKey`
    /// before the database is queried.
    pub fn find(&self, key: impl Into<KeyArg>) -> Result<Option<Row>, Error> {
        let key = key.into();
        let primary_key = self.definition.primary_key();
        let result = match crate::validate::primary_key_predicate(primary_key, &key) {
            None => Err(Error::InvalidKey {
                expected: primary_key.iter().map(|c| String::from(*c)).collect(),
            }),
            Some(predicate) => statement::select_where(
                self.gateway.dialect(),
                &self.full_table_name(),
                &self.definition.columns(),
                &predicate,
                0,
                0,
            )
            .map_err(Error::from)
            .and_then(|stmt| Ok(self.gateway.query_row(&stmt.prepare(self.gateway)?)?)),
        };
        self.report(result)
    }

    /// finds the rows matching `predicate`.
    /// `limit` and `offset` apply only when they are greater than zero.
    pub fn find_where(&self, predicate: &Row, limit: u64, offset: u64) -> Result<Vec<Row>, Error> {
        let result = statement::select_where(
            self.gateway.dialect(),
            &self.full_table_name(),
            &self.definition.columns(),
            predicate,
            limit,
            offset,
        )
        .map_err(Error::from)
        .and_then(|stmt| Ok(self.gateway.query_rows(&stmt.prepare(self.gateway)?)?));
        self.report(result)
    }
}


#[cfg(test)]
struct Likes;

#[cfg(test)]
impl TableDefinition for Likes {
    fn table_name(&self) -> &str {
        "likes"
    }
    fn schema(&self, ddl: &DdlContext) -> String {
        format!(
            "CREATE TABLE {} (user_id INT NOT NULL, post_id INT NOT NULL, type_id INT NOT NULL, PRIMARY KEY (user_id, post_id)) {}",
            ddl.table_name(),
            ddl.charset_collate()
        )
    }
    fn columns(&self) -> Columns {
        columns! { "user_id" => Format::Int, "post_id" => Format::Int, "type_id" => Format::Int }
    }
    fn column_defaults(&self) -> Row {
        row! { "type_id" => 1 }
    }
    fn primary_key(&self) -> &[&str] {
        &["user_id", "post_id"]
    }
}

#[test]
fn test_statements_sent_to_gateway() {
    let g = recording::RecordingGateway::new(1);
    let t = Table::new(&g, &g, Likes).with_reporter(crate::report::ignore_error);

    assert_eq!(t.create_table().unwrap(), false);
    t.insert(&row! { "post_id" => "3", "user_id" => 2, "junk" => 1 })
        .unwrap();
    t.insert_or_update(&row! { "user_id" => 2, "post_id" => 3, "type_id" => 4 })
        .unwrap();
    t.find([2, 3]).unwrap();
    t.find_where(&row! { "type_id" => 4 }, 0, 2).unwrap();
    assert_eq!(t.count(), 7);

    let statements = g.statements.borrow();
    assert_eq!(
        statements.as_slice(),
        &[
            "CREATE TABLE wp_likes (user_id INT NOT NULL, post_id INT NOT NULL, type_id INT NOT NULL, PRIMARY KEY (user_id, post_id)) DEFAULT CHARACTER SET utf8mb4",
            "INSERT INTO `wp_likes` (`type_id`,`post_id`,`user_id`) VALUES (1,3,2)",
            "INSERT INTO `wp_likes` (`type_id`,`user_id`,`post_id`) VALUES (4,2,3) ON DUPLICATE KEY UPDATE `type_id` = VALUES(`type_id`)",
            "SELECT * FROM `wp_likes` WHERE `user_id` = 2 AND `post_id` = 3",
            "SELECT * FROM `wp_likes` WHERE `type_id` = 4 LIMIT 9223372036854775807 OFFSET 2",
            "SELECT count(*) FROM `wp_likes`",
        ]
    );
}

#[test]
fn test_rejected_input_runs_no_statement() {
    let g = recording::RecordingGateway::new(1);
    let reported = std::rc::Rc::new(std::cell::RefCell::new(vec![]));
    let sink = reported.clone();
    let t = Table::new(&g, &g, Likes).with_reporter(move |table, e| {
        sink.borrow_mut().push(format!("{}: {}", table, e));
    });

    assert!(matches!(t.find(2), Err(Error::InvalidKey { .. })));
    assert!(matches!(
        t.delete_where(&row! {}),
        Err(Error::InvalidPredicate(_))
    ));
    assert!(matches!(
        t.insert_rows(&[
            row! { "user_id" => 1, "post_id" => 1 },
            row! { "user_id" => 1, "post_id" => 1 },
        ]),
        Err(Error::InvalidRows(_))
    ));
    assert!(matches!(t.drop_table(false), Err(Error::DropNotAllowed(_))));
    assert!(g.statements.borrow().is_empty());
    assert_eq!(
        reported.borrow()[0],
        "wp_likes: Key does not match the primary key (user_id, post_id) of the table."
    );
    assert_eq!(reported.borrow().len(), 4);
}

#[test]
fn test_insert_that_affects_no_rows_fails() {
    let g = recording::RecordingGateway::new(0);
    let t = Table::new(&g, &g, Likes).with_reporter(crate::report::ignore_error);
    assert!(matches!(
        t.insert(&row! { "user_id" => 1, "post_id" => 1 }),
        Err(Error::NothingInserted(_))
    ));
    assert_eq!(t.update(&row! { "type_id" => 2 }, &row! { "user_id" => 1 }).unwrap(), false);
    assert_eq!(t.delete_where(&row! { "user_id" => 1 }).unwrap(), false);
}

#[test]
fn test_update_predicate_uses_declared_formats() {
    let g = recording::RecordingGateway::new(1);
    let t = Table::new(&g, &g, Likes).with_reporter(crate::report::ignore_error);
    assert!(t
        .update(&row! { "type_id" => 2 }, &row! { "user_id" => 1.5, "post_id" => "3" })
        .unwrap());
    assert_eq!(
        g.statements.borrow().as_slice(),
        &["UPDATE `wp_likes` SET `type_id` = 2 WHERE `user_id` = 1 AND `post_id` = 3"]
    );
}

#[cfg(test)]
struct Tags;

#[cfg(test)]
impl TableDefinition for Tags {
    fn table_name(&self) -> &str {
        "tags"
    }
    fn schema(&self, ddl: &DdlContext) -> String {
        format!(
            "CREATE TABLE {} (id INT NOT NULL, name TEXT NOT NULL, PRIMARY KEY (id))",
            ddl.table_name()
        )
    }
    fn columns(&self) -> Columns {
        columns! { "id" => Format::Int, "name" => Format::Text }
    }
    fn column_defaults(&self) -> Row {
        row! {}
    }
    fn primary_key(&self) -> &[&str] {
        &["id"]
    }
}

#[test]
fn test_row_with_no_columns_runs_no_statement() {
    let g = recording::RecordingGateway::new(1);
    let t = Table::new(&g, &g, Tags).with_reporter(crate::report::ignore_error);
    let junk = row! { "colour" => "red" };
    assert!(matches!(t.insert(&junk), Err(Error::EmptyRow(_))));
    assert!(matches!(t.insert_or_update(&junk), Err(Error::EmptyRow(_))));
    assert!(matches!(
        t.update(&junk, &row! { "id" => 1 }),
        Err(Error::EmptyRow(_))
    ));
    assert!(matches!(t.insert(&row! {}), Err(Error::EmptyRow(_))));
    assert!(g.statements.borrow().is_empty());
}
