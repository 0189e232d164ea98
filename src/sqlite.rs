//! A `Gateway` and `SchemaApplier` backed by an SQLite database through `rusqlite`.

use std::cell::RefCell;
use std::path::Path;

use anyhow::Context;
use rusqlite::types::ValueRef;
use rusqlite::Connection;

use crate::dialect::Dialect;
use crate::gateway::{Error, Gateway, SchemaApplier, SchemaChanges};
use crate::row::Row;
use crate::sql_value::SqlValue;

fn statement_error(e: rusqlite::Error) -> Error {
    Error::Statement(Box::new(e))
}

fn value_from_ref(v: ValueRef<'_>) -> SqlValue {
    match v {
        ValueRef::Null => SqlValue::Null,
        ValueRef::Integer(i) => SqlValue::Int(i),
        ValueRef::Real(f) => SqlValue::Real(f),
        ValueRef::Text(t) => SqlValue::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => SqlValue::Text(hex::encode(b)),
    }
}

/// runs statements on one SQLite connection.
///
/// The table prefix can be changed after tables were built on this gateway; they pick the new
/// prefix up on their next call.
pub struct SqliteGateway {
    conn: Connection,
    prefix: RefCell<String>,
    charset_collate: String,
}

impl SqliteGateway {
    pub fn open<P: AsRef<Path>>(path: P, prefix: &str) -> Result<Self, Error> {
        let conn = Connection::open(path).map_err(statement_error)?;
        Ok(Self::from_connection(conn, prefix))
    }

    pub fn open_in_memory(prefix: &str) -> Result<Self, Error> {
        let conn = Connection::open_in_memory().map_err(statement_error)?;
        Ok(Self::from_connection(conn, prefix))
    }

    pub fn from_connection(conn: Connection, prefix: &str) -> Self {
        SqliteGateway {
            conn,
            prefix: RefCell::new(String::from(prefix)),
            charset_collate: String::new(),
        }
    }

    /// sets the clause appended to `CREATE TABLE` statements, such as `STRICT`.
    pub fn with_charset_collate(mut self, clause: &str) -> Self {
        self.charset_collate = String::from(clause);
        self
    }

    pub fn set_prefix(&self, prefix: &str) {
        *self.prefix.borrow_mut() = String::from(prefix);
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn query(&self, sql: &str, max_rows: Option<usize>) -> Result<Vec<Row>, Error> {
        tracing::debug!(sql = %sql, "query");
        let mut stmt = self.conn.prepare(sql).map_err(statement_error)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query([]).map_err(statement_error)?;
        let mut result = vec![];
        while let Some(r) = rows.next().map_err(statement_error)? {
            let mut row = Row::new();
            for (i, name) in names.iter().enumerate() {
                let value = r.get_ref(i).map_err(statement_error)?;
                row.insert(name.clone(), value_from_ref(value));
            }
            result.push(row);
            if max_rows.map_or(false, |m| result.len() >= m) {
                break;
            }
        }
        Ok(result)
    }

    fn existing_columns(&self, table: &str) -> anyhow::Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1)")?;
        let names = stmt
            .query_map([table], |r| r.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn apply(&self, ddl: &str) -> anyhow::Result<SchemaChanges> {
        let create = crate::pt_to_ast::parse_create_statement(ddl)?;
        let table = &create.tablename;
        let mut changes = SchemaChanges::new();
        let existing = self
            .existing_columns(table)
            .with_context(|| format!("reading columns of {}", table))?;

        if existing.is_empty() {
            tracing::debug!(sql = %ddl, "execute");
            self.conn
                .execute_batch(ddl)
                .with_context(|| format!("creating table {}", table))?;
            tracing::info!(
                table = %table,
                columns = ?create.column_names(),
                primary_key = ?create.primary_key,
                "created table"
            );
            changes.insert(table.clone(), format!("Created table {}", table));
            return Ok(changes);
        }

        for coldef in &create.coldefs {
            let column = &coldef.colname.name;
            if existing.iter().any(|c| c.eq_ignore_ascii_case(column)) {
                continue;
            }
            let sql = format!(
                "ALTER TABLE {} ADD COLUMN {} {}",
                Dialect::Sqlite.quote_identifier(table),
                Dialect::Sqlite.quote_identifier(column),
                coldef.spec
            );
            tracing::debug!(sql = %sql, "execute");
            self.conn
                .execute_batch(&sql)
                .with_context(|| format!("adding column {}.{}", table, column))?;
            tracing::info!(
                table = %table,
                column = %column,
                coltype = coldef.coltype(),
                "added column"
            );
            changes.insert(
                format!("{}.{}", table, column),
                format!("Added column {}.{}", table, column),
            );
        }
        Ok(changes)
    }
}

impl Gateway for SqliteGateway {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn prefix(&self) -> String {
        self.prefix.borrow().clone()
    }

    fn charset_collate(&self) -> String {
        self.charset_collate.clone()
    }

    fn execute(&self, sql: &str) -> Result<u64, Error> {
        tracing::debug!(sql = %sql, "execute");
        let n = self.conn.execute(sql, []).map_err(statement_error)?;
        Ok(n as u64)
    }

    fn query_scalar(&self, sql: &str) -> Result<Option<SqlValue>, Error> {
        Ok(self
            .query(sql, Some(1))?
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next().map(|(_, v)| v)))
    }

    fn query_row(&self, sql: &str) -> Result<Option<Row>, Error> {
        Ok(self.query(sql, Some(1))?.into_iter().next())
    }

    fn query_rows(&self, sql: &str) -> Result<Vec<Row>, Error> {
        self.query(sql, None)
    }

    fn last_insert_id(&self) -> i64 {
        self.conn.last_insert_rowid()
    }
}

impl SchemaApplier for SqliteGateway {
    fn apply_schema(&self, ddl: &str) -> Result<SchemaChanges, Error> {
        self.apply(ddl).map_err(|e| Error::Schema(format!("{:#}", e)))
    }
}

#[cfg(test)]
fn test_gateway() -> SqliteGateway {
    SqliteGateway::open_in_memory("wp_").unwrap()
}

#[test]
fn test_execute_and_query() {
    let g = test_gateway();
    g.execute("CREATE TABLE t (a INTEGER, b REAL, c TEXT, d BLOB)")
        .unwrap();
    assert_eq!(
        g.execute("INSERT INTO t VALUES (1, 1.5, 'x', x'00ff'), (2, NULL, 'y', NULL)")
            .unwrap(),
        2
    );
    assert_eq!(g.last_insert_id(), 2);
    let rows = g.query_rows("SELECT * FROM t ORDER BY a").unwrap();
    assert_eq!(
        rows[0],
        row! { "a" => 1, "b" => 1.5, "c" => "x", "d" => "00ff" }
    );
    assert_eq!(rows[1]["b"], SqlValue::Null);
    assert_eq!(
        g.query_scalar("SELECT count(*) FROM t").unwrap(),
        Some(SqlValue::Int(2))
    );
    assert_eq!(g.query_row("SELECT * FROM t WHERE a = 3").unwrap(), None);
    assert!(g.execute("INSERT INTO missing VALUES (1)").is_err());
}

#[test]
fn test_prefix_and_charset() {
    let g = test_gateway().with_charset_collate("STRICT");
    assert_eq!(g.prefix(), "wp_");
    g.set_prefix("other_");
    assert_eq!(g.prefix(), "other_");
    assert_eq!(g.charset_collate(), "STRICT");
}

#[test]
fn test_apply_schema_creates_then_alters() {
    let g = test_gateway();
    let changes = g
        .apply_schema("CREATE TABLE `wp_t` (a INTEGER NOT NULL, PRIMARY KEY (a))")
        .unwrap();
    assert_eq!(changes.get("wp_t").map(String::as_str), Some("Created table wp_t"));

    let changes = g
        .apply_schema("CREATE TABLE `wp_t` (a INTEGER NOT NULL, PRIMARY KEY (a))")
        .unwrap();
    assert!(changes.is_empty());

    let changes = g
        .apply_schema("CREATE TABLE `wp_t` (a INTEGER NOT NULL, b TEXT DEFAULT 'x', PRIMARY KEY (a))")
        .unwrap();
    assert_eq!(
        changes.get("wp_t.b").map(String::as_str),
        Some("Added column wp_t.b")
    );
    assert_eq!(g.existing_columns("wp_t").unwrap(), vec!["a", "b"]);
}

#[test]
fn test_apply_schema_rejects_unparseable_ddl() {
    let g = test_gateway();
    assert!(matches!(
        g.apply_schema("DROP TABLE t"),
        Err(Error::Schema(_))
    ));
}
