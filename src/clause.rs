//! builds the pieces statements are assembled from: `WHERE` clauses, field lists and `VALUES` lists.
//!
//! Pieces are collected in a `Statement`: a template holding quoted identifiers and placeholders,
//! plus the values for those placeholders in order. Values never enter the template text; the
//! gateway binds them when the statement is prepared.

use itertools::Itertools;

use crate::dialect::Dialect;
use crate::format::{resolve_format, Format};
use crate::row::{Columns, Row};
use crate::sql_value::SqlValue;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("A predicate must name at least one column.")]
    EmptyPredicate,
    #[error("A predicate column name must not be empty.")]
    EmptyColumnName,
}

/// holds a statement template and the values bound to its placeholders, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    template: String,
    values: Vec<SqlValue>,
}

impl Statement {
    pub fn new() -> Self {
        Statement::default()
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// appends fixed SQL text. The text must not contain placeholders or stray `%` signs.
    pub fn push_sql(&mut self, sql: &str) -> &mut Self {
        self.template.push_str(sql);
        self
    }

    /// appends a quoted identifier.
    pub fn push_identifier(&mut self, dialect: Dialect, name: &str) -> &mut Self {
        self.template
            .push_str(&dialect.quote_identifier(name).replace('%', "%%"));
        self
    }

    /// appends a comma separated list of quoted identifiers.
    pub fn push_fields<S: AsRef<str>>(&mut self, dialect: Dialect, fields: &[S]) -> &mut Self {
        self.template
            .push_str(&fields_string(dialect, fields).replace('%', "%%"));
        self
    }

    /// appends a placeholder for `value`, bound with `format`.
    pub fn push_value(&mut self, format: Format, value: SqlValue) -> &mut Self {
        self.template.push_str(format.placeholder());
        self.values.push(value);
        self
    }

    /// appends another statement's template and values.
    pub fn append(&mut self, other: Statement) -> &mut Self {
        self.template.push_str(&other.template);
        self.values.extend(other.values);
        self
    }

    /// binds the values with the gateway, producing SQL ready to execute.
    pub fn prepare(
        &self,
        gateway: &dyn crate::gateway::Gateway,
    ) -> Result<String, crate::gateway::Error> {
        gateway.prepare(&self.template, &self.values)
    }
}

/// joins `fields` as quoted identifiers separated by commas, e.g. `` `one`,`two`,`three` ``.
pub fn fields_string<S: AsRef<str>>(dialect: Dialect, fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| dialect.quote_identifier(f.as_ref()))
        .join(",")
}

/// builds `WHERE `a` = %d AND `b` = %s ...` from a predicate.
/// Each value is bound with its column's declared format, or a guessed one for undeclared columns.
pub fn where_clause(
    dialect: Dialect,
    columns: &Columns,
    predicate: &Row,
) -> Result<Statement, Error> {
    if predicate.is_empty() {
        return Err(Error::EmptyPredicate);
    }
    let mut stmt = Statement::new();
    for (i, (column, value)) in predicate.iter().enumerate() {
        if column.is_empty() {
            return Err(Error::EmptyColumnName);
        }
        stmt.push_sql(match i {
            0 => "WHERE ",
            _ => " AND ",
        });
        stmt.push_identifier(dialect, column)
            .push_sql(" = ")
            .push_value(resolve_format(columns, column, value), value.clone());
    }
    Ok(stmt)
}

/// builds `VALUES (%d,%s),(%d,%s)...` for a batch.
/// Every row is bound positionally with `formats`, which follow the first row's field order.
pub fn values_clause(rows: &[Row], formats: &[Format]) -> Statement {
    let mut stmt = Statement::new();
    stmt.push_sql("VALUES ");
    for (i, r) in rows.iter().enumerate() {
        if i > 0 {
            stmt.push_sql(",");
        }
        stmt.push_sql("(");
        for (j, (value, format)) in r.values().zip(formats).enumerate() {
            if j > 0 {
                stmt.push_sql(",");
            }
            stmt.push_value(*format, value.clone());
        }
        stmt.push_sql(")");
    }
    stmt
}

#[test]
fn test_fields_string() {
    assert_eq!(
        fields_string(Dialect::MySql, &["one", "two", "three"]),
        "`one`,`two`,`three`"
    );
}

#[test]
fn test_where_clause_template() {
    let columns = columns! { "arg1" => Format::Text };
    let stmt = where_clause(
        Dialect::MySql,
        &columns,
        &row! { "arg1" => 1, "arg2" => "string", "arg3" => 0.1234 },
    )
    .unwrap();
    assert_eq!(
        stmt.template(),
        "WHERE `arg1` = %s AND `arg2` = %s AND `arg3` = %f"
    );
    assert_eq!(stmt.values().len(), 3);
}

#[test]
fn test_where_clause_rejects_empty_predicates() {
    let columns = Columns::new();
    assert_eq!(
        where_clause(Dialect::MySql, &columns, &row! {}),
        Err(Error::EmptyPredicate)
    );
    assert_eq!(
        where_clause(Dialect::MySql, &columns, &row! { "" => 1 }),
        Err(Error::EmptyColumnName)
    );
}

#[test]
fn test_identifiers_cannot_add_placeholders() {
    let stmt = where_clause(Dialect::Sqlite, &Columns::new(), &row! { "a%d" => 1 }).unwrap();
    assert_eq!(stmt.template(), "WHERE `a%%d` = %d");
    assert_eq!(
        crate::prepare::prepare(Dialect::Sqlite, stmt.template(), stmt.values()),
        Ok(String::from("WHERE `a%d` = 1"))
    );
}

#[test]
fn test_values_clause() {
    let rows = vec![
        row! { "user_id" => 1, "name" => "a" },
        row! { "user_id" => 2, "name" => "b" },
    ];
    let stmt = values_clause(&rows, &[Format::Int, Format::Text]);
    assert_eq!(stmt.template(), "VALUES (%d,%s),(%d,%s)");
    assert_eq!(
        stmt.values(),
        &[
            SqlValue::Int(1),
            SqlValue::from("a"),
            SqlValue::Int(2),
            SqlValue::from("b")
        ]
    );
}
