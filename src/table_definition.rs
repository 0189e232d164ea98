//! Defines the trait a table type implements to describe itself.

use crate::dialect::Dialect;
use crate::row::{Columns, Row};

/// describes one table: its DDL, name, columns, defaults and primary key.
///
/// Implementations are plain descriptions. They hold no database handle and are never changed by
/// the operations of a `Table`.
///
/// # Examples
///
/// ```
/// use tablekit::{columns, row, DdlContext, Format, Row, Columns, TableDefinition};
///
/// struct Likes;
///
/// impl TableDefinition for Likes {
///     fn table_name(&self) -> &str {
///         "likes"
///     }
///     fn schema(&self, ddl: &DdlContext) -> String {
///         format!(
///             "CREATE TABLE {} (user_id INT NOT NULL, post_id INT NOT NULL, PRIMARY KEY (user_id, post_id)) {}",
///             ddl.table_name(),
///             ddl.charset_collate()
///         )
///     }
///     fn columns(&self) -> Columns {
///         columns! { "user_id" => Format::Int, "post_id" => Format::Int }
///     }
///     fn column_defaults(&self) -> Row {
///         row! {}
///     }
///     fn primary_key(&self) -> &[&str] {
///         &["user_id", "post_id"]
///     }
/// }
/// ```
pub trait TableDefinition {
    /// the table name, without the gateway's prefix.
    fn table_name(&self) -> &str;

    /// the `CREATE TABLE` statement for this table.
    fn schema(&self, ddl: &DdlContext) -> String;

    /// the storable columns and the format each is bound with, in column order.
    fn columns(&self) -> Columns;

    /// values for columns that rows may leave out.
    fn column_defaults(&self) -> Row;

    /// the primary key columns, in the order of the key's composition.
    fn primary_key(&self) -> &[&str];

    /// whether `Table::drop_table` may drop this table without being forced.
    fn allow_drop(&self) -> bool {
        false
    }
}

/// carries what a `TableDefinition` needs to write its DDL for a particular gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdlContext {
    pub(crate) full_table_name: String,
    pub(crate) charset_collate: String,
    pub(crate) dialect: Dialect,
}

impl DdlContext {
    pub fn new(full_table_name: &str, charset_collate: &str, dialect: Dialect) -> Self {
        DdlContext {
            full_table_name: String::from(full_table_name),
            charset_collate: String::from(charset_collate),
            dialect,
        }
    }

    /// the full (prefixed) table name.
    pub fn table_name(&self) -> &str {
        &self.full_table_name
    }

    pub fn charset_collate(&self) -> &str {
        &self.charset_collate
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// a column definition for a timestamp that defaults to the time the row is written.
    /// With `on_update`, MySQL also refreshes it whenever the row changes; SQLite has no such
    /// column option and the column only gets its default.
    pub fn timestamp_field(&self, name: &str, on_update: bool) -> String {
        let mut field = format!(
            "{} TIMESTAMP DEFAULT CURRENT_TIMESTAMP",
            self.dialect.quote_identifier(name)
        );
        if on_update && self.dialect.supports_on_update_timestamp() {
            field.push_str(" ON UPDATE CURRENT_TIMESTAMP");
        }
        field
    }
}

#[test]
fn test_timestamp_field() {
    let ddl = DdlContext::new("wp_t", "", Dialect::MySql);
    assert_eq!(
        ddl.timestamp_field("created_at", false),
        "`created_at` TIMESTAMP DEFAULT CURRENT_TIMESTAMP"
    );
    assert_eq!(
        ddl.timestamp_field("custom_column_name", false),
        "`custom_column_name` TIMESTAMP DEFAULT CURRENT_TIMESTAMP"
    );
    assert_eq!(
        ddl.timestamp_field("t", true),
        "`t` TIMESTAMP DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP"
    );
    let ddl = DdlContext::new("t", "", Dialect::Sqlite);
    assert_eq!(
        ddl.timestamp_field("t", true),
        "`t` TIMESTAMP DEFAULT CURRENT_TIMESTAMP"
    );
}
