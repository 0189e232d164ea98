//! `tablekit` gives typed access to the tables of a relational database.
//!
//! A table is described by a `TableDefinition`: its name, its `CREATE TABLE` statement, the format
//! each column is bound with, column defaults and its primary key. A `Table` pairs a definition
//! with a `Gateway` that runs statements and a `SchemaApplier` that creates the table, and provides
//! the schema lifecycle and the read and write operations.
//!
//! Rows are normalized before they are written and batches are validated before any statement is
//! built. Every value is bound into a statement with the format resolved for its column, so no
//! caller value is ever pasted into SQL unquoted.
//!
//! `SqliteGateway` implements both interfaces over an SQLite connection.

#[macro_use]
pub mod row;

mod ast;
pub mod clause;
pub mod dialect;
pub mod format;
pub mod gateway;
pub mod parser;
pub mod prepare;
mod pt_to_ast;
pub mod report;
pub mod sql_value;
pub mod sqlite;
pub mod statement;
pub mod table;
pub mod table_definition;
pub mod validate;

extern crate pest;
#[macro_use]
extern crate pest_derive;

pub use clause::Statement;
pub use dialect::Dialect;
pub use format::Format;
pub use gateway::{Gateway, SchemaApplier, SchemaChanges};
pub use report::ErrorReporter;
pub use row::{Columns, Row};
pub use sql_value::SqlValue;
pub use sqlite::SqliteGateway;
pub use table::{Error, Table};
pub use table_definition::{DdlContext, TableDefinition};
pub use validate::KeyArg;
