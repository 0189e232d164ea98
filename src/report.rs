//! reports failed table operations.
//!
//! Every failing operation of a `Table` hands its error to a reporter before returning it, so a
//! host application can route failures to its own logging without inspecting each result.

use crate::table::Error;

/// receives the table's full name and the error of each failed operation.
pub type ErrorReporter = Box<dyn Fn(&str, &Error)>;

/// the default reporter: logs a warning through `tracing`.
pub fn log_error(table: &str, error: &Error) {
    tracing::warn!(table = table, error = %error, "table operation failed");
}

/// a reporter that discards every error.
pub fn ignore_error(_table: &str, _error: &Error) {}
