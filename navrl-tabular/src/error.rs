//! Errors of the tabular store.
use thiserror::Error;

/// Errors raised by the Q-table store.
#[derive(Error, Debug)]
pub enum QTableError {
    /// Table created with an empty dimension.
    #[error("Q-table dimensions must be positive, got {n_states} x {n_actions}")]
    EmptyDimension {
        /// Requested number of rows.
        n_states: usize,
        /// Requested number of columns.
        n_actions: usize,
    },

    /// A field of the persisted table did not parse as a number.
    #[error("malformed Q-table at {path}, line {line}: {msg}")]
    Parse {
        /// Path of the file being read.
        path: String,
        /// 1-based line number.
        line: usize,
        /// Description of the offending field.
        msg: String,
    },

    /// Rows of the persisted table have inconsistent lengths.
    #[error("ragged Q-table at {path}: line {line} has {found} fields, expected {expected}")]
    Shape {
        /// Path of the file being read.
        path: String,
        /// 1-based line number.
        line: usize,
        /// Number of fields of the first row.
        expected: usize,
        /// Number of fields found on this row.
        found: usize,
    },
}
