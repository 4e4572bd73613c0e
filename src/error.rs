//! Error types for the query engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Load-time errors
    #[error("Schema mismatch in table {table}: {reason}")]
    SchemaMismatch { table: String, reason: String },

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table already registered: {0}")]
    DuplicateTable(String),

    #[error("Column already exists: {0}")]
    DuplicateColumn(String),

    // Expression errors
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Ambiguous column reference: {0}")]
    AmbiguousColumn(String),

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    // Plan errors
    #[error("Invalid limit: {0}")]
    InvalidLimit(i64),

    #[error("Execution error: {0}")]
    ExecutionError(String),
}
