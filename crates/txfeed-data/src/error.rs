//! Error types for txfeed-data

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("IO error")]
    Io(#[from] io::Error),

    #[error("Invalid dataset JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Employee not found: {id}")]
    EmployeeNotFound { id: String },

    #[error("Page not found: {token}")]
    PageNotFound { token: String },

    #[error("Employee id must not be empty")]
    EmptyEmployeeId,

    #[error("Duplicate employee id: {id}")]
    DuplicateEmployee { id: String },

    #[error("Transaction {transaction} refers to unknown employee {employee}")]
    UnknownEmployee { transaction: String, employee: String },
}
