//! Error types for cosmoql-core.
//!
//! Evaluation itself never fails: type mismatches and missing fields resolve to
//! `null`. Only the parser and the document source can produce errors.

use thiserror::Error;

/// Query error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Document source error: {0}")]
    SourceError(String),
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

impl serde::Serialize for QueryError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}
