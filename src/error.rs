use cosmoql_core::QueryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database '{0}' not found")]
    DatabaseNotFound(String),

    #[error("Collection '{0}' not found")]
    CollectionNotFound(String),

    #[error("Document with id '{0}' not found")]
    DocumentNotFound(String),

    #[error("Database '{0}' already exists")]
    DatabaseAlreadyExists(String),

    #[error("Collection '{0}' already exists")]
    CollectionAlreadyExists(String),

    #[error("Document with id '{0}' already exists")]
    DocumentAlreadyExists(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Invalid query parameter: {0}")]
    InvalidParameter(String),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type DbResult<T> = Result<T, DbError>;

impl serde::Serialize for DbError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            DbError::CollectionNotFound("people".to_string()).to_string(),
            "Collection 'people' not found"
        );
        assert_eq!(
            DbError::DocumentAlreadyExists("42".to_string()).to_string(),
            "Document with id '42' already exists"
        );
    }

    #[test]
    fn test_query_error_conversion() {
        let err: DbError = QueryError::ParseError("near 'x'".to_string()).into();
        assert!(matches!(err, DbError::Query(_)));
        assert!(err.to_string().starts_with("Query error: "));
    }

    #[test]
    fn test_serializes_as_message() {
        let err = DbError::DatabaseNotFound("db1".to_string());
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!("Database 'db1' not found")
        );
    }
}
