//! Query service: runs query text against a stored collection.

use cosmoql_core::{execute_query, parse, Parameters, QueryError, QueryResult};
use serde_json::Value;

use crate::config::Config;
use crate::error::{DbError, DbResult};
use crate::store::DocumentStore;

#[derive(Debug, Clone)]
pub struct QueryService {
    store: DocumentStore,
    return_all_on_parse_error: bool,
}

impl QueryService {
    pub fn new(store: DocumentStore, config: &Config) -> Self {
        Self {
            store,
            return_all_on_parse_error: config.return_all_on_parse_error,
        }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Run `query` over `database/collection` and collect every result.
    ///
    /// A query that does not parse returns the whole collection unfiltered
    /// when `return_all_on_parse_error` is set, and a [`DbError::Query`]
    /// otherwise.
    pub fn execute(
        &self,
        database: &str,
        collection: &str,
        query: &str,
        parameters: Parameters,
    ) -> DbResult<Vec<Value>> {
        let statement = match parse(query) {
            Ok(statement) => statement.with_parameters(parameters),
            Err(err @ QueryError::ParseError(_)) if self.return_all_on_parse_error => {
                tracing::warn!(
                    "Returning all documents of '{}/{}' for unparseable query {:?}: {}",
                    database,
                    collection,
                    query,
                    err
                );
                return self.store.list_documents(database, collection);
            }
            Err(err) => return Err(err.into()),
        };

        let documents = self.store.document_iterator(database, collection)?;
        let results: Vec<Value> =
            execute_query(&statement, documents).collect::<QueryResult<_>>()?;

        tracing::debug!(
            "Query on '{}/{}' returned {} row(s)",
            database,
            collection,
            results.len()
        );
        Ok(results)
    }
}

/// Convert a request parameter list `[{"name": "@x", "value": ...}]` into the
/// parameter map a statement carries. A missing `value` binds `null`.
pub fn parameters_to_map(parameters: &[Value]) -> DbResult<Parameters> {
    let mut map = Parameters::new();
    for parameter in parameters {
        let name = parameter
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| DbError::InvalidParameter(format!("missing 'name' in {}", parameter)))?;
        if !name.starts_with('@') {
            return Err(DbError::InvalidParameter(format!(
                "name '{}' must start with '@'",
                name
            )));
        }
        let value = parameter.get("value").cloned().unwrap_or(Value::Null);
        map.insert(name.to_string(), value);
    }
    Ok(map)
}

/// Parse a command-line parameter of the form `@name=<json>`.
///
/// A value that is not valid JSON is taken as a plain string.
pub fn parse_parameter_arg(arg: &str) -> DbResult<(String, Value)> {
    let (name, raw) = arg
        .split_once('=')
        .ok_or_else(|| DbError::InvalidParameter(format!("expected @name=value, got '{}'", arg)))?;
    let name = name.trim();
    if !name.starts_with('@') || name.len() < 2 {
        return Err(DbError::InvalidParameter(format!(
            "name '{}' must start with '@'",
            name
        )));
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((name.to_string(), value))
}
