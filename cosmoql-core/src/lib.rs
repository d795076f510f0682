//! cosmoql-core - parser and lazy executor for a Cosmos-style SQL dialect over
//! JSON documents.
//!
//! The crate has no storage dependency: queries run over any iterator of
//! `QueryResult<serde_json::Value>`.
//!
//! # Main Components
//!
//! - **Parser**: turns query text into a [`SelectStatement`]
//! - **AST**: statements, select items, expressions and function calls
//! - **Executor**: lazy pipeline of FROM, JOIN, WHERE, GROUP BY, ORDER BY,
//!   projection, DISTINCT, OFFSET and LIMIT stages, plus the builtin functions
//!
//! # Example
//!
//! ```rust
//! use cosmoql_core::{execute_documents, parse};
//! use serde_json::json;
//!
//! let statement = parse("SELECT c.id FROM c WHERE c.isCool = true").unwrap();
//! let documents = vec![
//!     json!({"id": "12345", "isCool": false}),
//!     json!({"id": "67890", "isCool": true}),
//! ];
//!
//! let results = execute_documents(&statement, documents).unwrap();
//! assert_eq!(results, vec![json!({"id": "67890"})]);
//! ```

pub mod ast;
pub mod error;
pub mod executor;
pub mod lexer;
pub mod parser;

// Re-export main types for convenience
pub use ast::{
    Constant, Expression, FunctionCall, FunctionCallType, JoinItem, OrderDirection,
    OrderExpression, Parameters, SelectItem, SelectItemKind, SelectStatement, Table,
};
pub use error::{QueryError, QueryResult};
pub use executor::{
    compare_values, execute_documents, execute_query, BuiltinFunctions, QueryResults, RowContext,
};
pub use lexer::{Lexer, Token};
pub use parser::{parse, Parser};
