pub mod config;
pub mod error;
pub mod logging;
pub mod service;
pub mod store;

pub use config::Config;
pub use error::{DbError, DbResult};
pub use service::{parameters_to_map, parse_parameter_arg, QueryService};
pub use store::{CollectionInfo, DatabaseInfo, DocumentIterator, DocumentStore, PartitionKey};

pub use cosmoql_core::{parse, Parameters, QueryError, QueryResult, SelectStatement};
