//! Query executor.
//!
//! Builds a lazy iterator pipeline from a [`SelectStatement`] over any document
//! source. Stage order:
//!
//! ```text
//! source -> FROM -> JOIN* -> WHERE -> GROUP BY -> ORDER BY
//!        -> projection -> DISTINCT -> OFFSET -> LIMIT
//! ```
//!
//! Nothing is pulled from the source until the returned iterator is.

pub mod builtins;
mod filters;
pub mod helpers;
mod pipeline;
mod row;

use std::sync::Arc;

use serde_json::Value;

use crate::ast::{SelectItem, SelectStatement};
use crate::error::QueryResult;

pub use builtins::BuiltinFunctions;
pub use helpers::compare_values;
pub use row::{resolve_destination_column_name, RowContext, ROOT_TABLE};

use pipeline::{
    initial_table_name, DistinctIterator, FilterIterator, GroupByIterator, JoinIterator,
    LimitIterator, OffsetIterator, OrderIterator, ProjectIterator, SourceIterator, TableIterator,
};

/// Rows flowing between the stages before projection.
pub(crate) type RowIterator<'a> = Box<dyn Iterator<Item = QueryResult<RowContext>> + 'a>;

/// Lazy sequence of query results.
pub type QueryResults<'a> = Box<dyn Iterator<Item = QueryResult<Value>> + 'a>;

/// Run `statement` over a document source.
///
/// Source errors are passed through as `Err` items; evaluation itself never
/// fails.
pub fn execute_query<'a, I>(statement: &'a SelectStatement, documents: I) -> QueryResults<'a>
where
    I: IntoIterator<Item = QueryResult<Value>>,
    I::IntoIter: 'a,
{
    let table_name = initial_table_name(statement);
    tracing::debug!("Executing query with source bound as '{}'", table_name);

    let parameters = Arc::new(statement.parameters.clone());
    let source = SourceIterator::new(documents.into_iter(), table_name, parameters);
    execute_rows(statement, Box::new(source))
}

/// Run `statement` over in-memory documents and collect the results.
pub fn execute_documents(
    statement: &SelectStatement,
    documents: Vec<Value>,
) -> QueryResult<Vec<Value>> {
    execute_query(statement, documents.into_iter().map(Ok)).collect()
}

/// Build the pipeline over rows that are already bound, skipping the source
/// adapter. Correlated subqueries enter here with the outer row.
pub(crate) fn execute_rows<'a>(
    statement: &'a SelectStatement,
    source: RowIterator<'a>,
) -> QueryResults<'a> {
    let mut rows = source;

    if TableIterator::applies(&statement.table) {
        rows = Box::new(TableIterator::new(rows, &statement.table));
    }

    for join in &statement.join_items {
        rows = Box::new(JoinIterator::new(rows, join));
    }

    if let Some(filter) = &statement.filters {
        rows = Box::new(FilterIterator::new(rows, filter));
    }

    if !statement.group_by.is_empty() {
        rows = Box::new(GroupByIterator::new(rows, &statement.group_by));
    }

    if !statement.order_expressions.is_empty() {
        rows = Box::new(OrderIterator::new(rows, &statement.order_expressions));
    }

    let aggregate_all = statement.group_by.is_empty()
        && statement.select_items.iter().any(SelectItem::has_aggregate);
    let mut results: QueryResults<'a> = Box::new(ProjectIterator::new(
        rows,
        &statement.select_items,
        aggregate_all,
    ));

    if statement.distinct {
        results = Box::new(DistinctIterator::new(results));
    }

    if statement.offset > 0 {
        results = Box::new(OffsetIterator::new(results, statement.offset));
    }

    if let Some(limit) = statement.count {
        results = Box::new(LimitIterator::new(results, limit));
    }

    results
}
