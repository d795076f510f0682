//! Lazy pull-based query stages.
//!
//! Every stage owns its upstream iterator and drops it once exhausted.
//! Stages before projection carry [`RowContext`](super::RowContext)s; stages
//! after it carry projected values.

mod distinct;
mod filter;
mod from;
mod group_by;
mod join;
mod limit;
mod offset;
mod order;
mod project;
mod source;

pub(crate) use distinct::DistinctIterator;
pub(crate) use filter::FilterIterator;
pub(crate) use from::TableIterator;
pub(crate) use group_by::GroupByIterator;
pub(crate) use join::JoinIterator;
pub(crate) use limit::LimitIterator;
pub(crate) use offset::OffsetIterator;
pub(crate) use order::OrderIterator;
pub(crate) use project::ProjectIterator;
pub(crate) use source::{initial_table_name, SourceIterator};

use crate::error::QueryResult;

use super::row::RowContext;

/// Pull every upstream row, stopping at the first error.
pub(crate) fn drain<I>(upstream: I) -> QueryResult<Vec<RowContext>>
where
    I: Iterator<Item = QueryResult<RowContext>>,
{
    upstream.collect()
}
