use std::collections::VecDeque;

use serde_json::Value;

use crate::ast::JoinItem;
use crate::error::QueryResult;
use crate::executor::row::{resolve_destination_column_name, RowContext};
use crate::executor::RowIterator;

/// Lateral flatten: each upstream row becomes one row per element of the
/// join source, with the element bound under the join alias.
///
/// A source that is not an array produces no rows.
pub(crate) struct JoinIterator<'a> {
    upstream: Option<RowIterator<'a>>,
    join: &'a JoinItem,
    buffer: VecDeque<RowContext>,
}

impl<'a> JoinIterator<'a> {
    pub(crate) fn new(upstream: RowIterator<'a>, join: &'a JoinItem) -> Self {
        Self {
            upstream: Some(upstream),
            join,
            buffer: VecDeque::new(),
        }
    }

    fn expand(&mut self, row: RowContext) {
        let alias = self.join.table.value.clone().unwrap_or_else(|| {
            resolve_destination_column_name(&self.join.select_item, 0, row.parameters())
        });

        match row.resolve(&self.join.select_item) {
            Value::Array(elements) => {
                for element in elements {
                    self.buffer.push_back(row.with_binding(&alias, element));
                }
            }
            other => tracing::debug!("JOIN source for '{}' is not an array: {}", alias, other),
        }
    }
}

impl Iterator for JoinIterator<'_> {
    type Item = QueryResult<RowContext>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.buffer.pop_front() {
                return Some(Ok(row));
            }

            let upstream = self.upstream.as_mut()?;
            match upstream.next() {
                Some(Ok(row)) => self.expand(row),
                Some(Err(err)) => return Some(Err(err)),
                None => {
                    self.upstream = None;
                    return None;
                }
            }
        }
    }
}
