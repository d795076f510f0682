use std::collections::VecDeque;
use std::sync::Arc;

use serde_json::Value;

use crate::ast::{SelectItemKind, Table};
use crate::error::QueryResult;
use crate::executor::row::{resolve_destination_column_name, RowContext, ROOT_TABLE};
use crate::executor::RowIterator;

/// FROM binding: re-binds a path under its alias, or flattens an `IN` path or
/// a subquery into one row per element.
pub(crate) struct TableIterator<'a> {
    upstream: Option<RowIterator<'a>>,
    table: &'a Table,
    buffer: VecDeque<RowContext>,
}

impl<'a> TableIterator<'a> {
    pub(crate) fn new(upstream: RowIterator<'a>, table: &'a Table) -> Self {
        Self {
            upstream: Some(upstream),
            table,
            buffer: VecDeque::new(),
        }
    }

    /// True when the FROM clause needs a binding stage at all.
    pub(crate) fn applies(table: &Table) -> bool {
        !table.select_item.path.is_empty()
            || matches!(table.select_item.kind, SelectItemKind::SubQuery(_))
    }

    fn expand(&mut self, mut row: RowContext) {
        let table = self.table;
        let item = &table.select_item;
        let destination = item
            .alias
            .clone()
            .or_else(|| table.value.clone())
            .unwrap_or_else(|| resolve_destination_column_name(item, 0, row.parameters()));

        // `FROM c` over rows already bound as `c`
        if !table.is_in_select
            && item.path.len() == 1
            && item.path[0] == destination
            && row.table(&destination).is_some()
        {
            self.buffer.push_back(row);
            return;
        }

        // `FROM root r`: an unknown first segment names the source document
        if let Some(first) = item.path.first() {
            if row.table(first).is_none() {
                if let Some(root) = row.tables.get(ROOT_TABLE).map(Arc::clone) {
                    row.tables.insert(first.clone(), root);
                }
            }
        }

        if table.is_in_select || matches!(item.kind, SelectItemKind::SubQuery(_)) {
            match row.resolve(item) {
                Value::Array(elements) => {
                    for element in elements {
                        self.buffer.push_back(row.with_binding(&destination, element));
                    }
                }
                other => tracing::debug!("FROM source is not an array: {}", other),
            }
            return;
        }

        let value = row.resolve(item);
        row.bind(&destination, value);
        self.buffer.push_back(row);
    }
}

impl Iterator for TableIterator<'_> {
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
