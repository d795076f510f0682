use serde_json::{Map, Value};

use crate::ast::SelectItem;
use crate::error::QueryResult;
use crate::executor::row::{resolve_destination_column_name, RowContext};
use crate::executor::RowIterator;

use super::drain;

/// Projection: turns row contexts into result values.
///
/// With `aggregate_all` (aggregates but no GROUP BY) the whole input is one
/// group and at most one value is produced.
pub(crate) struct ProjectIterator<'a> {
    upstream: Option<RowIterator<'a>>,
    items: &'a [SelectItem],
    aggregate_all: bool,
}

impl<'a> ProjectIterator<'a> {
    pub(crate) fn new(upstream: RowIterator<'a>, items: &'a [SelectItem], aggregate_all: bool) -> Self {
        Self {
            upstream: Some(upstream),
            items,
            aggregate_all,
        }
    }

    fn project(&self, row: &RowContext) -> Value {
        if let Some(first) = self.items.first() {
            if first.is_top_level {
                return row.resolve(first);
            }
        }

        let mut object = Map::new();
        for (index, item) in self.items.iter().enumerate() {
            let name = resolve_destination_column_name(item, index, row.parameters());
            object.insert(name, row.resolve(item));
        }
        Value::Object(object)
    }

    fn project_single_group(&mut self) -> Option<QueryResult<Value>> {
        let upstream = self.upstream.take()?;
        let rows = match drain(upstream) {
            Ok(rows) => rows,
            Err(err) => return Some(Err(err)),
        };

        let mut group = rows.first()?.clone();
        group.grouped_rows = rows;
        Some(Ok(self.project(&group)))
    }
}

impl Iterator for ProjectIterator<'_> {
    type Item = QueryResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.aggregate_all {
            return self.project_single_group();
        }

        let upstream = self.upstream.as_mut()?;
        match upstream.next() {
            Some(Ok(row)) => Some(Ok(self.project(&row))),
            Some(Err(err)) => Some(Err(err)),
            None => {
                self.upstream = None;
                None
            }
        }
    }
}
