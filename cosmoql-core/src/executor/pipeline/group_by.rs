use std::collections::HashMap;
use std::vec;

use serde_json::Value;

use crate::ast::SelectItem;
use crate::error::QueryResult;
use crate::executor::helpers::group_key;
use crate::executor::row::RowContext;
use crate::executor::RowIterator;

use super::drain;

/// GROUP BY: materializes the input on first pull and yields one row per
/// key, in first-seen order, with the members in `grouped_rows`.
pub(crate) struct GroupByIterator<'a> {
    upstream: Option<RowIterator<'a>>,
    group_by: &'a [SelectItem],
    groups: Option<vec::IntoIter<RowContext>>,
}

impl<'a> GroupByIterator<'a> {
    pub(crate) fn new(upstream: RowIterator<'a>, group_by: &'a [SelectItem]) -> Self {
        Self {
            upstream: Some(upstream),
            group_by,
            groups: None,
        }
    }

    fn group(&self, rows: Vec<RowContext>) -> Vec<RowContext> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut members: Vec<Vec<RowContext>> = Vec::new();

        for row in rows {
            let values: Vec<Value> = self.group_by.iter().map(|item| row.resolve(item)).collect();
            let key = group_key(&values);
            match index.get(&key) {
                Some(&slot) => members[slot].push(row),
                None => {
                    index.insert(key, members.len());
                    members.push(vec![row]);
                }
            }
        }

        tracing::debug!("GROUP BY produced {} groups", members.len());

        members
            .into_iter()
            .filter_map(|rows| {
                let mut representative = rows.first()?.clone();
                representative.grouped_rows = rows;
                Some(representative)
            })
            .collect()
    }
}

impl Iterator for GroupByIterator<'_> {
    type Item = QueryResult<RowContext>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.groups.is_none() {
            let upstream = self.upstream.take()?;
            match drain(upstream) {
                Ok(rows) => self.groups = Some(self.group(rows).into_iter()),
                Err(err) => return Some(Err(err)),
            }
        }

        self.groups.as_mut()?.next().map(Ok)
    }
}
