use std::cmp::Ordering;
use std::vec;

use serde_json::Value;

use crate::ast::{OrderDirection, OrderExpression};
use crate::error::QueryResult;
use crate::executor::helpers::{compare_values, stable_sort_by};
use crate::executor::row::RowContext;
use crate::executor::RowIterator;

use super::drain;

/// ORDER BY: materializes the input on first pull and streams it sorted.
/// Ties keep input order.
pub(crate) struct OrderIterator<'a> {
    upstream: Option<RowIterator<'a>>,
    order: &'a [OrderExpression],
    sorted: Option<vec::IntoIter<RowContext>>,
}

impl<'a> OrderIterator<'a> {
    pub(crate) fn new(upstream: RowIterator<'a>, order: &'a [OrderExpression]) -> Self {
        Self {
            upstream: Some(upstream),
            order,
            sorted: None,
        }
    }

    fn sort(&self, rows: Vec<RowContext>) -> Vec<RowContext> {
        let keyed: Vec<(Vec<Value>, RowContext)> = rows
            .into_iter()
            .map(|row| {
                let keys = self
                    .order
                    .iter()
                    .map(|expression| row.resolve(&expression.select_item))
                    .collect();
                (keys, row)
            })
            .collect();

        let sorted = stable_sort_by(keyed, |(a, _), (b, _)| {
            for ((left, right), expression) in a.iter().zip(b).zip(self.order) {
                let ordering = match expression.direction {
                    OrderDirection::Asc => compare_values(left, right),
                    OrderDirection::Desc => compare_values(right, left),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });

        sorted.into_iter().map(|(_, row)| row).collect()
    }
}

impl Iterator for OrderIterator<'_> {
    type Item = QueryResult<RowContext>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.sorted.is_none() {
            let upstream = self.upstream.take()?;
            match drain(upstream) {
                Ok(rows) => self.sorted = Some(self.sort(rows).into_iter()),
                Err(err) => return Some(Err(err)),
            }
        }

        self.sorted.as_mut()?.next().map(Ok)
    }
}
