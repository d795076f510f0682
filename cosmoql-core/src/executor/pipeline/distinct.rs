use serde_json::Value;

use crate::error::QueryResult;
use crate::executor::helpers::values_equal;

/// DISTINCT: drops values equal to one already emitted.
///
/// Linear scan over everything seen so far.
pub(crate) struct DistinctIterator<I> {
    upstream: Option<I>,
    seen: Vec<Value>,
}

impl<I> DistinctIterator<I> {
    pub(crate) fn new(upstream: I) -> Self {
        Self {
            upstream: Some(upstream),
            seen: Vec::new(),
        }
    }
}

impl<I> Iterator for DistinctIterator<I>
where
    I: Iterator<Item = QueryResult<Value>>,
{
    type Item = QueryResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let upstream = self.upstream.as_mut()?;
            match upstream.next() {
                Some(Ok(value)) => {
                    if !self.seen.iter().any(|seen| values_equal(seen, &value)) {
                        self.seen.push(value.clone());
                        return Some(Ok(value));
                    }
                }
                Some(Err(err)) => return Some(Err(err)),
                None => {
                    self.upstream = None;
                    self.seen = Vec::new();
                    return None;
                }
            }
        }
    }
}
