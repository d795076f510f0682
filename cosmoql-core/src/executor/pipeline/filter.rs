use crate::ast::Expression;
use crate::error::QueryResult;
use crate::executor::row::RowContext;
use crate::executor::RowIterator;

/// WHERE: passes rows whose filter evaluates to `true`.
pub(crate) struct FilterIterator<'a> {
    upstream: Option<RowIterator<'a>>,
    filter: &'a Expression,
}

impl<'a> FilterIterator<'a> {
    pub(crate) fn new(upstream: RowIterator<'a>, filter: &'a Expression) -> Self {
        Self {
            upstream: Some(upstream),
            filter,
        }
    }
}

impl Iterator for FilterIterator<'_> {
    type Item = QueryResult<RowContext>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let upstream = self.upstream.as_mut()?;
            match upstream.next() {
                Some(Ok(row)) => {
                    if row.evaluate(self.filter) {
                        return Some(Ok(row));
                    }
                }
                Some(Err(err)) => return Some(Err(err)),
                None => {
                    self.upstream = None;
                    return None;
                }
            }
        }
    }
}
