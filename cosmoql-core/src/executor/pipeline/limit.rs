/// LIMIT / TOP: stops after `limit` items without pulling upstream again.
pub(crate) struct LimitIterator<I> {
    upstream: Option<I>,
    limit: usize,
    emitted: usize,
}

impl<I> LimitIterator<I> {
    pub(crate) fn new(upstream: I, limit: usize) -> Self {
        Self {
            upstream: Some(upstream),
            limit,
            emitted: 0,
        }
    }
}

impl<I: Iterator> Iterator for LimitIterator<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.emitted >= self.limit {
            self.upstream = None;
            return None;
        }

        let upstream = self.upstream.as_mut()?;
        match upstream.next() {
            Some(item) => {
                self.emitted += 1;
                Some(item)
            }
            None => {
                self.upstream = None;
                None
            }
        }
    }
}
