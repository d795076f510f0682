/// OFFSET: discards the first `offset` upstream items on the first pull,
/// whatever they are, then passes everything through.
pub(crate) struct OffsetIterator<I> {
    upstream: Option<I>,
    to_skip: usize,
}

impl<I> OffsetIterator<I> {
    pub(crate) fn new(upstream: I, offset: usize) -> Self {
        Self {
            upstream: Some(upstream),
            to_skip: offset,
        }
    }
}

impl<I: Iterator> Iterator for OffsetIterator<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let upstream = self.upstream.as_mut()?;

        while self.to_skip > 0 {
            self.to_skip -= 1;
            if upstream.next().is_none() {
                self.upstream = None;
                return None;
            }
        }

        match upstream.next() {
            Some(item) => Some(item),
            None => {
                self.upstream = None;
                None
            }
        }
    }
}
