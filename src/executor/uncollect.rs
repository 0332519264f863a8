use super::{CalcStep, DelegatingIter, ExecutorError, TupleIter};

/// Unnests collection-valued upstream tuples, producing one tuple per element.
///
/// At most one upstream collection is buffered at a time.
pub struct UncollectStep<C: IntoIterator> {
    pending: Option<C::IntoIter>,
}

impl<C: IntoIterator> Default for UncollectStep<C> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<I, C> CalcStep<I> for UncollectStep<C>
where
    I: TupleIter<Tuple = C>,
    C: IntoIterator,
{
    type Output = C::Item;

    fn next(&mut self, input: &mut I) -> Result<Option<C::Item>, ExecutorError> {
        loop {
            if let Some(item) = self.pending.as_mut().and_then(Iterator::next) {
                return Ok(Some(item));
            }
            match input.pull()? {
                Some(collection) => self.pending = Some(collection.into_iter()),
                None => {
                    self.pending = None;
                    return Ok(None);
                }
            }
        }
    }

    fn on_restart(&mut self) {
        self.pending = None;
    }

    fn on_close(&mut self) {
        self.pending = None;
    }
}

pub fn uncollect<I, C>(input: I) -> DelegatingIter<I, UncollectStep<C>>
where
    I: TupleIter<Tuple = C>,
    C: IntoIterator,
{
    DelegatingIter::new(input, UncollectStep::default())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::executor::{try_collect, VecTupleIter};

    #[test]
    fn test_uncollect_skips_empty_collections() {
        let source = VecTupleIter::new(vec![vec![1, 2], vec![], vec![3]]);
        let mut iter = uncollect(source);
        assert_eq!(try_collect(&mut iter), Ok(vec![1, 2, 3]));
        assert_eq!(iter.pull(), Err(ExecutorError::PullAfterExhausted));
    }

    #[test]
    fn test_uncollect_restart_drops_pending() {
        let mut iter = uncollect(VecTupleIter::new(vec![vec!["x", "y"], vec!["z"]]));
        assert_eq!(iter.pull(), Ok(Some("x")));
        iter.restart().unwrap();
        assert_eq!(try_collect(&mut iter), Ok(vec!["x", "y", "z"]));
    }
}
