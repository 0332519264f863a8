use derive_new::new;

use super::{CalcStep, DelegatingIter, ExecutorError, TupleIter};

/// Keeps the upstream tuples the predicate accepts.
#[derive(new)]
pub struct FilterStep<F> {
    predicate: F,
}

impl<I, F> CalcStep<I> for FilterStep<F>
where
    I: TupleIter,
    F: FnMut(&I::Tuple) -> bool,
{
    type Output = I::Tuple;

    fn next(&mut self, input: &mut I) -> Result<Option<Self::Output>, ExecutorError> {
        while let Some(tuple) = input.pull()? {
            if (self.predicate)(&tuple) {
                return Ok(Some(tuple));
            }
        }
        Ok(None)
    }
}

/// Maps every upstream tuple through the projection.
#[derive(new)]
pub struct ProjectStep<F> {
    projection: F,
}

impl<I, F, U> CalcStep<I> for ProjectStep<F>
where
    I: TupleIter,
    F: FnMut(I::Tuple) -> U,
{
    type Output = U;

    fn next(&mut self, input: &mut I) -> Result<Option<U>, ExecutorError> {
        Ok(input.pull()?.map(&mut self.projection))
    }
}

pub fn filter<I, F>(input: I, predicate: F) -> DelegatingIter<I, FilterStep<F>>
where
    I: TupleIter,
    F: FnMut(&I::Tuple) -> bool,
{
    DelegatingIter::new(input, FilterStep::new(predicate))
}

pub fn project<I, F, U>(input: I, projection: F) -> DelegatingIter<I, ProjectStep<F>>
where
    I: TupleIter,
    F: FnMut(I::Tuple) -> U,
{
    DelegatingIter::new(input, ProjectStep::new(projection))
}
