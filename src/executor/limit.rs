use super::{CalcStep, DelegatingIter, ExecutorError, TupleIter};

/// Skips `offset` upstream tuples and then returns at most `limit` of them.
#[derive(Debug, Clone)]
pub struct LimitStep {
    limit: Option<usize>,
    offset: usize,
    /// Upstream tuples consumed since the last restart.
    position: usize,
}

impl LimitStep {
    pub fn new(limit: Option<usize>, offset: Option<usize>) -> Self {
        Self {
            limit,
            offset: offset.unwrap_or(0),
            position: 0,
        }
    }

    fn end(&self) -> Option<usize> {
        self.limit.map(|limit| self.offset.saturating_add(limit))
    }
}

impl<I: TupleIter> CalcStep<I> for LimitStep {
    type Output = I::Tuple;

    fn next(&mut self, input: &mut I) -> Result<Option<Self::Output>, ExecutorError> {
        loop {
            // upstream is not pulled past the limit
            if matches!(self.end(), Some(end) if self.position >= end) {
                return Ok(None);
            }
            let tuple = match input.pull()? {
                Some(tuple) => tuple,
                None => return Ok(None),
            };
            self.position += 1;
            if self.position > self.offset {
                return Ok(Some(tuple));
            }
        }
    }

    fn on_restart(&mut self) {
        self.position = 0;
    }
}

pub fn limit<I: TupleIter>(
    input: I,
    limit: Option<usize>,
    offset: Option<usize>,
) -> DelegatingIter<I, LimitStep> {
    DelegatingIter::new(input, LimitStep::new(limit, offset))
}
