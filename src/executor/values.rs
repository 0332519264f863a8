use super::{ExecutorError, IterState, Lifecycle, TupleIter};

/// A leaf iterator over in-memory tuples.
pub struct VecTupleIter<T> {
    rows: Vec<T>,
    position: usize,
    lifecycle: Lifecycle,
}

impl<T> VecTupleIter<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows,
            position: 0,
            lifecycle: Lifecycle::default(),
        }
    }

    pub fn state(&self) -> IterState {
        self.lifecycle.state()
    }

    pub fn is_closed(&self) -> bool {
        self.state() == IterState::Closed
    }
}

impl<T: Clone> TupleIter for VecTupleIter<T> {
    type Tuple = T;

    fn pull(&mut self) -> Result<Option<T>, ExecutorError> {
        if self.lifecycle.begin_pull()? {
            self.position = 0;
        }
        match self.rows.get(self.position) {
            Some(row) => {
                self.position += 1;
                Ok(Some(row.clone()))
            }
            None => {
                self.lifecycle.end_of_stream();
                Ok(None)
            }
        }
    }

    fn restart(&mut self) -> Result<(), ExecutorError> {
        self.lifecycle.begin_restart()?;
        self.position = 0;
        Ok(())
    }

    fn close_allocation(&mut self) {
        if self.lifecycle.close() {
            self.rows = Vec::new();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::try_collect;

    #[test]
    fn test_values_restart() {
        let mut iter = VecTupleIter::new(vec!["a", "b"]);
        // restart before the first pull is a no-op
        iter.restart().unwrap();
        assert_eq!(iter.state(), IterState::Created);
        assert_eq!(try_collect(&mut iter), Ok(vec!["a", "b"]));
        assert_eq!(iter.state(), IterState::Exhausted);

        iter.restart().unwrap();
        assert_eq!(try_collect(&mut iter), Ok(vec!["a", "b"]));
    }

    #[test]
    fn test_values_empty() {
        let mut iter = VecTupleIter::<i32>::new(vec![]);
        assert_eq!(iter.pull(), Ok(None));
        assert_eq!(iter.pull(), Err(ExecutorError::PullAfterExhausted));
        iter.close_allocation();
        assert!(iter.is_closed());
    }
}
