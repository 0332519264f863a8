mod calc;
mod delegating;
mod limit;
mod uncollect;
mod values;

pub use calc::*;
pub use delegating::*;
pub use limit::*;
use log::trace;
use strum_macros::Display;
pub use uncollect::*;
pub use values::*;

/// The error type of execution. Every variant is a misuse of the iterator protocol.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("pull on an exhausted iterator without restart")]
    PullAfterExhausted,
    #[error("pull on a closed iterator")]
    PullAfterClose,
    #[error("restart on a closed iterator")]
    RestartAfterClose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum IterState {
    /// Not pulled yet, resources are acquired on the first pull.
    #[default]
    Created,
    Active,
    /// End of stream was returned, only restart or close are legal.
    Exhausted,
    /// Resources released. Terminal.
    Closed,
}

/// A pull-based, restartable, finite sequence of tuples.
pub trait TupleIter {
    type Tuple;

    /// Next tuple, or `None` at end of stream.
    fn pull(&mut self) -> Result<Option<Self::Tuple>, ExecutorError>;

    /// Reposition to the first tuple, restarting upstream iterators too.
    fn restart(&mut self) -> Result<(), ExecutorError>;

    /// Release owned resources, upstream ones included. Safe to call more than once.
    fn close_allocation(&mut self);
}

pub type BoxedTupleIter<T> = Box<dyn TupleIter<Tuple = T>>;

impl<I: TupleIter + ?Sized> TupleIter for Box<I> {
    type Tuple = I::Tuple;

    fn pull(&mut self) -> Result<Option<Self::Tuple>, ExecutorError> {
        (**self).pull()
    }

    fn restart(&mut self) -> Result<(), ExecutorError> {
        (**self).restart()
    }

    fn close_allocation(&mut self) {
        (**self).close_allocation()
    }
}

/// State machine shared by the iterator implementations.
#[derive(Debug, Clone, Default)]
pub struct Lifecycle {
    state: IterState,
}

impl Lifecycle {
    pub fn state(&self) -> IterState {
        self.state
    }

    /// Check a pull is legal. Returns true when this pull opens the iterator.
    pub fn begin_pull(&mut self) -> Result<bool, ExecutorError> {
        match self.state {
            IterState::Created => {
                self.state = IterState::Active;
                Ok(true)
            }
            IterState::Active => Ok(false),
            IterState::Exhausted => Err(ExecutorError::PullAfterExhausted),
            IterState::Closed => Err(ExecutorError::PullAfterClose),
        }
    }

    pub fn end_of_stream(&mut self) {
        if self.state == IterState::Active {
            self.state = IterState::Exhausted;
        }
    }

    /// Check a restart is legal. Returns false for an iterator never pulled, which has nothing
    /// to reposition.
    pub fn begin_restart(&mut self) -> Result<bool, ExecutorError> {
        match self.state {
            IterState::Created => Ok(false),
            IterState::Active | IterState::Exhausted => {
                self.state = IterState::Active;
                Ok(true)
            }
            IterState::Closed => Err(ExecutorError::RestartAfterClose),
        }
    }

    /// Returns true on the first call only.
    pub fn close(&mut self) -> bool {
        if self.state == IterState::Closed {
            return false;
        }
        trace!("Close iterator in state {}", self.state);
        self.state = IterState::Closed;
        true
    }
}

/// Pull all remaining tuples.
pub fn try_collect<I: TupleIter + ?Sized>(iter: &mut I) -> Result<Vec<I::Tuple>, ExecutorError> {
    let mut output = Vec::new();
    while let Some(tuple) = iter.pull()? {
        output.push(tuple);
    }
    Ok(output)
}
