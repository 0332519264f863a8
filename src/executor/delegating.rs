use derive_new::new;
use log::trace;

use super::{ExecutorError, IterState, Lifecycle, TupleIter};

/// The data-producing step of an iterator that wraps exactly one upstream iterator.
///
/// Restart and resource release are handled by [`DelegatingIter`]; a step only overrides the
/// hooks when it holds auxiliary state of its own.
pub trait CalcStep<I: TupleIter> {
    type Output;

    fn next(&mut self, input: &mut I) -> Result<Option<Self::Output>, ExecutorError>;

    /// Reset step-local state, called before the upstream is restarted.
    fn on_restart(&mut self) {}

    /// Release step-local resources, called once before the upstream is closed.
    fn on_close(&mut self) {}
}

#[derive(new)]
pub struct DelegatingIter<I, S> {
    input: I,
    step: S,
    #[new(default)]
    lifecycle: Lifecycle,
}

impl<I, S> DelegatingIter<I, S> {
    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn step(&self) -> &S {
        &self.step
    }

    pub fn state(&self) -> IterState {
        self.lifecycle.state()
    }
}

impl<I: TupleIter, S: CalcStep<I>> TupleIter for DelegatingIter<I, S> {
    type Tuple = S::Output;

    fn pull(&mut self) -> Result<Option<Self::Tuple>, ExecutorError> {
        self.lifecycle.begin_pull()?;
        let tuple = self.step.next(&mut self.input)?;
        if tuple.is_none() {
            self.lifecycle.end_of_stream();
        }
        Ok(tuple)
    }

    fn restart(&mut self) -> Result<(), ExecutorError> {
        if self.lifecycle.begin_restart()? {
            trace!("Restart delegating iterator");
        }
        self.step.on_restart();
        self.input.restart()
    }

    fn close_allocation(&mut self) {
        if self.lifecycle.close() {
            self.step.on_close();
        }
        self.input.close_allocation();
    }
}
