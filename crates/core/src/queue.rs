use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Term queue with join semantics.
///
/// `pending` counts items that were pushed but whose processing has not
/// finished. It drops when a [`Claim`] is released, not when the item is
/// popped, so [`WorkQueue::wait_drained`] also waits for workers that are
/// still busy with the last items.
#[derive(Debug, Default)]
pub struct WorkQueue {
    state: Mutex<QueueState>,
    drained: Condvar,
}

#[derive(Debug, Default)]
struct QueueState {
    items: VecDeque<String>,
    pending: usize,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, term: impl Into<String>) {
        let mut state = self.lock();
        state.items.push_back(term.into());
        state.pending += 1;
    }

    pub fn extend<I, S>(&self, terms: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.lock();
        for term in terms {
            state.items.push_back(term.into());
            state.pending += 1;
        }
    }

    /// Takes the next term, or `None` once the queue is empty.
    pub fn pop(&self) -> Option<Claim<'_>> {
        let term = self.lock().items.pop_front()?;
        Some(Claim { queue: self, term })
    }

    /// Items pushed and not yet marked processed.
    pub fn pending(&self) -> usize {
        self.lock().pending
    }

    pub fn wait_drained(&self) {
        let state = self.lock();
        let _state = self
            .drained
            .wait_while(state, |state| state.pending > 0)
            .unwrap_or_else(PoisonError::into_inner);
    }

    fn complete(&self) {
        let mut state = self.lock();
        state.pending = state.pending.saturating_sub(1);
        if state.pending == 0 {
            self.drained.notify_all();
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A dequeued term. Dropping it marks the term processed, including
/// when the worker unwinds.
#[derive(Debug)]
pub struct Claim<'a> {
    queue: &'a WorkQueue,
    term: String,
}

impl Claim<'_> {
    pub fn term(&self) -> &str {
        &self.term
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.queue.complete();
    }
}
