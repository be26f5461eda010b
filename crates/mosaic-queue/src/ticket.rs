#![forbid(unsafe_code)]

//! Request handles returned by `submit`.

use std::sync::{
    Arc,
    atomic::{AtomicU8, AtomicU64, Ordering},
};

use futures::future::{BoxFuture, Shared};

use crate::error::QueueResult;

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Identifier of one submitted request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TicketId(u64);

impl TicketId {
    pub(crate) fn next() -> Self {
        Self(NEXT_TICKET.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ticket#{}", self.0)
    }
}

/// Lifecycle of one submitted request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestState {
    /// Waiting in the pending list.
    Pending,
    /// Dispatched, job running, outcome not settled.
    Active,
    /// Settled with the job's success value.
    Resolved,
    /// Settled with the job's error value.
    Rejected,
}

/// Shared lifecycle cell, written by the queue and read through tickets.
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(0))
    }

    pub(crate) fn set(&self, state: RequestState) {
        self.0.store(state as u8, Ordering::Release);
    }

    fn get(&self) -> RequestState {
        match self.0.load(Ordering::Acquire) {
            0 => RequestState::Pending,
            1 => RequestState::Active,
            2 => RequestState::Resolved,
            _ => RequestState::Rejected,
        }
    }
}

/// Handle to one submitted request.
///
/// Cloning is cheap and every clone observes the same single settlement:
/// the outcome future resolves exactly once, to either the job's success
/// value or its error.
pub struct Ticket<T, E> {
    pub(crate) id: TicketId,
    pub(crate) state: Arc<StateCell>,
    pub(crate) outcome: Shared<BoxFuture<'static, QueueResult<Result<T, E>>>>,
}

impl<T, E> Ticket<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Identifier to use with `Scheduler::promote`.
    #[must_use]
    pub fn id(&self) -> TicketId {
        self.id
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RequestState {
        self.state.get()
    }

    /// Whether the request has settled with the job's error value.
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        self.state() == RequestState::Rejected
    }

    /// Wait for the outcome.
    ///
    /// # Errors
    ///
    /// [`QueueError::Abandoned`](crate::QueueError::Abandoned) if the queue
    /// was torn down before this request was dispatched.
    pub async fn outcome(&self) -> QueueResult<Result<T, E>> {
        self.outcome.clone().await
    }
}

impl<T, E> Clone for Ticket<T, E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            state: Arc::clone(&self.state),
            outcome: self.outcome.clone(),
        }
    }
}

impl<T, E> std::fmt::Debug for Ticket<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ticket")
            .field("id", &self.id)
            .field("state", &self.state.get())
            .finish_non_exhaustive()
    }
}
