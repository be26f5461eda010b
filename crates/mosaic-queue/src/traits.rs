#![forbid(unsafe_code)]

//! The scheduling capability seam.

use futures::future::BoxFuture;

use crate::ticket::{Ticket, TicketId};

/// A deferred dispatch thunk. Built at submission time, invoked only when
/// the queue grants the job a slot.
pub type Job<T, E> = Box<dyn FnOnce() -> BoxFuture<'static, Result<T, E>> + Send + 'static>;

/// Scheduling capability: submit deferred work, reorder pending work.
///
/// [`LoadQueue`](crate::LoadQueue) is the default implementation;
/// controllers receive the scheduler by construction-time injection, so an
/// embedder can swap in an alternate policy without touching controller
/// code.
pub trait Scheduler<T, E>: Send + Sync
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Append a job to the pending list and immediately attempt dispatch.
    fn submit(&self, job: Job<T, E>) -> Ticket<T, E>;

    /// Make a still-pending request the next to dispatch, regardless of
    /// list order and without changing the concurrency count.
    ///
    /// Returns `false` (a no-op) once the request has begun dispatch or is
    /// unknown.
    fn promote(&self, id: TicketId) -> bool;
}
