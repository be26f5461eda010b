#![forbid(unsafe_code)]

//! Concurrency-bounded dispatch queue with newest-first ordering.
//!
//! [`LoadQueue`] serializes deferred work across a whole page: at most K
//! jobs run at once, and when a slot frees up the **most recently
//! submitted** pending job dispatches next — the request the user is
//! currently looking at is serviced before older, possibly stale ones.
//! A pending job can also be promoted to dispatch ahead of everything else
//! without changing the concurrency bound.
//!
//! The queue is generic over the job outcome, so it carries no media
//! vocabulary of its own. Submission hands back a [`Ticket`]: a cheap
//! handle exposing the request's lifecycle state and a shared,
//! settles-exactly-once outcome future.
//!
//! Failures are isolated per job: a rejected job marks its ticket
//! `Rejected` and the queue keeps draining.
//!
//! Jobs are spawned onto the ambient Tokio runtime; `submit` must be called
//! within one.

mod error;
mod queue;
mod ticket;
mod traits;

pub use error::{QueueError, QueueResult};
pub use queue::{DEFAULT_CONCURRENCY, LoadQueue};
pub use ticket::{RequestState, Ticket, TicketId};
pub use traits::{Job, Scheduler};
