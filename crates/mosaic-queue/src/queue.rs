#![forbid(unsafe_code)]

//! The shared dispatch queue.

use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::trace;

use crate::{
    error::QueueError,
    ticket::{RequestState, StateCell, Ticket, TicketId},
    traits::{Job, Scheduler},
};

/// Default concurrency limit K.
pub const DEFAULT_CONCURRENCY: usize = 3;

struct Entry<T, E> {
    id: TicketId,
    job: Job<T, E>,
    tx: oneshot::Sender<Result<T, E>>,
    state: Arc<StateCell>,
}

struct State<T, E> {
    /// Submission order; dispatch pops from the end (newest first).
    pending: Vec<Entry<T, E>>,
    /// Promoted ids, most recent last; dispatched from the back before any
    /// unpromoted entry. Stale ids (already dispatched) are skipped.
    promoted: Vec<TicketId>,
    active: usize,
}

struct Inner<T, E> {
    limit: usize,
    state: Mutex<State<T, E>>,
}

/// Page-wide dispatch queue: at most `limit` jobs run concurrently, pending
/// jobs dispatch newest-first, and a pending job can be promoted ahead of
/// the rest.
///
/// One instance is shared by every controller on the page. Cloning shares
/// the queue.
pub struct LoadQueue<T, E> {
    inner: Arc<Inner<T, E>>,
}

impl<T, E> LoadQueue<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Create a queue with the given concurrency limit (clamped to >= 1).
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                limit: limit.max(1),
                state: Mutex::new(State {
                    pending: Vec::new(),
                    promoted: Vec::new(),
                    active: 0,
                }),
            }),
        }
    }

    /// See [`Scheduler::submit`].
    pub fn submit(&self, job: Job<T, E>) -> Ticket<T, E> {
        <Self as Scheduler<T, E>>::submit(self, job)
    }

    /// See [`Scheduler::promote`].
    pub fn promote(&self, id: TicketId) -> bool {
        <Self as Scheduler<T, E>>::promote(self, id)
    }

    /// Number of entries waiting for a slot.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// Number of dispatched, unsettled jobs.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.inner.state.lock().active
    }

    /// Dispatch pending entries while capacity remains.
    ///
    /// Written as a worklist loop: completions re-enter through
    /// [`Self::complete`] without recursing into an open lock scope, so an
    /// immediately-ready job cannot corrupt the active count.
    fn pump(&self) {
        loop {
            let entry = {
                let mut st = self.inner.state.lock();
                if st.active >= self.inner.limit {
                    return;
                }
                let Some(entry) = take_next(&mut st) else {
                    return;
                };
                st.active += 1;
                entry
            };

            entry.state.set(RequestState::Active);
            trace!(id = %entry.id, "request dispatched");

            let queue = self.clone();
            let Entry { id, job, tx, state } = entry;
            tokio::spawn(async move {
                let result = job().await;
                state.set(if result.is_ok() {
                    RequestState::Resolved
                } else {
                    RequestState::Rejected
                });
                trace!(%id, ok = result.is_ok(), "request settled");
                let _ = tx.send(result);
                queue.complete();
            });
        }
    }

    /// Runs for success and failure alike; a failed job must never stall
    /// the queue.
    fn complete(&self) {
        self.inner.state.lock().active -= 1;
        self.pump();
    }
}

fn take_next<T, E>(st: &mut State<T, E>) -> Option<Entry<T, E>> {
    while let Some(id) = st.promoted.pop() {
        if let Some(pos) = st.pending.iter().position(|e| e.id == id) {
            return Some(st.pending.remove(pos));
        }
    }
    st.pending.pop()
}

impl<T, E> Scheduler<T, E> for LoadQueue<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn submit(&self, job: Job<T, E>) -> Ticket<T, E> {
        let id = TicketId::next();
        let state = Arc::new(StateCell::new());
        let (tx, rx) = oneshot::channel();
        let outcome = async move { rx.await.map_err(|_| QueueError::Abandoned) }
            .boxed()
            .shared();

        self.inner.state.lock().pending.push(Entry {
            id,
            job,
            tx,
            state: Arc::clone(&state),
        });
        trace!(%id, "request submitted");

        self.pump();
        Ticket { id, state, outcome }
    }

    fn promote(&self, id: TicketId) -> bool {
        let mut st = self.inner.state.lock();
        if st.pending.iter().any(|e| e.id == id) {
            st.promoted.retain(|p| *p != id);
            st.promoted.push(id);
            trace!(%id, "request promoted");
            true
        } else {
            false
        }
    }
}

impl<T, E> Clone for LoadQueue<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> Default for LoadQueue<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

impl<T, E> std::fmt::Debug for LoadQueue<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.inner.state.lock();
        f.debug_struct("LoadQueue")
            .field("limit", &self.inner.limit)
            .field("active", &st.active)
            .field("pending", &st.pending.len())
            .finish()
    }
}
