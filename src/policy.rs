//! Connection abort capability invoked when a session overflows.
//!
//! When a [`ReorderBuffer`](crate::ReorderBuffer) is full and another early
//! response arrives, the session refuses it and tears the connection down.
//! Held responses are never evicted to make room.
//!
//! The host supplies the teardown primitive as an [`Abort`] implementation.

use tokio_util::sync::CancellationToken;

/// Tears down the connection owning a session.
///
/// Called at most once per session and never while the session lock is held.
pub trait Abort: Send + Sync {
    /// Request that the connection be closed.
    fn abort(&self);
}

// Any closure with the right shape is an abort capability.
impl<F> Abort for F
where
    F: Fn() + Send + Sync,
{
    fn abort(&self) { self() }
}

/// Cancelling the connection's shutdown token closes it.
impl Abort for CancellationToken {
    fn abort(&self) { self.cancel(); }
}
