//! Tokio adapters connecting a session to a connection's writer task.
//!
//! Released responses are pushed onto an unbounded [`mpsc`] channel drained
//! by the task that owns the socket. The send never blocks, which keeps the
//! session lock short. Memory is still bounded by the session's holding
//! limit plus whatever the writer has not yet flushed.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{pending::Completion, session::PipelineSession};

/// Session whose responses go to a [`WriteQueue`] and whose overflow cancels
/// the connection's shutdown token.
pub type QueuedSession<R> = PipelineSession<R, QueueCompletion<R>, CancellationToken>;

/// Create a write queue and the receiver the writer task drains.
///
/// # Examples
///
/// ```
/// use pipelining::{PipelineConfig, QueuedSession, write_queue};
/// use tokio_util::sync::CancellationToken;
///
/// let (queue, mut rx) = write_queue::<&'static str>();
/// let session: QueuedSession<_> =
///     QueuedSession::new(PipelineConfig::default(), CancellationToken::new());
///
/// let unit = session.admit("PING");
/// session.complete(unit.sequence(), "PONG", queue.completion())?;
/// assert_eq!(rx.try_recv().ok(), Some("PONG"));
/// # Ok::<(), pipelining::PipelineError>(())
/// ```
#[must_use]
pub fn write_queue<R>() -> (WriteQueue<R>, mpsc::UnboundedReceiver<R>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (WriteQueue { tx }, rx)
}

/// Producer side of a connection's outbound response queue.
#[derive(Debug)]
pub struct WriteQueue<R> {
    tx: mpsc::UnboundedSender<R>,
}

impl<R> Clone for WriteQueue<R> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<R: Send> WriteQueue<R> {
    /// Completion handle for one response.
    #[must_use]
    pub fn completion(&self) -> QueueCompletion<R> {
        QueueCompletion {
            tx: self.tx.clone(),
        }
    }

    /// Whether the writer has dropped its receiver.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.tx.is_closed() }
}

/// Delivers a released response onto a [`WriteQueue`].
#[derive(Debug)]
pub struct QueueCompletion<R> {
    tx: mpsc::UnboundedSender<R>,
}

impl<R: Send> Completion<R> for QueueCompletion<R> {
    fn complete(self, response: R) {
        // The writer is gone once the connection closes; late responses have
        // nowhere to go.
        if self.tx.send(response).is_err() {
            debug!("write queue closed; dropping released response");
        }
    }
}
