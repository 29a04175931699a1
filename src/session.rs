//! Per-connection pipelining session.
//!
//! [`PipelineSession`] owns everything one connection needs to keep its
//! responses in order: the [`SequenceAssigner`] stamping inbound requests, the
//! [`ReorderBuffer`] holding early responses, and the [`Abort`] capability used
//! when that buffer overflows.
//!
//! Admission runs on the connection's inbound path. Completions may arrive
//! from any number of worker threads; each offer runs its check, insert and
//! drain as one critical section under the session lock, so completions are
//! delivered while the lock is held. The abort capability is invoked after
//! the lock is released.

#[cfg(not(loom))]
use std::sync::{Mutex, MutexGuard};
use std::sync::PoisonError;

use log::info;
#[cfg(loom)]
use loom::sync::{Mutex, MutexGuard};
use tracing::{error, warn};

use crate::{
    buffer::{OfferOutcome, ReorderBuffer},
    config::PipelineConfig,
    error::PipelineError,
    pending::{Completion, PendingUnit},
    policy::Abort,
    sequence::{InboundUnit, SequenceAssigner, SequenceId},
};

/// Ordering state for one pipelined connection.
///
/// Sessions are not shared between connections. Wrap one in an
/// [`Arc`](std::sync::Arc) to hand it to the tasks completing requests.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
///
/// use pipelining::{OfferOutcome, PipelineConfig, PipelineSession};
///
/// let written = Arc::new(Mutex::new(Vec::new()));
/// let config = PipelineConfig::builder().max_held(8).build()?;
/// let session = PipelineSession::new(config, || eprintln!("connection aborted"));
///
/// let first = session.admit("GET /a");
/// let second = session.admit("GET /b");
///
/// let sink = Arc::clone(&written);
/// let deliver = move |resp: &'static str| sink.lock().expect("poisoned").push(resp);
/// let outcome = session.complete(second.sequence(), "b", deliver.clone())?;
/// assert_eq!(outcome, OfferOutcome::Accepted { drained: 0 });
/// session.complete(first.sequence(), "a", deliver)?;
///
/// assert_eq!(*written.lock().expect("poisoned"), vec!["a", "b"]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct PipelineSession<R, C, A> {
    config: PipelineConfig,
    assigner: SequenceAssigner,
    buffer: Mutex<ReorderBuffer<R, C>>,
    abort: A,
}

impl<R, C, A> PipelineSession<R, C, A>
where
    C: Completion<R>,
    A: Abort,
{
    /// Create a session for a freshly opened connection.
    #[must_use]
    pub fn new(config: PipelineConfig, abort: A) -> Self {
        Self {
            config,
            assigner: SequenceAssigner::new(),
            buffer: Mutex::new(ReorderBuffer::with_config(&config)),
            abort,
        }
    }

    /// Stamp an inbound request with its sequence id.
    ///
    /// Must be called from a single inbound path, in the order the client
    /// submitted the requests.
    #[must_use]
    pub fn admit<T>(&self, request: T) -> InboundUnit<T> { self.assigner.admit(request) }

    /// Offer a completed response for delivery.
    ///
    /// Returns [`OfferOutcome::Overflow`] exactly once per session: the offer
    /// that found the buffer full. That offer discards every held response
    /// and aborts the connection; later offers return
    /// [`OfferOutcome::Discarded`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NotAdmitted`] if `unit` answers a request this
    /// session never admitted, and propagates the buffer's
    /// [`PipelineError::AlreadyDelivered`] and
    /// [`PipelineError::DuplicateSequence`]. The response is not delivered.
    pub fn offer(&self, unit: PendingUnit<R, C>) -> Result<OfferOutcome, PipelineError> {
        let sequence = unit.sequence();
        if !self.assigner.was_issued(sequence) {
            let err = PipelineError::NotAdmitted {
                sequence,
                issued: self.assigner.issued(),
            };
            Self::report_violation(&err);
            return Err(err);
        }

        let mut buffer = self.lock();
        let outcome = match buffer.offer(unit) {
            Ok(outcome) => outcome,
            Err(err) => {
                drop(buffer);
                Self::report_violation(&err);
                return Err(err);
            }
        };
        if outcome != OfferOutcome::Overflow {
            return Ok(outcome);
        }

        let next_required = buffer.next_required();
        let discarded = buffer.abandon();
        drop(buffer);

        warn!(
            sequence = sequence.get(),
            next_required = next_required.get(),
            max_held = self.config.max_held().get(),
            discarded,
            "pipelined response buffer full; aborting connection"
        );
        crate::metrics::inc_overflow_aborts();
        self.abort.abort();
        info!("pipeline session aborted: next_required={next_required}, discarded={discarded}");
        Ok(OfferOutcome::Overflow)
    }

    /// Build a [`PendingUnit`] and [`offer`](Self::offer) it.
    ///
    /// # Errors
    ///
    /// See [`offer`](Self::offer).
    pub fn complete(
        &self,
        sequence: SequenceId,
        response: R,
        completion: C,
    ) -> Result<OfferOutcome, PipelineError> {
        self.offer(PendingUnit::new(sequence, response, completion))
    }

    /// Drop held responses after the host closed the connection itself.
    ///
    /// The abort capability is not invoked. Returns the number of responses
    /// discarded; later offers return [`OfferOutcome::Discarded`].
    pub fn close(&self) -> usize {
        let discarded = self.lock().abandon();
        if discarded > 0 {
            info!("pipeline session closed with {discarded} undelivered responses");
        }
        discarded
    }

    fn report_violation(err: &PipelineError) {
        let kind = match err {
            PipelineError::NotAdmitted { .. } => "not_admitted",
            PipelineError::AlreadyDelivered { .. } => "already_delivered",
            PipelineError::DuplicateSequence(_) => "duplicate",
        };
        error!(error = %err, kind, "pipelined completion broke sequencing contract");
        crate::metrics::inc_contract_violations(kind);
    }
}

impl<R, C, A> PipelineSession<R, C, A> {
    fn lock(&self) -> MutexGuard<'_, ReorderBuffer<R, C>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configuration the session was created with.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig { &self.config }

    /// Number of requests admitted so far.
    #[must_use]
    pub fn admitted(&self) -> u64 { self.assigner.issued() }

    /// Number of early responses currently held.
    #[must_use]
    pub fn held(&self) -> usize { self.lock().held() }

    /// Sequence id of the next response to be delivered.
    #[must_use]
    pub fn next_required(&self) -> SequenceId { self.lock().next_required() }

    /// Whether the session overflowed or was closed.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.lock().is_abandoned() }
}

impl<R, C, A> std::fmt::Debug for PipelineSession<R, C, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineSession")
            .field("config", &self.config)
            .field("admitted", &self.assigner.issued())
            .finish_non_exhaustive()
    }
}
