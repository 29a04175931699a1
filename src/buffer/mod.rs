//! Bounded holding area releasing responses in submission order.
//!
//! [`ReorderBuffer`] is the single-threaded state machine at the heart of the
//! crate. Responses are offered in whatever order processing finishes them;
//! the buffer releases the run of consecutive responses starting at the
//! head-of-line sequence id and holds the rest until the gap closes.
//!
//! The buffer never grows past its configured bound. An offer that would need
//! to hold one response too many is refused with [`OfferOutcome::Overflow`]
//! and the buffer is left untouched; the caller is expected to abort the
//! connection. [`PipelineSession`](crate::PipelineSession) wires that policy
//! up together with the locking required for concurrent completions.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashSet, binary_heap::PeekMut},
    fmt,
    num::NonZeroUsize,
};

use tracing::debug;

use crate::{
    config::PipelineConfig,
    error::PipelineError,
    pending::{Completion, PendingUnit},
    sequence::SequenceId,
};

/// Result of offering a response to a [`ReorderBuffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OfferOutcome {
    /// The response was taken. `drained` counts responses released by this
    /// offer, including the offered one if it was at the head of the line.
    Accepted {
        /// Number of responses delivered during the offer.
        drained: usize,
    },
    /// The buffer was full and the response could not be released; it was
    /// dropped without touching the held responses.
    Overflow,
    /// The buffer had already been abandoned; the response was dropped.
    Discarded,
}

impl OfferOutcome {
    /// Number of responses delivered by the offer.
    #[must_use]
    pub fn drained(self) -> usize {
        match self {
            Self::Accepted { drained } => drained,
            Self::Overflow | Self::Discarded => 0,
        }
    }
}

/// Min-ordered store of early responses for one connection.
///
/// # Examples
///
/// ```
/// use std::{num::NonZeroUsize, sync::mpsc};
///
/// use pipelining::{OfferOutcome, PendingUnit, ReorderBuffer, SequenceId};
///
/// let (tx, rx) = mpsc::channel();
/// let unit = |raw: u64| {
///     let tx = tx.clone();
///     PendingUnit::new(SequenceId::new(raw), raw, move |resp| {
///         let _ = tx.send(resp);
///     })
/// };
/// let mut buffer = ReorderBuffer::new(NonZeroUsize::new(4).expect("non-zero bound"));
///
/// assert_eq!(buffer.offer(unit(1))?, OfferOutcome::Accepted { drained: 0 });
/// assert_eq!(buffer.offer(unit(0))?, OfferOutcome::Accepted { drained: 2 });
/// assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![0, 1]);
/// # Ok::<(), pipelining::PipelineError>(())
/// ```
pub struct ReorderBuffer<R, C> {
    held: BinaryHeap<Reverse<PendingUnit<R, C>>>,
    held_ids: HashSet<SequenceId>,
    next_required: SequenceId,
    max_held: NonZeroUsize,
    abandoned: bool,
}

impl<R, C> ReorderBuffer<R, C>
where
    C: Completion<R>,
{
    /// Create an empty buffer holding at most `max_held` early responses.
    #[must_use]
    pub fn new(max_held: NonZeroUsize) -> Self {
        Self {
            held: BinaryHeap::new(),
            held_ids: HashSet::new(),
            next_required: SequenceId::ZERO,
            max_held,
            abandoned: false,
        }
    }

    /// Create a buffer bounded by `config`.
    #[must_use]
    pub fn with_config(config: &PipelineConfig) -> Self { Self::new(config.max_held()) }

    /// Offer a completed response.
    ///
    /// Releases every response that is now in order. A response matching the
    /// head of the line is always accepted, even when the buffer is full,
    /// because it leaves the buffer in the same call.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::AlreadyDelivered`] if `unit` answers a request
    /// whose response was already released and
    /// [`PipelineError::DuplicateSequence`] if a response for the same request
    /// is already held. The buffer is unchanged and `unit` is dropped.
    pub fn offer(&mut self, unit: PendingUnit<R, C>) -> Result<OfferOutcome, PipelineError> {
        if self.abandoned {
            return Ok(OfferOutcome::Discarded);
        }
        let sequence = unit.sequence();
        if sequence < self.next_required {
            return Err(PipelineError::AlreadyDelivered {
                sequence,
                next_required: self.next_required,
            });
        }
        if self.held_ids.contains(&sequence) {
            return Err(PipelineError::DuplicateSequence(sequence));
        }
        if sequence != self.next_required && self.is_full() {
            return Ok(OfferOutcome::Overflow);
        }

        self.held_ids.insert(sequence);
        self.held.push(Reverse(unit));
        let drained = self.drain();
        Ok(OfferOutcome::Accepted { drained })
    }

    /// Release the contiguous run starting at the head of the line.
    fn drain(&mut self) -> usize {
        let mut drained = 0;
        while let Some(head) = self.held.peek_mut() {
            if head.0.sequence() != self.next_required {
                break;
            }
            let Reverse(unit) = PeekMut::pop(head);
            self.held_ids.remove(&unit.sequence());
            // A panicking completion must not leave the head of the line on a
            // released id.
            self.next_required = self.next_required.next();
            drained += 1;
            crate::metrics::inc_released(1);
            unit.deliver();
        }
        if drained > 0 {
            debug!(
                drained,
                next_required = self.next_required.get(),
                held = self.held.len(),
                "released pipelined responses"
            );
        }
        drained
    }

    /// Drop every held response and refuse all future offers.
    ///
    /// Returns the number of responses discarded.
    pub fn abandon(&mut self) -> usize {
        let discarded = self.held.len();
        self.held.clear();
        self.held_ids.clear();
        self.abandoned = true;
        discarded
    }
}

impl<R, C> ReorderBuffer<R, C> {
    /// Number of responses currently held.
    #[must_use]
    pub fn held(&self) -> usize { self.held.len() }

    /// Sequence id of the next response to release.
    #[must_use]
    pub fn next_required(&self) -> SequenceId { self.next_required }

    /// Configured holding bound.
    #[must_use]
    pub fn max_held(&self) -> NonZeroUsize { self.max_held }

    /// Whether the holding bound has been reached.
    #[must_use]
    pub fn is_full(&self) -> bool { self.held.len() >= self.max_held.get() }

    /// Whether [`abandon`](Self::abandon) has been called.
    #[must_use]
    pub fn is_abandoned(&self) -> bool { self.abandoned }
}

impl<R, C> fmt::Debug for ReorderBuffer<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReorderBuffer")
            .field("held", &self.held.len())
            .field("next_required", &self.next_required)
            .field("max_held", &self.max_held)
            .field("abandoned", &self.abandoned)
            .finish()
    }
}
