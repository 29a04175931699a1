//! Completed responses waiting for their turn on the wire.
//!
//! A [`PendingUnit`] pairs a response with the sequence id of the request it
//! answers and a [`Completion`] that knows how to hand the response to the
//! transport. Units order by sequence id alone.

use std::cmp::Ordering;

use crate::sequence::SequenceId;

/// Hands a released response to the transport.
///
/// Completions run while the session lock is held, so implementations must
/// not block; pushing onto a write queue is the expected shape.
pub trait Completion<R>: Send {
    /// Deliver `response` downstream.
    fn complete(self, response: R);
}

impl<R, F> Completion<R> for F
where
    F: FnOnce(R) + Send,
{
    fn complete(self, response: R) { self(response) }
}

/// A finished response tagged with its request's sequence id.
pub struct PendingUnit<R, C> {
    sequence: SequenceId,
    response: R,
    completion: C,
}

impl<R, C> PendingUnit<R, C>
where
    C: Completion<R>,
{
    /// Pair `response` with the request identified by `sequence`.
    #[must_use]
    pub fn new(sequence: SequenceId, response: R, completion: C) -> Self {
        Self {
            sequence,
            response,
            completion,
        }
    }

    /// Sequence id of the request this unit answers.
    #[must_use]
    pub fn sequence(&self) -> SequenceId { self.sequence }

    /// Borrow the response payload.
    #[must_use]
    pub fn response(&self) -> &R { &self.response }

    /// Consume the unit, delivering its response through its completion.
    pub(crate) fn deliver(self) { self.completion.complete(self.response); }
}

impl<R, C> std::fmt::Debug for PendingUnit<R, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingUnit")
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

impl<R, C> PartialEq for PendingUnit<R, C> {
    fn eq(&self, other: &Self) -> bool { self.sequence == other.sequence }
}

impl<R, C> Eq for PendingUnit<R, C> {}

impl<R, C> PartialOrd for PendingUnit<R, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl<R, C> Ord for PendingUnit<R, C> {
    fn cmp(&self, other: &Self) -> Ordering { self.sequence.cmp(&other.sequence) }
}
