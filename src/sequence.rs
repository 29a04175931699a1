//! Sequence identifiers and the per-connection assigner that issues them.
//!
//! Every request admitted on a connection is stamped with the next
//! [`SequenceId`]. The id travels with the request through processing and
//! comes back attached to its response, letting the
//! [`ReorderBuffer`](crate::ReorderBuffer) restore submission order.

use std::fmt;
#[cfg(not(loom))]
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(loom)]
use loom::sync::atomic::{AtomicU64, Ordering};

/// Position of a request in its connection's submission order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceId(u64);

impl SequenceId {
    /// The first id issued on every connection.
    pub const ZERO: SequenceId = SequenceId(0);

    /// Wrap a raw sequence number.
    #[must_use]
    pub const fn new(raw: u64) -> Self { Self(raw) }

    /// Return the raw sequence number.
    #[must_use]
    pub const fn get(self) -> u64 { self.0 }

    /// Return the id immediately after this one.
    #[must_use]
    pub(crate) const fn next(self) -> Self { Self(self.0 + 1) }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl From<u64> for SequenceId {
    fn from(raw: u64) -> Self { Self(raw) }
}

/// A request stamped with its submission position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundUnit<T> {
    sequence: SequenceId,
    request: T,
}

impl<T> InboundUnit<T> {
    /// Sequence id assigned at admission.
    #[must_use]
    pub fn sequence(&self) -> SequenceId { self.sequence }

    /// Borrow the admitted request.
    #[must_use]
    pub fn request(&self) -> &T { &self.request }

    /// Split the unit into its id and request.
    #[must_use]
    pub fn into_parts(self) -> (SequenceId, T) { (self.sequence, self.request) }
}

/// Issues monotonically increasing sequence ids for one connection.
///
/// Admission must happen on a single inbound path per connection; the counter
/// is atomic only so completion paths can read [`issued`](Self::issued)
/// concurrently.
#[derive(Debug)]
pub struct SequenceAssigner {
    next: AtomicU64,
}

impl Default for SequenceAssigner {
    fn default() -> Self { Self::new() }
}

impl SequenceAssigner {
    /// Create an assigner whose first id is [`SequenceId::ZERO`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(SequenceId::ZERO.get()),
        }
    }

    /// Stamp `request` with the next sequence id.
    #[must_use]
    pub fn admit<T>(&self, request: T) -> InboundUnit<T> {
        let raw = self.next.fetch_add(1, Ordering::AcqRel);
        InboundUnit {
            sequence: SequenceId(raw),
            request,
        }
    }

    /// Number of ids issued so far.
    ///
    /// Every id strictly below this value belongs to an admitted request.
    #[must_use]
    pub fn issued(&self) -> u64 { self.next.load(Ordering::Acquire) }

    /// Whether `sequence` was handed out by this assigner.
    #[must_use]
    pub fn was_issued(&self, sequence: SequenceId) -> bool { sequence.get() < self.issued() }
}
