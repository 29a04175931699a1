//! Error types for pipeline configuration and completion offers.
//!
//! Overflow is deliberately absent: it is an expected outcome handled by
//! aborting the connection, reported through
//! [`OfferOutcome`](crate::buffer::OfferOutcome). The errors here flag callers
//! that broke the completion contract.

use thiserror::Error;

use crate::sequence::SequenceId;

/// Errors returned when building a [`PipelineConfig`](crate::PipelineConfig).
#[non_exhaustive]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PipelineConfigError {
    /// The holding bound was zero.
    #[error("invalid max_held {0}; must be >= 1")]
    InvalidMaxHeld(usize),
}

/// Completion contract violations.
///
/// Each variant means the processing layer completed a request it does not
/// own. The offered response is never delivered.
#[non_exhaustive]
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PipelineError {
    /// The sequence id was never handed out by the session's assigner.
    #[error("sequence {sequence} was never admitted; {issued} ids issued")]
    NotAdmitted {
        /// The offending sequence id.
        sequence: SequenceId,
        /// Number of ids issued at the time of the offer.
        issued: u64,
    },
    /// A response for this sequence id has already been released.
    #[error("sequence {sequence} already delivered; next required is {next_required}")]
    AlreadyDelivered {
        /// The offending sequence id.
        sequence: SequenceId,
        /// The buffer's head-of-line sequence id.
        next_required: SequenceId,
    },
    /// A response for this sequence id is already being held.
    #[error("sequence {0} is already held")]
    DuplicateSequence(SequenceId),
}
