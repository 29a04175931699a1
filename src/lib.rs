#![doc(html_root_url = "https://docs.rs/pipelining/latest")]
//! Public API for the `pipelining` library.
//!
//! Pipelining protocols let a client send several requests on one connection
//! before the first response arrives, and expect the responses back in the
//! same order. Servers that process requests concurrently finish them in any
//! order. This crate restores submission order between the two: each request
//! is stamped with a [`SequenceId`] on the way in, and each response is
//! offered to a bounded [`ReorderBuffer`] on the way out, which hands it to the
//! transport once every earlier response has gone.
//!
//! [`PipelineSession`] bundles the pieces for one connection. When a
//! connection piles up more early responses than [`PipelineConfig`] allows,
//! the session aborts the connection through the host's [`Abort`] capability.

pub mod buffer;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pending;
pub mod policy;
pub mod sequence;
pub mod session;
pub mod transport;

pub use buffer::{OfferOutcome, ReorderBuffer};
pub use config::{DEFAULT_MAX_HELD, PipelineConfig, PipelineConfigBuilder};
pub use error::{PipelineConfigError, PipelineError};
pub use pending::{Completion, PendingUnit};
pub use policy::Abort;
pub use sequence::{InboundUnit, SequenceAssigner, SequenceId};
pub use session::PipelineSession;
pub use transport::{QueueCompletion, QueuedSession, WriteQueue, write_queue};
