//! Session configuration.
//!
//! A pipeline has a single knob: how many early responses a connection may
//! hold while waiting for a slow head-of-line request. The bound is fixed
//! when the session is created.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::PipelineConfigError;

/// Default holding bound, matching the usual HTTP pipelining event limit.
pub const DEFAULT_MAX_HELD: usize = 10_000;

/// Configuration for a [`PipelineSession`](crate::PipelineSession).
///
/// Deserializes from host configuration files; a missing `max_held` falls
/// back to [`DEFAULT_MAX_HELD`] and zero is rejected by serde's
/// [`NonZeroUsize`] impl.
///
/// ```
/// use pipelining::PipelineConfig;
///
/// let config = PipelineConfig::builder().max_held(64).build()?;
/// assert_eq!(config.max_held().get(), 64);
/// # Ok::<(), pipelining::PipelineConfigError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    #[serde(default = "default_max_held")]
    max_held: NonZeroUsize,
}

fn default_max_held() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_MAX_HELD).unwrap_or(NonZeroUsize::MIN)
}

impl PipelineConfig {
    /// Create a configuration with the given holding bound.
    #[must_use]
    pub const fn new(max_held: NonZeroUsize) -> Self { Self { max_held } }

    /// Start building a configuration.
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder { PipelineConfigBuilder::default() }

    /// Maximum number of early responses held per connection.
    #[must_use]
    pub const fn max_held(&self) -> NonZeroUsize { self.max_held }
}

impl Default for PipelineConfig {
    fn default() -> Self { Self::new(default_max_held()) }
}

/// Builder for [`PipelineConfig`].
///
/// Accepts a plain `usize` so callers reading bounds from untyped sources get
/// a [`PipelineConfigError`] instead of having to construct a
/// [`NonZeroUsize`] themselves.
#[derive(Clone, Copy, Debug)]
pub struct PipelineConfigBuilder {
    max_held: usize,
}

impl Default for PipelineConfigBuilder {
    fn default() -> Self {
        Self {
            max_held: DEFAULT_MAX_HELD,
        }
    }
}

impl PipelineConfigBuilder {
    /// Set the holding bound.
    #[must_use]
    pub fn max_held(mut self, max_held: usize) -> Self {
        self.max_held = max_held;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineConfigError::InvalidMaxHeld`] if the bound is zero.
    pub fn build(self) -> Result<PipelineConfig, PipelineConfigError> {
        NonZeroUsize::new(self.max_held)
            .map(PipelineConfig::new)
            .ok_or(PipelineConfigError::InvalidMaxHeld(self.max_held))
    }
}
