//! Command line interface for the `pipelining` demo binary.
//!
//! Kept free of crate-internal imports so `build.rs` can include it to render
//! the manual page.

use clap::Parser;

/// Command line arguments for the `pipelining` binary.
#[derive(Debug, Parser)]
#[command(
    name = "pipelining",
    version,
    about = "Simulate out-of-order completion of pipelined requests"
)]
pub struct Cli {
    /// Number of pipelined requests to admit.
    #[arg(short, long, default_value_t = 8)]
    pub requests: u64,

    /// Maximum number of early responses held before the connection aborts.
    #[arg(short = 'm', long, default_value_t = 16)]
    pub max_held: usize,

    /// Per-request latency step in milliseconds; request `i` of `n` completes
    /// after `(n - i) * delay` so responses finish in reverse order.
    #[arg(short, long, default_value_t = 10)]
    pub delay_ms: u64,
}
