//! Demo binary simulating a pipelined connection.
//!
//! Admits a batch of requests, completes them in reverse order on separate
//! tasks, and prints the order in which responses reach the writer.

mod cli;

use std::{sync::Arc, time::Duration};

use clap::Parser;
use pipelining::{OfferOutcome, PipelineConfig, QueuedSession, write_queue};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();
    let config = PipelineConfig::builder().max_held(cli.max_held).build()?;
    let shutdown = CancellationToken::new();
    let session: Arc<QueuedSession<String>> =
        Arc::new(QueuedSession::new(config, shutdown.clone()));
    let (queue, mut written) = write_queue();

    let mut tasks = Vec::new();
    for i in 0..cli.requests {
        let unit = session.admit(format!("request-{i}"));
        let delay = Duration::from_millis((cli.requests - i).saturating_mul(cli.delay_ms));
        let session = Arc::clone(&session);
        let completion = queue.completion();
        tasks.push(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let (sequence, request) = unit.into_parts();
            session.complete(sequence, format!("response to {request}"), completion)
        }));
    }
    drop(queue);

    let outcomes = futures::future::join_all(tasks).await;
    let mut overflowed = false;
    for outcome in outcomes {
        overflowed |= outcome?? == OfferOutcome::Overflow;
    }

    while let Ok(response) = written.try_recv() {
        println!("{response}");
    }
    if overflowed || shutdown.is_cancelled() {
        println!(
            "connection aborted: more than {} early responses held",
            cli.max_held
        );
    } else {
        println!("delivered {} responses in order", session.next_required());
    }
    Ok(())
}
