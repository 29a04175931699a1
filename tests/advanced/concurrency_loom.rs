#![cfg(all(feature = "advanced-tests", loom))]
//! Concurrency tests for `PipelineSession` using loom.
//!
//! Completions race from independent threads while the session lock
//! serialises their drain loops. `loom` explores the interleavings to check
//! that delivery order and the single abort hold under every schedule.

use loom::{
    model,
    sync::{
        Arc,
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
};
use pipelining::{Abort, Completion, OfferOutcome, PipelineConfig, PipelineSession, SequenceId};

#[derive(Clone)]
struct Recorder(Arc<Mutex<Vec<u64>>>);

impl Recorder {
    fn new() -> Self { Self(Arc::new(Mutex::new(Vec::new()))) }
}

impl Completion<u64> for Recorder {
    fn complete(self, response: u64) { self.0.lock().expect("recorder poisoned").push(response); }
}

#[derive(Clone)]
struct AbortCounter(Arc<AtomicUsize>);

impl AbortCounter {
    fn new() -> Self { Self(Arc::new(AtomicUsize::new(0))) }
}

impl Abort for AbortCounter {
    fn abort(&self) { self.0.fetch_add(1, Ordering::SeqCst); }
}

fn session(max_held: usize, aborts: AbortCounter) -> PipelineSession<u64, Recorder, AbortCounter> {
    let config = PipelineConfig::builder()
        .max_held(max_held)
        .build()
        .expect("valid config");
    PipelineSession::new(config, aborts)
}

#[test]
fn racing_completions_deliver_in_order() {
    model(|| {
        let recorder = Recorder::new();
        let session = Arc::new(session(2, AbortCounter::new()));
        for _ in 0..3 {
            let _ = session.admit(());
        }

        let handles: Vec<_> = [2u64, 0]
            .into_iter()
            .map(|raw| {
                let session = Arc::clone(&session);
                let recorder = recorder.clone();
                thread::spawn(move || {
                    session
                        .complete(SequenceId::new(raw), raw, recorder)
                        .expect("offer failed")
                })
            })
            .collect();

        session
            .complete(SequenceId::new(1), 1, recorder.clone())
            .expect("offer failed");
        for handle in handles {
            handle.join().expect("completion thread panicked");
        }

        let delivered = recorder.0.lock().expect("recorder poisoned").clone();
        assert_eq!(delivered, vec![0, 1, 2]);
        assert_eq!(session.held(), 0);
    });
}

#[test]
fn concurrent_overflow_aborts_once() {
    model(|| {
        let aborts = AbortCounter::new();
        let session = Arc::new(session(1, aborts.clone()));
        for _ in 0..4 {
            let _ = session.admit(());
        }
        session
            .complete(SequenceId::new(1), 1, Recorder::new())
            .expect("offer failed");

        let handles: Vec<_> = [2u64, 3]
            .into_iter()
            .map(|raw| {
                let session = Arc::clone(&session);
                thread::spawn(move || {
                    session
                        .complete(SequenceId::new(raw), raw, Recorder::new())
                        .expect("offer failed")
                })
            })
            .collect();

        let outcomes: Vec<OfferOutcome> = handles
            .into_iter()
            .map(|handle| handle.join().expect("completion thread panicked"))
            .collect();

        assert_eq!(aborts.0.load(Ordering::SeqCst), 1);
        assert_eq!(
            outcomes
                .iter()
                .filter(|outcome| **outcome == OfferOutcome::Overflow)
                .count(),
            1
        );
        assert!(outcomes.contains(&OfferOutcome::Discarded));
    });
}
