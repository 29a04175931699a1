#![cfg(not(loom))]
#![allow(dead_code, reason = "each test binary uses a different subset of helpers")]
//! Shared fixtures for integration tests.

use std::{
    ops::{Deref, DerefMut},
    sync::{
        Arc,
        Mutex,
        MutexGuard,
        OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
};

use logtest::Logger;
use pipelining::{
    Completion,
    OfferOutcome,
    PipelineConfig,
    PipelineError,
    PipelineSession,
    SequenceId,
};
use rstest::fixture;

/// Completion recording the sequence of each delivered response.
#[derive(Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<u64>>>);

impl Recorder {
    /// Responses delivered so far, in delivery order.
    pub fn delivered(&self) -> Vec<u64> { self.0.lock().expect("recorder poisoned").clone() }
}

impl Completion<u64> for Recorder {
    fn complete(self, response: u64) { self.0.lock().expect("recorder poisoned").push(response); }
}

/// Abort capability counting invocations.
#[derive(Clone, Default)]
pub struct AbortCounter(Arc<AtomicUsize>);

impl AbortCounter {
    pub fn count(&self) -> usize { self.0.load(Ordering::SeqCst) }
}

impl pipelining::Abort for AbortCounter {
    fn abort(&self) { self.0.fetch_add(1, Ordering::SeqCst); }
}

pub type TestSession = PipelineSession<u64, Recorder, AbortCounter>;

/// A session plus handles observing its deliveries and aborts.
pub struct Connection {
    pub session: TestSession,
    pub recorder: Recorder,
    pub aborts: AbortCounter,
}

impl Connection {
    /// Open a connection holding at most `max_held` early responses.
    pub fn open(max_held: usize) -> Self {
        let config = PipelineConfig::builder()
            .max_held(max_held)
            .build()
            .expect("valid config");
        let aborts = AbortCounter::default();
        Self {
            session: PipelineSession::new(config, aborts.clone()),
            recorder: Recorder::default(),
            aborts,
        }
    }

    /// Admit `count` requests, returning their raw sequence ids.
    pub fn admit(&self, count: u64) -> Vec<u64> {
        (0..count)
            .map(|_| self.session.admit(()).sequence().get())
            .collect()
    }

    /// Complete the request with sequence `raw`, answering with `raw`.
    pub fn complete(&self, raw: u64) -> Result<OfferOutcome, PipelineError> {
        self.session
            .complete(SequenceId::new(raw), raw, self.recorder.clone())
    }

    pub fn delivered(&self) -> Vec<u64> { self.recorder.delivered() }
}

/// Handle to the global logger with exclusive access.
///
/// Serialises access to a [`logtest::Logger`] so tests do not read each
/// other's records.
pub struct LoggerHandle {
    guard: MutexGuard<'static, Logger>,
}

impl LoggerHandle {
    /// Acquire the global [`Logger`] and discard records left by earlier tests.
    pub fn new() -> Self {
        static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

        let logger = LOGGER.get_or_init(|| Mutex::new(Logger::start()));
        let mut guard = logger.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        while guard.pop().is_some() {}

        Self { guard }
    }

    /// Whether a record at `level` containing `needle` was captured.
    pub fn saw(&mut self, level: log::Level, needle: &str) -> bool {
        let mut found = false;
        while let Some(record) = self.guard.pop() {
            if record.level() == level && record.args().contains(needle) {
                found = true;
            }
        }
        found
    }
}

impl Deref for LoggerHandle {
    type Target = Logger;

    fn deref(&self) -> &Self::Target { &self.guard }
}

impl DerefMut for LoggerHandle {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.guard }
}

#[fixture]
pub fn logger() -> LoggerHandle { LoggerHandle::new() }
