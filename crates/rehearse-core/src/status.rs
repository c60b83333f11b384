//! Run status channel
//!
//! The surrounding job runtime owns delivery of status to callers; the
//! pipeline only emits progress fractions and one terminal state through
//! this trait. `Pending` belongs to the queue before a worker picks the
//! run up - the pipeline itself never sends it.

use std::sync::mpsc::{channel, Receiver, Sender};

/// Externally visible run state.
#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    /// Queued, not yet picked up (emitted by the runtime, not the run)
    Pending,
    /// Fraction of the run completed, in [0, 1], non-decreasing
    Progress(f64),
    /// Terminal: the output bundle is retrievable at `bundle_url`
    Success { bundle_url: String },
    /// Terminal: the run failed; `reason` is already redacted
    Failure { reason: String },
}

/// Sink for run status updates.
pub trait StatusReporter: Send + Sync {
    fn report(&self, status: RunStatus);
}

/// Reporter that drops every update; for callers that only want the
/// run's return value.
#[derive(Debug, Default)]
pub struct NullReporter;

impl StatusReporter for NullReporter {
    fn report(&self, _status: RunStatus) {}
}

/// Reporter that forwards updates over an mpsc channel.
pub struct ChannelReporter {
    tx: Sender<RunStatus>,
}

impl ChannelReporter {
    pub fn new() -> (Self, Receiver<RunStatus>) {
        let (tx, rx) = channel();
        (Self { tx }, rx)
    }
}

impl StatusReporter for ChannelReporter {
    fn report(&self, status: RunStatus) {
        // Receiver may be gone; status delivery is best-effort
        let _ = self.tx.send(status);
    }
}
