//! Orchestrator progress messages
//!
//! Sent from worker threads to the run's aggregator via mpsc channel:
//!
//! Started → JobStarted → JobCompleted/JobFailed → ... → Completed/Failed/Cancelled

use crate::asset::AudioAsset;

/// Progress messages for one plan execution.
///
/// Exactly one terminal message is sent per execution; job completion
/// order is unspecified and carries the job index so the aggregator can
/// keep deterministic bookkeeping.
#[derive(Debug)]
pub enum MixProgress {
    /// Plan execution started
    Started {
        /// Number of jobs in the plan (N+1)
        total_jobs: usize,
    },

    /// A worker picked up a job
    JobStarted {
        /// Output bundle entry name
        output_name: String,
        /// Index in the plan (0-based)
        index: usize,
    },

    /// A job rendered its output successfully
    JobCompleted {
        output_name: String,
        index: usize,
        total_jobs: usize,
    },

    /// A job failed; a terminal `Failed` follows once the pool drains
    JobFailed {
        output_name: String,
        index: usize,
        error: String,
    },

    /// All jobs rendered; outputs are in plan order
    Completed { outputs: Vec<AudioAsset> },

    /// At least one job failed; all outputs were discarded
    Failed { reason: String },

    /// Execution was cancelled before completion
    Cancelled,
}

impl MixProgress {
    /// Human-readable description for logs and CLI output.
    pub fn description(&self) -> String {
        match self {
            Self::Started { total_jobs } => format!("Starting {} mix jobs", total_jobs),
            Self::JobStarted { output_name, .. } => format!("Rendering: {}", output_name),
            Self::JobCompleted {
                index, total_jobs, ..
            } => format!("Rendered {}/{}", index + 1, total_jobs),
            Self::JobFailed {
                output_name, error, ..
            } => format!("Failed: {} - {}", output_name, error),
            Self::Completed { outputs } => format!("All {} mixes rendered", outputs.len()),
            Self::Failed { reason } => format!("Mix run failed: {}", reason),
            Self::Cancelled => "Mix run cancelled".to_string(),
        }
    }

    /// Check if this is a terminal message.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Failed { .. } | Self::Cancelled
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_messages() {
        assert!(!MixProgress::Started { total_jobs: 3 }.is_terminal());
        assert!(!MixProgress::JobCompleted {
            output_name: "a.wav".into(),
            index: 0,
            total_jobs: 3
        }
        .is_terminal());
        assert!(MixProgress::Completed { outputs: vec![] }.is_terminal());
        assert!(MixProgress::Failed {
            reason: "boom".into()
        }
        .is_terminal());
        assert!(MixProgress::Cancelled.is_terminal());
    }
}
