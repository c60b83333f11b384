//! Track set planning
//!
//! Deterministically enumerates the N+1 mix jobs for a run: one
//! solo-emphasis job per input track, in input order, followed by exactly
//! one balanced mix over all tracks.

use std::sync::Arc;

use thiserror::Error;

use crate::asset::AudioAsset;
use crate::progress::MIX_SHARE;

/// Stem of the reserved balanced-mix output name (`all.<ext>`).
///
/// An input track literally named like this collides with the balanced
/// output in the final bundle; no guard exists for that today.
pub const BALANCED_MIX_STEM: &str = "all";

/// Planning errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PlanError {
    #[error("at least 2 input tracks are required, found {0}")]
    InsufficientInput(usize),
}

/// What a mix job produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MixRole {
    /// One track at original level, the rest attenuated
    SoloEmphasis { main_id: String },
    /// All tracks at comparable level
    BalancedMix,
}

/// Lifecycle of a single job, owned by the run's progress aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// A single planned render. Immutable once planned; status transitions
/// travel as worker messages, not as mutation of the job itself.
#[derive(Debug, Clone)]
pub struct MixJob {
    /// Position in the plan; also the output slot index
    pub index: usize,
    pub role: MixRole,
    /// Ordered inputs; for solo-emphasis jobs `inputs[0]` is the main track
    pub inputs: Vec<Arc<AudioAsset>>,
    /// Entry name in the output bundle
    pub output_name: String,
    /// This job's share of overall run progress
    pub progress_weight: f64,
}

/// The full ordered set of jobs for one run.
#[derive(Debug, Clone)]
pub struct MixPlan {
    pub jobs: Vec<MixJob>,
}

impl MixPlan {
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        format!(
            "{} jobs: {} solo-emphasis + 1 balanced mix",
            self.jobs.len(),
            self.jobs.len() - 1
        )
    }
}

/// Build the plan for `assets`: one solo-emphasis job per asset (main =
/// that asset, others in their original relative order) followed by one
/// balanced mix over all assets.
pub fn generate_plan(assets: &[Arc<AudioAsset>]) -> Result<MixPlan, PlanError> {
    if assets.len() < 2 {
        return Err(PlanError::InsufficientInput(assets.len()));
    }

    let total_jobs = assets.len() + 1;
    let progress_weight = MIX_SHARE / total_jobs as f64;
    let mut jobs = Vec::with_capacity(total_jobs);

    for (i, main) in assets.iter().enumerate() {
        let mut inputs = Vec::with_capacity(assets.len());
        inputs.push(main.clone());
        inputs.extend(
            assets
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, asset)| asset.clone()),
        );
        jobs.push(MixJob {
            index: i,
            role: MixRole::SoloEmphasis {
                main_id: main.id().to_string(),
            },
            inputs,
            output_name: main.id().to_string(),
            progress_weight,
        });
    }

    let extension = assets[0]
        .path()
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("wav");
    jobs.push(MixJob {
        index: assets.len(),
        role: MixRole::BalancedMix,
        inputs: assets.to_vec(),
        output_name: format!("{}.{}", BALANCED_MIX_STEM, extension),
        progress_weight,
    });

    Ok(MixPlan { jobs })
}
