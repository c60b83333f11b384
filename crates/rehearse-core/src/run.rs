//! End-to-end job run
//!
//! One [`JobRun`] executes the full pipeline for an upload: retrieve the
//! input bundle, unpack, validate, render all mixes on the worker pool,
//! package, upload, presign. The run owns an exclusive temporary working
//! directory that is removed on every exit path - success, failure or
//! cancellation - and removal tolerates an already-gone directory.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::asset::AudioAsset;
use crate::bundle;
use crate::config::RunConfig;
use crate::engine::MixEngine;
use crate::error::RunError;
use crate::orchestrator::{MixOrchestrator, MixProgress};
use crate::plan::{generate_plan, JobStatus};
use crate::progress::{
    ProgressTracker, PACK_SHARE, RETRIEVAL_SHARE, UNPACK_SHARE, UPLOAD_SHARE,
};
use crate::renderer::MixRenderer;
use crate::status::{RunStatus, StatusReporter};
use crate::storage::ObjectStore;

/// Name of the input bundle under the upload's key prefix
pub const INPUT_BUNDLE_NAME: &str = "input_files.zip";
/// Name of the delivered output bundle
pub const OUTPUT_BUNDLE_NAME: &str = "practice_mixes.zip";

/// Executes practice-mix runs for uploads.
///
/// Holds the process-wide worker pool; the storage client and status
/// reporter are passed in per call so no ambient global state exists.
pub struct JobRun {
    config: RunConfig,
    engine: Arc<dyn MixEngine>,
    orchestrator: MixOrchestrator,
}

impl JobRun {
    pub fn new(config: RunConfig, engine: Arc<dyn MixEngine>) -> Self {
        let orchestrator = MixOrchestrator::new(config.concurrency);
        Self {
            config,
            engine,
            orchestrator,
        }
    }

    /// Run the full pipeline for `upload_id`.
    ///
    /// On success returns the presigned URL of the delivered bundle. On
    /// any failure the full error is logged here and only a redacted
    /// reason is reported externally.
    pub fn execute(
        &self,
        upload_id: &str,
        store: &dyn ObjectStore,
        reporter: &dyn StatusReporter,
    ) -> Result<String, RunError> {
        log::info!("creating practice mixes for upload {}", upload_id);
        let result = self.execute_inner(upload_id, store, reporter);
        match &result {
            Ok(url) => {
                log::info!("upload {} complete: {}", upload_id, url);
                reporter.report(RunStatus::Success {
                    bundle_url: url.clone(),
                });
            }
            Err(e) => {
                log::error!("run for upload {} failed: {}", upload_id, e);
                reporter.report(RunStatus::Failure {
                    reason: e.public_reason(),
                });
            }
        }
        result
    }

    fn execute_inner(
        &self,
        upload_id: &str,
        store: &dyn ObjectStore,
        reporter: &dyn StatusReporter,
    ) -> Result<String, RunError> {
        // Exclusive working directory; dropped (and removed) on every
        // exit path of this function.
        let workdir = tempfile::tempdir().map_err(|e| RunError::Workspace(e.to_string()))?;
        let mut tracker = ProgressTracker::new();

        // Retrieve the input bundle
        let input_key = format!("{}/{}", upload_id, INPUT_BUNDLE_NAME);
        let bundle_path = workdir.path().join(INPUT_BUNDLE_NAME);
        log::info!("downloading input bundle {}", input_key);
        store.get(&input_key, &bundle_path)?;
        reporter.report(RunStatus::Progress(tracker.advance(RETRIEVAL_SHARE)));

        // Unpack it
        bundle::unpack(&bundle_path, workdir.path())?;
        reporter.report(RunStatus::Progress(tracker.advance(UNPACK_SHARE)));

        // Validate before any job starts
        let assets = scan_assets(workdir.path(), &self.config.extension)?;
        if assets.len() < 2 {
            return Err(RunError::InputValidation(format!(
                "input bundle must contain at least 2 {} files (found {})",
                self.config.extension,
                assets.len()
            )));
        }
        log::info!(
            "found input tracks: {:?}",
            assets.iter().map(|a| a.id()).collect::<Vec<_>>()
        );

        let plan = generate_plan(&assets)
            .map_err(|e| RunError::InputValidation(e.to_string()))?;
        log::info!("plan: {}", plan.summary());

        // Render on the worker pool, aggregating progress here - this
        // loop is the single owner of all progress updates.
        let mix_dir = workdir.path().join("practice_mixes");
        fs::create_dir_all(&mix_dir).map_err(|e| RunError::Workspace(e.to_string()))?;
        // Each job carries its own share of overall progress
        let job_weights: Vec<f64> = plan.jobs.iter().map(|job| job.progress_weight).collect();
        let renderer = Arc::new(MixRenderer::new(self.engine.clone()));
        let rx = self.orchestrator.start(
            plan,
            renderer,
            self.config.attenuation_db,
            &mix_dir,
        );

        let mut statuses: Vec<JobStatus> = Vec::new();
        let mut outputs: Option<Vec<AudioAsset>> = None;
        for msg in rx {
            match msg {
                MixProgress::Started { total_jobs } => {
                    statuses = vec![JobStatus::Pending; total_jobs];
                }
                MixProgress::JobStarted { index, .. } => {
                    if let Some(slot) = statuses.get_mut(index) {
                        *slot = JobStatus::Running;
                    }
                }
                MixProgress::JobCompleted { index, .. } => {
                    if let Some(slot) = statuses.get_mut(index) {
                        *slot = JobStatus::Completed;
                    }
                    let slice = job_weights.get(index).copied().unwrap_or(0.0);
                    reporter.report(RunStatus::Progress(tracker.advance(slice)));
                }
                MixProgress::JobFailed { index, output_name, error } => {
                    if let Some(slot) = statuses.get_mut(index) {
                        *slot = JobStatus::Failed;
                    }
                    log::error!("job {} failed: {}", output_name, error);
                }
                MixProgress::Completed { outputs: rendered } => {
                    outputs = Some(rendered);
                    break;
                }
                MixProgress::Failed { reason } => {
                    let completed = statuses
                        .iter()
                        .filter(|s| **s == JobStatus::Completed)
                        .count();
                    log::error!(
                        "aborting run: {} ({} of {} jobs had completed; outputs discarded)",
                        reason,
                        completed,
                        statuses.len()
                    );
                    return Err(RunError::Render(reason));
                }
                MixProgress::Cancelled => return Err(RunError::Cancelled),
            }
        }
        let outputs =
            outputs.ok_or_else(|| RunError::Render("mix pool ended without a result".into()))?;

        // Package
        let zip_path = workdir.path().join(OUTPUT_BUNDLE_NAME);
        bundle::pack(&outputs, &zip_path)?;
        reporter.report(RunStatus::Progress(tracker.advance(PACK_SHARE)));

        // Deliver; a later failure must not leave an orphaned bundle
        let output_key = format!("{}/{}", upload_id, OUTPUT_BUNDLE_NAME);
        log::info!("uploading practice mixes as {}", output_key);
        store.put(&zip_path, &output_key)?;
        reporter.report(RunStatus::Progress(tracker.advance(UPLOAD_SHARE)));

        let url = match store.presign(&output_key, self.config.presign_expiry_secs) {
            Ok(url) => url,
            Err(e) => {
                if let Err(del) = store.delete(&output_key) {
                    log::warn!("could not remove partial bundle {}: {}", output_key, del);
                }
                return Err(e.into());
            }
        };
        reporter.report(RunStatus::Progress(tracker.complete()));

        Ok(url)
    }

    /// Request cancellation of the in-flight mix pool.
    pub fn cancel(&self) {
        self.orchestrator.cancel();
    }
}

/// List the audio assets in `dir` with the given extension, sorted by
/// filename so input order is deterministic.
pub fn scan_assets(dir: &Path, extension: &str) -> Result<Vec<Arc<AudioAsset>>, RunError> {
    let entries = fs::read_dir(dir).map_err(|e| RunError::Workspace(e.to_string()))?;
    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case(extension))
        })
        .collect();
    paths.sort();
    Ok(paths.iter().map(|p| Arc::new(AudioAsset::new(p))).collect())
}
