//! Worker pool service executing mix plans
//!
//! Owns a rayon thread pool and a cancellation flag. Jobs are independent
//! and write to distinct output names (guaranteed by the planner), so no
//! locking exists on the output namespace; the only shared state is the
//! progress channel and the per-slot output table.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver};
use std::sync::{Arc, Mutex};

use rayon::prelude::*;

use super::MixProgress;
use crate::asset::AudioAsset;
use crate::plan::MixPlan;
use crate::renderer::MixRenderer;

/// Executes mix plans on a bounded worker pool.
///
/// The pool is reusable - create once per process, not per run.
pub struct MixOrchestrator {
    thread_pool: rayon::ThreadPool,
    /// Cancellation flag shared with workers
    cancel_flag: Arc<AtomicBool>,
}

impl MixOrchestrator {
    /// Create an orchestrator with `concurrency` workers.
    ///
    /// `0` sizes the pool to the host's core count.
    pub fn new(concurrency: usize) -> Self {
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(concurrency)
            .thread_name(|i| format!("mix-render-{}", i))
            .build()
            .expect("Failed to create mix render thread pool");

        Self {
            thread_pool,
            cancel_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Execute `plan`, rendering every output into `out_dir`.
    ///
    /// Returns a receiver for progress messages; the plan runs in the
    /// background and the receiver yields exactly one terminal message.
    /// Outputs in the terminal `Completed` message are in plan order
    /// regardless of completion order.
    pub fn start(
        &self,
        plan: MixPlan,
        renderer: Arc<MixRenderer>,
        attenuation_db: f32,
        out_dir: &Path,
    ) -> Receiver<MixProgress> {
        // Reset cancellation flag
        self.cancel_flag.store(false, Ordering::SeqCst);

        let (progress_tx, progress_rx) = channel();
        let cancel_flag = self.cancel_flag.clone();
        let out_dir = out_dir.to_path_buf();

        self.thread_pool.spawn(move || {
            let total_jobs = plan.jobs.len();
            let _ = progress_tx.send(MixProgress::Started { total_jobs });

            // One slot per job; filled by index so completion order never
            // reorders the bundle.
            let outputs: Mutex<Vec<Option<AudioAsset>>> =
                Mutex::new((0..total_jobs).map(|_| None).collect());
            let first_failure: Mutex<Option<String>> = Mutex::new(None);
            let failed = AtomicBool::new(false);

            plan.jobs.par_iter().for_each(|job| {
                // Fail-fast: not-yet-started jobs skip once anything
                // failed or the run was cancelled.
                if cancel_flag.load(Ordering::Relaxed) || failed.load(Ordering::Relaxed) {
                    return;
                }

                let _ = progress_tx.send(MixProgress::JobStarted {
                    output_name: job.output_name.clone(),
                    index: job.index,
                });

                match renderer.render_job(job, &out_dir, attenuation_db) {
                    Ok(asset) => {
                        outputs.lock().unwrap()[job.index] = Some(asset);
                        let _ = progress_tx.send(MixProgress::JobCompleted {
                            output_name: job.output_name.clone(),
                            index: job.index,
                            total_jobs,
                        });
                    }
                    Err(e) => {
                        log::error!("mix job {} failed: {}", job.output_name, e);
                        failed.store(true, Ordering::Relaxed);
                        let mut slot = first_failure.lock().unwrap();
                        if slot.is_none() {
                            *slot = Some(e.to_string());
                        }
                        let _ = progress_tx.send(MixProgress::JobFailed {
                            output_name: job.output_name.clone(),
                            index: job.index,
                            error: e.to_string(),
                        });
                    }
                }
            });

            if cancel_flag.load(Ordering::Relaxed) {
                let _ = progress_tx.send(MixProgress::Cancelled);
                return;
            }

            if let Some(reason) = first_failure.into_inner().unwrap() {
                // In-flight jobs finished above; their outputs are
                // discarded with the working directory.
                let _ = progress_tx.send(MixProgress::Failed { reason });
                return;
            }

            let outputs: Vec<AudioAsset> = outputs
                .into_inner()
                .unwrap()
                .into_iter()
                .flatten()
                .collect();
            let _ = progress_tx.send(MixProgress::Completed { outputs });
        });

        progress_rx
    }

    /// Cancel the current execution.
    ///
    /// Workers stop picking up jobs at their next checkpoint; jobs already
    /// completed are not rolled back.
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }
}
