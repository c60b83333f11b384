//! Two-pass mix rendering
//!
//! Combining N signals changes perceived level in a way that cannot be
//! predicted from the inputs' individual loudness figures, so every mix is
//! rendered twice: a trial render is measured, the difference to the
//! reference loudness becomes a uniform correction gain, and the identical
//! combine graph is re-run with that correction applied to the combined
//! signal. The trial render is discarded.

use std::path::Path;
use std::sync::Arc;

use crate::analyzer::LoudnessAnalyzer;
use crate::asset::AudioAsset;
use crate::engine::{EngineResult, MixEngine, MixInput};
use crate::plan::{MixJob, MixRole};

/// Gain applied to every non-main track in a solo-emphasis mix
pub const DEFAULT_ATTENUATION_DB: f32 = -10.0;

/// Renders practice mixes through an engine capability.
pub struct MixRenderer {
    engine: Arc<dyn MixEngine>,
    analyzer: LoudnessAnalyzer,
}

impl MixRenderer {
    pub fn new(engine: Arc<dyn MixEngine>) -> Self {
        let analyzer = LoudnessAnalyzer::new(engine.clone());
        Self { engine, analyzer }
    }

    /// Render a mix where `main` plays at its original loudness and every
    /// other track is attenuated by `attenuation_db`.
    ///
    /// The output's loudness matches `main`'s measured loudness.
    pub fn render_solo_emphasis(
        &self,
        main: &AudioAsset,
        others: &[Arc<AudioAsset>],
        attenuation_db: f32,
        dest: &Path,
    ) -> EngineResult<AudioAsset> {
        log::debug!(
            "rendering solo-emphasis mix for {} with {} other tracks",
            main.id(),
            others.len()
        );
        let mut inputs = Vec::with_capacity(others.len() + 1);
        inputs.push(MixInput::unity(main));
        inputs.extend(
            others
                .iter()
                .map(|other| MixInput::with_gain(other, attenuation_db)),
        );
        self.render_corrected(main, &inputs, dest)
    }

    /// Render a mix of all tracks at comparable level.
    ///
    /// The first track's loudness is the reference; the assumption is that
    /// individually-recorded parts of one performance sit at similar
    /// levels to begin with.
    pub fn render_balanced_mix(
        &self,
        assets: &[Arc<AudioAsset>],
        dest: &Path,
    ) -> EngineResult<AudioAsset> {
        log::debug!("rendering balanced mix of {} tracks", assets.len());
        let inputs: Vec<MixInput<'_>> = assets
            .iter()
            .map(|asset| MixInput::unity(asset))
            .collect();
        self.render_corrected(&assets[0], &inputs, dest)
    }

    /// Render the mix a planned job describes into `out_dir`.
    pub fn render_job(
        &self,
        job: &MixJob,
        out_dir: &Path,
        attenuation_db: f32,
    ) -> EngineResult<AudioAsset> {
        let dest = out_dir.join(&job.output_name);
        match job.role {
            // Planner invariant: inputs[0] is the main track
            MixRole::SoloEmphasis { .. } => self.render_solo_emphasis(
                &job.inputs[0],
                &job.inputs[1..],
                attenuation_db,
                &dest,
            ),
            MixRole::BalancedMix => self.render_balanced_mix(&job.inputs, &dest),
        }
    }

    /// The two-pass core: trial render, measure, correct, final render.
    fn render_corrected(
        &self,
        reference: &AudioAsset,
        inputs: &[MixInput<'_>],
        dest: &Path,
    ) -> EngineResult<AudioAsset> {
        let reference_db = self.analyzer.measure(reference)?;

        let scratch_path = scratch_path_for(dest);
        self.engine.combine(inputs, 0.0, &scratch_path)?;
        let trial_db = self.engine.measure(&scratch_path)?;
        if let Err(e) = std::fs::remove_file(&scratch_path) {
            log::warn!(
                "could not remove scratch render {}: {}",
                scratch_path.display(),
                e
            );
        }

        let correction_db = reference_db - trial_db;
        log::debug!(
            "{}: reference {:.2} dBFS, trial {:.2} dBFS, correcting by {:+.2} dB",
            dest.display(),
            reference_db,
            trial_db,
            correction_db
        );

        self.engine.combine(inputs, correction_db, dest)
    }
}

/// Scratch file name for the trial render, sibling to the final output.
fn scratch_path_for(dest: &Path) -> std::path::PathBuf {
    let name = dest
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("mix.wav");
    dest.with_file_name(format!("tmp_{}", name))
}
