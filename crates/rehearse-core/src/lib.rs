//! Rehearse Core - practice-mix rendering pipeline
//!
//! Turns a set of individually-recorded tracks into one "practice mix" per
//! track (that track at original loudness, the rest attenuated) plus a
//! balanced mix of everything. Rendering uses a two-pass
//! render-measure-correct technique and runs on a bounded worker pool.

pub mod analyzer;
pub mod asset;
pub mod bundle;
pub mod config;
pub mod engine;
pub mod error;
pub mod orchestrator;
pub mod plan;
pub mod progress;
pub mod renderer;
pub mod run;
pub mod status;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_util;

pub use asset::AudioAsset;
pub use config::RunConfig;
pub use error::RunError;
pub use run::JobRun;
