//! Run configuration
//!
//! Serde-backed settings for the pipeline. Loading is lenient: a missing
//! or unparsable file falls back to defaults with a warning, so a broken
//! config never takes the worker down.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::renderer::DEFAULT_ATTENUATION_DB;
use crate::storage::DEFAULT_PRESIGN_EXPIRY_SECS;

/// Pipeline settings for one worker process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Gain in dB applied to non-main tracks in solo-emphasis mixes
    pub attenuation_db: f32,

    /// Worker pool size; 0 = host core count
    pub concurrency: usize,

    /// Lifetime of the presigned bundle URL handed back on success
    pub presign_expiry_secs: u64,

    /// File extension of the fixed input container
    pub extension: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            attenuation_db: DEFAULT_ATTENUATION_DB,
            concurrency: 0,
            presign_expiry_secs: DEFAULT_PRESIGN_EXPIRY_SECS,
            extension: "wav".to_string(),
        }
    }
}

impl RunConfig {
    /// Load configuration from a YAML file.
    ///
    /// If the file doesn't exist, returns default config.
    /// If the file exists but is invalid, logs a warning and returns
    /// default config.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::info!("config file {:?} doesn't exist, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str::<Self>(&contents) {
                Ok(config) => {
                    log::info!("loaded config from {:?}", path);
                    config
                }
                Err(e) => {
                    log::warn!("failed to parse config: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("failed to read config file: {}, using defaults", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = RunConfig::default();
        assert_eq!(config.attenuation_db, -10.0);
        assert_eq!(config.concurrency, 0);
        assert_eq!(config.presign_expiry_secs, 3600);
        assert_eq!(config.extension, "wav");
    }

    #[test]
    fn test_load_partial_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "attenuation_db: -6.0\nconcurrency: 2\n").unwrap();

        let config = RunConfig::load(&path);
        assert_eq!(config.attenuation_db, -6.0);
        assert_eq!(config.concurrency, 2);
        // Unspecified fields keep their defaults
        assert_eq!(config.extension, "wav");
    }

    #[test]
    fn test_load_missing_or_invalid_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let missing = RunConfig::load(&dir.path().join("absent.yaml"));
        assert_eq!(missing.concurrency, 0);

        let bad = dir.path().join("bad.yaml");
        std::fs::write(&bad, ": not yaml [").unwrap();
        let config = RunConfig::load(&bad);
        assert_eq!(config.extension, "wav");
    }
}
