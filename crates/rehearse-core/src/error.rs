//! Run-level error taxonomy
//!
//! Full diagnostic detail stays server-side in the logs; callers outside
//! the process only ever see [`RunError::public_reason`].

use thiserror::Error;

use crate::bundle::BundleError;
use crate::engine::EngineError;
use crate::storage::StorageError;

/// Errors that abort a run.
#[derive(Error, Debug)]
pub enum RunError {
    /// Bad input set; surfaced before any job starts
    #[error("input validation failed: {0}")]
    InputValidation(String),

    /// Run-scoped filesystem failure (working directory, asset scan)
    #[error("workspace I/O failed: {0}")]
    Workspace(String),

    /// Input or output bundle could not be processed
    #[error(transparent)]
    Bundle(#[from] BundleError),

    /// A mix job failed; under fail-fast policy this fails the run
    #[error("mix rendering failed: {0}")]
    Render(String),

    /// Storage boundary failure (get/put/presign)
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The run was cancelled before completion
    #[error("run cancelled")]
    Cancelled,
}

impl From<EngineError> for RunError {
    fn from(e: EngineError) -> Self {
        RunError::Render(e.to_string())
    }
}

impl RunError {
    /// Redacted description safe to hand to external callers.
    ///
    /// Validation messages describe the caller's own input and pass
    /// through; everything else collapses to a category.
    pub fn public_reason(&self) -> String {
        match self {
            RunError::InputValidation(msg) => msg.clone(),
            RunError::Workspace(_) | RunError::Bundle(_) => {
                "bundle processing failed".to_string()
            }
            RunError::Render(_) => "mix rendering failed".to_string(),
            RunError::Storage(_) => "storage operation failed".to_string(),
            RunError::Cancelled => "run cancelled".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_reason_redacts_detail() {
        let err = RunError::Storage(StorageError::Io {
            key: "secret-bucket/run/bundle.zip".into(),
            detail: "connection refused to 10.0.0.5".into(),
        });
        let public = err.public_reason();
        assert!(!public.contains("secret-bucket"));
        assert!(!public.contains("10.0.0.5"));
        assert_eq!(public, "storage operation failed");
    }

    #[test]
    fn test_validation_message_passes_through() {
        let err = RunError::InputValidation("at least 2 input tracks are required".into());
        assert!(err.public_reason().contains("at least 2"));
    }
}
