//! Weighted run progress
//!
//! A run's progress is a single fraction built from fixed phase weights:
//! input-bundle retrieval 10%, unpacking 10%, the mix pool 50% (split
//! evenly across the N+1 jobs), packaging 10% and upload 20%. The value
//! only ever increases, never exceeds 1.0, and reaches exactly 1.0 on
//! full success.

/// Share for downloading the input bundle
pub const RETRIEVAL_SHARE: f64 = 0.10;
/// Share for unpacking the input bundle
pub const UNPACK_SHARE: f64 = 0.10;
/// Share for the whole mix pool; each job completion adds an equal slice
pub const MIX_SHARE: f64 = 0.50;
/// Share for packaging the output bundle
pub const PACK_SHARE: f64 = 0.10;
/// Share for uploading the output bundle
pub const UPLOAD_SHARE: f64 = 0.20;

/// Monotonically non-decreasing progress accumulator.
///
/// All updates flow through the run's single aggregator thread, so this
/// needs no internal synchronization.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    fraction: f64,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by a non-negative share and return the new fraction,
    /// capped at 1.0.
    pub fn advance(&mut self, share: f64) -> f64 {
        debug_assert!(share >= 0.0, "progress can only move forward");
        self.fraction = (self.fraction + share.max(0.0)).min(1.0);
        self.fraction
    }

    /// Snap to exactly 1.0; called once on full success so float residue
    /// from summing shares never leaves the run just short of done.
    pub fn complete(&mut self) -> f64 {
        self.fraction = 1.0;
        self.fraction
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shares_sum_to_one() {
        let total = RETRIEVAL_SHARE + UNPACK_SHARE + MIX_SHARE + PACK_SHARE + UPLOAD_SHARE;
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_monotonic_and_capped() {
        let mut tracker = ProgressTracker::new();
        let mut last = 0.0;
        // A 4-asset run: retrieval, unpack, 5 job slices, pack, upload
        let job_slice = MIX_SHARE / 5.0;
        let steps = [
            RETRIEVAL_SHARE,
            UNPACK_SHARE,
            job_slice,
            job_slice,
            job_slice,
            job_slice,
            job_slice,
            PACK_SHARE,
            UPLOAD_SHARE,
        ];
        for share in steps {
            let now = tracker.advance(share);
            assert!(now >= last, "progress went backwards: {} -> {}", last, now);
            assert!(now <= 1.0);
            last = now;
        }
        assert!((tracker.fraction() - 1.0).abs() < 1e-9);
        assert_eq!(tracker.complete(), 1.0);
    }

    #[test]
    fn test_never_exceeds_one() {
        let mut tracker = ProgressTracker::new();
        tracker.advance(0.9);
        assert_eq!(tracker.advance(0.9), 1.0);
        assert_eq!(tracker.fraction(), 1.0);
    }
}
