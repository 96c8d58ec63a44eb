//! Per-lane adaptive controller for the virtual-loss value applied to
//! nodes entering the in-flight batch.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Virtual-loss policy for a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchingMode {
    /// Constant virtual loss irrespective of occupancy.
    Fixed,
    /// Virtual loss derived from this lane's observed occupancy statistics.
    Dynamic,
}

/// Batch-assembly state for one primary lane.
///
/// Single-writer by construction: only the owning lane's worker group calls
/// into it, so the occupancy counters use relaxed atomics and no cross-lane
/// synchronization exists. Never shared between lanes: overlapped lanes
/// run on disjoint worker groups, and sharing statistics would corrupt each
/// lane's estimate of its own batch-fill behavior.
pub struct BatchParams {
    mode: BatchingMode,
    base_virtual_loss: f32,
    samples: AtomicU32,
    occupancy_sum: AtomicU64,
}

/// Softening constant for the dynamic occupancy scale. Keeps the dynamic
/// penalty within [base, 2*base) and flattens the curve for small batches.
const OCCUPANCY_SOFTENING: f64 = 16.0;

impl BatchParams {
    pub fn new(mode: BatchingMode, base_virtual_loss: f32) -> Self {
        Self {
            mode,
            base_virtual_loss,
            samples: AtomicU32::new(0),
            occupancy_sum: AtomicU64::new(0),
        }
    }

    /// Virtual loss to apply at the given in-flight batch occupancy.
    ///
    /// Pure with respect to the statistics: recording is a separate call on
    /// the lane's servicing path, so query order from this lane's workers
    /// cannot change the answer for a held input.
    pub fn current_virtual_loss(&self, batch_occupancy: u32) -> f32 {
        match self.mode {
            BatchingMode::Fixed => self.base_virtual_loss,
            BatchingMode::Dynamic => {
                let samples = self.samples.load(Ordering::Relaxed) as f64;
                let sum = self.occupancy_sum.load(Ordering::Relaxed) as f64;
                // Fold the instantaneous occupancy into the lane's mean, then
                // penalize re-selection harder as batches fill.
                let mean = (sum + batch_occupancy as f64) / (samples + 1.0);
                let scale = 1.0 + mean / (mean + OCCUPANCY_SOFTENING);
                (self.base_virtual_loss as f64 * scale) as f32
            }
        }
    }

    /// Record one observed batch occupancy. Called from the owning lane's
    /// servicing path only.
    pub fn record_occupancy(&self, occupancy: u32) {
        self.samples.fetch_add(1, Ordering::Relaxed);
        self.occupancy_sum
            .fetch_add(occupancy as u64, Ordering::Relaxed);
    }

    /// Number of occupancy samples recorded so far.
    pub fn observed_samples(&self) -> u32 {
        self.samples.load(Ordering::Relaxed)
    }

    pub fn mode(&self) -> BatchingMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_mode_ignores_occupancy() {
        let params = BatchParams::new(BatchingMode::Fixed, 1.5);
        params.record_occupancy(1000);
        assert!((params.current_virtual_loss(0) - 1.5).abs() < 1e-6);
        assert!((params.current_virtual_loss(512) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_dynamic_mode_grows_with_occupancy() {
        let params = BatchParams::new(BatchingMode::Dynamic, 1.0);
        let empty = params.current_virtual_loss(0);
        let full = params.current_virtual_loss(256);
        assert!(full > empty, "fuller batches must penalize harder");
        // Bounded by twice the base
        assert!(full < 2.0);
    }

    #[test]
    fn test_dynamic_mode_uses_recorded_history() {
        let low = BatchParams::new(BatchingMode::Dynamic, 1.0);
        let high = BatchParams::new(BatchingMode::Dynamic, 1.0);
        for _ in 0..100 {
            low.record_occupancy(1);
            high.record_occupancy(200);
        }
        assert_eq!(low.observed_samples(), 100);
        assert!(high.current_virtual_loss(8) > low.current_virtual_loss(8));
    }

    #[test]
    fn test_query_does_not_mutate_state() {
        let params = BatchParams::new(BatchingMode::Dynamic, 1.0);
        params.record_occupancy(32);
        let first = params.current_virtual_loss(8);
        for _ in 0..50 {
            params.current_virtual_loss(999);
        }
        assert_eq!(params.observed_samples(), 1);
        assert!((params.current_virtual_loss(8) - first).abs() < 1e-9);
    }

    #[test]
    fn test_dynamic_with_no_history_still_defined() {
        let params = BatchParams::new(BatchingMode::Dynamic, 2.0);
        let v = params.current_virtual_loss(0);
        assert!((v - 2.0).abs() < 1e-6, "no history, empty batch: base value, got {v}");
    }
}
