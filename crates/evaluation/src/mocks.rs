//! Mock implementations of evaluation traits for testing without a real
//! network backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Barrier};
use std::time::Duration;

use crate::apply::MoveSampler;
use crate::backend::{EvalBackend, EvalError};
use crate::types::{Evaluation, PolicyEntry, Position};

/// Convenience constructor for an `Evaluation`.
pub fn make_eval(value: f32, priors: &[(u16, f32)]) -> Evaluation {
    Evaluation {
        value,
        policy: priors
            .iter()
            .map(|&(move_index, prior)| PolicyEntry { move_index, prior })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// MockBackend
// ---------------------------------------------------------------------------

/// Mock backend that returns canned evaluations by canonical key and counts
/// every invocation.
pub struct MockBackend {
    name: String,
    responses: HashMap<u64, Evaluation>,
    default_response: Evaluation,
    fail_evaluate: bool,
    fail_warm_up: bool,
    warm_up_delay: Option<Duration>,
    evaluate_barrier: Option<Arc<Barrier>>,
    calls: AtomicU32,
    warmed: AtomicBool,
}

impl MockBackend {
    /// Backend returning a zero evaluation for any position.
    pub fn new(name: &str) -> Self {
        Self::with_value(name, 0.0)
    }

    /// Backend returning `value` (no policy) for any position.
    pub fn with_value(name: &str, value: f32) -> Self {
        Self {
            name: name.to_string(),
            responses: HashMap::new(),
            default_response: make_eval(value, &[]),
            fail_evaluate: false,
            fail_warm_up: false,
            warm_up_delay: None,
            evaluate_barrier: None,
            calls: AtomicU32::new(0),
            warmed: AtomicBool::new(false),
        }
    }

    /// Backend whose every evaluation fails.
    pub fn failing(name: &str) -> Self {
        let mut backend = Self::new(name);
        backend.fail_evaluate = true;
        backend
    }

    /// Add a canned evaluation for an exact canonical key.
    pub fn add_response(&mut self, key: u64, eval: Evaluation) {
        self.responses.insert(key, eval);
    }

    /// Make `warm_up` fail.
    pub fn with_failing_warm_up(mut self) -> Self {
        self.fail_warm_up = true;
        self
    }

    /// Sleep this long inside `warm_up` (for overlap-timing tests).
    pub fn with_warm_up_delay(mut self, delay: Duration) -> Self {
        self.warm_up_delay = Some(delay);
        self
    }

    /// Block inside `evaluate` on the given barrier, so concurrent callers
    /// can be forced to overlap deterministically.
    pub fn with_evaluate_barrier(mut self, barrier: Arc<Barrier>) -> Self {
        self.evaluate_barrier = Some(barrier);
        self
    }

    /// Number of `evaluate` invocations so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }

    /// Whether `warm_up` has completed successfully.
    pub fn is_warmed(&self) -> bool {
        self.warmed.load(Ordering::Relaxed)
    }
}

impl EvalBackend for MockBackend {
    fn evaluate(&self, position: &Position) -> Result<Evaluation, EvalError> {
        if self.fail_evaluate {
            return Err(EvalError::Backend(anyhow::anyhow!(
                "backend '{}' unavailable",
                self.name
            )));
        }
        if let Some(barrier) = &self.evaluate_barrier {
            barrier.wait();
        }
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .responses
            .get(&position.key)
            .cloned()
            .unwrap_or_else(|| self.default_response.clone()))
    }

    fn warm_up(&self) -> Result<(), EvalError> {
        if let Some(delay) = self.warm_up_delay {
            std::thread::sleep(delay);
        }
        if self.fail_warm_up {
            return Err(EvalError::Backend(anyhow::anyhow!(
                "backend '{}' failed to initialize",
                self.name
            )));
        }
        self.warmed.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ---------------------------------------------------------------------------
// FirstMoveSampler
// ---------------------------------------------------------------------------

/// Sampler that deterministically picks the first listed move.
pub struct FirstMoveSampler;

impl MoveSampler for FirstMoveSampler {
    fn sample(&self, priors: &[PolicyEntry]) -> Option<u16> {
        priors.first().map(|entry| entry.move_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_eval() {
        let eval = make_eval(0.5, &[(4, 0.9), (12, 0.1)]);
        assert!((eval.value - 0.5).abs() < 1e-9);
        assert_eq!(eval.policy.len(), 2);
        assert_eq!(eval.policy[0].move_index, 4);
    }

    #[test]
    fn test_mock_backend_canned_and_default() {
        let mut backend = MockBackend::with_value("m", -0.2);
        backend.add_response(10, make_eval(0.9, &[]));

        let canned = backend.evaluate(&Position::from_key(10)).unwrap();
        assert!((canned.value - 0.9).abs() < 1e-6);

        let default = backend.evaluate(&Position::from_key(11)).unwrap();
        assert!((default.value + 0.2).abs() < 1e-6);

        assert_eq!(backend.calls(), 2);
    }

    #[test]
    fn test_mock_backend_warm_up_flag() {
        let backend = MockBackend::new("m");
        assert!(!backend.is_warmed());
        backend.warm_up().unwrap();
        assert!(backend.is_warmed());
    }

    #[test]
    fn test_mock_backend_failing_warm_up() {
        let backend = MockBackend::new("m").with_failing_warm_up();
        assert!(backend.warm_up().is_err());
        assert!(!backend.is_warmed());
    }

    #[test]
    fn test_first_move_sampler() {
        let sampler = FirstMoveSampler;
        assert_eq!(sampler.sample(&[]), None);
        let priors = [PolicyEntry {
            move_index: 33,
            prior: 1.0,
        }];
        assert_eq!(sampler.sample(&priors), Some(33));
    }
}
