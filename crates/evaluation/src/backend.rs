//! Inference backend trait and the layer's error taxonomy.

use crate::types::{Evaluation, Position};

/// Errors surfaced by the evaluation scheduling layer.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// Inconsistent or missing backend wiring at construction time.
    /// Surfaced synchronously; search must not proceed.
    #[error("configuration error: {0}")]
    Config(String),
    /// Failure inside an inference backend, propagated uninterpreted.
    #[error("backend error: {0}")]
    Backend(#[source] anyhow::Error),
}

/// A neural-network inference backend serving single-position requests.
///
/// Sync trait — lanes block the calling search worker until the backend
/// returns; there is no non-blocking or cancellable variant at this layer.
/// Implementations must tolerate concurrent calls from the worker group
/// bound to their lane.
pub trait EvalBackend: Send + Sync {
    /// Evaluate one position. Failures propagate to the caller; the lane
    /// performs no retry.
    fn evaluate(&self, position: &Position) -> Result<Evaluation, EvalError>;

    /// Force initialization of lazily-loaded backend state (weights,
    /// device buffers). Called only when eager warm-up is configured.
    fn warm_up(&self) -> Result<(), EvalError> {
        Ok(())
    }

    /// Short backend identifier for diagnostics.
    fn name(&self) -> &str {
        "unnamed"
    }
}
