//! Apply-stage boundary: where evaluated leaves leave this layer.
//!
//! Result application into the search tree lives outside this core; only
//! the construction seam is owned here. The coordinator builds one
//! [`ApplyStage`] bound to an externally supplied move-sampling policy and
//! never mutates the tree itself.

use std::sync::Arc;

use crate::types::PolicyEntry;

/// Externally supplied move-sampling policy consulted by the apply stage.
pub trait MoveSampler: Send + Sync {
    /// Pick a move index from the evaluated priors, or `None` when the
    /// position has no legal moves.
    fn sample(&self, priors: &[PolicyEntry]) -> Option<u16>;
}

/// Handle consuming evaluated leaves on behalf of the (external) tree
/// updater.
pub struct ApplyStage {
    sampler: Arc<dyn MoveSampler>,
}

impl ApplyStage {
    pub fn new(sampler: Arc<dyn MoveSampler>) -> Self {
        Self { sampler }
    }

    /// The bound move-sampling policy.
    pub fn sampler(&self) -> &dyn MoveSampler {
        self.sampler.as_ref()
    }
}
