//! A single evaluation lane: one backend handle plus an optional shared
//! cache reference.

use std::sync::Arc;

use crate::backend::{EvalBackend, EvalError};
use crate::cache::EvalCache;
use crate::types::{Evaluation, Position};

/// An independent evaluation path serving one worker group.
///
/// Created once at coordinator construction and immutable thereafter. The
/// backend handle is shared with the coordinator's backend pool, and the
/// cache (when present) is the tree-wide instance shared with the other
/// caching lane.
pub struct Lane {
    backend: Arc<dyn EvalBackend>,
    cache: Option<Arc<EvalCache>>,
    priority: bool,
    index: usize,
}

impl Lane {
    pub fn new(
        backend: Arc<dyn EvalBackend>,
        cache: Option<Arc<EvalCache>>,
        priority: bool,
        index: usize,
    ) -> Self {
        Self {
            backend,
            cache,
            priority,
            index,
        }
    }

    /// Evaluate one leaf position, blocking the calling worker.
    ///
    /// With caching enabled: cache hit returns without touching the
    /// backend; on a miss the backend result is stored and returned.
    /// Concurrent misses for the same position are not deduplicated: the
    /// backend may run twice and both results are equivalent, so either
    /// insert wins. Backend failures propagate uninterpreted; no retry.
    pub fn evaluate(&self, position: &Position) -> Result<Evaluation, EvalError> {
        let Some(cache) = &self.cache else {
            return self.backend.evaluate(position);
        };

        if let Some(hit) = cache.get(position.key) {
            return Ok(hit);
        }
        let eval = self.backend.evaluate(position)?;
        cache.put(position.key, eval.clone());
        Ok(eval)
    }

    /// Force backend initialization. Used by the coordinator's eager
    /// warm-up pass.
    pub fn warm_up(&self) -> Result<(), EvalError> {
        tracing::debug!(lane = self.index, backend = self.backend.name(), "Warming backend");
        self.backend.warm_up()
    }

    /// Whether this lane consults the shared cache.
    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// Whether this is a priority (primary) lane.
    pub fn priority(&self) -> bool {
        self.priority
    }

    /// Lane index as assigned by the coordinator.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Diagnostic name of the underlying backend.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }
}
