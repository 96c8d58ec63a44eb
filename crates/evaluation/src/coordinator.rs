//! Coordinator wiring the configuration bundle into concrete lanes.

use std::sync::Arc;

use platform::HardwareContext;

use crate::apply::{ApplyStage, MoveSampler};
use crate::backend::{EvalBackend, EvalError};
use crate::batch_params::{BatchParams, BatchingMode};
use crate::cache::EvalCache;
use crate::config::{CacheMode, CoordinatorConfig, EvaluatorConfig, EvaluatorRole};
use crate::lane::Lane;

/// One configured backend: its definition from the bundle plus the
/// resolved handle, shared with the coordinator's backend pool.
pub struct BackendSlot {
    pub definition: EvaluatorConfig,
    pub handle: Arc<dyn EvalBackend>,
}

impl BackendSlot {
    pub fn new(definition: EvaluatorConfig, handle: Arc<dyn EvalBackend>) -> Self {
        Self { definition, handle }
    }
}

/// The primary lanes, exhaustive over the two supported shapes.
pub enum PrimaryLanes {
    Single(Lane),
    /// Two lanes driven by disjoint worker groups; traversal for one
    /// proceeds while the other's backend call is in flight.
    Overlapped(Lane, Lane),
}

impl PrimaryLanes {
    pub fn count(&self) -> usize {
        match self {
            PrimaryLanes::Single(_) => 1,
            PrimaryLanes::Overlapped(_, _) => 2,
        }
    }

    pub fn get(&self, index: usize) -> Option<&Lane> {
        match (self, index) {
            (PrimaryLanes::Single(lane), 0) => Some(lane),
            (PrimaryLanes::Overlapped(lane, _), 0) => Some(lane),
            (PrimaryLanes::Overlapped(_, lane), 1) => Some(lane),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lane> {
        let (first, second) = match self {
            PrimaryLanes::Single(lane) => (lane, None),
            PrimaryLanes::Overlapped(a, b) => (a, Some(b)),
        };
        std::iter::once(first).chain(second)
    }
}

/// Owns the primary lanes, the optional auxiliary lane, one [`BatchParams`]
/// per primary lane, and the apply-stage handle.
///
/// Construction is total: it fully succeeds or fails synchronously with an
/// [`EvalError::Config`], and performs no implicit retries. Beyond the
/// optional eager warm-up it starts no background work.
pub struct BatchCoordinator {
    primary: PrimaryLanes,
    auxiliary: Option<Lane>,
    batch_params: Vec<BatchParams>,
    apply_stage: ApplyStage,
    cache: Option<Arc<EvalCache>>,
}

impl std::fmt::Debug for BatchCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchCoordinator").finish_non_exhaustive()
    }
}

impl BatchCoordinator {
    /// Build lanes and per-lane batch params from the configuration bundle.
    ///
    /// `hardware` must have passed `verify_compatibility` first; no
    /// backend warm-up or evaluation may be scheduled before the gate.
    /// `shared_cache` is the tree-wide cache owned by the caller; primary
    /// lanes reference it only when the primary definition enables caching,
    /// and the auxiliary lane never does.
    pub fn new(
        config: CoordinatorConfig,
        primary: BackendSlot,
        second: Option<BackendSlot>,
        auxiliary: Option<BackendSlot>,
        shared_cache: Arc<EvalCache>,
        sampler: Arc<dyn MoveSampler>,
        hardware: &HardwareContext,
    ) -> Result<Self, EvalError> {
        config.validate();
        if !hardware.is_validated() {
            return Err(EvalError::Config(
                "hardware compatibility must be verified before constructing the coordinator"
                    .into(),
            ));
        }
        if primary.definition.role != EvaluatorRole::Primary {
            return Err(EvalError::Config(format!(
                "backend '{}' supplied as primary carries an auxiliary definition",
                primary.definition.backend_id
            )));
        }
        if let Some(slot) = &auxiliary {
            if slot.definition.role != EvaluatorRole::Auxiliary {
                return Err(EvalError::Config(format!(
                    "backend '{}' supplied as auxiliary carries a primary definition",
                    slot.definition.backend_id
                )));
            }
        }

        // Cache eligibility is decided once, from the primary definition.
        let cache_enabled = primary.definition.cache_mode != CacheMode::Disabled;
        let lane_cache = cache_enabled.then(|| Arc::clone(&shared_cache));

        let primary_lanes = if config.overlapped {
            let second = second.ok_or_else(|| {
                EvalError::Config("missing second backend for overlapped execution".into())
            })?;
            if second.definition.role != EvaluatorRole::Primary {
                return Err(EvalError::Config(format!(
                    "backend '{}' supplied as second primary carries an auxiliary definition",
                    second.definition.backend_id
                )));
            }
            // Overlap hides one lane's backend latency behind the other's
            // traversal, which requires two independent backends. A shared
            // handle serializes both lanes on the same device.
            if Arc::ptr_eq(&primary.handle, &second.handle) {
                tracing::warn!(
                    backend = primary.definition.backend_id,
                    "overlapped lanes share one backend handle; overlap gains nothing"
                );
            }
            PrimaryLanes::Overlapped(
                Lane::new(Arc::clone(&primary.handle), lane_cache.clone(), true, 0),
                Lane::new(Arc::clone(&second.handle), lane_cache.clone(), true, 1),
            )
        } else {
            if let Some(unused) = &second {
                tracing::warn!(
                    backend = unused.definition.backend_id,
                    "second backend ignored: overlapped execution not requested"
                );
            }
            PrimaryLanes::Single(Lane::new(
                Arc::clone(&primary.handle),
                lane_cache.clone(),
                true,
                0,
            ))
        };

        // The auxiliary lane has no cache of its own in the current design
        // and must not be routed through the primary cache: its network's
        // outputs are not interchangeable with the primary's. Its index
        // follows the last primary lane.
        let aux_index = primary_lanes.count();
        let auxiliary_lane = auxiliary.map(|slot| Lane::new(slot.handle, None, false, aux_index));

        // One independent BatchParams per primary lane. Overlapped lanes run
        // concurrently on disjoint worker groups; shared statistics would
        // corrupt each lane's estimate of its own batch-fill behavior.
        let mode = if config.dynamic_batching {
            BatchingMode::Dynamic
        } else {
            BatchingMode::Fixed
        };
        let batch_params = (0..primary_lanes.count())
            .map(|_| BatchParams::new(mode, config.base_virtual_loss))
            .collect();

        let coordinator = Self {
            primary: primary_lanes,
            auxiliary: auxiliary_lane,
            batch_params,
            apply_stage: ApplyStage::new(sampler),
            cache: lane_cache,
        };

        tracing::info!(
            primary_lanes = coordinator.primary.count(),
            auxiliary = coordinator.auxiliary.is_some(),
            cached = cache_enabled,
            "Evaluation coordinator constructed"
        );

        if config.eager_warm_up {
            coordinator.warm_up()?;
        }
        Ok(coordinator)
    }

    /// Eagerly initialize every configured backend.
    ///
    /// Overlapped primaries warm as a two-task fork-join: each task
    /// exclusively owns one backend's initialization, both are joined
    /// before proceeding, and the first failure propagates to the caller.
    pub fn warm_up(&self) -> Result<(), EvalError> {
        match &self.primary {
            PrimaryLanes::Single(lane) => lane.warm_up()?,
            PrimaryLanes::Overlapped(first, second) => {
                std::thread::scope(|scope| {
                    let a = scope.spawn(|| first.warm_up());
                    let b = scope.spawn(|| second.warm_up());
                    let ra = a.join().expect("warm-up task panicked");
                    let rb = b.join().expect("warm-up task panicked");
                    ra.and(rb)
                })?;
            }
        }
        if let Some(aux) = &self.auxiliary {
            aux.warm_up()?;
        }
        Ok(())
    }

    /// The primary lane shape (one lane, or two overlapped lanes).
    pub fn primary_lanes(&self) -> &PrimaryLanes {
        &self.primary
    }

    /// Primary lane by index, if configured.
    pub fn lane(&self, index: usize) -> Option<&Lane> {
        self.primary.get(index)
    }

    /// The auxiliary/experimental lane, if configured. Always uncached.
    pub fn auxiliary_lane(&self) -> Option<&Lane> {
        self.auxiliary.as_ref()
    }

    /// Batch params for the primary lane at `index`.
    pub fn batch_params(&self, index: usize) -> Option<&BatchParams> {
        self.batch_params.get(index)
    }

    pub fn num_primary_lanes(&self) -> usize {
        self.primary.count()
    }

    pub fn apply_stage(&self) -> &ApplyStage {
        &self.apply_stage
    }

    /// The shared cache, when caching is enabled for the primary lanes.
    pub fn cache(&self) -> Option<&Arc<EvalCache>> {
        self.cache.as_ref()
    }
}
