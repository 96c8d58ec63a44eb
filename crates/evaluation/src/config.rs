//! Configuration bundle for the coordinator, loadable from TOML.

/// Whether lanes built from a configuration may consult the shared cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    Disabled,
    Enabled,
}

/// Whether an evaluator definition drives the primary lanes or the
/// auxiliary/experimental lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluatorRole {
    Primary,
    Auxiliary,
}

/// Definition of one inference backend as it appears in the configuration
/// bundle. Read-only to the coordinator.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct EvaluatorConfig {
    /// Identifier of the backend this definition resolves to.
    pub backend_id: String,

    /// Cache eligibility for lanes built from this definition. Ignored for
    /// auxiliary definitions, whose lanes are always uncached.
    #[serde(default = "default_cache_mode")]
    pub cache_mode: CacheMode,

    #[serde(default = "default_role")]
    pub role: EvaluatorRole,
}

impl EvaluatorConfig {
    /// Primary definition with caching enabled.
    pub fn primary(backend_id: &str) -> Self {
        Self {
            backend_id: backend_id.to_string(),
            cache_mode: CacheMode::Enabled,
            role: EvaluatorRole::Primary,
        }
    }

    /// Auxiliary/experimental definition.
    pub fn auxiliary(backend_id: &str) -> Self {
        Self {
            backend_id: backend_id.to_string(),
            cache_mode: CacheMode::Disabled,
            role: EvaluatorRole::Auxiliary,
        }
    }

    /// Primary definition with caching disabled.
    pub fn primary_uncached(backend_id: &str) -> Self {
        Self {
            backend_id: backend_id.to_string(),
            cache_mode: CacheMode::Disabled,
            role: EvaluatorRole::Primary,
        }
    }
}

/// Coordinator construction parameters.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CoordinatorConfig {
    /// Run two primary lanes on disjoint worker groups so host-side
    /// traversal for one lane hides the other lane's backend latency.
    /// Requires a second backend handle.
    #[serde(default)]
    pub overlapped: bool,

    /// Eagerly warm all configured backends during construction. Off by
    /// default: warm-up lengthens startup and forces initialization of
    /// backends that may never be used.
    #[serde(default)]
    pub eager_warm_up: bool,

    /// Use dynamic (occupancy-derived) virtual loss instead of the fixed
    /// base value.
    #[serde(default)]
    pub dynamic_batching: bool,

    /// Base virtual-loss penalty applied to nodes entering the in-flight
    /// batch.
    #[serde(default = "default_base_virtual_loss")]
    pub base_virtual_loss: f32,

    /// Capacity of the shared evaluation cache, in positions. Consumed by
    /// `EvalCache::from_config`; callers building the cache by hand choose
    /// their own capacity.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

fn default_cache_mode() -> CacheMode {
    CacheMode::Enabled
}
fn default_role() -> EvaluatorRole {
    EvaluatorRole::Primary
}
fn default_base_virtual_loss() -> f32 {
    1.0
}
fn default_cache_capacity() -> usize {
    1 << 20
}

impl CoordinatorConfig {
    /// Log warnings for suspicious tunings.
    pub fn validate(&self) {
        if self.base_virtual_loss <= 0.0 {
            tracing::warn!(
                base_virtual_loss = self.base_virtual_loss,
                "non-positive virtual loss will not discourage re-selection"
            );
        }
        if self.cache_capacity == 0 {
            tracing::warn!("cache_capacity = 0; treating as 1");
        }
    }
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            overlapped: false,
            eager_warm_up: false,
            dynamic_batching: false,
            base_virtual_loss: default_base_virtual_loss(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let cfg = CoordinatorConfig::default();
        assert!(!cfg.overlapped);
        assert!(!cfg.eager_warm_up);
        assert!(!cfg.dynamic_batching);
        assert!((cfg.base_virtual_loss - 1.0).abs() < 1e-9);
        assert_eq!(cfg.cache_capacity, 1 << 20);
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r#"
            overlapped = true
            base_virtual_loss = 2.5
        "#;
        let cfg: CoordinatorConfig = toml::from_str(toml_str).unwrap();
        assert!(cfg.overlapped);
        assert!((cfg.base_virtual_loss - 2.5).abs() < 1e-6);
        // Defaults for unspecified fields
        assert!(!cfg.eager_warm_up);
        assert_eq!(cfg.cache_capacity, 1 << 20);
    }

    #[test]
    fn test_full_toml() {
        let toml_str = r#"
            overlapped = true
            eager_warm_up = true
            dynamic_batching = true
            base_virtual_loss = 0.75
            cache_capacity = 4096
        "#;
        let cfg: CoordinatorConfig = toml::from_str(toml_str).unwrap();
        assert!(cfg.overlapped);
        assert!(cfg.eager_warm_up);
        assert!(cfg.dynamic_batching);
        assert!((cfg.base_virtual_loss - 0.75).abs() < 1e-6);
        assert_eq!(cfg.cache_capacity, 4096);
    }

    #[test]
    fn test_evaluator_config_toml() {
        let toml_str = r#"
            backend_id = "lc0-t78"
            cache_mode = "disabled"
            role = "auxiliary"
        "#;
        let cfg: EvaluatorConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.backend_id, "lc0-t78");
        assert_eq!(cfg.cache_mode, CacheMode::Disabled);
        assert_eq!(cfg.role, EvaluatorRole::Auxiliary);
    }

    #[test]
    fn test_evaluator_config_defaults() {
        let toml_str = r#"
            backend_id = "main"
        "#;
        let cfg: EvaluatorConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.cache_mode, CacheMode::Enabled);
        assert_eq!(cfg.role, EvaluatorRole::Primary);
    }

    #[test]
    fn test_validate_degenerate_does_not_panic() {
        let cfg = CoordinatorConfig {
            base_virtual_loss: 0.0,
            cache_capacity: 0,
            ..Default::default()
        };
        cfg.validate(); // Should log warnings but not panic
    }
}
