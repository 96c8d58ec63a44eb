//! Batched-evaluation scheduling layer between tree-search workers and the
//! neural-network inference backends they depend on.
//!
//! Exposes one or two primary evaluation lanes (two when overlapped
//! execution is configured, so host-side traversal for one lane can hide
//! the other lane's backend latency), plus an optional uncached auxiliary
//! lane for an experimental network. Uses trait-based abstraction so the
//! scheduling logic can be tested with mocks (no real network).
//!
//! # Key types
//!
//! - [`BatchCoordinator`] — owns the lanes, per-lane batch params, and the
//!   apply-stage handle
//! - [`Lane`] — a single evaluation path: backend + optional shared cache
//! - [`EvalBackend`] — trait for inference backends
//! - [`EvalCache`] — tree-wide position cache shared by caching lanes
//! - [`BatchParams`] — per-lane virtual-loss controller
//! - [`CoordinatorConfig`] / [`EvaluatorConfig`] — configuration bundle,
//!   loadable from TOML

pub mod apply;
pub mod backend;
pub mod batch_params;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod lane;
pub mod mocks;
pub mod types;

pub use apply::{ApplyStage, MoveSampler};
pub use backend::{EvalBackend, EvalError};
pub use batch_params::{BatchParams, BatchingMode};
pub use cache::EvalCache;
pub use config::{CacheMode, CoordinatorConfig, EvaluatorConfig, EvaluatorRole};
pub use coordinator::{BackendSlot, BatchCoordinator, PrimaryLanes};
pub use lane::Lane;
pub use types::{Evaluation, PolicyEntry, Position};
