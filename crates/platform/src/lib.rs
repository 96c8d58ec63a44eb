//! Hardware capability gate for the evaluation scheduling layer.
//!
//! Validates platform prerequisites once at process startup (OS family,
//! minimum OS version, required vector instruction support) and optionally
//! narrows process affinity to trade total parallelism for memory locality.
//! The machine is hidden behind the [`HardwareProbe`] trait so the gate can
//! be tested with mocks (no real affinity syscalls).
//!
//! # Key types
//!
//! - [`HardwareContext`] — the one-shot validation/affinity state machine
//! - [`HardwareProbe`] / [`SystemProbe`] — trait seam over the host machine
//! - [`AffinityConfig`] — tunable affinity-cap constants
//! - [`PlatformError`] — fatal incompatibilities and state violations
//!
//! # Quick start
//!
//! ```rust,no_run
//! use platform::{AffinityConfig, HardwareContext};
//!
//! let mut hardware = HardwareContext::new(AffinityConfig::default());
//! hardware.verify_compatibility_or_exit();
//! hardware.initialize_affinity(true).expect("affinity already initialized");
//! let workers = hardware.usable_processor_count();
//! ```

pub mod config;
pub mod gate;
pub mod mocks;
pub mod probe;
pub mod types;

pub use config::AffinityConfig;
pub use gate::HardwareContext;
pub use probe::{HardwareProbe, SystemProbe};
pub use types::{AffinityError, OsFamily, PlatformError};
