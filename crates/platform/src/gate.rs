//! One-shot hardware validation and affinity restriction.

use crate::config::AffinityConfig;
use crate::probe::{HardwareProbe, SystemProbe, REQUIRED_VECTOR_CAPABILITY};
use crate::types::{OsFamily, PlatformError};

/// Minimum supported macOS major version.
const MIN_MACOS_MAJOR: u32 = 11;

/// Lifecycle of the gate. Transitions are one-way only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Uninitialized,
    Validated,
    AffinityRestricted,
}

/// Hardware capability gate, created once at process startup and passed by
/// reference to every consumer.
///
/// Replaces an ambient process-wide singleton with an explicit context
/// object: "validated exactly once" is enforced by an internal one-shot
/// state machine rather than global flags. Must be validated before any
/// evaluation work is scheduled; the coordinator refuses construction
/// against an unvalidated context.
pub struct HardwareContext {
    probe: Box<dyn HardwareProbe>,
    affinity: AffinityConfig,
    state: GateState,
    affinity_initialized: bool,
    total_logical: usize,
    usable: usize,
}

impl HardwareContext {
    /// Create a context backed by the real machine.
    pub fn new(affinity: AffinityConfig) -> Self {
        Self::with_probe(Box::new(SystemProbe::new()), affinity)
    }

    /// Create a context backed by an explicit probe (mocks in tests).
    pub fn with_probe(probe: Box<dyn HardwareProbe>, affinity: AffinityConfig) -> Self {
        affinity.validate();
        let total_logical = probe.total_logical_processors();
        Self {
            probe,
            affinity,
            state: GateState::Uninitialized,
            affinity_initialized: false,
            total_logical,
            usable: total_logical,
        }
    }

    /// Check OS family, minimum OS version, and vector capability.
    ///
    /// Must be called exactly once, before any inference work is scheduled.
    /// A second call returns [`PlatformError::AlreadyValidated`].
    pub fn verify_compatibility(&mut self) -> Result<(), PlatformError> {
        if self.state != GateState::Uninitialized {
            return Err(PlatformError::AlreadyValidated);
        }

        let family = self.probe.os_family();
        match &family {
            OsFamily::Linux | OsFamily::Windows => {}
            OsFamily::MacOs => {
                let found = self.probe.os_version().unwrap_or_default();
                if major_version(&found).map_or(true, |m| m < MIN_MACOS_MAJOR) {
                    return Err(PlatformError::OsVersionTooOld {
                        family,
                        found,
                        required: format!("{MIN_MACOS_MAJOR}.0"),
                    });
                }
            }
            OsFamily::Other(_) => {
                return Err(PlatformError::UnsupportedOsFamily(family));
            }
        }

        // The numeric hot paths assume this capability unconditionally;
        // without it they risk silent wrong answers or a hard fault, so
        // the gate refuses to proceed at all.
        if !self.probe.has_required_vector_support() {
            return Err(PlatformError::MissingVectorSupport(REQUIRED_VECTOR_CAPABILITY));
        }

        self.state = GateState::Validated;
        tracing::info!(
            family = %family,
            total_logical = self.total_logical,
            "Hardware compatibility verified"
        );
        Ok(())
    }

    /// [`verify_compatibility`](Self::verify_compatibility), terminating the
    /// process with a diagnostic on any unmet requirement.
    pub fn verify_compatibility_or_exit(&mut self) {
        if let Err(e) = self.verify_compatibility() {
            tracing::error!(error = %e, "Platform incompatible, aborting");
            eprintln!("fatal: {e}");
            std::process::exit(1);
        }
    }

    /// Optionally narrow the process affinity for memory locality.
    ///
    /// No-op when `restrict_to_single_socket` is false. Otherwise the cap is
    /// `total / multi_socket_divisor` (minimum 1) on multi-socket hosts, else
    /// `min(single_socket_cap, total)`; the mask is only narrowed when the
    /// cap is below the total. At most one call per process lifetime; a
    /// failure narrowing the mask is logged and swallowed because affinity
    /// is a locality optimization, not a correctness requirement.
    pub fn initialize_affinity(
        &mut self,
        restrict_to_single_socket: bool,
    ) -> Result<(), PlatformError> {
        if self.state == GateState::Uninitialized {
            return Err(PlatformError::NotValidated("initializing affinity"));
        }
        if self.affinity_initialized {
            return Err(PlatformError::AffinityAlreadyInitialized);
        }
        self.affinity_initialized = true;

        if !restrict_to_single_socket {
            return Ok(());
        }

        let total = self.total_logical;
        let sockets = self.probe.socket_count();
        let cap = if sockets > 1 {
            (total / self.affinity.multi_socket_divisor.max(1)).max(1)
        } else {
            self.affinity.single_socket_cap.max(1).min(total)
        };

        if cap >= total {
            tracing::debug!(total, sockets, "Affinity cap not below total, leaving mask alone");
            return Ok(());
        }

        match self.probe.restrict_to_first_processors(cap) {
            Ok(()) => {
                self.usable = cap;
                self.state = GateState::AffinityRestricted;
                tracing::info!(total, cap, sockets, "Restricted process affinity");
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    cap,
                    "Affinity restriction failed, continuing unrestricted"
                );
            }
        }
        Ok(())
    }

    /// Logical processors this process is intended to use (≤ total).
    pub fn usable_processor_count(&self) -> usize {
        self.usable
    }

    /// Total logical processors on the host.
    pub fn total_logical_processors(&self) -> usize {
        self.total_logical
    }

    /// Physical memory size in bytes. Queried fresh on every call.
    pub fn memory_size(&self) -> u64 {
        self.probe.physical_memory_bytes()
    }

    /// Whether `verify_compatibility` has succeeded.
    pub fn is_validated(&self) -> bool {
        self.state != GateState::Uninitialized
    }

    /// Whether an affinity mask was actually applied.
    pub fn affinity_applied(&self) -> bool {
        self.state == GateState::AffinityRestricted
    }
}

/// Parse the leading major component of a dotted version string.
fn major_version(version: &str) -> Option<u32> {
    version.split('.').next()?.trim().parse().ok()
}
