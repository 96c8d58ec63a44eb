//! Integration tests for the platform crate: the full bootstrap sequence
//! (verify → affinity → read accessors) against mocked topology, plus a
//! smoke test against the real machine.

use platform::mocks::MockProbe;
use platform::{AffinityConfig, HardwareContext, OsFamily, PlatformError};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn dual_socket_probe(total: usize) -> MockProbe {
    let mut probe = MockProbe::new();
    probe.total_logical = total;
    probe.sockets = 2;
    probe
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn test_full_bootstrap_sequence() {
    let probe = dual_socket_probe(64);
    let recorder = probe.restriction_recorder();

    let mut hardware = HardwareContext::with_probe(Box::new(probe), AffinityConfig::default());
    hardware.verify_compatibility().expect("supported mock host");
    hardware.initialize_affinity(true).expect("first affinity call");

    assert!(hardware.is_validated());
    assert!(hardware.affinity_applied());
    assert_eq!(hardware.usable_processor_count(), 32);
    assert_eq!(hardware.total_logical_processors(), 64);
    assert_eq!(*recorder.lock().unwrap(), Some(32));

    // The gate is one-shot in both directions
    assert!(matches!(
        hardware.verify_compatibility(),
        Err(PlatformError::AlreadyValidated)
    ));
    assert!(matches!(
        hardware.initialize_affinity(true),
        Err(PlatformError::AffinityAlreadyInitialized)
    ));
}

#[test]
fn test_incompatible_host_is_reported_before_any_scheduling() {
    let mut probe = MockProbe::new();
    probe.vector_support = false;
    let mut hardware = HardwareContext::with_probe(Box::new(probe), AffinityConfig::default());

    let err = hardware.verify_compatibility().unwrap_err();
    assert!(err.to_string().contains("avx2"), "diagnostic names the capability: {err}");
    assert!(!hardware.is_validated());

    // Affinity is refused until validation succeeds
    assert!(matches!(
        hardware.initialize_affinity(true),
        Err(PlatformError::NotValidated(_))
    ));
}

#[test]
fn test_windows_family_needs_no_version_check() {
    let mut probe = MockProbe::new();
    probe.family = OsFamily::Windows;
    probe.version = None;
    let mut hardware = HardwareContext::with_probe(Box::new(probe), AffinityConfig::default());
    hardware.verify_compatibility().unwrap();
}

#[test]
fn test_real_machine_accessors() {
    // Smoke test against the actual host; only sanity bounds are asserted.
    let hardware = HardwareContext::new(AffinityConfig::default());
    assert!(hardware.total_logical_processors() >= 1);
    assert!(hardware.usable_processor_count() >= 1);
    assert!(hardware.memory_size() > 0);
}
