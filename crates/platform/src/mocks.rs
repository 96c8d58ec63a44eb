//! Mock hardware probe for testing the gate without real affinity syscalls.

use std::sync::{Arc, Mutex};

use crate::probe::HardwareProbe;
use crate::types::{AffinityError, OsFamily};

/// [`HardwareProbe`] with scripted topology and a recorded affinity mask.
pub struct MockProbe {
    /// Logical processors reported to the gate.
    pub total_logical: usize,
    /// Socket count reported to the gate.
    pub sockets: usize,
    /// Whether the required vector capability is reported present.
    pub vector_support: bool,
    /// Reported OS family.
    pub family: OsFamily,
    /// Reported OS version string.
    pub version: Option<String>,
    /// Reported physical memory size in bytes.
    pub memory_bytes: u64,
    /// When true, affinity restriction fails with an error.
    pub fail_affinity: bool,
    restricted_to: Arc<Mutex<Option<usize>>>,
}

impl Default for MockProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProbe {
    /// A compatible 8-way single-socket Linux host.
    pub fn new() -> Self {
        Self {
            total_logical: 8,
            sockets: 1,
            vector_support: true,
            family: OsFamily::Linux,
            version: Some("6.1".to_string()),
            memory_bytes: 16 * 1024 * 1024 * 1024,
            fail_affinity: false,
            restricted_to: Arc::new(Mutex::new(None)),
        }
    }

    /// Handle to the recorded affinity restriction (the `n` of the last
    /// successful `restrict_to_first_processors` call, if any). Clone this
    /// before handing the probe to a `HardwareContext`.
    pub fn restriction_recorder(&self) -> Arc<Mutex<Option<usize>>> {
        Arc::clone(&self.restricted_to)
    }
}

impl HardwareProbe for MockProbe {
    fn total_logical_processors(&self) -> usize {
        self.total_logical
    }

    fn socket_count(&self) -> usize {
        self.sockets
    }

    fn has_required_vector_support(&self) -> bool {
        self.vector_support
    }

    fn os_family(&self) -> OsFamily {
        self.family.clone()
    }

    fn os_version(&self) -> Option<String> {
        self.version.clone()
    }

    fn physical_memory_bytes(&self) -> u64 {
        self.memory_bytes
    }

    fn restrict_to_first_processors(&self, n: usize) -> Result<(), AffinityError> {
        if self.fail_affinity {
            return Err(AffinityError("mock affinity failure".into()));
        }
        *self.restricted_to.lock().unwrap() = Some(n);
        Ok(())
    }
}
