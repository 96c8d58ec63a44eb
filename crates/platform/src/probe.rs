//! Trait seam over the host machine, plus the real `SystemProbe`.

use crate::types::{AffinityError, OsFamily};

/// Queries and mutations against the host machine.
///
/// The gate only talks to the machine through this trait so that the
/// validation and affinity logic can be exercised with mocked topology
/// (see [`crate::mocks::MockProbe`]).
pub trait HardwareProbe: Send + Sync {
    /// Total logical processors visible to the process.
    fn total_logical_processors(&self) -> usize;

    /// Number of physical CPU sockets (packages).
    fn socket_count(&self) -> usize;

    /// Whether the processor supports the vector capability the
    /// evaluation hot paths assume.
    fn has_required_vector_support(&self) -> bool;

    /// Operating-system family of the running process.
    fn os_family(&self) -> OsFamily;

    /// OS version string, when the platform reports one.
    fn os_version(&self) -> Option<String>;

    /// Physical memory size in bytes, recomputed on every call.
    fn physical_memory_bytes(&self) -> u64;

    /// Narrow the process affinity mask to the first `n` logical processors.
    fn restrict_to_first_processors(&self, n: usize) -> Result<(), AffinityError>;
}

/// Vector capability required by the downstream numeric hot paths.
pub const REQUIRED_VECTOR_CAPABILITY: &str = "avx2";

/// [`HardwareProbe`] backed by the real machine.
pub struct SystemProbe;

impl SystemProbe {
    pub fn new() -> Self {
        SystemProbe
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareProbe for SystemProbe {
    fn total_logical_processors(&self) -> usize {
        num_cpus::get()
    }

    fn socket_count(&self) -> usize {
        #[cfg(target_os = "linux")]
        {
            // Distinct "physical id" values in /proc/cpuinfo, one per socket.
            if let Ok(info) = std::fs::read_to_string("/proc/cpuinfo") {
                let ids: std::collections::HashSet<&str> = info
                    .lines()
                    .filter(|l| l.starts_with("physical id"))
                    .filter_map(|l| l.split(':').nth(1))
                    .map(|v| v.trim())
                    .collect();
                if !ids.is_empty() {
                    return ids.len();
                }
            }
        }
        1
    }

    fn has_required_vector_support(&self) -> bool {
        #[cfg(target_arch = "x86_64")]
        {
            std::arch::is_x86_feature_detected!("avx2")
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            // NEON is baseline on aarch64; nothing to gate on.
            true
        }
    }

    fn os_family(&self) -> OsFamily {
        OsFamily::current()
    }

    fn os_version(&self) -> Option<String> {
        sysinfo::System::os_version()
    }

    fn physical_memory_bytes(&self) -> u64 {
        let mut sys = sysinfo::System::new();
        sys.refresh_memory();
        sys.total_memory()
    }

    #[cfg(target_os = "linux")]
    fn restrict_to_first_processors(&self, n: usize) -> Result<(), AffinityError> {
        use nix::sched::{sched_setaffinity, CpuSet};
        use nix::unistd::Pid;

        let mut set = CpuSet::new();
        for cpu in 0..n {
            set.set(cpu)
                .map_err(|e| AffinityError(format!("cpu {cpu} out of mask range: {e}")))?;
        }
        // Pid 0 targets the calling process.
        sched_setaffinity(Pid::from_raw(0), &set).map_err(|e| AffinityError(e.to_string()))
    }

    #[cfg(not(target_os = "linux"))]
    fn restrict_to_first_processors(&self, _n: usize) -> Result<(), AffinityError> {
        Err(AffinityError(
            "process-wide affinity masks are not supported on this platform".into(),
        ))
    }
}
