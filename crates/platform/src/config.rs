/// Tunable constants for the affinity-restriction heuristic.
///
/// The defaults are empirical: on multi-socket hosts, confining the process
/// to half the logical processors keeps the search workers on one socket's
/// memory; on single-socket hosts, search throughput stops scaling past
/// roughly 32 workers.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct AffinityConfig {
    /// Processor cap on single-socket hosts.
    #[serde(default = "default_single_socket_cap")]
    pub single_socket_cap: usize,

    /// Divisor applied to the logical processor total on multi-socket hosts.
    #[serde(default = "default_multi_socket_divisor")]
    pub multi_socket_divisor: usize,
}

fn default_single_socket_cap() -> usize {
    32
}
fn default_multi_socket_divisor() -> usize {
    2
}

impl AffinityConfig {
    /// Log a warning for degenerate tunings.
    pub fn validate(&self) {
        if self.single_socket_cap == 0 {
            tracing::warn!("single_socket_cap = 0 disables all workers; treating as 1");
        }
        if self.multi_socket_divisor == 0 {
            tracing::warn!("multi_socket_divisor = 0 is invalid; treating as 1");
        }
    }
}

impl Default for AffinityConfig {
    fn default() -> Self {
        Self {
            single_socket_cap: default_single_socket_cap(),
            multi_socket_divisor: default_multi_socket_divisor(),
        }
    }
}
