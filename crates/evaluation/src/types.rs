/// A search-tree leaf position submitted for evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    /// Canonical transposition key. Positions with equal keys are treated
    /// as identical by the cache.
    pub key: u64,
    /// Backend-specific encoded input planes.
    pub planes: Vec<f32>,
}

impl Position {
    /// Position with a key and no encoding (sufficient for mocked backends).
    pub fn from_key(key: u64) -> Self {
        Self {
            key,
            planes: Vec::new(),
        }
    }
}

/// One move prior from the network's policy head.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyEntry {
    /// Move index in the backend's move encoding.
    pub move_index: u16,
    /// Prior probability assigned to the move.
    pub prior: f32,
}

/// Network output for a single position.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Position value in [-1, 1] from the side to move's perspective.
    pub value: f32,
    /// Policy priors over legal moves.
    pub policy: Vec<PolicyEntry>,
}
