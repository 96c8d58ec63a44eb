use std::fmt;

/// Operating-system family as seen by the compatibility gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OsFamily {
    Linux,
    MacOs,
    Windows,
    /// Anything else (`std::env::consts::OS` value carried for diagnostics).
    Other(String),
}

impl OsFamily {
    /// Detect the family of the running process.
    pub fn current() -> Self {
        match std::env::consts::OS {
            "linux" => OsFamily::Linux,
            "macos" => OsFamily::MacOs,
            "windows" => OsFamily::Windows,
            other => OsFamily::Other(other.to_string()),
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsFamily::Linux => write!(f, "linux"),
            OsFamily::MacOs => write!(f, "macos"),
            OsFamily::Windows => write!(f, "windows"),
            OsFamily::Other(name) => write!(f, "{name}"),
        }
    }
}

/// Non-fatal failure while narrowing processor affinity.
///
/// Callers log this and continue with unrestricted affinity; it never
/// aborts the process.
#[derive(Debug, thiserror::Error)]
#[error("affinity restriction failed: {0}")]
pub struct AffinityError(pub String);

/// Fatal platform incompatibilities and gate state violations.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// OS family is not on the supported list.
    #[error("unsupported operating system family: {0}")]
    UnsupportedOsFamily(OsFamily),

    /// OS version is older than the known minimum for its family.
    #[error("{family} version {found} is older than the required minimum {required}")]
    OsVersionTooOld {
        family: OsFamily,
        found: String,
        required: String,
    },

    /// The processor lacks a vector capability the hot paths assume.
    #[error("required vector instruction support ({0}) not present on this processor")]
    MissingVectorSupport(&'static str),

    /// `verify_compatibility` was called more than once.
    #[error("hardware compatibility has already been verified")]
    AlreadyValidated,

    /// An operation requires prior successful validation.
    #[error("hardware compatibility must be verified before {0}")]
    NotValidated(&'static str),

    /// `initialize_affinity` was called more than once.
    #[error("processor affinity has already been initialized")]
    AffinityAlreadyInitialized,
}
