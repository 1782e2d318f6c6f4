//! Error types for Cadence

use crate::id::RegistrantId;
use thiserror::Error;

/// The main error type for Cadence operations
#[derive(Debug, Error)]
pub enum CadenceError {
    #[error("Registrant error: {0}")]
    Registrant(String),

    #[error("Registrant {0} is already borrowed (re-entrant tick?)")]
    RegistrantBusy(RegistrantId),

    #[error("{phase} tick aborted by registrant {id}: {source}")]
    TickAborted {
        phase: &'static str,
        id: RegistrantId,
        #[source]
        source: Box<CadenceError>,
    },

    #[error("{0} scheduler is already mid-pass (nested tick)")]
    ReentrantTick(&'static str),

    #[error("Invalid update interval: {0} (must be finite and >= 0)")]
    InvalidInterval(f64),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("TOML serialization error: {0}")]
    TomlSerError(String),
}

impl CadenceError {
    /// Shorthand for a registrant-level failure
    pub fn registrant(msg: impl Into<String>) -> Self {
        CadenceError::Registrant(msg.into())
    }

    /// The registrant that aborted a tick, if this is a tick failure
    pub fn aborted_by(&self) -> Option<RegistrantId> {
        match self {
            CadenceError::TickAborted { id, .. } => Some(*id),
            _ => None,
        }
    }
}

/// Result type alias for Cadence operations
pub type Result<T> = std::result::Result<T, CadenceError>;

impl From<toml::de::Error> for CadenceError {
    fn from(err: toml::de::Error) -> Self {
        CadenceError::TomlParseError(err.to_string())
    }
}

impl From<toml::ser::Error> for CadenceError {
    fn from(err: toml::ser::Error) -> Self {
        CadenceError::TomlSerError(err.to_string())
    }
}
