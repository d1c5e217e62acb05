//! Error types shared across the engine, session and audio layers

use thiserror::Error;

/// Errors raised by the timer engine itself
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The bell period can only change before the first start or after a reset
    #[error("Bell period can only be changed while the timer is idle")]
    NotIdle,

    /// A bell period of zero milliseconds
    #[error("Bell period must be positive")]
    ZeroPeriod,
}

/// Errors returned to callers of the session task
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Reconfiguration attempted after the session started
    #[error("Interval can only be changed while the timer is idle")]
    NotIdle,

    /// Interval outside of the offered selector choices
    #[error("Unsupported interval: {0} minutes")]
    InvalidInterval(u64),

    /// The owning task is gone
    #[error("Session task is not running")]
    SessionClosed,
}

impl From<EngineError> for SessionError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::NotIdle => SessionError::NotIdle,
            EngineError::ZeroPeriod => SessionError::InvalidInterval(0),
        }
    }
}

/// Errors from audio effects. These are logged and never propagated
#[derive(Debug, Error)]
pub enum AudioError {
    /// The configured command could not be launched
    #[error("Failed to launch audio command: {0}")]
    Spawn(#[from] std::io::Error),

    /// The command did not finish in time and was killed
    #[error("Audio command {0} timed out after {1:?}")]
    TimedOut(String, std::time::Duration),

    /// The command ran but reported failure
    #[error("Audio command failed: {0}")]
    CommandFailed(String),

    /// The command string could not be parsed
    #[error("Invalid audio command: {0}")]
    InvalidCommand(String),
}
