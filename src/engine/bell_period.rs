//! Bell period configuration

use std::fmt;

use crate::error::EngineError;

/// Interval choices offered to the user, in minutes
pub const INTERVAL_CHOICES_MINUTES: [u64; 8] = [2, 5, 10, 15, 20, 30, 45, 60];

/// Interval used when nothing else is configured
pub const DEFAULT_INTERVAL_MINUTES: u64 = 10;

const MS_PER_MINUTE: u64 = 60_000;

/// Time between periodic bells, always positive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BellPeriod(u64);

impl BellPeriod {
    /// Any positive period. The engine does not restrict itself to the selector choices
    pub fn from_millis(ms: u64) -> Result<Self, EngineError> {
        if ms == 0 {
            return Err(EngineError::ZeroPeriod);
        }
        Ok(Self(ms))
    }

    /// One of [`INTERVAL_CHOICES_MINUTES`]
    pub fn from_choice(minutes: u64) -> Option<Self> {
        INTERVAL_CHOICES_MINUTES
            .contains(&minutes)
            .then(|| Self(minutes * MS_PER_MINUTE))
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Whole minutes, rounded down
    pub fn minutes(&self) -> u64 {
        self.0 / MS_PER_MINUTE
    }
}

impl Default for BellPeriod {
    fn default() -> Self {
        Self(DEFAULT_INTERVAL_MINUTES * MS_PER_MINUTE)
    }
}

impl fmt::Display for BellPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % MS_PER_MINUTE == 0 {
            write!(f, "{}min", self.minutes())
        } else {
            write!(f, "{}ms", self.0)
        }
    }
}
