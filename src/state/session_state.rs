//! Session snapshot structure

use serde::{Deserialize, Serialize};

use crate::engine::TimerPhase;

/// Point-in-time view of the focus session, as shown to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: TimerPhase,
    pub elapsed_ms: u64,
    pub elapsed_seconds: u64,
    /// Elapsed time formatted for display, e.g. `05:07` or `1:02:03`
    pub elapsed_display: String,
    pub interval_minutes: u64,
    /// Periodic bells settled in this session
    pub bells_rung: u64,
    pub next_bell_in_seconds: u64,
    pub muted: bool,
    pub visible: bool,
    pub background_volume: f32,
}

impl SessionSnapshot {
    /// Check if the timer is counting
    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }
}
