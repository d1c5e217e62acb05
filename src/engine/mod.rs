//! Timer engine module
//!
//! Pure time/state model for a focus session: a clock capability, the bell
//! period, and the engine that turns clock readings into elapsed time and
//! bell events. Nothing in here performs I/O.

pub mod bell_period;
pub mod clock;
pub mod timer_engine;

// Re-export main types
pub use bell_period::{BellPeriod, DEFAULT_INTERVAL_MINUTES, INTERVAL_CHOICES_MINUTES};
pub use clock::{Clock, ManualClock, MonotonicClock, Timestamp};
pub use timer_engine::{BellEvent, BellKind, TickResult, TimerEngine, TimerPhase};
