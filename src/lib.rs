//! Focus Bell - A pause-aware focus timer with periodic chimes
//! 
//! This library provides the timer engine that turns clock readings into
//! elapsed running time and bell events, plus the session task, audio
//! backends and HTTP control surface that host it.

pub mod config;
pub mod engine;
pub mod error;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::{Config, SessionSettings};
pub use engine::{BellEvent, BellKind, BellPeriod, Clock, TickResult, TimerEngine, TimerPhase};
pub use error::{AudioError, EngineError, SessionError};
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
