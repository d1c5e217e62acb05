//! Background tasks module
//! 
//! This module contains the task that owns the focus session alongside the
//! HTTP server.

pub mod session_task;

// Re-export main types and functions
pub use session_task::{
    session_task, spawn_session, Session, SessionAction, SessionCommand,
};
