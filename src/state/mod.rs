//! State management module
//! 
//! This module contains the shared application state and the serializable
//! views of the focus session and its audio settings.

pub mod app_state;
pub mod audio_state;
pub mod session_state;

// Re-export main types
pub use app_state::AppState;
pub use audio_state::{AmbienceLevels, AudioState};
pub use session_state::SessionSnapshot;
