//! External effects module
//! 
//! This module contains the audio backends the session uses to ring chimes
//! and drive background ambience.

pub mod audio;

// Re-export main types
pub use audio::{
    build_audio_backend, AudioBackend, AudioCall, AudioMode, CommandAudio, RecordingAudio,
    SilentAudio, TerminalBell,
};
