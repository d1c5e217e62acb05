//! Audio backends for chimes and background ambience
//!
//! The session only needs two capabilities: ring a chime now, and set the
//! ambience volume. Both are best-effort; the session logs failures and never
//! lets them reach the timer.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use clap::ValueEnum;
use futures::future::{BoxFuture, FutureExt};
use tokio::{io::AsyncWriteExt, process::Command};
use tracing::{debug, info};

use crate::error::AudioError;

/// Capability the session uses to produce sound
pub trait AudioBackend: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Play one chime
    fn play_chime(&self) -> BoxFuture<'static, Result<(), AudioError>>;

    /// Set the looping ambience volume, 0.0 meaning silent
    fn set_background(&self, volume: f32) -> BoxFuture<'static, Result<(), AudioError>>;
}

impl std::fmt::Debug for dyn AudioBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AudioBackend({})", self.name())
    }
}

/// Backend selection on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AudioMode {
    /// Run external commands for chimes and volume changes
    Command,
    /// Write the terminal bell character for chimes
    Terminal,
    /// Log only
    Silent,
}

/// Build the backend for the selected mode
pub fn build_audio_backend(
    mode: AudioMode,
    chime_command: Option<&str>,
    volume_command: Option<&str>,
) -> Result<Arc<dyn AudioBackend>, AudioError> {
    info!("Using {:?} audio backend", mode);
    let backend: Arc<dyn AudioBackend> = match mode {
        AudioMode::Command => Arc::new(CommandAudio::new(chime_command, volume_command)?),
        AudioMode::Terminal => Arc::new(TerminalBell),
        AudioMode::Silent => Arc::new(SilentAudio),
    };
    Ok(backend)
}

/// Placeholder in the volume command replaced with a 0.00-1.00 value
pub const VOLUME_PLACEHOLDER: &str = "{volume}";
/// Placeholder in the volume command replaced with a 0-100 value
pub const PERCENT_PLACEHOLDER: &str = "{percent}";

/// Longest an audio command may run before it is killed
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs external commands, e.g. `paplay bell.oga`
#[derive(Debug, Clone)]
pub struct CommandAudio {
    chime: Option<Vec<String>>,
    volume: Option<Vec<String>>,
    timeout: Duration,
}

impl CommandAudio {
    /// Parse shell-style command lines. Either may be absent
    pub fn new(chime: Option<&str>, volume: Option<&str>) -> Result<Self, AudioError> {
        Ok(Self {
            chime: chime.map(split_command).transpose()?,
            volume: volume.map(split_command).transpose()?,
            timeout: DEFAULT_COMMAND_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Volume command argv with placeholders filled in
    fn volume_argv(&self, volume: f32) -> Option<Vec<String>> {
        let volume = volume.clamp(0.0, 1.0);
        let fraction = format!("{:.2}", volume);
        let percent = format!("{}", (volume * 100.0).round() as u32);
        self.volume.as_ref().map(|argv| {
            argv.iter()
                .map(|arg| {
                    arg.replace(VOLUME_PLACEHOLDER, &fraction)
                        .replace(PERCENT_PLACEHOLDER, &percent)
                })
                .collect()
        })
    }
}

impl AudioBackend for CommandAudio {
    fn name(&self) -> &'static str {
        "command"
    }

    fn play_chime(&self) -> BoxFuture<'static, Result<(), AudioError>> {
        match self.chime.clone() {
            Some(argv) => run_command(argv, self.timeout).boxed(),
            None => {
                debug!("No chime command configured");
                futures::future::ready(Ok(())).boxed()
            }
        }
    }

    fn set_background(&self, volume: f32) -> BoxFuture<'static, Result<(), AudioError>> {
        match self.volume_argv(volume) {
            Some(argv) => run_command(argv, self.timeout).boxed(),
            None => futures::future::ready(Ok(())).boxed(),
        }
    }
}

fn split_command(line: &str) -> Result<Vec<String>, AudioError> {
    match shlex::split(line) {
        Some(argv) if !argv.is_empty() => Ok(argv),
        _ => Err(AudioError::InvalidCommand(line.to_string())),
    }
}

/// Run a command to completion, failing on a non-zero exit status.
/// The child is killed if it outlives `timeout`
async fn run_command(argv: Vec<String>, timeout: Duration) -> Result<(), AudioError> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| AudioError::InvalidCommand(String::new()))?;
    debug!("Running audio command: {:?}", argv);

    let running = Command::new(program).args(args).kill_on_drop(true).output();
    let output = tokio::time::timeout(timeout, running)
        .await
        .map_err(|_| AudioError::TimedOut(program.clone(), timeout))??;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AudioError::CommandFailed(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        )));
    }
    Ok(())
}

/// Rings the terminal bell on stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl AudioBackend for TerminalBell {
    fn name(&self) -> &'static str {
        "terminal"
    }

    fn play_chime(&self) -> BoxFuture<'static, Result<(), AudioError>> {
        async {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(b"\x07").await?;
            stdout.flush().await?;
            Ok::<(), AudioError>(())
        }
        .boxed()
    }

    fn set_background(&self, volume: f32) -> BoxFuture<'static, Result<(), AudioError>> {
        debug!("Terminal backend has no ambience, ignoring volume {:.2}", volume);
        futures::future::ready(Ok(())).boxed()
    }
}

/// Logs audio effects without producing sound
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAudio;

impl AudioBackend for SilentAudio {
    fn name(&self) -> &'static str {
        "silent"
    }

    fn play_chime(&self) -> BoxFuture<'static, Result<(), AudioError>> {
        info!("Chime");
        futures::future::ready(Ok(())).boxed()
    }

    fn set_background(&self, volume: f32) -> BoxFuture<'static, Result<(), AudioError>> {
        info!("Ambience volume {:.2}", volume);
        futures::future::ready(Ok(())).boxed()
    }
}

/// A call received by [`RecordingAudio`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioCall {
    Chime,
    Background(f32),
}

/// Records every effect for simulations and tests
#[derive(Debug, Default)]
pub struct RecordingAudio {
    calls: Mutex<Vec<AudioCall>>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<AudioCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn chime_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == AudioCall::Chime)
            .count()
    }

    /// Most recent ambience volume, if any was set
    pub fn last_background(&self) -> Option<f32> {
        self.calls().iter().rev().find_map(|call| match call {
            AudioCall::Background(volume) => Some(*volume),
            AudioCall::Chime => None,
        })
    }

    fn record(&self, call: AudioCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl AudioBackend for RecordingAudio {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn play_chime(&self) -> BoxFuture<'static, Result<(), AudioError>> {
        self.record(AudioCall::Chime);
        futures::future::ready(Ok(())).boxed()
    }

    fn set_background(&self, volume: f32) -> BoxFuture<'static, Result<(), AudioError>> {
        self.record(AudioCall::Background(volume));
        futures::future::ready(Ok(())).boxed()
    }
}
