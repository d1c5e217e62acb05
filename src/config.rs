//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

use crate::{
    engine::{BellPeriod, DEFAULT_INTERVAL_MINUTES, INTERVAL_CHOICES_MINUTES},
    services::AudioMode,
    state::AmbienceLevels,
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "focus-bell")]
#[command(about = "A focus timer that rings a chime at a fixed interval of running time")]
#[command(version)]
pub struct Config {
    /// Port to bind the control server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Minutes of running time between chimes (2, 5, 10, 15, 20, 30, 45 or 60)
    #[arg(short, long, default_value_t = DEFAULT_INTERVAL_MINUTES, value_parser = parse_interval)]
    pub interval: u64,

    /// Timer sampling period in milliseconds
    #[arg(long, default_value_t = 250, value_parser = clap::value_parser!(u64).range(10..=1000))]
    pub tick_ms: u64,

    /// Audio backend
    #[arg(long, value_enum, default_value_t = AudioMode::Terminal)]
    pub audio: AudioMode,

    /// Command played for each chime (command backend)
    #[arg(long)]
    pub chime_command: Option<String>,

    /// Command setting ambience volume, with {volume} or {percent} placeholders (command backend)
    #[arg(long)]
    pub volume_command: Option<String>,

    /// Ambience volume while the timer is visible
    #[arg(long, default_value_t = 0.6, value_parser = parse_volume)]
    pub ambience_volume: f32,

    /// Ambience volume while the timer is hidden
    #[arg(long, default_value_t = 0.0, value_parser = parse_volume)]
    pub hidden_volume: f32,

    /// Start with audio muted
    #[arg(short, long)]
    pub muted: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Settings handed to the session task
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub bell_period: BellPeriod,
    pub tick_interval: Duration,
    pub ambience: AmbienceLevels,
    pub start_muted: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            bell_period: BellPeriod::default(),
            tick_interval: Duration::from_millis(250),
            ambience: AmbienceLevels::default(),
            start_muted: false,
        }
    }
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Session settings derived from the command line
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            bell_period: BellPeriod::from_choice(self.interval).unwrap_or_default(),
            tick_interval: Duration::from_millis(self.tick_ms),
            ambience: AmbienceLevels {
                visible: self.ambience_volume,
                hidden: self.hidden_volume,
            },
            start_muted: self.muted,
        }
    }
}

fn parse_interval(value: &str) -> Result<u64, String> {
    let minutes: u64 = value
        .parse()
        .map_err(|_| format!("`{}` is not a number of minutes", value))?;
    if INTERVAL_CHOICES_MINUTES.contains(&minutes) {
        Ok(minutes)
    } else {
        Err(format!("interval must be one of {:?}", INTERVAL_CHOICES_MINUTES))
    }
}

fn parse_volume(value: &str) -> Result<f32, String> {
    let volume: f32 = value
        .parse()
        .map_err(|_| format!("`{}` is not a volume", value))?;
    if (0.0..=1.0).contains(&volume) {
        Ok(volume)
    } else {
        Err("volume must be between 0.0 and 1.0".to_string())
    }
}
