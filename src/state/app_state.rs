//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, warn};

use super::SessionSnapshot;
use crate::{
    config::SessionSettings,
    engine::Clock,
    error::SessionError,
    services::AudioBackend,
    tasks::{spawn_session, SessionAction, SessionCommand},
    utils::format::format_duration_words,
};

/// Shared handle to the session task plus server metadata
#[derive(Debug)]
pub struct AppState {
    /// Commands into the task that owns the timer engine
    pub commands: mpsc::Sender<SessionCommand>,
    /// Latest snapshot published by the session task
    pub snapshot_rx: watch::Receiver<SessionSnapshot>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Create state around an already running session task
    pub fn new(
        port: u16,
        host: String,
        commands: mpsc::Sender<SessionCommand>,
        snapshot_rx: watch::Receiver<SessionSnapshot>,
    ) -> Self {
        Self {
            commands,
            snapshot_rx,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Spawn the session task and wrap its handles. Must run inside a tokio runtime
    pub fn spawn<C: Clock + 'static>(
        port: u16,
        host: String,
        settings: &SessionSettings,
        clock: C,
        backend: Arc<dyn AudioBackend>,
    ) -> Self {
        let (commands, snapshot_rx) = spawn_session(settings, clock, backend);
        Self::new(port, host, commands, snapshot_rx)
    }

    /// Send an action to the session task and wait for the resulting snapshot
    pub async fn dispatch(&self, action: SessionAction) -> Result<SessionSnapshot, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(SessionCommand { action, reply: reply_tx })
            .await
            .map_err(|_| SessionError::SessionClosed)?;

        let snapshot = reply_rx.await.map_err(|_| SessionError::SessionClosed)??;

        if action.is_mutating() {
            self.record_action(action.name());
        }
        Ok(snapshot)
    }

    /// Snapshot from the last tick or command, without a round trip
    pub fn latest_snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    fn record_action(&self, action: &str) {
        debug!("Recording last action: {}", action);
        match self.last_action.lock() {
            Ok(mut last_action) => *last_action = Some(action.to_string()),
            Err(e) => warn!("Failed to lock last action: {}", e),
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format_duration_words(self.start_time.elapsed().as_secs())
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
