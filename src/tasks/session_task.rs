//! Session background task
//!
//! A single task owns the timer engine. HTTP handlers talk to it through a
//! command channel; a fixed-cadence interval drives `tick()`. Chimes are
//! spawned and never awaited, so a failing backend cannot stall the timer.
//! Ambience volume goes through one worker that applies changes in order and
//! always ends on the latest requested level.

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, oneshot, watch},
    time::{interval, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    config::SessionSettings,
    engine::{BellEvent, BellPeriod, Clock, TickResult, TimerEngine, Timestamp},
    error::SessionError,
    services::AudioBackend,
    state::{AmbienceLevels, AudioState, SessionSnapshot},
    utils::format_elapsed,
};

/// Gaps between ticks longer than this many tick periods are logged as stalls
const STALL_TICKS: u64 = 8;

/// Capacity of the command channel
const COMMAND_BUFFER: usize = 32;

/// Something a client asks the session to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    Start,
    Pause,
    /// Start when not running, pause when running
    Toggle,
    Reset,
    SetInterval { minutes: u64 },
    SetMuted(bool),
    ToggleMute,
    SetVisibility(bool),
    Snapshot,
}

impl SessionAction {
    pub fn name(&self) -> &'static str {
        match self {
            SessionAction::Start => "start",
            SessionAction::Pause => "pause",
            SessionAction::Toggle => "toggle",
            SessionAction::Reset => "reset",
            SessionAction::SetInterval { .. } => "interval",
            SessionAction::SetMuted(true) => "mute",
            SessionAction::SetMuted(false) => "unmute",
            SessionAction::ToggleMute => "toggle-mute",
            SessionAction::SetVisibility(_) => "visibility",
            SessionAction::Snapshot => "snapshot",
        }
    }

    /// Whether the action can change session state
    pub fn is_mutating(&self) -> bool {
        !matches!(self, SessionAction::Snapshot)
    }
}

/// An action plus the channel its outcome is sent back on
#[derive(Debug)]
pub struct SessionCommand {
    pub action: SessionAction,
    pub reply: oneshot::Sender<Result<SessionSnapshot, SessionError>>,
}

/// Timer engine plus audio state, owned by exactly one task
pub struct Session<C: Clock> {
    engine: TimerEngine,
    audio: AudioState,
    ambience: AmbienceLevels,
    clock: C,
    backend: Arc<dyn AudioBackend>,
    /// Ambience volume last requested from the worker
    requested_volume: Option<f32>,
    ambience_tx: watch::Sender<f32>,
    last_tick_at: Option<Timestamp>,
    tick_ms: u64,
}

impl<C: Clock> Session<C> {
    /// Create a session and its ambience worker. Must run inside a tokio runtime
    pub fn new(settings: &SessionSettings, clock: C, backend: Arc<dyn AudioBackend>) -> Self {
        let (ambience_tx, ambience_rx) = watch::channel(0.0);
        tokio::spawn(ambience_task(Arc::clone(&backend), ambience_rx));

        Self {
            engine: TimerEngine::new(settings.bell_period),
            audio: AudioState::new(settings.start_muted),
            ambience: settings.ambience,
            clock,
            backend,
            requested_volume: None,
            ambience_tx,
            last_tick_at: None,
            tick_ms: settings.tick_interval.as_millis() as u64,
        }
    }

    /// Apply one action and return the resulting snapshot
    pub fn handle(&mut self, action: SessionAction) -> Result<SessionSnapshot, SessionError> {
        let now = self.clock.now_ms();

        match action {
            SessionAction::Start => self.start(now),
            SessionAction::Pause => self.pause(now),
            SessionAction::Toggle => {
                if self.engine.is_running() {
                    self.pause(now)
                } else {
                    self.start(now)
                }
            }
            SessionAction::Reset => {
                self.engine.reset();
                self.last_tick_at = None;
            }
            SessionAction::SetInterval { minutes } => {
                let period = BellPeriod::from_choice(minutes)
                    .ok_or(SessionError::InvalidInterval(minutes))?;
                self.engine.set_bell_period(period)?;
                info!("Bell interval set to {}", period);
            }
            SessionAction::SetMuted(muted) => self.set_muted(muted),
            SessionAction::ToggleMute => self.set_muted(!self.audio.muted),
            SessionAction::SetVisibility(visible) => {
                if self.audio.visible != visible {
                    info!("Timer {}", if visible { "visible" } else { "hidden" });
                }
                self.audio.visible = visible;
            }
            SessionAction::Snapshot => {}
        }

        self.sync_background();
        Ok(self.snapshot())
    }

    /// Drive the engine once from the clock
    pub fn on_tick(&mut self) -> TickResult {
        let now = self.clock.now_ms();

        if self.engine.is_running() {
            if let Some(previous) = self.last_tick_at {
                let gap = now.saturating_sub(previous);
                if gap > self.tick_ms * STALL_TICKS {
                    info!("Tick loop stalled for {}ms, catching up", gap);
                }
            }
            self.last_tick_at = Some(now);
        }

        let result = self.engine.tick(now);
        if let Some(seconds) = result.elapsed_seconds {
            debug!("Elapsed {}", format_elapsed(seconds));
        }
        if let Some(bell) = result.bell {
            self.ring(bell);
        }
        result
    }

    /// Current view of the session
    pub fn snapshot(&self) -> SessionSnapshot {
        let now = self.clock.now_ms();
        let elapsed_ms = self.engine.elapsed_ms(now);
        let elapsed_seconds = elapsed_ms / 1000;

        SessionSnapshot {
            phase: self.engine.phase(),
            elapsed_ms,
            elapsed_seconds,
            elapsed_display: format_elapsed(elapsed_seconds),
            interval_minutes: self.engine.bell_period().minutes(),
            bells_rung: self.engine.bell_fire_count(),
            next_bell_in_seconds: self.engine.ms_until_next_bell(now).div_ceil(1000),
            muted: self.audio.muted,
            visible: self.audio.visible,
            background_volume: self
                .audio
                .background_volume(self.engine.is_running(), &self.ambience),
        }
    }

    fn start(&mut self, now: Timestamp) {
        self.last_tick_at = Some(now);
        if let Some(bell) = self.engine.start(now) {
            self.ring(bell);
        }
    }

    fn pause(&mut self, now: Timestamp) {
        self.engine.pause(now);
        self.last_tick_at = None;
    }

    fn set_muted(&mut self, muted: bool) {
        if self.audio.muted != muted {
            info!("Audio {}", if muted { "muted" } else { "unmuted" });
        }
        self.audio.muted = muted;
    }

    fn ring(&self, bell: BellEvent) {
        if !self.audio.chime_allowed() {
            debug!("Muted, skipping {:?} bell", bell.kind);
            return;
        }

        if bell.is_session_start() {
            info!("Ringing session start bell");
        } else {
            info!("Ringing bell #{}", bell.fire_count);
        }

        let playback = self.backend.play_chime();
        let backend = self.backend.name();
        tokio::spawn(async move {
            if let Err(e) = playback.await {
                warn!("Chime playback failed on {} backend: {}", backend, e);
            }
        });
    }

    /// Hand the ambience volume to the worker when it changed
    pub fn sync_background(&mut self) {
        let volume = self
            .audio
            .background_volume(self.engine.is_running(), &self.ambience);
        if self.requested_volume == Some(volume) {
            return;
        }
        self.requested_volume = Some(volume);
        debug!("Ambience volume -> {:.2}", volume);
        self.ambience_tx.send_replace(volume);
    }
}

/// Applies ambience volume changes one at a time.
///
/// Requests arriving while a change is in flight collapse into the newest one,
/// which is applied as soon as the backend returns. Ends with the session.
pub async fn ambience_task(backend: Arc<dyn AudioBackend>, mut volumes: watch::Receiver<f32>) {
    while volumes.changed().await.is_ok() {
        let volume = *volumes.borrow_and_update();
        if let Err(e) = backend.set_background(volume).await {
            warn!("Ambience volume change failed on {} backend: {}", backend.name(), e);
        }
    }
    debug!("Ambience worker stopped");
}

/// Spawn the session task, returning its command sender and snapshot feed
pub fn spawn_session<C: Clock + 'static>(
    settings: &SessionSettings,
    clock: C,
    backend: Arc<dyn AudioBackend>,
) -> (mpsc::Sender<SessionCommand>, watch::Receiver<SessionSnapshot>) {
    let session = Session::new(settings, clock, backend);
    let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
    let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());

    tokio::spawn(session_task(session, settings.tick_interval, command_rx, snapshot_tx));

    (command_tx, snapshot_rx)
}

/// Background task that owns the session until every command sender is dropped
pub async fn session_task<C: Clock + 'static>(
    mut session: Session<C>,
    tick_interval: Duration,
    mut commands: mpsc::Receiver<SessionCommand>,
    snapshots: watch::Sender<SessionSnapshot>,
) {
    info!("Starting session task, sampling every {:?}", tick_interval);

    session.sync_background();

    let mut ticker = interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let result = session.on_tick();
                if !result.is_unchanged() {
                    snapshots.send_replace(session.snapshot());
                }
            }

            command = commands.recv() => {
                let Some(SessionCommand { action, reply }) = command else {
                    info!("All session handles dropped, stopping session task");
                    break;
                };

                debug!("Session command: {:?}", action);
                let outcome = session.handle(action);
                match &outcome {
                    Ok(snapshot) => {
                        snapshots.send_replace(snapshot.clone());
                    }
                    Err(e) => debug!("Session command {} rejected: {}", action.name(), e),
                }

                if reply.send(outcome).is_err() {
                    warn!("Caller went away before {} completed", action.name());
                }
            }
        }
    }
}
