//! Pause-aware elapsed time accounting and bell scheduling
//!
//! Elapsed time is anchored to clock deltas rather than counted per tick, so a
//! stalled or throttled caller never makes the display drift. Bells fall on
//! fixed multiples of total running time; pausing does not shift them.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    bell_period::BellPeriod,
    clock::Timestamp,
};
use crate::error::EngineError;

/// Lifecycle phase of a focus session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    /// Before the first start, and after a reset
    Idle,
    Running,
    Paused,
}

impl TimerPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerPhase::Idle => "idle",
            TimerPhase::Running => "running",
            TimerPhase::Paused => "paused",
        }
    }
}

/// Why a chime should ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BellKind {
    /// Rung once when a fresh session starts
    SessionStart,
    /// Rung when running time crosses a period boundary
    Periodic,
}

/// A bell the host should play now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BellEvent {
    pub kind: BellKind,
    /// Periodic bells settled so far, including this one. Zero for the session-start bell
    pub fire_count: u64,
}

impl BellEvent {
    pub fn is_session_start(&self) -> bool {
        self.kind == BellKind::SessionStart
    }
}

/// Outcome of one [`TimerEngine::tick`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickResult {
    /// New whole elapsed seconds, present only when changed since the last report
    pub elapsed_seconds: Option<u64>,
    /// At most one bell per tick, however many boundaries were skipped
    pub bell: Option<BellEvent>,
}

impl TickResult {
    pub fn is_unchanged(&self) -> bool {
        self.elapsed_seconds.is_none() && self.bell.is_none()
    }
}

/// Elapsed-time and bell state for a single focus session
#[derive(Debug, Clone)]
pub struct TimerEngine {
    phase: TimerPhase,
    /// Running time folded in from finished intervals
    accumulated_ms: u64,
    /// Start of the live interval, set iff running
    anchor_ms: Option<Timestamp>,
    /// Longest live interval observed since the anchor; keeps elapsed
    /// from shrinking when the clock steps backwards
    live_peak_ms: u64,
    bell_period: BellPeriod,
    bell_fire_count: u64,
    reported_seconds: u64,
}

impl TimerEngine {
    pub fn new(bell_period: BellPeriod) -> Self {
        Self {
            phase: TimerPhase::Idle,
            accumulated_ms: 0,
            anchor_ms: None,
            live_peak_ms: 0,
            bell_period,
            bell_fire_count: 0,
            reported_seconds: 0,
        }
    }

    /// Begin or resume running.
    ///
    /// Returns the session-start bell on the first start after creation or
    /// reset. Calling this while already running changes nothing.
    pub fn start(&mut self, now: Timestamp) -> Option<BellEvent> {
        let was_idle = match self.phase {
            TimerPhase::Running => return None,
            TimerPhase::Idle => true,
            TimerPhase::Paused => false,
        };

        self.anchor_ms = Some(now);
        self.live_peak_ms = 0;
        self.phase = TimerPhase::Running;

        if was_idle {
            info!("Session started, bell every {}", self.bell_period);
            Some(BellEvent {
                kind: BellKind::SessionStart,
                fire_count: 0,
            })
        } else {
            info!("Session resumed at {}ms elapsed", self.accumulated_ms);
            None
        }
    }

    /// Freeze elapsed time. No-op unless running
    pub fn pause(&mut self, now: Timestamp) {
        if self.phase != TimerPhase::Running {
            return;
        }
        self.accumulated_ms = self.accumulated_ms.saturating_add(self.live_ms(now));
        self.anchor_ms = None;
        self.live_peak_ms = 0;
        self.phase = TimerPhase::Paused;
        info!("Session paused at {}ms elapsed", self.accumulated_ms);
    }

    /// Return to idle with all counters cleared. The bell period is kept
    pub fn reset(&mut self) {
        self.phase = TimerPhase::Idle;
        self.accumulated_ms = 0;
        self.anchor_ms = None;
        self.live_peak_ms = 0;
        self.bell_fire_count = 0;
        self.reported_seconds = 0;
        info!("Session reset");
    }

    /// Settle elapsed time and bell state at `now`
    pub fn tick(&mut self, now: Timestamp) -> TickResult {
        if self.phase != TimerPhase::Running {
            return TickResult::default();
        }

        self.live_peak_ms = self.live_ms(now);
        let elapsed_ms = self.accumulated_ms.saturating_add(self.live_peak_ms);

        let mut result = TickResult::default();

        let seconds = elapsed_ms / 1000;
        if seconds != self.reported_seconds {
            self.reported_seconds = seconds;
            result.elapsed_seconds = Some(seconds);
        }

        let due = elapsed_ms / self.bell_period.as_millis();
        if due > self.bell_fire_count {
            if due - self.bell_fire_count > 1 {
                debug!(
                    "Skipped {} bell boundaries, firing once",
                    due - self.bell_fire_count - 1
                );
            }
            self.bell_fire_count = due;
            result.bell = Some(BellEvent {
                kind: BellKind::Periodic,
                fire_count: due,
            });
        }

        result
    }

    /// Change the bell period. Only allowed while idle
    pub fn set_bell_period(&mut self, period: BellPeriod) -> Result<(), EngineError> {
        if self.phase != TimerPhase::Idle {
            return Err(EngineError::NotIdle);
        }
        self.bell_period = period;
        Ok(())
    }

    /// Total running time at `now`
    pub fn elapsed_ms(&self, now: Timestamp) -> u64 {
        self.accumulated_ms.saturating_add(self.live_ms(now))
    }

    pub fn elapsed_seconds(&self, now: Timestamp) -> u64 {
        self.elapsed_ms(now) / 1000
    }

    /// Running time left until the next period boundary
    pub fn ms_until_next_bell(&self, now: Timestamp) -> u64 {
        let period = self.bell_period.as_millis();
        period - self.elapsed_ms(now) % period
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    pub fn bell_period(&self) -> BellPeriod {
        self.bell_period
    }

    pub fn bell_fire_count(&self) -> u64 {
        self.bell_fire_count
    }

    fn live_ms(&self, now: Timestamp) -> u64 {
        match self.anchor_ms {
            Some(anchor) => now.saturating_sub(anchor).max(self.live_peak_ms),
            None => 0,
        }
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(BellPeriod::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with_period(ms: u64) -> TimerEngine {
        TimerEngine::new(BellPeriod::from_millis(ms).unwrap())
    }

    #[test]
    fn pause_and_resume_scenario() {
        let mut engine = TimerEngine::default();

        engine.start(0);
        assert_eq!(engine.tick(1_000).elapsed_seconds, Some(1));

        engine.pause(1_000);
        assert!(engine.tick(5_000).is_unchanged());

        engine.start(5_000);
        assert_eq!(engine.tick(7_000).elapsed_seconds, Some(3));
    }

    #[test]
    fn elapsed_is_the_sum_of_running_intervals() {
        // (start, pause) pairs with gaps of varying length between them
        let intervals = [(0, 1_500), (4_000, 4_010), (10_000, 70_000), (70_000, 70_001), (900_000, 960_250)];
        let mut engine = TimerEngine::default();
        let mut expected = 0;
        let mut last_seen = 0;

        for (start, stop) in intervals {
            engine.start(start);
            for t in (start..=stop).step_by(333) {
                let elapsed = engine.elapsed_ms(t);
                assert!(elapsed >= last_seen);
                assert_eq!(elapsed, expected + (t - start));
                last_seen = elapsed;
                engine.tick(t);
            }
            engine.pause(stop);
            expected += stop - start;
            assert_eq!(engine.elapsed_ms(stop + 5_000), expected);
        }

        assert_eq!(expected, 1_500 + 10 + 60_000 + 1 + 60_250);
    }

    #[test]
    fn reset_clears_counters_from_any_phase() {
        let mut engine = engine_with_period(1_000);

        engine.reset();
        assert_eq!(engine.elapsed_ms(0), 0);

        engine.start(0);
        engine.tick(3_500);
        assert_eq!(engine.bell_fire_count(), 3);
        engine.reset();
        assert_eq!(engine.phase(), TimerPhase::Idle);
        assert_eq!(engine.elapsed_ms(10_000), 0);
        assert_eq!(engine.bell_fire_count(), 0);

        engine.start(20_000);
        engine.tick(22_000);
        engine.pause(22_000);
        engine.reset();
        assert_eq!(engine.elapsed_ms(30_000), 0);
        assert_eq!(engine.bell_fire_count(), 0);
        assert_eq!(engine.bell_period().as_millis(), 1_000);
    }

    #[test]
    fn repeated_start_does_not_reanchor() {
        let mut engine = TimerEngine::default();
        assert!(engine.start(0).is_some());
        assert!(engine.start(500).is_none());
        assert_eq!(engine.elapsed_ms(1_000), 1_000);
        assert_eq!(engine.tick(1_000).elapsed_seconds, Some(1));
    }

    #[test]
    fn stalled_ticks_fire_a_single_catch_up_bell() {
        let mut engine = engine_with_period(60_000);
        engine.start(0);

        let result = engine.tick(200_000);
        assert_eq!(
            result.bell,
            Some(BellEvent {
                kind: BellKind::Periodic,
                fire_count: 3,
            })
        );
        assert_eq!(engine.bell_fire_count(), 3);

        assert!(engine.tick(200_250).bell.is_none());
        assert!(engine.tick(240_000).bell.is_some());
        assert_eq!(engine.bell_fire_count(), 4);
    }

    #[test]
    fn bell_never_fires_before_its_boundary() {
        let mut engine = engine_with_period(10 * 60_000);
        engine.start(0);

        let mut fired_at = Vec::new();
        for t in (250..=700_000).step_by(250) {
            if engine.tick(t).bell.is_some() {
                fired_at.push(engine.elapsed_ms(t));
            }
        }

        assert_eq!(fired_at, vec![600_000]);
    }

    #[test]
    fn session_start_bell_rings_once_per_session() {
        let mut engine = TimerEngine::default();

        let bell = engine.start(0).expect("first start rings");
        assert!(bell.is_session_start());
        assert_eq!(bell.fire_count, 0);

        engine.pause(1_000);
        assert!(engine.start(2_000).is_none());
        assert!(engine.start(3_000).is_none());

        engine.reset();
        assert!(engine.start(4_000).is_some());
    }

    #[test]
    fn pause_keeps_bell_phase() {
        let mut engine = engine_with_period(10_000);
        engine.start(0);
        engine.tick(6_000);
        engine.pause(6_000);

        // A long pause must not move the boundary
        engine.start(100_000);
        assert!(engine.tick(103_750).bell.is_none());
        let bell = engine.tick(104_000).bell;
        assert_eq!(bell.map(|b| b.fire_count), Some(1));
    }

    #[test]
    fn boundary_crossed_before_pause_rings_after_resume() {
        let mut engine = engine_with_period(10_000);
        engine.start(0);
        engine.tick(9_900);
        engine.pause(10_200);

        assert!(engine.tick(11_000).is_unchanged());
        engine.start(20_000);
        assert_eq!(engine.tick(20_000).bell.map(|b| b.fire_count), Some(1));
    }

    #[test]
    fn clock_regression_never_reduces_elapsed() {
        let mut engine = TimerEngine::default();
        engine.start(10_000);
        assert_eq!(engine.tick(15_000).elapsed_seconds, Some(5));

        // Clock stepped back by three seconds
        assert!(engine.tick(12_000).is_unchanged());
        assert_eq!(engine.elapsed_ms(12_000), 5_000);

        engine.pause(11_000);
        assert_eq!(engine.elapsed_ms(11_000), 5_000);

        engine.start(11_000);
        assert_eq!(engine.tick(12_000).elapsed_seconds, Some(6));

        // Resume anchored after a regression below the anchor clamps to zero
        engine.pause(12_000);
        engine.start(50_000);
        assert_eq!(engine.elapsed_ms(40_000), 6_000);
    }

    #[test]
    fn bell_period_changes_only_while_idle() {
        let mut engine = TimerEngine::default();
        let five = BellPeriod::from_choice(5).unwrap();

        assert!(engine.set_bell_period(five).is_ok());
        engine.start(0);
        assert_eq!(engine.set_bell_period(BellPeriod::default()), Err(EngineError::NotIdle));
        engine.pause(10);
        assert_eq!(engine.set_bell_period(BellPeriod::default()), Err(EngineError::NotIdle));
        engine.reset();
        assert!(engine.set_bell_period(BellPeriod::default()).is_ok());
        assert_eq!(engine.bell_period(), BellPeriod::default());
    }

    #[test]
    fn extreme_timestamps_saturate_instead_of_overflowing() {
        let mut engine = TimerEngine::default();
        engine.start(0);
        engine.pause(u64::MAX);
        engine.start(0);
        engine.pause(1);
        assert_eq!(engine.elapsed_ms(1), u64::MAX);

        engine.start(0);
        engine.tick(10);
        assert_eq!(engine.elapsed_ms(10), u64::MAX);
    }

    #[test]
    fn idle_tick_is_unchanged() {
        let mut engine = TimerEngine::default();
        assert!(engine.tick(1_000_000).is_unchanged());
        assert_eq!(engine.elapsed_ms(1_000_000), 0);
    }

    #[test]
    fn time_until_next_bell() {
        let mut engine = engine_with_period(60_000);
        assert_eq!(engine.ms_until_next_bell(0), 60_000);
        engine.start(0);
        assert_eq!(engine.ms_until_next_bell(45_000), 15_000);
        assert_eq!(engine.ms_until_next_bell(60_000), 60_000);
    }
}
