//! Timer engine implementation.
//!
//! The engine is a tick-driven state machine. It does not own a thread or
//! an interval: the host calls `tick()` once per second while
//! [`PomodoroTimer::is_ticking`] reports an armed loop.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped --start--> Running --pause--> Paused --pause--> Running
//! Running --tick (remaining hits 0)--> Running (opposite phase)
//! any --stop--> Stopped (remaining reset, phase kept)
//! ```
//!
//! Every mutation renders the indicator and persists all five state fields.
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = PomodoroTimer::load(store, display, notifier, &TimerState::default());
//! timer.start(false);
//! // Once per second:
//! if timer.is_ticking() {
//!     timer.tick(); // Returns Some(Event::PhaseCompleted) on a phase flip
//! }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::phase::Phase;
use super::state::TimerState;
use crate::capabilities::{DisplaySink, KeyValueStore, Notifier};
use crate::error::ValidationError;
use crate::events::Event;

/// Indicator shown right after `stop()`.
pub const STOPPED_INDICATOR: &str = "■ twophase stopped";

const PAUSE_ICON: &str = "⏸";

/// Coarse run status, derived from the pause flag and the loop handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Paused,
    Stopped,
}

/// Work/break countdown coordinating the state with its three sinks.
#[derive(Debug)]
pub struct PomodoroTimer<S, D, N> {
    state: TimerState,
    /// Whether the tick loop is armed.
    ticking: bool,
    show_seconds: bool,
    store: S,
    display: D,
    notifier: N,
}

impl<S, D, N> PomodoroTimer<S, D, N>
where
    S: KeyValueStore,
    D: DisplaySink,
    N: Notifier,
{
    /// Wrap an existing state. Nothing is rendered or persisted yet.
    pub fn new(state: TimerState, store: S, display: D, notifier: N) -> Self {
        Self {
            state,
            ticking: false,
            show_seconds: true,
            store,
            display,
            notifier,
        }
    }

    /// Restore from `store`, falling back to `defaults`, and render once.
    pub fn load(store: S, display: D, notifier: N, defaults: &TimerState) -> Self {
        let state = TimerState::load(&store, defaults);
        tracing::debug!(?state, "timer state restored");
        let mut timer = Self::new(state, store, display, notifier);
        timer.refresh();
        timer
    }

    /// Render `MM:SS` (the default) or whole minutes.
    pub fn with_show_seconds(mut self, show_seconds: bool) -> Self {
        self.show_seconds = show_seconds;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    pub fn status(&self) -> RunStatus {
        if self.state.paused {
            RunStatus::Paused
        } else if self.ticking {
            RunStatus::Running
        } else {
            RunStatus::Stopped
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    /// Indicator text for the current state.
    pub fn indicator(&self) -> String {
        let clock = if self.show_seconds {
            self.state.clock()
        } else {
            self.state.clock_minutes()
        };
        if self.state.paused {
            format!("{PAUSE_ICON} Paused {}: {clock}", self.state.phase)
        } else {
            format!("{} {}: {clock}", self.state.phase.icon(), self.state.phase)
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            status: self.status(),
            phase: self.state.phase,
            remaining_secs: self.state.remaining_secs,
            paused: self.state.paused,
            work_duration_secs: self.state.work_duration_secs,
            break_duration_secs: self.state.break_duration_secs,
            indicator: self.indicator(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Arm the tick loop.
    ///
    /// With `resume == false` the current phase restarts from its full
    /// duration, even when the loop is already armed. With `resume == true`
    /// an armed loop makes this a no-op.
    pub fn start(&mut self, resume: bool) -> Option<Event> {
        if resume && self.ticking {
            return None;
        }
        if !resume {
            self.state.remaining_secs = self.state.full_duration();
        }
        self.ticking = true;
        self.refresh();
        self.persist();
        tracing::debug!(phase = %self.state.phase, resume, "tick loop armed");
        Some(Event::TimerStarted {
            phase: self.state.phase,
            remaining_secs: self.state.remaining_secs,
            resumed: resume,
            at: Utc::now(),
        })
    }

    /// Clear the pause flag and restart the current phase from the top.
    pub fn restart_phase(&mut self) -> Option<Event> {
        self.state.paused = false;
        self.start(false)
    }

    /// Toggle between paused and running.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.paused {
            self.state.paused = true;
            self.ticking = false;
            self.persist();
            self.refresh();
            tracing::debug!(phase = %self.state.phase, "paused");
            return Some(Event::TimerPaused {
                phase: self.state.phase,
                remaining_secs: self.state.remaining_secs,
                at: Utc::now(),
            });
        }

        self.state.paused = false;
        if self.start(true).is_none() {
            // Loop was still armed; the flag change still needs writing out.
            self.persist();
            self.refresh();
        }
        tracing::debug!(phase = %self.state.phase, "resumed");
        Some(Event::TimerResumed {
            phase: self.state.phase,
            remaining_secs: self.state.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Halt the loop and rewind the current phase. Safe to call repeatedly.
    pub fn stop(&mut self) -> Option<Event> {
        self.ticking = false;
        self.state.paused = false;
        self.state.remaining_secs = self.state.full_duration();
        self.persist();
        self.render(STOPPED_INDICATOR);
        tracing::debug!(phase = %self.state.phase, "stopped");
        Some(Event::TimerStopped {
            phase: self.state.phase,
            remaining_secs: self.state.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Replace both durations and rewind to the top of a work phase.
    ///
    /// The loop keeps its current armed/halted status.
    ///
    /// # Errors
    /// Returns [`ValidationError::NonPositiveDuration`] when either value is
    /// not strictly positive. The state is left untouched in that case.
    pub fn reconfigure(
        &mut self,
        work_minutes: i64,
        break_minutes: i64,
    ) -> Result<Event, ValidationError> {
        let work_secs = minutes_to_secs("work", work_minutes)?;
        let break_secs = minutes_to_secs("break", break_minutes)?;
        self.reconfigure_secs(work_secs, break_secs)
    }

    /// Same as [`reconfigure`](Self::reconfigure), with durations already
    /// in seconds. Fractional minutes from the control surface land here.
    pub fn reconfigure_secs(
        &mut self,
        work_secs: u64,
        break_secs: u64,
    ) -> Result<Event, ValidationError> {
        for (field, secs) in [("work", work_secs), ("break", break_secs)] {
            if secs == 0 {
                return Err(ValidationError::NonPositiveDuration {
                    field,
                    value: "0s".into(),
                });
            }
        }

        self.state = TimerState {
            phase: Phase::Work,
            remaining_secs: work_secs,
            paused: false,
            work_duration_secs: work_secs,
            break_duration_secs: break_secs,
        };
        self.persist();
        self.refresh();
        tracing::info!(work_secs, break_secs, "durations updated");
        Ok(Event::Reconfigured {
            work_duration_secs: work_secs,
            break_duration_secs: break_secs,
            at: Utc::now(),
        })
    }

    /// Advance one second. Returns `Some(Event::PhaseCompleted)` on a flip.
    ///
    /// A tick that arrives while the loop is halted is dropped.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.ticking {
            return None;
        }
        if !self.state.paused {
            self.state.remaining_secs = self.state.remaining_secs.saturating_sub(1);
        }
        // The `00:00` frame is shown before the flip.
        self.refresh();
        self.persist();

        if self.state.remaining_secs > 0 {
            return None;
        }

        self.ticking = false;
        let ended = self.state.phase;
        if let Err(e) = self.notifier.notify(ended.completion_message()) {
            tracing::warn!("notification failed: {e}");
        }

        let next = ended.opposite();
        self.state.phase = next;
        self.state.paused = false;
        self.state.remaining_secs = self.state.full_duration();
        self.persist();
        tracing::info!(%ended, %next, "phase complete");
        self.start(true);

        Some(Event::PhaseCompleted {
            ended,
            next,
            next_duration_secs: self.state.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Re-render the indicator for the current state.
    pub fn refresh(&mut self) {
        let text = self.indicator();
        self.render(&text);
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn render(&mut self, text: &str) {
        if let Err(e) = self.display.render(text) {
            tracing::warn!("display refresh failed: {e}");
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.state.save(&mut self.store) {
            tracing::warn!("failed to persist timer state: {e}");
        }
    }
}

fn minutes_to_secs(field: &'static str, minutes: i64) -> Result<u64, ValidationError> {
    if minutes <= 0 {
        return Err(ValidationError::NonPositiveDuration {
            field,
            value: minutes.to_string(),
        });
    }
    Ok((minutes as u64).saturating_mul(60))
}
