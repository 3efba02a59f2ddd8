use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Phase, RunStatus};

/// Every state change in the timer produces an Event.
/// Hosts print them, or use them to realign their tick interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        remaining_secs: u64,
        /// False when the phase was restarted from its full duration.
        resumed: bool,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    PhaseCompleted {
        ended: Phase,
        next: Phase,
        next_duration_secs: u64,
        at: DateTime<Utc>,
    },
    Reconfigured {
        work_duration_secs: u64,
        break_duration_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        status: RunStatus,
        phase: Phase,
        remaining_secs: u64,
        paused: bool,
        work_duration_secs: u64,
        break_duration_secs: u64,
        indicator: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Whether the host should restart its one-second interval from now.
    pub fn rearms_loop(&self) -> bool {
        matches!(
            self,
            Event::TimerStarted { .. } | Event::TimerResumed { .. } | Event::PhaseCompleted { .. }
        )
    }
}
