//! The persisted timer state and its key-value encoding.

use serde::{Deserialize, Serialize};

use super::phase::Phase;
use crate::capabilities::KeyValueStore;
use crate::error::Result;

pub const DEFAULT_WORK_SECS: u64 = 25 * 60;
pub const DEFAULT_BREAK_SECS: u64 = 5 * 60;

/// Store keys for the five persisted fields.
pub mod keys {
    pub const WORK_DURATION: &str = "work_duration_secs";
    pub const BREAK_DURATION: &str = "break_duration_secs";
    pub const REMAINING: &str = "remaining_secs";
    pub const IS_WORK: &str = "is_work";
    pub const PAUSED: &str = "paused";

    pub const ALL: [&str; 5] = [WORK_DURATION, BREAK_DURATION, REMAINING, IS_WORK, PAUSED];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub phase: Phase,
    /// Seconds left in the current phase.
    pub remaining_secs: u64,
    pub paused: bool,
    pub work_duration_secs: u64,
    pub break_duration_secs: u64,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::with_durations(DEFAULT_WORK_SECS, DEFAULT_BREAK_SECS)
    }
}

impl TimerState {
    /// Fresh state at the top of a work phase.
    ///
    /// Zero durations are replaced by the built-in defaults.
    pub fn with_durations(work_secs: u64, break_secs: u64) -> Self {
        let work_duration_secs = if work_secs == 0 { DEFAULT_WORK_SECS } else { work_secs };
        let break_duration_secs = if break_secs == 0 { DEFAULT_BREAK_SECS } else { break_secs };
        Self {
            phase: Phase::Work,
            remaining_secs: work_duration_secs,
            paused: false,
            work_duration_secs,
            break_duration_secs,
        }
    }

    pub fn duration_of(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Work => self.work_duration_secs,
            Phase::Break => self.break_duration_secs,
        }
    }

    /// Full length of the active phase.
    pub fn full_duration(&self) -> u64 {
        self.duration_of(self.phase)
    }

    pub fn max_duration(&self) -> u64 {
        self.work_duration_secs.max(self.break_duration_secs)
    }

    /// Load from `store`, using `defaults` for anything missing.
    ///
    /// Values that would break the state invariants are pulled back in:
    /// zero durations revert to the defaults and the remaining time is
    /// clamped to the longest configured phase.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, defaults: &TimerState) -> Self {
        let mut work = store.get_u64_or(keys::WORK_DURATION, defaults.work_duration_secs);
        let mut brk = store.get_u64_or(keys::BREAK_DURATION, defaults.break_duration_secs);
        if work == 0 {
            tracing::warn!("persisted work duration is zero, using default");
            work = defaults.work_duration_secs;
        }
        if brk == 0 {
            tracing::warn!("persisted break duration is zero, using default");
            brk = defaults.break_duration_secs;
        }

        let phase = Phase::from_is_work(store.get_bool_or(keys::IS_WORK, defaults.phase.is_work()));
        let mut state = Self {
            phase,
            remaining_secs: 0,
            paused: store.get_bool_or(keys::PAUSED, defaults.paused),
            work_duration_secs: work,
            break_duration_secs: brk,
        };
        let remaining = store.get_u64_or(keys::REMAINING, state.full_duration());
        state.remaining_secs = remaining.min(state.max_duration());
        state
    }

    /// Write all five fields. Stops at the first failing write.
    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<()> {
        store.set(keys::WORK_DURATION, &self.work_duration_secs.to_string())?;
        store.set(keys::BREAK_DURATION, &self.break_duration_secs.to_string())?;
        store.set(keys::REMAINING, &self.remaining_secs.to_string())?;
        store.set(keys::IS_WORK, &self.phase.is_work().to_string())?;
        store.set(keys::PAUSED, &self.paused.to_string())?;
        Ok(())
    }

    /// Remaining time as `MM:SS`. Minutes are not wrapped at an hour.
    pub fn clock(&self) -> String {
        format!("{:02}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }

    /// Remaining time rounded up to whole minutes, e.g. `25m`.
    pub fn clock_minutes(&self) -> String {
        format!("{}m", self.remaining_secs.div_ceil(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::MemoryStore;

    #[test]
    fn defaults_match_classic_pomodoro() {
        let state = TimerState::default();
        assert_eq!(state.phase, Phase::Work);
        assert_eq!(state.remaining_secs, 1500);
        assert_eq!(state.work_duration_secs, 1500);
        assert_eq!(state.break_duration_secs, 300);
        assert!(!state.paused);
    }

    #[test]
    fn empty_store_loads_defaults() {
        let store = MemoryStore::new();
        assert_eq!(TimerState::load(&store, &TimerState::default()), TimerState::default());
    }

    #[test]
    fn save_writes_all_keys() {
        let mut store = MemoryStore::new();
        TimerState::default().save(&mut store).unwrap();
        for key in keys::ALL {
            assert!(store.get(key).is_some(), "missing {key}");
        }
        assert_eq!(store.get(keys::IS_WORK).as_deref(), Some("true"));
    }

    #[test]
    fn save_then_load_roundtrips() {
        let state = TimerState {
            phase: Phase::Break,
            remaining_secs: 42,
            paused: true,
            work_duration_secs: 600,
            break_duration_secs: 120,
        };
        let mut store = MemoryStore::new();
        state.save(&mut store).unwrap();
        assert_eq!(TimerState::load(&store, &TimerState::default()), state);
    }

    #[test]
    fn load_repairs_broken_values() {
        let mut store = MemoryStore::new();
        store.set(keys::WORK_DURATION, "0").unwrap();
        store.set(keys::BREAK_DURATION, "60").unwrap();
        store.set(keys::REMAINING, "999999").unwrap();
        let state = TimerState::load(&store, &TimerState::default());
        assert_eq!(state.work_duration_secs, DEFAULT_WORK_SECS);
        assert_eq!(state.remaining_secs, DEFAULT_WORK_SECS);
    }

    #[test]
    fn clock_formats() {
        let mut state = TimerState::default();
        assert_eq!(state.clock(), "25:00");
        state.remaining_secs = 61;
        assert_eq!(state.clock(), "01:01");
        assert_eq!(state.clock_minutes(), "2m");
        state.remaining_secs = 0;
        assert_eq!(state.clock(), "00:00");
        assert_eq!(state.clock_minutes(), "0m");
    }
}
