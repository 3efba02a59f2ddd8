mod engine;
mod phase;
mod state;

pub use engine::{PomodoroTimer, RunStatus, STOPPED_INDICATOR};
pub use phase::Phase;
pub use state::{keys, TimerState, DEFAULT_BREAK_SECS, DEFAULT_WORK_SECS};
