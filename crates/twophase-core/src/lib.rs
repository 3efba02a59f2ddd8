//! # twophase Core Library
//!
//! Core logic for a two-phase work/break interval timer. Hosts (the CLI, or
//! any other front end) own the one-second interval and the control surface;
//! this crate owns the state machine and how it is persisted.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a tick-driven state machine that requires the caller
//!   to invoke `tick()` once per second while its loop is armed
//! - **Capabilities**: the persistence, display and notification traits the
//!   engine is handed at construction
//! - **Control**: the four control-surface messages and their dispatch
//! - **Storage**: SQLite key-value persistence and TOML configuration
//!
//! ## Key Components
//!
//! - [`PomodoroTimer`]: Core timer state machine
//! - [`TimerState`]: The five persisted fields
//! - [`Database`]: Key-value persistence across restarts
//! - [`Config`]: Application configuration management

pub mod capabilities;
pub mod control;
pub mod error;
pub mod events;
pub mod storage;
pub mod timer;

pub use capabilities::{
    DisplaySink, KeyValueStore, MemoryStore, Notifier, RecordingDisplay, RecordingNotifier,
};
pub use control::{dispatch, ControlMessage, ParseMessageError};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use storage::{Config, Database};
pub use timer::{Phase, PomodoroTimer, RunStatus, TimerState};
