use clap::Subcommand;
use twophase_core::control::parse_minutes_as_secs;
use twophase_core::{Config, Database, PomodoroTimer, TimerState};

use crate::sinks::{CliNotifier, QuietDisplay};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Restart the current phase from its full duration
    ///
    /// Only rewinds and persists the phase; ticking happens under `run`.
    Start,
    /// Toggle pause
    Pause,
    /// Stop and rewind the current phase
    Stop,
    /// Set work and break lengths in minutes
    Set {
        /// Work minutes
        #[arg(allow_hyphen_values = true)]
        work: String,
        /// Break minutes
        #[arg(value_name = "BREAK", allow_hyphen_values = true)]
        break_minutes: String,
    },
    /// Print current timer state as JSON
    Status,
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let state = TimerState::load(&db, &config.default_state());
    let mut timer = PomodoroTimer::new(
        state,
        db,
        QuietDisplay,
        CliNotifier::terminal(&config.notifications),
    )
    .with_show_seconds(config.display.show_seconds);

    let event = match action {
        TimerAction::Start => timer.restart_phase(),
        TimerAction::Pause => timer.pause(),
        TimerAction::Stop => timer.stop(),
        TimerAction::Set {
            work,
            break_minutes,
        } => {
            let w = parse_minutes_as_secs("work", &work)?;
            let b = parse_minutes_as_secs("break", &break_minutes)?;
            Some(timer.reconfigure_secs(w, b)?)
        }
        TimerAction::Status => Some(timer.snapshot()),
    };

    if let Some(event) = event {
        println!("{}", serde_json::to_string_pretty(&event)?);
    }
    Ok(())
}
