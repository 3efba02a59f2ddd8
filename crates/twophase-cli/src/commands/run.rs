//! Interactive control surface.
//!
//! Drives the timer from a one-second interval on a single-threaded runtime
//! and reads control messages from stdin, one per line.

use std::time::Duration;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use twophase_core::{
    dispatch, Config, ControlMessage, Database, DisplaySink, Event, KeyValueStore, Notifier,
    PomodoroTimer, TimerState,
};

use crate::sinks::{CliNotifier, TerminalDisplay};

const TICK: Duration = Duration::from_secs(1);

const HELP: &str = "commands: start | pause | stop | set <work-min> <break-min> | status | help | quit";

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Keep state in memory only; nothing is read from or written to disk
    #[arg(long)]
    pub ephemeral: bool,

    /// Do not resume a running timer on startup
    #[arg(long)]
    pub no_resume: bool,
}

/// What the loop should do after handling one input line.
#[derive(Debug, PartialEq)]
enum Flow {
    Continue(Option<Event>),
    Quit,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .enable_io()
        .build()?;
    runtime.block_on(control_loop(args))
}

async fn control_loop(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = if args.ephemeral {
        Database::open_memory()?
    } else {
        Database::open()?
    };
    let state = TimerState::load(&db, &config.default_state());
    let mut timer = PomodoroTimer::new(
        state,
        db,
        TerminalDisplay,
        CliNotifier::from_config(&config.notifications),
    )
    .with_show_seconds(config.display.show_seconds);

    eprintln!("{HELP}");
    timer.refresh();
    if should_resume(&config, &args, timer.state()) {
        timer.start(true);
    }

    let mut interval = interval_at(Instant::now() + TICK, TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = interval.tick(), if timer.is_ticking() => {
                if let Some(event) = timer.tick() {
                    tracing::info!(?event, "phase complete");
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::debug!("stdin closed");
                    break;
                };
                match handle_line(&mut timer, &line) {
                    Flow::Quit => break,
                    Flow::Continue(Some(event)) if event.rearms_loop() => {
                        interval.reset();
                    }
                    Flow::Continue(_) => {}
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("interrupted");
                break;
            }
        }
    }

    println!();
    Ok(())
}

/// Pick up a countdown that was running when the last session ended.
fn should_resume(config: &Config, args: &RunArgs, state: &TimerState) -> bool {
    config.auto_resume && !args.no_resume && !state.paused
}

/// Apply one line of input to the timer.
fn handle_line<S, D, N>(timer: &mut PomodoroTimer<S, D, N>, line: &str) -> Flow
where
    S: KeyValueStore,
    D: DisplaySink,
    N: Notifier,
{
    let trimmed = line.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "" => return Flow::Continue(None),
        "quit" | "exit" | "q" => return Flow::Quit,
        "status" => {
            timer.refresh();
            return Flow::Continue(None);
        }
        "help" => {
            eprintln!("{HELP}");
            timer.refresh();
            return Flow::Continue(None);
        }
        _ => {}
    }

    match trimmed.parse::<ControlMessage>() {
        // Rejected durations were already reported through the notifier.
        Ok(message) => Flow::Continue(dispatch(timer, message).ok().flatten()),
        Err(e) => {
            if let Err(e) = timer.notifier_mut().notify_error(&e.to_string()) {
                tracing::warn!("notification failed: {e}");
            }
            Flow::Continue(None)
        }
    }
}
