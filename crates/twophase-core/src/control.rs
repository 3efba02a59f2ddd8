//! Control-surface messages.
//!
//! A control surface sends one of four commands. They arrive either as the
//! JSON message form (`{"command":"setTimes","work":"25","breakDuration":"5"}`)
//! or as plain words (`start`, `pause`, `stop`, `set 25 5`).

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::capabilities::{DisplaySink, KeyValueStore, Notifier};
use crate::error::ValidationError;
use crate::events::Event;
use crate::timer::PomodoroTimer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum ControlMessage {
    Start,
    Pause,
    Stop,
    SetTimes {
        /// Work minutes, as typed.
        #[serde(deserialize_with = "minutes_text")]
        work: String,
        /// Break minutes, as typed.
        #[serde(rename = "breakDuration", deserialize_with = "minutes_text")]
        break_duration: String,
    },
}

/// Why a line could not be turned into a [`ControlMessage`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseMessageError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("usage: set <work-minutes> <break-minutes>")]
    SetUsage,
    #[error("malformed message: {0}")]
    Json(String),
}

impl FromStr for ControlMessage {
    type Err = ParseMessageError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.starts_with('{') {
            return serde_json::from_str(line).map_err(|e| ParseMessageError::Json(e.to_string()));
        }

        let mut words = line.split_whitespace();
        let head = words.next().ok_or(ParseMessageError::Empty)?;
        match head.to_ascii_lowercase().as_str() {
            "start" => Ok(ControlMessage::Start),
            "pause" => Ok(ControlMessage::Pause),
            "stop" => Ok(ControlMessage::Stop),
            "set" | "settimes" => {
                let work = words.next().ok_or(ParseMessageError::SetUsage)?;
                let break_duration = words.next().ok_or(ParseMessageError::SetUsage)?;
                if words.next().is_some() {
                    return Err(ParseMessageError::SetUsage);
                }
                Ok(ControlMessage::SetTimes {
                    work: work.to_string(),
                    break_duration: break_duration.to_string(),
                })
            }
            other => Err(ParseMessageError::Unknown(other.to_string())),
        }
    }
}

/// Apply a control message to the timer.
///
/// `setTimes` reports its outcome through the timer's notifier: a short
/// confirmation on success, an error notice on invalid input. The
/// validation error is also returned so hosts can set an exit status.
pub fn dispatch<S, D, N>(
    timer: &mut PomodoroTimer<S, D, N>,
    message: ControlMessage,
) -> Result<Option<Event>, ValidationError>
where
    S: KeyValueStore,
    D: DisplaySink,
    N: Notifier,
{
    tracing::debug!(?message, "control message");
    match message {
        ControlMessage::Start => Ok(timer.restart_phase()),
        ControlMessage::Pause => Ok(timer.pause()),
        ControlMessage::Stop => Ok(timer.stop()),
        ControlMessage::SetTimes {
            work,
            break_duration,
        } => {
            let result = parse_minutes_as_secs("work", &work)
                .and_then(|w| Ok((w, parse_minutes_as_secs("break", &break_duration)?)))
                .and_then(|(w, b)| timer.reconfigure_secs(w, b).map(|event| (w, b, event)));
            match result {
                Ok((w, b, event)) => {
                    let notice = format!(
                        "Durations updated: work {} min, break {} min",
                        w as f64 / 60.0,
                        b as f64 / 60.0
                    );
                    if let Err(e) = timer.notifier_mut().notify(&notice) {
                        tracing::warn!("notification failed: {e}");
                    }
                    Ok(Some(event))
                }
                Err(err) => {
                    tracing::info!("rejected durations: {err}");
                    if let Err(e) = timer.notifier_mut().notify_error(&err.to_string()) {
                        tracing::warn!("notification failed: {e}");
                    }
                    Err(err)
                }
            }
        }
    }
}

/// Parse a minute count such as `"25"` or `"2.5"` into whole seconds.
///
/// Rounds to the nearest second. Anything that rounds to zero or below is
/// rejected, as is text that is not a finite number.
pub fn parse_minutes_as_secs(field: &'static str, input: &str) -> Result<u64, ValidationError> {
    let text = input.trim();
    let minutes = text
        .parse::<f64>()
        .ok()
        .filter(|m| m.is_finite())
        .ok_or_else(|| ValidationError::NotANumber {
            field,
            input: input.to_string(),
        })?;
    let secs = (minutes * 60.0).round();
    if secs <= 0.0 {
        return Err(ValidationError::NonPositiveDuration {
            field,
            value: text.to_string(),
        });
    }
    Ok(secs as u64)
}

/// Accept `"25"` as well as `25` for a minute field.
fn minutes_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected minutes as string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{MemoryStore, RecordingDisplay, RecordingNotifier};
    use crate::timer::{Phase, RunStatus, TimerState};

    fn timer() -> PomodoroTimer<MemoryStore, RecordingDisplay, RecordingNotifier> {
        PomodoroTimer::new(
            TimerState::default(),
            MemoryStore::new(),
            RecordingDisplay::new(),
            RecordingNotifier::new(),
        )
    }

    #[test]
    fn parses_plain_words() {
        assert_eq!("start".parse::<ControlMessage>(), Ok(ControlMessage::Start));
        assert_eq!(" PAUSE ".parse::<ControlMessage>(), Ok(ControlMessage::Pause));
        assert_eq!("stop".parse::<ControlMessage>(), Ok(ControlMessage::Stop));
        assert_eq!(
            "set 30 10".parse::<ControlMessage>(),
            Ok(ControlMessage::SetTimes {
                work: "30".into(),
                break_duration: "10".into()
            })
        );
    }

    #[test]
    fn rejects_bad_lines() {
        assert_eq!("".parse::<ControlMessage>(), Err(ParseMessageError::Empty));
        assert_eq!("set 5".parse::<ControlMessage>(), Err(ParseMessageError::SetUsage));
        assert!(matches!(
            "jump".parse::<ControlMessage>(),
            Err(ParseMessageError::Unknown(_))
        ));
        assert!(matches!(
            "{\"command\":\"fly\"}".parse::<ControlMessage>(),
            Err(ParseMessageError::Json(_))
        ));
    }

    #[test]
    fn parses_json_messages() {
        let msg: ControlMessage =
            r#"{"command":"setTimes","work":"25","breakDuration":"5"}"#.parse().unwrap();
        assert_eq!(
            msg,
            ControlMessage::SetTimes {
                work: "25".into(),
                break_duration: "5".into()
            }
        );
        let msg: ControlMessage = r#"{"command":"setTimes","work":40,"breakDuration":8}"#
            .parse()
            .unwrap();
        assert_eq!(
            msg,
            ControlMessage::SetTimes {
                work: "40".into(),
                break_duration: "8".into()
            }
        );
        assert_eq!(
            r#"{"command":"pause"}"#.parse::<ControlMessage>(),
            Ok(ControlMessage::Pause)
        );
    }

    #[test]
    fn start_clears_pause_and_restarts() {
        let mut timer = timer();
        timer.start(false);
        timer.tick();
        timer.pause();
        dispatch(&mut timer, ControlMessage::Start).unwrap();
        assert_eq!(timer.status(), RunStatus::Running);
        assert_eq!(timer.state().remaining_secs, 1500);
    }

    #[test]
    fn set_times_confirms() {
        let mut timer = timer();
        let event = dispatch(
            &mut timer,
            ControlMessage::SetTimes {
                work: "45".into(),
                break_duration: "15".into(),
            },
        )
        .unwrap();
        assert!(matches!(event, Some(Event::Reconfigured { .. })));
        assert_eq!(timer.state().work_duration_secs, 2700);
        assert_eq!(timer.state().phase, Phase::Work);
        assert_eq!(
            timer.notifier().messages(),
            &["Durations updated: work 45 min, break 15 min".to_string()]
        );
    }

    #[test]
    fn invalid_set_times_routes_to_error_notice() {
        let mut timer = timer();
        let before = *timer.state();
        for (w, b) in [("0", "5"), ("5", "-2"), ("abc", "5"), ("", "5")] {
            let result = dispatch(
                &mut timer,
                ControlMessage::SetTimes {
                    work: w.into(),
                    break_duration: b.into(),
                },
            );
            assert!(result.is_err());
            assert_eq!(*timer.state(), before);
        }
        assert_eq!(timer.notifier().errors().len(), 4);
        assert!(timer.notifier().messages().is_empty());
    }

    #[test]
    fn set_times_accepts_fractional_minutes() {
        let mut timer = timer();
        dispatch(
            &mut timer,
            r#"{"command":"setTimes","work":"2.5","breakDuration":"0.5"}"#
                .parse()
                .unwrap(),
        )
        .unwrap();
        assert_eq!(timer.state().work_duration_secs, 150);
        assert_eq!(timer.state().break_duration_secs, 30);
        assert_eq!(timer.state().remaining_secs, 150);
        assert_eq!(
            timer.notifier().messages(),
            &["Durations updated: work 2.5 min, break 0.5 min".to_string()]
        );
    }

    #[test]
    fn minutes_that_round_to_zero_are_rejected() {
        let mut timer = timer();
        let before = *timer.state();
        let result = dispatch(
            &mut timer,
            ControlMessage::SetTimes {
                work: "0.001".into(),
                break_duration: "5".into(),
            },
        );
        assert_eq!(
            result,
            Err(ValidationError::NonPositiveDuration {
                field: "work",
                value: "0.001".into()
            })
        );
        assert_eq!(*timer.state(), before);
        assert_eq!(timer.notifier().errors().len(), 1);
    }

    #[test]
    fn minute_parsing() {
        assert_eq!(parse_minutes_as_secs("work", " 25 "), Ok(1500));
        assert_eq!(parse_minutes_as_secs("work", "2.5"), Ok(150));
        assert_eq!(parse_minutes_as_secs("work", "0.01"), Ok(1));
        assert!(matches!(
            parse_minutes_as_secs("work", "-1"),
            Err(ValidationError::NonPositiveDuration { .. })
        ));
        for bad in ["ten", "", "inf", "NaN"] {
            assert!(matches!(
                parse_minutes_as_secs("break", bad),
                Err(ValidationError::NotANumber { field: "break", .. })
            ));
        }
    }
}
