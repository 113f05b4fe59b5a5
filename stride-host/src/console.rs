//! Line-oriented user interface
//!
//! Parses commands typed while the pedometer runs and renders replies.
//! The same rendering backs the one-shot CLI subcommands.

use std::fmt::Write as _;

use stride_core::{HistoryEntry, ResetTime};
use tokio::sync::{mpsc, oneshot};

use crate::pedometer::Status;
use crate::runtime::Command;

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Step,
    Reset,
    SetResetTime(String),
    Status,
    History,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  step            count one step by hand
  reset           archive today's total and start from zero
  time HH:MM      change the daily reset time
  status          show the current count and next reset
  history         list archived daily totals
  quit            stop";

/// Parse a line; `Err` carries a message for the user
pub fn parse_input(line: &str) -> Result<Input, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(String::from("empty command"));
    };
    let input = match (verb, words.next()) {
        ("step" | "s" | "+", None) => Input::Step,
        ("reset", None) => Input::Reset,
        ("time", Some(time)) => Input::SetResetTime(time.to_string()),
        ("time", None) => return Err(String::from("usage: time HH:MM")),
        ("status", None) => Input::Status,
        ("history", None) => Input::History,
        ("help" | "?", None) => Input::Help,
        ("quit" | "q" | "exit", None) => Input::Quit,
        _ => return Err(format!("unknown command {line:?}, try `help`")),
    };
    if words.next().is_some() {
        return Err(format!("unexpected arguments in {line:?}"));
    }
    Ok(input)
}

pub fn render_status(status: &Status) -> String {
    format!(
        "steps: {}\nreset time: {}\nnext reset: {}\nsensor: {}",
        status.steps,
        status.reset_time,
        status.next_reset.format("%Y-%m-%d %H:%M %:z"),
        status.sensor.as_str(),
    )
}

pub fn render_history(history: &[HistoryEntry]) -> String {
    if history.is_empty() {
        return String::from("no history yet");
    }
    let mut out = String::new();
    for entry in history {
        let _ = writeln!(out, "{}  {:>7}", entry.date, entry.steps);
    }
    out.truncate(out.trim_end().len());
    out
}

/// Outcome of a reset time change; a well-formed time that was refused
/// could not be saved
pub fn render_reset_time_reply(time: &str, accepted: bool) -> String {
    if accepted {
        format!("reset time set to {time}")
    } else if !ResetTime::is_valid(time) {
        format!("rejected {time:?}: expected HH:MM (00:00-23:59)")
    } else {
        format!("could not save reset time {time}; keeping the previous one")
    }
}

pub fn render_archived(entry: &HistoryEntry) -> String {
    format!("archived {} steps at {}", entry.steps, entry.date)
}

/// Send `input` to the runtime and render its reply
///
/// Returns `None` once the runtime is gone.
async fn dispatch(commands: &mpsc::Sender<Command>, input: Input) -> Option<String> {
    let rendered = match input {
        Input::Step => {
            let (reply, rx) = oneshot::channel();
            commands.send(Command::Step { reply }).await.ok()?;
            format!("steps: {}", rx.await.ok()?)
        }
        Input::Reset => {
            let (reply, rx) = oneshot::channel();
            commands.send(Command::Reset { reply }).await.ok()?;
            render_archived(&rx.await.ok()?)
        }
        Input::SetResetTime(time) => {
            let (reply, rx) = oneshot::channel();
            let cmd = Command::SetResetTime {
                time: time.clone(),
                reply,
            };
            commands.send(cmd).await.ok()?;
            render_reset_time_reply(&time, rx.await.ok()?)
        }
        Input::Status => {
            let (reply, rx) = oneshot::channel();
            commands.send(Command::Status { reply }).await.ok()?;
            render_status(&rx.await.ok()?)
        }
        Input::History => {
            let (reply, rx) = oneshot::channel();
            commands.send(Command::History { reply }).await.ok()?;
            render_history(&rx.await.ok()?)
        }
        Input::Help => HELP.to_string(),
        Input::Quit => {
            commands.send(Command::Shutdown).await.ok()?;
            return None;
        }
    };
    Some(rendered)
}

/// Forward stdin lines from a reader thread
///
/// A plain thread keeps a pending read from holding up runtime shutdown.
pub fn stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Turn input lines into commands until `quit`, EOF, or the runtime stops
///
/// Each reply is rendered and handed to `out`; parse errors go to stderr.
pub async fn serve<F>(
    mut lines: mpsc::UnboundedReceiver<String>,
    commands: mpsc::Sender<Command>,
    mut out: F,
) where
    F: FnMut(&str),
{
    while let Some(line) = lines.recv().await {
        if line.trim().is_empty() {
            continue;
        }
        match parse_input(&line) {
            Ok(input) => match dispatch(&commands, input).await {
                Some(rendered) => out(&rendered),
                None => break,
            },
            Err(message) => eprintln!("{message}"),
        }
    }
    tracing::debug!("console input closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use stride_core::SchedulerState;

    use crate::pedometer::SensorStatus;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_input("step"), Ok(Input::Step));
        assert_eq!(parse_input("  + "), Ok(Input::Step));
        assert_eq!(parse_input("reset"), Ok(Input::Reset));
        assert_eq!(
            parse_input("time 06:30"),
            Ok(Input::SetResetTime("06:30".into()))
        );
        assert_eq!(parse_input("q"), Ok(Input::Quit));
    }

    #[test]
    fn test_parse_rejects() {
        assert!(parse_input("").is_err());
        assert!(parse_input("time").is_err());
        assert!(parse_input("time 06:30 extra").is_err());
        assert!(parse_input("jump").is_err());
        assert!(parse_input("step 3").is_err());
    }

    #[test]
    fn test_render_status() {
        let offset = FixedOffset::east_opt(3600).unwrap();
        let status = Status {
            steps: 42,
            reset_time: ResetTime::new(4, 0).unwrap(),
            next_reset: offset.with_ymd_and_hms(2024, 1, 2, 4, 0, 0).unwrap(),
            sensor: SensorStatus::Unavailable,
            scheduler: SchedulerState::Armed,
        };
        assert_eq!(
            render_status(&status),
            "steps: 42\nreset time: 04:00\nnext reset: 2024-01-02 04:00 +01:00\nsensor: unavailable"
        );
    }

    #[test]
    fn test_render_reset_time_reply() {
        assert_eq!(
            render_reset_time_reply("06:30", true),
            "reset time set to 06:30"
        );
        assert_eq!(
            render_reset_time_reply("6:30", false),
            "rejected \"6:30\": expected HH:MM (00:00-23:59)"
        );
        // Valid format but the write failed
        assert_eq!(
            render_reset_time_reply("06:30", false),
            "could not save reset time 06:30; keeping the previous one"
        );
    }

    #[test]
    fn test_render_history() {
        assert_eq!(render_history(&[]), "no history yet");
        let history = [
            HistoryEntry::new(1200, "2024-01-01T00:00:00.000Z"),
            HistoryEntry::new(87, "2024-01-02T00:00:00.000Z"),
        ];
        assert_eq!(
            render_history(&history),
            "2024-01-01T00:00:00.000Z     1200\n2024-01-02T00:00:00.000Z       87"
        );
    }
}
