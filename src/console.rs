//! Line-oriented terminal front end
//!
//! Parses typed commands and renders registry snapshots. Everything here is a
//! projection of the registry state; none of it mutates timers directly.

use serde::Serialize;
use thiserror::Error;

use crate::{
    config::DurationUnit,
    state::{Completion, TimerId, TimerView},
};

/// A command typed at the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// `add <name> [duration]`; `None` means the configured default
    Add { name: String, amount: Option<u64> },
    Start(TimerId),
    Pause(TimerId),
    Reset(TimerId),
    Remove(TimerId),
    List,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command '{0}', type 'help' for a list")]
    UnknownCommand(String),

    #[error("'{0}' needs a timer id")]
    MissingId(&'static str),

    #[error("'{0}' is not a timer id")]
    BadId(String),

    #[error("'add' needs a timer name")]
    MissingName,

    #[error("duration must be a positive number, got {0}")]
    NegativeDuration(i64),

    #[error("'{0}' is not a usable duration")]
    BadDuration(String),
}

pub const HELP: &str = "\
Commands:
  add <name> [duration]  create a timer (duration defaults to the configured value)
  start <id>             start or resume a timer
  pause <id>             pause a running timer
  reset <id>             reset a timer to its full duration
  remove <id>            delete a timer
  list                   show all timers
  help                   show this message
  quit                   exit";

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, ParseError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let command = match verb.to_lowercase().as_str() {
        "add" | "new" => parse_add(&rest)?,
        "start" | "resume" => ConsoleCommand::Start(parse_id("start", &rest)?),
        "pause" => ConsoleCommand::Pause(parse_id("pause", &rest)?),
        "reset" => ConsoleCommand::Reset(parse_id("reset", &rest)?),
        "remove" | "rm" | "delete" => ConsoleCommand::Remove(parse_id("remove", &rest)?),
        "list" | "ls" => ConsoleCommand::List,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };
    Ok(Some(command))
}

fn parse_add(words: &[&str]) -> Result<ConsoleCommand, ParseError> {
    // A trailing integer is the duration; everything before it is the name
    let (name_words, amount) = match words.split_last() {
        Some((last, init)) if !init.is_empty() && is_integer(last) => {
            (init, Some(parse_duration(last)?))
        }
        _ => (words, None),
    };

    if name_words.is_empty() {
        return Err(ParseError::MissingName);
    }
    Ok(ConsoleCommand::Add {
        name: name_words.join(" "),
        amount,
    })
}

fn is_integer(word: &str) -> bool {
    let digits = word.strip_prefix('-').unwrap_or(word);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn parse_duration(word: &str) -> Result<u64, ParseError> {
    if word.starts_with('-') {
        return match word.parse::<i64>() {
            Ok(amount) if amount < 0 => Err(ParseError::NegativeDuration(amount)),
            // "-0"
            Ok(_) => Ok(0),
            Err(_) => Err(ParseError::BadDuration(word.to_string())),
        };
    }
    word.parse::<u64>()
        .map_err(|_| ParseError::BadDuration(word.to_string()))
}

fn parse_id(verb: &'static str, words: &[&str]) -> Result<TimerId, ParseError> {
    let word = words.first().ok_or(ParseError::MissingId(verb))?;
    word.trim_start_matches('#')
        .parse::<u64>()
        .map(TimerId)
        .map_err(|_| ParseError::BadId(word.to_string()))
}

/// Seconds for an `add` command, applying the default and the unit.
/// Zero passes through so the registry can reject it.
pub fn add_seconds(amount: Option<u64>, default_amount: u64, unit: DurationUnit) -> Option<u64> {
    unit.to_seconds(amount.unwrap_or(default_amount))
}

/// One human-readable line per timer
pub fn render_line(view: &TimerView) -> String {
    let mut controls = Vec::new();
    if view.can_start() {
        controls.push("start");
    }
    if view.can_pause() {
        controls.push("pause");
    }
    controls.push("reset");
    controls.push("remove");

    format!(
        "#{:<3} {:<20} {:>6}  {:<8}  [{}]",
        view.id,
        view.name,
        view.remaining_formatted,
        view.state,
        controls.join(" "),
    )
}

/// Full human-readable listing
pub fn render_snapshot(snapshot: &[TimerView]) -> String {
    if snapshot.is_empty() {
        return "No timers. Type 'add <name> [duration]' to create one.".to_string();
    }
    snapshot.iter().map(render_line).collect::<Vec<_>>().join("\n")
}

/// Completion notice, prefixed with a terminal bell
pub fn render_completion(completion: &Completion) -> String {
    format!(
        "\x07Timer #{} '{}' finished at {}",
        completion.id,
        completion.name,
        completion.finished_at.format("%H:%M:%S"),
    )
}

/// Machine-readable output record for `--json` mode
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JsonEvent<'a> {
    Snapshot { timers: &'a [TimerView] },
    Completion(&'a Completion),
}

impl JsonEvent<'_> {
    pub fn to_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
