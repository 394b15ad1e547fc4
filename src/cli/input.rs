//! Parser for commands typed while the timer runs in the foreground.

use thiserror::Error;

use crate::types::{SessionKind, SettingsUpdate};

/// A command entered on standard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Start,
    Pause,
    Reset,
    Skip,
    Switch(SessionKind),
    Set(SettingsUpdate),
    Status,
    Help,
    Quit,
}

/// Errors for unparseable input lines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Line contained only whitespace
    #[error("コマンドが入力されていません")]
    Empty,

    /// First word is not a known command
    #[error("不明なコマンドです: {0}")]
    UnknownCommand(String),

    /// `set` without a field or value
    #[error("使い方: set <work|short|long> <分>")]
    IncompleteSet,

    /// `set` with a field that does not exist
    #[error("不明な設定項目です: {0}")]
    UnknownField(String),

    /// `set` with a value that is not an integer
    #[error("分は整数で指定してください: {0}")]
    InvalidMinutes(String),
}

/// Parses one input line.
///
/// Durations given to `set` are passed through as typed; the scheduler
/// ignores non-positive values.
pub fn parse_command(line: &str) -> Result<UserCommand, InputError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(InputError::Empty);
    };

    let command = match head.to_lowercase().as_str() {
        "s" | "start" => UserCommand::Start,
        "p" | "pause" => UserCommand::Pause,
        "r" | "reset" => UserCommand::Reset,
        "k" | "skip" => UserCommand::Skip,
        "w" | "work" => UserCommand::Switch(SessionKind::Work),
        "b" | "short" => UserCommand::Switch(SessionKind::ShortBreak),
        "l" | "long" => UserCommand::Switch(SessionKind::LongBreak),
        "status" => UserCommand::Status,
        "h" | "help" | "?" => UserCommand::Help,
        "q" | "quit" | "exit" => UserCommand::Quit,
        "set" => {
            let (Some(field), Some(value)) = (words.next(), words.next()) else {
                return Err(InputError::IncompleteSet);
            };
            UserCommand::Set(parse_set(field, value)?)
        }
        _ => return Err(InputError::UnknownCommand(head.to_string())),
    };

    Ok(command)
}

fn parse_set(field: &str, value: &str) -> Result<SettingsUpdate, InputError> {
    let minutes: i64 = value
        .parse()
        .map_err(|_| InputError::InvalidMinutes(value.to_string()))?;

    let update = SettingsUpdate::default();
    match field.to_lowercase().as_str() {
        "work" | "w" => Ok(update.work_minutes(minutes)),
        "short" | "b" => Ok(update.short_break_minutes(minutes)),
        "long" | "l" => Ok(update.long_break_minutes(minutes)),
        _ => Err(InputError::UnknownField(field.to_string())),
    }
}
