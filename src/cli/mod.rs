//! CLI module for the pomodoro timer.
//!
//! This module provides the command-line interface:
//! - `commands`: Command definitions using clap derive
//! - `input`: Parser for commands typed while the timer runs
//! - `display`: Output formatting and display logic

pub mod commands;
pub mod display;
pub mod input;

pub use commands::{Cli, Commands, HistoryArgs, RunArgs, SettingsArgs, TaskCommand};
pub use display::Display;
pub use input::{parse_command, InputError, UserCommand};
