//! Command definitions for the pomodoro CLI.
//!
//! Uses clap derive macro for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::tasks::{TaskCategory, TaskFilter, TaskId};
use crate::types::{
    SettingsUpdate, MAX_LONG_BREAK_MINUTES, MAX_SHORT_BREAK_MINUTES, MAX_WORK_MINUTES,
};

// ============================================================================
// CLI Structure
// ============================================================================

/// Pomodoro timer with work/break scheduling and session history
#[derive(Parser, Debug)]
#[command(
    name = "pomodoro",
    version,
    about = "ターミナルで動くポモドーロタイマー",
    long_about = "作業と休憩を交互に計測するポモドーロタイマー。\n\
                  4ポモドーロごとに長い休憩を挟み、完了したセッションを履歴に記録します。",
    propagate_version = true
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory for stored settings and history (default: ~/.pomodoro)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

// ============================================================================
// Subcommands
// ============================================================================

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the timer in the foreground
    Run(RunArgs),

    /// Show completed sessions
    History(HistoryArgs),

    /// Show or change stored settings
    Settings(SettingsArgs),

    /// Manage the task list
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type for completion script
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ============================================================================
// Run Command Arguments
// ============================================================================

/// Arguments for the run command
///
/// Durations given here override the stored settings for this run only.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Work duration in minutes
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_WORK_MINUTES))
    )]
    pub work: Option<u32>,

    /// Short break duration in minutes
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_SHORT_BREAK_MINUTES))
    )]
    pub short_break: Option<u32>,

    /// Long break duration in minutes
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_LONG_BREAK_MINUTES))
    )]
    pub long_break: Option<u32>,

    /// Start breaks automatically after a work session
    #[arg(long)]
    pub auto_start_breaks: bool,

    /// Start work sessions automatically after a break
    #[arg(long)]
    pub auto_start_pomodoros: bool,

    /// Do not ring the terminal bell on completion
    #[arg(long)]
    pub no_bell: bool,

    /// Task credited with each completed pomodoro
    #[arg(short, long, value_name = "ID")]
    pub task: Option<TaskId>,
}

impl RunArgs {
    /// Converts the overrides into a settings update.
    ///
    /// Auto-start flags only ever switch the policy on.
    pub fn to_update(&self) -> SettingsUpdate {
        SettingsUpdate {
            work_minutes: self.work.map(i64::from),
            short_break_minutes: self.short_break.map(i64::from),
            long_break_minutes: self.long_break.map(i64::from),
            auto_start_breaks: self.auto_start_breaks.then_some(true),
            auto_start_pomodoros: self.auto_start_pomodoros.then_some(true),
        }
    }
}

// ============================================================================
// History Command Arguments
// ============================================================================

/// Arguments for the history command
#[derive(Args, Debug, Clone)]
pub struct HistoryArgs {
    /// Number of recent sessions to list
    #[arg(short = 'n', long, default_value = "10")]
    pub limit: usize,

    /// List every stored session
    #[arg(short, long)]
    pub all: bool,
}

impl Default for HistoryArgs {
    fn default() -> Self {
        Self {
            limit: 10,
            all: false,
        }
    }
}

// ============================================================================
// Settings Command Arguments
// ============================================================================

/// Arguments for the settings command
///
/// Without options the stored settings are shown.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Work duration in minutes
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_WORK_MINUTES))
    )]
    pub work: Option<u32>,

    /// Short break duration in minutes
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_SHORT_BREAK_MINUTES))
    )]
    pub short_break: Option<u32>,

    /// Long break duration in minutes
    #[arg(
        short,
        long,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_LONG_BREAK_MINUTES))
    )]
    pub long_break: Option<u32>,

    /// Start breaks automatically after a work session
    #[arg(long, value_name = "BOOL")]
    pub auto_start_breaks: Option<bool>,

    /// Start work sessions automatically after a break
    #[arg(long, value_name = "BOOL")]
    pub auto_start_pomodoros: Option<bool>,
}

impl SettingsArgs {
    /// Converts the options into a settings update.
    pub fn to_update(&self) -> SettingsUpdate {
        SettingsUpdate {
            work_minutes: self.work.map(i64::from),
            short_break_minutes: self.short_break.map(i64::from),
            long_break_minutes: self.long_break.map(i64::from),
            auto_start_breaks: self.auto_start_breaks,
            auto_start_pomodoros: self.auto_start_pomodoros,
        }
    }
}

// ============================================================================
// Task Subcommands
// ============================================================================

/// Task list operations
#[derive(Subcommand, Debug, Clone)]
pub enum TaskCommand {
    /// Add a task
    Add {
        /// Task description
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Task category
        #[arg(short, long, value_enum, default_value_t = TaskCategory::General)]
        category: TaskCategory,

        /// Planned number of pomodoros
        #[arg(short, long, default_value = "0")]
        estimate: u32,
    },

    /// List tasks
    List {
        /// Which tasks to show
        #[arg(short, long, value_enum, default_value_t = TaskFilter::Active)]
        filter: TaskFilter,
    },

    /// Mark a task completed, or active again if it already is
    Done {
        /// Task ID
        id: TaskId,
    },

    /// Change the description of a task
    Edit {
        /// Task ID
        id: TaskId,

        /// New description
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Delete a task
    Rm {
        /// Task ID
        id: TaskId,
    },
}

// ============================================================================
// Tests
// ============================================================================
