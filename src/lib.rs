//! Pomodoro Scheduler Library
//!
//! This library provides a pomodoro session timer.
//! It includes:
//! - Session state machine with work/break alternation and long-break cadence
//! - Tokio driver that ticks the scheduler once per second
//! - JSON store for settings, completed-session history and tasks
//! - Task list credited with completed pomodoros
//! - CLI command parsing and display utilities
//! - Type definitions for settings, records and snapshots

pub mod cli;
pub mod driver;
pub mod scheduler;
pub mod store;
pub mod tasks;
pub mod types;

// Re-export commonly used types for convenience
pub use driver::SchedulerDriver;
pub use scheduler::{
    goal_progress, next_transition, HistoryLog, NotificationCallback, SchedulerEvent,
    SessionClock, SessionScheduler, Transition, AUTO_START_DELAY_TICKS, DAILY_GOAL_POMODOROS,
    LONG_BREAK_INTERVAL,
};
pub use store::{Store, StoreError};
pub use tasks::{Task, TaskCategory, TaskError, TaskFilter, TaskId, TaskList};
pub use types::{
    CompletedSessionRecord, SchedulerSnapshot, SessionKind, Settings, SettingsError,
    SettingsUpdate,
};
