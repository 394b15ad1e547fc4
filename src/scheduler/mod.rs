//! Scheduler module for the pomodoro timer.
//!
//! This module contains the session state machine and its parts:
//! - `clock`: Countdown of the current session
//! - `policy`: Choice of the next session and its auto-start
//! - `history`: Append-only log of completed sessions
//! - `engine`: The scheduler composing the three

pub mod clock;
pub mod engine;
pub mod history;
pub mod policy;

pub use clock::{ClockTick, SessionClock};
pub use engine::{
    session_progress, NotificationCallback, SchedulerEvent, SessionScheduler,
    AUTO_START_DELAY_TICKS,
};
pub use history::{goal_progress, HistoryLog, DAILY_GOAL_POMODOROS};
pub use policy::{next_transition, Transition, LONG_BREAK_INTERVAL};
