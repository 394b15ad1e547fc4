//! Core data types for the pomodoro scheduler.
//!
//! This module defines the data structures used for:
//! - Session kinds and their configured durations
//! - Settings with partial updates and validation
//! - Completed session records
//! - The read model handed to consumers every tick

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Upper bound for the work duration accepted by the settings screen.
pub const MAX_WORK_MINUTES: u32 = 60;

/// Upper bound for the short break duration accepted by the settings screen.
pub const MAX_SHORT_BREAK_MINUTES: u32 = 30;

/// Upper bound for the long break duration accepted by the settings screen.
pub const MAX_LONG_BREAK_MINUTES: u32 = 60;

// ============================================================================
// SessionKind
// ============================================================================

/// The kind of interval the scheduler is currently counting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    /// Focused work (a pomodoro)
    #[default]
    Work,
    /// Short break between pomodoros
    ShortBreak,
    /// Long break after every fourth pomodoro
    LongBreak,
}

impl SessionKind {
    /// Returns the string representation of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Work => "work",
            SessionKind::ShortBreak => "short_break",
            SessionKind::LongBreak => "long_break",
        }
    }

    /// Returns the human-readable label shown in history listings.
    pub fn label(&self) -> &'static str {
        match self {
            SessionKind::Work => "Focus",
            SessionKind::ShortBreak => "Short Break",
            SessionKind::LongBreak => "Long Break",
        }
    }

    /// Returns true for either break kind.
    pub fn is_break(&self) -> bool {
        matches!(self, SessionKind::ShortBreak | SessionKind::LongBreak)
    }
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SettingsError
// ============================================================================

/// Validation errors for settings supplied at the host boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// Work duration outside the accepted range
    #[error("作業時間は1-60分の範囲で指定してください")]
    WorkMinutesOutOfRange,

    /// Short break duration outside the accepted range
    #[error("短い休憩時間は1-30分の範囲で指定してください")]
    ShortBreakMinutesOutOfRange,

    /// Long break duration outside the accepted range
    #[error("長い休憩時間は1-60分の範囲で指定してください")]
    LongBreakMinutesOutOfRange,
}

// ============================================================================
// Settings
// ============================================================================

/// Durations and auto-start policy for the scheduler.
///
/// Serialized with the camelCase field names used by persisted settings.
/// Missing fields fall back to their defaults and unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Work session length in minutes
    pub work_minutes: u32,
    /// Short break length in minutes
    pub short_break_minutes: u32,
    /// Long break length in minutes
    pub long_break_minutes: u32,
    /// Start the break immediately after a work session completes
    pub auto_start_breaks: bool,
    /// Start the next work session immediately after a break completes
    pub auto_start_pomodoros: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            auto_start_breaks: false,
            auto_start_pomodoros: false,
        }
    }
}

impl Settings {
    /// Returns the full length of a session of the given kind, in seconds.
    pub fn duration_secs(&self, kind: SessionKind) -> u32 {
        let minutes = match kind {
            SessionKind::Work => self.work_minutes,
            SessionKind::ShortBreak => self.short_break_minutes,
            SessionKind::LongBreak => self.long_break_minutes,
        };
        minutes.saturating_mul(60)
    }

    /// Creates a new configuration with the specified work duration.
    pub fn with_work_minutes(mut self, minutes: u32) -> Self {
        self.work_minutes = minutes;
        self
    }

    /// Creates a new configuration with the specified short break duration.
    pub fn with_short_break_minutes(mut self, minutes: u32) -> Self {
        self.short_break_minutes = minutes;
        self
    }

    /// Creates a new configuration with the specified long break duration.
    pub fn with_long_break_minutes(mut self, minutes: u32) -> Self {
        self.long_break_minutes = minutes;
        self
    }

    /// Creates a new configuration with the specified auto-start policy.
    pub fn with_auto_start(mut self, breaks: bool, pomodoros: bool) -> Self {
        self.auto_start_breaks = breaks;
        self.auto_start_pomodoros = pomodoros;
        self
    }

    /// Validates the durations against the ranges offered to users.
    ///
    /// The scheduler itself only needs positive durations; this is the
    /// stricter check applied where settings enter from outside.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(1..=MAX_WORK_MINUTES).contains(&self.work_minutes) {
            return Err(SettingsError::WorkMinutesOutOfRange);
        }
        if !(1..=MAX_SHORT_BREAK_MINUTES).contains(&self.short_break_minutes) {
            return Err(SettingsError::ShortBreakMinutesOutOfRange);
        }
        if !(1..=MAX_LONG_BREAK_MINUTES).contains(&self.long_break_minutes) {
            return Err(SettingsError::LongBreakMinutesOutOfRange);
        }
        Ok(())
    }

    /// Merges a partial update into these settings.
    ///
    /// Numeric fields that are not a positive number of minutes are left
    /// untouched. Returns the names of the rejected fields.
    pub fn merge(&mut self, update: &SettingsUpdate) -> Vec<&'static str> {
        let mut rejected = Vec::new();

        let mut apply = |value: Option<i64>, target: &mut u32, name: &'static str| {
            if let Some(raw) = value {
                match positive_minutes(raw) {
                    Some(minutes) => *target = minutes,
                    None => rejected.push(name),
                }
            }
        };
        apply(update.work_minutes, &mut self.work_minutes, "workMinutes");
        apply(
            update.short_break_minutes,
            &mut self.short_break_minutes,
            "shortBreakMinutes",
        );
        apply(
            update.long_break_minutes,
            &mut self.long_break_minutes,
            "longBreakMinutes",
        );

        if let Some(flag) = update.auto_start_breaks {
            self.auto_start_breaks = flag;
        }
        if let Some(flag) = update.auto_start_pomodoros {
            self.auto_start_pomodoros = flag;
        }

        rejected
    }
}

/// Accepts a minute count only if it is positive and its length in seconds
/// fits in a `u32`.
fn positive_minutes(raw: i64) -> Option<u32> {
    u32::try_from(raw)
        .ok()
        .filter(|minutes| *minutes > 0 && minutes.checked_mul(60).is_some())
}

// ============================================================================
// SettingsUpdate
// ============================================================================

/// Partial settings accepted by `SessionScheduler::update_settings`.
///
/// Numeric fields are signed so that out-of-range input can be received and
/// ignored instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsUpdate {
    /// New work session length in minutes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_minutes: Option<i64>,
    /// New short break length in minutes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_break_minutes: Option<i64>,
    /// New long break length in minutes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_break_minutes: Option<i64>,
    /// New auto-start policy for breaks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_start_breaks: Option<bool>,
    /// New auto-start policy for work sessions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_start_pomodoros: Option<bool>,
}

impl SettingsUpdate {
    /// Sets the work duration.
    pub fn work_minutes(mut self, minutes: i64) -> Self {
        self.work_minutes = Some(minutes);
        self
    }

    /// Sets the short break duration.
    pub fn short_break_minutes(mut self, minutes: i64) -> Self {
        self.short_break_minutes = Some(minutes);
        self
    }

    /// Sets the long break duration.
    pub fn long_break_minutes(mut self, minutes: i64) -> Self {
        self.long_break_minutes = Some(minutes);
        self
    }

    /// Sets the auto-start policy for breaks.
    pub fn auto_start_breaks(mut self, flag: bool) -> Self {
        self.auto_start_breaks = Some(flag);
        self
    }

    /// Sets the auto-start policy for work sessions.
    pub fn auto_start_pomodoros(mut self, flag: bool) -> Self {
        self.auto_start_pomodoros = Some(flag);
        self
    }

    /// Returns true if the update carries no fields.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

impl From<&Settings> for SettingsUpdate {
    fn from(settings: &Settings) -> Self {
        Self {
            work_minutes: Some(i64::from(settings.work_minutes)),
            short_break_minutes: Some(i64::from(settings.short_break_minutes)),
            long_break_minutes: Some(i64::from(settings.long_break_minutes)),
            auto_start_breaks: Some(settings.auto_start_breaks),
            auto_start_pomodoros: Some(settings.auto_start_pomodoros),
        }
    }
}

// ============================================================================
// CompletedSessionRecord
// ============================================================================

/// A session that ran to completion (or was skipped).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedSessionRecord {
    /// Kind of the completed session
    pub kind: SessionKind,
    /// When the session completed
    pub completed_at: DateTime<Utc>,
    /// Full configured length of the session, in seconds
    pub duration_seconds: u32,
}

// ============================================================================
// SchedulerSnapshot
// ============================================================================

/// Read-only projection of the scheduler handed to consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerSnapshot {
    /// Seconds left in the current session
    pub seconds_remaining: u32,
    /// Kind of the current session
    pub session_kind: SessionKind,
    /// Whether the countdown is running
    pub is_running: bool,
    /// Number of completed work sessions
    pub completed_work_sessions: u32,
    /// Completed sessions in completion order
    ///
    /// Shared with the scheduler; a tick does not copy the records.
    pub history: Arc<[CompletedSessionRecord]>,
    /// Elapsed fraction of the current session, in `[0, 1]`
    pub progress: f64,
    /// Active settings
    pub settings: Settings,
}

impl SchedulerSnapshot {
    /// Returns the progress scaled to a percentage.
    pub fn progress_percent(&self) -> f64 {
        self.progress * 100.0
    }
}

// ============================================================================
// Tests
// ============================================================================
