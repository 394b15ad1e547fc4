//! Session scheduler: the pomodoro state machine.
//!
//! This module provides:
//! - Work / short break / long break transitions on expiry or skip
//! - Completion history and the pomodoro counter
//! - Deferred, cancellable auto-start of the next session
//! - A single replaceable completion notification handler
//!
//! The scheduler owns no timer. A tick source calls [`SessionScheduler::tick`]
//! once per second, and every command runs to completion before the next
//! tick, so no locking happens here.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, trace, warn};

use crate::types::{
    CompletedSessionRecord, SchedulerSnapshot, SessionKind, Settings, SettingsUpdate,
};

use super::clock::{ClockTick, SessionClock};
use super::history::HistoryLog;
use super::policy::next_transition;

// ============================================================================
// Constants
// ============================================================================

/// Ticks between a completion and the automatic start of the next session.
pub const AUTO_START_DELAY_TICKS: u32 = 1;

/// Handler invoked with the kind of every completed session.
pub type NotificationCallback = Box<dyn FnMut(SessionKind) -> anyhow::Result<()> + Send>;

/// Source of completion timestamps.
pub type TimeSource = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

// ============================================================================
// SchedulerEvent
// ============================================================================

/// What a tick or skip did to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// Nothing changed
    Idle,
    /// One second elapsed in the current session
    Ticked {
        /// Remaining seconds after the tick
        remaining_seconds: u32,
    },
    /// A session completed and the next one is armed
    Completed {
        /// Kind of the session that completed
        completed: SessionKind,
        /// Kind of the session now loaded
        next: SessionKind,
        /// Whether the next session will start on its own
        auto_start: bool,
        /// Completed work sessions after this completion
        completed_work_sessions: u32,
    },
    /// A pending auto-start fired and the loaded session is running
    AutoStarted {
        /// Kind of the session that started
        kind: SessionKind,
    },
}

// ============================================================================
// SessionScheduler
// ============================================================================

/// The pomodoro state machine.
///
/// States are `{Work, ShortBreak, LongBreak} x {Running, Paused}`, starting
/// at `(Work, Paused)` with a full work session loaded.
pub struct SessionScheduler {
    settings: Settings,
    kind: SessionKind,
    clock: SessionClock,
    completed_work_sessions: u32,
    history: HistoryLog,
    /// History shared with snapshots, rebuilt only when a record is appended
    shared_history: Arc<[CompletedSessionRecord]>,
    /// Ticks left before the loaded session starts on its own
    pending_auto_start: Option<u32>,
    notification: Option<NotificationCallback>,
    now: TimeSource,
    disposed: bool,
}

impl SessionScheduler {
    /// Creates a paused scheduler with a full work session loaded.
    ///
    /// Durations that are not a positive number of minutes fall back to
    /// their defaults.
    pub fn new(settings: Settings) -> Self {
        let settings = sanitize(settings);
        let clock = SessionClock::new(settings.duration_secs(SessionKind::Work));

        Self {
            settings,
            kind: SessionKind::Work,
            clock,
            completed_work_sessions: 0,
            history: HistoryLog::new(),
            shared_history: Arc::from(Vec::new()),
            pending_auto_start: None,
            notification: None,
            now: Box::new(Utc::now),
            disposed: false,
        }
    }

    /// Replaces the source of completion timestamps.
    pub fn with_time_source<F>(mut self, now: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.now = Box::new(now);
        self
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Advances the scheduler by one second.
    ///
    /// A pending auto-start is counted down even while the clock is paused;
    /// the tick that fires it does not also count down the new session.
    pub fn tick(&mut self) -> SchedulerEvent {
        if self.disposed {
            return SchedulerEvent::Idle;
        }

        if let Some(ticks_left) = self.pending_auto_start {
            if ticks_left > 1 {
                self.pending_auto_start = Some(ticks_left - 1);
                return SchedulerEvent::Idle;
            }
            self.pending_auto_start = None;
            self.clock.resume();
            info!(session = %self.kind, "Session auto-started");
            return SchedulerEvent::AutoStarted { kind: self.kind };
        }

        match self.clock.tick() {
            ClockTick::Idle => SchedulerEvent::Idle,
            ClockTick::Counted { remaining_seconds } => {
                trace!(remaining_seconds, "Tick");
                SchedulerEvent::Ticked { remaining_seconds }
            }
            ClockTick::Expired => self.complete_session(),
        }
    }

    /// Starts or resumes the countdown of the loaded session.
    ///
    /// Cancels a pending auto-start; the session starts now instead.
    pub fn start(&mut self) {
        if self.disposed {
            return;
        }
        self.pending_auto_start = None;

        if self.clock.is_expired() {
            warn!(session = %self.kind, "Ignoring start of an expired session");
            return;
        }
        self.clock.resume();
        debug!(session = %self.kind, remaining = self.clock.remaining_seconds(), "Started");
    }

    /// Pauses the countdown and cancels a pending auto-start.
    pub fn pause(&mut self) {
        if self.disposed {
            return;
        }
        self.pending_auto_start = None;
        self.clock.suspend();
        debug!(session = %self.kind, remaining = self.clock.remaining_seconds(), "Paused");
    }

    /// Pauses and reloads the full duration of the current session.
    ///
    /// Session kind, counter and history are untouched.
    pub fn reset(&mut self) {
        if self.disposed {
            return;
        }
        self.pending_auto_start = None;
        self.clock.suspend();
        self.clock.set_duration(self.full_duration());
        debug!(session = %self.kind, "Reset");
    }

    /// Completes the current session immediately, whatever time is left.
    pub fn skip(&mut self) -> SchedulerEvent {
        if self.disposed {
            return SchedulerEvent::Idle;
        }
        debug!(
            session = %self.kind,
            remaining = self.clock.remaining_seconds(),
            "Skipping"
        );
        self.complete_session()
    }

    /// Pauses and loads a full session of `kind`. No history is recorded.
    pub fn switch_session(&mut self, kind: SessionKind) {
        if self.disposed {
            return;
        }
        self.pending_auto_start = None;
        self.clock.suspend();
        self.kind = kind;
        self.clock.set_duration(self.full_duration());
        debug!(session = %kind, "Switched session");
    }

    /// Merges a partial settings update and reloads the current session with
    /// its new full duration.
    ///
    /// Running state, session kind and a pending auto-start are kept.
    /// Non-positive durations are ignored field by field.
    pub fn update_settings(&mut self, update: &SettingsUpdate) {
        if self.disposed {
            return;
        }
        for field in self.settings.merge(update) {
            warn!(field, "Ignoring non-positive duration in settings update");
        }
        self.clock.set_duration(self.full_duration());
        debug!(settings = ?self.settings, "Settings updated");
    }

    /// Registers the completion handler, replacing any previous one.
    ///
    /// The handler runs once per completion, after the history record is
    /// appended and before the next session is loaded. Errors and panics
    /// in the handler are logged and discarded.
    pub fn set_notification_callback<F>(&mut self, callback: F)
    where
        F: FnMut(SessionKind) -> anyhow::Result<()> + Send + 'static,
    {
        if self.disposed {
            return;
        }
        self.notification = Some(Box::new(callback));
    }

    /// Removes the completion handler.
    pub fn clear_notification_callback(&mut self) {
        if self.disposed {
            return;
        }
        self.notification = None;
    }

    /// Stops the scheduler for good.
    ///
    /// Cancels a pending auto-start, pauses the clock and drops the handler.
    /// Every later command is a no-op.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.pending_auto_start = None;
        self.clock.suspend();
        self.notification = None;
        self.disposed = true;
        debug!("Scheduler disposed");
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn seconds_remaining(&self) -> u32 {
        self.clock.remaining_seconds()
    }

    pub fn session_kind(&self) -> SessionKind {
        self.kind
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn completed_work_sessions(&self) -> u32 {
        self.completed_work_sessions
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Returns true while a completed session's successor waits to auto-start.
    pub fn has_pending_auto_start(&self) -> bool {
        self.pending_auto_start.is_some()
    }

    /// Full length of the current session, in seconds.
    pub fn full_duration(&self) -> u32 {
        self.settings.duration_secs(self.kind)
    }

    /// Elapsed fraction of the current session, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        session_progress(self.full_duration(), self.clock.remaining_seconds())
    }

    /// Builds the read model handed to consumers.
    pub fn snapshot(&self) -> SchedulerSnapshot {
        SchedulerSnapshot {
            seconds_remaining: self.seconds_remaining(),
            session_kind: self.kind,
            is_running: self.is_running(),
            completed_work_sessions: self.completed_work_sessions,
            history: Arc::clone(&self.shared_history),
            progress: self.progress(),
            settings: self.settings.clone(),
        }
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Runs the expiry protocol for the current session.
    fn complete_session(&mut self) -> SchedulerEvent {
        let completed = self.kind;

        self.clock.suspend();
        self.pending_auto_start = None;

        self.history.append(CompletedSessionRecord {
            kind: completed,
            completed_at: (self.now)(),
            duration_seconds: self.full_duration(),
        });
        self.shared_history = Arc::from(self.history.records());
        self.notify(completed);

        if completed == SessionKind::Work {
            self.completed_work_sessions += 1;
        }

        let transition =
            next_transition(completed, self.completed_work_sessions, &self.settings);
        self.kind = transition.next_kind;
        self.clock.set_duration(self.full_duration());

        if transition.auto_start {
            self.pending_auto_start = Some(AUTO_START_DELAY_TICKS);
        }

        info!(
            completed = %completed,
            next = %transition.next_kind,
            auto_start = transition.auto_start,
            pomodoros = self.completed_work_sessions,
            "Session completed"
        );

        SchedulerEvent::Completed {
            completed,
            next: transition.next_kind,
            auto_start: transition.auto_start,
            completed_work_sessions: self.completed_work_sessions,
        }
    }

    /// Invokes the completion handler, containing any failure.
    fn notify(&mut self, kind: SessionKind) {
        let Some(callback) = self.notification.as_mut() else {
            return;
        };

        match panic::catch_unwind(AssertUnwindSafe(|| callback(kind))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(session = %kind, error = %e, "Notification handler failed"),
            Err(_) => warn!(session = %kind, "Notification handler panicked"),
        }
    }
}

impl Default for SessionScheduler {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl std::fmt::Debug for SessionScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionScheduler")
            .field("settings", &self.settings)
            .field("kind", &self.kind)
            .field("clock", &self.clock)
            .field("completed_work_sessions", &self.completed_work_sessions)
            .field("history_len", &self.history.len())
            .field("pending_auto_start", &self.pending_auto_start)
            .field("has_notification", &self.notification.is_some())
            .field("disposed", &self.disposed)
            .finish()
    }
}

/// Elapsed fraction of a session of `full` seconds with `remaining` left.
pub fn session_progress(full: u32, remaining: u32) -> f64 {
    if full == 0 {
        return 0.0;
    }
    let elapsed = full.saturating_sub(remaining);
    (f64::from(elapsed) / f64::from(full)).clamp(0.0, 1.0)
}

/// Replaces unusable durations with their defaults.
fn sanitize(settings: Settings) -> Settings {
    let mut sanitized = Settings::default()
        .with_auto_start(settings.auto_start_breaks, settings.auto_start_pomodoros);
    for field in sanitized.merge(&SettingsUpdate::from(&settings)) {
        warn!(field, "Invalid duration in settings, using default");
    }
    sanitized
}

// ============================================================================
// Tests
// ============================================================================
