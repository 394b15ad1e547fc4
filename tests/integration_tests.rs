//! Integration tests for the session scheduler.
//!
//! These tests drive the public library API the way a host would:
//! - Full work/break cycles with default and custom settings
//! - Auto-start after completion
//! - Long-break cadence
//! - Settings updates mid-session
//! - Persisting a session's history through the store

use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};

use pomodoro_scheduler::{
    HistoryLog, SchedulerEvent, SessionKind, SessionScheduler, Settings, SettingsUpdate, Store,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// Records every notified kind.
fn recording_scheduler(settings: Settings) -> (SessionScheduler, Arc<Mutex<Vec<SessionKind>>>) {
    let notified = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&notified);

    let mut scheduler = SessionScheduler::new(settings)
        .with_time_source(|| Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap());
    scheduler.set_notification_callback(move |kind| {
        sink.lock().unwrap().push(kind);
        Ok(())
    });
    (scheduler, notified)
}

/// Ticks until the current session completes, returning the completion event.
fn run_to_completion(scheduler: &mut SessionScheduler) -> SchedulerEvent {
    let remaining = scheduler.seconds_remaining();
    for _ in 1..remaining {
        assert!(matches!(scheduler.tick(), SchedulerEvent::Ticked { .. }));
    }
    scheduler.tick()
}

// ============================================================================
// Scenario Tests
// ============================================================================

#[test]
fn test_work_session_completes_after_full_duration() {
    let (mut scheduler, notified) = recording_scheduler(Settings::default());
    scheduler.start();

    for _ in 0..1499 {
        scheduler.tick();
    }
    assert_eq!(scheduler.seconds_remaining(), 1);
    assert!(notified.lock().unwrap().is_empty());

    let event = scheduler.tick();

    assert_eq!(
        event,
        SchedulerEvent::Completed {
            completed: SessionKind::Work,
            next: SessionKind::ShortBreak,
            auto_start: false,
            completed_work_sessions: 1,
        }
    );
    assert_eq!(*notified.lock().unwrap(), vec![SessionKind::Work]);
    assert_eq!(scheduler.history().len(), 1);
    assert_eq!(scheduler.history().records()[0].duration_seconds, 1500);
    assert_eq!(scheduler.completed_work_sessions(), 1);
    assert_eq!(scheduler.session_kind(), SessionKind::ShortBreak);
    assert_eq!(scheduler.seconds_remaining(), 300);
    assert!(!scheduler.is_running());

    // Nothing happens until the break is started
    assert_eq!(scheduler.tick(), SchedulerEvent::Idle);
    assert_eq!(scheduler.seconds_remaining(), 300);
}

#[test]
fn test_break_starts_automatically_after_delay() {
    let settings = Settings::default().with_auto_start(true, false);
    let (mut scheduler, _) = recording_scheduler(settings);
    scheduler.start();

    let event = run_to_completion(&mut scheduler);
    assert!(matches!(
        event,
        SchedulerEvent::Completed {
            auto_start: true,
            ..
        }
    ));
    assert!(!scheduler.is_running());

    assert_eq!(
        scheduler.tick(),
        SchedulerEvent::AutoStarted {
            kind: SessionKind::ShortBreak
        }
    );
    assert!(scheduler.is_running());
    assert_eq!(scheduler.session_kind(), SessionKind::ShortBreak);
    assert_eq!(scheduler.seconds_remaining(), 300);
}

#[test]
fn test_fourth_pomodoro_leads_to_long_break() {
    let settings = Settings::default()
        .with_work_minutes(1)
        .with_short_break_minutes(1);
    let (mut scheduler, notified) = recording_scheduler(settings);

    for round in 1..=4 {
        scheduler.start();
        run_to_completion(&mut scheduler);
        assert_eq!(scheduler.completed_work_sessions(), round);

        if round < 4 {
            assert_eq!(scheduler.session_kind(), SessionKind::ShortBreak);
            scheduler.start();
            run_to_completion(&mut scheduler);
            assert_eq!(scheduler.session_kind(), SessionKind::Work);
        }
    }

    assert_eq!(scheduler.session_kind(), SessionKind::LongBreak);
    assert_eq!(scheduler.seconds_remaining(), 900);
    assert_eq!(notified.lock().unwrap().len(), 7);
    assert_eq!(scheduler.history().work_sessions(), 4);
}

#[test]
fn test_settings_update_reloads_current_session() {
    let (mut scheduler, _) = recording_scheduler(Settings::default());
    scheduler.start();
    for _ in 0..1490 {
        scheduler.tick();
    }
    assert_eq!(scheduler.seconds_remaining(), 10);

    scheduler.update_settings(&SettingsUpdate::default().work_minutes(50));

    assert_eq!(scheduler.seconds_remaining(), 3000);
    assert!(scheduler.is_running());
    assert_eq!(scheduler.session_kind(), SessionKind::Work);
}

// ============================================================================
// Property Tests
// ============================================================================

#[test]
fn test_long_break_cadence_over_many_pomodoros() {
    let (mut scheduler, _) = recording_scheduler(Settings::default());

    for k in 1..=12u32 {
        scheduler.switch_session(SessionKind::Work);
        scheduler.skip();

        assert_eq!(scheduler.completed_work_sessions(), k);
        let expected = if k % 4 == 0 {
            SessionKind::LongBreak
        } else {
            SessionKind::ShortBreak
        };
        assert_eq!(scheduler.session_kind(), expected, "after pomodoro {}", k);
    }
    assert_eq!(
        scheduler.history().work_sessions(),
        scheduler.completed_work_sessions()
    );
}

#[test]
fn test_reset_keeps_kind_and_count() {
    let (mut scheduler, _) = recording_scheduler(Settings::default());
    scheduler.skip();
    scheduler.start();
    for _ in 0..42 {
        scheduler.tick();
    }

    scheduler.reset();

    assert_eq!(scheduler.session_kind(), SessionKind::ShortBreak);
    assert_eq!(scheduler.completed_work_sessions(), 1);
    assert_eq!(scheduler.seconds_remaining(), 300);
    assert!(!scheduler.is_running());
    assert_eq!(scheduler.progress(), 0.0);
}

#[test]
fn test_each_skip_records_and_notifies_once() {
    let (mut scheduler, notified) = recording_scheduler(Settings::default());

    for calls in 1..=5 {
        scheduler.skip();
        assert_eq!(scheduler.history().len(), calls);
        assert_eq!(notified.lock().unwrap().len(), calls);
    }
}

#[test]
fn test_progress_stays_in_unit_interval() {
    let settings = Settings::default().with_work_minutes(1);
    let (mut scheduler, _) = recording_scheduler(settings);
    scheduler.start();

    let mut last = scheduler.progress();
    assert_eq!(last, 0.0);
    for _ in 0..59 {
        scheduler.tick();
        let progress = scheduler.progress();
        assert!((0.0..=1.0).contains(&progress));
        assert!(progress > last);
        last = progress;
    }
}

#[test]
fn test_pause_is_idempotent() {
    let (mut scheduler, _) = recording_scheduler(Settings::default());
    scheduler.start();
    scheduler.tick();

    scheduler.pause();
    let once = scheduler.snapshot();
    scheduler.pause();

    assert_eq!(scheduler.snapshot(), once);
}

#[test]
fn test_disposed_scheduler_ignores_everything() {
    let settings = Settings::default().with_auto_start(true, true);
    let (mut scheduler, notified) = recording_scheduler(settings);
    scheduler.skip();
    assert!(scheduler.has_pending_auto_start());

    scheduler.dispose();
    let frozen = scheduler.snapshot();

    scheduler.tick();
    scheduler.start();
    scheduler.skip();
    scheduler.update_settings(&SettingsUpdate::default().work_minutes(10));

    assert_eq!(scheduler.snapshot(), frozen);
    assert!(!scheduler.is_running());
    assert_eq!(notified.lock().unwrap().len(), 1);
}

// ============================================================================
// Store Tests
// ============================================================================

#[test]
fn test_session_history_round_trips_through_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    store
        .save_settings(&Settings::default().with_work_minutes(1))
        .unwrap();

    let (mut scheduler, _) = recording_scheduler(store.load_settings().unwrap());
    scheduler.start();
    run_to_completion(&mut scheduler);
    scheduler.skip();
    store
        .append_history(scheduler.history().records())
        .unwrap();

    let stored: HistoryLog = store.load_history().unwrap();
    assert_eq!(stored, *scheduler.history());
    assert_eq!(stored.total_focus_seconds(), 60);

    // A fresh scheduler starts its count from zero
    let restarted = SessionScheduler::new(store.load_settings().unwrap());
    assert_eq!(restarted.completed_work_sessions(), 0);
    assert_eq!(restarted.seconds_remaining(), 60);
}
