//! Tick source for the session scheduler.
//!
//! This module provides the runtime side of the scheduler:
//! - A tokio task that calls `tick()` once per second
//! - Snapshot publication on a watch channel for display consumers
//! - Event delivery on an unbounded channel
//! - Async command wrappers that publish a fresh snapshot
//!
//! Every tick and command takes the scheduler lock, so a command never
//! interleaves with a tick.

use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::debug;

use crate::scheduler::{SchedulerEvent, SessionScheduler};
use crate::types::{SchedulerSnapshot, SessionKind, SettingsUpdate};

// ============================================================================
// Constants
// ============================================================================

/// Tick period in seconds
pub const TICK_INTERVAL_SECS: u64 = 1;

// ============================================================================
// SchedulerDriver
// ============================================================================

/// Owns a scheduler and drives it from a periodic tokio task.
pub struct SchedulerDriver {
    /// Shared scheduler, locked by the ticker and by commands
    scheduler: Arc<Mutex<SessionScheduler>>,
    /// Latest read model
    snapshot_tx: watch::Sender<SchedulerSnapshot>,
    /// Non-idle scheduler events
    event_tx: mpsc::UnboundedSender<SchedulerEvent>,
    /// Background ticker task
    ticker: Option<JoinHandle<()>>,
}

impl SchedulerDriver {
    /// Spawns the ticker with the default one-second period.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        scheduler: SessionScheduler,
    ) -> (Self, mpsc::UnboundedReceiver<SchedulerEvent>) {
        Self::spawn_with_period(scheduler, Duration::from_secs(TICK_INTERVAL_SECS))
    }

    /// Spawns the ticker with a custom period.
    pub fn spawn_with_period(
        scheduler: SessionScheduler,
        period: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<SchedulerEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(scheduler.snapshot());
        let scheduler = Arc::new(Mutex::new(scheduler));

        let ticker = tokio::spawn(run_ticker(
            Arc::clone(&scheduler),
            snapshot_tx.clone(),
            event_tx.clone(),
            period,
        ));

        let driver = Self {
            scheduler,
            snapshot_tx,
            event_tx,
            ticker: Some(ticker),
        };
        (driver, event_rx)
    }

    /// Subscribes to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<SchedulerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Returns the latest published snapshot.
    pub fn snapshot(&self) -> SchedulerSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Returns true while the ticker task is alive.
    pub fn is_ticking(&self) -> bool {
        self.ticker
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub async fn start(&self) {
        self.command(|s| {
            s.start();
            SchedulerEvent::Idle
        })
        .await;
    }

    pub async fn pause(&self) {
        self.command(|s| {
            s.pause();
            SchedulerEvent::Idle
        })
        .await;
    }

    pub async fn reset(&self) {
        self.command(|s| {
            s.reset();
            SchedulerEvent::Idle
        })
        .await;
    }

    pub async fn skip(&self) -> SchedulerEvent {
        self.command(SessionScheduler::skip).await
    }

    pub async fn switch_session(&self, kind: SessionKind) {
        self.command(|s| {
            s.switch_session(kind);
            SchedulerEvent::Idle
        })
        .await;
    }

    pub async fn update_settings(&self, update: SettingsUpdate) {
        self.command(|s| {
            s.update_settings(&update);
            SchedulerEvent::Idle
        })
        .await;
    }

    /// Runs `f` under the scheduler lock and publishes the resulting state.
    pub async fn with_scheduler<R>(&self, f: impl FnOnce(&mut SessionScheduler) -> R) -> R {
        let mut scheduler = self.scheduler.lock().await;
        let result = f(&mut scheduler);
        self.snapshot_tx.send_replace(scheduler.snapshot());
        result
    }

    /// Disposes the scheduler and stops the ticker.
    pub async fn dispose(&mut self) {
        self.with_scheduler(SessionScheduler::dispose).await;
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        debug!("Driver disposed");
    }

    async fn command<F>(&self, f: F) -> SchedulerEvent
    where
        F: FnOnce(&mut SessionScheduler) -> SchedulerEvent,
    {
        let mut scheduler = self.scheduler.lock().await;
        let event = f(&mut scheduler);
        self.snapshot_tx.send_replace(scheduler.snapshot());
        publish_event(&self.event_tx, event);
        event
    }
}

impl Drop for SchedulerDriver {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

/// Ticks the scheduler until it is disposed.
async fn run_ticker(
    scheduler: Arc<Mutex<SessionScheduler>>,
    snapshot_tx: watch::Sender<SchedulerSnapshot>,
    event_tx: mpsc::UnboundedSender<SchedulerEvent>,
    period: Duration,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // The first tick of an interval completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let mut scheduler = scheduler.lock().await;
        if scheduler.is_disposed() {
            break;
        }

        let event = scheduler.tick();
        if event != SchedulerEvent::Idle {
            snapshot_tx.send_replace(scheduler.snapshot());
            publish_event(&event_tx, event);
        }
    }

    debug!("Ticker stopped");
}

fn publish_event(event_tx: &mpsc::UnboundedSender<SchedulerEvent>, event: SchedulerEvent) {
    if event == SchedulerEvent::Idle {
        return;
    }
    if event_tx.send(event).is_err() {
        debug!(?event, "No event receiver");
    }
}

// ============================================================================
// Tests
// ============================================================================
