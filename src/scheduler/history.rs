//! Append-only log of completed sessions.

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::types::{CompletedSessionRecord, SessionKind};

/// Daily pomodoro goal shown alongside the history.
pub const DAILY_GOAL_POMODOROS: u32 = 8;

/// Ordered record of completed sessions.
///
/// Records are kept in completion order and are never reordered, removed,
/// or deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryLog {
    records: Vec<CompletedSessionRecord>,
}

impl HistoryLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a completed session.
    pub fn append(&mut self, record: CompletedSessionRecord) {
        self.records.push(record);
    }

    /// Returns every record in completion order.
    pub fn records(&self) -> &[CompletedSessionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the most recently completed session.
    pub fn last(&self) -> Option<&CompletedSessionRecord> {
        self.records.last()
    }

    /// Number of completed work sessions in the log.
    pub fn work_sessions(&self) -> u32 {
        self.count_kind(SessionKind::Work)
    }

    /// Number of completed sessions of the given kind.
    pub fn count_kind(&self, kind: SessionKind) -> u32 {
        let count = self.records.iter().filter(|r| r.kind == kind).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Iterates over the records completed on `date` in the time zone `tz`.
    pub fn completed_on<'a, Tz: TimeZone>(
        &'a self,
        date: NaiveDate,
        tz: &'a Tz,
    ) -> impl Iterator<Item = &'a CompletedSessionRecord> + 'a {
        self.records
            .iter()
            .filter(move |r| r.completed_at.with_timezone(tz).date_naive() == date)
    }

    /// Number of work sessions completed on `date` in the time zone `tz`.
    pub fn work_sessions_on<Tz: TimeZone>(&self, date: NaiveDate, tz: &Tz) -> u32 {
        let count = self
            .completed_on(date, tz)
            .filter(|r| r.kind == SessionKind::Work)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Total seconds spent in completed work sessions.
    pub fn total_focus_seconds(&self) -> u64 {
        self.records
            .iter()
            .filter(|r| r.kind == SessionKind::Work)
            .map(|r| u64::from(r.duration_seconds))
            .sum()
    }

    /// Returns the newest `limit` records, newest first.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &CompletedSessionRecord> {
        self.records.iter().rev().take(limit)
    }
}

impl From<Vec<CompletedSessionRecord>> for HistoryLog {
    fn from(records: Vec<CompletedSessionRecord>) -> Self {
        Self { records }
    }
}

/// Fraction of the daily goal reached by `completed` pomodoros, capped at 1.
pub fn goal_progress(completed: u32) -> f64 {
    (f64::from(completed) / f64::from(DAILY_GOAL_POMODOROS)).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, FixedOffset, Utc};

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn record(kind: SessionKind, completed_at: DateTime<Utc>) -> CompletedSessionRecord {
        let duration_seconds = match kind {
            SessionKind::Work => 1500,
            SessionKind::ShortBreak => 300,
            SessionKind::LongBreak => 900,
        };
        CompletedSessionRecord {
            kind,
            completed_at,
            duration_seconds,
        }
    }

    #[test]
    fn test_new_log_is_empty() {
        let log = HistoryLog::new();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
        assert_eq!(log.work_sessions(), 0);
        assert!(log.last().is_none());
    }

    #[test]
    fn test_append_preserves_insertion_order() {
        let start = at("2026-03-01T09:00:00Z");
        let mut log = HistoryLog::new();
        log.append(record(SessionKind::Work, start));
        log.append(record(SessionKind::ShortBreak, start + Duration::minutes(30)));
        log.append(record(SessionKind::Work, start + Duration::minutes(60)));

        let kinds: Vec<_> = log.records().iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![SessionKind::Work, SessionKind::ShortBreak, SessionKind::Work]
        );
        assert_eq!(log.last().unwrap().completed_at, start + Duration::minutes(60));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let start = at("2026-03-01T09:00:00Z");
        let mut log = HistoryLog::new();
        log.append(record(SessionKind::Work, start));
        log.append(record(SessionKind::Work, start));

        assert_eq!(log.len(), 2);
        assert_eq!(log.work_sessions(), 2);
    }

    #[test]
    fn test_counts_by_kind() {
        let start = at("2026-03-01T09:00:00Z");
        let log = HistoryLog::from(vec![
            record(SessionKind::Work, start),
            record(SessionKind::ShortBreak, start),
            record(SessionKind::Work, start),
            record(SessionKind::LongBreak, start),
        ]);

        assert_eq!(log.work_sessions(), 2);
        assert_eq!(log.count_kind(SessionKind::ShortBreak), 1);
        assert_eq!(log.count_kind(SessionKind::LongBreak), 1);
        assert_eq!(log.total_focus_seconds(), 3000);
    }

    #[test]
    fn test_completed_on_respects_time_zone() {
        // 23:30 UTC on March 1st is already March 2nd at UTC+9
        let late = at("2026-03-01T23:30:00Z");
        let log = HistoryLog::from(vec![
            record(SessionKind::Work, at("2026-03-01T10:00:00Z")),
            record(SessionKind::Work, late),
        ]);

        let march_1 = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let march_2 = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();

        assert_eq!(log.work_sessions_on(march_1, &Utc), 2);
        assert_eq!(log.work_sessions_on(march_1, &tokyo), 1);
        assert_eq!(log.work_sessions_on(march_2, &tokyo), 1);
    }

    #[test]
    fn test_recent_is_newest_first() {
        let start = at("2026-03-01T09:00:00Z");
        let log = HistoryLog::from(vec![
            record(SessionKind::Work, start),
            record(SessionKind::ShortBreak, start + Duration::minutes(25)),
            record(SessionKind::Work, start + Duration::minutes(30)),
        ]);

        let recent: Vec<_> = log.recent(2).map(|r| r.kind).collect();
        assert_eq!(recent, vec![SessionKind::Work, SessionKind::ShortBreak]);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let log = HistoryLog::from(vec![record(
            SessionKind::Work,
            at("2026-03-01T09:00:00Z"),
        )]);
        let json = serde_json::to_value(&log).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["kind"], "work");
    }

    #[test]
    fn test_goal_progress_is_capped() {
        assert_eq!(goal_progress(0), 0.0);
        assert_eq!(goal_progress(4), 0.5);
        assert_eq!(goal_progress(8), 1.0);
        assert_eq!(goal_progress(12), 1.0);
    }
}
