//! Transition policy: which session follows a completed one, and whether it
//! starts on its own.

use crate::types::{SessionKind, Settings};

/// A long break follows every this-many completed work sessions.
pub const LONG_BREAK_INTERVAL: u32 = 4;

/// What the scheduler should arm after a session completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Kind of the next session
    pub next_kind: SessionKind,
    /// Whether the next session starts without user action
    pub auto_start: bool,
}

/// Decides the next session.
///
/// `completed_work_sessions` is the count *after* the just-completed session
/// has been tallied, so the fourth work session yields a long break.
pub fn next_transition(
    just_completed: SessionKind,
    completed_work_sessions: u32,
    settings: &Settings,
) -> Transition {
    match just_completed {
        SessionKind::Work => {
            let next_kind = if completed_work_sessions % LONG_BREAK_INTERVAL == 0 {
                SessionKind::LongBreak
            } else {
                SessionKind::ShortBreak
            };
            Transition {
                next_kind,
                auto_start: settings.auto_start_breaks,
            }
        }
        SessionKind::ShortBreak | SessionKind::LongBreak => Transition {
            next_kind: SessionKind::Work,
            auto_start: settings.auto_start_pomodoros,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_to_short_break() {
        for count in [1, 2, 3, 5, 6, 7] {
            let transition = next_transition(SessionKind::Work, count, &Settings::default());
            assert_eq!(
                transition.next_kind,
                SessionKind::ShortBreak,
                "Expected ShortBreak at count {}",
                count
            );
        }
    }

    #[test]
    fn test_work_to_long_break_at_multiples_of_4() {
        for count in [4, 8, 12] {
            let transition = next_transition(SessionKind::Work, count, &Settings::default());
            assert_eq!(
                transition.next_kind,
                SessionKind::LongBreak,
                "Expected LongBreak at count {}",
                count
            );
        }
    }

    #[test]
    fn test_breaks_lead_to_work() {
        let settings = Settings::default();
        assert_eq!(
            next_transition(SessionKind::ShortBreak, 1, &settings).next_kind,
            SessionKind::Work
        );
        assert_eq!(
            next_transition(SessionKind::LongBreak, 4, &settings).next_kind,
            SessionKind::Work
        );
    }

    #[test]
    fn test_auto_start_follows_matching_flag() {
        let breaks_only = Settings::default().with_auto_start(true, false);
        assert!(next_transition(SessionKind::Work, 1, &breaks_only).auto_start);
        assert!(!next_transition(SessionKind::ShortBreak, 1, &breaks_only).auto_start);

        let pomodoros_only = Settings::default().with_auto_start(false, true);
        assert!(!next_transition(SessionKind::Work, 1, &pomodoros_only).auto_start);
        assert!(next_transition(SessionKind::LongBreak, 4, &pomodoros_only).auto_start);
    }

    #[test]
    fn test_same_inputs_same_output() {
        let settings = Settings::default().with_auto_start(true, true);
        let first = next_transition(SessionKind::Work, 8, &settings);
        let second = next_transition(SessionKind::Work, 8, &settings);
        assert_eq!(first, second);
    }
}
