//! Display utilities for the pomodoro CLI.
//!
//! This module provides formatted output for:
//! - The live countdown line
//! - Completion messages
//! - History, settings and task listings
//! - Error messages
//!
//! Rendering is split from printing so the text can be tested.

use std::io::{self, Write};

use chrono::{NaiveDate, TimeZone};

use crate::scheduler::{goal_progress, HistoryLog, DAILY_GOAL_POMODOROS};
use crate::tasks::{Task, TaskFilter, TaskList};
use crate::types::{SchedulerSnapshot, SessionKind, Settings};

// ============================================================================
// Constants
// ============================================================================

/// Emoji for work session
const WORK_EMOJI: &str = "🍅";

/// Emoji for short break
const SHORT_BREAK_EMOJI: &str = "☕";

/// Emoji for long break
const LONG_BREAK_EMOJI: &str = "🌴";

/// Width of the progress bar in characters
const PROGRESS_BAR_WIDTH: usize = 20;

// ============================================================================
// Display
// ============================================================================

/// Display utilities for CLI output.
pub struct Display;

impl Display {
    /// Formats seconds as `MM:SS`.
    pub fn format_clock(total_seconds: u32) -> String {
        format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
    }

    /// Returns the emoji for a session kind.
    pub fn emoji(kind: SessionKind) -> &'static str {
        match kind {
            SessionKind::Work => WORK_EMOJI,
            SessionKind::ShortBreak => SHORT_BREAK_EMOJI,
            SessionKind::LongBreak => LONG_BREAK_EMOJI,
        }
    }

    /// Renders a fraction in `[0, 1]` as a fixed-width bar.
    pub fn progress_bar(fraction: f64) -> String {
        let filled = (fraction.clamp(0.0, 1.0) * PROGRESS_BAR_WIDTH as f64).round() as usize;
        format!(
            "[{}{}]",
            "#".repeat(filled),
            "-".repeat(PROGRESS_BAR_WIDTH - filled)
        )
    }

    /// Renders the one-line countdown, e.g. `🍅 Focus 15:30 [#######-----] 38% #2`.
    pub fn render_status(snapshot: &SchedulerSnapshot) -> String {
        let state = if snapshot.is_running {
            ""
        } else {
            " (一時停止)"
        };
        format!(
            "{} {} {} {} {:>3.0}% #{}{}",
            Self::emoji(snapshot.session_kind),
            snapshot.session_kind.label(),
            Self::format_clock(snapshot.seconds_remaining),
            Self::progress_bar(snapshot.progress),
            snapshot.progress_percent(),
            snapshot.completed_work_sessions,
            state
        )
    }

    /// Renders the message printed when a session completes.
    pub fn render_completion(completed: SessionKind, next: SessionKind, auto_start: bool) -> String {
        let headline = match completed {
            SessionKind::Work => "ポモドーロ完了！お疲れさまでした",
            SessionKind::ShortBreak | SessionKind::LongBreak => "休憩終了！次のセッションを始めましょう",
        };
        let follow_up = if auto_start {
            "まもなく自動で開始します"
        } else {
            "`s` で開始します"
        };
        format!(
            "{} {}\n  次: {} {} ({})",
            Self::emoji(completed),
            headline,
            Self::emoji(next),
            next.label(),
            follow_up
        )
    }

    /// Renders today's count, goal progress and the newest sessions.
    pub fn render_history<Tz: TimeZone>(
        history: &HistoryLog,
        today: NaiveDate,
        tz: &Tz,
        limit: usize,
    ) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let completed_today = history.work_sessions_on(today, tz);
        let progress = goal_progress(completed_today);

        let mut lines = vec![
            "ポモドーロ履歴".to_string(),
            "─────────────────────────────".to_string(),
            format!("今日の完了数: {}", completed_today),
            format!(
                "目標: {} ポモドーロ {} {:.0}%",
                DAILY_GOAL_POMODOROS,
                Self::progress_bar(progress),
                progress * 100.0
            ),
        ];

        if history.is_empty() {
            lines.push("完了したセッションはまだありません".to_string());
            return lines.join("\n");
        }

        lines.push(String::new());
        for record in history.recent(limit) {
            lines.push(format!(
                "{} {:<12} {}  {}m",
                Self::emoji(record.kind),
                record.kind.label(),
                record.completed_at.with_timezone(tz).format("%m/%d %H:%M"),
                record.duration_seconds / 60
            ));
        }
        lines.join("\n")
    }

    /// Renders the stored settings.
    pub fn render_settings(settings: &Settings) -> String {
        [
            "ポモドーロ設定".to_string(),
            "─────────────────────────────".to_string(),
            format!("作業時間: {}分", settings.work_minutes),
            format!("短い休憩: {}分", settings.short_break_minutes),
            format!("長い休憩: {}分", settings.long_break_minutes),
            format!("休憩を自動開始: {}", on_off(settings.auto_start_breaks)),
            format!("作業を自動開始: {}", on_off(settings.auto_start_pomodoros)),
        ]
        .join("\n")
    }

    /// Renders the pomodoro count of a task, with its estimate when set.
    pub fn render_pomodoros(task: &Task) -> String {
        if task.pomodoro_estimate > 0 {
            format!("{} {}/{}", WORK_EMOJI, task.pomodoro_count, task.pomodoro_estimate)
        } else {
            format!("{} {}", WORK_EMOJI, task.pomodoro_count)
        }
    }

    /// Renders one task line, e.g. `[x] #2 📚 Read chapter 3  🍅 2/2`.
    pub fn render_task(task: &Task) -> String {
        format!(
            "[{}] #{} {} {}  {}",
            if task.completed { "x" } else { " " },
            task.id,
            task.category.icon(),
            task.text,
            Self::render_pomodoros(task)
        )
    }

    /// Renders the tasks matching `filter`.
    pub fn render_tasks(tasks: &TaskList, filter: TaskFilter) -> String {
        let mut lines = vec![
            "タスク一覧".to_string(),
            "─────────────────────────────".to_string(),
        ];
        let before = lines.len();
        lines.extend(tasks.filtered(filter).map(Self::render_task));
        if lines.len() == before {
            lines.push("タスクはありません".to_string());
        }
        lines.join("\n")
    }

    /// Renders the line printed when a pomodoro is credited to a task.
    pub fn render_task_credit(task: &Task) -> String {
        format!("  タスク「{}」: {}", task.text, Self::render_pomodoros(task))
    }

    /// Renders the list of interactive commands.
    pub fn render_help() -> &'static str {
        "コマンド:\n\
         \x20 s / start    開始・再開\n\
         \x20 p / pause    一時停止\n\
         \x20 r / reset    現在のセッションをやり直す\n\
         \x20 k / skip     現在のセッションを完了扱いにする\n\
         \x20 w / b / l    作業 / 短い休憩 / 長い休憩に切り替える\n\
         \x20 set <work|short|long> <分>   時間を変更する\n\
         \x20 status       現在の状態を表示\n\
         \x20 q / quit     終了"
    }

    /// Prints the countdown line.
    pub fn show_status(snapshot: &SchedulerSnapshot) {
        println!("{}", Self::render_status(snapshot));
    }

    /// Redraws the countdown line in place.
    pub fn show_status_inline(snapshot: &SchedulerSnapshot) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "\r\x1b[2K{}", Self::render_status(snapshot))?;
        stdout.flush()
    }

    /// Prints a completion message on a fresh line.
    pub fn show_completion(completed: SessionKind, next: SessionKind, auto_start: bool) {
        println!();
        println!("{}", Self::render_completion(completed, next, auto_start));
    }

    /// Rings the terminal bell.
    pub fn ring_bell() -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(b"\x07")?;
        stdout.flush()
    }

    /// Prints the history listing.
    pub fn show_history<Tz: TimeZone>(history: &HistoryLog, today: NaiveDate, tz: &Tz, limit: usize)
    where
        Tz::Offset: std::fmt::Display,
    {
        println!("{}", Self::render_history(history, today, tz, limit));
    }

    /// Prints the settings listing.
    pub fn show_settings(settings: &Settings) {
        println!("{}", Self::render_settings(settings));
    }

    /// Prints the interactive help.
    pub fn show_help() {
        println!("{}", Self::render_help());
    }

    /// Shows a success message after settings were saved.
    pub fn show_settings_saved(settings: &Settings) {
        println!("* 設定を保存しました");
        Self::show_settings(settings);
    }

    /// Prints the task listing.
    pub fn show_tasks(tasks: &TaskList, filter: TaskFilter) {
        println!("{}", Self::render_tasks(tasks, filter));
    }

    /// Shows a success message for a changed task.
    pub fn show_task_saved(message: &str, task: &Task) {
        println!("* {}", message);
        println!("  {}", Self::render_task(task));
    }

    /// Shows a task credited with a pomodoro.
    pub fn show_task_credit(task: &Task) {
        println!("{}", Self::render_task_credit(task));
    }

    /// Shows an error message.
    pub fn show_error(message: &str) {
        eprintln!("エラー: {}", message);
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "オン"
    } else {
        "オフ"
    }
}

// ============================================================================
// Tests
// ============================================================================
