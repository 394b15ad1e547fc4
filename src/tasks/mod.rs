//! Task list whose entries collect pomodoros.
//!
//! This module provides:
//! - `Task` records with completion state and a pomodoro counter
//! - `TaskList` with add, toggle, rename, remove and filtered views
//! - Pomodoro attribution for the task selected during a run
//!
//! The scheduler knows nothing about tasks. The host attributes a completed
//! work session to the selected task from its notification handler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Types
// ============================================================================

/// Identifier of a task, unique within its list.
pub type TaskId = u64;

/// Task category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    #[default]
    General,
    Work,
    Study,
    Personal,
    Health,
    Creative,
}

impl TaskCategory {
    /// Returns the icon shown next to tasks of this category.
    pub fn icon(&self) -> &'static str {
        match self {
            TaskCategory::General => "📋",
            TaskCategory::Work => "💼",
            TaskCategory::Study => "📚",
            TaskCategory::Personal => "🏠",
            TaskCategory::Health => "💪",
            TaskCategory::Creative => "🎨",
        }
    }
}

/// Which tasks a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TaskFilter {
    /// Tasks not yet completed
    #[default]
    Active,
    /// Completed tasks only
    Completed,
    /// Every task
    All,
}

impl TaskFilter {
    fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::Active => !task.completed,
            TaskFilter::Completed => task.completed,
            TaskFilter::All => true,
        }
    }
}

/// A task that pomodoros can be attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    /// Set while the task is completed
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Work sessions completed while this task was selected
    #[serde(default)]
    pub pomodoro_count: u32,
    /// Planned number of pomodoros, 0 when not estimated
    #[serde(default)]
    pub pomodoro_estimate: u32,
    #[serde(default)]
    pub category: TaskCategory,
}

// ============================================================================
// TaskError
// ============================================================================

/// Errors for task list operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// Task text is empty after trimming
    #[error("タスクの内容を入力してください")]
    EmptyText,

    /// No task with the given id
    #[error("タスクが見つかりません: {0}")]
    NotFound(TaskId),
}

// ============================================================================
// TaskList
// ============================================================================

/// Ordered list of tasks, kept in creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Adds an active task and returns it.
    ///
    /// Ids are one more than the largest id in the list, so an id is never
    /// reused while a task with a higher id remains.
    pub fn add(
        &mut self,
        text: &str,
        category: TaskCategory,
        pomodoro_estimate: u32,
        now: DateTime<Utc>,
    ) -> Result<&Task, TaskError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TaskError::EmptyText);
        }

        let id = self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        self.tasks.push(Task {
            id,
            text: text.to_string(),
            completed: false,
            created_at: now,
            completed_at: None,
            pomodoro_count: 0,
            pomodoro_estimate,
            category,
        });
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// Flips the completed state. Returns the new state.
    pub fn toggle_complete(&mut self, id: TaskId, now: DateTime<Utc>) -> Result<bool, TaskError> {
        let task = self.get_mut(id)?;
        task.completed = !task.completed;
        task.completed_at = task.completed.then_some(now);
        Ok(task.completed)
    }

    /// Replaces the text of a task.
    pub fn rename(&mut self, id: TaskId, text: &str) -> Result<(), TaskError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TaskError::EmptyText);
        }
        self.get_mut(id)?.text = text.to_string();
        Ok(())
    }

    /// Removes a task and returns it.
    pub fn remove(&mut self, id: TaskId) -> Result<Task, TaskError> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))?;
        Ok(self.tasks.remove(index))
    }

    /// Attributes one completed pomodoro to a task. Returns the new count.
    pub fn record_pomodoro(&mut self, id: TaskId) -> Result<u32, TaskError> {
        let task = self.get_mut(id)?;
        task.pomodoro_count = task.pomodoro_count.saturating_add(1);
        Ok(task.pomodoro_count)
    }

    /// Returns the tasks matching `filter`, in creation order.
    pub fn filtered(&self, filter: TaskFilter) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| filter.matches(t))
    }

    fn get_mut(&mut self, id: TaskId) -> Result<&mut Task, TaskError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TaskError::NotFound(id))
    }
}

// ============================================================================
// Tests
// ============================================================================
