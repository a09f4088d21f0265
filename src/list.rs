use chrono::NaiveDateTime;
use thiserror::Error;

use crate::due;
use crate::models::{Task, TaskId};

#[derive(Debug, Error, PartialEq)]
pub enum TaskListError {
    #[error("task text is empty")]
    EmptyText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskCounts {
    pub left: usize,
    pub done: usize,
}

/// The in-memory task collection. Owns all mutation; rendering and
/// persistence take projections of it.
#[derive(Debug, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
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

    /// Add a task. The text is trimmed and must be non-empty; the id is
    /// assigned here and never reused.
    pub fn add(
        &mut self,
        text: &str,
        due_date: Option<String>,
        due_time: Option<String>,
    ) -> Result<&Task, TaskListError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(TaskListError::EmptyText);
        }
        let id = self.next_id();
        self.tasks
            .push(Task::new(id, trimmed.to_string(), due_date, due_time));
        Ok(self.tasks.last().expect("push guarantees a last element"))
    }

    /// Flip the completed flag. Returns false (and changes nothing) when the
    /// id is unknown.
    pub fn toggle(&mut self, id: &TaskId) -> bool {
        match self.tasks.iter_mut().find(|t| t.id.matches(id)) {
            Some(task) => {
                task.completed = !task.completed;
                true
            }
            None => false,
        }
    }

    /// Remove a task permanently. Returns false when the id is unknown.
    pub fn remove(&mut self, id: &TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.id.matches(id));
        self.tasks.len() != before
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id.matches(id))
    }

    /// The collection in display order for the given `now`.
    pub fn sorted(&self, now: NaiveDateTime) -> Vec<Task> {
        let mut tasks = self.tasks.clone();
        due::sort(&mut tasks, now);
        tasks
    }

    pub fn counts(&self) -> TaskCounts {
        let done = self.tasks.iter().filter(|t| t.completed).count();
        TaskCounts {
            left: self.tasks.len() - done,
            done,
        }
    }

    /// Epoch milliseconds, bumped past the largest existing integer id so
    /// rapid adds within one millisecond stay unique and monotonic.
    fn next_id(&self) -> TaskId {
        let now_ms = chrono::Utc::now().timestamp_millis();
        let max = self
            .tasks
            .iter()
            .filter_map(|t| t.id.as_int())
            .max()
            .unwrap_or(0);
        TaskId::Int(now_ms.max(max.saturating_add(1)))
    }
}
