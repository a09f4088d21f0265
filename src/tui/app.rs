use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime, Timelike};
use ratatui::widgets::ListState;

use crate::config::Config;
use crate::due;
use crate::list::{TaskCounts, TaskList, TaskListError};
use crate::models::Task;
use crate::store::TaskStore;
use crate::tui::error::TuiError;
use crate::tui::widgets::input::Input;

/// Which screen the app is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Add,
    Help,
}

/// Fields of the add-task form, in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddField {
    Text,
    DueDate,
    DueTime,
}

#[derive(Debug, Clone)]
pub struct AddForm {
    pub current_field: AddField,
    pub text: Input,
    pub due_date: Input,
    pub due_time: Input,
}

impl AddForm {
    /// Form pre-filled the way most tasks get entered: due today, at the
    /// next full hour.
    pub fn with_defaults(now: NaiveDateTime) -> Self {
        let next_hour = now
            .with_minute(0)
            .and_then(|t| t.with_second(0))
            .and_then(|t| t.with_nanosecond(0))
            .map(|t| t + chrono::Duration::hours(1))
            .unwrap_or(now);
        Self {
            current_field: AddField::Text,
            text: Input::new(),
            due_date: Input::from_string(now.format(due::DATE_FORMAT).to_string()),
            due_time: Input::from_string(next_hour.format(due::TIME_FORMAT).to_string()),
        }
    }
}

/// UI navigation state.
#[derive(Debug)]
pub struct UiState {
    pub mode: Mode,
    pub selected_index: usize,
    pub list_state: ListState,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            mode: Mode::View,
            selected_index: 0,
            list_state: ListState::default(),
        }
    }
}

/// Transient status bar message.
#[derive(Debug, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

/// Form state (None when no form is open).
#[derive(Debug, Default)]
pub struct FormState {
    pub add_form: Option<AddForm>,
}

pub struct App {
    pub config: Config,
    pub store: TaskStore,
    pub list: TaskList,
    /// Sorted snapshot of the list, refreshed after every mutation.
    pub tasks: Vec<Task>,
    pub ui: UiState,
    pub status: StatusState,
    pub form: FormState,
}

impl App {
    pub fn new(config: Config, store: TaskStore) -> Result<Self, TuiError> {
        let list = TaskList::from_tasks(store.load()?);
        let mut app = Self {
            config,
            store,
            list,
            tasks: Vec::new(),
            ui: UiState::default(),
            status: StatusState::default(),
            form: FormState::default(),
        };
        app.refresh_view();
        Ok(app)
    }

    /// Wall-clock reference used to classify due dates.
    pub(crate) fn now() -> NaiveDateTime {
        Local::now().naive_local()
    }

    /// Re-sort the display snapshot, keeping the selection on the same task
    /// where it still exists.
    pub fn refresh_view(&mut self) {
        let keep = self.selected_task().map(|t| t.id.clone());
        self.tasks = self.list.sorted(Self::now());
        if let Some(id) = keep {
            if let Some(pos) = self.tasks.iter().position(|t| t.id.matches(&id)) {
                self.ui.selected_index = pos;
            }
        }
        self.adjust_selected_index();
        self.sync_list_state();
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks.get(self.ui.selected_index)
    }

    pub fn counts(&self) -> TaskCounts {
        self.list.counts()
    }

    fn adjust_selected_index(&mut self) {
        if self.ui.selected_index >= self.tasks.len() {
            self.ui.selected_index = self.tasks.len().saturating_sub(1);
        }
    }

    fn sync_list_state(&mut self) {
        if self.tasks.is_empty() {
            self.ui.list_state.select(None);
        } else {
            self.ui.list_state.select(Some(self.ui.selected_index));
        }
    }

    pub fn move_selection_up(&mut self) {
        if self.ui.selected_index > 0 {
            self.ui.selected_index -= 1;
            self.sync_list_state();
        }
    }

    pub fn move_selection_down(&mut self) {
        if self.ui.selected_index + 1 < self.tasks.len() {
            self.ui.selected_index += 1;
            self.sync_list_state();
        }
    }

    pub fn toggle_selected_task(&mut self) {
        let id = match self.selected_task() {
            Some(task) => task.id.clone(),
            None => return,
        };
        if self.list.toggle(&id) {
            self.persist();
            self.refresh_view();
        }
    }

    pub fn delete_selected_task(&mut self) {
        let id = match self.selected_task() {
            Some(task) => task.id.clone(),
            None => return,
        };
        if self.list.remove(&id) {
            self.persist();
            self.refresh_view();
            self.set_status_message("Task deleted".to_string());
        }
    }

    pub fn enter_add_mode(&mut self) {
        self.form.add_form = Some(AddForm::with_defaults(Self::now()));
        self.ui.mode = Mode::Add;
    }

    pub fn exit_add_mode(&mut self) {
        self.form.add_form = None;
        self.ui.mode = Mode::View;
    }

    pub fn enter_help_mode(&mut self) {
        self.ui.mode = Mode::Help;
    }

    pub fn exit_help_mode(&mut self) {
        self.ui.mode = Mode::View;
    }

    pub fn current_form_input(&mut self) -> Option<&mut Input> {
        let form = self.form.add_form.as_mut()?;
        Some(match form.current_field {
            AddField::Text => &mut form.text,
            AddField::DueDate => &mut form.due_date,
            AddField::DueTime => &mut form.due_time,
        })
    }

    pub fn navigate_form_field(&mut self, forward: bool) {
        if let Some(form) = self.form.add_form.as_mut() {
            form.current_field = match (form.current_field, forward) {
                (AddField::Text, true) => AddField::DueDate,
                (AddField::DueDate, true) => AddField::DueTime,
                (AddField::DueTime, true) => AddField::Text,
                (AddField::Text, false) => AddField::DueTime,
                (AddField::DueDate, false) => AddField::Text,
                (AddField::DueTime, false) => AddField::DueDate,
            };
        }
    }

    /// Validate and submit the add-task form. On a validation problem the
    /// form stays open and the status bar explains what to fix.
    pub fn submit_add_form(&mut self) {
        let form = match self.form.add_form.as_ref() {
            Some(form) => form,
            None => return,
        };
        let text = form.text.value.clone();
        let date = form.due_date.value.trim().to_string();
        let time = form.due_time.value.trim().to_string();

        if text.trim().is_empty() {
            self.set_status_message("Please enter a task".to_string());
            return;
        }
        if !date.is_empty() && due::parse_due_date(&date).is_none() {
            self.set_status_message(format!("Invalid date '{}' (expected YYYY-MM-DD)", date));
            return;
        }
        if !time.is_empty() && due::parse_due_time(&time).is_none() {
            self.set_status_message(format!("Invalid time '{}' (expected HH:MM)", time));
            return;
        }

        let due_date = if date.is_empty() { None } else { Some(date) };
        let due_time = if time.is_empty() { None } else { Some(time) };
        let id = match self.list.add(&text, due_date, due_time) {
            Ok(task) => task.id.clone(),
            Err(TaskListError::EmptyText) => {
                self.set_status_message("Please enter a task".to_string());
                return;
            }
        };
        self.persist();
        self.exit_add_mode();
        self.refresh_view();
        if let Some(pos) = self.tasks.iter().position(|t| t.id.matches(&id)) {
            self.ui.selected_index = pos;
            self.sync_list_state();
        }
    }

    /// Write the whole list back to disk. A failure is reported in the
    /// status bar rather than ending the session.
    fn persist(&mut self) {
        if let Err(e) = self.store.save(self.list.tasks()) {
            self.set_status_message(format!("Failed to save tasks: {}", e));
        }
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status.message = None;
        self.status.message_time = None;
    }

    pub fn check_status_message_timeout(&mut self) {
        if let Some(message_time) = self.status.message_time {
            // Clear status messages after 3 seconds
            if message_time.elapsed() >= Duration::from_secs(3) {
                self.clear_status_message();
            }
        }
    }
}
