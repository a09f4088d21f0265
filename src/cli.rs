use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::due::{self, DueStatus};
use crate::list::{TaskList, TaskListError};
use crate::models::TaskId;
use crate::store::{StoreError, TaskStore};

#[derive(Parser)]
#[command(name = "duetask")]
#[command(about = "Due-date task list - a lightweight terminal application")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/storage)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Quickly add a new task
    Add {
        /// Task text
        text: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Due time (HH:MM), only meaningful together with --date
        #[arg(long)]
        time: Option<String>,
    },
    /// Print all tasks in display order
    List,
    /// Toggle a task between done and not done
    Toggle {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Rm {
        /// Task ID
        id: String,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Storage error: {0}")]
    StoreError(#[from] StoreError),
    #[error("{0}")]
    ValidationError(#[from] TaskListError),
    #[error("Failed to parse date: {0}")]
    DateParseError(String),
    #[error("Failed to parse time: {0}")]
    TimeParseError(String),
}

/// Handle the add command
pub fn handle_add(
    text: String,
    date: Option<String>,
    time: Option<String>,
    store: &TaskStore,
) -> Result<(), CliError> {
    if let Some(ref date_str) = date {
        due::parse_due_date(date_str).ok_or_else(|| {
            CliError::DateParseError(format!(
                "Invalid date '{}' (expected YYYY-MM-DD)",
                date_str
            ))
        })?;
    }
    if let Some(ref time_str) = time {
        due::parse_due_time(time_str).ok_or_else(|| {
            CliError::TimeParseError(format!("Invalid time '{}' (expected HH:MM)", time_str))
        })?;
    }

    let mut list = TaskList::from_tasks(store.load()?);
    let id = list.add(&text, date, time)?.id.clone();
    store.save(list.tasks())?;
    println!("Task created successfully (ID: {})", id);

    Ok(())
}

/// Handle the list command
pub fn handle_list(store: &TaskStore) -> Result<(), CliError> {
    let list = TaskList::from_tasks(store.load()?);
    if list.is_empty() {
        println!("No tasks.");
        return Ok(());
    }

    let now = chrono::Local::now().naive_local();
    for task in list.sorted(now) {
        let check = if task.completed { "x" } else { " " };
        let due = match (&task.due_date, &task.due_time) {
            (Some(d), Some(t)) => format!(" (due {} {})", d, t),
            (Some(d), None) => format!(" (due {})", d),
            _ => String::new(),
        };
        let marker = match due::status(&task, now) {
            DueStatus::Overdue => " [overdue]",
            DueStatus::Today => " [today]",
            _ => "",
        };
        println!("[{}] {}{}{}  (ID: {})", check, task.text, due, marker, task.id);
    }

    let counts = list.counts();
    println!("{} left, {} done", counts.left, counts.done);

    Ok(())
}

/// Handle the toggle command
pub fn handle_toggle(id: String, store: &TaskStore) -> Result<(), CliError> {
    let target = TaskId::parse(&id);
    let mut list = TaskList::from_tasks(store.load()?);

    if list.toggle(&target) {
        let done = list.get(&target).map(|t| t.completed).unwrap_or(false);
        store.save(list.tasks())?;
        let state = if done { "done" } else { "not done" };
        println!("Task marked {} (ID: {})", state, id);
    } else {
        println!("No task found (ID: {})", id);
    }

    Ok(())
}

/// Handle the rm command
pub fn handle_rm(id: String, store: &TaskStore) -> Result<(), CliError> {
    let target = TaskId::parse(&id);
    let mut list = TaskList::from_tasks(store.load()?);

    if list.remove(&target) {
        store.save(list.tasks())?;
        println!("Task deleted (ID: {})", id);
    } else {
        println!("No task found (ID: {})", id);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> TaskStore {
        let path = dir.path().join("tasks.json");
        TaskStore::open(path.to_str().unwrap()).unwrap()
    }

    #[test]
    fn cli_parses_add_with_due_fields() {
        let cli = Cli::try_parse_from([
            "duetask", "add", "water plants", "--date", "2024-03-15", "--time", "09:00",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Add { text, date, time }) => {
                assert_eq!(text, "water plants");
                assert_eq!(date.as_deref(), Some("2024-03-15"));
                assert_eq!(time.as_deref(), Some("09:00"));
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn cli_defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["duetask"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.dev);
    }

    #[test]
    fn add_persists_task() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        handle_add("water plants".to_string(), None, None, &store).unwrap();
        let tasks = store.load().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text, "water plants");
    }

    #[test]
    fn add_rejects_empty_text_without_persisting() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let result = handle_add("   ".to_string(), None, None, &store);
        assert!(matches!(result, Err(CliError::ValidationError(_))));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn add_rejects_malformed_date() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let result = handle_add(
            "x".to_string(),
            Some("15-03-2024".to_string()),
            None,
            &store,
        );
        assert!(matches!(result, Err(CliError::DateParseError(_))));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn toggle_round_trips_through_storage() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        handle_add("water plants".to_string(), None, None, &store).unwrap();
        let id = store.load().unwrap()[0].id.to_string();
        handle_toggle(id, &store).unwrap();
        assert!(store.load().unwrap()[0].completed);
    }

    #[test]
    fn toggle_unknown_id_is_a_quiet_noop() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        handle_add("water plants".to_string(), None, None, &store).unwrap();
        handle_toggle("999999".to_string(), &store).unwrap();
        assert!(!store.load().unwrap()[0].completed);
    }

    #[test]
    fn rm_removes_task_from_storage() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        handle_add("one".to_string(), None, None, &store).unwrap();
        let id = store.load().unwrap()[0].id.to_string();
        handle_rm(id, &store).unwrap();
        assert!(store.load().unwrap().is_empty());
    }
}
