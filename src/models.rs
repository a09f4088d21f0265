use serde::{Deserialize, Serialize};

/// Task identifier. New ids are assigned as integers (epoch milliseconds,
/// bumped past any existing id), but stored data may carry either form, so
/// both deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Int(i64),
    Str(String),
}

impl TaskId {
    /// Parse user input: numeric strings become integer ids.
    pub fn parse(s: &str) -> Self {
        match s.parse::<i64>() {
            Ok(n) => TaskId::Int(n),
            Err(_) => TaskId::Str(s.to_string()),
        }
    }

    /// Lookup equality: an integer id matches its decimal string form, so
    /// `toggle 42` finds a task stored with either `42` or `"42"`.
    pub fn matches(&self, other: &TaskId) -> bool {
        match (self, other) {
            (TaskId::Int(a), TaskId::Int(b)) => a == b,
            (TaskId::Str(a), TaskId::Str(b)) => a == b,
            (TaskId::Int(a), TaskId::Str(s)) | (TaskId::Str(s), TaskId::Int(a)) => {
                s.parse::<i64>().map(|n| n == *a).unwrap_or(false)
            }
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            TaskId::Int(n) => Some(*n),
            TaskId::Str(s) => s.parse().ok(),
        }
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskId::Int(n) => write!(f, "{}", n),
            TaskId::Str(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>, // YYYY-MM-DD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_time: Option<String>, // HH:MM
    pub completed: bool,
    pub created_at: String,       // ISO 8601
}

impl Task {
    pub fn new(id: TaskId, text: String, due_date: Option<String>, due_time: Option<String>) -> Self {
        let created_at = chrono::Utc::now()
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        Self {
            id,
            text,
            due_date,
            due_time,
            completed: false,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_parses_numeric_input_as_int() {
        assert_eq!(TaskId::parse("42"), TaskId::Int(42));
        assert_eq!(TaskId::parse("abc-1"), TaskId::Str("abc-1".to_string()));
    }

    #[test]
    fn id_matches_across_forms() {
        assert!(TaskId::Int(42).matches(&TaskId::Str("42".to_string())));
        assert!(TaskId::Str("42".to_string()).matches(&TaskId::Int(42)));
        assert!(!TaskId::Int(42).matches(&TaskId::Int(43)));
        assert!(!TaskId::Str("42a".to_string()).matches(&TaskId::Int(42)));
    }

    #[test]
    fn deserializes_integer_and_string_ids() {
        let json = r#"[
            {"id": 1700000000000, "text": "a", "completed": false, "createdAt": "2024-01-01T09:00:00.000Z"},
            {"id": "legacy-7", "text": "b", "completed": true, "createdAt": "2024-01-01T10:00:00.000Z"}
        ]"#;
        let tasks: Vec<Task> = serde_json::from_str(json).unwrap();
        assert_eq!(tasks[0].id, TaskId::Int(1_700_000_000_000));
        assert_eq!(tasks[1].id, TaskId::Str("legacy-7".to_string()));
    }

    #[test]
    fn missing_due_fields_deserialize_as_absent() {
        let json = r#"{"id": 1, "text": "a", "completed": false, "createdAt": "2024-01-01T09:00:00.000Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.due_date, None);
        assert_eq!(task.due_time, None);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let json = r#"{"id": 1, "text": "a", "completed": false, "createdAt": "2024-01-01T09:00:00.000Z", "color": "red"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.text, "a");
    }

    #[test]
    fn serializes_with_camel_case_keys_and_skips_absent_due_fields() {
        let task = Task {
            id: TaskId::Int(5),
            text: "write report".to_string(),
            due_date: Some("2024-03-01".to_string()),
            due_time: None,
            completed: false,
            created_at: "2024-02-01T08:00:00.000Z".to_string(),
        };
        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"dueDate\":\"2024-03-01\""));
        assert!(json.contains("\"createdAt\""));
        assert!(!json.contains("dueTime"));
    }

    #[test]
    fn new_task_starts_incomplete_with_timestamp() {
        let task = Task::new(TaskId::Int(1), "buy milk".to_string(), None, None);
        assert!(!task.completed);
        assert!(task.created_at.ends_with('Z'));
    }
}
