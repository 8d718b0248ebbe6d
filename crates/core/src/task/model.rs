//! Task model definitions
//!
//! These types match the remote API's wire format.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A to-do item as the server represents it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub is_done: bool,
}

impl Task {
    /// Create a new task with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            is_done: false,
        }
    }

    /// Set the completion flag
    pub fn with_done(mut self, done: bool) -> Self {
        self.is_done = done;
        self
    }
}

/// Partial update for a task; fields left unset are not sent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_done: Option<bool>,
}

impl TaskPatch {
    /// Patch that renames the task
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            is_done: None,
        }
    }

    /// Patch that sets the completion flag
    pub fn done(done: bool) -> Self {
        Self {
            title: None,
            is_done: Some(done),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_task() {
        let task = Task::new("Test task");
        assert_eq!(task.title, "Test task");
        assert!(!task.is_done);
    }

    #[test]
    fn test_task_wire_format() {
        let task = Task::new("Write report").with_done(true);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["title"], "Write report");
        assert_eq!(json["isDone"], true);
    }

    #[test]
    fn test_task_is_done_defaults_to_false() {
        let json = format!(r#"{{"id":"{}","title":"a"}}"#, Uuid::new_v4());
        let task: Task = serde_json::from_str(&json).unwrap();
        assert!(!task.is_done);
    }

    #[test]
    fn test_patch_skips_unset_fields() {
        let json = serde_json::to_string(&TaskPatch::done(true)).unwrap();
        assert_eq!(json, r#"{"isDone":true}"#);

        let json = serde_json::to_string(&TaskPatch::title("new")).unwrap();
        assert_eq!(json, r#"{"title":"new"}"#);
    }
}
