#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    /// The exact string the server stores and expects.
    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in progress",
            TaskStatus::Completed => "completed",
        }
    }

    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            TaskStatus::Pending => "○",
            TaskStatus::InProgress => "◐",
            TaskStatus::Completed => "●",
        }
    }

    /// Parses user input: accepts the wire form and a few CLI-friendly
    /// spellings ("in-progress", "done", ...), case-insensitively.
    pub fn parse(input: &str) -> Result<Self, String> {
        match input.trim().to_lowercase().as_str() {
            "pending" | "todo" => Ok(TaskStatus::Pending),
            "in_progress" | "in-progress" | "progress" | "doing" => Ok(TaskStatus::InProgress),
            "completed" | "complete" | "done" => Ok(TaskStatus::Completed),
            other => Err(format!(
                "unknown status '{other}' (expected pending, in-progress, or completed)"
            )),
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    #[must_use]
    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// A server-owned task record. The client only ever holds a transient cached
/// copy; the server's list is the source of truth after every mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    #[serde(rename = "createdAt", default)]
    pub created_at: String,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: String,
}

/// Transient form fields shared by the create and edit dialogs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: Option<TaskStatus>,
}

impl TaskDraft {
    #[must_use]
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: Some(task.status),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is required".to_owned());
        }
        if self.status.is_none() {
            return Err("status is required".to_owned());
        }
        Ok(())
    }
}

#[must_use]
pub fn matches_query(task: &Task, needle: &str) -> bool {
    task.title.to_lowercase().contains(needle)
        || task.description.to_lowercase().contains(needle)
        || task.status.as_wire().to_lowercase().contains(needle)
        || task.status.label().contains(needle)
}

/// Case-insensitive substring filter over title, description, and status.
/// The visible list is always recomputed from the full list; it is never
/// stored separately.
#[must_use]
pub fn filter_tasks<'a>(tasks: &'a [Task], query: &str) -> Vec<&'a Task> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return tasks.iter().collect();
    }
    tasks.iter().filter(|t| matches_query(t, &needle)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn task(id: i64, title: &str, description: &str, status: TaskStatus) -> Task {
        Task {
            id,
            title: title.to_owned(),
            description: description.to_owned(),
            status,
            created_at: "2024-11-02T09:00:00Z".to_owned(),
            updated_at: "2024-11-02T09:00:00Z".to_owned(),
        }
    }

    #[test]
    fn status_wire_format_roundtrip() {
        for status in TaskStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_wire()));
            let back: TaskStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn status_parse_accepts_cli_spellings() {
        assert_eq!(TaskStatus::parse("PENDING").unwrap(), TaskStatus::Pending);
        assert_eq!(
            TaskStatus::parse("in-progress").unwrap(),
            TaskStatus::InProgress
        );
        assert_eq!(TaskStatus::parse("done").unwrap(), TaskStatus::Completed);
        assert!(TaskStatus::parse("paused").is_err());
    }

    #[test]
    fn status_cycle_wraps_both_ways() {
        assert_eq!(TaskStatus::Pending.next(), TaskStatus::InProgress);
        assert_eq!(TaskStatus::Completed.next(), TaskStatus::Pending);
        assert_eq!(TaskStatus::Pending.prev(), TaskStatus::Completed);
        assert_eq!(TaskStatus::InProgress.prev(), TaskStatus::Pending);
        for status in TaskStatus::ALL {
            assert_eq!(status.next().prev(), status);
        }
    }

    #[test]
    fn task_deserializes_camel_case_timestamps() {
        let raw = r#"{
            "id": 7,
            "title": "Groceries",
            "description": "milk",
            "status": "IN_PROGRESS",
            "createdAt": "2024-11-02T09:00:00.000Z",
            "updatedAt": "2024-11-03T10:30:00.000Z"
        }"#;
        let t: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(t.id, 7);
        assert_eq!(t.status, TaskStatus::InProgress);
        assert_eq!(t.created_at, "2024-11-02T09:00:00.000Z");
    }

    #[test]
    fn filter_matches_title_description_and_status() {
        let tasks = vec![
            task(1, "Buy milk", "from the corner shop", TaskStatus::Pending),
            task(2, "Write report", "quarterly numbers", TaskStatus::InProgress),
            task(3, "Ship release", "tag and publish", TaskStatus::Completed),
        ];

        let hits = filter_tasks(&tasks, "MILK");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);

        let hits = filter_tasks(&tasks, "numbers");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);

        let hits = filter_tasks(&tasks, "progress");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);

        assert_eq!(filter_tasks(&tasks, "").len(), 3);
        assert!(filter_tasks(&tasks, "zzz").is_empty());
    }

    #[test]
    fn draft_requires_title_and_status() {
        let mut draft = TaskDraft::default();
        assert!(draft.validate().is_err());

        draft.title = "Buy milk".to_owned();
        assert!(draft.validate().is_err());

        draft.status = Some(TaskStatus::Pending);
        assert!(draft.validate().is_ok());
    }
}
