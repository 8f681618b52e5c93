#![forbid(unsafe_code)]

use crate::task::model::{Task, TaskDraft, TaskStatus, filter_tasks};

/// Lifecycle of the board's initial load. Only the first fetch moves the
/// whole view here; later per-task failures are tracked separately so the
/// already-loaded list survives them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

/// In-memory task list behind the board view.
///
/// Mutations are applied in two steps: an optimistic patch built from the
/// local request payload, then a full re-fetch whose result overwrites the
/// patch via [`TaskList::reconcile`]. The fetch always wins; there is no
/// merging and no conflict detection.
#[derive(Debug)]
pub struct TaskList {
    state: LoadState,
    tasks: Vec<Task>,
    action_error: Option<String>,
}

impl Default for TaskList {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskList {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: LoadState::Loading,
            tasks: Vec::new(),
            action_error: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[must_use]
    pub fn action_error(&self) -> Option<&str> {
        self.action_error.as_deref()
    }

    pub fn clear_action_error(&mut self) {
        self.action_error = None;
    }

    /// Initial fetch succeeded.
    pub fn load_ok(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.state = LoadState::Ready;
    }

    /// Initial fetch failed; the whole view is failed, nothing to show.
    pub fn load_failed(&mut self, message: impl Into<String>) {
        self.tasks.clear();
        self.state = LoadState::Failed(message.into());
    }

    /// Derived view: full list filtered by the current search term.
    #[must_use]
    pub fn visible(&self, query: &str) -> Vec<&Task> {
        filter_tasks(&self.tasks, query)
    }

    #[must_use]
    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Optimistic insert of a freshly created task.
    pub fn apply_created(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Optimistic patch of an edited task from the local draft.
    pub fn apply_updated(&mut self, id: i64, draft: &TaskDraft) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.title.clone_from(&draft.title);
            task.description.clone_from(&draft.description);
            if let Some(status) = draft.status {
                task.status = status;
            }
        }
    }

    /// Optimistic status flip.
    pub fn apply_status(&mut self, id: i64, status: TaskStatus) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.status = status;
        }
    }

    /// Optimistic removal; touches exactly the one task.
    pub fn apply_deleted(&mut self, id: i64) {
        self.tasks.retain(|t| t.id != id);
    }

    /// The re-fetch half of a mutation: the server list overwrites whatever
    /// the optimistic patch produced.
    pub fn reconcile(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.state = LoadState::Ready;
    }

    /// A mutation failed: keep the loaded list, surface the message.
    pub fn action_failed(&mut self, message: impl Into<String>) {
        self.action_error = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::model::Task;

    fn task(id: i64, title: &str, status: TaskStatus) -> Task {
        Task {
            id,
            title: title.to_owned(),
            description: String::new(),
            status,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn starts_loading_then_ready() {
        let mut list = TaskList::new();
        assert_eq!(*list.state(), LoadState::Loading);

        list.load_ok(vec![task(1, "a", TaskStatus::Pending)]);
        assert_eq!(*list.state(), LoadState::Ready);
        assert_eq!(list.tasks().len(), 1);
    }

    #[test]
    fn failed_initial_load_has_no_tasks() {
        let mut list = TaskList::new();
        list.load_failed("connection refused");
        assert_eq!(
            *list.state(),
            LoadState::Failed("connection refused".to_owned())
        );
        assert!(list.tasks().is_empty());
        assert!(list.visible("").is_empty());
    }

    #[test]
    fn optimistic_status_change_is_visible_immediately() {
        let mut list = TaskList::new();
        list.load_ok(vec![
            task(1, "a", TaskStatus::Pending),
            task(2, "b", TaskStatus::Pending),
        ]);

        list.apply_status(1, TaskStatus::Completed);
        assert_eq!(list.get(1).unwrap().status, TaskStatus::Completed);
        assert_eq!(list.get(2).unwrap().status, TaskStatus::Pending);
    }

    #[test]
    fn optimistic_edit_patches_fields_from_draft() {
        let mut list = TaskList::new();
        list.load_ok(vec![
            task(1, "a", TaskStatus::Pending),
            task(2, "b", TaskStatus::Pending),
        ]);

        let draft = TaskDraft {
            title: "renamed".to_owned(),
            description: "details".to_owned(),
            status: Some(TaskStatus::InProgress),
        };
        list.apply_updated(1, &draft);
        let t = list.get(1).unwrap();
        assert_eq!(t.title, "renamed");
        assert_eq!(t.description, "details");
        assert_eq!(t.status, TaskStatus::InProgress);
        // The other task is untouched.
        assert_eq!(list.get(2).unwrap().title, "b");

        // A draft without a status keeps the current one.
        let keep = TaskDraft {
            title: "renamed again".to_owned(),
            description: String::new(),
            status: None,
        };
        list.apply_updated(1, &keep);
        let t = list.get(1).unwrap();
        assert_eq!(t.title, "renamed again");
        assert_eq!(t.status, TaskStatus::InProgress);
    }

    #[test]
    fn reconcile_overwrites_optimistic_patch() {
        let mut list = TaskList::new();
        list.load_ok(vec![task(1, "a", TaskStatus::Pending)]);

        list.apply_status(1, TaskStatus::Completed);
        // Server disagrees; its copy wins wholesale.
        list.reconcile(vec![task(1, "a", TaskStatus::InProgress)]);
        assert_eq!(list.get(1).unwrap().status, TaskStatus::InProgress);
    }

    #[test]
    fn optimistic_delete_removes_exactly_one() {
        let mut list = TaskList::new();
        list.load_ok(vec![
            task(1, "a", TaskStatus::Pending),
            task(2, "b", TaskStatus::Pending),
            task(3, "c", TaskStatus::Completed),
        ]);

        list.apply_deleted(2);
        let ids: Vec<i64> = list.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn action_failure_keeps_loaded_list() {
        let mut list = TaskList::new();
        list.load_ok(vec![task(1, "a", TaskStatus::Pending)]);

        list.action_failed("server said no");
        assert_eq!(*list.state(), LoadState::Ready);
        assert_eq!(list.tasks().len(), 1);
        assert_eq!(list.action_error(), Some("server said no"));

        list.clear_action_error();
        assert!(list.action_error().is_none());
    }

    #[test]
    fn visible_is_derived_not_stored() {
        let mut list = TaskList::new();
        list.load_ok(vec![
            task(1, "Buy milk", TaskStatus::Pending),
            task(2, "Write report", TaskStatus::Completed),
        ]);

        assert_eq!(list.visible("milk").len(), 1);
        assert_eq!(list.visible("").len(), 2);
        assert!(list.visible("zzz").is_empty());
        // Filtering never mutates the backing list.
        assert_eq!(list.tasks().len(), 2);
    }
}
