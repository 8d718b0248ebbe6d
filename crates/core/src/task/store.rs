//! Task list state container
//!
//! Holds the in-memory list mirrored from the server plus fetch status.
//! The view commits every server response through one of the transitions
//! below; the store itself performs no I/O. Responses are applied in
//! arrival order, which may differ from request order, so deletions leave
//! a tombstone that keeps a late update response from resurrecting the
//! task.

use std::collections::HashSet;

use uuid::Uuid;

use super::model::Task;

/// Client-side task list state
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    loading: bool,
    error: Option<String>,
    tombstones: HashSet<Uuid>,
}

impl TaskStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks in server order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// True between the start of a fetch and its resolution
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Error recorded by the last failed fetch, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Get a task by id
    pub fn get_task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Number of completed tasks
    pub fn done_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.is_done).count()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Mark a fetch as started. Existing tasks and error are kept until
    /// the fetch resolves.
    pub fn set_loading(&mut self) {
        self.loading = true;
    }

    /// Replace the list with a full server response, verbatim.
    ///
    /// The incoming list is authoritative, so session tombstones are
    /// dropped along with any recorded error.
    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.tombstones.clear();
        self.tasks = tasks;
        self.settle();
    }

    /// Record a failed fetch.
    ///
    /// The previous list is discarded: a list that failed to load is
    /// treated as unknown, not last-known-good.
    pub fn set_error(&mut self, error: impl Into<String>) {
        self.tasks.clear();
        self.error = Some(error.into());
        self.loading = false;
    }

    /// Commit a successful create response.
    ///
    /// If the server re-sends an id the list already holds, the existing
    /// entry is replaced so the list never carries duplicate ids.
    pub fn commit_created(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|existing| existing.id == task.id) {
            Some(existing) => *existing = task,
            None => self.tasks.push(task),
        }
        self.settle();
    }

    /// Commit a successful update response by replacing the entry with
    /// the same id. Returns false, leaving the list untouched, when the
    /// id is unknown or already deleted.
    pub fn commit_updated(&mut self, task: Task) -> bool {
        if self.tombstones.contains(&task.id) {
            return false;
        }
        let Some(existing) = self.tasks.iter_mut().find(|existing| existing.id == task.id) else {
            return false;
        };
        *existing = task;
        self.settle();
        true
    }

    /// Commit a successful delete response.
    ///
    /// Removing an id the list no longer holds is a valid no-op, but the
    /// tombstone is recorded either way.
    pub fn commit_deleted(&mut self, id: Uuid) -> bool {
        self.tombstones.insert(id);
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.settle();
        self.tasks.len() != before
    }

    fn settle(&mut self) {
        self.loading = false;
        self.error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(tasks: Vec<Task>) -> TaskStore {
        let mut store = TaskStore::new();
        store.set_tasks(tasks);
        store
    }

    #[test]
    fn test_set_tasks_replaces_verbatim() {
        let mut store = TaskStore::new();
        store.set_loading();
        store.set_error("boom");

        let tasks = vec![Task::new("a"), Task::new("b")];
        store.set_tasks(tasks.clone());

        assert_eq!(store.tasks(), tasks.as_slice());
        assert!(!store.is_loading());
        assert!(store.error().is_none());
    }

    #[test]
    fn test_set_loading_keeps_tasks_and_error() {
        let mut store = store_with(vec![Task::new("a")]);
        store.set_loading();
        assert!(store.is_loading());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_set_error_discards_previous_list() {
        let mut store = store_with(vec![Task::new("a"), Task::new("b")]);
        store.set_error("fetch failed");

        assert!(store.is_empty());
        assert_eq!(store.error(), Some("fetch failed"));
        assert!(!store.is_loading());
    }

    #[test]
    fn test_commit_created_appends() {
        let mut store = store_with(vec![Task::new("a")]);
        let task = Task::new("b");
        store.commit_created(task.clone());

        assert_eq!(store.len(), 2);
        assert_eq!(store.tasks()[1], task);
    }

    #[test]
    fn test_commit_created_never_duplicates_ids() {
        let task = Task::new("a");
        let mut store = store_with(vec![task.clone()]);
        store.commit_created(task.clone().with_done(true));

        assert_eq!(store.len(), 1);
        assert!(store.tasks()[0].is_done);
    }

    #[test]
    fn test_commit_updated_flips_only_the_target() {
        let first = Task::new("a");
        let second = Task::new("b");
        let mut store = store_with(vec![first.clone(), second.clone()]);

        let updated = store.commit_updated(first.clone().with_done(true));

        assert!(updated);
        assert_eq!(
            store.tasks(),
            &[first.with_done(true), second]
        );
    }

    #[test]
    fn test_commit_updated_clears_fetch_error() {
        let task = Task::new("a");
        let mut store = store_with(vec![task.clone()]);
        store.error = Some("stale".to_string());

        store.commit_updated(task.with_done(true));
        assert!(store.error().is_none());
    }

    #[test]
    fn test_commit_updated_unknown_id_is_rejected() {
        let mut store = store_with(vec![Task::new("a")]);
        let updated = store.commit_updated(Task::new("ghost"));

        assert!(!updated);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_commit_deleted_removes_exactly_one() {
        let first = Task::new("a");
        let second = Task::new("b");
        let mut store = store_with(vec![first.clone(), second.clone()]);

        let removed = store.commit_deleted(first.id);

        assert!(removed);
        assert_eq!(store.tasks(), &[second]);
    }

    #[test]
    fn test_commit_deleted_absent_id_is_a_noop_on_the_list() {
        let task = Task::new("a");
        let mut store = store_with(vec![task.clone()]);

        let removed = store.commit_deleted(Uuid::new_v4());

        assert!(!removed);
        assert_eq!(store.tasks(), &[task]);
    }

    #[test]
    fn test_late_update_cannot_resurrect_a_deleted_task() {
        let task = Task::new("a");
        let mut store = store_with(vec![task.clone()]);

        // Delete response lands first, then the slower update response
        // for the same task arrives.
        store.commit_deleted(task.id);
        let updated = store.commit_updated(task.clone().with_done(true));

        assert!(!updated);
        assert!(store.get_task(task.id).is_none());
    }

    #[test]
    fn test_full_fetch_drops_tombstones() {
        let task = Task::new("a");
        let mut store = store_with(vec![task.clone()]);
        store.commit_deleted(task.id);

        // The server still reports the task in a later full list, so it
        // is live again and updatable.
        store.set_tasks(vec![task.clone()]);
        assert!(store.commit_updated(task.with_done(true)));
    }

    #[test]
    fn test_done_count() {
        let mut store = store_with(vec![
            Task::new("a").with_done(true),
            Task::new("b"),
            Task::new("c").with_done(true),
        ]);
        assert_eq!(store.done_count(), 2);

        store.set_tasks(Vec::new());
        assert_eq!(store.done_count(), 0);
    }
}
