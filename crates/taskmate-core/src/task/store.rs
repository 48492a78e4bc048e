//! Local task collection store.
//!
//! Maintains the in-memory mirror of the user's tasks and applies every
//! mutation with a fixed per-operation discipline: optimistic-then-confirm
//! for `add` and `remove`, confirm-then-apply for `toggle_completion` and
//! `update`. Mutations targeting the same task id are serialized through a
//! per-id queue; different ids may be in flight concurrently and the store
//! converges regardless of completion order (last confirmed response wins
//! for that id).

use super::gateway::TaskGateway;
use super::model::{Task, TaskPatch};
use crate::error::{Result, TaskmateError};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::{Mutex, RwLock, watch};

/// The local mirror of a user's task set.
///
/// `TaskStore` is responsible for:
/// - Loading the full task set from the gateway
/// - Applying optimistic mutations and rolling them back on failure
/// - Serializing mutations per task id to prevent lost-update races
/// - Notifying subscribers on every change to the local set
///
/// The store is the single shared mutable resource between the direct-edit
/// path and the assistant path; both go through the same per-id mutation
/// queue. There is no other locking primitive — the queue is the
/// concurrency control.
pub struct TaskStore {
    /// Injected gateway to the remote task store.
    gateway: Arc<dyn TaskGateway>,
    /// Ordered local task log, most recent first.
    tasks: RwLock<Vec<Task>>,
    /// Per-task-id mutation queue.
    mutation_locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
    /// Counter for provisional identities, strictly negative.
    next_provisional_id: AtomicI64,
    /// Revision counter bumped on every local-set change.
    revision: watch::Sender<u64>,
}

impl TaskStore {
    /// Creates a new store around the given gateway.
    pub fn new(gateway: Arc<dyn TaskGateway>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            gateway,
            tasks: RwLock::new(Vec::new()),
            mutation_locks: Mutex::new(HashMap::new()),
            next_provisional_id: AtomicI64::new(-1),
            revision,
        }
    }

    /// Subscribes to change notifications.
    ///
    /// The receiver observes a revision counter that is bumped on every
    /// change to the local set. Subscribers (the view projection, any UI)
    /// re-read [`TaskStore::tasks`] when it changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Returns a snapshot of the ordered local task log.
    pub async fn tasks(&self) -> Vec<Task> {
        self.tasks.read().await.clone()
    }

    /// Fetches the full task set for a user and replaces the local set.
    ///
    /// # Errors
    ///
    /// Returns `Fetch` on network or authorization failure; the previous
    /// set is left untouched so the caller keeps a consistent view.
    pub async fn load(&self, user_id: i64) -> Result<()> {
        let fetched = self.gateway.list(user_id).await?;
        tracing::debug!("[TaskStore] loaded {} tasks for user {}", fetched.len(), user_id);

        let mut tasks = self.tasks.write().await;
        *tasks = fetched;
        drop(tasks);
        self.notify_changed();
        Ok(())
    }

    /// Adds a task optimistically, then confirms it against the gateway.
    ///
    /// The task appears at the front of the local log immediately under a
    /// provisional identity. On success the provisional entry is replaced
    /// wholesale by the server-confirmed task; on failure it is removed
    /// again. Title emptiness is caller-validated; the store does not
    /// re-validate.
    ///
    /// # Errors
    ///
    /// Returns `Mutation` when the create call fails, with the provisional
    /// entry already rolled back.
    pub async fn add(
        &self,
        user_id: i64,
        title: impl Into<String>,
        description: Option<String>,
    ) -> Result<Task> {
        let provisional_id = self.next_provisional_id.fetch_sub(1, Ordering::Relaxed);
        let now = Utc::now();
        let provisional = Task {
            id: provisional_id,
            user_id,
            title: title.into(),
            description: description.clone(),
            completed: false,
            created_at: now,
            updated_at: now,
        };

        {
            let mut tasks = self.tasks.write().await;
            tasks.insert(0, provisional.clone());
        }
        self.notify_changed();

        match self
            .gateway
            .create(user_id, &provisional.title, description.as_deref())
            .await
        {
            Ok(confirmed) => {
                let mut tasks = self.tasks.write().await;
                if let Some(slot) = tasks.iter_mut().find(|t| t.id == provisional_id) {
                    *slot = confirmed.clone();
                } else {
                    // The provisional entry was dropped by an interleaved full
                    // reload; adopt the confirmed task at the front.
                    tasks.insert(0, confirmed.clone());
                }
                drop(tasks);
                self.notify_changed();
                Ok(confirmed)
            }
            Err(err) => {
                let mut tasks = self.tasks.write().await;
                tasks.retain(|t| t.id != provisional_id);
                drop(tasks);
                self.notify_changed();
                Err(err)
            }
        }
    }

    /// Toggles a task's completion flag, confirm-then-apply.
    ///
    /// No optimistic flip: a toggle is cheap to retry, and a mis-rendered
    /// optimistic flip is more confusing than a brief round-trip delay. The
    /// local task is replaced with the server-returned version only on
    /// success and left unchanged on failure.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the id does not reference a local task, or
    /// `Mutation` when the toggle call fails.
    pub async fn toggle_completion(&self, user_id: i64, task_id: i64) -> Result<Task> {
        let queue = self.mutation_lock(task_id).await;
        let _slot = queue.lock().await;

        self.require_local(task_id).await?;
        let confirmed = self.gateway.toggle(user_id, task_id).await?;
        self.apply_confirmed(confirmed.clone()).await;
        Ok(confirmed)
    }

    /// Rewrites a task's title and description, confirm-then-apply.
    ///
    /// Same discipline as [`TaskStore::toggle_completion`].
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the id does not reference a local task, or
    /// `Mutation` when the update call fails.
    pub async fn update(
        &self,
        user_id: i64,
        task_id: i64,
        title: impl Into<String>,
        description: Option<String>,
    ) -> Result<Task> {
        let queue = self.mutation_lock(task_id).await;
        let _slot = queue.lock().await;

        self.require_local(task_id).await?;
        let confirmed = self
            .gateway
            .update(user_id, task_id, TaskPatch::edit(title, description))
            .await?;
        self.apply_confirmed(confirmed.clone()).await;
        Ok(confirmed)
    }

    /// Removes a task optimistically, then confirms against the gateway.
    ///
    /// On failure the task is re-inserted at its prior ordinal position.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the id does not reference a local task, or
    /// `Mutation` when the delete call fails, with the task restored.
    pub async fn remove(&self, user_id: i64, task_id: i64) -> Result<()> {
        let queue = self.mutation_lock(task_id).await;
        let _slot = queue.lock().await;

        let removed = {
            let mut tasks = self.tasks.write().await;
            tasks
                .iter()
                .position(|t| t.id == task_id)
                .map(|position| (position, tasks.remove(position)))
        };
        let Some((position, task)) = removed else {
            return Err(TaskmateError::not_found("task", task_id.to_string()));
        };
        self.notify_changed();

        if let Err(err) = self.gateway.delete(user_id, task_id).await {
            let mut tasks = self.tasks.write().await;
            let position = position.min(tasks.len());
            tasks.insert(position, task);
            drop(tasks);
            self.notify_changed();
            return Err(err);
        }
        Ok(())
    }

    /// Merges an externally produced task set into the local mirror.
    ///
    /// Tasks are replaced by identity and unknown tasks are inserted at the
    /// front. Tasks absent from `incoming` are deleted locally only when
    /// `authoritative` is true, i.e. the source is known to be a full
    /// snapshot; a partial source merges by id and never diffs by absence.
    pub async fn reconcile(&self, incoming: Vec<Task>, authoritative: bool) {
        let mut tasks = self.tasks.write().await;
        if authoritative {
            *tasks = incoming;
        } else {
            let mut fresh = Vec::new();
            for task in incoming {
                match tasks.iter_mut().find(|t| t.id == task.id) {
                    Some(slot) => *slot = task,
                    None => fresh.push(task),
                }
            }
            tasks.splice(0..0, fresh);
        }
        drop(tasks);
        self.notify_changed();
    }

    /// Discards the local set (store teardown on sign-out).
    pub async fn clear(&self) {
        let mut tasks = self.tasks.write().await;
        tasks.clear();
        drop(tasks);
        self.notify_changed();
    }

    /// Returns the per-id mutation queue entry for `task_id`.
    async fn mutation_lock(&self, task_id: i64) -> Arc<Mutex<()>> {
        let mut locks = self.mutation_locks.lock().await;
        locks
            .entry(task_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Fails with `NotFound` unless `task_id` references a local task.
    async fn require_local(&self, task_id: i64) -> Result<()> {
        let tasks = self.tasks.read().await;
        if tasks.iter().any(|t| t.id == task_id) {
            Ok(())
        } else {
            Err(TaskmateError::not_found("task", task_id.to_string()))
        }
    }

    /// Replaces the local task matching the confirmed response.
    ///
    /// If the task vanished from the local set in the meantime (interleaved
    /// reload) the response is dropped rather than resurrecting the entry.
    async fn apply_confirmed(&self, confirmed: Task) {
        let mut tasks = self.tasks.write().await;
        if let Some(slot) = tasks.iter_mut().find(|t| t.id == confirmed.id) {
            *slot = confirmed;
            drop(tasks);
            self.notify_changed();
        }
    }

    fn notify_changed(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::time::Duration;

    /// In-memory gateway that mimics the remote task store and records how
    /// many operations were in flight per task id at any moment.
    struct MockTaskGateway {
        remote: std::sync::Mutex<Vec<Task>>,
        next_id: AtomicI64,
        fail_reads: AtomicBool,
        fail_writes: AtomicBool,
        op_delay: Option<Duration>,
        in_flight: std::sync::Mutex<HashMap<i64, usize>>,
        max_in_flight_per_id: AtomicUsize,
        max_in_flight_total: AtomicUsize,
    }

    impl MockTaskGateway {
        fn new() -> Self {
            Self {
                remote: std::sync::Mutex::new(Vec::new()),
                next_id: AtomicI64::new(1),
                fail_reads: AtomicBool::new(false),
                fail_writes: AtomicBool::new(false),
                op_delay: None,
                in_flight: std::sync::Mutex::new(HashMap::new()),
                max_in_flight_per_id: AtomicUsize::new(0),
                max_in_flight_total: AtomicUsize::new(0),
            }
        }

        fn with_delay(delay: Duration) -> Self {
            Self {
                op_delay: Some(delay),
                ..Self::new()
            }
        }

        fn seed(&self, titles: &[&str]) {
            let now = Utc::now();
            let mut remote = self.remote.lock().unwrap();
            for title in titles {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                remote.push(Task {
                    id,
                    user_id: 1,
                    title: title.to_string(),
                    description: None,
                    completed: false,
                    created_at: now,
                    updated_at: now,
                });
            }
        }

        fn remote_tasks(&self) -> Vec<Task> {
            self.remote.lock().unwrap().clone()
        }

        fn check_write(&self) -> Result<()> {
            if self.fail_writes.load(Ordering::Relaxed) {
                Err(TaskmateError::mutation("injected write failure"))
            } else {
                Ok(())
            }
        }

        fn enter(&self, task_id: i64) {
            let mut in_flight = self.in_flight.lock().unwrap();
            let slot = in_flight.entry(task_id).or_insert(0);
            *slot += 1;
            self.max_in_flight_per_id
                .fetch_max(*slot, Ordering::Relaxed);
            let total: usize = in_flight.values().sum();
            self.max_in_flight_total.fetch_max(total, Ordering::Relaxed);
        }

        fn exit(&self, task_id: i64) {
            let mut in_flight = self.in_flight.lock().unwrap();
            if let Some(slot) = in_flight.get_mut(&task_id) {
                *slot -= 1;
            }
        }

        async fn delay(&self) {
            if let Some(delay) = self.op_delay {
                tokio::time::sleep(delay).await;
            }
        }
    }

    #[async_trait]
    impl TaskGateway for MockTaskGateway {
        async fn list(&self, _user_id: i64) -> Result<Vec<Task>> {
            if self.fail_reads.load(Ordering::Relaxed) {
                return Err(TaskmateError::fetch("injected read failure"));
            }
            Ok(self.remote_tasks())
        }

        async fn create(
            &self,
            user_id: i64,
            title: &str,
            description: Option<&str>,
        ) -> Result<Task> {
            self.check_write()?;
            let now = Utc::now();
            let task = Task {
                id: self.next_id.fetch_add(1, Ordering::Relaxed),
                user_id,
                title: title.to_string(),
                description: description.map(str::to_string),
                completed: false,
                created_at: now,
                updated_at: now,
            };
            self.remote.lock().unwrap().push(task.clone());
            Ok(task)
        }

        async fn update(&self, _user_id: i64, task_id: i64, patch: TaskPatch) -> Result<Task> {
            self.check_write()?;
            let mut remote = self.remote.lock().unwrap();
            let task = remote
                .iter_mut()
                .find(|t| t.id == task_id)
                .ok_or_else(|| TaskmateError::mutation("no such remote task"))?;
            if let Some(title) = patch.title {
                task.title = title;
            }
            if let Some(description) = patch.description {
                task.description = Some(description);
            }
            if let Some(completed) = patch.completed {
                task.completed = completed;
            }
            task.updated_at = Utc::now();
            Ok(task.clone())
        }

        async fn delete(&self, _user_id: i64, task_id: i64) -> Result<()> {
            self.check_write()?;
            self.remote.lock().unwrap().retain(|t| t.id != task_id);
            Ok(())
        }

        async fn toggle(&self, _user_id: i64, task_id: i64) -> Result<Task> {
            self.enter(task_id);
            self.delay().await;
            let outcome = (|| {
                self.check_write()?;
                let mut remote = self.remote.lock().unwrap();
                let task = remote
                    .iter_mut()
                    .find(|t| t.id == task_id)
                    .ok_or_else(|| TaskmateError::mutation("no such remote task"))?;
                task.completed = !task.completed;
                task.updated_at = Utc::now();
                Ok(task.clone())
            })();
            self.exit(task_id);
            outcome
        }
    }

    fn store_with(gateway: Arc<MockTaskGateway>) -> TaskStore {
        TaskStore::new(gateway)
    }

    fn ids(tasks: &[Task]) -> Vec<i64> {
        tasks.iter().map(|t| t.id).collect()
    }

    fn sorted_ids(tasks: &[Task]) -> Vec<i64> {
        let mut ids = ids(tasks);
        ids.sort_unstable();
        ids
    }

    #[tokio::test]
    async fn test_add_replaces_provisional_with_confirmed() {
        let gateway = Arc::new(MockTaskGateway::new());
        let store = store_with(gateway.clone());

        let revisions = store.subscribe();
        let confirmed = store.add(1, "Buy milk", None).await.unwrap();

        assert!(!confirmed.is_provisional());
        let tasks = store.tasks().await;
        assert_eq!(ids(&tasks), vec![confirmed.id]);
        assert!(tasks.iter().all(|t| !t.is_provisional()));
        assert!(revisions.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_add_failure_rolls_back_provisional() {
        let gateway = Arc::new(MockTaskGateway::new());
        gateway.seed(&["Pay rent"]);
        let store = store_with(gateway.clone());
        store.load(1).await.unwrap();
        let before = sorted_ids(&store.tasks().await);

        gateway.fail_writes.store(true, Ordering::Relaxed);
        let err = store.add(1, "Buy milk", None).await.unwrap_err();

        assert!(err.is_mutation());
        assert_eq!(sorted_ids(&store.tasks().await), before);
    }

    #[tokio::test]
    async fn test_load_failure_preserves_previous_set() {
        let gateway = Arc::new(MockTaskGateway::new());
        gateway.seed(&["Pay rent", "Buy milk"]);
        let store = store_with(gateway.clone());
        store.load(1).await.unwrap();
        let before = store.tasks().await;

        gateway.fail_reads.store(true, Ordering::Relaxed);
        let err = store.load(1).await.unwrap_err();

        assert!(err.is_fetch());
        assert_eq!(store.tasks().await, before);
    }

    #[tokio::test]
    async fn test_remove_failure_restores_ordinal_position() {
        let gateway = Arc::new(MockTaskGateway::new());
        gateway.seed(&["first", "second", "third"]);
        let store = store_with(gateway.clone());
        store.load(1).await.unwrap();
        let before = ids(&store.tasks().await);

        gateway.fail_writes.store(true, Ordering::Relaxed);
        let middle = before[1];
        let err = store.remove(1, middle).await.unwrap_err();

        assert!(err.is_mutation());
        assert_eq!(ids(&store.tasks().await), before);
    }

    #[tokio::test]
    async fn test_remove_success_deletes_locally_and_remotely() {
        let gateway = Arc::new(MockTaskGateway::new());
        gateway.seed(&["first", "second"]);
        let store = store_with(gateway.clone());
        store.load(1).await.unwrap();

        let victim = store.tasks().await[0].id;
        store.remove(1, victim).await.unwrap();

        assert!(!ids(&store.tasks().await).contains(&victim));
        assert!(!ids(&gateway.remote_tasks()).contains(&victim));
    }

    #[tokio::test]
    async fn test_toggle_is_confirm_then_apply() {
        let gateway = Arc::new(MockTaskGateway::new());
        gateway.seed(&["Buy milk"]);
        let store = store_with(gateway.clone());
        store.load(1).await.unwrap();
        let task_id = store.tasks().await[0].id;

        gateway.fail_writes.store(true, Ordering::Relaxed);
        let err = store.toggle_completion(1, task_id).await.unwrap_err();
        assert!(err.is_mutation());
        // No optimistic flip to roll back.
        assert!(!store.tasks().await[0].completed);

        gateway.fail_writes.store(false, Ordering::Relaxed);
        let confirmed = store.toggle_completion(1, task_id).await.unwrap();
        assert!(confirmed.completed);
        assert!(store.tasks().await[0].completed);
    }

    #[tokio::test]
    async fn test_toggle_unknown_id_is_not_found() {
        let gateway = Arc::new(MockTaskGateway::new());
        let store = store_with(gateway);

        let err = store.toggle_completion(1, 99).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_same_id_toggles_serialize() {
        let gateway = Arc::new(MockTaskGateway::with_delay(Duration::from_millis(20)));
        gateway.seed(&["Buy milk"]);
        let store = store_with(gateway.clone());
        store.load(1).await.unwrap();
        let task_id = store.tasks().await[0].id;

        let (first, second) = tokio::join!(
            store.toggle_completion(1, task_id),
            store.toggle_completion(1, task_id),
        );
        first.unwrap();
        second.unwrap();

        // The second call queued until the first resolved.
        assert_eq!(gateway.max_in_flight_per_id.load(Ordering::Relaxed), 1);
        // Two confirmed toggles net out to the original state.
        assert!(!store.tasks().await[0].completed);
        assert_eq!(store.tasks().await, gateway.remote_tasks());
    }

    #[tokio::test]
    async fn test_distinct_ids_mutate_concurrently() {
        let gateway = Arc::new(MockTaskGateway::with_delay(Duration::from_millis(20)));
        gateway.seed(&["first", "second"]);
        let store = store_with(gateway.clone());
        store.load(1).await.unwrap();
        let ids = ids(&store.tasks().await);

        let (first, second) = tokio::join!(
            store.toggle_completion(1, ids[0]),
            store.toggle_completion(1, ids[1]),
        );
        first.unwrap();
        second.unwrap();

        assert_eq!(gateway.max_in_flight_per_id.load(Ordering::Relaxed), 1);
        assert_eq!(gateway.max_in_flight_total.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn test_successful_mutations_converge_with_fresh_load() {
        let gateway = Arc::new(MockTaskGateway::new());
        gateway.seed(&["Pay rent"]);
        let store = store_with(gateway.clone());
        store.load(1).await.unwrap();

        let added = store.add(1, "Buy milk", Some("2%".to_string())).await.unwrap();
        store.toggle_completion(1, added.id).await.unwrap();
        store.update(1, added.id, "Buy oat milk", None).await.unwrap();
        let rent = store
            .tasks()
            .await
            .iter()
            .find(|t| t.title == "Pay rent")
            .unwrap()
            .id;
        store.remove(1, rent).await.unwrap();

        let mut local = store.tasks().await;
        let mut remote = gateway.remote_tasks();
        local.sort_by_key(|t| t.id);
        remote.sort_by_key(|t| t.id);
        assert_eq!(local, remote);
    }

    #[tokio::test]
    async fn test_reconcile_partial_merges_by_id() {
        let gateway = Arc::new(MockTaskGateway::new());
        gateway.seed(&["first", "second"]);
        let store = store_with(gateway.clone());
        store.load(1).await.unwrap();
        let mut known = store.tasks().await;

        // A partial source: one updated task, one unknown task.
        let mut updated = known[0].clone();
        updated.title = "first (renamed)".to_string();
        let now = Utc::now();
        let unknown = Task {
            id: 42,
            user_id: 1,
            title: "from elsewhere".to_string(),
            description: None,
            completed: false,
            created_at: now,
            updated_at: now,
        };
        store
            .reconcile(vec![updated.clone(), unknown.clone()], false)
            .await;

        let tasks = store.tasks().await;
        // The untouched task must not be deleted by a partial source.
        assert!(tasks.iter().any(|t| t.id == known[1].id));
        assert!(tasks.iter().any(|t| t.title == "first (renamed)"));
        assert!(tasks.iter().any(|t| t.id == 42));

        // An authoritative snapshot replaces the set wholesale.
        known.truncate(1);
        store.reconcile(known.clone(), true).await;
        assert_eq!(store.tasks().await, known);
    }

    #[tokio::test]
    async fn test_clear_empties_local_set() {
        let gateway = Arc::new(MockTaskGateway::new());
        gateway.seed(&["first"]);
        let store = store_with(gateway.clone());
        store.load(1).await.unwrap();

        store.clear().await;
        assert!(store.tasks().await.is_empty());
    }
}
