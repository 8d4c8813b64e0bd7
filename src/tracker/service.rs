use anyhow::Result;
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::utils::{
    clock::Clock,
    time::{date_key, parse_date_key},
};

use super::{
    ratio::{compute, RatioMetrics},
    rollover::{reconcile, DayState, RolloverOutcome},
    storage::{
        entities::{History, TaskEntity, TaskType, TaskUpdate},
        kv_store::KeyValueStore,
        HISTORY_KEY, LAST_DATE_KEY, TASKS_KEY,
    },
};

/// Bridges the host application and [KeyValueStore]. Every public operation first brings the
/// stored state up to the current day, so a day change is noticed by whichever operation runs
/// first after midnight.
///
/// Storage problems never fail an operation. Unreadable values are treated as empty and failed
/// writes are logged.
pub struct TaskService<S: KeyValueStore> {
    store: S,
    clock: Box<dyn Clock>,
}

impl<S: KeyValueStore> TaskService<S> {
    pub fn new(store: S, clock: Box<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Archives the working set if the day changed since the last check.
    pub async fn check_and_reset_for_new_day(&self) -> RolloverOutcome {
        self.reconcile_with(self.today()).await
    }

    /// Tasks of the current day.
    pub async fn get_tasks(&self) -> Vec<TaskEntity> {
        self.sync_day().await;
        self.load_tasks().await
    }

    pub async fn get_tasks_by_type(&self, kind: TaskType) -> Vec<TaskEntity> {
        let mut tasks = self.get_tasks().await;
        tasks.retain(|t| t.kind == kind);
        tasks
    }

    /// Adds a task for today, or for `date` if it's given.
    pub async fn add_task(&self, title: &str, kind: TaskType, date: Option<NaiveDate>) -> TaskEntity {
        let today = self.sync_day().await;
        let date = date.unwrap_or(today);
        let task = TaskEntity::new(title, kind, date);
        let mut tasks = self.tasks_for(date, today).await;
        tasks.push(task.clone());
        self.store_for(date, today, &tasks).await;
        info!("Added {} task {} for {date}", task.kind, task.id);
        task
    }

    pub async fn add_task_to_date(&self, title: &str, kind: TaskType, date: NaiveDate) -> TaskEntity {
        self.add_task(title, kind, Some(date)).await
    }

    pub async fn update_task(&self, id: &str, update: &TaskUpdate) -> bool {
        self.edit_task(id, None, |task| update.apply(task)).await
    }

    /// Returns `false` if there is no task with `id` on `date`.
    pub async fn update_task_for_date(&self, id: &str, date: NaiveDate, update: &TaskUpdate) -> bool {
        self.edit_task(id, Some(date), |task| update.apply(task)).await
    }

    pub async fn toggle_task_done(&self, id: &str) -> bool {
        self.edit_task(id, None, |task| task.done = !task.done).await
    }

    pub async fn toggle_task_done_for_date(&self, id: &str, date: NaiveDate) -> bool {
        self.edit_task(id, Some(date), |task| task.done = !task.done).await
    }

    pub async fn delete_task(&self, id: &str) -> bool {
        self.remove_task(id, None).await
    }

    pub async fn delete_task_from_date(&self, id: &str, date: NaiveDate) -> bool {
        self.remove_task(id, Some(date)).await
    }

    pub async fn clear_all_tasks(&self) {
        self.sync_day().await;
        self.save_tasks(&[]).await;
    }

    /// Removes every task of `kind` from the current day. Returns how many were removed.
    pub async fn clear_tasks_by_type(&self, kind: TaskType) -> usize {
        let mut tasks = self.get_tasks().await;
        let before = tasks.len();
        tasks.retain(|t| t.kind != kind);
        let removed = before - tasks.len();
        if removed > 0 {
            self.save_tasks(&tasks).await;
        }
        info!("Cleared {removed} {kind} tasks");
        removed
    }

    pub async fn get_history(&self) -> History {
        self.sync_day().await;
        self.load_history().await
    }

    pub async fn get_tasks_for_date(&self, date: NaiveDate) -> Vec<TaskEntity> {
        let today = self.sync_day().await;
        self.tasks_for(date, today).await
    }

    /// Replaces the list of `date`. Today's list is the working set, any other date lives in
    /// history.
    pub async fn save_tasks_for_date(&self, date: NaiveDate, tasks: &[TaskEntity]) {
        let today = self.sync_day().await;
        self.store_for(date, today, tasks).await;
    }

    /// Removes a whole day from history. Returns `false` if there was no such day.
    pub async fn clear_history_for_date(&self, date: NaiveDate) -> bool {
        self.sync_day().await;
        let mut history = self.load_history().await;
        if history.remove(&date).is_none() {
            return false;
        }
        self.save_history(&history).await;
        info!("Removed {date} from history");
        true
    }

    /// Every day that has tasks, newest first. Today is included only if it has tasks.
    pub async fn get_all_dates(&self) -> Vec<NaiveDate> {
        let today = self.sync_day().await;
        let mut dates = self.load_history().await.into_keys().collect::<Vec<_>>();
        if !self.load_tasks().await.is_empty() && !dates.contains(&today) {
            dates.push(today);
        }
        dates.sort_by(|a, b| b.cmp(a));
        dates
    }

    pub async fn get_current_day_metrics(&self) -> RatioMetrics {
        compute(&self.get_tasks().await)
    }

    pub async fn get_metrics_for_date(&self, date: NaiveDate) -> RatioMetrics {
        compute(&self.get_tasks_for_date(date).await)
    }

    /// Reads the date once and reconciles against it. Operations use the returned date for the
    /// rest of their work, so a midnight in between can't split them across two days.
    async fn sync_day(&self) -> NaiveDate {
        let today = self.today();
        self.reconcile_with(today).await;
        today
    }

    #[instrument(skip(self))]
    async fn reconcile_with(&self, today: NaiveDate) -> RolloverOutcome {
        let state = DayState {
            tasks: self.load_tasks().await,
            history: self.load_history().await,
            last_date: self.load_last_date().await,
        };

        let (state, outcome) = reconcile(state, today);

        if outcome.archived() {
            // History goes first. Failing in between duplicates tasks instead of losing them.
            self.save_history(&state.history).await;
        }
        if outcome.day_changed() {
            // Also written when nothing was archived: a failed read may have hidden the old list.
            self.save_tasks(&state.tasks).await;
        }
        if outcome.last_date_changed() {
            self.save_last_date(today).await;
        }

        match outcome {
            RolloverOutcome::Archived { date, count } => {
                info!("New day {today}. Archived {count} tasks of {date}")
            }
            RolloverOutcome::Cleared { date } => {
                info!("New day {today}. Nothing to archive for {date}")
            }
            RolloverOutcome::FirstRun => info!("First run, starting with {today}"),
            RolloverOutcome::SameDay => debug!("Still {today}"),
        }
        outcome
    }

    async fn edit_task(
        &self,
        id: &str,
        date: Option<NaiveDate>,
        edit: impl FnOnce(&mut TaskEntity),
    ) -> bool {
        let today = self.sync_day().await;
        let date = date.unwrap_or(today);
        let mut tasks = self.tasks_for(date, today).await;
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            warn!("No task {id} on {date}");
            return false;
        };
        edit(task);
        debug!("Edited task {:?}", task);
        self.store_for(date, today, &tasks).await;
        true
    }

    async fn remove_task(&self, id: &str, date: Option<NaiveDate>) -> bool {
        let today = self.sync_day().await;
        let date = date.unwrap_or(today);
        let mut tasks = self.tasks_for(date, today).await;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            warn!("No task {id} on {date} to delete");
            return false;
        }
        self.store_for(date, today, &tasks).await;
        info!("Deleted task {id} of {date}");
        true
    }

    async fn tasks_for(&self, date: NaiveDate, today: NaiveDate) -> Vec<TaskEntity> {
        if date == today {
            self.load_tasks().await
        } else {
            self.load_history().await.remove(&date).unwrap_or_default()
        }
    }

    async fn store_for(&self, date: NaiveDate, today: NaiveDate, tasks: &[TaskEntity]) {
        if date == today {
            self.save_tasks(tasks).await;
        } else {
            let mut history = self.load_history().await;
            history.insert(date, tasks.to_vec());
            self.save_history(&history).await;
        }
    }

    async fn load_tasks(&self) -> Vec<TaskEntity> {
        self.load_json(TASKS_KEY).await
    }

    async fn save_tasks(&self, tasks: &[TaskEntity]) {
        self.save_json(TASKS_KEY, tasks).await
    }

    async fn load_history(&self) -> History {
        self.load_json(HISTORY_KEY).await
    }

    async fn save_history(&self, history: &History) {
        self.save_json(HISTORY_KEY, history).await
    }

    async fn load_last_date(&self) -> Option<NaiveDate> {
        match self.store.get(LAST_DATE_KEY).await {
            Ok(Some(value)) => parse_date_key(&value)
                .inspect_err(|e| warn!("Ignoring stored last date: {e}"))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                error!("Error getting last date {e:?}");
                None
            }
        }
    }

    async fn save_last_date(&self, date: NaiveDate) {
        if let Err(e) = self.store.set(LAST_DATE_KEY, &date_key(date)).await {
            error!("Error saving last date {e:?}");
        }
    }

    async fn load_json<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let value = match self.store.get(key).await {
            Ok(Some(value)) => value,
            Ok(None) => return T::default(),
            Err(e) => {
                error!("Error getting {key} {e:?}");
                return T::default();
            }
        };
        serde_json::from_str(&value).unwrap_or_else(|e| {
            // No repair is attempted. The next successful write replaces the value.
            warn!("Stored {key} is not valid json, treating it as empty: {e}");
            T::default()
        })
    }

    async fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let result: Result<()> = async {
            let json = serde_json::to_string(value)?;
            self.store.set(key, &json).await
        }
        .await;
        if let Err(e) = result {
            error!("Error saving {key} {e:?}");
        }
    }
}
