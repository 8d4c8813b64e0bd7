use chrono::NaiveDate;

use super::storage::entities::{History, TaskEntity};

/// Everything rollover needs to know about: the working set of the current day, archived days
/// and the day rollover was last evaluated for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayState {
    pub tasks: Vec<TaskEntity>,
    pub history: History,
    pub last_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloverOutcome {
    /// No date was recorded before. Only the date gets stored.
    FirstRun,
    SameDay,
    /// The previous day had tasks and they were moved into history under `date`.
    Archived { date: NaiveDate, count: usize },
    /// The previous day had no tasks, nothing was archived.
    Cleared { date: NaiveDate },
}

impl RolloverOutcome {
    /// History only changes when something got archived.
    pub fn archived(&self) -> bool {
        matches!(self, Self::Archived { .. })
    }

    /// The recorded day was left behind, the working set has to be stored as empty.
    pub fn day_changed(&self) -> bool {
        matches!(self, Self::Archived { .. } | Self::Cleared { .. })
    }

    pub fn last_date_changed(&self) -> bool {
        !matches!(self, Self::SameDay)
    }
}

/// Brings `state` up to `today`. When the recorded date differs from `today` the working set is
/// archived under the recorded date and cleared. An existing history entry for that date is
/// replaced, not merged.
///
/// Calling this again with the same `today` is a no-op, so it's fine to call it whenever there
/// is a chance that the day has changed.
pub fn reconcile(state: DayState, today: NaiveDate) -> (DayState, RolloverOutcome) {
    let DayState {
        mut tasks,
        mut history,
        last_date,
    } = state;

    let outcome = match last_date {
        None => RolloverOutcome::FirstRun,
        Some(last) if last == today => RolloverOutcome::SameDay,
        Some(last) if tasks.is_empty() => RolloverOutcome::Cleared { date: last },
        Some(last) => {
            let count = tasks.len();
            history.insert(last, std::mem::take(&mut tasks));
            RolloverOutcome::Archived { date: last, count }
        }
    };

    let state = DayState {
        tasks,
        history,
        last_date: Some(today),
    };
    (state, outcome)
}
