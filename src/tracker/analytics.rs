use std::{collections::BTreeSet, fmt::Display};

use chrono::NaiveDate;
use clap::ValueEnum;
use futures::{stream, StreamExt};

use crate::utils::time::window_start;

use super::{ratio::RatioMetrics, service::TaskService, storage::kv_store::KeyValueStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimeRange {
    /// Last 7 days
    Daily,
    /// Last 4 weeks
    Weekly,
    /// Last 90 days
    Monthly,
}

impl TimeRange {
    pub fn days(&self) -> u32 {
        match self {
            TimeRange::Daily => 7,
            TimeRange::Weekly => 28,
            TimeRange::Monthly => 90,
        }
    }
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeRange::Daily => write!(f, "daily"),
            TimeRange::Weekly => write!(f, "weekly"),
            TimeRange::Monthly => write!(f, "monthly"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayMetrics {
    pub date: NaiveDate,
    pub metrics: RatioMetrics,
}

/// Dates of the trailing window that ends with `today`, oldest first. Days without data are
/// skipped.
pub fn window_dates(
    range: TimeRange,
    today: NaiveDate,
    available: &BTreeSet<NaiveDate>,
) -> Vec<NaiveDate> {
    available
        .range(window_start(today, range.days())..=today)
        .copied()
        .collect()
}

/// Loads metrics of every day in the window of `range`. Days are loaded one after another, store
/// locks block the thread and overlapping calls could wait on each other forever.
pub async fn load_window<S: KeyValueStore>(
    service: &TaskService<S>,
    range: TimeRange,
) -> Vec<DayMetrics> {
    let today = service.today();
    let mut available = service
        .get_history()
        .await
        .into_keys()
        .collect::<BTreeSet<_>>();
    available.insert(today);

    stream::iter(window_dates(range, today, &available))
        .then(|date| async move {
            DayMetrics {
                date,
                metrics: service.get_metrics_for_date(date).await,
            }
        })
        .collect()
        .await
}

/// Average split of planned work over several days: what share ended as done signal, done noise
/// or stayed incomplete.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductivityBreakdown {
    pub signal: f64,
    pub noise: f64,
    pub incomplete: f64,
}

impl ProductivityBreakdown {
    pub fn average(days: &[DayMetrics]) -> Self {
        let count = days.len().max(1) as f64;
        let signal = days
            .iter()
            .map(|d| d.metrics.effective_signal_percent)
            .sum::<f64>()
            / count;
        let noise = days
            .iter()
            .map(|d| d.metrics.effective_noise_percent)
            .sum::<f64>()
            / count;
        Self {
            signal,
            noise,
            incomplete: 100. - signal - noise,
        }
    }
}
