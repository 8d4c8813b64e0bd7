//! Signal to noise ratio metrics of a day.
//!
//! Three ratios are derived from a list of tasks:
//!  - planned: how the day was planned, share of each type among all tasks.
//!  - completion: how much of each type got done, relative to that type.
//!  - effective: what got done relative to everything that was planned.
//!
//! Each ratio is judged against the 80:20 goal and gets a textual [Warning].

use serde::{Serialize, Serializer};

use crate::utils::percentage::{percent_of, Percentage, Split};

use super::storage::entities::{TaskEntity, TaskType};

pub const NO_TASKS_MESSAGE: &str = "No tasks yet. Start adding tasks to track your productivity!";

/// Planned signal share below this means too much noise was planned.
const PLANNED_SIGNAL_MIN: f64 = 70.;
/// Planned signal share above this is flagged as unusually signal heavy.
const PLANNED_SIGNAL_MAX: f64 = 90.;
/// How far noise completion may run ahead of signal completion before it's an alert.
const COMPLETION_NOISE_TOLERANCE: f64 = 15.;
const EFFECTIVE_GOOD: f64 = 70.;
const EFFECTIVE_EXCELLENT: f64 = 85.;
const SUMMARY_EXCELLENT: f64 = 75.;
const SUMMARY_GOOD: f64 = 60.;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningTier {
    Alert,
    Info,
    Success,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Warning {
    pub tier: WarningTier,
    pub message: String,
}

impl Warning {
    fn alert(message: String) -> Self {
        Self {
            tier: WarningTier::Alert,
            message,
        }
    }

    fn info(message: String) -> Self {
        Self {
            tier: WarningTier::Info,
            message,
        }
    }

    fn success(message: String) -> Self {
        Self {
            tier: WarningTier::Success,
            message,
        }
    }
}

/// Derived metrics of a list of tasks. Never persisted, recomputed on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatioMetrics {
    pub signal_total: usize,
    pub noise_total: usize,
    pub total: usize,
    pub signal_done: usize,
    pub noise_done: usize,

    pub planned_signal_percent: f64,
    pub planned_noise_percent: f64,

    /// 0 when there are no signal tasks.
    pub completion_signal_percent: f64,
    /// 0 when there are no noise tasks.
    pub completion_noise_percent: f64,

    /// Both effective values are relative to `total`, so they don't have to add up to 100.
    pub effective_signal_percent: f64,
    pub effective_noise_percent: f64,

    #[serde(serialize_with = "warning_text")]
    pub planned_ratio_warning: Option<Warning>,
    #[serde(serialize_with = "warning_text")]
    pub completion_warning: Option<Warning>,
    #[serde(serialize_with = "warning_text")]
    pub effective_ratio_warning: Option<Warning>,
    pub summary_message: String,
}

fn warning_text<S>(warning: &Option<Warning>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(warning.as_ref().map_or("", |w| w.message.as_str()))
}

impl RatioMetrics {
    fn empty(signal_total: usize, noise_total: usize, signal_done: usize, noise_done: usize) -> Self {
        Self {
            signal_total,
            noise_total,
            total: signal_total + noise_total,
            signal_done,
            noise_done,
            planned_signal_percent: 0.,
            planned_noise_percent: 0.,
            completion_signal_percent: 0.,
            completion_noise_percent: 0.,
            effective_signal_percent: 0.,
            effective_noise_percent: 0.,
            planned_ratio_warning: None,
            completion_warning: None,
            effective_ratio_warning: None,
            summary_message: String::new(),
        }
    }

    pub fn total_done(&self) -> usize {
        self.signal_done + self.noise_done
    }

    pub fn planned_split(&self) -> Split {
        Split::new(self.planned_signal_percent, self.planned_noise_percent)
    }

    /// Split of the work that actually got done. `None` until something is checked off.
    pub fn executed_split(&self) -> Option<Split> {
        let done = self.total_done();
        (done > 0).then(|| {
            Split::new(
                percent_of(self.signal_done, done),
                percent_of(self.noise_done, done),
            )
        })
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Warning> {
        [
            &self.planned_ratio_warning,
            &self.completion_warning,
            &self.effective_ratio_warning,
        ]
        .into_iter()
        .flatten()
    }
}

/// Computes [RatioMetrics] for a list of tasks.
pub fn compute(tasks: &[TaskEntity]) -> RatioMetrics {
    let count = |kind: TaskType, done_only: bool| {
        tasks
            .iter()
            .filter(|t| t.kind == kind && (!done_only || t.done))
            .count()
    };

    let mut metrics = RatioMetrics::empty(
        count(TaskType::Signal, false),
        count(TaskType::Noise, false),
        count(TaskType::Signal, true),
        count(TaskType::Noise, true),
    );

    if metrics.total == 0 {
        metrics.summary_message = NO_TASKS_MESSAGE.into();
        return metrics;
    }

    metrics.planned_signal_percent = percent_of(metrics.signal_total, metrics.total);
    metrics.planned_noise_percent = percent_of(metrics.noise_total, metrics.total);
    metrics.planned_ratio_warning = Some(planned_warning(metrics.planned_split()));

    metrics.completion_signal_percent = percent_of(metrics.signal_done, metrics.signal_total);
    metrics.completion_noise_percent = percent_of(metrics.noise_done, metrics.noise_total);
    if metrics.signal_total > 0 && metrics.noise_total > 0 {
        metrics.completion_warning = completion_warning(
            metrics.completion_signal_percent,
            metrics.completion_noise_percent,
        );
    }

    metrics.effective_signal_percent = percent_of(metrics.signal_done, metrics.total);
    metrics.effective_noise_percent = percent_of(metrics.noise_done, metrics.total);
    metrics.effective_ratio_warning = metrics.executed_split().map(effective_warning);

    metrics.summary_message = summary_message(&metrics);
    metrics
}

fn planned_warning(planned: Split) -> Warning {
    if planned.signal < PLANNED_SIGNAL_MIN {
        Warning::alert(format!(
            "⚠️ Planned too much noise ({planned}). Goal is 80:20."
        ))
    } else if planned.signal > PLANNED_SIGNAL_MAX {
        Warning::info(format!(
            "ℹ️ Very signal-focused ({planned}). Some noise tasks are normal."
        ))
    } else {
        Warning::success(format!("✅ Good balance ({planned}). Close to 80:20 goal."))
    }
}

/// No warning when noise completion is ahead of signal completion by at most the tolerance, or
/// when both are equal.
fn completion_warning(signal: f64, noise: f64) -> Option<Warning> {
    if noise > signal + COMPLETION_NOISE_TOLERANCE {
        Some(Warning::alert(format!(
            "⚠️ Completing more noise ({}) than signal ({}).",
            Percentage(noise),
            Percentage(signal)
        )))
    } else if signal > noise {
        Some(Warning::success(format!(
            "✅ Good focus! Signal completion ({}) ahead of noise ({}).",
            Percentage(signal),
            Percentage(noise)
        )))
    } else {
        None
    }
}

fn effective_warning(executed: Split) -> Warning {
    if executed.signal < EFFECTIVE_GOOD {
        Warning::alert(format!("⚠️ Actual work split was {executed}, not 80:20."))
    } else if executed.signal < EFFECTIVE_EXCELLENT {
        Warning::success(format!(
            "✅ Good effective ratio ({executed}). Close to 80:20 goal!"
        ))
    } else {
        Warning::success(format!("✅ Excellent! Effective ratio is {executed}."))
    }
}

fn summary_message(metrics: &RatioMetrics) -> String {
    let planned = metrics.planned_split();
    let Some(executed) = metrics.executed_split() else {
        return format!(
            "You have {} tasks planned ({} Signal, {} Noise). Start checking them off!",
            metrics.total,
            Percentage(planned.signal),
            Percentage(planned.noise)
        );
    };

    if executed.signal >= SUMMARY_EXCELLENT {
        format!("🎉 Excellent work! You planned {planned} and executed {executed}. Keep it up!")
    } else if executed.signal >= SUMMARY_GOOD {
        format!(
            "👍 Good progress! You planned {planned} and executed {executed}. Try to focus more on Signal tasks."
        )
    } else {
        format!(
            "💡 You planned {planned}, but executed {executed}. Try shifting focus to Signal tasks tomorrow."
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::tracker::storage::entities::{TaskEntity, TaskType};

    use super::{compute, WarningTier, NO_TASKS_MESSAGE};

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();

    fn tasks(kind: TaskType, total: usize, done: usize) -> Vec<TaskEntity> {
        (0..total)
            .map(|i| TaskEntity::new(&format!("{kind} {i}"), kind, TEST_DATE).with_done(i < done))
            .collect()
    }

    fn day(signal: (usize, usize), noise: (usize, usize)) -> Vec<TaskEntity> {
        let mut all = tasks(TaskType::Signal, signal.0, signal.1);
        all.extend(tasks(TaskType::Noise, noise.0, noise.1));
        all
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn empty_list_has_zero_metrics() {
        let metrics = compute(&[]);

        assert_eq!(metrics.total, 0);
        assert_eq!(metrics.planned_signal_percent, 0.);
        assert_eq!(metrics.planned_noise_percent, 0.);
        assert_eq!(metrics.completion_signal_percent, 0.);
        assert_eq!(metrics.effective_noise_percent, 0.);
        assert_eq!(metrics.warnings().count(), 0);
        assert_eq!(metrics.summary_message, NO_TASKS_MESSAGE);
    }

    #[test]
    fn planned_percentages_add_up() {
        for (signal, noise) in [(1, 0), (0, 1), (1, 2), (3, 4), (7, 3), (2, 9), (5, 5)] {
            let metrics = compute(&day((signal, 0), (noise, 0)));
            assert_close(
                metrics.planned_signal_percent + metrics.planned_noise_percent,
                100.,
            );
        }
    }

    #[test]
    fn only_signal_tasks() {
        let metrics = compute(&day((10, 8), (0, 0)));

        assert_close(metrics.planned_signal_percent, 100.);
        assert_close(metrics.completion_signal_percent, 80.);
        assert_eq!(metrics.completion_noise_percent, 0.);
        assert_close(metrics.effective_signal_percent, 80.);
        assert_eq!(metrics.completion_warning, None);

        let planned = metrics.planned_ratio_warning.as_ref().unwrap();
        assert_eq!(planned.tier, WarningTier::Info);
        assert_eq!(
            planned.message,
            "ℹ️ Very signal-focused (100:0). Some noise tasks are normal."
        );

        let effective = metrics.effective_ratio_warning.as_ref().unwrap();
        assert_eq!(effective.tier, WarningTier::Success);
        assert_eq!(effective.message, "✅ Excellent! Effective ratio is 100:0.");
    }

    #[test]
    fn only_noise_tasks_has_no_signal_completion() {
        let metrics = compute(&day((0, 0), (4, 1)));

        assert_eq!(metrics.completion_signal_percent, 0.);
        assert_close(metrics.completion_noise_percent, 25.);
        assert_eq!(metrics.completion_warning, None);
        assert_eq!(
            metrics.planned_ratio_warning.unwrap().message,
            "⚠️ Planned too much noise (0:100). Goal is 80:20."
        );
        assert_eq!(
            metrics.effective_ratio_warning.unwrap().message,
            "⚠️ Actual work split was 0:100, not 80:20."
        );
        assert_eq!(
            metrics.summary_message,
            "💡 You planned 0:100, but executed 0:100. Try shifting focus to Signal tasks tomorrow."
        );
    }

    #[test]
    fn mixed_day() {
        let metrics = compute(&day((8, 6), (2, 2)));

        assert_eq!(metrics.total, 10);
        assert_close(metrics.planned_signal_percent, 80.);
        assert_close(metrics.completion_signal_percent, 75.);
        assert_close(metrics.completion_noise_percent, 100.);
        assert_close(metrics.effective_signal_percent, 60.);
        assert_close(metrics.effective_noise_percent, 20.);

        let planned = metrics.planned_ratio_warning.as_ref().unwrap();
        assert_eq!(planned.tier, WarningTier::Success);
        assert_eq!(planned.message, "✅ Good balance (80:20). Close to 80:20 goal.");

        let completion = metrics.completion_warning.as_ref().unwrap();
        assert_eq!(completion.tier, WarningTier::Alert);
        assert_eq!(
            completion.message,
            "⚠️ Completing more noise (100%) than signal (75%)."
        );

        assert_eq!(
            metrics.effective_ratio_warning.as_ref().unwrap().message,
            "✅ Good effective ratio (75:25). Close to 80:20 goal!"
        );
        assert_eq!(
            metrics.summary_message,
            "🎉 Excellent work! You planned 80:20 and executed 75:25. Keep it up!"
        );
    }

    #[test]
    fn planned_thresholds_are_inclusive_for_good_balance() {
        let tier = |signal, noise| {
            compute(&day((signal, 0), (noise, 0)))
                .planned_ratio_warning
                .unwrap()
                .tier
        };
        assert_eq!(tier(7, 3), WarningTier::Success);
        assert_eq!(tier(9, 1), WarningTier::Success);
        assert_eq!(tier(6, 4), WarningTier::Alert);
        assert_eq!(tier(19, 1), WarningTier::Info);
    }

    #[test]
    fn completion_gap_has_no_warning() {
        // Noise ahead by 10 points: not enough for an alert, not a success either.
        let metrics = compute(&day((10, 5), (10, 6)));
        assert_eq!(metrics.completion_warning, None);

        let equal = compute(&day((4, 2), (2, 1)));
        assert_eq!(equal.completion_warning, None);
    }

    #[test]
    fn completion_gap_upper_bound_has_no_warning() {
        // 85% signal against 100% noise is exactly the tolerance.
        let metrics = compute(&day((20, 17), (2, 2)));
        assert_close(metrics.completion_signal_percent, 85.);
        assert_close(metrics.completion_noise_percent, 100.);
        assert_eq!(metrics.completion_warning, None);

        // One more open signal task tips it over.
        let metrics = compute(&day((20, 16), (2, 2)));
        assert_eq!(
            metrics.completion_warning.unwrap().tier,
            WarningTier::Alert
        );
    }

    #[test]
    fn effective_tier_boundaries() {
        let good = compute(&day((7, 7), (3, 3)));
        assert_eq!(
            good.effective_ratio_warning.unwrap().message,
            "✅ Good effective ratio (70:30). Close to 80:20 goal!"
        );

        let excellent = compute(&day((17, 17), (3, 3)));
        assert_eq!(
            excellent.effective_ratio_warning.unwrap().message,
            "✅ Excellent! Effective ratio is 85:15."
        );

        let below = compute(&day((13, 13), (7, 7)));
        assert_eq!(
            below.effective_ratio_warning.unwrap().message,
            "⚠️ Actual work split was 65:35, not 80:20."
        );
    }

    #[test]
    fn summary_tier_boundaries() {
        let good = compute(&day((3, 3), (2, 2)));
        assert_eq!(
            good.summary_message,
            "👍 Good progress! You planned 60:40 and executed 60:40. Try to focus more on Signal tasks."
        );

        let excellent = compute(&day((3, 3), (1, 1)));
        assert!(
            excellent.summary_message.starts_with("🎉 Excellent work!"),
            "{}",
            excellent.summary_message
        );
    }

    #[test]
    fn completion_success_when_signal_ahead() {
        let metrics = compute(&day((4, 3), (2, 1)));
        let warning = metrics.completion_warning.unwrap();
        assert_eq!(warning.tier, WarningTier::Success);
        assert_eq!(
            warning.message,
            "✅ Good focus! Signal completion (75%) ahead of noise (50%)."
        );
    }

    #[test]
    fn nothing_done_yet() {
        let metrics = compute(&day((3, 0), (1, 0)));

        assert_eq!(metrics.effective_ratio_warning, None);
        assert_eq!(metrics.effective_signal_percent, 0.);
        assert_eq!(
            metrics.summary_message,
            "You have 4 tasks planned (75% Signal, 25% Noise). Start checking them off!"
        );
    }

    #[test]
    fn summary_tiers() {
        let good = compute(&day((7, 2), (3, 1)));
        assert!(
            good.summary_message.starts_with("👍 Good progress!"),
            "{}",
            good.summary_message
        );

        let low = compute(&day((5, 1), (5, 1)));
        assert_eq!(
            low.summary_message,
            "💡 You planned 50:50, but executed 50:50. Try shifting focus to Signal tasks tomorrow."
        );
    }

    #[test]
    fn display_rounding_goes_half_up() {
        // 5 of 8 is 62.5% planned signal.
        let metrics = compute(&day((5, 0), (3, 0)));
        assert_close(metrics.planned_signal_percent, 62.5);
        assert_eq!(
            metrics.planned_ratio_warning.unwrap().message,
            "⚠️ Planned too much noise (63:38). Goal is 80:20."
        );
    }

    #[test]
    fn compute_is_deterministic() {
        let tasks = day((8, 6), (2, 2));
        assert_eq!(compute(&tasks), compute(&tasks));
    }

    #[test]
    fn json_uses_camel_case_and_empty_warnings() -> anyhow::Result<()> {
        let value = serde_json::to_value(compute(&day((1, 0), (0, 0))))?;
        assert_eq!(value["signalTotal"], 1);
        assert_eq!(value["completionWarning"], "");
        assert_eq!(
            value["summaryMessage"],
            "You have 1 tasks planned (100% Signal, 0% Noise). Start checking them off!"
        );
        Ok(())
    }
}
