pub mod analytics;

use ansi_term::{Colour, Style};
use anyhow::Result;
use chrono::NaiveDate;

use crate::{
    tracker::{
        ratio::{RatioMetrics, Warning, WarningTier},
        storage::entities::{TaskEntity, TaskType},
    },
    utils::percentage::Percentage,
};

/// Number of id characters shown. Commands accept any unique prefix.
const SHORT_ID_LEN: usize = 8;

pub fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

fn tier_style(tier: WarningTier) -> Style {
    match tier {
        WarningTier::Alert => Colour::Red.normal(),
        WarningTier::Info => Colour::Blue.normal(),
        WarningTier::Success => Colour::Green.normal(),
    }
}

fn type_style(kind: TaskType) -> Style {
    match kind {
        TaskType::Signal => Colour::Green.bold(),
        TaskType::Noise => Colour::Red.bold(),
    }
}

fn format_warning(warning: Option<&Warning>) -> String {
    warning
        .map(|w| tier_style(w.tier).paint(w.message.as_str()).to_string())
        .unwrap_or_default()
}

pub fn print_task_line(task: &TaskEntity) {
    let check = if task.done { "[x]" } else { "[ ]" };
    println!(
        "{check} {}\t{}\t{}",
        short_id(&task.id),
        type_style(task.kind).paint(task.kind.to_string()),
        task.title
    );
}

/// Prints tasks of a day grouped by type, signal first.
pub fn print_tasks(date: NaiveDate, tasks: &[TaskEntity]) {
    println!("{}", Style::new().bold().paint(date.format("%A, %B %-d, %Y").to_string()));
    for kind in [TaskType::Signal, TaskType::Noise] {
        let of_kind = tasks.iter().filter(|t| t.kind == kind).collect::<Vec<_>>();
        let done = of_kind.iter().filter(|t| t.done).count();
        println!(
            "{} ({done}/{})",
            type_style(kind).paint(kind.to_string()),
            of_kind.len()
        );
        for task in of_kind {
            print!("  ");
            print_task_line(task);
        }
    }
}

pub fn print_metrics(metrics: &RatioMetrics) {
    if metrics.total > 0 {
        println!(
            "Planned\t\t{}\t\t{}",
            metrics.planned_split(),
            format_warning(metrics.planned_ratio_warning.as_ref())
        );
        println!(
            "Completion\t{} / {}\t{}",
            Percentage(metrics.completion_signal_percent),
            Percentage(metrics.completion_noise_percent),
            format_warning(metrics.completion_warning.as_ref())
        );
        println!(
            "Effective\t{} / {}\t{}",
            Percentage(metrics.effective_signal_percent),
            Percentage(metrics.effective_noise_percent),
            format_warning(metrics.effective_ratio_warning.as_ref())
        );
    }
    println!("{}", metrics.summary_message);
}

pub fn print_metrics_json(metrics: &RatioMetrics) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(metrics)?);
    Ok(())
}

/// One line per day, newest first.
pub fn print_history(days: &[(NaiveDate, RatioMetrics)]) {
    if days.is_empty() {
        println!("No history yet");
        return;
    }
    for (date, metrics) in days {
        println!(
            "{date}\t{}/{} signal\t{}/{} noise\t{}",
            metrics.signal_done,
            metrics.signal_total,
            metrics.noise_done,
            metrics.noise_total,
            metrics.summary_message
        );
    }
}
