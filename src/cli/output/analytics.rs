use crate::{
    tracker::analytics::{DayMetrics, ProductivityBreakdown, TimeRange},
    utils::percentage::Percentage,
};

/// Prints per day ratios of the window followed by the averaged productivity breakdown.
pub fn print_analytics(range: TimeRange, days: &[DayMetrics]) {
    println!("Analytics ({range}, last {} days)", range.days());
    if days.iter().all(|d| d.metrics.total == 0) {
        println!("No tasks in this period");
        return;
    }

    println!("date\t\tplanned\tcompletion signal/noise");
    for DayMetrics { date, metrics } in days {
        println!(
            "{date}\t{}\t{} / {}",
            metrics.planned_split(),
            Percentage(metrics.completion_signal_percent),
            Percentage(metrics.completion_noise_percent),
        );
    }

    let breakdown = ProductivityBreakdown::average(days);
    println!(
        "Average productivity: {} signal done, {} noise done, {} incomplete",
        Percentage(breakdown.signal),
        Percentage(breakdown.noise),
        Percentage(breakdown.incomplete),
    );
}
