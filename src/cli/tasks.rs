use std::fmt::Display;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, ValueEnum};

use crate::{
    tracker::{
        service::TaskService,
        storage::{
            entities::{TaskEntity, TaskType, TaskUpdate},
            kv_store::KeyValueStore,
        },
    },
    utils::time::parse_date_key,
};

use super::{
    output::{print_history, print_metrics, print_metrics_json, print_task_line, print_tasks},
    Args,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct DateArgs {
    #[arg(
        long,
        short,
        help = "Day to work with, today by default. Examples are \"yesterday\", \"2025-03-15\", \"15/03/2025\", \"last friday\""
    )]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

impl DateArgs {
    /// Resolves the date, falling back to `today`.
    pub fn resolve(&self, today: NaiveDate) -> Result<NaiveDate> {
        match &self.date {
            Some(value) => parse_date(value, self.date_style),
            None => Ok(today),
        }
    }
}

/// Accepts `YYYY-MM-DD` and anything chrono-english understands.
pub fn parse_date(value: &str, date_style: DateStyle) -> Result<NaiveDate> {
    if let Ok(date) = parse_date_key(value) {
        return Ok(date);
    }
    parse_date_string(value, Local::now(), date_style.into())
        .map(|v| v.date_naive())
        .map_err(|e| validation_error(format!("Failed to validate date {value:?}: {e}")))
}

pub fn parse_title(value: &str) -> Result<String, String> {
    let title = value.trim();
    if title.is_empty() {
        Err("Title can't be empty".into())
    } else {
        Ok(title.to_string())
    }
}

fn validation_error(message: String) -> anyhow::Error {
    Args::command()
        .error(clap::error::ErrorKind::ValueValidation, message)
        .into()
}

/// Finds the task `id` refers to. Ids can be shortened to any unique prefix.
pub fn resolve_task<'a>(tasks: &'a [TaskEntity], id: &str, date: NaiveDate) -> Result<&'a TaskEntity> {
    if let Some(task) = tasks.iter().find(|t| t.id == id) {
        return Ok(task);
    }
    let mut matching = tasks.iter().filter(|t| t.id.starts_with(id));
    match (matching.next(), matching.next()) {
        (Some(task), None) if !id.is_empty() => Ok(task),
        (Some(_), Some(_)) => Err(validation_error(format!(
            "Id {id:?} matches several tasks on {date}, use a longer prefix"
        ))),
        _ => Err(validation_error(format!("No task matching {id:?} on {date}"))),
    }
}

pub async fn list_tasks<S: KeyValueStore>(service: &TaskService<S>, date: &DateArgs) -> Result<()> {
    let date = date.resolve(service.today())?;
    let tasks = service.get_tasks_for_date(date).await;
    print_tasks(date, &tasks);
    println!();
    print_metrics(&service.get_metrics_for_date(date).await);
    Ok(())
}

pub async fn add_task<S: KeyValueStore>(
    service: &TaskService<S>,
    title: &str,
    kind: TaskType,
    date: &DateArgs,
) -> Result<()> {
    let date = date.resolve(service.today())?;
    let task = service.add_task(title, kind, Some(date)).await;
    print!("Added ");
    print_task_line(&task);
    Ok(())
}

pub async fn toggle_task<S: KeyValueStore>(
    service: &TaskService<S>,
    id: &str,
    date: &DateArgs,
) -> Result<()> {
    let date = date.resolve(service.today())?;
    let tasks = service.get_tasks_for_date(date).await;
    let task = resolve_task(&tasks, id, date)?;
    if service.toggle_task_done_for_date(&task.id, date).await {
        print_task_line(&task.clone().with_done(!task.done));
    }
    Ok(())
}

pub async fn edit_task<S: KeyValueStore>(
    service: &TaskService<S>,
    id: &str,
    update: TaskUpdate,
    date: &DateArgs,
) -> Result<()> {
    if update.is_empty() {
        return Err(validation_error(
            "Nothing to change, pass --title, --type or --done".into(),
        ));
    }
    let date = date.resolve(service.today())?;
    let tasks = service.get_tasks_for_date(date).await;
    let mut task = resolve_task(&tasks, id, date)?.clone();
    if service.update_task_for_date(&task.id, date, &update).await {
        update.apply(&mut task);
        print_task_line(&task);
    }
    Ok(())
}

pub async fn delete_task<S: KeyValueStore>(
    service: &TaskService<S>,
    id: &str,
    date: &DateArgs,
) -> Result<()> {
    let date = date.resolve(service.today())?;
    let tasks = service.get_tasks_for_date(date).await;
    let task = resolve_task(&tasks, id, date)?;
    if service.delete_task_from_date(&task.id, date).await {
        println!("Deleted {}", task.title);
    }
    Ok(())
}

pub async fn clear_tasks<S: KeyValueStore>(service: &TaskService<S>, kind: TaskType) -> Result<()> {
    let removed = service.clear_tasks_by_type(kind).await;
    println!("Removed {removed} {kind} tasks");
    Ok(())
}

pub async fn show_history<S: KeyValueStore>(service: &TaskService<S>) -> Result<()> {
    let mut days = vec![];
    for date in service.get_all_dates().await {
        days.push((date, service.get_metrics_for_date(date).await));
    }
    print_history(&days);
    Ok(())
}

pub async fn show_metrics<S: KeyValueStore>(
    service: &TaskService<S>,
    date: &DateArgs,
    json: bool,
) -> Result<()> {
    let date = date.resolve(service.today())?;
    let metrics = service.get_metrics_for_date(date).await;
    if json {
        print_metrics_json(&metrics)?;
    } else {
        print_metrics(&metrics);
    }
    Ok(())
}

pub async fn forget_date<S: KeyValueStore>(
    service: &TaskService<S>,
    date: &str,
    date_style: DateStyle,
) -> Result<()> {
    let date = parse_date(date, date_style)?;
    if service.clear_history_for_date(date).await {
        println!("Removed {date} from history");
        Ok(())
    } else {
        Err(validation_error(format!("There is no history for {date}")))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::tracker::storage::entities::{TaskEntity, TaskType};

    use super::{parse_date, parse_title, resolve_task, DateStyle};

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();

    fn task(id: &str) -> TaskEntity {
        TaskEntity {
            id: id.into(),
            ..TaskEntity::new(id, TaskType::Signal, TEST_DATE)
        }
    }

    #[test]
    fn resolve_by_unique_prefix() {
        let tasks = [task("abc123"), task("abd456"), task("ab")];

        assert_eq!(resolve_task(&tasks, "abc", TEST_DATE).unwrap().id, "abc123");
        // An exact id wins over longer ids sharing the prefix.
        assert_eq!(resolve_task(&tasks, "ab", TEST_DATE).unwrap().id, "ab");
        assert!(resolve_task(&tasks, "a", TEST_DATE).is_err());
        assert!(resolve_task(&tasks, "zzz", TEST_DATE).is_err());
        assert!(resolve_task(&tasks, "", TEST_DATE).is_err());
    }

    #[test]
    fn parse_iso_and_dialect_dates() {
        assert_eq!(parse_date("2025-03-15", DateStyle::Uk).unwrap(), TEST_DATE);
        assert_eq!(parse_date("15/03/2025", DateStyle::Uk).unwrap(), TEST_DATE);
        assert_eq!(parse_date("03/15/2025", DateStyle::Us).unwrap(), TEST_DATE);
        assert!(parse_date("not a date at all", DateStyle::Uk).is_err());
    }

    #[test]
    fn titles_are_trimmed() {
        assert_eq!(parse_title("  focus  ").unwrap(), "focus");
        assert!(parse_title("   ").is_err());
    }
}
