pub mod output;
pub mod tasks;

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tasks::{DateArgs, DateStyle};
use tracing::level_filters::LevelFilter;

use crate::{
    tracker::{
        analytics::{load_window, TimeRange},
        service::TaskService,
        storage::{
            entities::{TaskType, TaskUpdate},
            kv_store::FileKeyValueStore,
        },
    },
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, CLI_PREFIX, WATCH_PREFIX},
    },
    watch::{start_watch, DEFAULT_CHECK_INTERVAL},
};

#[derive(Parser, Debug)]
#[command(name = "signalnoise", version, long_about = None)]
#[command(about = "Daily task tracker that separates signal from noise", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Enable logging to console")]
    log: bool,
    #[arg(long = "log-filter", global = true, help = "Level of logs written into log files")]
    log_filter: Option<LevelFilter>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Show tasks of a day with its ratios")]
    List {
        #[command(flatten)]
        date: DateArgs,
    },
    #[command(about = "Add a task")]
    Add {
        #[arg(value_parser = tasks::parse_title)]
        title: String,
        #[arg(short = 't', long = "type", help = "Signal for high value work, noise for the rest")]
        kind: TaskType,
        #[command(flatten)]
        date: DateArgs,
    },
    #[command(about = "Mark a task as done or not done")]
    Toggle {
        #[arg(help = "Task id or its unique prefix")]
        id: String,
        #[command(flatten)]
        date: DateArgs,
    },
    #[command(about = "Change title, type or state of a task")]
    Edit {
        #[arg(help = "Task id or its unique prefix")]
        id: String,
        #[arg(long, value_parser = tasks::parse_title)]
        title: Option<String>,
        #[arg(short = 't', long = "type")]
        kind: Option<TaskType>,
        #[arg(long)]
        done: Option<bool>,
        #[command(flatten)]
        date: DateArgs,
    },
    #[command(about = "Delete a task")]
    Delete {
        #[arg(help = "Task id or its unique prefix")]
        id: String,
        #[command(flatten)]
        date: DateArgs,
    },
    #[command(about = "Remove all tasks of a type from today")]
    Clear {
        #[arg(short = 't', long = "type")]
        kind: TaskType,
    },
    #[command(about = "List every day with tasks, newest first")]
    History {},
    #[command(about = "Show ratios of a day")]
    Metrics {
        #[command(flatten)]
        date: DateArgs,
        #[arg(long, help = "Print metrics as json")]
        json: bool,
    },
    #[command(about = "Remove a day from history")]
    Forget {
        date: String,
        #[arg(long, default_value_t = DateStyle::Uk)]
        date_style: DateStyle,
    },
    #[command(about = "Show ratios over a range of days")]
    Analytics {
        #[arg(long, default_value_t = TimeRange::Daily)]
        range: TimeRange,
    },
    #[command(about = "Keep running and archive tasks as soon as the day changes")]
    Watch {
        #[arg(long, default_value_t = DEFAULT_CHECK_INTERVAL.as_secs() / 60, value_parser = clap::value_parser!(u64).range(1..))]
        interval_minutes: u64,
    },
}

impl Args {
    /// `--log-filter` wins, `--log` alone means everything.
    fn logging_level(&self) -> Option<LevelFilter> {
        self.log_filter.or(self.log.then_some(LevelFilter::TRACE))
    }
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();
    let logging_level = args.logging_level();

    let app_dir = args
        .dir
        .map_or_else(create_application_default_path, ensure_dir)?;

    let prefix = match args.commands {
        Commands::Watch { .. } => WATCH_PREFIX,
        _ => CLI_PREFIX,
    };
    enable_logging(prefix, &app_dir.join("logs"), logging_level, args.log)?;

    let store_dir = app_dir.join("store");
    let service = create_service(store_dir.clone())?;
    match args.commands {
        Commands::List { date } => tasks::list_tasks(&service, &date).await,
        Commands::Add { title, kind, date } => tasks::add_task(&service, &title, kind, &date).await,
        Commands::Toggle { id, date } => tasks::toggle_task(&service, &id, &date).await,
        Commands::Edit {
            id,
            title,
            kind,
            done,
            date,
        } => {
            let update = TaskUpdate { title, kind, done };
            tasks::edit_task(&service, &id, update, &date).await
        }
        Commands::Delete { id, date } => tasks::delete_task(&service, &id, &date).await,
        Commands::Clear { kind } => tasks::clear_tasks(&service, kind).await,
        Commands::History {} => tasks::show_history(&service).await,
        Commands::Metrics { date, json } => tasks::show_metrics(&service, &date, json).await,
        Commands::Forget { date, date_style } => {
            tasks::forget_date(&service, &date, date_style).await
        }
        Commands::Analytics { range } => {
            let days = load_window(&service, range).await;
            output::analytics::print_analytics(range, &days);
            Ok(())
        }
        Commands::Watch { interval_minutes } => {
            start_watch(store_dir, Duration::from_secs(interval_minutes * 60)).await
        }
    }
}

fn create_service(store_dir: PathBuf) -> Result<TaskService<FileKeyValueStore>> {
    let store = FileKeyValueStore::new(store_dir)?;
    Ok(TaskService::new(store, Box::new(DefaultClock)))
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use tracing::level_filters::LevelFilter;

    use crate::tracker::storage::entities::TaskType;

    use super::{Args, Commands};

    #[test]
    fn verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn parse_add_command() {
        let args = Args::try_parse_from([
            "signalnoise",
            "add",
            "  write the design doc ",
            "--type",
            "signal",
            "--date",
            "yesterday",
        ])
        .unwrap();
        match args.commands {
            Commands::Add { title, kind, .. } => {
                assert_eq!(title, "write the design doc");
                assert_eq!(kind, TaskType::Signal);
            }
            other => panic!("Unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_empty_titles_and_zero_interval() {
        assert!(Args::try_parse_from(["signalnoise", "add", "  ", "-t", "noise"]).is_err());
        assert!(
            Args::try_parse_from(["signalnoise", "watch", "--interval-minutes", "0"]).is_err()
        );
    }

    #[test]
    fn log_filter_overrides_log_flag() {
        let args =
            Args::try_parse_from(["signalnoise", "--log", "--log-filter", "warn", "history"]).unwrap();
        assert_eq!(args.logging_level(), Some(LevelFilter::WARN));

        let args = Args::try_parse_from(["signalnoise", "history", "--log"]).unwrap();
        assert_eq!(args.logging_level(), Some(LevelFilter::TRACE));

        let args = Args::try_parse_from(["signalnoise", "history"]).unwrap();
        assert_eq!(args.logging_level(), None);
    }
}
