//! Foreground watcher. Without a scheduler a day change is only noticed when something touches
//! the tasks, so the watcher checks on a fixed interval until it's interrupted.

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    tracker::{service::TaskService, storage::kv_store::FileKeyValueStore},
    utils::clock::{Clock, DefaultClock},
};

pub mod shutdown;
pub mod ticker;

use ticker::RolloverTicker;

pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(30 * 60);

pub async fn start_watch(store_dir: PathBuf, interval: Duration) -> Result<()> {
    let shutdown_token = CancellationToken::new();

    let ticker = create_ticker(store_dir, interval, &shutdown_token, DefaultClock)?;

    info!("Watching for day changes every {interval:?}");
    tokio::join!(shutdown::detect_shutdown(shutdown_token), ticker.run());

    Ok(())
}

fn create_ticker(
    store_dir: PathBuf,
    interval: Duration,
    shutdown_token: &CancellationToken,
    clock: impl Clock + Clone,
) -> Result<RolloverTicker<FileKeyValueStore>> {
    let store = FileKeyValueStore::new(store_dir)?;
    let service = TaskService::new(store, Box::new(clock.clone()));
    Ok(RolloverTicker::new(
        service,
        shutdown_token.clone(),
        interval,
        Box::new(clock),
    ))
}
