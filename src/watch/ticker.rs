use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, Instrument};

use crate::{
    tracker::{rollover::RolloverOutcome, service::TaskService, storage::kv_store::KeyValueStore},
    utils::clock::Clock,
};

/// Periodically brings the store up to the current day. Covers the case where the day changes
/// while nobody touches the tasks.
pub struct RolloverTicker<S: KeyValueStore> {
    service: TaskService<S>,
    shutdown: CancellationToken,
    check_frequency: Duration,
    time_provider: Box<dyn Clock>,
}

impl<S: KeyValueStore> RolloverTicker<S> {
    pub fn new(
        service: TaskService<S>,
        shutdown: CancellationToken,
        check_frequency: Duration,
        time_provider: Box<dyn Clock>,
    ) -> Self {
        Self {
            service,
            shutdown,
            check_frequency,
            time_provider,
        }
    }

    async fn check(&self) {
        let outcome = self
            .service
            .check_and_reset_for_new_day()
            .instrument(info_span!("Periodic day check"))
            .await;

        if let RolloverOutcome::Archived { date, count } = outcome {
            let metrics = self.service.get_metrics_for_date(date).await;
            info!("Archived {count} tasks of {date}");
            println!("{date}: {}", metrics.summary_message);
        }
    }

    /// Executes the check loop until shutdown is requested. The first check happens right away.
    pub async fn run(self) {
        let mut check_point = self.time_provider.instant();
        loop {
            check_point += self.check_frequency;

            self.check().await;
            debug!("Next day check in {:?}", self.check_frequency);

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    return
                }
                _ = self.time_provider.sleep_until(check_point) => ()
            }
        }
    }
}
