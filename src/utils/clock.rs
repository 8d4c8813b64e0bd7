use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use tokio::time::Instant;

/// Represents an entity responsible for providing dates across application. Rollover decisions
/// are made against [Clock::today], so tests can move days forward without waiting for midnight.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    /// Wall-clock date of the user. Tasks belong to local days, not UTC ones.
    fn today(&self) -> NaiveDate;

    fn instant(&self) -> Instant;

    async fn sleep_until(&self, instant: Instant);
}

#[derive(Clone)]
pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }
}
