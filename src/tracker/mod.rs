//! Core of the tracker: the tasks of a day, rollover of finished days into history and the
//! signal to noise metrics derived from them.
//!
//! [service::TaskService] is the entry point for hosts. It keeps [storage] up to date with the
//! current day through [rollover::reconcile] and computes [ratio::RatioMetrics] on demand.

pub mod analytics;
pub mod ratio;
pub mod rollover;
pub mod service;
pub mod storage;
