//! Daily task tracker that splits work into signal (the few tasks that matter) and noise
//! (everything else). Tasks of a finished day are archived into history, and every day is
//! scored against the 80:20 goal.
//!

pub mod cli;
pub mod tracker;
pub mod utils;
pub mod watch;
