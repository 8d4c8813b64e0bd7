//!  Storage is organized through [kv_store::KeyValueStore].
//!  The basic idea is:
//!   - There are three keys: `tasks`, `history` and `last_date`.
//!   - `tasks` and `history` hold JSON documents made of [entities::TaskEntity].
//!   - `last_date` holds the day rollover was last evaluated for.

pub mod entities;
pub mod kv_store;

pub const TASKS_KEY: &str = "tasks";
pub const HISTORY_KEY: &str = "history";
pub const LAST_DATE_KEY: &str = "last_date";
