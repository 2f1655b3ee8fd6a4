//! Data access for polls: users, polls with their choices, responses and
//! per-choice summaries, stored in SQLite through `sqlx`.

#[macro_use]
extern crate tracing;

pub mod config;
pub mod db;
pub mod error;

pub use config::DatabaseConfig;
pub use error::{ConfigError, PollError};
