use thiserror::Error;

#[derive(Error, Debug)]
pub enum PollError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Poll not found with id: {0}")]
    PollNotFound(i64),
    #[error("Poll {0} is closed")]
    PollClosed(i64),
    #[error("Choice {choice_id} does not exist for poll {poll_id}")]
    ChoiceNotInPoll { poll_id: i64, choice_id: i64 },
    #[error("Failed to create {0}")]
    CreationFailed(&'static str),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,
    #[error("Pool size must be at least 1")]
    InvalidPoolSize,
}
