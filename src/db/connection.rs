use crate::config::DatabaseConfig;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::time::Duration;

pub type DbPool = Pool<Sqlite>;

pub async fn init_db(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = SqlitePoolOptions::new().acquire_timeout(config.acquire_timeout());

    // every connection to `:memory:` opens its own empty database, so pin exactly one
    let pool_options = if config.is_in_memory() {
        pool_options
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
    } else {
        pool_options
            .max_connections(config.max_connections)
            .idle_timeout(config.idle_timeout())
            .max_lifetime(config.max_lifetime())
    };

    let pool = pool_options.connect_with(options).await?;
    ensure_schema(&pool).await?;

    info!("database ready at {}", config.url);
    Ok(pool)
}

pub async fn connect_in_memory() -> Result<DbPool, sqlx::Error> {
    init_db(&DatabaseConfig::in_memory()).await
}

pub async fn ensure_schema(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS polls (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(user_id),
            question TEXT NOT NULL,
            is_closed BOOLEAN NOT NULL DEFAULT FALSE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS choices (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            poll_id INTEGER NOT NULL REFERENCES polls(id),
            choice_text TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS responses (
            poll_id INTEGER NOT NULL REFERENCES polls(id),
            choice_id INTEGER NOT NULL REFERENCES choices(id),
            user_id INTEGER NOT NULL REFERENCES users(user_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE VIEW IF NOT EXISTS poll_summaries AS
        SELECT
            p.id AS poll_id,
            c.id AS choice_id,
            p.question AS question,
            c.choice_text AS choice_text,
            COUNT(*) AS response_count
        FROM polls p
        JOIN choices c ON c.poll_id = p.id
        JOIN responses r ON r.poll_id = p.id AND r.choice_id = c.id
        GROUP BY p.id, c.id, p.question, c.choice_text
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_polls_user_id ON polls(user_id)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_choices_poll_id ON choices(poll_id)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_responses_poll_id ON responses(poll_id)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub fn get_pool_stats(pool: &DbPool) -> String {
    let size = pool.size() as usize;
    let num_idle = pool.num_idle();
    format!(
        "Pool stats: size={}, idle={}, in_use={}",
        size,
        num_idle,
        size.saturating_sub(num_idle)
    )
}
