use crate::db::connection::DbPool;
use crate::db::models::User;
use crate::error::PollError;

/// The password is stored exactly as given.
pub async fn create_user(pool: &DbPool, username: &str, password: &str) -> Result<User, PollError> {
    let user_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (username, password) VALUES (?, ?) RETURNING user_id",
    )
    .bind(username)
    .bind(password)
    .fetch_optional(pool)
    .await?
    .ok_or(PollError::CreationFailed("user"))?;

    info!("created user {} ({})", user_id, username);

    Ok(User {
        id: user_id,
        username: username.to_string(),
        password: password.to_string(),
    })
}

pub async fn get_user_by_id(pool: &DbPool, user_id: i64) -> Result<Option<User>, PollError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT user_id, username, password FROM users WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_username(pool: &DbPool, username: &str) -> Result<Option<User>, PollError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT user_id, username, password FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}
