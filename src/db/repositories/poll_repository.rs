use crate::db::connection::DbPool;
use crate::db::models::{Choice, Poll, PollSummary};
use crate::db::transaction::in_transaction;
use crate::error::PollError;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

/// Creates a poll and all of its choices in one transaction.
///
/// Choices come back in the same order as `choice_texts`. An empty choice list is
/// rejected before any connection is taken from the pool.
pub async fn create_poll<S: AsRef<str>>(
    pool: &DbPool,
    user_id: i64,
    question: &str,
    choice_texts: &[S],
) -> Result<Poll, PollError> {
    if choice_texts.is_empty() {
        return Err(PollError::InvalidRequest(
            "a poll needs at least one choice".to_string(),
        ));
    }

    let question = question.to_string();
    let choice_texts: Vec<String> = choice_texts
        .iter()
        .map(|text| text.as_ref().to_string())
        .collect();

    let poll = in_transaction(pool, move |conn| {
        Box::pin(insert_poll(conn, user_id, question, choice_texts))
    })
    .await?;

    info!(
        "created poll {} with {} choices for user {}",
        poll.id,
        poll.choices.len(),
        poll.user_id
    );
    Ok(poll)
}

async fn insert_poll(
    conn: &mut SqliteConnection,
    user_id: i64,
    question: String,
    choice_texts: Vec<String>,
) -> Result<Poll, PollError> {
    let poll_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO polls (user_id, question, is_closed) VALUES (?, ?, FALSE) RETURNING id",
    )
    .bind(user_id)
    .bind(&question)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(PollError::CreationFailed("poll"))?;

    let choices = insert_choices(conn, poll_id, choice_texts).await?;

    Ok(Poll {
        id: poll_id,
        user_id,
        question,
        is_closed: false,
        choices,
    })
}

async fn insert_choices(
    conn: &mut SqliteConnection,
    poll_id: i64,
    choice_texts: Vec<String>,
) -> Result<Vec<Choice>, PollError> {
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO choices (poll_id, choice_text) ");
    builder.push_values(&choice_texts, |mut row, text| {
        row.push_bind(poll_id).push_bind(text.clone());
    });
    builder.push(" RETURNING id");

    let mut choice_ids: Vec<i64> = builder
        .build_query_scalar::<i64>()
        .fetch_all(&mut *conn)
        .await?;

    if choice_ids.len() != choice_texts.len() {
        return Err(PollError::CreationFailed("choices"));
    }

    // RETURNING order is unspecified; ids of one multi-row insert ascend in VALUES order
    choice_ids.sort_unstable();

    Ok(choice_ids
        .into_iter()
        .zip(choice_texts)
        .map(|(id, choice_text)| Choice {
            id,
            poll_id,
            choice_text,
        })
        .collect())
}

/// Loads a poll and its choices over a single connection.
pub async fn get_poll(pool: &DbPool, poll_id: i64) -> Result<Poll, PollError> {
    let mut conn = pool.acquire().await?;

    let mut poll = sqlx::query_as::<_, Poll>(
        "SELECT id, user_id, question, is_closed FROM polls WHERE id = ?",
    )
    .bind(poll_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(PollError::PollNotFound(poll_id))?;

    poll.choices = sqlx::query_as::<_, Choice>(
        "SELECT id, poll_id, choice_text FROM choices WHERE poll_id = ? ORDER BY id",
    )
    .bind(poll_id)
    .fetch_all(&mut *conn)
    .await?;

    debug!("loaded poll {} with {} choices", poll.id, poll.choices.len());
    Ok(poll)
}

/// Closing is one-way. Closing an already closed poll succeeds; an unknown id is
/// `PollNotFound`.
pub async fn close_poll(pool: &DbPool, poll_id: i64) -> Result<(), PollError> {
    let result = sqlx::query("UPDATE polls SET is_closed = TRUE WHERE id = ?")
        .bind(poll_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(PollError::PollNotFound(poll_id));
    }

    info!("closed poll {}", poll_id);
    Ok(())
}

/// Per-choice response counts. Choices nobody picked are not listed, so a poll
/// without responses yields an empty list.
pub async fn get_poll_summaries(pool: &DbPool, poll_id: i64) -> Result<Vec<PollSummary>, PollError> {
    let summaries = sqlx::query_as::<_, PollSummary>(
        "SELECT question, choice_text, response_count FROM poll_summaries WHERE poll_id = ? ORDER BY choice_id",
    )
    .bind(poll_id)
    .fetch_all(pool)
    .await?;

    Ok(summaries)
}
