use crate::db::connection::DbPool;
use crate::db::models::Response;
use crate::db::transaction::in_transaction;
use crate::error::PollError;
use sqlx::SqliteConnection;

/// Records a vote after checking, in the same transaction, that the poll exists and is
/// open and that the choice belongs to it.
pub async fn create_response(
    pool: &DbPool,
    poll_id: i64,
    choice_id: i64,
    user_id: i64,
) -> Result<Response, PollError> {
    let response = Response {
        poll_id,
        choice_id,
        user_id,
    };

    in_transaction(pool, move |conn| Box::pin(insert_response(conn, response))).await?;

    debug!(
        "user {} voted for choice {} on poll {}",
        user_id, choice_id, poll_id
    );
    Ok(response)
}

async fn insert_response(conn: &mut SqliteConnection, response: Response) -> Result<(), PollError> {
    let Response {
        poll_id,
        choice_id,
        user_id,
    } = response;

    let is_closed = sqlx::query_scalar::<_, bool>("SELECT is_closed FROM polls WHERE id = ?")
        .bind(poll_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(PollError::PollNotFound(poll_id))?;

    if is_closed {
        warn!("rejected vote by user {} on closed poll {}", user_id, poll_id);
        return Err(PollError::PollClosed(poll_id));
    }

    let choice = sqlx::query_scalar::<_, i64>("SELECT id FROM choices WHERE id = ? AND poll_id = ?")
        .bind(choice_id)
        .bind(poll_id)
        .fetch_optional(&mut *conn)
        .await?;

    if choice.is_none() {
        warn!(
            "rejected vote by user {} for choice {} outside poll {}",
            user_id, choice_id, poll_id
        );
        return Err(PollError::ChoiceNotInPoll { poll_id, choice_id });
    }

    sqlx::query("INSERT INTO responses (poll_id, choice_id, user_id) VALUES (?, ?, ?)")
        .bind(poll_id)
        .bind(choice_id)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

pub async fn has_responded(pool: &DbPool, poll_id: i64, user_id: i64) -> Result<bool, PollError> {
    let row = sqlx::query("SELECT 1 FROM responses WHERE poll_id = ? AND user_id = ? LIMIT 1")
        .bind(poll_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::connect_in_memory;
    use crate::db::models::{Poll, PollSummary};
    use crate::db::repositories::poll_repository::{close_poll, create_poll, get_poll_summaries};
    use crate::db::repositories::user_repository::create_user;

    struct Fixture {
        pool: DbPool,
        voter: i64,
        poll: Poll,
    }

    async fn fixture() -> Fixture {
        let pool = connect_in_memory().await.unwrap();
        let owner = create_user(&pool, "owner", "pw").await.unwrap();
        let voter = create_user(&pool, "voter", "pw").await.unwrap();
        let poll = create_poll(&pool, owner.id, "Pick one", &["A", "B"])
            .await
            .unwrap();
        Fixture {
            pool,
            voter: voter.id,
            poll,
        }
    }

    async fn response_count(pool: &DbPool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM responses")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn records_a_valid_vote() {
        let f = fixture().await;
        let choice_b = f.poll.choices[1].id;

        let response = create_response(&f.pool, f.poll.id, choice_b, f.voter)
            .await
            .unwrap();

        assert_eq!(
            response,
            Response {
                poll_id: f.poll.id,
                choice_id: choice_b,
                user_id: f.voter,
            }
        );
        assert!(has_responded(&f.pool, f.poll.id, f.voter).await.unwrap());
        assert_eq!(
            get_poll_summaries(&f.pool, f.poll.id).await.unwrap(),
            vec![PollSummary {
                question: "Pick one".to_string(),
                choice_text: "B".to_string(),
                response_count: 1,
            }]
        );
    }

    #[tokio::test]
    async fn unknown_poll_is_not_found() {
        let f = fixture().await;

        let err = create_response(&f.pool, 999, f.poll.choices[0].id, f.voter)
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::PollNotFound(999)));
        assert_eq!(response_count(&f.pool).await, 0);
    }

    #[tokio::test]
    async fn closed_poll_rejects_votes() {
        let f = fixture().await;
        close_poll(&f.pool, f.poll.id).await.unwrap();

        let err = create_response(&f.pool, f.poll.id, f.poll.choices[0].id, f.voter)
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::PollClosed(id) if id == f.poll.id));
        assert_eq!(response_count(&f.pool).await, 0);
    }

    #[tokio::test]
    async fn unknown_choice_is_a_mismatch() {
        let f = fixture().await;

        let err = create_response(&f.pool, f.poll.id, 31337, f.voter)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PollError::ChoiceNotInPoll { choice_id: 31337, .. }
        ));
        assert_eq!(response_count(&f.pool).await, 0);
    }

    #[tokio::test]
    async fn unknown_voter_fails_and_inserts_nothing() {
        let f = fixture().await;

        let err = create_response(&f.pool, f.poll.id, f.poll.choices[0].id, 555)
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Database(_)));
        assert_eq!(response_count(&f.pool).await, 0);
    }

    #[tokio::test]
    async fn has_responded_is_false_before_voting() {
        let f = fixture().await;

        assert!(!has_responded(&f.pool, f.poll.id, f.voter).await.unwrap());
    }
}
