use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::repository::AttemptStore;
use crate::error::{Error, Result};
use crate::models::quiz_attempt::{AttemptWithQuiz, QuizAttempt};

#[derive(Clone)]
pub struct PgAttemptStore {
    pool: PgPool,
}

impl PgAttemptStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttemptStore for PgAttemptStore {
    async fn latest(&self, quiz_id: Uuid, user_id: Uuid) -> Result<Option<QuizAttempt>> {
        let attempt = sqlx::query_as::<_, QuizAttempt>(
            r#"
            SELECT * FROM quiz_attempts
            WHERE quiz_id = $1 AND user_id = $2
            ORDER BY started_at DESC
            LIMIT 1
            "#,
        )
        .bind(quiz_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempt)
    }

    async fn insert_active(
        &self,
        quiz_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<QuizAttempt>> {
        // The partial unique index on (quiz_id, user_id) WHERE completed_at
        // IS NULL turns the duplicate-active case into a silent no-op, so a
        // lost race surfaces as None instead of a second active row.
        let attempt = sqlx::query_as::<_, QuizAttempt>(
            r#"
            INSERT INTO quiz_attempts (quiz_id, user_id, started_at, score, created_at, updated_at)
            VALUES ($1, $2, $3, 0, $3, $3)
            ON CONFLICT (quiz_id, user_id) WHERE completed_at IS NULL DO NOTHING
            RETURNING *
            "#,
        )
        .bind(quiz_id)
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attempt)
    }

    async fn set_progress(
        &self,
        attempt_id: Uuid,
        user_id: Uuid,
        last_question_id: Uuid,
        score: i32,
        now: DateTime<Utc>,
    ) -> Result<()> {
        // user_id in the predicate keeps one user's writes off another
        // user's rows; a mismatch reads the same as a missing attempt.
        let result = sqlx::query(
            r#"
            UPDATE quiz_attempts
            SET last_answered_question_id = $3, score = $4, updated_at = $5
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(attempt_id)
        .bind(user_id)
        .bind(last_question_id)
        .bind(score)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Attempt {} not found", attempt_id)));
        }
        Ok(())
    }

    async fn set_completed(
        &self,
        attempt_id: Uuid,
        user_id: Uuid,
        final_score: i32,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE quiz_attempts
            SET completed_at = $3, score = $4, updated_at = $3
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(attempt_id)
        .bind(user_id)
        .bind(now)
        .bind(final_score)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Attempt {} not found", attempt_id)));
        }
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<AttemptWithQuiz>> {
        let attempts = sqlx::query_as::<_, AttemptWithQuiz>(
            r#"
            SELECT a.*, q.title AS quiz_title, c.name AS category_name
            FROM quiz_attempts a
            JOIN quizzes q ON q.id = a.quiz_id
            JOIN categories c ON c.id = q.category_id
            WHERE a.user_id = $1
            ORDER BY a.started_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attempts)
    }
}
