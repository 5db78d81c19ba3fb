use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::category::Category;
use crate::models::quiz::Quiz;
use crate::models::quiz_attempt::{AttemptWithQuiz, QuizAttempt};
use crate::models::subject::Subject;

/// Store contract for quiz attempts.
///
/// Absence of a row is reported as `None`, never as an error; every other
/// storage failure propagates unchanged.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Most recent attempt for the pair, by `started_at` descending.
    async fn latest(&self, quiz_id: Uuid, user_id: Uuid) -> Result<Option<QuizAttempt>>;

    /// Insert a fresh active attempt (score 0, no completion timestamp).
    ///
    /// Returns `None` when an active attempt already exists for the pair,
    /// i.e. the conditional write lost to a concurrent caller. The backing
    /// store enforces at most one active attempt per (quiz, user).
    async fn insert_active(
        &self,
        quiz_id: Uuid,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<QuizAttempt>>;

    /// Overwrite the last-answered pointer and score; bumps `updated_at`.
    /// Writes are scoped to the owning user.
    ///
    /// # Errors
    ///
    /// `Error::NotFound` if no attempt matches `attempt_id` for `user_id`.
    async fn set_progress(
        &self,
        attempt_id: Uuid,
        user_id: Uuid,
        last_question_id: Uuid,
        score: i32,
        now: DateTime<Utc>,
    ) -> Result<()>;

    /// Set `completed_at` and the final score; bumps `updated_at`.
    /// Re-invocation rewrites the same fields, last write wins. Writes are
    /// scoped to the owning user.
    async fn set_completed(
        &self,
        attempt_id: Uuid,
        user_id: Uuid,
        final_score: i32,
        now: DateTime<Utc>,
    ) -> Result<()>;

    /// All attempts of a user, newest first, with quiz/category labels.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<AttemptWithQuiz>>;
}

/// Read-only store contract for the browsing hierarchy.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn subjects(&self) -> Result<Vec<Subject>>;
    async fn subject(&self, id: Uuid) -> Result<Subject>;
    async fn categories(&self, subject_id: Uuid) -> Result<Vec<Category>>;
    async fn category(&self, id: Uuid) -> Result<Category>;
    /// Active quizzes only, ordered by title, questions nested in position order.
    async fn quizzes_by_category(&self, category_id: Uuid) -> Result<Vec<Quiz>>;
    async fn quiz(&self, id: Uuid) -> Result<Quiz>;
}
