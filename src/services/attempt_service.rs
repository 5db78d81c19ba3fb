use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::database::repository::AttemptStore;
use crate::error::{Error, Result};
use crate::models::quiz_attempt::{AttemptWithQuiz, QuizAttempt};

/// Decides, per (quiz, user), whether to resume the latest attempt or start
/// a fresh one.
#[derive(Clone)]
pub struct AttemptService {
    store: Arc<dyn AttemptStore>,
}

impl AttemptService {
    pub fn new(store: Arc<dyn AttemptStore>) -> Self {
        Self { store }
    }

    /// Resume the latest incomplete attempt, or create a new one.
    ///
    /// The create path is a conditional insert: the store refuses a second
    /// active row per (quiz, user), so two near-simultaneous callers
    /// converge on the same attempt instead of both inserting.
    pub async fn get_or_create_attempt(&self, quiz_id: Uuid, user_id: Uuid) -> Result<QuizAttempt> {
        if let Some(last) = self.store.latest(quiz_id, user_id).await? {
            if !last.is_completed() {
                return Ok(last);
            }
        }

        if let Some(created) = self.store.insert_active(quiz_id, user_id, Utc::now()).await? {
            return Ok(created);
        }

        // Lost the insert race; resume the attempt the other caller created.
        self.store
            .latest(quiz_id, user_id)
            .await?
            .filter(|a| !a.is_completed())
            .ok_or_else(|| {
                Error::Internal("Active attempt missing after insert conflict".to_string())
            })
    }

    /// Overwrite the attempt's last-answered pointer and running score.
    /// Scoped to the owning user: a foreign attempt id is a `NotFound`.
    pub async fn update_attempt_progress(
        &self,
        attempt_id: Uuid,
        user_id: Uuid,
        last_answered_question_id: Uuid,
        score: i32,
    ) -> Result<()> {
        self.store
            .set_progress(
                attempt_id,
                user_id,
                last_answered_question_id,
                score,
                Utc::now(),
            )
            .await
    }

    /// The sole transition into the completed terminal state. Re-invocation
    /// rewrites completion timestamp and score; last write wins. Scoped to
    /// the owning user: a foreign attempt id is a `NotFound`.
    pub async fn complete_attempt(
        &self,
        attempt_id: Uuid,
        user_id: Uuid,
        final_score: i32,
    ) -> Result<()> {
        self.store
            .set_completed(attempt_id, user_id, final_score, Utc::now())
            .await
    }

    /// Latest attempt for the pair; `None` when the user has never started
    /// this quiz.
    pub async fn get_last_attempt(
        &self,
        quiz_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<QuizAttempt>> {
        self.store.latest(quiz_id, user_id).await
    }

    /// The user's attempt history across all quizzes, newest first.
    pub async fn get_user_attempts(&self, user_id: Uuid) -> Result<Vec<AttemptWithQuiz>> {
        self.store.list_for_user(user_id).await
    }
}
