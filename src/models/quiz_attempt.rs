use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One user's play-through of one quiz. An attempt is active while
/// `completed_at` is unset; `completed_at`, once set, is never cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct QuizAttempt {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub user_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_answered_question_id: Option<Uuid>,
    pub score: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuizAttempt {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Attempt row joined with quiz and category labels for history listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AttemptWithQuiz {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub attempt: QuizAttempt,
    pub quiz_title: String,
    pub category_name: String,
}
