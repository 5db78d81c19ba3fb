use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::quiz_attempt::QuizAttempt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub id: Uuid,
    pub content: String,
    pub is_correct: bool,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub content: String,
    pub image_url: Option<String>,
    pub explanation: Option<String>,
    pub choices: Vec<Choice>,
}

/// A quiz with its ordered question sequence fully loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,
    pub category_id: Uuid,
    pub title: String,
    pub is_active: bool,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// A quiz decorated with play state derived from the caller's latest attempt.
/// Recomputed on demand, never stored as source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizWithStatus {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub status: QuizStatus,
    pub progress: u8,
    pub score: Option<i32>,
    pub attempt: Option<QuizAttempt>,
    pub last_question_id: Option<Uuid>,
}
