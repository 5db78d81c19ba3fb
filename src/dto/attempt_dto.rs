use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProgressRequest {
    pub last_answered_question_id: Uuid,
    #[validate(range(min = 0))]
    pub score: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CompleteAttemptRequest {
    #[validate(range(min = 0))]
    pub score: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProgressResponse {
    pub saved: bool,
    pub attempt_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteAttemptResponse {
    pub attempt_id: Uuid,
    pub score: i32,
    pub completed: bool,
}
