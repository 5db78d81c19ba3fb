use axum::{
    extract::{Extension, Path, State},
    response::Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::attempt_dto::{
    CompleteAttemptRequest, CompleteAttemptResponse, UpdateProgressRequest, UpdateProgressResponse,
};
use crate::middleware::auth::Claims;
use crate::models::quiz_attempt::{AttemptWithQuiz, QuizAttempt};
use crate::AppState;

#[axum::debug_handler]
pub async fn list_user_attempts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> crate::error::Result<Json<Vec<AttemptWithQuiz>>> {
    let user_id = claims.user_id()?;
    let attempts = state.attempt_service.get_user_attempts(user_id).await?;
    Ok(Json(attempts))
}

/// Resume the caller's incomplete attempt on this quiz, or start a new one.
#[axum::debug_handler]
pub async fn start_or_resume_attempt(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<Uuid>,
) -> crate::error::Result<Json<QuizAttempt>> {
    let user_id = claims.user_id()?;
    // existence check so an unknown quiz is a 404, not a dangling attempt
    let quiz = state.catalog_service.get_quiz(quiz_id).await?;
    if !quiz.is_active {
        return Err(crate::error::Error::BadRequest(
            "Quiz is not active".to_string(),
        ));
    }
    let attempt = state
        .attempt_service
        .get_or_create_attempt(quiz_id, user_id)
        .await?;
    Ok(Json(attempt))
}

/// Writes are scoped to the session user; someone else's attempt id
/// behaves like a missing one.
#[axum::debug_handler]
pub async fn update_attempt_progress(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProgressRequest>,
) -> crate::error::Result<Json<UpdateProgressResponse>> {
    req.validate()?;
    let user_id = claims.user_id()?;
    state
        .attempt_service
        .update_attempt_progress(id, user_id, req.last_answered_question_id, req.score)
        .await?;
    Ok(Json(UpdateProgressResponse {
        saved: true,
        attempt_id: id,
    }))
}

#[axum::debug_handler]
pub async fn complete_attempt(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<CompleteAttemptRequest>,
) -> crate::error::Result<Json<CompleteAttemptResponse>> {
    req.validate()?;
    let user_id = claims.user_id()?;
    state
        .attempt_service
        .complete_attempt(id, user_id, req.score)
        .await?;
    Ok(Json(CompleteAttemptResponse {
        attempt_id: id,
        score: req.score,
        completed: true,
    }))
}
