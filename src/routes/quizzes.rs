use axum::{
    extract::{Extension, Path, State},
    response::Json,
};
use uuid::Uuid;

use crate::middleware::auth::Claims;
use crate::models::quiz::{Quiz, QuizWithStatus};
use crate::models::quiz_attempt::QuizAttempt;
use crate::services::progress;
use crate::AppState;

/// Active quizzes in a category, decorated with the caller's play state.
#[axum::debug_handler]
pub async fn list_quizzes_by_category(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(category_id): Path<Uuid>,
) -> crate::error::Result<Json<Vec<QuizWithStatus>>> {
    let user_id = claims.user_id()?;
    let quizzes = state
        .catalog_service
        .get_quizzes_by_category(category_id)
        .await?;
    let attempts: Vec<QuizAttempt> = state
        .attempt_service
        .get_user_attempts(user_id)
        .await?
        .into_iter()
        .map(|row| row.attempt)
        .collect();

    let decorated = quizzes
        .into_iter()
        .map(|quiz| progress::with_status(quiz, &attempts))
        .collect();
    Ok(Json(decorated))
}

#[axum::debug_handler]
pub async fn get_quiz(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Json<Quiz>> {
    let quiz = state.catalog_service.get_quiz(id).await?;
    Ok(Json(quiz))
}
