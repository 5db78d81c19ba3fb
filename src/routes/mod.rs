pub mod attempts;
pub mod categories;
pub mod health;
pub mod quizzes;
pub mod subjects;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::AppState;

/// The full route table. Everything under /api requires a bearer session.
pub fn api_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/subjects", get(subjects::list_subjects))
        .route("/api/subjects/:id", get(subjects::get_subject))
        .route("/api/categories/:subject_id", get(categories::list_categories))
        .route("/api/quizzes/:category_id", get(quizzes::list_quizzes_by_category))
        .route("/api/quizzes/quiz/:id", get(quizzes::get_quiz))
        .route("/api/quiz-attempts", get(attempts::list_user_attempts))
        .route("/api/quiz-attempts/:quiz_id", post(attempts::start_or_resume_attempt))
        .route(
            "/api/quiz-attempts/:id/progress",
            patch(attempts::update_attempt_progress),
        )
        .route(
            "/api/quiz-attempts/:id/complete",
            post(attempts::complete_attempt),
        )
        .layer(axum::middleware::from_fn(
            crate::middleware::auth::require_bearer_auth,
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(protected)
        .with_state(state)
}
