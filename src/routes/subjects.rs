use axum::{
    extract::{Path, State},
    response::Json,
};
use uuid::Uuid;

use crate::models::subject::Subject;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_subjects(State(state): State<AppState>) -> crate::error::Result<Json<Vec<Subject>>> {
    let subjects = state.catalog_service.get_subjects().await?;
    Ok(Json(subjects))
}

#[axum::debug_handler]
pub async fn get_subject(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> crate::error::Result<Json<Subject>> {
    let subject = state.catalog_service.get_subject(id).await?;
    Ok(Json(subject))
}
