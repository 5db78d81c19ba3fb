use axum::{
    extract::{Path, State},
    response::Json,
};
use uuid::Uuid;

use crate::models::category::Category;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_categories(
    State(state): State<AppState>,
    Path(subject_id): Path<Uuid>,
) -> crate::error::Result<Json<Vec<Category>>> {
    let categories = state.catalog_service.get_categories(subject_id).await?;
    Ok(Json(categories))
}
