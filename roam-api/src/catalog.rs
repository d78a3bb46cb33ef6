use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use roam_catalog::Tour;
use roam_core::CoreError;
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/tours", get(list_tours))
        .route("/v1/tours/{id}", get(get_tour))
}

async fn list_tours(State(state): State<AppState>) -> Result<Json<Vec<Tour>>, AppError> {
    Ok(Json(state.tours.list_active().await?))
}

async fn get_tour(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Tour>, AppError> {
    let tour = state
        .tours
        .get(id)
        .await?
        .filter(|t| t.is_active)
        .ok_or_else(|| CoreError::NotFound("tour not found".into()))?;
    Ok(Json(tour))
}
