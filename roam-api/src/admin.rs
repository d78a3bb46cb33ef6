use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::patch,
    Extension, Json, Router,
};
use roam_booking::{Booking, BookingStatus};
use roam_core::identity::AdminUser;
use serde::Deserialize;
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/admin/bookings/{id}/status", patch(update_booking_status))
}

#[derive(Debug, Deserialize)]
struct StatusRequest {
    status: BookingStatus,
}

async fn update_booking_status(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.bookings.update_status(&admin, id, req.status).await?;
    tracing::info!(
        booking = %booking.booking_number,
        status = booking.status.as_str(),
        admin = %admin.id,
        "Booking status updated"
    );
    Ok(Json(booking))
}
