use crate::error::AppError;
use crate::middleware::auth::CurrentCustomer;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use roam_booking::{Booking, CreateBookingRequest, RefundRecord, VerifiedBookingRequest};
use roam_core::payment::PaymentOrder;
use roam_shared::events::{BookingCancelledEvent, BookingConfirmedEvent};
use roam_shared::pii::Masked;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking).get(list_bookings))
        .route("/v1/bookings/verified", post(create_verified_booking))
        .route("/v1/bookings/{id}", get(get_booking))
        .route("/v1/bookings/{id}/cancel", post(cancel_booking))
        .route("/v1/payments/order", post(create_payment_order))
}

#[derive(Debug, Deserialize)]
struct PaymentOrderRequest {
    amount: i64,
}

async fn create_payment_order(
    State(state): State<AppState>,
    Extension(customer): Extension<CurrentCustomer>,
    Json(req): Json<PaymentOrderRequest>,
) -> Result<Json<PaymentOrder>, AppError> {
    tracing::info!(customer = %customer.id, amount = req.amount, "Creating payment order");
    let order = state.payments.create_order(req.amount, "INR").await?;
    Ok(Json(order))
}

async fn create_booking(
    State(state): State<AppState>,
    Extension(customer): Extension<CurrentCustomer>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.bookings.create_booking(customer.id, req).await?;
    tracing::info!(booking = %booking.booking_number, "Booking created");
    Ok(Json(booking))
}

async fn create_verified_booking(
    State(state): State<AppState>,
    Extension(customer): Extension<CurrentCustomer>,
    Json(req): Json<VerifiedBookingRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = state
        .bookings
        .create_verified_booking(customer.id, req)
        .await?;

    // Fire-and-forget: the notification worker picks this up; a Kafka
    // hiccup never fails the booking that already committed.
    let event = BookingConfirmedEvent {
        booking_id: booking.id,
        booking_number: booking.booking_number.clone(),
        customer_id: booking.customer_id,
        contact_email: Masked(booking.contact.email.clone()),
        contact_phone: Masked(booking.contact.phone.clone()),
        final_amount: booking.pricing.final_amount,
        timestamp: Utc::now().timestamp(),
    };
    let _ = state
        .kafka
        .publish(&state.topics.booking, &booking.booking_number, &event)
        .await;

    Ok(Json(booking))
}

async fn list_bookings(
    State(state): State<AppState>,
    Extension(customer): Extension<CurrentCustomer>,
) -> Result<Json<Vec<Booking>>, AppError> {
    Ok(Json(state.bookings.list_for_customer(customer.id).await?))
}

async fn get_booking(
    State(state): State<AppState>,
    Extension(customer): Extension<CurrentCustomer>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.bookings.get_owned_booking(customer.id, id).await?))
}

#[derive(Debug, Serialize)]
struct CancelResponse {
    booking_id: Uuid,
    booking_number: String,
    refund: RefundRecord,
}

async fn cancel_booking(
    State(state): State<AppState>,
    Extension(customer): Extension<CurrentCustomer>,
    Path(id): Path<Uuid>,
) -> Result<Json<CancelResponse>, AppError> {
    let outcome = state.bookings.cancel_booking(customer.id, id).await?;
    let booking = state.bookings.get_owned_booking(customer.id, id).await?;

    let event = BookingCancelledEvent {
        booking_id: outcome.booking_id,
        booking_number: outcome.booking_number.clone(),
        customer_id: customer.id,
        contact_email: Masked(booking.contact.email),
        refund_amount: outcome.refund.refund_amount,
        refund_percentage: outcome.refund.refund_percentage,
        timestamp: Utc::now().timestamp(),
    };
    let _ = state
        .kafka
        .publish(&state.topics.booking, &outcome.booking_number, &event)
        .await;

    Ok(Json(CancelResponse {
        booking_id: outcome.booking_id,
        booking_number: outcome.booking_number,
        refund: outcome.refund,
    }))
}
