use crate::pii::Masked;
use uuid::Uuid;

/// Published after a payment-verified booking is durably persisted.
/// Consumed by the notification worker (receipt + email/SMS/WhatsApp).
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingConfirmedEvent {
    pub booking_id: Uuid,
    pub booking_number: String,
    pub customer_id: Uuid,
    pub contact_email: Masked<String>,
    pub contact_phone: Masked<String>,
    pub final_amount: i64,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingCancelledEvent {
    pub booking_id: Uuid,
    pub booking_number: String,
    pub customer_id: Uuid,
    pub contact_email: Masked<String>,
    pub refund_amount: i64,
    pub refund_percentage: u8,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct ApprovalDecidedEvent {
    pub approval_id: Uuid,
    pub requested_by: Uuid,
    pub decided_by: Uuid,
    pub approved: bool,
    pub rejection_reason: Option<String>,
    pub timestamp: i64,
}
