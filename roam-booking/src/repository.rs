use crate::models::{
    Booking, BookingStatus, CancellationPolicy, ContactInfo, CouponApplication, PaymentInfo,
    PaymentStatus, PricingSnapshot, RefundRecord, Traveler,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roam_core::CoreResult;
use uuid::Uuid;

/// Everything a new booking carries except what the store assigns at
/// save time (id, booking number, timestamps). The number is generated
/// inside `create` so the sequence read happens as late as possible; a
/// collision on the uniqueness constraint surfaces as Conflict and the
/// caller may retry.
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub customer_id: Uuid,
    pub tour_id: Uuid,
    pub travelers: Vec<Traveler>,
    pub contact: ContactInfo,
    pub travel_start: DateTime<Utc>,
    pub travel_end: DateTime<Utc>,
    pub pricing: PricingSnapshot,
    pub coupon: Option<CouponApplication>,
    pub payment: PaymentInfo,
    pub status: BookingStatus,
    pub policy: CancellationPolicy,
    pub special_requests: Option<String>,
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, draft: BookingDraft) -> CoreResult<Booking>;

    async fn get(&self, id: Uuid) -> CoreResult<Option<Booking>>;

    async fn list_for_customer(&self, customer_id: Uuid) -> CoreResult<Vec<Booking>>;

    async fn update_status(&self, id: Uuid, status: BookingStatus) -> CoreResult<()>;

    /// Persists the append-once refund record, the `CANCELLED` status
    /// and the payment status in one per-document write.
    async fn record_cancellation(
        &self,
        id: Uuid,
        refund: &RefundRecord,
        payment_status: PaymentStatus,
    ) -> CoreResult<()>;
}
