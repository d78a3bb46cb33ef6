use crate::{from_jsonb, map_db_err, parse_enum, to_jsonb};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roam_booking::{
    Booking, BookingDraft, BookingRepository, BookingStatus, PaymentStatus, RefundRecord,
};
use roam_core::{CoreError, CoreResult};
use sqlx::PgPool;
use uuid::Uuid;

pub struct StoreBookingRepository {
    pool: PgPool,
}

impl StoreBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    booking_number: String,
    customer_id: Uuid,
    tour_id: Uuid,
    travelers: serde_json::Value,
    contact: serde_json::Value,
    travel_start: DateTime<Utc>,
    travel_end: DateTime<Utc>,
    pricing: serde_json::Value,
    coupon: Option<serde_json::Value>,
    payment: serde_json::Value,
    status: String,
    policy: serde_json::Value,
    refund: Option<serde_json::Value>,
    special_requests: Option<String>,
    legacy_total: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self) -> CoreResult<Booking> {
        Ok(Booking {
            id: self.id,
            booking_number: self.booking_number,
            customer_id: self.customer_id,
            tour_id: self.tour_id,
            travelers: from_jsonb("travelers", self.travelers)?,
            contact: from_jsonb("contact", self.contact)?,
            travel_start: self.travel_start,
            travel_end: self.travel_end,
            pricing: from_jsonb("pricing", self.pricing)?,
            coupon: self.coupon.map(|v| from_jsonb("coupon", v)).transpose()?,
            payment: from_jsonb("payment", self.payment)?,
            status: parse_enum("booking status", &self.status)?,
            policy: from_jsonb("policy", self.policy)?,
            refund: self.refund.map(|v| from_jsonb("refund", v)).transpose()?,
            special_requests: self.special_requests,
            legacy_total: self.legacy_total,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_BOOKING: &str = "SELECT id, booking_number, customer_id, tour_id, travelers, \
     contact, travel_start, travel_end, pricing, coupon, payment, status, policy, refund, \
     special_requests, legacy_total, created_at, updated_at FROM bookings";

#[async_trait]
impl BookingRepository for StoreBookingRepository {
    async fn create(&self, draft: BookingDraft) -> CoreResult<Booking> {
        let id = Uuid::new_v4();

        // Sequence read as late as possible; the unique index on
        // booking_number is the safety net, surfacing a racing insert
        // as Conflict for the caller to retry.
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_err)?;
        let booking_number = format!("BK{:06}", count + 1);

        let row = sqlx::query_as::<_, BookingRow>(
            "INSERT INTO bookings (id, booking_number, customer_id, tour_id, travelers, contact, \
             travel_start, travel_end, pricing, coupon, payment, status, policy, special_requests) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING id, booking_number, customer_id, tour_id, travelers, contact, travel_start, \
             travel_end, pricing, coupon, payment, status, policy, refund, special_requests, \
             legacy_total, created_at, updated_at",
        )
        .bind(id)
        .bind(&booking_number)
        .bind(draft.customer_id)
        .bind(draft.tour_id)
        .bind(to_jsonb("travelers", &draft.travelers)?)
        .bind(to_jsonb("contact", &draft.contact)?)
        .bind(draft.travel_start)
        .bind(draft.travel_end)
        .bind(to_jsonb("pricing", &draft.pricing)?)
        .bind(draft.coupon.as_ref().map(|c| to_jsonb("coupon", c)).transpose()?)
        .bind(to_jsonb("payment", &draft.payment)?)
        .bind(draft.status.as_str())
        .bind(to_jsonb("policy", &draft.policy)?)
        .bind(&draft.special_requests)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;

        row.into_booking()
    }

    async fn get(&self, id: Uuid) -> CoreResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!("{} WHERE id = $1", SELECT_BOOKING))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        row.map(BookingRow::into_booking).transpose()
    }

    async fn list_for_customer(&self, customer_id: Uuid) -> CoreResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "{} WHERE customer_id = $1 ORDER BY created_at DESC",
            SELECT_BOOKING
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;
        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    async fn update_status(&self, id: Uuid, status: BookingStatus) -> CoreResult<()> {
        let result = sqlx::query(
            "UPDATE bookings SET status = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound("booking not found".into()));
        }
        Ok(())
    }

    async fn record_cancellation(
        &self,
        id: Uuid,
        refund: &RefundRecord,
        payment_status: PaymentStatus,
    ) -> CoreResult<()> {
        // Single write: status, refund record and payment status flip
        // together or not at all.
        let result = sqlx::query(
            "UPDATE bookings SET status = 'CANCELLED', refund = $1, \
             payment = jsonb_set(payment, '{status}', $2), updated_at = NOW() \
             WHERE id = $3 AND status NOT IN ('CANCELLED', 'COMPLETED')",
        )
        .bind(to_jsonb("refund", refund)?)
        .bind(to_jsonb("payment status", &payment_status)?)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::Conflict("already cancelled".into()));
        }
        Ok(())
    }
}
