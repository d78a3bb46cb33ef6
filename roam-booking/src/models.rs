use chrono::{DateTime, Utc};
use roam_catalog::TravelerType;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking lifecycle. `Cancelled` and `Completed` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Completed => "COMPLETED",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub status: PaymentStatus,
    pub method: Option<String>,
    pub transaction_id: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
}

impl PaymentInfo {
    pub fn unpaid() -> Self {
        Self {
            status: PaymentStatus::Pending,
            method: None,
            transaction_id: None,
            payment_date: None,
        }
    }

    pub fn paid(method: String, transaction_id: String, at: DateTime<Utc>) -> Self {
        Self {
            status: PaymentStatus::Paid,
            method: Some(method),
            transaction_id: Some(transaction_id),
            payment_date: Some(at),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Traveler {
    pub name: String,
    pub age: u8,
    pub traveler_type: TravelerType,
    pub gender: Gender,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
}

/// Frozen at creation (or payment-verified creation) and never silently
/// recomputed. `final_amount = base_price - discount + taxes` holds at
/// write time; once payment status is PAID none of these inputs change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PricingSnapshot {
    pub base_price: i64,
    pub total_amount: i64,
    pub discount: i64,
    pub taxes: i64,
    pub final_amount: i64,
}

impl PricingSnapshot {
    /// Direct-booking pricing: no discount, no taxes.
    pub fn flat(amount: i64) -> Self {
        Self {
            base_price: amount,
            total_amount: amount,
            discount: 0,
            taxes: 0,
            final_amount: amount,
        }
    }

    /// Payment-verified pricing: supplied base minus coupon discount,
    /// clamped at zero. Taxes are settled gateway-side in this flow.
    pub fn discounted(base: i64, discount: i64) -> Self {
        let final_amount = (base - discount).max(0);
        Self {
            base_price: base,
            total_amount: base,
            discount,
            taxes: 0,
            final_amount,
        }
    }
}

/// Snapshot of the coupon applied at checkout, kept on the booking so
/// later offer edits cannot change what this customer was charged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponApplication {
    pub code: String,
    pub offer_id: Uuid,
    pub discount_amount: i64,
    pub discount_type: String,
    pub discount_value: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationPolicy {
    pub can_cancel: bool,
    pub deadline: Option<DateTime<Utc>>,
    /// Per-booking override; beats the days-until-travel table when set.
    pub refund_percentage: Option<u8>,
}

impl Default for CancellationPolicy {
    fn default() -> Self {
        Self {
            can_cancel: true,
            deadline: None,
            refund_percentage: None,
        }
    }
}

/// Written exactly once, at cancellation. Append-only thereafter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefundRecord {
    pub refundable: bool,
    pub refund_amount: i64,
    pub refund_percentage: u8,
    pub cancellation_fee: i64,
    pub total_paid: i64,
    pub cancelled_at: DateTime<Utc>,
    pub days_until_travel: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    /// Human-readable unique identifier, assigned at save time and
    /// never reused.
    pub booking_number: String,
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
    pub refund: Option<RefundRecord>,
    pub special_requests: Option<String>,
    /// Flat total carried over from rows that predate the pricing
    /// snapshot. Only consulted when the snapshot amount is absent.
    pub legacy_total: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// The amount the refund calculator works from: the snapshot's
    /// final amount, falling back to the legacy flat total for
    /// migrated rows.
    pub fn total_paid(&self) -> i64 {
        if self.pricing.final_amount != 0 {
            self.pricing.final_amount
        } else {
            self.legacy_total.unwrap_or(self.pricing.final_amount)
        }
    }
}
