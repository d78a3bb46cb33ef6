use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Active,
    Inactive,
    Expired,
}

/// Discount shape. Percentage discounts carry an optional cap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Discount {
    Percentage {
        value: i64,
        max_discount: Option<i64>,
    },
    Flat {
        value: i64,
    },
}

/// Which tours a coupon applies to. An allow-list keyed by catalog
/// level; `All` is the open case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum Applicability {
    All,
    Tours { ids: Vec<Uuid> },
    Cities { ids: Vec<Uuid> },
    States { ids: Vec<Uuid> },
}

/// A coupon offer. `used_count` is an at-least-once counter (see the
/// repository increment); the usage-limit check in the validator is
/// advisory under concurrent redemptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: Uuid,
    pub code: String,
    pub title: String,
    pub status: OfferStatus,
    pub discount: Discount,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
    pub min_amount: i64,
    pub usage_limit: Option<i64>,
    pub used_count: i64,
    pub applies_to: Applicability,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Offer {
    /// Inclusive full-day date window.
    pub fn in_window(&self, today: NaiveDate) -> bool {
        self.valid_from <= today && today <= self.valid_until
    }

    pub fn usage_exhausted(&self) -> bool {
        match self.usage_limit {
            Some(limit) => self.used_count >= limit,
            None => false,
        }
    }
}

/// Create payload carried inside an offer_create approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferDraft {
    pub code: String,
    pub title: String,
    pub discount: Discount,
    pub valid_from: NaiveDate,
    pub valid_until: NaiveDate,
    #[serde(default)]
    pub min_amount: i64,
    pub usage_limit: Option<i64>,
    pub applies_to: Applicability,
}

/// Partial update; `None` preserves the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfferPatch {
    pub title: Option<String>,
    pub status: Option<OfferStatus>,
    pub discount: Option<Discount>,
    pub valid_from: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub min_amount: Option<i64>,
    pub usage_limit: Option<Option<i64>>,
    pub applies_to: Option<Applicability>,
}
