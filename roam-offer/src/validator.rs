use crate::models::{Applicability, Discount, Offer, OfferStatus};
use chrono::NaiveDate;
use roam_catalog::Tour;
use roam_core::CoreError;

/// Result of a successful validation: the discount the booking engine
/// subtracts from the base amount at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferValidation {
    pub discount: i64,
    pub max_discount: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum OfferError {
    #[error("coupon is not active")]
    Inactive,

    #[error("coupon is not valid today")]
    OutsideWindow,

    #[error("minimum booking amount for this coupon is {0}")]
    BelowMinimum(i64),

    #[error("coupon usage limit reached")]
    UsageLimitReached,

    #[error("coupon does not apply to this tour")]
    NotApplicable,
}

impl From<OfferError> for CoreError {
    fn from(err: OfferError) -> Self {
        CoreError::Validation(err.to_string())
    }
}

/// Stateless coupon check consulted before booking creation in the
/// payment-verified path. `today` is passed in so boundary behavior is
/// testable without the wall clock.
pub fn validate(
    offer: &Offer,
    amount: i64,
    tour: &Tour,
    today: NaiveDate,
) -> Result<OfferValidation, OfferError> {
    if offer.status != OfferStatus::Active {
        return Err(OfferError::Inactive);
    }
    if !offer.in_window(today) {
        return Err(OfferError::OutsideWindow);
    }
    if amount < offer.min_amount {
        return Err(OfferError::BelowMinimum(offer.min_amount));
    }
    if offer.usage_exhausted() {
        return Err(OfferError::UsageLimitReached);
    }
    if !applies(&offer.applies_to, tour) {
        return Err(OfferError::NotApplicable);
    }

    let (raw, cap) = match &offer.discount {
        Discount::Percentage {
            value,
            max_discount,
        } => (amount * value / 100, *max_discount),
        Discount::Flat { value } => (*value, None),
    };
    let capped = match cap {
        Some(max) => raw.min(max),
        None => raw,
    };
    // A discount never exceeds the amount it discounts.
    Ok(OfferValidation {
        discount: capped.min(amount),
        max_discount: cap,
    })
}

fn applies(scope: &Applicability, tour: &Tour) -> bool {
    match scope {
        Applicability::All => true,
        Applicability::Tours { ids } => ids.contains(&tour.id),
        Applicability::Cities { ids } => tour.city_id.map_or(false, |c| ids.contains(&c)),
        Applicability::States { ids } => tour.state_id.map_or(false, |s| ids.contains(&s)),
    }
}
