use crate::models::{CancellationPolicy, RefundRecord};
use chrono::{DateTime, Utc};

/// Days-until-travel → refund percentage policy, used when the booking
/// carries no explicit override.
pub fn refund_percentage_for_days(days: i64) -> u8 {
    if days > 30 {
        100
    } else if days > 15 {
        75
    } else if days > 7 {
        50
    } else if days > 0 {
        25
    } else {
        0
    }
}

/// Calendar-day ceiling of `travel_start - now`, in UTC. Any positive
/// remainder counts as a full day; a start in the past comes out
/// negative.
pub fn days_until_travel(travel_start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let secs = (travel_start - now).num_seconds();
    secs.div_euclid(86_400) + if secs.rem_euclid(86_400) > 0 { 1 } else { 0 }
}

/// The refund breakdown for cancelling at `now`. Precedence, in order:
/// `can_cancel = false` skips the refund path entirely; otherwise the
/// per-booking override beats the table; a passed deadline forces 0%
/// last, overriding both.
pub fn compute_refund(
    policy: &CancellationPolicy,
    total_paid: i64,
    travel_start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> RefundRecord {
    let days = days_until_travel(travel_start, now);

    let (refundable, pct) = if !policy.can_cancel {
        (false, 0)
    } else {
        let mut pct = policy
            .refund_percentage
            .unwrap_or_else(|| refund_percentage_for_days(days));
        if let Some(deadline) = policy.deadline {
            if now > deadline {
                pct = 0;
            }
        }
        (pct > 0, pct)
    };

    // Half-up integer rounding; the fee is the exact remainder, so
    // fee + refund == total_paid always.
    let refund_amount = if refundable {
        (total_paid * pct as i64 + 50) / 100
    } else {
        0
    };

    RefundRecord {
        refundable,
        refund_amount,
        refund_percentage: pct,
        cancellation_fee: total_paid - refund_amount,
        total_paid,
        cancelled_at: now,
        days_until_travel: days,
    }
}
