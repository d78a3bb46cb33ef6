use crate::models::{
    Booking, BookingStatus, CancellationPolicy, ContactInfo, CouponApplication, PaymentInfo,
    PaymentStatus, PricingSnapshot, RefundRecord, Traveler,
};
use crate::refund::compute_refund;
use crate::repository::{BookingDraft, BookingRepository};
use chrono::{DateTime, Utc};
use roam_catalog::TourRepository;
use roam_core::identity::AdminUser;
use roam_core::repository::CustomerRepository;
use roam_core::{CoreError, CoreResult};
use roam_offer::{Discount, OfferRepository};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Direct-booking input: no payment yet, booking lands in PENDING.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub tour_id: Uuid,
    pub travelers: Vec<Traveler>,
    pub contact: ContactInfo,
    pub travel_start: DateTime<Utc>,
    pub travel_end: DateTime<Utc>,
    pub special_requests: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CouponInput {
    pub code: String,
    /// Discount computed when the payment order was created; recorded
    /// into the snapshot as-is.
    pub discount_amount: i64,
}

/// Payment-verified input. The gateway signature was checked by the
/// boundary before this ever reaches the engine, so the booking lands
/// directly in CONFIRMED with payment PAID.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifiedBookingRequest {
    pub tour_id: Uuid,
    pub travelers: Vec<Traveler>,
    pub contact: ContactInfo,
    pub travel_start: DateTime<Utc>,
    pub travel_end: DateTime<Utc>,
    pub base_amount: i64,
    pub payment_reference: String,
    pub payment_method: String,
    pub coupon: Option<CouponInput>,
    pub special_requests: Option<String>,
}

/// Returned from a cancellation. The breakdown is reported even when
/// nothing is refundable; a zero refund is an outcome, not an error.
#[derive(Debug, Clone)]
pub struct CancellationOutcome {
    pub booking_id: Uuid,
    pub booking_number: String,
    pub refund: RefundRecord,
    pub payment_status: PaymentStatus,
}

/// Owns the booking state machine and the cancellation/refund policy.
pub struct BookingEngine {
    bookings: Arc<dyn BookingRepository>,
    tours: Arc<dyn TourRepository>,
    offers: Arc<dyn OfferRepository>,
    customers: Arc<dyn CustomerRepository>,
}

impl BookingEngine {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        tours: Arc<dyn TourRepository>,
        offers: Arc<dyn OfferRepository>,
        customers: Arc<dyn CustomerRepository>,
    ) -> Self {
        Self {
            bookings,
            tours,
            offers,
            customers,
        }
    }

    /// Create a booking in PENDING, priced per traveler from the
    /// tour's price table.
    pub async fn create_booking(
        &self,
        customer_id: Uuid,
        req: CreateBookingRequest,
    ) -> CoreResult<Booking> {
        validate_window(req.travel_start, req.travel_end)?;
        validate_travelers(&req.travelers)?;

        let tour = self
            .tours
            .get(req.tour_id)
            .await?
            .ok_or_else(|| CoreError::NotFound("tour not found".into()))?;

        let base: i64 = req
            .travelers
            .iter()
            .map(|t| tour.prices.unit_price(t.traveler_type))
            .sum();

        let draft = BookingDraft {
            customer_id,
            tour_id: tour.id,
            travelers: req.travelers,
            contact: req.contact,
            travel_start: req.travel_start,
            travel_end: req.travel_end,
            pricing: PricingSnapshot::flat(base),
            coupon: None,
            payment: PaymentInfo::unpaid(),
            status: BookingStatus::Pending,
            policy: CancellationPolicy::default(),
            special_requests: req.special_requests,
        };
        self.bookings.create(draft).await
    }

    /// Create a booking whose payment was already verified upstream.
    /// Lands in CONFIRMED/PAID, applying and snapshotting an optional
    /// coupon on the way.
    pub async fn create_verified_booking(
        &self,
        customer_id: Uuid,
        req: VerifiedBookingRequest,
    ) -> CoreResult<Booking> {
        validate_window(req.travel_start, req.travel_end)?;
        validate_travelers(&req.travelers)?;

        let tour = self
            .tours
            .get(req.tour_id)
            .await?
            .ok_or_else(|| CoreError::NotFound("tour not found".into()))?;

        let mut coupon = None;
        let mut discount = 0;
        if let Some(input) = &req.coupon {
            let offer = self
                .offers
                .get_by_code(&input.code)
                .await?
                .ok_or_else(|| CoreError::NotFound("coupon not found".into()))?;
            // At-least-once: the counter bump lands before the booking
            // write, so an aborted save can overcount but never lose a
            // redemption.
            self.offers.increment_usage(&input.code).await?;
            let (discount_type, discount_value) = match offer.discount {
                Discount::Percentage { value, .. } => ("percentage", value),
                Discount::Flat { value } => ("flat", value),
            };
            discount = input.discount_amount;
            coupon = Some(CouponApplication {
                code: offer.code,
                offer_id: offer.id,
                discount_amount: input.discount_amount,
                discount_type: discount_type.to_string(),
                discount_value,
            });
        }

        let draft = BookingDraft {
            customer_id,
            tour_id: tour.id,
            travelers: req.travelers,
            contact: req.contact,
            travel_start: req.travel_start,
            travel_end: req.travel_end,
            pricing: PricingSnapshot::discounted(req.base_amount, discount),
            coupon,
            payment: PaymentInfo::paid(req.payment_method, req.payment_reference, Utc::now()),
            status: BookingStatus::Confirmed,
            policy: CancellationPolicy::default(),
            special_requests: req.special_requests,
        };
        let booking = self.bookings.create(draft).await?;

        // Profile denormalization: keep the customer's phone current
        // for later contact. Best-effort, never fails the booking.
        if is_valid_phone(&booking.contact.phone) {
            if let Err(err) = self
                .customers
                .update_phone(customer_id, &booking.contact.phone)
                .await
            {
                tracing::warn!(
                    booking = %booking.booking_number,
                    "Failed to sync customer phone: {}",
                    err
                );
            }
        }

        Ok(booking)
    }

    pub async fn cancel_booking(
        &self,
        caller: Uuid,
        booking_id: Uuid,
    ) -> CoreResult<CancellationOutcome> {
        self.cancel_booking_at(caller, booking_id, Utc::now()).await
    }

    /// Cancellation with an explicit clock, so refund boundaries are
    /// testable to the second.
    pub async fn cancel_booking_at(
        &self,
        caller: Uuid,
        booking_id: Uuid,
        now: DateTime<Utc>,
    ) -> CoreResult<CancellationOutcome> {
        let booking = self
            .bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| CoreError::NotFound("booking not found".into()))?;

        if booking.customer_id != caller {
            return Err(CoreError::Forbidden(
                "booking does not belong to you".into(),
            ));
        }
        match booking.status {
            BookingStatus::Cancelled => {
                return Err(CoreError::Conflict("already cancelled".into()))
            }
            BookingStatus::Completed => {
                return Err(CoreError::Conflict(
                    "cannot cancel completed booking".into(),
                ))
            }
            BookingStatus::Pending | BookingStatus::Confirmed => {}
        }

        let refund = compute_refund(
            &booking.policy,
            booking.total_paid(),
            booking.travel_start,
            now,
        );

        // Status flag only; the actual money movement is the payment
        // gateway's job.
        let payment_status = if refund.refundable
            && refund.refund_amount > 0
            && booking.payment.status == PaymentStatus::Paid
        {
            PaymentStatus::Refunded
        } else {
            booking.payment.status
        };

        self.bookings
            .record_cancellation(booking_id, &refund, payment_status)
            .await?;

        tracing::info!(
            booking = %booking.booking_number,
            refund_percentage = refund.refund_percentage,
            refund_amount = refund.refund_amount,
            "Booking cancelled"
        );

        Ok(CancellationOutcome {
            booking_id,
            booking_number: booking.booking_number,
            refund,
            payment_status,
        })
    }

    pub async fn get_owned_booking(&self, caller: Uuid, booking_id: Uuid) -> CoreResult<Booking> {
        let booking = self
            .bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| CoreError::NotFound("booking not found".into()))?;
        if booking.customer_id != caller {
            return Err(CoreError::Forbidden(
                "booking does not belong to you".into(),
            ));
        }
        Ok(booking)
    }

    pub async fn list_for_customer(&self, customer_id: Uuid) -> CoreResult<Vec<Booking>> {
        self.bookings.list_for_customer(customer_id).await
    }

    /// Admin progression of the happy path: PENDING → CONFIRMED →
    /// COMPLETED. Cancellation has its own flow and is rejected here.
    pub async fn update_status(
        &self,
        admin: &AdminUser,
        booking_id: Uuid,
        new_status: BookingStatus,
    ) -> CoreResult<Booking> {
        if !admin.can_act_on_booking(booking_id) {
            return Err(CoreError::Forbidden(
                "booking is not assigned to you".into(),
            ));
        }
        let mut booking = self
            .bookings
            .get(booking_id)
            .await?
            .ok_or_else(|| CoreError::NotFound("booking not found".into()))?;

        if booking.status.is_terminal() {
            return Err(CoreError::Conflict(format!(
                "booking is already {}",
                booking.status.as_str()
            )));
        }
        let allowed = matches!(
            (booking.status, new_status),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
        );
        if !allowed {
            return Err(CoreError::Validation(format!(
                "cannot move booking from {} to {}",
                booking.status.as_str(),
                new_status.as_str()
            )));
        }

        self.bookings.update_status(booking_id, new_status).await?;
        booking.status = new_status;
        Ok(booking)
    }
}

fn validate_window(start: DateTime<Utc>, end: DateTime<Utc>) -> CoreResult<()> {
    if start > end {
        return Err(CoreError::Validation(
            "travel start date is after the end date".into(),
        ));
    }
    Ok(())
}

fn validate_travelers(travelers: &[Traveler]) -> CoreResult<()> {
    if travelers.is_empty() {
        return Err(CoreError::Validation(
            "at least one traveler is required".into(),
        ));
    }
    Ok(())
}

/// The profile sync only fires for a plain 10-digit number.
fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 10 && phone.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use roam_catalog::{PriceTable, Tour, TourDraft, TourPatch};
    use roam_core::identity::{AssignedData, Customer, Role};
    use roam_offer::{Applicability, Offer, OfferDraft, OfferPatch, OfferStatus};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;

    struct MemoryBookings {
        rows: Mutex<HashMap<Uuid, Booking>>,
        seq: AtomicI64,
    }

    impl MemoryBookings {
        fn new() -> Self {
            Self {
                rows: Mutex::new(HashMap::new()),
                seq: AtomicI64::new(0),
            }
        }

        fn put(&self, booking: Booking) {
            self.rows.lock().unwrap().insert(booking.id, booking);
        }
    }

    #[async_trait]
    impl BookingRepository for MemoryBookings {
        async fn create(&self, draft: BookingDraft) -> CoreResult<Booking> {
            let n = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
            let now = Utc::now();
            let booking = Booking {
                id: Uuid::new_v4(),
                booking_number: format!("BK{:06}", n),
                customer_id: draft.customer_id,
                tour_id: draft.tour_id,
                travelers: draft.travelers,
                contact: draft.contact,
                travel_start: draft.travel_start,
                travel_end: draft.travel_end,
                pricing: draft.pricing,
                coupon: draft.coupon,
                payment: draft.payment,
                status: draft.status,
                policy: draft.policy,
                refund: None,
                special_requests: draft.special_requests,
                legacy_total: None,
                created_at: now,
                updated_at: now,
            };
            self.put(booking.clone());
            Ok(booking)
        }

        async fn get(&self, id: Uuid) -> CoreResult<Option<Booking>> {
            Ok(self.rows.lock().unwrap().get(&id).cloned())
        }

        async fn list_for_customer(&self, customer_id: Uuid) -> CoreResult<Vec<Booking>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|b| b.customer_id == customer_id)
                .cloned()
                .collect())
        }

        async fn update_status(&self, id: Uuid, status: BookingStatus) -> CoreResult<()> {
            let mut rows = self.rows.lock().unwrap();
            let booking = rows
                .get_mut(&id)
                .ok_or_else(|| CoreError::NotFound("booking not found".into()))?;
            booking.status = status;
            booking.updated_at = Utc::now();
            Ok(())
        }

        async fn record_cancellation(
            &self,
            id: Uuid,
            refund: &RefundRecord,
            payment_status: PaymentStatus,
        ) -> CoreResult<()> {
            let mut rows = self.rows.lock().unwrap();
            let booking = rows
                .get_mut(&id)
                .ok_or_else(|| CoreError::NotFound("booking not found".into()))?;
            booking.refund = Some(refund.clone());
            booking.status = BookingStatus::Cancelled;
            booking.payment.status = payment_status;
            booking.updated_at = Utc::now();
            Ok(())
        }
    }

    struct MemoryTours {
        rows: Mutex<HashMap<Uuid, Tour>>,
    }

    impl MemoryTours {
        fn with(tour: Tour) -> Self {
            let mut rows = HashMap::new();
            rows.insert(tour.id, tour);
            Self {
                rows: Mutex::new(rows),
            }
        }
    }

    #[async_trait]
    impl TourRepository for MemoryTours {
        async fn get(&self, id: Uuid) -> CoreResult<Option<Tour>> {
            Ok(self.rows.lock().unwrap().get(&id).cloned())
        }

        async fn list_active(&self) -> CoreResult<Vec<Tour>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|t| t.is_active)
                .cloned()
                .collect())
        }

        async fn insert(&self, _draft: TourDraft) -> CoreResult<Tour> {
            unimplemented!("not exercised by booking tests")
        }

        async fn update(&self, _id: Uuid, _patch: TourPatch) -> CoreResult<Tour> {
            unimplemented!("not exercised by booking tests")
        }

        async fn soft_delete(&self, _id: Uuid) -> CoreResult<()> {
            unimplemented!("not exercised by booking tests")
        }

        async fn publish(&self, _id: Uuid) -> CoreResult<()> {
            unimplemented!("not exercised by booking tests")
        }
    }

    struct MemoryOffers {
        rows: Mutex<HashMap<String, Offer>>,
    }

    impl MemoryOffers {
        fn empty() -> Self {
            Self {
                rows: Mutex::new(HashMap::new()),
            }
        }

        fn with(offer: Offer) -> Self {
            let mut rows = HashMap::new();
            rows.insert(offer.code.clone(), offer);
            Self {
                rows: Mutex::new(rows),
            }
        }

        fn used_count(&self, code: &str) -> i64 {
            self.rows.lock().unwrap().get(code).unwrap().used_count
        }
    }

    #[async_trait]
    impl OfferRepository for MemoryOffers {
        async fn get(&self, id: Uuid) -> CoreResult<Option<Offer>> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .find(|o| o.id == id)
                .cloned())
        }

        async fn get_by_code(&self, code: &str) -> CoreResult<Option<Offer>> {
            Ok(self.rows.lock().unwrap().get(code).cloned())
        }

        async fn insert(&self, _draft: OfferDraft) -> CoreResult<Offer> {
            unimplemented!("not exercised by booking tests")
        }

        async fn update(&self, _id: Uuid, _patch: OfferPatch) -> CoreResult<Offer> {
            unimplemented!("not exercised by booking tests")
        }

        async fn soft_delete(&self, _id: Uuid) -> CoreResult<()> {
            unimplemented!("not exercised by booking tests")
        }

        async fn increment_usage(&self, code: &str) -> CoreResult<()> {
            let mut rows = self.rows.lock().unwrap();
            let offer = rows
                .get_mut(code)
                .ok_or_else(|| CoreError::NotFound("coupon not found".into()))?;
            offer.used_count += 1;
            Ok(())
        }
    }

    struct MemoryCustomers {
        phones: Mutex<HashMap<Uuid, String>>,
        fail_updates: bool,
    }

    impl MemoryCustomers {
        fn new() -> Self {
            Self {
                phones: Mutex::new(HashMap::new()),
                fail_updates: false,
            }
        }

        fn failing() -> Self {
            Self {
                phones: Mutex::new(HashMap::new()),
                fail_updates: true,
            }
        }

        fn phone_of(&self, id: Uuid) -> Option<String> {
            self.phones.lock().unwrap().get(&id).cloned()
        }
    }

    #[async_trait]
    impl CustomerRepository for MemoryCustomers {
        async fn get(&self, _id: Uuid) -> CoreResult<Option<Customer>> {
            Ok(None)
        }

        async fn register(&self, phone: Option<&str>) -> CoreResult<Customer> {
            let mut phones = self.phones.lock().unwrap();
            let id = match phone {
                Some(p) => phones
                    .iter()
                    .find(|(_, v)| v.as_str() == p)
                    .map(|(id, _)| *id)
                    .unwrap_or_else(|| {
                        let id = Uuid::new_v4();
                        phones.insert(id, p.to_string());
                        id
                    }),
                None => Uuid::new_v4(),
            };
            Ok(Customer {
                id,
                name: "Guest".into(),
                email: String::new(),
                phone: phone.map(str::to_string),
            })
        }

        async fn update_phone(&self, id: Uuid, phone: &str) -> CoreResult<()> {
            if self.fail_updates {
                return Err(CoreError::Dependency("store unavailable".into()));
            }
            self.phones.lock().unwrap().insert(id, phone.to_string());
            Ok(())
        }
    }

    fn tour_priced(adult: i64, child: i64, infant: i64) -> Tour {
        Tour {
            id: Uuid::new_v4(),
            destination_id: None,
            city_id: None,
            state_id: None,
            title: "Hill Station Special".into(),
            description: None,
            duration_days: 3,
            prices: PriceTable {
                adult,
                child,
                infant,
            },
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn contact(phone: &str) -> ContactInfo {
        ContactInfo {
            email: "traveler@example.com".into(),
            phone: phone.into(),
        }
    }

    fn adult(name: &str) -> Traveler {
        Traveler {
            name: name.into(),
            age: 30,
            traveler_type: roam_catalog::TravelerType::Adult,
            gender: Gender::Other,
        }
    }

    use crate::models::Gender;

    struct Fixture {
        engine: BookingEngine,
        bookings: Arc<MemoryBookings>,
        offers: Arc<MemoryOffers>,
        customers: Arc<MemoryCustomers>,
        tour_id: Uuid,
    }

    fn fixture_with(tour: Tour, offers: MemoryOffers, customers: MemoryCustomers) -> Fixture {
        let tour_id = tour.id;
        let bookings = Arc::new(MemoryBookings::new());
        let offers = Arc::new(offers);
        let customers = Arc::new(customers);
        let engine = BookingEngine::new(
            bookings.clone(),
            Arc::new(MemoryTours::with(tour)),
            offers.clone(),
            customers.clone(),
        );
        Fixture {
            engine,
            bookings,
            offers,
            customers,
            tour_id,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(
            tour_priced(1000, 500, 0),
            MemoryOffers::empty(),
            MemoryCustomers::new(),
        )
    }

    fn direct_request(tour_id: Uuid, days_out: i64) -> CreateBookingRequest {
        CreateBookingRequest {
            tour_id,
            travelers: vec![adult("Asha"), adult("Ravi")],
            contact: contact("9876543210"),
            travel_start: Utc::now() + Duration::days(days_out),
            travel_end: Utc::now() + Duration::days(days_out + 3),
            special_requests: None,
        }
    }

    fn verified_request(tour_id: Uuid, base: i64, coupon: Option<CouponInput>) -> VerifiedBookingRequest {
        VerifiedBookingRequest {
            tour_id,
            travelers: vec![adult("Asha"), adult("Ravi")],
            contact: contact("9876543210"),
            travel_start: Utc::now() + Duration::days(20),
            travel_end: Utc::now() + Duration::days(24),
            base_amount: base,
            payment_reference: "pay_test_123".into(),
            payment_method: "upi".into(),
            coupon,
            special_requests: None,
        }
    }

    #[tokio::test]
    async fn direct_booking_prices_two_adults() {
        let fx = fixture();
        let customer = Uuid::new_v4();
        let booking = fx
            .engine
            .create_booking(customer, direct_request(fx.tour_id, 30))
            .await
            .unwrap();

        assert_eq!(booking.pricing.base_price, 2000);
        assert_eq!(booking.pricing.total_amount, 2000);
        assert_eq!(booking.pricing.final_amount, 2000);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.payment.status, PaymentStatus::Pending);
        assert_eq!(booking.booking_number, "BK000001");
    }

    #[tokio::test]
    async fn direct_booking_mixes_traveler_types() {
        let fx = fixture();
        let mut req = direct_request(fx.tour_id, 30);
        req.travelers.push(Traveler {
            name: "Meera".into(),
            age: 8,
            traveler_type: roam_catalog::TravelerType::Child,
            gender: Gender::Female,
        });
        let booking = fx
            .engine
            .create_booking(Uuid::new_v4(), req)
            .await
            .unwrap();
        assert_eq!(booking.pricing.final_amount, 2500);
    }

    #[tokio::test]
    async fn missing_tour_is_not_found() {
        let fx = fixture();
        let err = fx
            .engine
            .create_booking(Uuid::new_v4(), direct_request(Uuid::new_v4(), 30))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn empty_traveler_list_is_rejected() {
        let fx = fixture();
        let mut req = direct_request(fx.tour_id, 30);
        req.travelers.clear();
        let err = fx
            .engine
            .create_booking(Uuid::new_v4(), req)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn inverted_travel_window_is_rejected() {
        let fx = fixture();
        let mut req = direct_request(fx.tour_id, 30);
        req.travel_end = req.travel_start - Duration::days(1);
        let err = fx
            .engine
            .create_booking(Uuid::new_v4(), req)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn verified_booking_lands_confirmed_and_paid() {
        let fx = fixture();
        let booking = fx
            .engine
            .create_verified_booking(Uuid::new_v4(), verified_request(fx.tour_id, 4000, None))
            .await
            .unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.payment.status, PaymentStatus::Paid);
        assert_eq!(booking.pricing.final_amount, 4000);
        assert!(booking.payment.payment_date.is_some());
    }

    fn summer_offer() -> Offer {
        Offer {
            id: Uuid::new_v4(),
            code: "SAVE500".into(),
            title: "Flat 500 off".into(),
            status: OfferStatus::Active,
            discount: roam_offer::Discount::Flat { value: 500 },
            valid_from: Utc::now().date_naive() - Duration::days(1),
            valid_until: Utc::now().date_naive() + Duration::days(30),
            min_amount: 0,
            usage_limit: None,
            used_count: 3,
            applies_to: Applicability::All,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn coupon_is_snapshotted_and_usage_counted() {
        let fx = fixture_with(
            tour_priced(1000, 500, 0),
            MemoryOffers::with(summer_offer()),
            MemoryCustomers::new(),
        );
        let req = verified_request(
            fx.tour_id,
            4000,
            Some(CouponInput {
                code: "SAVE500".into(),
                discount_amount: 500,
            }),
        );
        let booking = fx
            .engine
            .create_verified_booking(Uuid::new_v4(), req)
            .await
            .unwrap();

        assert_eq!(booking.pricing.final_amount, 3500);
        let coupon = booking.coupon.unwrap();
        assert_eq!(coupon.code, "SAVE500");
        assert_eq!(coupon.discount_amount, 500);
        assert_eq!(coupon.discount_type, "flat");
        assert_eq!(fx.offers.used_count("SAVE500"), 4);
    }

    #[tokio::test]
    async fn unknown_coupon_code_is_not_found() {
        let fx = fixture();
        let req = verified_request(
            fx.tour_id,
            4000,
            Some(CouponInput {
                code: "NOPE".into(),
                discount_amount: 500,
            }),
        );
        let err = fx
            .engine
            .create_verified_booking(Uuid::new_v4(), req)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn discount_larger_than_base_clamps_to_zero() {
        let fx = fixture_with(
            tour_priced(1000, 500, 0),
            MemoryOffers::with(summer_offer()),
            MemoryCustomers::new(),
        );
        let req = verified_request(
            fx.tour_id,
            300,
            Some(CouponInput {
                code: "SAVE500".into(),
                discount_amount: 500,
            }),
        );
        let booking = fx
            .engine
            .create_verified_booking(Uuid::new_v4(), req)
            .await
            .unwrap();
        assert_eq!(booking.pricing.final_amount, 0);
    }

    #[tokio::test]
    async fn valid_phone_is_synced_to_profile() {
        let fx = fixture();
        let customer = Uuid::new_v4();
        fx.engine
            .create_verified_booking(customer, verified_request(fx.tour_id, 4000, None))
            .await
            .unwrap();
        assert_eq!(fx.customers.phone_of(customer).as_deref(), Some("9876543210"));
    }

    #[tokio::test]
    async fn phone_sync_lands_on_registered_customer() {
        let fx = fixture();
        // A phone login provisions the customer row the token carries,
        // so the booking's contact phone has a row to land on.
        let customer = fx.customers.register(Some("9876543210")).await.unwrap();
        let again = fx.customers.register(Some("9876543210")).await.unwrap();
        assert_eq!(customer.id, again.id);

        fx.engine
            .create_verified_booking(customer.id, verified_request(fx.tour_id, 4000, None))
            .await
            .unwrap();
        assert_eq!(
            fx.customers.phone_of(customer.id).as_deref(),
            Some("9876543210")
        );
    }

    #[tokio::test]
    async fn bad_phone_is_not_synced() {
        let fx = fixture();
        let customer = Uuid::new_v4();
        let mut req = verified_request(fx.tour_id, 4000, None);
        req.contact.phone = "+91-98765".into();
        fx.engine.create_verified_booking(customer, req).await.unwrap();
        assert_eq!(fx.customers.phone_of(customer), None);
    }

    #[tokio::test]
    async fn phone_sync_failure_does_not_fail_booking() {
        let fx = fixture_with(
            tour_priced(1000, 500, 0),
            MemoryOffers::empty(),
            MemoryCustomers::failing(),
        );
        let booking = fx
            .engine
            .create_verified_booking(Uuid::new_v4(), verified_request(fx.tour_id, 4000, None))
            .await;
        assert!(booking.is_ok());
    }

    #[tokio::test]
    async fn cancellation_twenty_days_out_refunds_75_percent() {
        let fx = fixture();
        let customer = Uuid::new_v4();
        let mut req = verified_request(fx.tour_id, 4000, None);
        let now = Utc::now();
        req.travel_start = now + Duration::days(20);
        req.travel_end = now + Duration::days(24);
        let booking = fx
            .engine
            .create_verified_booking(customer, req)
            .await
            .unwrap();

        let outcome = fx
            .engine
            .cancel_booking_at(customer, booking.id, now)
            .await
            .unwrap();

        assert_eq!(outcome.refund.refund_percentage, 75);
        assert_eq!(outcome.refund.refund_amount, 3000);
        assert_eq!(outcome.refund.cancellation_fee, 1000);
        assert_eq!(outcome.payment_status, PaymentStatus::Refunded);

        let stored = fx.bookings.get(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Cancelled);
        assert_eq!(stored.payment.status, PaymentStatus::Refunded);
        assert_eq!(stored.refund.unwrap(), outcome.refund);
    }

    #[tokio::test]
    async fn non_cancellable_policy_reports_zero_refund() {
        let fx = fixture();
        let customer = Uuid::new_v4();
        let now = Utc::now();
        let mut req = verified_request(fx.tour_id, 4000, None);
        req.travel_start = now + Duration::days(2);
        req.travel_end = now + Duration::days(5);
        let booking = fx
            .engine
            .create_verified_booking(customer, req)
            .await
            .unwrap();

        // Flip the stored policy the way an operator would.
        {
            let mut stored = fx.bookings.get(booking.id).await.unwrap().unwrap();
            stored.policy.can_cancel = false;
            fx.bookings.put(stored);
        }

        let outcome = fx
            .engine
            .cancel_booking_at(customer, booking.id, now)
            .await
            .unwrap();
        assert!(!outcome.refund.refundable);
        assert_eq!(outcome.refund.refund_amount, 0);
        assert_eq!(outcome.refund.cancellation_fee, 4000);
        // No refund happened, so the payment stays PAID.
        assert_eq!(outcome.payment_status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn cancelling_twice_is_a_conflict() {
        let fx = fixture();
        let customer = Uuid::new_v4();
        let booking = fx
            .engine
            .create_verified_booking(customer, verified_request(fx.tour_id, 4000, None))
            .await
            .unwrap();
        fx.engine.cancel_booking(customer, booking.id).await.unwrap();

        let before = fx.bookings.get(booking.id).await.unwrap().unwrap();
        let err = fx
            .engine
            .cancel_booking(customer, booking.id)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));

        // Record unchanged by the failed second attempt.
        let after = fx.bookings.get(booking.id).await.unwrap().unwrap();
        assert_eq!(after.refund, before.refund);
        assert_eq!(after.status, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn completed_booking_cannot_be_cancelled() {
        let fx = fixture();
        let customer = Uuid::new_v4();
        let booking = fx
            .engine
            .create_verified_booking(customer, verified_request(fx.tour_id, 4000, None))
            .await
            .unwrap();
        fx.bookings
            .update_status(booking.id, BookingStatus::Completed)
            .await
            .unwrap();

        let err = fx
            .engine
            .cancel_booking(customer, booking.id)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
        let stored = fx.bookings.get(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Completed);
        assert!(stored.refund.is_none());
    }

    #[tokio::test]
    async fn only_the_owner_may_cancel() {
        let fx = fixture();
        let owner = Uuid::new_v4();
        let booking = fx
            .engine
            .create_verified_booking(owner, verified_request(fx.tour_id, 4000, None))
            .await
            .unwrap();
        let err = fx
            .engine
            .cancel_booking(Uuid::new_v4(), booking.id)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[tokio::test]
    async fn legacy_total_backs_the_refund_when_snapshot_is_empty() {
        let fx = fixture();
        let customer = Uuid::new_v4();
        let now = Utc::now();
        let booking = fx
            .engine
            .create_verified_booking(customer, verified_request(fx.tour_id, 4000, None))
            .await
            .unwrap();
        {
            let mut stored = fx.bookings.get(booking.id).await.unwrap().unwrap();
            stored.pricing.final_amount = 0;
            stored.legacy_total = Some(2600);
            stored.travel_start = now + Duration::days(40);
            fx.bookings.put(stored);
        }
        let outcome = fx
            .engine
            .cancel_booking_at(customer, booking.id, now)
            .await
            .unwrap();
        assert_eq!(outcome.refund.total_paid, 2600);
        assert_eq!(outcome.refund.refund_amount, 2600);
    }

    fn admin(role: Role, assigned: Vec<Uuid>) -> AdminUser {
        AdminUser {
            id: Uuid::new_v4(),
            name: "Staff".into(),
            email: "staff@example.com".into(),
            role,
            is_active: true,
            assigned_data: AssignedData {
                bookings: assigned,
                inquiries: vec![],
            },
        }
    }

    #[tokio::test]
    async fn admin_progresses_happy_path() {
        let fx = fixture();
        let customer = Uuid::new_v4();
        let booking = fx
            .engine
            .create_booking(customer, direct_request(fx.tour_id, 30))
            .await
            .unwrap();
        let staff = admin(Role::Admin, vec![]);

        let confirmed = fx
            .engine
            .update_status(&staff, booking.id, BookingStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.status, BookingStatus::Confirmed);

        let completed = fx
            .engine
            .update_status(&staff, booking.id, BookingStatus::Completed)
            .await
            .unwrap();
        assert_eq!(completed.status, BookingStatus::Completed);

        let err = fx
            .engine
            .update_status(&staff, booking.id, BookingStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn manager_is_limited_to_assigned_bookings() {
        let fx = fixture();
        let booking = fx
            .engine
            .create_booking(Uuid::new_v4(), direct_request(fx.tour_id, 30))
            .await
            .unwrap();

        let outsider = admin(Role::Manager, vec![]);
        let err = fx
            .engine
            .update_status(&outsider, booking.id, BookingStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));

        let assigned = admin(Role::Manager, vec![booking.id]);
        assert!(fx
            .engine
            .update_status(&assigned, booking.id, BookingStatus::Confirmed)
            .await
            .is_ok());
    }
}
