pub mod engine;
pub mod models;
pub mod refund;
pub mod repository;

pub use engine::{BookingEngine, CancellationOutcome, CouponInput, CreateBookingRequest,
    VerifiedBookingRequest};
pub use models::{Booking, BookingStatus, CancellationPolicy, ContactInfo, CouponApplication,
    Gender, PaymentInfo, PaymentStatus, PricingSnapshot, RefundRecord, Traveler};
pub use repository::{BookingDraft, BookingRepository};
