use roam_admin::ApprovalEngine;
use roam_booking::BookingEngine;
use roam_catalog::TourRepository;
use roam_core::notify::SmsChannel;
use roam_core::payment::PaymentGateway;
use roam_core::repository::{AdminUserRepository, CustomerRepository};
use roam_offer::OfferRepository;
use roam_store::app_config::BookingRules;
use roam_store::{EventProducer, RedisClient};
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct Topics {
    pub booking: String,
    pub approval: String,
}

#[derive(Clone)]
pub struct AppState {
    pub redis: Arc<RedisClient>,
    pub kafka: Arc<EventProducer>,
    pub bookings: Arc<BookingEngine>,
    pub approvals: Arc<ApprovalEngine>,
    pub tours: Arc<dyn TourRepository>,
    pub offers: Arc<dyn OfferRepository>,
    pub admins: Arc<dyn AdminUserRepository>,
    pub customers: Arc<dyn CustomerRepository>,
    pub payments: Arc<dyn PaymentGateway>,
    pub sms: Arc<dyn SmsChannel>,
    pub auth: AuthConfig,
    pub topics: Topics,
    pub booking_rules: BookingRules,
}
