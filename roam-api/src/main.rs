use roam_admin::{ApprovalEngine, CatalogProcessor};
use roam_api::worker::{start_notification_worker, NotificationChannels};
use roam_api::{
    app,
    state::{AppState, AuthConfig, Topics},
};
use roam_booking::BookingEngine;
use roam_core::notify::{LogEmailChannel, LogReceiptRenderer, LogSmsChannel, LogWhatsAppChannel};
use roam_core::payment::MockPaymentGateway;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roam_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = roam_store::Config::load()?;
    tracing::info!("Starting Roam API on port {}", config.server.port);

    let db = roam_store::DbClient::new(&config.database.url).await?;
    db.migrate().await?;

    let redis = Arc::new(roam_store::RedisClient::new(&config.redis.url).await?);
    let kafka = Arc::new(roam_store::EventProducer::new(&config.kafka.brokers)?);

    let booking_repo = Arc::new(roam_store::StoreBookingRepository::new(db.pool.clone()));
    let tour_repo = Arc::new(roam_store::StoreTourRepository::new(db.pool.clone()));
    let offer_repo = Arc::new(roam_store::StoreOfferRepository::new(db.pool.clone()));
    let admin_repo = Arc::new(roam_store::StoreAdminRepository::new(db.pool.clone()));
    let customer_repo = Arc::new(roam_store::StoreCustomerRepository::new(db.pool.clone()));
    let settings_repo = Arc::new(roam_store::StoreSettingsRepository::new(db.pool.clone()));
    let approval_repo = Arc::new(roam_store::StoreApprovalRepository::new(db.pool.clone()));

    let bookings = Arc::new(BookingEngine::new(
        booking_repo,
        tour_repo.clone(),
        offer_repo.clone(),
        customer_repo.clone(),
    ));
    let processor = Arc::new(CatalogProcessor::new(
        tour_repo.clone(),
        offer_repo.clone(),
        admin_repo.clone(),
        settings_repo,
    ));
    let approvals = Arc::new(ApprovalEngine::new(approval_repo, processor));

    tokio::spawn(start_notification_worker(
        config.kafka.brokers.clone(),
        "roam-notifications".to_string(),
        config.kafka.booking_topic.clone(),
        NotificationChannels {
            email: Arc::new(LogEmailChannel),
            sms: Arc::new(LogSmsChannel),
            whatsapp: Arc::new(LogWhatsAppChannel),
            receipts: Arc::new(LogReceiptRenderer),
        },
    ));

    let app_state = AppState {
        redis,
        kafka,
        bookings,
        approvals,
        tours: tour_repo,
        offers: offer_repo,
        admins: admin_repo,
        customers: customer_repo,
        payments: Arc::new(MockPaymentGateway),
        sms: Arc::new(LogSmsChannel),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        topics: Topics {
            booking: config.kafka.booking_topic.clone(),
            approval: config.kafka.approval_topic.clone(),
        },
        booking_rules: config.booking.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
