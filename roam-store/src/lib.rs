pub mod app_config;
pub mod approval_repo;
pub mod booking_repo;
pub mod database;
pub mod events;
pub mod identity_repo;
pub mod offer_repo;
pub mod redis_repo;
pub mod tour_repo;

pub use app_config::Config;
pub use approval_repo::StoreApprovalRepository;
pub use booking_repo::StoreBookingRepository;
pub use database::DbClient;
pub use events::EventProducer;
pub use identity_repo::{StoreAdminRepository, StoreCustomerRepository, StoreSettingsRepository};
pub use offer_repo::StoreOfferRepository;
pub use redis_repo::RedisClient;
pub use tour_repo::StoreTourRepository;

use roam_core::CoreError;

/// Uniform sqlx → core error mapping. Unique-constraint violations
/// become Conflict so callers can retry; everything else is a
/// dependency failure.
pub(crate) fn map_db_err(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some("23505") {
            return CoreError::Conflict("duplicate key".into());
        }
    }
    CoreError::Dependency(err.to_string())
}

/// Decode a JSONB column into its domain type.
pub(crate) fn from_jsonb<T: serde::de::DeserializeOwned>(
    column: &str,
    value: serde_json::Value,
) -> Result<T, CoreError> {
    serde_json::from_value(value)
        .map_err(|e| CoreError::Dependency(format!("corrupt {} column: {}", column, e)))
}

/// Encode a domain value for a JSONB column.
pub(crate) fn to_jsonb<T: serde::Serialize>(column: &str, value: &T) -> Result<serde_json::Value, CoreError> {
    serde_json::to_value(value)
        .map_err(|e| CoreError::Dependency(format!("cannot encode {} column: {}", column, e)))
}

/// Parse a status-like enum stored as text.
pub(crate) fn parse_enum<T: serde::de::DeserializeOwned>(kind: &str, raw: &str) -> Result<T, CoreError> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| CoreError::Dependency(format!("unknown {}: {}", kind, raw)))
}
