use crate::identity::{AdminDraft, AdminPatch, AdminUser, Customer};
use crate::CoreResult;
use async_trait::async_trait;
use uuid::Uuid;

/// Admin identity access. The API middleware re-reads `is_active` on
/// every admin request; role claims themselves come from the token.
#[async_trait]
pub trait AdminUserRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> CoreResult<Option<AdminUser>>;

    async fn insert(&self, draft: AdminDraft) -> CoreResult<AdminUser>;

    async fn update(&self, id: Uuid, patch: AdminPatch) -> CoreResult<AdminUser>;

    /// Soft delete: deactivates the account, the row stays.
    async fn deactivate(&self, id: Uuid) -> CoreResult<()>;
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> CoreResult<Option<Customer>>;

    /// Provision the customer row a freshly issued token points at.
    /// A phone that is already registered returns the existing
    /// customer; guest registrations (no phone) always create a new
    /// row.
    async fn register(&self, phone: Option<&str>) -> CoreResult<Customer>;

    /// Best-effort profile denormalization from a booking's contact
    /// phone. Callers log and move on if this fails.
    async fn update_phone(&self, id: Uuid, phone: &str) -> CoreResult<()>;
}

/// Key/value store for site content and settings mutated through the
/// approval workflow (content_update / settings_change actions).
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn upsert(&self, key: &str, value: serde_json::Value) -> CoreResult<()>;

    async fn get(&self, key: &str) -> CoreResult<Option<serde_json::Value>>;
}
