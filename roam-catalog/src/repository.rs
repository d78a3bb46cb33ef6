use crate::tour::{Tour, TourDraft, TourPatch};
use async_trait::async_trait;
use roam_core::CoreResult;
use uuid::Uuid;

/// Tour catalog access. Deletion is always a soft delete; the row stays
/// for the bookings that reference it.
#[async_trait]
pub trait TourRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> CoreResult<Option<Tour>>;

    async fn list_active(&self) -> CoreResult<Vec<Tour>>;

    async fn insert(&self, draft: TourDraft) -> CoreResult<Tour>;

    async fn update(&self, id: Uuid, patch: TourPatch) -> CoreResult<Tour>;

    /// Sets `is_active = false`. Never a physical delete.
    async fn soft_delete(&self, id: Uuid) -> CoreResult<()>;

    /// Sets `is_active = true` on an existing tour.
    async fn publish(&self, id: Uuid) -> CoreResult<()>;
}
