use crate::models::{Offer, OfferDraft, OfferPatch};
use async_trait::async_trait;
use roam_core::CoreResult;
use uuid::Uuid;

#[async_trait]
pub trait OfferRepository: Send + Sync {
    async fn get(&self, id: Uuid) -> CoreResult<Option<Offer>>;

    async fn get_by_code(&self, code: &str) -> CoreResult<Option<Offer>>;

    async fn insert(&self, draft: OfferDraft) -> CoreResult<Offer>;

    async fn update(&self, id: Uuid, patch: OfferPatch) -> CoreResult<Offer>;

    /// Soft delete: marks the offer inactive, the row stays.
    async fn soft_delete(&self, id: Uuid) -> CoreResult<()>;

    /// `used_count + 1`, at-least-once. A single-statement increment,
    /// not a conditional quota guard; concurrent redemptions can
    /// overshoot a usage limit by a small margin.
    async fn increment_usage(&self, code: &str) -> CoreResult<()>;
}
