use crate::models::ApprovalAction;
use async_trait::async_trait;
use roam_catalog::TourRepository;
use roam_core::repository::{AdminUserRepository, SettingsRepository};
use roam_core::CoreResult;
use roam_offer::OfferRepository;
use std::sync::Arc;

/// Applies an approved action to the stores it targets. Invoked only
/// after the decision row is written; a failure here triggers the
/// engine's compensating revert.
#[async_trait]
pub trait ApprovalProcessor: Send + Sync {
    async fn apply(&self, action: &ApprovalAction) -> CoreResult<()>;
}

/// The production processor: dispatches each action to the catalog,
/// offer, admin-identity or settings store.
pub struct CatalogProcessor {
    tours: Arc<dyn TourRepository>,
    offers: Arc<dyn OfferRepository>,
    admins: Arc<dyn AdminUserRepository>,
    settings: Arc<dyn SettingsRepository>,
}

impl CatalogProcessor {
    pub fn new(
        tours: Arc<dyn TourRepository>,
        offers: Arc<dyn OfferRepository>,
        admins: Arc<dyn AdminUserRepository>,
        settings: Arc<dyn SettingsRepository>,
    ) -> Self {
        Self {
            tours,
            offers,
            admins,
            settings,
        }
    }
}

#[async_trait]
impl ApprovalProcessor for CatalogProcessor {
    async fn apply(&self, action: &ApprovalAction) -> CoreResult<()> {
        match action {
            ApprovalAction::PackageCreate { package } => {
                // An approved package goes live unless the request
                // explicitly said otherwise.
                let mut draft = package.clone();
                draft.is_active.get_or_insert(true);
                self.tours.insert(draft).await?;
            }
            ApprovalAction::PackageUpdate { entity_id, patch } => {
                self.tours.update(*entity_id, patch.clone()).await?;
            }
            ApprovalAction::PackageDelete { entity_id } => {
                self.tours.soft_delete(*entity_id).await?;
            }
            ApprovalAction::PackagePublish { entity_id } => {
                self.tours.publish(*entity_id).await?;
            }
            ApprovalAction::OfferCreate { offer } => {
                self.offers.insert(offer.clone()).await?;
            }
            ApprovalAction::OfferUpdate { entity_id, patch } => {
                self.offers.update(*entity_id, patch.clone()).await?;
            }
            ApprovalAction::OfferDelete { entity_id } => {
                self.offers.soft_delete(*entity_id).await?;
            }
            ApprovalAction::AdminCreate { admin } => {
                self.admins.insert(admin.clone()).await?;
            }
            ApprovalAction::AdminUpdate { entity_id, patch } => {
                self.admins.update(*entity_id, patch.clone()).await?;
            }
            ApprovalAction::AdminDelete { entity_id } => {
                self.admins.deactivate(*entity_id).await?;
            }
            ApprovalAction::ContentUpdate { key, value }
            | ApprovalAction::SettingsChange { key, value } => {
                self.settings.upsert(key, value.clone()).await?;
            }
        }
        Ok(())
    }
}
