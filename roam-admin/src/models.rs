use chrono::{DateTime, Utc};
use roam_catalog::{TourDraft, TourPatch};
use roam_core::identity::{AdminDraft, AdminPatch};
use roam_offer::{OfferDraft, OfferPatch};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Approval lifecycle. `Approved` and `Rejected` are terminal; the one
/// exception is the compensating revert back to `Pending` when the
/// processor fails after a decision was written.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "PENDING",
            ApprovalStatus::Approved => "APPROVED",
            ApprovalStatus::Rejected => "REJECTED",
        }
    }
}

/// The change a staff member is asking for. Closed set: an unknown
/// action cannot be filed, and the processor match is exhaustive, so a
/// new action variant fails compilation until it is handled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action_type", rename_all = "snake_case")]
pub enum ApprovalAction {
    PackageCreate { package: TourDraft },
    PackageUpdate { entity_id: Uuid, patch: TourPatch },
    PackageDelete { entity_id: Uuid },
    PackagePublish { entity_id: Uuid },
    OfferCreate { offer: OfferDraft },
    OfferUpdate { entity_id: Uuid, patch: OfferPatch },
    OfferDelete { entity_id: Uuid },
    AdminCreate { admin: AdminDraft },
    AdminUpdate { entity_id: Uuid, patch: AdminPatch },
    AdminDelete { entity_id: Uuid },
    ContentUpdate { key: String, value: serde_json::Value },
    SettingsChange { key: String, value: serde_json::Value },
}

impl ApprovalAction {
    /// Short label for logs and list views.
    pub fn kind(&self) -> &'static str {
        match self {
            ApprovalAction::PackageCreate { .. } => "package_create",
            ApprovalAction::PackageUpdate { .. } => "package_update",
            ApprovalAction::PackageDelete { .. } => "package_delete",
            ApprovalAction::PackagePublish { .. } => "package_publish",
            ApprovalAction::OfferCreate { .. } => "offer_create",
            ApprovalAction::OfferUpdate { .. } => "offer_update",
            ApprovalAction::OfferDelete { .. } => "offer_delete",
            ApprovalAction::AdminCreate { .. } => "admin_create",
            ApprovalAction::AdminUpdate { .. } => "admin_update",
            ApprovalAction::AdminDelete { .. } => "admin_delete",
            ApprovalAction::ContentUpdate { .. } => "content_update",
            ApprovalAction::SettingsChange { .. } => "settings_change",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminApproval {
    pub id: Uuid,
    pub action: ApprovalAction,
    pub requested_by: Uuid,
    pub requested_by_name: String,
    pub status: ApprovalStatus,
    pub rejection_reason: Option<String>,
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use roam_catalog::PriceTable;

    #[test]
    fn action_serializes_with_snake_case_tag() {
        let action = ApprovalAction::PackageDelete {
            entity_id: Uuid::nil(),
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["action_type"], "package_delete");
    }

    #[test]
    fn unknown_action_type_is_rejected() {
        let raw = r#"{"action_type": "drop_database"}"#;
        assert!(serde_json::from_str::<ApprovalAction>(raw).is_err());
    }

    #[test]
    fn package_create_round_trips() {
        let action = ApprovalAction::PackageCreate {
            package: TourDraft {
                destination_id: None,
                city_id: None,
                state_id: None,
                title: "Desert Safari".into(),
                description: None,
                duration_days: 2,
                prices: PriceTable {
                    adult: 1500,
                    child: 750,
                    infant: 0,
                },
                is_active: None,
            },
        };
        let json = serde_json::to_string(&action).unwrap();
        let back: ApprovalAction = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind(), "package_create");
    }
}
