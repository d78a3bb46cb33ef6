use crate::pricing::PriceTable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Top-level geography node. Named `StateRegion` to avoid the obvious
/// keyword clash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateRegion {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub id: Uuid,
    pub state_id: Uuid,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    pub id: Uuid,
    pub city_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

/// A bookable tour package. Read model for the booking engine; mutated
/// only through the approval processor (or directly by a Superadmin).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tour {
    pub id: Uuid,
    pub destination_id: Option<Uuid>,
    pub city_id: Option<Uuid>,
    pub state_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub duration_days: i32,
    pub prices: PriceTable,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create payload carried inside a package_create approval. `is_active`
/// is optional: an approved package defaults to publicly visible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourDraft {
    pub destination_id: Option<Uuid>,
    pub city_id: Option<Uuid>,
    pub state_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub duration_days: i32,
    pub prices: PriceTable,
    pub is_active: Option<bool>,
}

/// Partial update carried inside a package_update approval. `None`
/// preserves the stored value, which is what keeps an update from
/// silently unpublishing a package.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TourPatch {
    pub destination_id: Option<Uuid>,
    pub city_id: Option<Uuid>,
    pub state_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_days: Option<i32>,
    pub prices: Option<PriceTable>,
    pub is_active: Option<bool>,
}

impl Tour {
    /// Apply a partial update in place. Field-by-field so that absent
    /// patch fields keep their current values.
    pub fn apply_patch(&mut self, patch: TourPatch) {
        if let Some(v) = patch.destination_id {
            self.destination_id = Some(v);
        }
        if let Some(v) = patch.city_id {
            self.city_id = Some(v);
        }
        if let Some(v) = patch.state_id {
            self.state_id = Some(v);
        }
        if let Some(v) = patch.title {
            self.title = v;
        }
        if let Some(v) = patch.description {
            self.description = Some(v);
        }
        if let Some(v) = patch.duration_days {
            self.duration_days = v;
        }
        if let Some(v) = patch.prices {
            self.prices = v;
        }
        if let Some(v) = patch.is_active {
            self.is_active = v;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tour() -> Tour {
        Tour {
            id: Uuid::new_v4(),
            destination_id: None,
            city_id: None,
            state_id: None,
            title: "Backwater Escape".into(),
            description: None,
            duration_days: 4,
            prices: PriceTable {
                adult: 1000,
                child: 500,
                infant: 0,
            },
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn patch_without_is_active_preserves_visibility() {
        let mut tour = sample_tour();
        tour.apply_patch(TourPatch {
            title: Some("Backwater Escape Deluxe".into()),
            ..Default::default()
        });
        assert!(tour.is_active);
        assert_eq!(tour.title, "Backwater Escape Deluxe");
    }

    #[test]
    fn patch_can_unpublish_explicitly() {
        let mut tour = sample_tour();
        tour.apply_patch(TourPatch {
            is_active: Some(false),
            ..Default::default()
        });
        assert!(!tour.is_active);
    }
}
