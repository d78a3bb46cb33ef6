use crate::{from_jsonb, map_db_err, to_jsonb};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roam_catalog::{Tour, TourDraft, TourPatch, TourRepository};
use roam_core::{CoreError, CoreResult};
use sqlx::PgPool;
use uuid::Uuid;

pub struct StoreTourRepository {
    pool: PgPool,
}

impl StoreTourRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TourRow {
    id: Uuid,
    destination_id: Option<Uuid>,
    city_id: Option<Uuid>,
    state_id: Option<Uuid>,
    title: String,
    description: Option<String>,
    duration_days: i32,
    prices: serde_json::Value,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TourRow {
    fn into_tour(self) -> CoreResult<Tour> {
        Ok(Tour {
            id: self.id,
            destination_id: self.destination_id,
            city_id: self.city_id,
            state_id: self.state_id,
            title: self.title,
            description: self.description,
            duration_days: self.duration_days,
            prices: from_jsonb("prices", self.prices)?,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_TOUR: &str = "SELECT id, destination_id, city_id, state_id, title, description, \
     duration_days, prices, is_active, created_at, updated_at FROM tours";

#[async_trait]
impl TourRepository for StoreTourRepository {
    async fn get(&self, id: Uuid) -> CoreResult<Option<Tour>> {
        let row = sqlx::query_as::<_, TourRow>(&format!("{} WHERE id = $1", SELECT_TOUR))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        row.map(TourRow::into_tour).transpose()
    }

    async fn list_active(&self) -> CoreResult<Vec<Tour>> {
        let rows = sqlx::query_as::<_, TourRow>(&format!(
            "{} WHERE is_active = TRUE ORDER BY created_at DESC",
            SELECT_TOUR
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;
        rows.into_iter().map(TourRow::into_tour).collect()
    }

    async fn insert(&self, draft: TourDraft) -> CoreResult<Tour> {
        let row = sqlx::query_as::<_, TourRow>(
            "INSERT INTO tours (id, destination_id, city_id, state_id, title, description, \
             duration_days, prices, is_active) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING id, destination_id, city_id, state_id, title, description, duration_days, \
             prices, is_active, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(draft.destination_id)
        .bind(draft.city_id)
        .bind(draft.state_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.duration_days)
        .bind(to_jsonb("prices", &draft.prices)?)
        .bind(draft.is_active.unwrap_or(true))
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;
        row.into_tour()
    }

    async fn update(&self, id: Uuid, patch: TourPatch) -> CoreResult<Tour> {
        // Read-modify-write with the patch applied in the domain, so
        // the preserve-on-absent semantics live in one place.
        let mut tour = self
            .get(id)
            .await?
            .ok_or_else(|| CoreError::NotFound("tour not found".into()))?;
        tour.apply_patch(patch);

        let row = sqlx::query_as::<_, TourRow>(
            "UPDATE tours SET destination_id = $1, city_id = $2, state_id = $3, title = $4, \
             description = $5, duration_days = $6, prices = $7, is_active = $8, updated_at = NOW() \
             WHERE id = $9 RETURNING id, destination_id, city_id, state_id, title, description, \
             duration_days, prices, is_active, created_at, updated_at",
        )
        .bind(tour.destination_id)
        .bind(tour.city_id)
        .bind(tour.state_id)
        .bind(&tour.title)
        .bind(&tour.description)
        .bind(tour.duration_days)
        .bind(to_jsonb("prices", &tour.prices)?)
        .bind(tour.is_active)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;
        row.into_tour()
    }

    async fn soft_delete(&self, id: Uuid) -> CoreResult<()> {
        self.set_active(id, false).await
    }

    async fn publish(&self, id: Uuid) -> CoreResult<()> {
        self.set_active(id, true).await
    }
}

impl StoreTourRepository {
    async fn set_active(&self, id: Uuid, active: bool) -> CoreResult<()> {
        let result = sqlx::query(
            "UPDATE tours SET is_active = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(active)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound("tour not found".into()));
        }
        Ok(())
    }
}
