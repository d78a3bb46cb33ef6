use crate::{from_jsonb, map_db_err, parse_enum, to_jsonb};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use roam_core::{CoreError, CoreResult};
use roam_offer::{Offer, OfferDraft, OfferPatch, OfferRepository, OfferStatus};
use sqlx::PgPool;
use uuid::Uuid;

pub struct StoreOfferRepository {
    pool: PgPool,
}

impl StoreOfferRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OfferRow {
    id: Uuid,
    code: String,
    title: String,
    status: String,
    discount: serde_json::Value,
    valid_from: NaiveDate,
    valid_until: NaiveDate,
    min_amount: i64,
    usage_limit: Option<i64>,
    used_count: i64,
    applies_to: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OfferRow {
    fn into_offer(self) -> CoreResult<Offer> {
        Ok(Offer {
            id: self.id,
            code: self.code,
            title: self.title,
            status: parse_enum("offer status", &self.status)?,
            discount: from_jsonb("discount", self.discount)?,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            min_amount: self.min_amount,
            usage_limit: self.usage_limit,
            used_count: self.used_count,
            applies_to: from_jsonb("applies_to", self.applies_to)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn status_str(status: &OfferStatus) -> &'static str {
    match status {
        OfferStatus::Active => "active",
        OfferStatus::Inactive => "inactive",
        OfferStatus::Expired => "expired",
    }
}

const SELECT_OFFER: &str = "SELECT id, code, title, status, discount, valid_from, valid_until, \
     min_amount, usage_limit, used_count, applies_to, created_at, updated_at FROM offers";

#[async_trait]
impl OfferRepository for StoreOfferRepository {
    async fn get(&self, id: Uuid) -> CoreResult<Option<Offer>> {
        let row = sqlx::query_as::<_, OfferRow>(&format!("{} WHERE id = $1", SELECT_OFFER))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        row.map(OfferRow::into_offer).transpose()
    }

    async fn get_by_code(&self, code: &str) -> CoreResult<Option<Offer>> {
        let row = sqlx::query_as::<_, OfferRow>(&format!(
            "{} WHERE UPPER(code) = UPPER($1)",
            SELECT_OFFER
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;
        row.map(OfferRow::into_offer).transpose()
    }

    async fn insert(&self, draft: OfferDraft) -> CoreResult<Offer> {
        let row = sqlx::query_as::<_, OfferRow>(
            "INSERT INTO offers (id, code, title, status, discount, valid_from, valid_until, \
             min_amount, usage_limit, used_count, applies_to) \
             VALUES ($1, $2, $3, 'active', $4, $5, $6, $7, $8, 0, $9) \
             RETURNING id, code, title, status, discount, valid_from, valid_until, min_amount, \
             usage_limit, used_count, applies_to, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(draft.code.to_uppercase())
        .bind(&draft.title)
        .bind(to_jsonb("discount", &draft.discount)?)
        .bind(draft.valid_from)
        .bind(draft.valid_until)
        .bind(draft.min_amount)
        .bind(draft.usage_limit)
        .bind(to_jsonb("applies_to", &draft.applies_to)?)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;
        row.into_offer()
    }

    async fn update(&self, id: Uuid, patch: OfferPatch) -> CoreResult<Offer> {
        let mut offer = self
            .get(id)
            .await?
            .ok_or_else(|| CoreError::NotFound("offer not found".into()))?;

        if let Some(v) = patch.title {
            offer.title = v;
        }
        if let Some(v) = patch.status {
            offer.status = v;
        }
        if let Some(v) = patch.discount {
            offer.discount = v;
        }
        if let Some(v) = patch.valid_from {
            offer.valid_from = v;
        }
        if let Some(v) = patch.valid_until {
            offer.valid_until = v;
        }
        if let Some(v) = patch.min_amount {
            offer.min_amount = v;
        }
        if let Some(v) = patch.usage_limit {
            offer.usage_limit = v;
        }
        if let Some(v) = patch.applies_to {
            offer.applies_to = v;
        }

        let row = sqlx::query_as::<_, OfferRow>(
            "UPDATE offers SET title = $1, status = $2, discount = $3, valid_from = $4, \
             valid_until = $5, min_amount = $6, usage_limit = $7, applies_to = $8, \
             updated_at = NOW() WHERE id = $9 \
             RETURNING id, code, title, status, discount, valid_from, valid_until, min_amount, \
             usage_limit, used_count, applies_to, created_at, updated_at",
        )
        .bind(&offer.title)
        .bind(status_str(&offer.status))
        .bind(to_jsonb("discount", &offer.discount)?)
        .bind(offer.valid_from)
        .bind(offer.valid_until)
        .bind(offer.min_amount)
        .bind(offer.usage_limit)
        .bind(to_jsonb("applies_to", &offer.applies_to)?)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;
        row.into_offer()
    }

    async fn soft_delete(&self, id: Uuid) -> CoreResult<()> {
        let result = sqlx::query(
            "UPDATE offers SET status = 'inactive', updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound("offer not found".into()));
        }
        Ok(())
    }

    async fn increment_usage(&self, code: &str) -> CoreResult<()> {
        // Single-statement increment; no read-modify-write race.
        let result = sqlx::query(
            "UPDATE offers SET used_count = used_count + 1, updated_at = NOW() \
             WHERE UPPER(code) = UPPER($1)",
        )
        .bind(code)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound("coupon not found".into()));
        }
        Ok(())
    }
}
