use crate::{from_jsonb, map_db_err, parse_enum, to_jsonb};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use roam_admin::{AdminApproval, ApprovalDraft, ApprovalRepository, ApprovalStatus};
use roam_core::{CoreError, CoreResult};
use sqlx::PgPool;
use uuid::Uuid;

pub struct StoreApprovalRepository {
    pool: PgPool,
}

impl StoreApprovalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ApprovalRow {
    id: Uuid,
    action: serde_json::Value,
    requested_by: Uuid,
    requested_by_name: String,
    status: String,
    rejection_reason: Option<String>,
    decided_by: Option<Uuid>,
    decided_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ApprovalRow {
    fn into_approval(self) -> CoreResult<AdminApproval> {
        Ok(AdminApproval {
            id: self.id,
            action: from_jsonb("action", self.action)?,
            requested_by: self.requested_by,
            requested_by_name: self.requested_by_name,
            status: parse_enum("approval status", &self.status)?,
            rejection_reason: self.rejection_reason,
            decided_by: self.decided_by,
            decided_at: self.decided_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_APPROVAL: &str = "SELECT id, action, requested_by, requested_by_name, status, \
     rejection_reason, decided_by, decided_at, created_at, updated_at FROM approvals";

#[async_trait]
impl ApprovalRepository for StoreApprovalRepository {
    async fn insert(&self, draft: ApprovalDraft) -> CoreResult<AdminApproval> {
        let row = sqlx::query_as::<_, ApprovalRow>(
            "INSERT INTO approvals (id, action, requested_by, requested_by_name, status) \
             VALUES ($1, $2, $3, $4, 'PENDING') \
             RETURNING id, action, requested_by, requested_by_name, status, rejection_reason, \
             decided_by, decided_at, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(to_jsonb("action", &draft.action)?)
        .bind(draft.requested_by)
        .bind(&draft.requested_by_name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;
        row.into_approval()
    }

    async fn get(&self, id: Uuid) -> CoreResult<Option<AdminApproval>> {
        let row = sqlx::query_as::<_, ApprovalRow>(&format!("{} WHERE id = $1", SELECT_APPROVAL))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        row.map(ApprovalRow::into_approval).transpose()
    }

    async fn list_all(&self) -> CoreResult<Vec<AdminApproval>> {
        let rows = sqlx::query_as::<_, ApprovalRow>(&format!(
            "{} ORDER BY created_at DESC",
            SELECT_APPROVAL
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;
        rows.into_iter().map(ApprovalRow::into_approval).collect()
    }

    async fn list_by_requester(&self, requester: Uuid) -> CoreResult<Vec<AdminApproval>> {
        let rows = sqlx::query_as::<_, ApprovalRow>(&format!(
            "{} WHERE requested_by = $1 ORDER BY created_at DESC",
            SELECT_APPROVAL
        ))
        .bind(requester)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_err)?;
        rows.into_iter().map(ApprovalRow::into_approval).collect()
    }

    async fn set_decision(
        &self,
        id: Uuid,
        status: ApprovalStatus,
        decided_by: Uuid,
        rejection_reason: Option<String>,
    ) -> CoreResult<()> {
        // Guarded on PENDING so two racing deciders cannot both win;
        // the loser sees zero rows and reports the conflict.
        let result = sqlx::query(
            "UPDATE approvals SET status = $1, decided_by = $2, decided_at = NOW(), \
             rejection_reason = $3, updated_at = NOW() WHERE id = $4 AND status = 'PENDING'",
        )
        .bind(status.as_str())
        .bind(decided_by)
        .bind(&rejection_reason)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::Conflict("already processed".into()));
        }
        Ok(())
    }

    async fn revert_to_pending(&self, id: Uuid) -> CoreResult<()> {
        let result = sqlx::query(
            "UPDATE approvals SET status = 'PENDING', decided_by = NULL, decided_at = NULL, \
             rejection_reason = NULL, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound("approval request not found".into()));
        }
        Ok(())
    }
}
