use crate::{from_jsonb, map_db_err, to_jsonb};
use async_trait::async_trait;
use roam_core::identity::{AdminDraft, AdminPatch, AdminUser, Customer, Role};
use roam_core::repository::{AdminUserRepository, CustomerRepository, SettingsRepository};
use roam_core::{CoreError, CoreResult};
use sqlx::PgPool;
use uuid::Uuid;

pub struct StoreAdminRepository {
    pool: PgPool,
}

impl StoreAdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AdminRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    is_active: bool,
    assigned_data: serde_json::Value,
}

impl AdminRow {
    fn into_admin(self) -> CoreResult<AdminUser> {
        // Legacy role spellings in old rows normalize here.
        let role = Role::try_from(self.role.as_str()).map_err(CoreError::Dependency)?;
        Ok(AdminUser {
            id: self.id,
            name: self.name,
            email: self.email,
            role,
            is_active: self.is_active,
            assigned_data: from_jsonb("assigned_data", self.assigned_data)?,
        })
    }
}

const SELECT_ADMIN: &str =
    "SELECT id, name, email, role, is_active, assigned_data FROM admin_users";

#[async_trait]
impl AdminUserRepository for StoreAdminRepository {
    async fn get(&self, id: Uuid) -> CoreResult<Option<AdminUser>> {
        let row = sqlx::query_as::<_, AdminRow>(&format!("{} WHERE id = $1", SELECT_ADMIN))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_err)?;
        row.map(AdminRow::into_admin).transpose()
    }

    async fn insert(&self, draft: AdminDraft) -> CoreResult<AdminUser> {
        let row = sqlx::query_as::<_, AdminRow>(
            "INSERT INTO admin_users (id, name, email, role, is_active, assigned_data) \
             VALUES ($1, $2, $3, $4, TRUE, $5) \
             RETURNING id, name, email, role, is_active, assigned_data",
        )
        .bind(Uuid::new_v4())
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(draft.role.as_str())
        .bind(to_jsonb("assigned_data", &draft.assigned_data)?)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;
        row.into_admin()
    }

    async fn update(&self, id: Uuid, patch: AdminPatch) -> CoreResult<AdminUser> {
        let mut admin = self
            .get(id)
            .await?
            .ok_or_else(|| CoreError::NotFound("admin not found".into()))?;

        if let Some(v) = patch.name {
            admin.name = v;
        }
        if let Some(v) = patch.email {
            admin.email = v;
        }
        if let Some(v) = patch.role {
            admin.role = v;
        }
        if let Some(v) = patch.is_active {
            admin.is_active = v;
        }
        if let Some(v) = patch.assigned_data {
            admin.assigned_data = v;
        }

        let row = sqlx::query_as::<_, AdminRow>(
            "UPDATE admin_users SET name = $1, email = $2, role = $3, is_active = $4, \
             assigned_data = $5, updated_at = NOW() WHERE id = $6 \
             RETURNING id, name, email, role, is_active, assigned_data",
        )
        .bind(&admin.name)
        .bind(&admin.email)
        .bind(admin.role.as_str())
        .bind(admin.is_active)
        .bind(to_jsonb("assigned_data", &admin.assigned_data)?)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_err)?;
        row.into_admin()
    }

    async fn deactivate(&self, id: Uuid) -> CoreResult<()> {
        let result = sqlx::query(
            "UPDATE admin_users SET is_active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound("admin not found".into()));
        }
        Ok(())
    }
}

pub struct StoreCustomerRepository {
    pool: PgPool,
}

impl StoreCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
}

#[async_trait]
impl CustomerRepository for StoreCustomerRepository {
    async fn get(&self, id: Uuid) -> CoreResult<Option<Customer>> {
        let row = sqlx::query_as::<_, CustomerRow>(
            "SELECT id, name, email, phone FROM customers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(row.map(|r| Customer {
            id: r.id,
            name: r.name,
            email: r.email,
            phone: r.phone,
        }))
    }

    async fn register(&self, phone: Option<&str>) -> CoreResult<Customer> {
        let row = match phone {
            // The partial unique index on phone makes re-verification
            // of a known number return the same customer row.
            Some(phone) => {
                sqlx::query_as::<_, CustomerRow>(
                    "INSERT INTO customers (id, name, email, phone) \
                     VALUES ($1, 'Guest', '', $2) \
                     ON CONFLICT (phone) WHERE phone IS NOT NULL \
                     DO UPDATE SET updated_at = NOW() \
                     RETURNING id, name, email, phone",
                )
                .bind(Uuid::new_v4())
                .bind(phone)
                .fetch_one(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, CustomerRow>(
                    "INSERT INTO customers (id, name, email) VALUES ($1, 'Guest', '') \
                     RETURNING id, name, email, phone",
                )
                .bind(Uuid::new_v4())
                .fetch_one(&self.pool)
                .await
            }
        }
        .map_err(map_db_err)?;

        Ok(Customer {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
        })
    }

    async fn update_phone(&self, id: Uuid, phone: &str) -> CoreResult<()> {
        let result = sqlx::query(
            "UPDATE customers SET phone = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(phone)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound("customer not found".into()));
        }
        Ok(())
    }
}

pub struct StoreSettingsRepository {
    pool: PgPool,
}

impl StoreSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for StoreSettingsRepository {
    async fn upsert(&self, key: &str, value: serde_json::Value) -> CoreResult<()> {
        sqlx::query(
            "INSERT INTO settings (key, value) VALUES ($1, $2) \
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(map_db_err)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> CoreResult<Option<serde_json::Value>> {
        let value: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_db_err)?;
        Ok(value)
    }
}
