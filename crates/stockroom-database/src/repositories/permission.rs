//! Permission repository implementation.

use sqlx::{PgConnection, PgPool};

use stockroom_core::error::{AppError, ErrorKind};
use stockroom_core::result::AppResult;
use stockroom_entity::permission::{CreatePermission, Permission, UpdatePermission};

use super::write_error;

/// Repository for named permissions.
#[derive(Debug, Clone)]
pub struct PermissionRepository {
    pool: PgPool,
}

impl PermissionRepository {
    /// Create a new permission repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a live permission by primary key.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, Permission>(
            "SELECT * FROM permissions WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find permission by id", e)
        })
    }

    /// List every live permission.
    pub async fn find_all(&self) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>(
            "SELECT * FROM permissions WHERE deleted_at IS NULL ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list permissions", e))
    }

    /// Live permissions whose name is in `names`, inside the caller's transaction.
    pub async fn find_by_names(
        &self,
        conn: &mut PgConnection,
        names: &[String],
    ) -> AppResult<Vec<Permission>> {
        sqlx::query_as::<_, Permission>(
            "SELECT * FROM permissions WHERE name = ANY($1) AND deleted_at IS NULL",
        )
        .bind(names)
        .fetch_all(conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find permissions by name", e)
        })
    }

    /// Ids among `ids` that name live permissions.
    pub async fn existing_ids(&self, conn: &mut PgConnection, ids: &[i64]) -> AppResult<Vec<i64>> {
        sqlx::query_scalar("SELECT id FROM permissions WHERE id = ANY($1) AND deleted_at IS NULL")
            .bind(ids)
            .fetch_all(conn)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to check permission ids", e)
            })
    }

    /// Lock a live permission for the rest of the transaction.
    pub async fn lock(&self, conn: &mut PgConnection, id: i64) -> AppResult<Option<Permission>> {
        sqlx::query_as::<_, Permission>(
            "SELECT * FROM permissions WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock permission", e))
    }

    /// Insert a new permission.
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        data: &CreatePermission,
    ) -> AppResult<Permission> {
        sqlx::query_as::<_, Permission>(
            "INSERT INTO permissions (name, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(conn)
        .await
        .map_err(|e| write_error(e, "Permission", "Failed to create permission"))
    }

    /// Apply a partial update to a live permission.
    pub async fn update(
        &self,
        conn: &mut PgConnection,
        id: i64,
        data: &UpdatePermission,
    ) -> AppResult<Permission> {
        sqlx::query_as::<_, Permission>(
            "UPDATE permissions SET name = COALESCE($2, name), \
             description = COALESCE($3, description) \
             WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(id)
        .bind(data.name.as_deref())
        .bind(data.description.as_deref())
        .fetch_one(conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::not_found(format!("Permission {id} not found")),
            other => write_error(other, "Permission", "Failed to update permission"),
        })
    }

    /// Soft-delete a permission.
    pub async fn soft_delete(&self, conn: &mut PgConnection, id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE permissions SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete permission", e))?;
        Ok(result.rows_affected() > 0)
    }
}
