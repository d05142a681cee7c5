//! Role repository implementation.

use sqlx::{PgConnection, PgPool};

use stockroom_core::error::{AppError, ErrorKind};
use stockroom_core::result::AppResult;
use stockroom_entity::role::{CreateRole, Role, UpdateRole};

use super::write_error;

/// Repository for access roles.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a role by primary key.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find role by id", e))
    }

    /// Find a role by name inside the caller's transaction.
    pub async fn find_by_name(&self, conn: &mut PgConnection, name: &str) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find role by name", e))
    }

    /// Lock a role for the rest of the transaction.
    pub async fn lock(&self, conn: &mut PgConnection, id: i64) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock role", e))
    }

    /// Ids among `ids` that name existing roles.
    pub async fn existing_ids(&self, conn: &mut PgConnection, ids: &[i64]) -> AppResult<Vec<i64>> {
        sqlx::query_scalar("SELECT id FROM roles WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check role ids", e))
    }

    /// Insert a new role.
    pub async fn create(&self, conn: &mut PgConnection, data: &CreateRole) -> AppResult<Role> {
        sqlx::query_as::<_, Role>(
            "INSERT INTO roles (name, description) VALUES ($1, $2) RETURNING *",
        )
        .bind(&data.name)
        .bind(data.description.as_deref())
        .fetch_one(conn)
        .await
        .map_err(|e| write_error(e, "Role", "Failed to create role"))
    }

    /// Apply a partial update to a role.
    pub async fn update(
        &self,
        conn: &mut PgConnection,
        id: i64,
        data: &UpdateRole,
    ) -> AppResult<Role> {
        sqlx::query_as::<_, Role>(
            "UPDATE roles SET \
             name = COALESCE($2, name), \
             description = CASE WHEN $3 THEN $4 ELSE description END, \
             updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(data.name.as_deref())
        .bind(data.description.is_some())
        .bind(data.description.clone().flatten())
        .fetch_one(conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::not_found(format!("Role {id} not found")),
            other => write_error(other, "Role", "Failed to update role"),
        })
    }

    /// Delete a role.
    pub async fn delete(&self, conn: &mut PgConnection, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete role", e))?;
        Ok(result.rows_affected() > 0)
    }
}
