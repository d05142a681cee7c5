//! Role ↔ permission join repository.

use sqlx::{PgConnection, PgPool};

use stockroom_core::error::{AppError, ErrorKind};
use stockroom_core::result::AppResult;
use stockroom_entity::join::RolePermission;

use super::write_error;

/// Repository for `role_permissions` rows.
#[derive(Debug, Clone)]
pub struct RolePermissionRepository {
    pool: PgPool,
}

impl RolePermissionRepository {
    /// Create a new role-permission repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Permission ids currently granted to a role.
    pub async fn permission_ids_for_role(&self, role_id: i64) -> AppResult<Vec<i64>> {
        sqlx::query_scalar(
            "SELECT permission_id FROM role_permissions WHERE role_id = $1 ORDER BY permission_id",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list role permissions", e)
        })
    }

    /// Lock every grant of a role.
    pub async fn lock_for_role(
        &self,
        conn: &mut PgConnection,
        role_id: i64,
    ) -> AppResult<Vec<RolePermission>> {
        sqlx::query_as::<_, RolePermission>(
            "SELECT role_id, permission_id FROM role_permissions \
             WHERE role_id = $1 ORDER BY permission_id FOR UPDATE",
        )
        .bind(role_id)
        .fetch_all(conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to lock role permissions", e)
        })
    }

    /// Insert grants, skipping pairs that already exist.
    ///
    /// Returns only the rows that were actually inserted.
    pub async fn insert_many(
        &self,
        conn: &mut PgConnection,
        rows: &[RolePermission],
    ) -> AppResult<Vec<RolePermission>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let role_ids: Vec<i64> = rows.iter().map(|r| r.role_id).collect();
        let permission_ids: Vec<i64> = rows.iter().map(|r| r.permission_id).collect();

        sqlx::query_as::<_, RolePermission>(
            "INSERT INTO role_permissions (role_id, permission_id) \
             SELECT * FROM UNNEST($1::bigint[], $2::bigint[]) \
             ON CONFLICT DO NOTHING RETURNING role_id, permission_id",
        )
        .bind(&role_ids)
        .bind(&permission_ids)
        .fetch_all(conn)
        .await
        .map_err(|e| write_error(e, "Role permission", "Failed to insert role permissions"))
    }

    /// Delete the given grants.
    pub async fn delete_many(
        &self,
        conn: &mut PgConnection,
        rows: &[RolePermission],
    ) -> AppResult<u64> {
        if rows.is_empty() {
            return Ok(0);
        }
        let role_ids: Vec<i64> = rows.iter().map(|r| r.role_id).collect();
        let permission_ids: Vec<i64> = rows.iter().map(|r| r.permission_id).collect();

        let result = sqlx::query(
            "DELETE FROM role_permissions WHERE (role_id, permission_id) IN \
             (SELECT * FROM UNNEST($1::bigint[], $2::bigint[]))",
        )
        .bind(&role_ids)
        .bind(&permission_ids)
        .execute(conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to delete role permissions", e)
        })?;
        Ok(result.rows_affected())
    }
}
