//! User ↔ role join repository.

use sqlx::{PgConnection, PgPool};

use stockroom_core::error::{AppError, ErrorKind};
use stockroom_core::result::AppResult;
use stockroom_entity::join::UserRole;

use super::write_error;

/// Repository for `user_roles` rows.
#[derive(Debug, Clone)]
pub struct UserRoleRepository {
    pool: PgPool,
}

impl UserRoleRepository {
    /// Create a new user-role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Role ids currently assigned to a user.
    pub async fn role_ids_for_user(&self, user_id: i64) -> AppResult<Vec<i64>> {
        sqlx::query_scalar("SELECT role_id FROM user_roles WHERE user_id = $1 ORDER BY role_id")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list user roles", e))
    }

    /// Lock every assignment of a user.
    pub async fn lock_for_user(&self, conn: &mut PgConnection, user_id: i64) -> AppResult<Vec<UserRole>> {
        sqlx::query_as::<_, UserRole>(
            "SELECT user_id, role_id FROM user_roles WHERE user_id = $1 ORDER BY role_id FOR UPDATE",
        )
        .bind(user_id)
        .fetch_all(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock user roles", e))
    }

    /// Number of users holding a role.
    pub async fn count_by_role(&self, conn: &mut PgConnection, role_id: i64) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM user_roles WHERE role_id = $1")
            .bind(role_id)
            .fetch_one(conn)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count role users", e))
    }

    /// Insert assignments, skipping pairs that already exist.
    ///
    /// Returns only the rows that were actually inserted.
    pub async fn insert_many(
        &self,
        conn: &mut PgConnection,
        rows: &[UserRole],
    ) -> AppResult<Vec<UserRole>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let user_ids: Vec<i64> = rows.iter().map(|r| r.user_id).collect();
        let role_ids: Vec<i64> = rows.iter().map(|r| r.role_id).collect();

        sqlx::query_as::<_, UserRole>(
            "INSERT INTO user_roles (user_id, role_id) \
             SELECT * FROM UNNEST($1::bigint[], $2::bigint[]) \
             ON CONFLICT DO NOTHING RETURNING user_id, role_id",
        )
        .bind(&user_ids)
        .bind(&role_ids)
        .fetch_all(conn)
        .await
        .map_err(|e| write_error(e, "User role", "Failed to insert user roles"))
    }

    /// Delete the given assignments.
    pub async fn delete_many(&self, conn: &mut PgConnection, rows: &[UserRole]) -> AppResult<u64> {
        if rows.is_empty() {
            return Ok(0);
        }
        let user_ids: Vec<i64> = rows.iter().map(|r| r.user_id).collect();
        let role_ids: Vec<i64> = rows.iter().map(|r| r.role_id).collect();

        let result = sqlx::query(
            "DELETE FROM user_roles WHERE (user_id, role_id) IN \
             (SELECT * FROM UNNEST($1::bigint[], $2::bigint[]))",
        )
        .bind(&user_ids)
        .bind(&role_ids)
        .execute(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete user roles", e))?;
        Ok(result.rows_affected())
    }
}
