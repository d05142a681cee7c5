//! Department repository implementation.

use sqlx::{PgConnection, PgPool};

use stockroom_core::error::{AppError, ErrorKind};
use stockroom_core::result::AppResult;
use stockroom_core::types::pagination::{PageRequest, PageResponse};
use stockroom_entity::department::{Department, CreateDepartment, UpdateDepartment};

use super::write_error;

/// Repository for departments, the owners of items.
#[derive(Debug, Clone)]
pub struct DepartmentRepository {
    pool: PgPool,
}

impl DepartmentRepository {
    /// Create a new department repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a live department by primary key.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Department>> {
        sqlx::query_as::<_, Department>(
            "SELECT * FROM departments WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find department by id", e))
    }

    /// List live departments with pagination.
    pub async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<Department>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM departments WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count departments", e)
                })?;

        let rows = sqlx::query_as::<_, Department>(
            "SELECT * FROM departments WHERE deleted_at IS NULL ORDER BY name LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list departments", e))?;

        Ok(PageResponse::new(rows, page, total as u64))
    }

    /// Lock a live department for the rest of the transaction.
    pub async fn lock(&self, conn: &mut PgConnection, id: i64) -> AppResult<Option<Department>> {
        sqlx::query_as::<_, Department>(
            "SELECT * FROM departments WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock department", e))
    }

    /// Insert a new department.
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        data: &CreateDepartment,
    ) -> AppResult<Department> {
        sqlx::query_as::<_, Department>("INSERT INTO departments (name) VALUES ($1) RETURNING *")
            .bind(&data.name)
            .fetch_one(conn)
            .await
            .map_err(|e| write_error(e, "Department", "Failed to create department"))
    }

    /// Rename a live department.
    pub async fn update(
        &self,
        conn: &mut PgConnection,
        id: i64,
        data: &UpdateDepartment,
    ) -> AppResult<Department> {
        sqlx::query_as::<_, Department>(
            "UPDATE departments SET name = COALESCE($2, name), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(id)
        .bind(data.name.as_deref())
        .fetch_one(conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::not_found(format!("Department {id} not found")),
            other => write_error(other, "Department", "Failed to update department"),
        })
    }

    /// Soft-delete a department.
    pub async fn soft_delete(&self, conn: &mut PgConnection, id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE departments SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete department", e))?;
        Ok(result.rows_affected() > 0)
    }
}
