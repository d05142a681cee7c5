//! Category repository implementation.

use sqlx::{PgConnection, PgPool};

use stockroom_core::error::{AppError, ErrorKind};
use stockroom_core::result::AppResult;
use stockroom_core::types::pagination::{PageRequest, PageResponse};
use stockroom_entity::category::{Category, CreateCategory, UpdateCategory};

use super::write_error;

/// Repository for item categories.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    /// Create a new category repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a live category by primary key.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Category>> {
        sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find category by id", e))
    }

    /// List live categories with pagination.
    pub async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<Category>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count categories", e)
                })?;

        let rows = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE deleted_at IS NULL ORDER BY name LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list categories", e))?;

        Ok(PageResponse::new(rows, page, total as u64))
    }

    /// Lock a live category for the rest of the transaction.
    pub async fn lock(&self, conn: &mut PgConnection, id: i64) -> AppResult<Option<Category>> {
        sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock category", e))
    }

    /// Insert a new category.
    pub async fn create(
        &self,
        conn: &mut PgConnection,
        data: &CreateCategory,
    ) -> AppResult<Category> {
        sqlx::query_as::<_, Category>("INSERT INTO categories (name) VALUES ($1) RETURNING *")
            .bind(&data.name)
            .fetch_one(conn)
            .await
            .map_err(|e| write_error(e, "Category", "Failed to create category"))
    }

    /// Rename a live category.
    pub async fn update(
        &self,
        conn: &mut PgConnection,
        id: i64,
        data: &UpdateCategory,
    ) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = COALESCE($2, name), updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(id)
        .bind(data.name.as_deref())
        .fetch_one(conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::not_found(format!("Category {id} not found")),
            other => write_error(other, "Category", "Failed to update category"),
        })
    }

    /// Soft-delete a category.
    pub async fn soft_delete(&self, conn: &mut PgConnection, id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE categories SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete category", e))?;
        Ok(result.rows_affected() > 0)
    }
}
