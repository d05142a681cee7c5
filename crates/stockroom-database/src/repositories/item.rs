//! Item repository implementation.

use sqlx::{PgConnection, PgPool};

use stockroom_core::error::{AppError, ErrorKind};
use stockroom_core::result::AppResult;
use stockroom_core::types::pagination::{PageRequest, PageResponse};
use stockroom_entity::item::{CreateItem, Item, UpdateItem};

use super::write_error;

/// Repository for inventory items.
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: PgPool,
}

impl ItemRepository {
    /// Create a new item repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a live item by primary key.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<Item>> {
        sqlx::query_as::<_, Item>("SELECT * FROM items WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find item by id", e))
    }

    /// List live items with pagination.
    pub async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<Item>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count items", e))?;

        let items = sqlx::query_as::<_, Item>(
            "SELECT * FROM items WHERE deleted_at IS NULL ORDER BY id LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list items", e))?;

        Ok(PageResponse::new(items, page, total as u64))
    }

    /// Lock a live item for the rest of the transaction.
    pub async fn lock(&self, conn: &mut PgConnection, id: i64) -> AppResult<Option<Item>> {
        sqlx::query_as::<_, Item>(
            "SELECT * FROM items WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to lock item", e))
    }

    /// Insert a new item.
    pub async fn create(&self, conn: &mut PgConnection, data: &CreateItem) -> AppResult<Item> {
        sqlx::query_as::<_, Item>(
            "INSERT INTO items (name, quantity, unit, category_id, department_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&data.name)
        .bind(data.quantity)
        .bind(data.unit)
        .bind(data.category_id)
        .bind(data.department_id)
        .fetch_one(conn)
        .await
        .map_err(|e| write_error(e, "Item", "Failed to create item"))
    }

    /// Apply a partial update to a live item.
    pub async fn update(
        &self,
        conn: &mut PgConnection,
        id: i64,
        data: &UpdateItem,
    ) -> AppResult<Item> {
        sqlx::query_as::<_, Item>(
            "UPDATE items SET \
             name = COALESCE($2, name), \
             quantity = COALESCE($3, quantity), \
             unit = COALESCE($4, unit), \
             category_id = CASE WHEN $5 THEN $6 ELSE category_id END, \
             department_id = COALESCE($7, department_id), \
             updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL RETURNING *",
        )
        .bind(id)
        .bind(data.name.as_deref())
        .bind(data.quantity)
        .bind(data.unit)
        .bind(data.category_id.is_some())
        .bind(data.category_id.flatten())
        .bind(data.department_id)
        .fetch_one(conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => AppError::not_found(format!("Item {id} not found")),
            other => write_error(other, "Item", "Failed to update item"),
        })
    }

    /// Soft-delete an item.
    pub async fn soft_delete(&self, conn: &mut PgConnection, id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE items SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(conn)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete item", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Count live items assigned to a category.
    pub async fn count_by_category(&self, conn: &mut PgConnection, category_id: i64) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM items WHERE category_id = $1 AND deleted_at IS NULL",
        )
        .bind(category_id)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count items by category", e)
        })
    }

    /// Count live items owned by a department.
    pub async fn count_by_department(
        &self,
        conn: &mut PgConnection,
        department_id: i64,
    ) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM items WHERE department_id = $1 AND deleted_at IS NULL",
        )
        .bind(department_id)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count items by department", e)
        })
    }
}
