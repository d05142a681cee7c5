//! Category mutations.

use std::sync::Arc;

use tracing::info;

use stockroom_core::error::AppError;
use stockroom_core::types::pagination::{PageRequest, PageResponse};
use stockroom_database::DatabasePool;
use stockroom_database::repositories::{CategoryRepository, ItemRepository};
use stockroom_entity::category::{Category, CreateCategory, UpdateCategory};
use stockroom_entity::tracked::{EntityChange, ModelName, Tracked};

use crate::change_log::{Affected, EntityHookAdapter, HookAction};
use crate::context::MutationOptions;
use crate::validate::{optional_text, require_text};

/// Handles category CRUD.
#[derive(Debug, Clone)]
pub struct CategoryService {
    /// Database pool.
    db: DatabasePool,
    /// Category repository.
    categories: Arc<CategoryRepository>,
    /// Item repository, for the delete guard.
    items: Arc<ItemRepository>,
    /// Change-log hooks.
    hooks: Arc<EntityHookAdapter>,
}

impl CategoryService {
    /// Creates a new category service.
    pub fn new(
        db: DatabasePool,
        categories: Arc<CategoryRepository>,
        items: Arc<ItemRepository>,
        hooks: Arc<EntityHookAdapter>,
    ) -> Self {
        Self {
            db,
            categories,
            items,
            hooks,
        }
    }

    /// Gets a live category by ID.
    pub async fn get(&self, id: i64) -> Result<Category, AppError> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))
    }

    /// Lists live categories.
    pub async fn list(&self, page: PageRequest) -> Result<PageResponse<Category>, AppError> {
        self.categories.find_all(&page).await
    }

    /// Creates a category.
    pub async fn create(
        &self,
        data: CreateCategory,
        options: Option<&MutationOptions>,
    ) -> Result<Category, AppError> {
        require_text(&data.name, "Category name")?;

        let mut tx = self.db.begin().await?;
        let category = self.categories.create(&mut *tx, &data).await?;

        let change = EntityChange::created(category.snapshot()?);
        self.hooks
            .after_mutation(
                HookAction::Create,
                Affected::One(&change),
                options,
                ModelName::Category,
                &mut *tx,
            )
            .await?;
        tx.commit().await?;

        info!(category_id = category.id, name = %category.name, "Category created");
        Ok(category)
    }

    /// Renames a category.
    pub async fn update(
        &self,
        id: i64,
        data: UpdateCategory,
        options: Option<&MutationOptions>,
    ) -> Result<Category, AppError> {
        optional_text(data.name.as_deref(), "Category name")?;

        let mut tx = self.db.begin().await?;
        let before = self
            .categories
            .lock(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))?;
        let after = self.categories.update(&mut *tx, id, &data).await?;

        let change = EntityChange::updated(before.snapshot()?, after.snapshot()?)?;
        self.hooks
            .after_mutation(
                HookAction::Update,
                Affected::One(&change),
                options,
                ModelName::Category,
                &mut *tx,
            )
            .await?;
        tx.commit().await?;

        info!(category_id = id, "Category updated");
        Ok(after)
    }

    /// Soft-deletes a category that has no live items.
    pub async fn delete(&self, id: i64, options: Option<&MutationOptions>) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        let before = self
            .categories
            .lock(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))?;

        if self.items.count_by_category(&mut *tx, id).await? > 0 {
            return Err(AppError::conflict("Cannot delete category with assigned items."));
        }

        self.categories.soft_delete(&mut *tx, id).await?;

        let change = EntityChange::deleted(before.snapshot()?);
        self.hooks
            .after_mutation(
                HookAction::Destroy,
                Affected::One(&change),
                options,
                ModelName::Category,
                &mut *tx,
            )
            .await?;
        tx.commit().await?;

        info!(category_id = id, "Category deleted");
        Ok(())
    }
}
