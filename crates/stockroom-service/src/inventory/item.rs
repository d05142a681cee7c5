//! Item mutations.

use std::sync::Arc;

use tracing::info;

use stockroom_core::error::AppError;
use stockroom_core::types::pagination::{PageRequest, PageResponse};
use stockroom_database::DatabasePool;
use stockroom_database::repositories::ItemRepository;
use stockroom_entity::item::{CreateItem, Item, UpdateItem};
use stockroom_entity::tracked::{EntityChange, ModelName, Tracked};

use crate::change_log::{Affected, EntityHookAdapter, HookAction};
use crate::context::MutationOptions;
use crate::validate::{optional_text, require_quantity, require_text};

/// Handles item CRUD.
#[derive(Debug, Clone)]
pub struct ItemService {
    /// Database pool.
    db: DatabasePool,
    /// Item repository.
    items: Arc<ItemRepository>,
    /// Change-log hooks.
    hooks: Arc<EntityHookAdapter>,
}

impl ItemService {
    /// Creates a new item service.
    pub fn new(
        db: DatabasePool,
        items: Arc<ItemRepository>,
        hooks: Arc<EntityHookAdapter>,
    ) -> Self {
        Self { db, items, hooks }
    }

    /// Gets a live item by ID.
    pub async fn get(&self, id: i64) -> Result<Item, AppError> {
        self.items
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Item {id} not found")))
    }

    /// Lists live items.
    pub async fn list(&self, page: PageRequest) -> Result<PageResponse<Item>, AppError> {
        self.items.find_all(&page).await
    }

    /// Creates an item.
    pub async fn create(
        &self,
        data: CreateItem,
        options: Option<&MutationOptions>,
    ) -> Result<Item, AppError> {
        require_text(&data.name, "Item name")?;
        require_quantity(data.quantity)?;

        let mut tx = self.db.begin().await?;
        let item = self.items.create(&mut *tx, &data).await?;

        let change = EntityChange::created(item.snapshot()?);
        self.hooks
            .after_mutation(
                HookAction::Create,
                Affected::One(&change),
                options,
                ModelName::Item,
                &mut *tx,
            )
            .await?;
        tx.commit().await?;

        info!(item_id = item.id, name = %item.name, "Item created");
        Ok(item)
    }

    /// Updates an item.
    pub async fn update(
        &self,
        id: i64,
        data: UpdateItem,
        options: Option<&MutationOptions>,
    ) -> Result<Item, AppError> {
        optional_text(data.name.as_deref(), "Item name")?;
        if let Some(quantity) = data.quantity {
            require_quantity(quantity)?;
        }

        let mut tx = self.db.begin().await?;
        let before = self
            .items
            .lock(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Item {id} not found")))?;
        let after = self.items.update(&mut *tx, id, &data).await?;

        let change = EntityChange::updated(before.snapshot()?, after.snapshot()?)?;
        self.hooks
            .after_mutation(
                HookAction::Update,
                Affected::One(&change),
                options,
                ModelName::Item,
                &mut *tx,
            )
            .await?;
        tx.commit().await?;

        info!(item_id = id, "Item updated");
        Ok(after)
    }

    /// Soft-deletes an item.
    pub async fn delete(&self, id: i64, options: Option<&MutationOptions>) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        let before = self
            .items
            .lock(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Item {id} not found")))?;
        self.items.soft_delete(&mut *tx, id).await?;

        let change = EntityChange::deleted(before.snapshot()?);
        self.hooks
            .after_mutation(
                HookAction::Destroy,
                Affected::One(&change),
                options,
                ModelName::Item,
                &mut *tx,
            )
            .await?;
        tx.commit().await?;

        info!(item_id = id, "Item deleted");
        Ok(())
    }
}
