//! Permission mutations.

use std::sync::Arc;

use sqlx::PgConnection;
use tracing::info;

use stockroom_core::error::AppError;
use stockroom_database::DatabasePool;
use stockroom_database::repositories::PermissionRepository;
use stockroom_entity::permission::{CreatePermission, Permission, UpdatePermission};
use stockroom_entity::tracked::{EntityChange, ModelName, Tracked};

use crate::change_log::{Affected, EntityHookAdapter, HookAction};
use crate::context::MutationOptions;
use crate::validate::{optional_text, require_text};

/// Handles permission CRUD.
#[derive(Debug, Clone)]
pub struct PermissionService {
    db: DatabasePool,
    permissions: Arc<PermissionRepository>,
    hooks: Arc<EntityHookAdapter>,
}

impl PermissionService {
    /// Creates a new permission service.
    pub fn new(
        db: DatabasePool,
        permissions: Arc<PermissionRepository>,
        hooks: Arc<EntityHookAdapter>,
    ) -> Self {
        Self {
            db,
            permissions,
            hooks,
        }
    }

    /// Gets a live permission by ID.
    pub async fn get(&self, id: i64) -> Result<Permission, AppError> {
        self.permissions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Permission {id} not found")))
    }

    /// Lists every live permission.
    pub async fn list(&self) -> Result<Vec<Permission>, AppError> {
        self.permissions.find_all().await
    }

    /// Creates a permission.
    pub async fn create(
        &self,
        data: CreatePermission,
        options: Option<&MutationOptions>,
    ) -> Result<Permission, AppError> {
        let mut tx = self.db.begin().await?;
        let permission = self.create_in(&mut *tx, &data, options).await?;
        tx.commit().await?;
        Ok(permission)
    }

    /// Creates a permission inside the caller's transaction.
    pub(crate) async fn create_in(
        &self,
        conn: &mut PgConnection,
        data: &CreatePermission,
        options: Option<&MutationOptions>,
    ) -> Result<Permission, AppError> {
        require_text(&data.name, "Permission name")?;
        require_text(&data.description, "Permission description")?;

        let permission = self.permissions.create(&mut *conn, data).await?;
        let change = EntityChange::created(permission.snapshot()?);
        self.hooks
            .after_mutation(
                HookAction::Create,
                Affected::One(&change),
                options,
                ModelName::Permission,
                conn,
            )
            .await?;

        info!(permission_id = permission.id, name = %permission.name, "Permission created");
        Ok(permission)
    }

    /// Updates a permission.
    pub async fn update(
        &self,
        id: i64,
        data: UpdatePermission,
        options: Option<&MutationOptions>,
    ) -> Result<Permission, AppError> {
        optional_text(data.name.as_deref(), "Permission name")?;
        optional_text(data.description.as_deref(), "Permission description")?;

        let mut tx = self.db.begin().await?;
        let before = self
            .permissions
            .lock(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Permission {id} not found")))?;
        let after = self.permissions.update(&mut *tx, id, &data).await?;

        let change = EntityChange::updated(before.snapshot()?, after.snapshot()?)?;
        self.hooks
            .after_mutation(
                HookAction::Update,
                Affected::One(&change),
                options,
                ModelName::Permission,
                &mut *tx,
            )
            .await?;
        tx.commit().await?;

        info!(permission_id = id, "Permission updated");
        Ok(after)
    }

    /// Soft-deletes a permission.
    pub async fn delete(&self, id: i64, options: Option<&MutationOptions>) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        let before = self
            .permissions
            .lock(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Permission {id} not found")))?;

        self.permissions.soft_delete(&mut *tx, id).await?;

        let change = EntityChange::deleted(before.snapshot()?);
        self.hooks
            .after_mutation(
                HookAction::Destroy,
                Affected::One(&change),
                options,
                ModelName::Permission,
                &mut *tx,
            )
            .await?;
        tx.commit().await?;

        info!(permission_id = id, "Permission deleted");
        Ok(())
    }
}
