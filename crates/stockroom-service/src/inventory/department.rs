//! Department mutations.

use std::sync::Arc;

use tracing::info;

use stockroom_core::error::AppError;
use stockroom_core::types::pagination::{PageRequest, PageResponse};
use stockroom_database::DatabasePool;
use stockroom_database::repositories::{DepartmentRepository, ItemRepository};
use stockroom_entity::department::{Department, CreateDepartment, UpdateDepartment};
use stockroom_entity::tracked::{EntityChange, ModelName, Tracked};

use crate::change_log::{Affected, EntityHookAdapter, HookAction};
use crate::context::MutationOptions;
use crate::validate::{optional_text, require_text};

/// Handles department CRUD.
#[derive(Debug, Clone)]
pub struct DepartmentService {
    /// Database pool.
    db: DatabasePool,
    /// Department repository.
    departments: Arc<DepartmentRepository>,
    /// Item repository, for the delete guard.
    items: Arc<ItemRepository>,
    /// Change-log hooks.
    hooks: Arc<EntityHookAdapter>,
}

impl DepartmentService {
    /// Creates a new department service.
    pub fn new(
        db: DatabasePool,
        departments: Arc<DepartmentRepository>,
        items: Arc<ItemRepository>,
        hooks: Arc<EntityHookAdapter>,
    ) -> Self {
        Self {
            db,
            departments,
            items,
            hooks,
        }
    }

    /// Gets a live department by ID.
    pub async fn get(&self, id: i64) -> Result<Department, AppError> {
        self.departments
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Department {id} not found")))
    }

    /// Lists live departments.
    pub async fn list(&self, page: PageRequest) -> Result<PageResponse<Department>, AppError> {
        self.departments.find_all(&page).await
    }

    /// Creates a department.
    pub async fn create(
        &self,
        data: CreateDepartment,
        options: Option<&MutationOptions>,
    ) -> Result<Department, AppError> {
        require_text(&data.name, "Department name")?;

        let mut tx = self.db.begin().await?;
        let department = self.departments.create(&mut *tx, &data).await?;

        let change = EntityChange::created(department.snapshot()?);
        self.hooks
            .after_mutation(
                HookAction::Create,
                Affected::One(&change),
                options,
                ModelName::Department,
                &mut *tx,
            )
            .await?;
        tx.commit().await?;

        info!(department_id = department.id, name = %department.name, "Department created");
        Ok(department)
    }

    /// Renames a department.
    pub async fn update(
        &self,
        id: i64,
        data: UpdateDepartment,
        options: Option<&MutationOptions>,
    ) -> Result<Department, AppError> {
        optional_text(data.name.as_deref(), "Department name")?;

        let mut tx = self.db.begin().await?;
        let before = self
            .departments
            .lock(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Department {id} not found")))?;
        let after = self.departments.update(&mut *tx, id, &data).await?;

        let change = EntityChange::updated(before.snapshot()?, after.snapshot()?)?;
        self.hooks
            .after_mutation(
                HookAction::Update,
                Affected::One(&change),
                options,
                ModelName::Department,
                &mut *tx,
            )
            .await?;
        tx.commit().await?;

        info!(department_id = id, "Department updated");
        Ok(after)
    }

    /// Soft-deletes a department that has no live items.
    pub async fn delete(&self, id: i64, options: Option<&MutationOptions>) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        let before = self
            .departments
            .lock(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Department {id} not found")))?;

        if self.items.count_by_department(&mut *tx, id).await? > 0 {
            return Err(AppError::conflict("Cannot delete department with assigned items."));
        }

        self.departments.soft_delete(&mut *tx, id).await?;

        let change = EntityChange::deleted(before.snapshot()?);
        self.hooks
            .after_mutation(
                HookAction::Destroy,
                Affected::One(&change),
                options,
                ModelName::Department,
                &mut *tx,
            )
            .await?;
        tx.commit().await?;

        info!(department_id = id, "Department deleted");
        Ok(())
    }
}
