//! Role mutations and permission grants.

use std::sync::Arc;

use sqlx::PgConnection;
use tracing::info;

use stockroom_core::error::AppError;
use stockroom_database::DatabasePool;
use stockroom_database::repositories::{
    PermissionRepository, RolePermissionRepository, RoleRepository, UserRoleRepository,
};
use stockroom_entity::join::RolePermission;
use stockroom_entity::role::{CreateRole, Role, UpdateRole};
use stockroom_entity::tracked::{EntityChange, ModelName, Tracked};

use super::{reconcile, require_all};
use crate::change_log::{Affected, EntityHookAdapter, HookAction};
use crate::context::MutationOptions;
use crate::validate::{optional_text, require_text};

/// Handles role CRUD and the permissions granted to each role.
#[derive(Debug, Clone)]
pub struct RoleService {
    /// Database pool.
    db: DatabasePool,
    /// Role repository.
    roles: Arc<RoleRepository>,
    /// Permission repository.
    permissions: Arc<PermissionRepository>,
    /// Role-permission join repository.
    grants: Arc<RolePermissionRepository>,
    /// User-role join repository, for the delete guard.
    assignments: Arc<UserRoleRepository>,
    /// Change-log hooks.
    hooks: Arc<EntityHookAdapter>,
}

impl RoleService {
    /// Creates a new role service.
    pub fn new(
        db: DatabasePool,
        roles: Arc<RoleRepository>,
        permissions: Arc<PermissionRepository>,
        grants: Arc<RolePermissionRepository>,
        assignments: Arc<UserRoleRepository>,
        hooks: Arc<EntityHookAdapter>,
    ) -> Self {
        Self {
            db,
            roles,
            permissions,
            grants,
            assignments,
            hooks,
        }
    }

    /// Gets a role by ID.
    pub async fn get(&self, id: i64) -> Result<Role, AppError> {
        self.roles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))
    }

    /// Lists the permission ids granted to a role.
    pub async fn permission_ids(&self, role_id: i64) -> Result<Vec<i64>, AppError> {
        self.grants.permission_ids_for_role(role_id).await
    }

    /// Creates a role.
    pub async fn create(
        &self,
        data: CreateRole,
        options: Option<&MutationOptions>,
    ) -> Result<Role, AppError> {
        let mut tx = self.db.begin().await?;
        let role = self.create_in(&mut *tx, &data, options).await?;
        tx.commit().await?;
        Ok(role)
    }

    /// Creates a role inside the caller's transaction.
    pub(crate) async fn create_in(
        &self,
        conn: &mut PgConnection,
        data: &CreateRole,
        options: Option<&MutationOptions>,
    ) -> Result<Role, AppError> {
        require_text(&data.name, "Role name")?;

        let role = self.roles.create(&mut *conn, data).await?;
        let change = EntityChange::created(role.snapshot()?);
        self.hooks
            .after_mutation(
                HookAction::Create,
                Affected::One(&change),
                options,
                ModelName::Role,
                conn,
            )
            .await?;

        info!(role_id = role.id, name = %role.name, "Role created");
        Ok(role)
    }

    /// Updates a role.
    pub async fn update(
        &self,
        id: i64,
        data: UpdateRole,
        options: Option<&MutationOptions>,
    ) -> Result<Role, AppError> {
        optional_text(data.name.as_deref(), "Role name")?;

        let mut tx = self.db.begin().await?;
        let before = self
            .roles
            .lock(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))?;
        let after = self.roles.update(&mut *tx, id, &data).await?;

        let change = EntityChange::updated(before.snapshot()?, after.snapshot()?)?;
        self.hooks
            .after_mutation(
                HookAction::Update,
                Affected::One(&change),
                options,
                ModelName::Role,
                &mut *tx,
            )
            .await?;
        tx.commit().await?;

        info!(role_id = id, "Role updated");
        Ok(after)
    }

    /// Deletes a role that no user holds, revoking its permissions first.
    pub async fn delete(&self, id: i64, options: Option<&MutationOptions>) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        let before = self
            .roles
            .lock(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Role {id} not found")))?;

        if self.assignments.count_by_role(&mut *tx, id).await? > 0 {
            return Err(AppError::conflict("Cannot delete role with assigned users."));
        }

        let grants = self.grants.lock_for_role(&mut *tx, id).await?;
        self.revoke(&mut *tx, &grants, options).await?;
        self.roles.delete(&mut *tx, id).await?;

        let change = EntityChange::deleted(before.snapshot()?);
        self.hooks
            .after_mutation(
                HookAction::Destroy,
                Affected::One(&change),
                options,
                ModelName::Role,
                &mut *tx,
            )
            .await?;
        tx.commit().await?;

        info!(role_id = id, "Role deleted");
        Ok(())
    }

    /// Replaces the permissions granted to a role.
    pub async fn set_permissions(
        &self,
        role_id: i64,
        permission_ids: &[i64],
        options: Option<&MutationOptions>,
    ) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        self.set_permissions_in(&mut *tx, role_id, permission_ids, options).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Replaces the permissions of a role inside the caller's transaction.
    pub(crate) async fn set_permissions_in(
        &self,
        conn: &mut PgConnection,
        role_id: i64,
        permission_ids: &[i64],
        options: Option<&MutationOptions>,
    ) -> Result<(), AppError> {
        self.require_role(&mut *conn, role_id).await?;
        let found = self.permissions.existing_ids(&mut *conn, permission_ids).await?;
        require_all(permission_ids, &found, "Permission")?;

        let current = self.grants.lock_for_role(&mut *conn, role_id).await?;
        let current_ids: Vec<i64> = current.iter().map(|g| g.permission_id).collect();
        let (to_add, to_remove) = reconcile(&current_ids, permission_ids);

        let removed: Vec<RolePermission> = current
            .into_iter()
            .filter(|g| to_remove.contains(&g.permission_id))
            .collect();
        self.revoke(&mut *conn, &removed, options).await?;

        let added: Vec<RolePermission> = to_add
            .into_iter()
            .map(|permission_id| RolePermission::new(role_id, permission_id))
            .collect();
        let granted = self.grant(conn, &added, options).await?;

        info!(
            role_id,
            granted,
            revoked = removed.len(),
            "Role permissions replaced"
        );
        Ok(())
    }

    /// Grants one permission to a role.
    pub async fn add_permission(
        &self,
        role_id: i64,
        permission_id: i64,
        options: Option<&MutationOptions>,
    ) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        self.add_permissions_in(&mut *tx, role_id, &[permission_id], options)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Grants permissions a role does not hold yet, keeping the rest.
    ///
    /// Returns how many grants were inserted.
    pub(crate) async fn add_permissions_in(
        &self,
        conn: &mut PgConnection,
        role_id: i64,
        permission_ids: &[i64],
        options: Option<&MutationOptions>,
    ) -> Result<usize, AppError> {
        self.require_role(&mut *conn, role_id).await?;
        let found = self.permissions.existing_ids(&mut *conn, permission_ids).await?;
        require_all(permission_ids, &found, "Permission")?;

        let rows: Vec<RolePermission> = permission_ids
            .iter()
            .map(|&permission_id| RolePermission::new(role_id, permission_id))
            .collect();
        self.grant(conn, &rows, options).await
    }

    /// Revokes one permission from a role.
    pub async fn remove_permission(
        &self,
        role_id: i64,
        permission_id: i64,
        options: Option<&MutationOptions>,
    ) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        let removed: Vec<RolePermission> = self
            .grants
            .lock_for_role(&mut *tx, role_id)
            .await?
            .into_iter()
            .filter(|g| g.permission_id == permission_id)
            .collect();
        self.revoke(&mut *tx, &removed, options).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn require_role(&self, conn: &mut PgConnection, role_id: i64) -> Result<Role, AppError> {
        self.roles
            .lock(conn, role_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Role {role_id} not found")))
    }

    async fn grant(
        &self,
        conn: &mut PgConnection,
        rows: &[RolePermission],
        options: Option<&MutationOptions>,
    ) -> Result<usize, AppError> {
        let inserted = self.grants.insert_many(&mut *conn, rows).await?;
        if inserted.is_empty() {
            return Ok(0);
        }
        let changes = inserted
            .iter()
            .map(|row| Ok(EntityChange::created(row.snapshot()?)))
            .collect::<Result<Vec<_>, AppError>>()?;
        self.hooks
            .after_mutation(
                HookAction::Create,
                Affected::Many(&changes),
                options,
                ModelName::RolePermission,
                conn,
            )
            .await?;
        Ok(inserted.len())
    }

    async fn revoke(
        &self,
        conn: &mut PgConnection,
        rows: &[RolePermission],
        options: Option<&MutationOptions>,
    ) -> Result<(), AppError> {
        if rows.is_empty() {
            return Ok(());
        }
        let snapshots = self.hooks.before_mutation(rows)?;
        self.grants.delete_many(&mut *conn, rows).await?;

        let changes: Vec<EntityChange> = snapshots.into_iter().map(EntityChange::deleted).collect();
        self.hooks
            .after_mutation(
                HookAction::Destroy,
                Affected::Many(&changes),
                options,
                ModelName::RolePermission,
                conn,
            )
            .await?;
        Ok(())
    }
}
