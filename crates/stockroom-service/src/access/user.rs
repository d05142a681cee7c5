//! User mutations and role assignments.

use std::sync::Arc;

use sqlx::PgConnection;
use tracing::info;

use stockroom_core::error::AppError;
use stockroom_core::types::pagination::{PageRequest, PageResponse};
use stockroom_database::DatabasePool;
use stockroom_database::repositories::{RoleRepository, UserRepository, UserRoleRepository};
use stockroom_entity::join::UserRole;
use stockroom_entity::tracked::{EntityChange, ModelName, Tracked};
use stockroom_entity::user::{CreateUser, UpdateUser, User};

use super::{reconcile, require_all};
use crate::change_log::{Affected, EntityHookAdapter, HookAction};
use crate::context::MutationOptions;
use crate::validate::{optional_text, require_text};

/// Handles user CRUD and role assignments.
///
/// Password hashing happens upstream; every method takes the hash as-is.
#[derive(Debug, Clone)]
pub struct UserService {
    /// Database pool.
    db: DatabasePool,
    /// User repository.
    users: Arc<UserRepository>,
    /// Role repository, to validate assignments.
    roles: Arc<RoleRepository>,
    /// User-role join repository.
    assignments: Arc<UserRoleRepository>,
    /// Change-log hooks.
    hooks: Arc<EntityHookAdapter>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        db: DatabasePool,
        users: Arc<UserRepository>,
        roles: Arc<RoleRepository>,
        assignments: Arc<UserRoleRepository>,
        hooks: Arc<EntityHookAdapter>,
    ) -> Self {
        Self {
            db,
            users,
            roles,
            assignments,
            hooks,
        }
    }

    /// Gets a user by ID.
    pub async fn get(&self, id: i64) -> Result<User, AppError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    /// Lists users.
    pub async fn list(&self, page: PageRequest) -> Result<PageResponse<User>, AppError> {
        self.users.find_all(&page).await
    }

    /// Role ids currently assigned to a user.
    pub async fn role_ids(&self, user_id: i64) -> Result<Vec<i64>, AppError> {
        self.assignments.role_ids_for_user(user_id).await
    }

    /// Creates a user.
    pub async fn create(
        &self,
        data: CreateUser,
        options: Option<&MutationOptions>,
    ) -> Result<User, AppError> {
        let mut tx = self.db.begin().await?;
        let user = self.create_in(&mut *tx, &data, options).await?;
        tx.commit().await?;
        Ok(user)
    }

    /// Creates a user inside the caller's transaction.
    pub(crate) async fn create_in(
        &self,
        conn: &mut PgConnection,
        data: &CreateUser,
        options: Option<&MutationOptions>,
    ) -> Result<User, AppError> {
        require_text(&data.username, "Username")?;
        require_text(&data.password_hash, "Password hash")?;

        let user = self.users.create(&mut *conn, data).await?;
        let change = EntityChange::created(user.snapshot()?);
        self.hooks
            .after_mutation(
                HookAction::Create,
                Affected::One(&change),
                options,
                ModelName::User,
                conn,
            )
            .await?;

        info!(user_id = user.id, username = %user.username, "User created");
        Ok(user)
    }

    /// Updates a user.
    pub async fn update(
        &self,
        id: i64,
        data: UpdateUser,
        options: Option<&MutationOptions>,
    ) -> Result<User, AppError> {
        optional_text(data.username.as_deref(), "Username")?;
        optional_text(data.password_hash.as_deref(), "Password hash")?;

        let mut tx = self.db.begin().await?;
        let before = self.require_user(&mut *tx, id).await?;
        let after = self.users.update(&mut *tx, id, &data).await?;

        let change = EntityChange::updated(before.snapshot()?, after.snapshot()?)?;
        self.hooks
            .after_mutation(
                HookAction::Update,
                Affected::One(&change),
                options,
                ModelName::User,
                &mut *tx,
            )
            .await?;
        tx.commit().await?;

        info!(user_id = id, "User updated");
        Ok(after)
    }

    /// Deletes a user, unassigning its roles first.
    pub async fn delete(&self, id: i64, options: Option<&MutationOptions>) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        let before = self.require_user(&mut *tx, id).await?;

        let assignments = self.assignments.lock_for_user(&mut *tx, id).await?;
        self.unassign(&mut *tx, &assignments, options).await?;
        self.users.delete(&mut *tx, id).await?;

        let change = EntityChange::deleted(before.snapshot()?);
        self.hooks
            .after_mutation(
                HookAction::Destroy,
                Affected::One(&change),
                options,
                ModelName::User,
                &mut *tx,
            )
            .await?;
        tx.commit().await?;

        info!(user_id = id, "User deleted");
        Ok(())
    }

    /// Replaces the roles assigned to a user.
    pub async fn set_roles(
        &self,
        user_id: i64,
        role_ids: &[i64],
        options: Option<&MutationOptions>,
    ) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        self.set_roles_in(&mut *tx, user_id, role_ids, options).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Replaces the roles of a user inside the caller's transaction.
    pub(crate) async fn set_roles_in(
        &self,
        conn: &mut PgConnection,
        user_id: i64,
        role_ids: &[i64],
        options: Option<&MutationOptions>,
    ) -> Result<(), AppError> {
        self.require_user(&mut *conn, user_id).await?;
        let found = self.roles.existing_ids(&mut *conn, role_ids).await?;
        require_all(role_ids, &found, "Role")?;

        let current = self.assignments.lock_for_user(&mut *conn, user_id).await?;
        let current_ids: Vec<i64> = current.iter().map(|a| a.role_id).collect();
        let (to_add, to_remove) = reconcile(&current_ids, role_ids);

        let removed: Vec<UserRole> = current
            .into_iter()
            .filter(|a| to_remove.contains(&a.role_id))
            .collect();
        self.unassign(&mut *conn, &removed, options).await?;

        let added: Vec<UserRole> = to_add
            .into_iter()
            .map(|role_id| UserRole::new(user_id, role_id))
            .collect();
        let assigned = self.assign(conn, &added, options).await?;

        info!(
            user_id,
            assigned,
            unassigned = removed.len(),
            "User roles replaced"
        );
        Ok(())
    }

    /// Assigns one role to a user.
    pub async fn add_role(
        &self,
        user_id: i64,
        role_id: i64,
        options: Option<&MutationOptions>,
    ) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        self.add_roles_in(&mut *tx, user_id, &[role_id], options).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Assigns roles a user does not hold yet, keeping the rest.
    ///
    /// Returns how many assignments were inserted.
    pub(crate) async fn add_roles_in(
        &self,
        conn: &mut PgConnection,
        user_id: i64,
        role_ids: &[i64],
        options: Option<&MutationOptions>,
    ) -> Result<usize, AppError> {
        self.require_user(&mut *conn, user_id).await?;
        let found = self.roles.existing_ids(&mut *conn, role_ids).await?;
        require_all(role_ids, &found, "Role")?;

        let rows: Vec<UserRole> = role_ids
            .iter()
            .map(|&role_id| UserRole::new(user_id, role_id))
            .collect();
        self.assign(conn, &rows, options).await
    }

    /// Removes one role from a user.
    pub async fn remove_role(
        &self,
        user_id: i64,
        role_id: i64,
        options: Option<&MutationOptions>,
    ) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        let removed: Vec<UserRole> = self
            .assignments
            .lock_for_user(&mut *tx, user_id)
            .await?
            .into_iter()
            .filter(|a| a.role_id == role_id)
            .collect();
        self.unassign(&mut *tx, &removed, options).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn require_user(&self, conn: &mut PgConnection, user_id: i64) -> Result<User, AppError> {
        self.users
            .lock(conn, user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }

    async fn assign(
        &self,
        conn: &mut PgConnection,
        rows: &[UserRole],
        options: Option<&MutationOptions>,
    ) -> Result<usize, AppError> {
        let inserted = self.assignments.insert_many(&mut *conn, rows).await?;
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
                ModelName::UserRole,
                conn,
            )
            .await?;
        Ok(inserted.len())
    }

    async fn unassign(
        &self,
        conn: &mut PgConnection,
        rows: &[UserRole],
        options: Option<&MutationOptions>,
    ) -> Result<(), AppError> {
        if rows.is_empty() {
            return Ok(());
        }
        let snapshots = self.hooks.before_mutation(rows)?;
        self.assignments.delete_many(&mut *conn, rows).await?;

        let changes: Vec<EntityChange> = snapshots.into_iter().map(EntityChange::deleted).collect();
        self.hooks
            .after_mutation(
                HookAction::Destroy,
                Affected::Many(&changes),
                options,
                ModelName::UserRole,
                conn,
            )
            .await?;
        Ok(())
    }
}
