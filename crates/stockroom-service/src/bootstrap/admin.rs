//! Seeds the default permission set and the admin account.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use stockroom_core::config::BootstrapConfig;
use stockroom_core::error::AppError;
use stockroom_database::DatabasePool;
use stockroom_database::repositories::{PermissionRepository, RoleRepository, UserRepository};
use stockroom_entity::permission::CreatePermission;
use stockroom_entity::role::CreateRole;
use stockroom_entity::user::CreateUser;

use crate::access::{PermissionService, RoleService, UserService};
use crate::context::MutationOptions;

/// Entities every permission is generated for.
const RESOURCES: &[&str] = &["item", "category", "department", "role", "user"];

/// Actions granted on each resource.
const ACTIONS: &[&str] = &["create", "get", "update", "delete"];

/// Description of the seeded admin role.
const ADMIN_ROLE_DESCRIPTION: &str = "Administrator role with full permissions";

/// Names of the permissions seeded on first run, in creation order.
pub fn default_permissions() -> Vec<String> {
    let mut names: Vec<String> = ACTIONS
        .iter()
        .flat_map(|action| RESOURCES.iter().map(move |resource| format!("{action}_{resource}")))
        .collect();
    names.push("get_permission".to_string());
    names
}

fn describe(name: &str) -> String {
    match name.split_once('_') {
        Some((action, resource)) => format!("Allows to {action} {resource} records"),
        None => format!("Allows {name}"),
    }
}

/// What a seeding run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BootstrapReport {
    /// Permissions created by this run.
    pub permissions_created: usize,
    /// The admin role id.
    pub role_id: i64,
    /// Whether the admin role was created by this run.
    pub role_created: bool,
    /// Grants added to the admin role.
    pub permissions_granted: usize,
    /// The admin user id.
    pub user_id: i64,
    /// Whether the admin user was created by this run.
    pub user_created: bool,
    /// Whether the admin user gained the admin role in this run.
    pub role_assigned: bool,
}

/// Creates the admin role, user and default permissions when missing.
///
/// Every write is attributed to the system actor and audited.
#[derive(Debug, Clone)]
pub struct BootstrapService {
    db: DatabasePool,
    config: BootstrapConfig,
    permission_repo: Arc<PermissionRepository>,
    role_repo: Arc<RoleRepository>,
    user_repo: Arc<UserRepository>,
    permissions: Arc<PermissionService>,
    roles: Arc<RoleService>,
    users: Arc<UserService>,
}

impl BootstrapService {
    /// Creates a new bootstrap service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        db: DatabasePool,
        config: BootstrapConfig,
        permission_repo: Arc<PermissionRepository>,
        role_repo: Arc<RoleRepository>,
        user_repo: Arc<UserRepository>,
        permissions: Arc<PermissionService>,
        roles: Arc<RoleService>,
        users: Arc<UserService>,
    ) -> Self {
        Self {
            db,
            config,
            permission_repo,
            role_repo,
            user_repo,
            permissions,
            roles,
            users,
        }
    }

    /// Seed everything that is missing, in a single transaction.
    ///
    /// Running it again on a seeded database changes nothing.
    pub async fn populate_admin(&self) -> Result<BootstrapReport, AppError> {
        let options = MutationOptions::system();
        let mut report = BootstrapReport::default();
        let mut tx = self.db.begin().await?;

        let names = default_permissions();
        let mut permission_ids = Vec::with_capacity(names.len());
        let existing = self.permission_repo.find_by_names(&mut *tx, &names).await?;
        let known: HashSet<&str> = existing.iter().map(|p| p.name.as_str()).collect();
        permission_ids.extend(existing.iter().map(|p| p.id));

        for name in names.iter().filter(|name| !known.contains(name.as_str())) {
            let data = CreatePermission {
                name: name.clone(),
                description: describe(name),
            };
            let permission = self.permissions.create_in(&mut *tx, &data, Some(&options)).await?;
            permission_ids.push(permission.id);
            report.permissions_created += 1;
        }

        let role = match self.role_repo.find_by_name(&mut *tx, &self.config.admin_role).await? {
            Some(role) => role,
            None => {
                let data = CreateRole {
                    name: self.config.admin_role.clone(),
                    description: Some(ADMIN_ROLE_DESCRIPTION.to_string()),
                };
                report.role_created = true;
                self.roles.create_in(&mut *tx, &data, Some(&options)).await?
            }
        };
        report.role_id = role.id;
        report.permissions_granted = self
            .roles
            .add_permissions_in(&mut *tx, role.id, &permission_ids, Some(&options))
            .await?;

        let user = match self
            .user_repo
            .find_by_username(&mut *tx, &self.config.admin_username)
            .await?
        {
            Some(user) => user,
            None => {
                if self.config.admin_password_hash.trim().is_empty() {
                    return Err(AppError::configuration(
                        "bootstrap.admin_password_hash must be set to seed the admin user",
                    ));
                }
                let data = CreateUser {
                    username: self.config.admin_username.clone(),
                    password_hash: self.config.admin_password_hash.clone(),
                };
                report.user_created = true;
                self.users.create_in(&mut *tx, &data, Some(&options)).await?
            }
        };
        report.user_id = user.id;
        report.role_assigned = self
            .users
            .add_roles_in(&mut *tx, user.id, &[role.id], Some(&options))
            .await?
            > 0;

        tx.commit().await?;

        info!(
            permissions_created = report.permissions_created,
            role_created = report.role_created,
            user_created = report.user_created,
            "Admin bootstrap complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_permissions() {
        let names = default_permissions();
        assert_eq!(names.len(), 21);
        assert_eq!(names[0], "create_item");
        assert!(names.contains(&"delete_user".to_string()));
        assert_eq!(names.last().map(String::as_str), Some("get_permission"));
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe("update_category"), "Allows to update category records");
        assert_eq!(describe("audit"), "Allows audit");
    }
}
