//! Wiring of every service around a shared pool.

use std::sync::Arc;

use stockroom_core::config::AppConfig;
use stockroom_database::DatabasePool;
use stockroom_database::repositories::{
    CategoryRepository, ChangeLogRepository, DepartmentRepository, ItemRepository,
    PermissionRepository, RolePermissionRepository, RoleRepository, UserRepository,
    UserRoleRepository,
};

use crate::access::{PermissionService, RoleService, UserService};
use crate::bootstrap::BootstrapService;
use crate::change_log::{ChangeLogQueryService, ChangeLogWriter, EntityHookAdapter};
use crate::inventory::{CategoryService, DepartmentService, ItemService};

/// Every service, sharing one pool and one hook adapter.
#[derive(Debug, Clone)]
pub struct Services {
    // ── Inventory ────────────────────────────────────────────
    /// Item service
    pub items: Arc<ItemService>,
    /// Category service
    pub categories: Arc<CategoryService>,
    /// Department service
    pub departments: Arc<DepartmentService>,

    // ── Access ───────────────────────────────────────────────
    /// Role service
    pub roles: Arc<RoleService>,
    /// Permission service
    pub permissions: Arc<PermissionService>,
    /// User service
    pub users: Arc<UserService>,

    // ── Change log ───────────────────────────────────────────
    /// Change-log read path
    pub change_logs: Arc<ChangeLogQueryService>,
    /// Admin seeding
    pub bootstrap: Arc<BootstrapService>,
}

impl Services {
    /// Build every repository and service over `db`.
    pub fn new(db: DatabasePool, config: &AppConfig) -> Self {
        let pool = db.pool().clone();

        let item_repo = Arc::new(ItemRepository::new(pool.clone()));
        let category_repo = Arc::new(CategoryRepository::new(pool.clone()));
        let department_repo = Arc::new(DepartmentRepository::new(pool.clone()));
        let role_repo = Arc::new(RoleRepository::new(pool.clone()));
        let permission_repo = Arc::new(PermissionRepository::new(pool.clone()));
        let user_repo = Arc::new(UserRepository::new(pool.clone()));
        let user_role_repo = Arc::new(UserRoleRepository::new(pool.clone()));
        let role_permission_repo = Arc::new(RolePermissionRepository::new(pool.clone()));
        let change_log_repo = Arc::new(ChangeLogRepository::new(pool));

        let hooks = Arc::new(EntityHookAdapter::new(ChangeLogWriter::new()));

        let items = Arc::new(ItemService::new(db.clone(), item_repo.clone(), hooks.clone()));
        let categories = Arc::new(CategoryService::new(
            db.clone(),
            category_repo,
            item_repo.clone(),
            hooks.clone(),
        ));
        let departments = Arc::new(DepartmentService::new(
            db.clone(),
            department_repo,
            item_repo,
            hooks.clone(),
        ));
        let roles = Arc::new(RoleService::new(
            db.clone(),
            role_repo.clone(),
            permission_repo.clone(),
            role_permission_repo,
            user_role_repo.clone(),
            hooks.clone(),
        ));
        let permissions = Arc::new(PermissionService::new(
            db.clone(),
            permission_repo.clone(),
            hooks.clone(),
        ));
        let users = Arc::new(UserService::new(
            db.clone(),
            user_repo.clone(),
            role_repo.clone(),
            user_role_repo,
            hooks,
        ));
        let change_logs = Arc::new(ChangeLogQueryService::new(
            change_log_repo,
            config.audit.clone(),
        ));
        let bootstrap = Arc::new(BootstrapService::new(
            db,
            config.bootstrap.clone(),
            permission_repo,
            role_repo,
            user_repo,
            permissions.clone(),
            roles.clone(),
            users.clone(),
        ));

        Self {
            items,
            categories,
            departments,
            roles,
            permissions,
            users,
            change_logs,
            bootstrap,
        }
    }
}
