//! Access-control services: users, roles, permissions and their assignments.

pub mod permission;
pub mod role;
pub mod user;

pub use permission::PermissionService;
pub use role::RoleService;
pub use user::UserService;

use std::collections::{BTreeSet, HashSet};

use stockroom_core::error::AppError;

/// Split a replacement set into ids to add and ids to remove.
pub(crate) fn reconcile(current: &[i64], wanted: &[i64]) -> (Vec<i64>, Vec<i64>) {
    let current: HashSet<i64> = current.iter().copied().collect();
    let wanted: BTreeSet<i64> = wanted.iter().copied().collect();
    let to_add = wanted.iter().filter(|id| !current.contains(id)).copied().collect();
    let mut to_remove: Vec<i64> = current.into_iter().filter(|id| !wanted.contains(id)).collect();
    to_remove.sort_unstable();
    (to_add, to_remove)
}

/// Fail unless every id in `requested` was found.
pub(crate) fn require_all(requested: &[i64], found: &[i64], what: &str) -> Result<(), AppError> {
    let found: HashSet<i64> = found.iter().copied().collect();
    let missing: BTreeSet<i64> = requested.iter().filter(|id| !found.contains(id)).copied().collect();
    if missing.is_empty() {
        return Ok(());
    }
    let ids: Vec<String> = missing.iter().map(i64::to_string).collect();
    Err(AppError::not_found(format!("{what} not found: {}", ids.join(", "))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconcile() {
        let (add, remove) = reconcile(&[1, 2, 3], &[3, 4, 4, 5]);
        assert_eq!(add, vec![4, 5]);
        assert_eq!(remove, vec![1, 2]);

        let (add, remove) = reconcile(&[2], &[2]);
        assert!(add.is_empty() && remove.is_empty());
    }

    #[test]
    fn test_require_all_lists_missing_ids() {
        assert!(require_all(&[1, 2], &[2, 1], "Role").is_ok());
        let err = require_all(&[1, 7, 9], &[1], "Role").unwrap_err();
        assert_eq!(err.message, "Role not found: 7, 9");
    }
}
