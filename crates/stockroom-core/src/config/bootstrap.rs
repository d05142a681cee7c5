//! Bootstrap seeding configuration.

use serde::{Deserialize, Serialize};

/// Settings for seeding the initial admin account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Username of the seeded admin account.
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    /// Pre-hashed password stored for the seeded admin account.
    #[serde(default)]
    pub admin_password_hash: String,
    /// Name of the role granted every permission.
    #[serde(default = "default_admin_role")]
    pub admin_role: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            admin_username: default_admin_username(),
            admin_password_hash: String::new(),
            admin_role: default_admin_role(),
        }
    }
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_role() -> String {
    "admin".to_string()
}
