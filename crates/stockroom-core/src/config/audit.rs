//! Change-log read-side configuration.

use serde::{Deserialize, Serialize};

use crate::types::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Settings for reading the change-log trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Detail fields whose values are masked for generic readers.
    #[serde(default = "default_sensitive_fields")]
    pub sensitive_fields: Vec<String>,
    /// Token substituted for masked values.
    #[serde(default = "default_mask")]
    pub mask: String,
    /// Page size used when the caller does not provide one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    /// Largest page size a caller may request.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
}

impl AuditConfig {
    /// Check whether a detail field is designated sensitive.
    pub fn is_sensitive(&self, field: &str) -> bool {
        self.sensitive_fields.iter().any(|f| f == field)
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            sensitive_fields: default_sensitive_fields(),
            mask: default_mask(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
        }
    }
}

fn default_sensitive_fields() -> Vec<String> {
    vec!["password_hash".to_string()]
}

fn default_mask() -> String {
    "************".to_string()
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

fn default_max_page_size() -> u64 {
    MAX_PAGE_SIZE
}
