//! Change-log read path with viewer-dependent redaction.

use std::sync::Arc;

use serde_json::Value;

use stockroom_core::config::AuditConfig;
use stockroom_core::error::AppError;
use stockroom_core::types::pagination::{PageRequest, PageResponse};
use stockroom_database::repositories::ChangeLogRepository;
use stockroom_entity::change_log::{Association, ChangeLogEntry};

/// Who is reading the change log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
    /// An ordinary reader; sensitive values are masked.
    Generic,
    /// A reader allowed to see sensitive values.
    Trusted,
}

/// Serves the per-entity change-log trail.
#[derive(Debug, Clone)]
pub struct ChangeLogQueryService {
    /// Change-log repository.
    repo: Arc<ChangeLogRepository>,
    /// Redaction and paging settings.
    audit: AuditConfig,
}

impl ChangeLogQueryService {
    /// Creates a new change-log query service.
    pub fn new(repo: Arc<ChangeLogRepository>, audit: AuditConfig) -> Self {
        Self { repo, audit }
    }

    /// Build a page request from optional caller input.
    pub fn page_request(&self, page: Option<u64>, page_size: Option<u64>) -> PageRequest {
        PageRequest::bounded(
            page.unwrap_or(1),
            page_size.unwrap_or(self.audit.default_page_size),
            self.audit.max_page_size,
        )
    }

    /// Page through the change log of one entity, oldest first.
    pub async fn list_by_association(
        &self,
        viewer: Viewer,
        association: Association,
        id: i64,
        page: PageRequest,
    ) -> Result<PageResponse<ChangeLogEntry>, AppError> {
        if id < 1 {
            return Err(AppError::validation(format!("Invalid {}", association.column())));
        }
        let page = PageRequest::bounded(page.page, page.page_size, self.audit.max_page_size);

        let result = self.repo.list_by_association(association, id, &page).await?;

        Ok(match viewer {
            Viewer::Trusted => result,
            Viewer::Generic => result.map(|entry| redact(entry, &self.audit)),
        })
    }
}

/// Mask the values of every sensitive detail.
pub fn redact(mut entry: ChangeLogEntry, audit: &AuditConfig) -> ChangeLogEntry {
    for detail in entry
        .details
        .iter_mut()
        .filter(|d| audit.is_sensitive(&d.field))
    {
        detail.old_value = Some(Value::String(audit.mask.clone()));
        detail.new_value = Some(Value::String(audit.mask.clone()));
    }
    entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use stockroom_entity::change_log::{
        ActorId, ChangeLog, ChangeLogAssociations, ChangeLogDetail, DiffType, Operation,
    };

    fn detail(id: i64, field: &str, old: Option<Value>, new: Option<Value>) -> ChangeLogDetail {
        ChangeLogDetail {
            id,
            change_log_id: 1,
            field: field.to_string(),
            old_value: old,
            new_value: new,
            diff_type: DiffType::Changed,
            metadata: None,
            created_at: Utc::now(),
        }
    }

    fn entry() -> ChangeLogEntry {
        ChangeLogEntry {
            change_log: ChangeLog {
                id: 1,
                operation: Operation::Update,
                change_details: None,
                changed_at: Utc::now(),
                changed_by: ActorId::SYSTEM,
                associations: ChangeLogAssociations::single(Association::User, 4),
            },
            details: vec![
                detail(1, "password_hash", Some(json!("$argon2$old")), Some(json!("$argon2$new"))),
                detail(2, "username", Some(json!("ann")), Some(json!("anna"))),
            ],
        }
    }

    #[test]
    fn test_generic_viewer_sees_mask() {
        let redacted = redact(entry(), &AuditConfig::default());
        assert_eq!(redacted.details[0].old_value, Some(json!("************")));
        assert_eq!(redacted.details[0].new_value, Some(json!("************")));
        assert_eq!(redacted.details[1].new_value, Some(json!("anna")));
    }

    #[test]
    fn test_custom_sensitive_fields() {
        let audit = AuditConfig {
            sensitive_fields: vec!["username".into()],
            mask: "###".into(),
            ..AuditConfig::default()
        };
        let redacted = redact(entry(), &audit);
        assert_eq!(redacted.details[0].old_value, Some(json!("$argon2$old")));
        assert_eq!(redacted.details[1].old_value, Some(json!("###")));
    }
}
