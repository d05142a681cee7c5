//! Input checks shared by the entity services.

use stockroom_core::error::AppError;

/// Reject blank names and descriptions.
pub(crate) fn require_text(value: &str, label: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{label} cannot be empty")));
    }
    Ok(())
}

/// Reject an optional replacement value that is blank.
pub(crate) fn optional_text(value: Option<&str>, label: &str) -> Result<(), AppError> {
    value.map_or(Ok(()), |v| require_text(v, label))
}

/// Reject item quantities below one.
pub(crate) fn require_quantity(quantity: i32) -> Result<(), AppError> {
    if quantity < 1 {
        return Err(AppError::validation("Quantity must be at least 1"));
    }
    Ok(())
}
