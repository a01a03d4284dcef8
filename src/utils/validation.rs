//! Input validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::{MatrixError, MatrixResult};

/// Regex for dotted resource keys (e.g. `menu.admin.users`)
static RESOURCE_KEY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*(\.[A-Za-z0-9_-]+)*$").unwrap()
});

/// Regex for permission codes (e.g. `VIEW`, `EXPORT_CSV`)
static PERMISSION_CODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_:-]*$").unwrap()
});

/// Validate a resource key
pub fn validate_resource_key(key: &str) -> bool {
    !key.is_empty() && key.len() <= 255 && RESOURCE_KEY_REGEX.is_match(key)
}

/// Validate a permission code
pub fn validate_permission_code(code: &str) -> bool {
    !code.is_empty() && code.len() <= 64 && PERMISSION_CODE_REGEX.is_match(code)
}

/// Check a resource key, returning a structured error when malformed
pub fn ensure_resource_key(key: &str) -> MatrixResult<()> {
    if validate_resource_key(key) {
        Ok(())
    } else {
        Err(MatrixError::InvalidResourceKey(key.to_string()))
    }
}

/// Check a permission code, returning a structured error when malformed
pub fn ensure_permission_code(code: &str) -> MatrixResult<()> {
    if validate_permission_code(code) {
        Ok(())
    } else {
        Err(MatrixError::InvalidPermissionCode(code.to_string()))
    }
}
