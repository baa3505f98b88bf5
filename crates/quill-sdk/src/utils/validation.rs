//! Validation Utilities
//!
//! Input checks that run before any store write.

use crate::{SDKError, SDKResult};

/// Require a non-blank text field
pub fn require_text(field: &str, value: &str) -> SDKResult<()> {
    if value.trim().is_empty() {
        return Err(SDKError::validation(field, "must not be empty"));
    }
    Ok(())
}

/// Require a weight in [0, 1]
pub fn require_unit_interval(field: &str, value: f64) -> SDKResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SDKError::validation(field, "must be between 0 and 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text() {
        assert!(require_text("title", "Launch").is_ok());
        let err = require_text("title", "   ").unwrap_err();
        assert_eq!(err.invalid_field(), Some("title"));
    }

    #[test]
    fn test_require_unit_interval() {
        assert!(require_unit_interval("importance", 0.0).is_ok());
        assert!(require_unit_interval("importance", 1.0).is_ok());
        assert!(require_unit_interval("importance", 1.2).is_err());
        assert!(require_unit_interval("relevance", f64::NAN).is_err());
    }
}
