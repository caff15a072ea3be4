// src/domain/validation.rs

use thiserror::Error;

use crate::domain::market::DraftListing;
use crate::domain::postal_code::validate_postal_code;

/// User-correctable problems with a draft. Only the first one is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a location on the map")]
    MissingLocation,
    #[error("Please enter a valid Dutch postal code (e.g., 1234 AB)")]
    InvalidPostalCode,
    #[error("Please select at least one operating day")]
    NoOperatingDays,
    #[error("Please select at least one category")]
    NoCategories,
    #[error("Please enter a market name")]
    MissingName,
    #[error("Please enter a description")]
    MissingDescription,
}

/// Checks the draft in a fixed priority order and stops at the first failure.
pub fn validate(draft: &DraftListing) -> Result<(), ValidationError> {
    if draft.coordinate.is_none() {
        return Err(ValidationError::MissingLocation);
    }
    if !validate_postal_code(&draft.address.postal_code) {
        return Err(ValidationError::InvalidPostalCode);
    }
    if draft.operating_days.is_empty() {
        return Err(ValidationError::NoOperatingDays);
    }
    if draft.categories.is_empty() {
        return Err(ValidationError::NoCategories);
    }
    if draft.name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }
    if draft.description.trim().is_empty() {
        return Err(ValidationError::MissingDescription);
    }
    Ok(())
}
