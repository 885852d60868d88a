//! # Error Types
//!
//! Domain-specific error types for cafe-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cafe-core errors (this file)                                          │
//! │  ├── CoreError        - Checked selection edits that cannot apply      │
//! │  └── ValidationError  - Malformed menu items or saved selections       │
//! │                                                                         │
//! │  cafe-cli errors (separate crate)                                      │
//! │  └── CliError         - File, config and argument failures             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CliError → exit code + message    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The permissive resolver operations never return these. They are only
//! produced by the validation layer and by the `try_*` operations used
//! under [`UnknownKeyPolicy::Reject`](crate::resolver::UnknownKeyPolicy).

use thiserror::Error;

use crate::menu::SelectionMode;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised by checked selection edits.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// No base ingredient with this key on the item.
    #[error("Ingredient not found on {item}: {key}")]
    IngredientNotFound { item: String, key: String },

    /// No option group with this id on the item.
    #[error("Option group not found on {item}: {group_id}")]
    GroupNotFound { item: String, group_id: String },

    /// The group exists but has no option with this key.
    #[error("Option {option_key} not found in group {group_id}")]
    OptionNotFound {
        group_id: String,
        option_key: String,
    },

    /// A single-choice edit was sent to a multiple-choice group, or the reverse.
    ///
    /// ## When This Occurs
    /// ```text
    /// UI renders "syrups" as radio buttons (stale item definition)
    ///      │
    ///      ▼
    /// try_set_single_selection("syrups", "vanilla")
    ///      │
    ///      ▼
    /// ModeMismatch { group_id: "syrups", expected: Single, actual: Multiple }
    /// ```
    #[error("Group {group_id} is {actual:?}, cannot apply a {expected:?} edit")]
    ModeMismatch {
        group_id: String,
        expected: SelectionMode,
        actual: SelectionMode,
    },

    /// Tried to toggle an ingredient that is always included.
    #[error("Ingredient {key} cannot be removed")]
    IngredientNotRemovable { key: String },

    /// A unit price or line total does not fit in `Money`.
    #[error("Price overflow computing {what}")]
    PriceOverflow { what: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors for menu item definitions and saved selections.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Duplicate key within its scope (e.g. two options keyed "oat").
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// A reference to a key that does not exist on the item.
    #[error("{field} references unknown key '{value}'")]
    UnknownReference { field: String, value: String },

    /// Invalid shape (e.g. two keys saved for a single-choice group).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::OptionNotFound {
            group_id: "milk-type".to_string(),
            option_key: "hemp".to_string(),
        };
        assert_eq!(err.to_string(), "Option hemp not found in group milk-type");

        let err = CoreError::ModeMismatch {
            group_id: "syrups".to_string(),
            expected: SelectionMode::Single,
            actual: SelectionMode::Multiple,
        };
        assert_eq!(
            err.to_string(),
            "Group syrups is Multiple, cannot apply a Single edit"
        );
    }

    #[test]
    fn test_price_overflow_message() {
        let err = CoreError::PriceOverflow {
            what: "line total".to_string(),
        };
        assert_eq!(err.to_string(), "Price overflow computing line total");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Duplicate {
            field: "option key".to_string(),
            value: "oat".to_string(),
        };
        assert_eq!(err.to_string(), "option key 'oat' already exists");

        let err = ValidationError::UnknownReference {
            field: "optionGroups[0].governedBy".to_string(),
            value: "cream".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "optionGroups[0].governedBy references unknown key 'cream'"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
