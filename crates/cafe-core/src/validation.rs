//! # Validation Module
//!
//! Checks that run before the resolver sees an item or a saved selection.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Item editor dialog                                           │
//! │  └── Basic format checks (empty labels)                                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── validate_canonical_item  - unique keys, governor references       │
//! │  └── validate_saved_payload   - saved keys still exist on the item     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Resolver                                                     │
//! │  └── Total functions, assumes well-formed input                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validators stop at the first problem, like the rest of the POS.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::menu::{CanonicalItem, OptionGroup, SelectionMode};
use crate::money::Money;
use crate::selection::SelectionPayload;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Canonical Item
// =============================================================================

/// Validates a canonical item definition.
///
/// ## Rules
/// - Item name, every key, id and label must be non-empty
/// - Base ingredient keys are unique; group ids are unique
/// - Option keys are unique within their group
/// - An explicit `governedBy` must name a base ingredient of the item
/// - A required single group must offer at least one option
/// - Every price delta is within [`Money::MAX_DOCUMENT`]
///
/// ## Example
/// ```rust
/// use cafe_core::menu::{BaseIngredient, CanonicalItem};
/// use cafe_core::validation::validate_canonical_item;
///
/// let item = CanonicalItem::new("latte")
///     .with_base(BaseIngredient::new("milk", "Milk", true))
///     .with_base(BaseIngredient::new("milk", "Oat milk", false));
/// assert!(validate_canonical_item(&item).is_err());
/// ```
pub fn validate_canonical_item(item: &CanonicalItem) -> ValidationResult<()> {
    require_non_empty("name", &item.name)?;

    let mut base_keys = HashSet::new();
    for (i, base) in item.base_ingredients.iter().enumerate() {
        require_non_empty(&format!("baseIngredients[{}].key", i), &base.key)?;
        require_non_empty(&format!("baseIngredients[{}].label", i), &base.label)?;
        require_document_amount(&format!("baseIngredients[{}].priceDelta", i), base.price_delta)?;
        if !base_keys.insert(base.key.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "base ingredient key".to_string(),
                value: base.key.clone(),
            });
        }
    }

    let mut group_ids = HashSet::new();
    for (i, group) in item.option_groups.iter().enumerate() {
        require_non_empty(&format!("optionGroups[{}].id", i), &group.id)?;
        require_non_empty(&format!("optionGroups[{}].label", i), &group.label)?;
        if !group_ids.insert(group.id.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "option group id".to_string(),
                value: group.id.clone(),
            });
        }

        if let Some(governor) = group.governed_by.as_deref() {
            if !base_keys.contains(governor) {
                return Err(ValidationError::UnknownReference {
                    field: format!("optionGroups[{}].governedBy", i),
                    value: governor.to_string(),
                });
            }
        }

        validate_group_options(i, group)?;
    }

    Ok(())
}

fn validate_group_options(index: usize, group: &OptionGroup) -> ValidationResult<()> {
    if group.mode == SelectionMode::Single && group.required && group.options.is_empty() {
        return Err(ValidationError::Required {
            field: format!("optionGroups[{}].options", index),
        });
    }

    let mut option_keys = HashSet::new();
    for (j, option) in group.options.iter().enumerate() {
        require_non_empty(&format!("optionGroups[{}].options[{}].key", index, j), &option.key)?;
        require_non_empty(
            &format!("optionGroups[{}].options[{}].label", index, j),
            &option.label,
        )?;
        require_document_amount(
            &format!("optionGroups[{}].options[{}].priceDelta", index, j),
            option.price_delta,
        )?;
        if !option_keys.insert(option.key.as_str()) {
            return Err(ValidationError::Duplicate {
                field: format!("option key in {}", group.id),
                value: option.key.clone(),
            });
        }
    }

    Ok(())
}

fn require_non_empty(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn require_document_amount(field: &str, amount: Option<Money>) -> ValidationResult<()> {
    match amount {
        Some(amount) if !amount.is_document_amount() => Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("{} is outside +/-{}", amount, Money::MAX_DOCUMENT),
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Saved Payload
// =============================================================================

/// Validates a saved selection against the item it belongs to.
///
/// Catches lines saved against an older version of the item (an option that
/// was since removed, a group that changed from multiple to single).
///
/// ## Rules
/// - Every saved base key names an ingredient of the item
/// - Every saved group id names a group of the item
/// - Every saved option key exists in its group
/// - A single group holds at most one key
pub fn validate_saved_payload(
    item: &CanonicalItem,
    payload: &SelectionPayload,
) -> ValidationResult<()> {
    for key in &payload.base_included_keys {
        if item.base(key).is_none() {
            return Err(ValidationError::UnknownReference {
                field: "baseIncludedKeys".to_string(),
                value: key.clone(),
            });
        }
    }

    for (group_id, keys) in &payload.option_selections {
        let group = item
            .group(group_id)
            .ok_or_else(|| ValidationError::UnknownReference {
                field: "optionSelections".to_string(),
                value: group_id.clone(),
            })?;

        if group.mode == SelectionMode::Single && keys.len() > 1 {
            return Err(ValidationError::InvalidFormat {
                field: format!("optionSelections.{}", group_id),
                reason: format!("single-choice group holds {} keys", keys.len()),
            });
        }

        if let Some(unknown) = keys.iter().find(|k| !group.has_option(k)) {
            return Err(ValidationError::UnknownReference {
                field: format!("optionSelections.{}", group_id),
                value: unknown.clone(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
