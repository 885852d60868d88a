//! # Pricing Resolver
//!
//! Pure functions that seed, edit and price a [`SelectionState`].
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Customization Dialog                                                   │
//! │                                                                         │
//! │  open ─────────────► initialize(item, saved keys, saved selections)    │
//! │                                  │                                      │
//! │  click "Milk" ─────► toggle_base ─┤  (clears / restores milk-type)     │
//! │  click "Oat" ──────► set_single_selection                               │
//! │  tick "Vanilla" ───► toggle_multi_selection                             │
//! │                                  │                                      │
//! │  every render ─────► compute_total_delta ──► "+$0.50"                  │
//! │                                  │                                      │
//! │  save ─────────────► build_selection_payload ──► order line store      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every edit takes the current state by reference and returns a new value;
//! callers swap their snapshot in one step.
//!
//! The items passed in are expected to be [normalized](CanonicalItem::normalized):
//! governance is read from `governed_by` only.
//!
//! ## Two Flavours of Edit
//! - `toggle_base`, `set_single_selection`, `toggle_multi_selection` are
//!   permissive: unknown keys and mode mismatches leave the state unchanged.
//! - `try_*` variants check the edit against the item and return a
//!   [`CoreError`] instead. Which one a session uses is decided by
//!   [`UnknownKeyPolicy`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::menu::{CanonicalItem, OptionGroup, SelectionMode};
use crate::money::Money;
use crate::selection::{GroupSelection, SelectionPayload, SelectionState};

/// Separator between a base ingredient key and the rest of a group id.
pub const DEFAULT_GROUP_SEPARATOR: &str = "-";

// =============================================================================
// Resolver Options
// =============================================================================

/// What to do when an edit references a group or option the item lacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownKeyPolicy {
    /// Leave the state unchanged.
    #[default]
    Ignore,
    /// Return an error from the edit.
    Reject,
}

impl fmt::Display for UnknownKeyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnknownKeyPolicy::Ignore => write!(f, "ignore"),
            UnknownKeyPolicy::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for UnknownKeyPolicy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ignore" | "permissive" => Ok(UnknownKeyPolicy::Ignore),
            "reject" | "strict" => Ok(UnknownKeyPolicy::Reject),
            other => Err(ValidationError::InvalidFormat {
                field: "unknown_keys".to_string(),
                reason: format!("'{}' is not one of: ignore, reject", other),
            }),
        }
    }
}

/// Knobs for how items are read and edits are checked.
///
/// ```toml
/// group_separator = "-"
/// unknown_keys = "ignore"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverOptions {
    /// Separator used to infer governance from group ids.
    #[serde(default = "default_group_separator")]
    pub group_separator: String,

    #[serde(default)]
    pub unknown_keys: UnknownKeyPolicy,
}

fn default_group_separator() -> String {
    DEFAULT_GROUP_SEPARATOR.to_string()
}

impl Default for ResolverOptions {
    fn default() -> Self {
        ResolverOptions {
            group_separator: default_group_separator(),
            unknown_keys: UnknownKeyPolicy::default(),
        }
    }
}

// =============================================================================
// Initialize
// =============================================================================

/// Seeds the selection state for a dialog.
///
/// ## Rules
/// - Non-removable ingredients are always included.
/// - Otherwise, if `saved_base_keys` is non-empty, an ingredient is included
///   exactly when its key was saved; if it is empty, the declared default applies.
/// - A group with an entry in `saved_selections` takes it (single: first
///   element, or nothing when the list is empty or starts with `""`;
///   multiple: all elements). Other groups take their declared defaults.
///
/// ```rust
/// use cafe_core::menu::{BaseIngredient, CanonicalItem, OptionChoice, OptionGroup};
/// use cafe_core::resolver::initialize;
/// use std::collections::BTreeMap;
///
/// let item = CanonicalItem::new("latte")
///     .with_base(BaseIngredient::new("milk", "Milk", true))
///     .with_group(
///         OptionGroup::single("milk-type", "Milk type", vec![
///             OptionChoice::new("whole", "Whole"),
///             OptionChoice::new("oat", "Oat"),
///         ])
///         .required(),
///     )
///     .normalized("-");
///
/// let state = initialize(&item, &[], &BTreeMap::new());
/// assert!(state.is_included("milk"));
/// assert_eq!(state.single_key("milk-type"), "whole");
/// ```
pub fn initialize(
    item: &CanonicalItem,
    saved_base_keys: &[String],
    saved_selections: &BTreeMap<String, Vec<String>>,
) -> SelectionState {
    let mut state = SelectionState::default();

    for base in &item.base_ingredients {
        let included = if !base.removable {
            true
        } else if !saved_base_keys.is_empty() {
            saved_base_keys.iter().any(|k| *k == base.key)
        } else {
            base.is_default
        };
        state = state.with_included(&base.key, included);
    }

    for group in &item.option_groups {
        let selection = match saved_selections.get(&group.id) {
            Some(saved) => selection_from_saved(group, saved),
            None => group.default_selection(),
        };
        state = state.with_group(&group.id, selection);
    }

    debug!(
        item = %item.name,
        restored = !saved_base_keys.is_empty() || !saved_selections.is_empty(),
        "Initialized selection state"
    );
    state
}

/// Seeds the selection state from a previously saved payload.
pub fn initialize_from_payload(item: &CanonicalItem, saved: &SelectionPayload) -> SelectionState {
    initialize(item, &saved.base_included_keys, &saved.option_selections)
}

/// Saved lists are taken as written: a single group keeps the first element
/// (`""` meaning nothing selected), a multiple group keeps every element.
fn selection_from_saved(group: &OptionGroup, saved: &[String]) -> GroupSelection {
    match group.mode {
        SelectionMode::Single => {
            GroupSelection::Single(saved.first().filter(|k| !k.is_empty()).cloned())
        }
        SelectionMode::Multiple => GroupSelection::Multiple(saved.iter().cloned().collect()),
    }
}

// =============================================================================
// Edits
// =============================================================================

/// Flips a base ingredient and cascades to the groups it governs.
///
/// ## Cascade
/// ```text
/// milk: on ──► off     milk-type: "oat" ──► ""          (cleared)
/// milk: off ──► on     milk-type: ""    ──► "whole"     (declared default)
///                      milk-type: "soy" ──► "soy"       (kept, not empty)
/// ```
///
/// Non-removable and unknown ingredients leave the state unchanged.
pub fn toggle_base(item: &CanonicalItem, state: &SelectionState, base_key: &str) -> SelectionState {
    let Some(base) = item.base(base_key) else {
        debug!(item = %item.name, base_key = %base_key, "Ignoring toggle of unknown ingredient");
        return state.clone();
    };
    if !base.removable {
        trace!(base_key = %base_key, "Ingredient is fixed, toggle ignored");
        return state.clone();
    }

    let now_included = !state.is_included(base_key);
    let mut next = state.clone().with_included(base_key, now_included);

    for group in item.governed_groups(base_key) {
        let current = next
            .group(&group.id)
            .cloned()
            .unwrap_or_else(|| group.default_selection().cleared());

        let updated = if !now_included {
            current.cleared()
        } else if current.is_empty() {
            group.default_selection()
        } else {
            current
        };
        next = next.with_group(&group.id, updated);
    }

    debug!(base_key = %base_key, included = now_included, "Toggled base ingredient");
    next
}

/// Replaces the selected key of a single group.
///
/// The key is not checked against the group's options. An empty key clears
/// the selection. Unknown groups and multiple groups are left unchanged.
pub fn set_single_selection(
    state: &SelectionState,
    group_id: &str,
    option_key: &str,
) -> SelectionState {
    match state.group(group_id) {
        Some(GroupSelection::Single(_)) => {
            let key = (!option_key.is_empty()).then(|| option_key.to_string());
            trace!(group_id = %group_id, option_key = %option_key, "Set single selection");
            state.clone().with_group(group_id, GroupSelection::Single(key))
        }
        _ => {
            debug!(group_id = %group_id, "Ignoring single selection for unknown or multiple group");
            state.clone()
        }
    }
}

/// Adds the key to a multiple group's selection, or removes it if present.
///
/// Unknown groups and single groups are left unchanged.
pub fn toggle_multi_selection(
    state: &SelectionState,
    group_id: &str,
    option_key: &str,
) -> SelectionState {
    match state.group(group_id) {
        Some(GroupSelection::Multiple(keys)) => {
            let mut keys = keys.clone();
            if !keys.remove(option_key) {
                keys.insert(option_key.to_string());
            }
            trace!(group_id = %group_id, option_key = %option_key, "Toggled multi selection");
            state.clone().with_group(group_id, GroupSelection::Multiple(keys))
        }
        _ => {
            debug!(group_id = %group_id, "Ignoring multi toggle for unknown or single group");
            state.clone()
        }
    }
}

// =============================================================================
// Checked Edits
// =============================================================================

/// [`toggle_base`] that rejects unknown and non-removable ingredients.
pub fn try_toggle_base(
    item: &CanonicalItem,
    state: &SelectionState,
    base_key: &str,
) -> CoreResult<SelectionState> {
    let base = item
        .base(base_key)
        .ok_or_else(|| CoreError::IngredientNotFound {
            item: item.name.clone(),
            key: base_key.to_string(),
        })?;
    if !base.removable {
        return Err(CoreError::IngredientNotRemovable {
            key: base_key.to_string(),
        });
    }
    Ok(toggle_base(item, state, base_key))
}

/// [`set_single_selection`] that checks the group, its mode and the option key.
///
/// An empty `option_key` is accepted and clears the selection.
pub fn try_set_single_selection(
    item: &CanonicalItem,
    state: &SelectionState,
    group_id: &str,
    option_key: &str,
) -> CoreResult<SelectionState> {
    let group = checked_group(item, group_id, SelectionMode::Single)?;
    if !option_key.is_empty() {
        checked_option(group, option_key)?;
    }
    let key = (!option_key.is_empty()).then(|| option_key.to_string());
    Ok(state.clone().with_group(group_id, GroupSelection::Single(key)))
}

/// [`toggle_multi_selection`] that checks the group, its mode and the option key.
pub fn try_toggle_multi_selection(
    item: &CanonicalItem,
    state: &SelectionState,
    group_id: &str,
    option_key: &str,
) -> CoreResult<SelectionState> {
    let group = checked_group(item, group_id, SelectionMode::Multiple)?;
    checked_option(group, option_key)?;

    let current = match state.group(group_id) {
        Some(selection @ GroupSelection::Multiple(_)) => selection.clone(),
        _ => GroupSelection::Multiple(BTreeSet::new()),
    };
    let seeded = state.clone().with_group(group_id, current);
    Ok(toggle_multi_selection(&seeded, group_id, option_key))
}

fn checked_group<'a>(
    item: &'a CanonicalItem,
    group_id: &str,
    expected: SelectionMode,
) -> CoreResult<&'a OptionGroup> {
    let group = item.group(group_id).ok_or_else(|| CoreError::GroupNotFound {
        item: item.name.clone(),
        group_id: group_id.to_string(),
    })?;
    if group.mode != expected {
        return Err(CoreError::ModeMismatch {
            group_id: group_id.to_string(),
            expected,
            actual: group.mode,
        });
    }
    Ok(group)
}

fn checked_option(group: &OptionGroup, option_key: &str) -> CoreResult<()> {
    if group.has_option(option_key) {
        Ok(())
    } else {
        Err(CoreError::OptionNotFound {
            group_id: group.id.clone(),
            option_key: option_key.to_string(),
        })
    }
}

// =============================================================================
// Pricing & Payload
// =============================================================================

/// Total price adjustment of the current selection.
///
/// ## Formula
/// ```text
/// Σ delta(included base ingredients)
///   + Σ over active groups:
///       single   → delta(selected option)       (0 when nothing selected)
///       multiple → Σ delta(selected options)
/// ```
/// A group is active when it is ungoverned or its governor is included.
/// Missing deltas and keys that match no option count as zero.
pub fn compute_total_delta(item: &CanonicalItem, state: &SelectionState) -> Money {
    let base_total: Money = item
        .base_ingredients
        .iter()
        .filter(|b| !b.removable || state.is_included(&b.key))
        .map(|b| b.delta())
        .sum();

    let option_total: Money = item
        .option_groups
        .iter()
        .filter(|g| state.is_group_active(g.governed_by.as_deref()))
        .map(|g| group_delta(g, state.group(&g.id)))
        .sum();

    base_total + option_total
}

fn group_delta(group: &OptionGroup, selection: Option<&GroupSelection>) -> Money {
    let Some(selection) = selection else {
        return Money::zero();
    };
    group
        .options
        .iter()
        .filter(|o| selection.contains(&o.key))
        .map(|o| o.delta())
        .sum()
}

/// Flattens the state into the shape stored on the order line.
///
/// Groups whose governor is excluded are always saved as `[]`.
pub fn build_selection_payload(item: &CanonicalItem, state: &SelectionState) -> SelectionPayload {
    let base_included_keys = item
        .base_ingredients
        .iter()
        .filter(|b| !b.removable || state.is_included(&b.key))
        .map(|b| b.key.clone())
        .collect();

    let option_selections = item
        .option_groups
        .iter()
        .map(|g| {
            let keys = match state.group(&g.id) {
                Some(selection) if state.is_group_active(g.governed_by.as_deref()) => {
                    selection.keys()
                }
                _ => Vec::new(),
            };
            (g.id.clone(), keys)
        })
        .collect();

    SelectionPayload {
        base_included_keys,
        option_selections,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
