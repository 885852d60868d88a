//! # Selection State
//!
//! The ephemeral record of what a cashier has picked while customizing one
//! order line, plus the flat payload it is saved as.
//!
//! ## Lifecycle
//! ```text
//! dialog opens                dialog edits                 dialog closes
//! ────────────                ────────────                 ─────────────
//! SelectionPayload (saved) ─┐
//!                           ├─► SelectionState ──► SelectionState ──► SelectionPayload
//! declared defaults ────────┘     (immutable values, replaced on every edit)
//! ```

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Group Selection
// =============================================================================

/// The current choice inside one option group.
///
/// The variant mirrors the group's [`SelectionMode`](crate::menu::SelectionMode),
/// so a single group can never hold two keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupSelection {
    /// Selected key, `None` when nothing is picked.
    Single(Option<String>),
    /// Selected keys.
    Multiple(BTreeSet<String>),
}

impl GroupSelection {
    pub fn is_empty(&self) -> bool {
        match self {
            GroupSelection::Single(key) => key.is_none(),
            GroupSelection::Multiple(keys) => keys.is_empty(),
        }
    }

    /// Same variant, nothing selected.
    pub fn cleared(&self) -> GroupSelection {
        match self {
            GroupSelection::Single(_) => GroupSelection::Single(None),
            GroupSelection::Multiple(_) => GroupSelection::Multiple(BTreeSet::new()),
        }
    }

    pub fn contains(&self, option_key: &str) -> bool {
        match self {
            GroupSelection::Single(key) => key.as_deref() == Some(option_key),
            GroupSelection::Multiple(keys) => keys.contains(option_key),
        }
    }

    /// Selected keys as a list, the shape the payload stores.
    pub fn keys(&self) -> Vec<String> {
        match self {
            GroupSelection::Single(key) => key.iter().cloned().collect(),
            GroupSelection::Multiple(keys) => keys.iter().cloned().collect(),
        }
    }
}

// =============================================================================
// Selection State
// =============================================================================

/// Inclusion flags and group selections for one order line being customized.
///
/// Keys follow the canonical item; entries for ingredients or groups the item
/// does not define are never created by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    pub(crate) included: BTreeMap<String, bool>,
    pub(crate) groups: BTreeMap<String, GroupSelection>,
}

impl SelectionState {
    /// Whether a base ingredient is currently included.
    ///
    /// Unknown keys read as excluded.
    pub fn is_included(&self, base_key: &str) -> bool {
        self.included.get(base_key).copied().unwrap_or(false)
    }

    /// Current selection of a group, if the group is known.
    pub fn group(&self, group_id: &str) -> Option<&GroupSelection> {
        self.groups.get(group_id)
    }

    /// Selected key of a single group, `""` when nothing is selected
    /// (matches what the dialog binds to its radio buttons).
    pub fn single_key(&self, group_id: &str) -> &str {
        match self.groups.get(group_id) {
            Some(GroupSelection::Single(Some(key))) => key,
            _ => "",
        }
    }

    /// Selected keys of a multiple group, empty for unknown groups.
    pub fn multi_keys(&self, group_id: &str) -> BTreeSet<String> {
        match self.groups.get(group_id) {
            Some(GroupSelection::Multiple(keys)) => keys.clone(),
            _ => BTreeSet::new(),
        }
    }

    /// Whether a group counts toward price and payload.
    ///
    /// Ungoverned groups are always active. A governor key that does not
    /// name a tracked ingredient does not switch its group off.
    pub fn is_group_active(&self, governed_by: Option<&str>) -> bool {
        match governed_by {
            None => true,
            Some(base_key) => self.included.get(base_key).copied().unwrap_or(true),
        }
    }

    pub(crate) fn with_included(mut self, base_key: &str, included: bool) -> Self {
        self.included.insert(base_key.to_string(), included);
        self
    }

    pub(crate) fn with_group(mut self, group_id: &str, selection: GroupSelection) -> Self {
        self.groups.insert(group_id.to_string(), selection);
        self
    }
}

// =============================================================================
// Selection Payload
// =============================================================================

/// The flat shape an order line stores its customization in.
///
/// ```json
/// {
///   "baseIncludedKeys": ["espresso", "milk"],
///   "optionSelections": { "milk-type": ["oat"], "syrups": ["caramel", "vanilla"] }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SelectionPayload {
    /// Included ingredient keys, in the item's declared order.
    #[serde(default)]
    pub base_included_keys: Vec<String>,

    /// Group id → selected option keys.
    #[serde(default)]
    pub option_selections: BTreeMap<String, Vec<String>>,
}

impl SelectionPayload {
    /// True when nothing was saved (a fresh line).
    pub fn is_empty(&self) -> bool {
        self.base_included_keys.is_empty() && self.option_selections.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
