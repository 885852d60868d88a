//! # Menu Item Types
//!
//! The canonical definition of a customizable menu item.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         CanonicalItem "latte"                           │
//! │                                                                         │
//! │  base_ingredients                    option_groups                      │
//! │  ┌─────────────────┐                 ┌───────────────────────────────┐  │
//! │  │ espresso        │                 │ milk-type  (single, required) │  │
//! │  │  removable=false│      governs    │   whole* │ oat +0.50 │ soy    │  │
//! │  ├─────────────────┤  ────────────►  ├───────────────────────────────┤  │
//! │  │ milk            │                 │ syrups     (multiple)         │  │
//! │  │  default=true   │                 │   vanilla +0.40 │ caramel     │  │
//! │  ├─────────────────┤                 └───────────────────────────────┘  │
//! │  │ whipped_cream   │                                                    │
//! │  │  default=false  │                 * = default-selected option        │
//! │  │  delta=+0.30    │                                                    │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Governance
//! A group is *governed* by a base ingredient when excluding that ingredient
//! should switch the group off ("no milk" ⇒ no milk type). Stored documents
//! express this through the id prefix convention (`milk-type` → `milk`);
//! [`CanonicalItem::normalized`] turns the convention into the explicit
//! `governed_by` field once, so the resolver never parses ids.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{self, Money};
use crate::selection::GroupSelection;

fn default_true() -> bool {
    true
}

// =============================================================================
// Base Ingredient
// =============================================================================

/// A toggleable component of a menu item (milk, whipped cream, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BaseIngredient {
    /// Unique key within the item.
    pub key: String,

    /// Display label shown in the customization dialog.
    pub label: String,

    /// Included when the dialog opens without saved state.
    #[serde(rename = "default", default)]
    pub is_default: bool,

    /// When false the ingredient is always included and cannot be toggled.
    /// Absent in a document means removable.
    #[serde(default = "default_true")]
    pub removable: bool,

    /// Price adjustment while included.
    #[serde(
        default,
        with = "money::major_units::option",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(optional, as = "Option<f64>")]
    pub price_delta: Option<Money>,
}

impl BaseIngredient {
    /// Creates a removable ingredient with no price delta.
    pub fn new(key: impl Into<String>, label: impl Into<String>, is_default: bool) -> Self {
        BaseIngredient {
            key: key.into(),
            label: label.into(),
            is_default,
            removable: true,
            price_delta: None,
        }
    }

    /// Marks the ingredient as always included.
    pub fn fixed(mut self) -> Self {
        self.removable = false;
        self
    }

    pub fn with_price_delta(mut self, delta: Money) -> Self {
        self.price_delta = Some(delta);
        self
    }

    /// Price delta, zero when absent.
    #[inline]
    pub fn delta(&self) -> Money {
        self.price_delta.unwrap_or_default()
    }
}

// =============================================================================
// Option
// =============================================================================

/// One choice inside an [`OptionGroup`] (e.g. "Oat" in "Milk type").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OptionChoice {
    /// Unique key within the parent group.
    pub key: String,

    pub label: String,

    #[serde(
        default,
        with = "money::major_units::option",
        skip_serializing_if = "Option::is_none"
    )]
    #[ts(optional, as = "Option<f64>")]
    pub price_delta: Option<Money>,

    /// Selected when the group has no saved selection.
    #[serde(rename = "default", default)]
    pub is_default: bool,
}

impl OptionChoice {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        OptionChoice {
            key: key.into(),
            label: label.into(),
            price_delta: None,
            is_default: false,
        }
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn with_price_delta(mut self, delta: Money) -> Self {
        self.price_delta = Some(delta);
        self
    }

    /// Price delta, zero when absent.
    #[inline]
    pub fn delta(&self) -> Money {
        self.price_delta.unwrap_or_default()
    }
}

// =============================================================================
// Option Group
// =============================================================================

/// How many options of a group may be active at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum SelectionMode {
    /// At most one option (exactly one when `required`).
    Single,
    /// Zero or more options.
    Multiple,
}

/// A set of related choices attached to an item or to one of its ingredients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OptionGroup {
    /// Unique id within the item, e.g. `milk-type`.
    pub id: String,

    pub label: String,

    /// Stored as `"type": "single" | "multiple"`.
    #[serde(rename = "type")]
    pub mode: SelectionMode,

    /// Only meaningful for single groups: forces a default selection.
    #[serde(default)]
    pub required: bool,

    /// Base ingredient that switches this group on and off.
    /// Filled in from the id prefix by [`CanonicalItem::normalized`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub governed_by: Option<String>,

    /// Options in display order.
    #[serde(default)]
    pub options: Vec<OptionChoice>,
}

impl OptionGroup {
    pub fn single(id: impl Into<String>, label: impl Into<String>, options: Vec<OptionChoice>) -> Self {
        OptionGroup {
            id: id.into(),
            label: label.into(),
            mode: SelectionMode::Single,
            required: false,
            governed_by: None,
            options,
        }
    }

    pub fn multiple(
        id: impl Into<String>,
        label: impl Into<String>,
        options: Vec<OptionChoice>,
    ) -> Self {
        OptionGroup {
            mode: SelectionMode::Multiple,
            ..OptionGroup::single(id, label, options)
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn governed_by(mut self, base_key: impl Into<String>) -> Self {
        self.governed_by = Some(base_key.into());
        self
    }

    /// Looks up an option by key.
    pub fn option(&self, key: &str) -> Option<&OptionChoice> {
        self.options.iter().find(|o| o.key == key)
    }

    pub fn has_option(&self, key: &str) -> bool {
        self.option(key).is_some()
    }

    /// The selection this group starts with when nothing was saved.
    ///
    /// ## Rules
    /// - single: first option flagged default; else the first listed option
    ///   when `required`; else nothing
    /// - multiple: every option flagged default
    pub fn default_selection(&self) -> GroupSelection {
        match self.mode {
            SelectionMode::Single => {
                let chosen = self
                    .options
                    .iter()
                    .find(|o| o.is_default)
                    .or_else(|| self.required.then(|| self.options.first()).flatten());
                GroupSelection::Single(chosen.map(|o| o.key.clone()))
            }
            SelectionMode::Multiple => GroupSelection::Multiple(
                self.options
                    .iter()
                    .filter(|o| o.is_default)
                    .map(|o| o.key.clone())
                    .collect(),
            ),
        }
    }

    /// Id prefix up to the first `separator`, if the id contains one.
    ///
    /// ```rust
    /// use cafe_core::menu::OptionGroup;
    ///
    /// let group = OptionGroup::single("milk-type", "Milk type", vec![]);
    /// assert_eq!(group.id_prefix("-"), Some("milk"));
    /// assert_eq!(group.id_prefix("__"), None);
    /// ```
    pub fn id_prefix(&self, separator: &str) -> Option<&str> {
        if separator.is_empty() {
            return None;
        }
        self.id.split_once(separator).map(|(prefix, _)| prefix)
    }
}

// =============================================================================
// Canonical Item
// =============================================================================

/// The authoritative definition of a menu item's customizable parts.
///
/// Shared by every order line of that item; individual lines only store
/// their [`SelectionPayload`](crate::selection::SelectionPayload).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CanonicalItem {
    /// Stable item name/identifier used by the document store.
    pub name: String,

    #[serde(default)]
    pub base_ingredients: Vec<BaseIngredient>,

    #[serde(default)]
    pub option_groups: Vec<OptionGroup>,
}

impl CanonicalItem {
    pub fn new(name: impl Into<String>) -> Self {
        CanonicalItem {
            name: name.into(),
            base_ingredients: Vec::new(),
            option_groups: Vec::new(),
        }
    }

    pub fn with_base(mut self, base: BaseIngredient) -> Self {
        self.base_ingredients.push(base);
        self
    }

    pub fn with_group(mut self, group: OptionGroup) -> Self {
        self.option_groups.push(group);
        self
    }

    pub fn base(&self, key: &str) -> Option<&BaseIngredient> {
        self.base_ingredients.iter().find(|b| b.key == key)
    }

    pub fn group(&self, id: &str) -> Option<&OptionGroup> {
        self.option_groups.iter().find(|g| g.id == id)
    }

    /// Groups switched on and off by the given base ingredient.
    pub fn governed_groups<'a>(
        &'a self,
        base_key: &'a str,
    ) -> impl Iterator<Item = &'a OptionGroup> + 'a {
        self.option_groups
            .iter()
            .filter(move |g| g.governed_by.as_deref() == Some(base_key))
    }

    /// Makes group governance explicit.
    ///
    /// Every group without `governed_by` whose id prefix (up to the first
    /// `separator`) names a base ingredient of this item gets that key.
    /// Groups with an explicit `governed_by` are left alone, and prefixes
    /// that match no ingredient leave the group ungoverned.
    ///
    /// ```rust
    /// use cafe_core::menu::{BaseIngredient, CanonicalItem, OptionGroup};
    ///
    /// let item = CanonicalItem::new("latte")
    ///     .with_base(BaseIngredient::new("milk", "Milk", true))
    ///     .with_group(OptionGroup::single("milk-type", "Milk type", vec![]))
    ///     .with_group(OptionGroup::multiple("extra-shots", "Shots", vec![]))
    ///     .normalized("-");
    ///
    /// assert_eq!(item.option_groups[0].governed_by.as_deref(), Some("milk"));
    /// assert_eq!(item.option_groups[1].governed_by, None);
    /// ```
    pub fn normalized(mut self, separator: &str) -> Self {
        let base_keys: Vec<String> = self
            .base_ingredients
            .iter()
            .map(|b| b.key.clone())
            .collect();

        for group in self.option_groups.iter_mut() {
            if group.governed_by.is_some() {
                continue;
            }
            let governor = group
                .id_prefix(separator)
                .filter(|prefix| base_keys.iter().any(|k| k == prefix))
                .map(str::to_string);
            group.governed_by = governor;
        }

        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_document() {
        let json = r#"{
            "name": "latte",
            "baseIngredients": [
                {"key": "milk", "label": "Milk", "default": true, "removable": true, "priceDelta": 0},
                {"key": "espresso", "label": "Espresso", "removable": false}
            ],
            "optionGroups": [
                {"id": "milk-type", "label": "Milk type", "type": "single", "required": true,
                 "options": [
                    {"key": "whole", "label": "Whole", "default": true},
                    {"key": "oat", "label": "Oat", "priceDelta": 0.5}
                 ]}
            ]
        }"#;

        let item: CanonicalItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.name, "latte");

        let milk = item.base("milk").unwrap();
        assert!(milk.is_default);
        assert!(milk.removable);
        assert_eq!(milk.price_delta, Some(Money::zero()));

        let espresso = item.base("espresso").unwrap();
        assert!(!espresso.is_default);
        assert!(!espresso.removable);
        assert_eq!(espresso.delta(), Money::zero());

        let group = item.group("milk-type").unwrap();
        assert_eq!(group.mode, SelectionMode::Single);
        assert!(group.required);
        assert_eq!(group.governed_by, None);
        assert_eq!(group.option("oat").unwrap().delta().cents(), 50);
    }

    #[test]
    fn test_removable_defaults_to_true() {
        let base: BaseIngredient =
            serde_json::from_str(r#"{"key": "ice", "label": "Ice"}"#).unwrap();
        assert!(base.removable);
        assert!(!base.is_default);
    }

    #[test]
    fn test_serialize_uses_document_field_names() {
        let group = OptionGroup::multiple(
            "syrups",
            "Syrups",
            vec![OptionChoice::new("vanilla", "Vanilla").with_price_delta(Money::from_cents(40))],
        );
        let value = serde_json::to_value(&group).unwrap();
        assert_eq!(value["type"], "multiple");
        assert_eq!(value["options"][0]["priceDelta"], 0.4);
        assert_eq!(value["options"][0]["default"], false);
        assert!(value.get("governedBy").is_none());
    }

    #[test]
    fn test_default_selection_single() {
        let flagged = OptionGroup::single(
            "size",
            "Size",
            vec![
                OptionChoice::new("small", "Small"),
                OptionChoice::new("large", "Large").as_default(),
            ],
        );
        assert_eq!(
            flagged.default_selection(),
            GroupSelection::Single(Some("large".to_string()))
        );

        let unflagged = OptionGroup::single(
            "size",
            "Size",
            vec![
                OptionChoice::new("small", "Small"),
                OptionChoice::new("large", "Large"),
            ],
        );
        assert_eq!(unflagged.default_selection(), GroupSelection::Single(None));
        assert_eq!(
            unflagged.required().default_selection(),
            GroupSelection::Single(Some("small".to_string()))
        );
    }

    #[test]
    fn test_default_selection_required_without_options() {
        let empty = OptionGroup::single("size", "Size", vec![]).required();
        assert_eq!(empty.default_selection(), GroupSelection::Single(None));
    }

    #[test]
    fn test_default_selection_multiple() {
        let group = OptionGroup::multiple(
            "toppings",
            "Toppings",
            vec![
                OptionChoice::new("cinnamon", "Cinnamon").as_default(),
                OptionChoice::new("cocoa", "Cocoa"),
                OptionChoice::new("nutmeg", "Nutmeg").as_default(),
            ],
        )
        .required();

        let expected = GroupSelection::Multiple(
            ["cinnamon", "nutmeg"].iter().map(|s| s.to_string()).collect(),
        );
        assert_eq!(group.default_selection(), expected);
    }

    #[test]
    fn test_id_prefix() {
        let group = OptionGroup::single("milk-type-extra", "Milk", vec![]);
        assert_eq!(group.id_prefix("-"), Some("milk"));
        assert_eq!(group.id_prefix(""), None);

        let plain = OptionGroup::single("syrups", "Syrups", vec![]);
        assert_eq!(plain.id_prefix("-"), None);
    }

    #[test]
    fn test_normalized_keeps_explicit_governor() {
        let item = CanonicalItem::new("mocha")
            .with_base(BaseIngredient::new("milk", "Milk", true))
            .with_base(BaseIngredient::new("cream", "Cream", false))
            .with_group(OptionGroup::single("milk-foam", "Foam", vec![]).governed_by("cream"))
            .with_group(OptionGroup::single("sugar-level", "Sugar", vec![]))
            .normalized("-");

        assert_eq!(item.option_groups[0].governed_by.as_deref(), Some("cream"));
        assert_eq!(item.option_groups[1].governed_by, None);

        let governed: Vec<&str> = item.governed_groups("cream").map(|g| g.id.as_str()).collect();
        assert_eq!(governed, vec!["milk-foam"]);
        assert_eq!(item.governed_groups("milk").count(), 0);
    }

    #[test]
    fn test_normalized_with_custom_separator() {
        let item = CanonicalItem::new("latte")
            .with_base(BaseIngredient::new("milk", "Milk", true))
            .with_group(OptionGroup::single("milk__type", "Milk type", vec![]))
            .with_group(OptionGroup::single("milk-temp", "Temperature", vec![]));

        let item = item.normalized("__");
        assert_eq!(item.option_groups[0].governed_by.as_deref(), Some("milk"));
        assert_eq!(item.option_groups[1].governed_by, None);
    }

    #[test]
    fn test_bindings_mark_skipped_fields_optional() {
        assert!(BaseIngredient::decl().contains("priceDelta?: number"));
        assert!(OptionChoice::decl().contains("priceDelta?: number"));
        assert!(OptionGroup::decl().contains("governedBy?: string"));
    }
}
