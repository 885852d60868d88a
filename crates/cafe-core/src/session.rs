//! # Customization Session
//!
//! Binds one canonical item, the resolver options and the current
//! [`SelectionState`] for the lifetime of a customization dialog.
//!
//! ## User Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Order line "Latte" ──► Customize                                       │
//! │                                                                         │
//! │  new line ───────► Customization::open(item, options)                   │
//! │  existing line ──► Customization::resume(item, options, saved payload)  │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  toggle_base / select / toggle_option      (policy decides on errors)   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  finish() ──► LineCustomization { payload, total_delta } ──► store     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::menu::{CanonicalItem, SelectionMode};
use crate::money::{self, Money};
use crate::resolver::{self, ResolverOptions, UnknownKeyPolicy};
use crate::selection::{GroupSelection, SelectionPayload, SelectionState};
use crate::validation::{validate_canonical_item, validate_saved_payload};

// =============================================================================
// Line Customization
// =============================================================================

/// What an order line stores once the dialog is saved.
///
/// ```json
/// {
///   "baseIncludedKeys": ["milk"],
///   "optionSelections": { "milk-type": ["oat"] },
///   "totalDelta": 0.5
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LineCustomization {
    #[serde(flatten)]
    pub selection: SelectionPayload,

    #[serde(with = "money::major_units")]
    #[ts(as = "f64")]
    pub total_delta: Money,
}

impl LineCustomization {
    /// Unit price of the customized item.
    ///
    /// ```rust
    /// use cafe_core::money::Money;
    /// use cafe_core::selection::SelectionPayload;
    /// use cafe_core::session::LineCustomization;
    ///
    /// let line = LineCustomization {
    ///     selection: SelectionPayload::default(),
    ///     total_delta: Money::from_cents(50),
    /// };
    /// assert_eq!(line.unit_price(Money::from_cents(450)).unwrap().cents(), 500);
    /// assert_eq!(line.line_total(Money::from_cents(450), 2).unwrap().cents(), 1000);
    /// ```
    pub fn unit_price(&self, base_price: Money) -> CoreResult<Money> {
        base_price
            .checked_add(self.total_delta)
            .ok_or_else(|| CoreError::PriceOverflow {
                what: "unit price".to_string(),
            })
    }

    pub fn line_total(&self, base_price: Money, quantity: i64) -> CoreResult<Money> {
        self.unit_price(base_price)?
            .checked_multiply_quantity(quantity)
            .ok_or_else(|| CoreError::PriceOverflow {
                what: "line total".to_string(),
            })
    }
}

// =============================================================================
// Customization
// =============================================================================

/// An open customization dialog for one order line.
#[derive(Debug, Clone)]
pub struct Customization {
    item: CanonicalItem,
    options: ResolverOptions,
    state: SelectionState,
}

impl Customization {
    /// Opens a dialog for a new line, seeded from declared defaults.
    ///
    /// Under [`UnknownKeyPolicy::Reject`] the item is validated first.
    pub fn open(item: CanonicalItem, options: ResolverOptions) -> CoreResult<Self> {
        Self::resume(item, options, &SelectionPayload::default())
    }

    /// Opens a dialog for an existing line, seeded from its saved payload.
    ///
    /// Under [`UnknownKeyPolicy::Reject`] both the item and the payload are
    /// validated; under `Ignore` stale keys are dropped by the resolver.
    pub fn resume(
        item: CanonicalItem,
        options: ResolverOptions,
        saved: &SelectionPayload,
    ) -> CoreResult<Self> {
        let item = item.normalized(&options.group_separator);

        if options.unknown_keys == UnknownKeyPolicy::Reject {
            validate_canonical_item(&item)?;
            validate_saved_payload(&item, saved)?;
        }

        let state = resolver::initialize_from_payload(&item, saved);
        debug!(
            item = %item.name,
            policy = %options.unknown_keys,
            "Opened customization"
        );

        Ok(Customization {
            item,
            options,
            state,
        })
    }

    pub fn item(&self) -> &CanonicalItem {
        &self.item
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    fn strict(&self) -> bool {
        self.options.unknown_keys == UnknownKeyPolicy::Reject
    }

    /// Includes or excludes a base ingredient.
    pub fn toggle_base(&mut self, base_key: &str) -> CoreResult<()> {
        self.state = if self.strict() {
            resolver::try_toggle_base(&self.item, &self.state, base_key)?
        } else {
            resolver::toggle_base(&self.item, &self.state, base_key)
        };
        Ok(())
    }

    /// Picks the option of a single group (empty key clears it).
    pub fn select(&mut self, group_id: &str, option_key: &str) -> CoreResult<()> {
        self.state = if self.strict() {
            resolver::try_set_single_selection(&self.item, &self.state, group_id, option_key)?
        } else {
            resolver::set_single_selection(&self.state, group_id, option_key)
        };
        Ok(())
    }

    /// Ticks or unticks an option of a multiple group.
    pub fn toggle_option(&mut self, group_id: &str, option_key: &str) -> CoreResult<()> {
        self.state = if self.strict() {
            resolver::try_toggle_multi_selection(&self.item, &self.state, group_id, option_key)?
        } else {
            resolver::toggle_multi_selection(&self.state, group_id, option_key)
        };
        Ok(())
    }

    /// Applies an edit to whichever kind of group `group_id` is.
    ///
    /// Single groups get the option selected, multiple groups get it toggled.
    /// Convenient for callers that only know "the user clicked this option".
    pub fn choose(&mut self, group_id: &str, option_key: &str) -> CoreResult<()> {
        match self.item.group(group_id).map(|g| g.mode) {
            Some(SelectionMode::Single) => self.select(group_id, option_key),
            Some(SelectionMode::Multiple) => self.toggle_option(group_id, option_key),
            None if self.strict() => self.select(group_id, option_key),
            None => {
                warn!(group_id = %group_id, "Ignoring choice for unknown option group");
                Ok(())
            }
        }
    }

    pub fn total_delta(&self) -> Money {
        resolver::compute_total_delta(&self.item, &self.state)
    }

    pub fn payload(&self) -> SelectionPayload {
        resolver::build_selection_payload(&self.item, &self.state)
    }

    /// Ticket lines describing deviations from the item's defaults.
    pub fn modifiers(&self) -> Vec<String> {
        describe_modifiers(&self.item, &self.state)
    }

    /// Closes the dialog and produces what the order line stores.
    pub fn finish(self) -> LineCustomization {
        let line = LineCustomization {
            selection: self.payload(),
            total_delta: self.total_delta(),
        };
        debug!(item = %self.item.name, total_delta = %line.total_delta, "Finished customization");
        line
    }
}

// =============================================================================
// Modifier Summary
// =============================================================================

/// Describes how a selection differs from the item's defaults.
///
/// ## Output
/// ```text
/// excluded default ingredient        → "No Whipped Cream"
/// included non-default ingredient    → "Add Caramel Drizzle (+$0.25)"
/// single group off its default       → "Oat (+$0.50)"
/// multiple group: extra option       → "Add Vanilla (+$0.40)"
/// multiple group: dropped default    → "No Cocoa"
/// ```
/// Groups switched off by an excluded ingredient are not listed; the
/// "No <ingredient>" line already covers them. Keys that match no
/// option are skipped.
pub fn describe_modifiers(item: &CanonicalItem, state: &SelectionState) -> Vec<String> {
    let mut lines = Vec::new();

    for base in item.base_ingredients.iter().filter(|b| b.removable) {
        match (base.is_default, state.is_included(&base.key)) {
            (true, false) => lines.push(format!("No {}", base.label)),
            (false, true) => lines.push(with_delta(format!("Add {}", base.label), base.delta())),
            _ => {}
        }
    }

    for group in &item.option_groups {
        if !state.is_group_active(group.governed_by.as_deref()) {
            continue;
        }
        let Some(selection) = state.group(&group.id) else {
            continue;
        };
        let defaults = group.default_selection();

        match selection {
            GroupSelection::Single(Some(key)) if !defaults.contains(key) => {
                if let Some(option) = group.option(key) {
                    lines.push(with_delta(option.label.clone(), option.delta()));
                }
            }
            GroupSelection::Single(_) => {}
            GroupSelection::Multiple(keys) => {
                for option in &group.options {
                    match (defaults.contains(&option.key), keys.contains(&option.key)) {
                        (false, true) => {
                            lines.push(with_delta(format!("Add {}", option.label), option.delta()))
                        }
                        (true, false) => lines.push(format!("No {}", option.label)),
                        _ => {}
                    }
                }
            }
        }
    }

    lines
}

fn with_delta(label: String, delta: Money) -> String {
    if delta.is_zero() {
        label
    } else {
        format!("{} ({})", label, delta.signed_display())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{BaseIngredient, OptionChoice, OptionGroup};

    fn cents(c: i64) -> Money {
        Money::from_cents(c)
    }

    fn mocha() -> CanonicalItem {
        CanonicalItem::new("mocha")
            .with_base(BaseIngredient::new("espresso", "Espresso", true).fixed())
            .with_base(BaseIngredient::new("milk", "Milk", true))
            .with_base(BaseIngredient::new("cream", "Whipped Cream", false).with_price_delta(cents(30)))
            .with_group(
                OptionGroup::single(
                    "milk-type",
                    "Milk type",
                    vec![
                        OptionChoice::new("whole", "Whole").as_default(),
                        OptionChoice::new("oat", "Oat").with_price_delta(cents(50)),
                    ],
                )
                .required(),
            )
            .with_group(OptionGroup::multiple(
                "cream-toppings",
                "Toppings",
                vec![OptionChoice::new("cocoa", "Cocoa").as_default()],
            ))
            .with_group(OptionGroup::multiple(
                "syrups",
                "Syrups",
                vec![
                    OptionChoice::new("vanilla", "Vanilla").with_price_delta(cents(40)),
                    OptionChoice::new("sugar-free", "Sugar Free").as_default(),
                ],
            ))
    }

    fn strict() -> ResolverOptions {
        ResolverOptions {
            unknown_keys: UnknownKeyPolicy::Reject,
            ..ResolverOptions::default()
        }
    }

    #[test]
    fn test_open_normalizes_governance() {
        let session = Customization::open(mocha(), ResolverOptions::default()).unwrap();
        let group = session.item().group("milk-type").unwrap();
        assert_eq!(group.governed_by.as_deref(), Some("milk"));
        assert_eq!(session.item().group("syrups").unwrap().governed_by, None);
    }

    #[test]
    fn test_session_flow() {
        let mut session = Customization::open(mocha(), ResolverOptions::default()).unwrap();
        assert_eq!(session.total_delta(), Money::zero());

        session.select("milk-type", "oat").unwrap();
        session.toggle_base("cream").unwrap();
        session.toggle_option("syrups", "vanilla").unwrap();
        assert_eq!(session.total_delta(), cents(120));

        let line = session.finish();
        assert_eq!(line.total_delta, cents(120));
        assert_eq!(line.selection.base_included_keys, vec!["espresso", "milk", "cream"]);
        assert_eq!(line.selection.option_selections["milk-type"], vec!["oat"]);
        assert_eq!(
            line.selection.option_selections["syrups"],
            vec!["sugar-free", "vanilla"]
        );
        assert_eq!(line.unit_price(cents(475)), Ok(cents(595)));
    }

    #[test]
    fn test_resume_from_saved_line() {
        let saved: SelectionPayload = serde_json::from_str(
            r#"{"baseIncludedKeys":["espresso"],"optionSelections":{"milk-type":[],"syrups":["vanilla"]}}"#,
        )
        .unwrap();
        let session = Customization::resume(mocha(), strict(), &saved).unwrap();

        assert!(!session.state().is_included("milk"));
        assert!(!session.state().is_included("cream"));
        assert_eq!(session.state().single_key("milk-type"), "");
        assert_eq!(session.total_delta(), cents(40));
        assert_eq!(session.modifiers(), vec!["No Milk", "Add Vanilla (+$0.40)", "No Sugar Free"]);
    }

    #[test]
    fn test_strict_session_rejects_stale_payload() {
        let saved = SelectionPayload {
            base_included_keys: vec![],
            option_selections: [("milk-type".to_string(), vec!["hemp".to_string()])]
                .into_iter()
                .collect(),
        };
        let err = Customization::resume(mocha(), strict(), &saved).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        // The permissive session takes the stale key as-is; it prices as zero.
        let session = Customization::resume(mocha(), ResolverOptions::default(), &saved).unwrap();
        assert_eq!(session.state().single_key("milk-type"), "hemp");
        assert_eq!(session.total_delta(), Money::zero());
    }

    #[test]
    fn test_policy_controls_bad_edits() {
        let mut lenient = Customization::open(mocha(), ResolverOptions::default()).unwrap();
        let before = lenient.state().clone();
        lenient.toggle_base("espresso").unwrap();
        lenient.select("syrups", "vanilla").unwrap();
        lenient.toggle_option("nope", "x").unwrap();
        lenient.choose("nope", "x").unwrap();
        assert_eq!(lenient.state(), &before);

        let mut checked = Customization::open(mocha(), strict()).unwrap();
        assert!(matches!(
            checked.toggle_base("espresso"),
            Err(CoreError::IngredientNotRemovable { .. })
        ));
        assert!(matches!(
            checked.select("milk-type", "hemp"),
            Err(CoreError::OptionNotFound { .. })
        ));
        assert!(matches!(
            checked.choose("nope", "x"),
            Err(CoreError::GroupNotFound { .. })
        ));
    }

    #[test]
    fn test_choose_dispatches_on_group_mode() {
        let mut session = Customization::open(mocha(), ResolverOptions::default()).unwrap();
        session.choose("milk-type", "oat").unwrap();
        session.choose("syrups", "vanilla").unwrap();
        session.choose("syrups", "vanilla").unwrap();

        assert_eq!(session.state().single_key("milk-type"), "oat");
        assert!(!session.state().multi_keys("syrups").contains("vanilla"));
    }

    #[test]
    fn test_strict_open_rejects_invalid_item() {
        let broken = mocha().with_base(BaseIngredient::new("milk", "Milk again", true));
        assert!(Customization::open(broken.clone(), strict()).is_err());
        assert!(Customization::open(broken, ResolverOptions::default()).is_ok());
    }

    #[test]
    fn test_modifiers() {
        let mut session = Customization::open(mocha(), ResolverOptions::default()).unwrap();
        assert!(session.modifiers().is_empty());

        session.select("milk-type", "oat").unwrap();
        session.toggle_base("cream").unwrap();
        session.toggle_option("cream-toppings", "cocoa").unwrap();
        assert_eq!(
            session.modifiers(),
            vec!["Add Whipped Cream (+$0.30)", "Oat (+$0.50)", "No Cocoa"]
        );

        session.toggle_base("milk").unwrap();
        assert_eq!(
            session.modifiers(),
            vec!["No Milk", "Add Whipped Cream (+$0.30)", "No Cocoa"]
        );
    }

    #[test]
    fn test_line_price_overflow_is_an_error() {
        let line = LineCustomization {
            selection: SelectionPayload::default(),
            total_delta: cents(50),
        };
        assert_eq!(line.line_total(cents(450), 3), Ok(cents(1500)));
        assert!(matches!(
            line.line_total(cents(450), i64::MAX),
            Err(CoreError::PriceOverflow { what }) if what == "line total"
        ));
        assert!(matches!(
            line.unit_price(Money::from_cents(i64::MAX)),
            Err(CoreError::PriceOverflow { what }) if what == "unit price"
        ));
    }

    #[test]
    fn test_line_customization_document() {
        let mut session = Customization::open(mocha(), ResolverOptions::default()).unwrap();
        session.select("milk-type", "oat").unwrap();
        let line = session.finish();

        let value = serde_json::to_value(&line).unwrap();
        assert_eq!(value["totalDelta"], 0.5);
        assert_eq!(value["baseIncludedKeys"][0], "espresso");
        assert_eq!(value["optionSelections"]["milk-type"][0], "oat");

        let parsed: LineCustomization = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, line);
    }
}
