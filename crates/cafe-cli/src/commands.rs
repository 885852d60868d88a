//! # Commands
//!
//! Each command reads its documents, hands them to cafe-core and prints
//! JSON on stdout. File access stays at the edges (`cmd_*`); the `build_*`
//! functions are pure and unit tested.
//!
//! ```text
//! item.json ──┐
//!             ├──► Customization ──► toggles ──► choices ──► PriceReport ──► stdout
//! line.json ──┘
//! ```

use std::path::{Path, PathBuf};

use cafe_core::validation::{validate_canonical_item, validate_saved_payload};
use cafe_core::{
    CanonicalItem, Customization, LineCustomization, Money, ResolverOptions, SelectionPayload,
    UnknownKeyPolicy,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

// =============================================================================
// Documents
// =============================================================================

fn load_json<T: DeserializeOwned>(path: &Path) -> CliResult<T> {
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&contents)?)
}

fn load_saved(path: Option<&Path>) -> CliResult<SelectionPayload> {
    match path {
        Some(path) => load_json(path),
        None => Ok(SelectionPayload::default()),
    }
}

fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// =============================================================================
// validate
// =============================================================================

pub fn cmd_validate(config: &CliConfig, item: &Path, saved: Option<&Path>) -> CliResult<()> {
    let item: CanonicalItem = load_json(item)?;
    let saved = load_saved(saved)?;

    build_validation(&item, &saved, &config.resolver)?;

    info!(item = %item.name, "Item is valid");
    println!("{}: ok", item.name);
    Ok(())
}

/// Validates the item as the resolver will see it, then the saved line.
fn build_validation(
    item: &CanonicalItem,
    saved: &SelectionPayload,
    options: &ResolverOptions,
) -> CliResult<()> {
    let item = item.clone().normalized(&options.group_separator);
    validate_canonical_item(&item)?;
    validate_saved_payload(&item, saved)?;
    Ok(())
}

// =============================================================================
// price
// =============================================================================

/// What `price` prints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceReport {
    pub item: String,
    pub line: LineCustomization,
    pub modifiers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_total: Option<String>,
}

/// Arguments of `price` after the documents are loaded.
#[derive(Debug, Default)]
pub struct PriceRequest {
    pub toggles: Vec<String>,
    pub choices: Vec<String>,
    pub strict: bool,
    pub base_price: Option<f64>,
    pub quantity: i64,
}

pub fn cmd_price(
    config: &CliConfig,
    item: &Path,
    saved: Option<&Path>,
    request: PriceRequest,
) -> CliResult<()> {
    let item: CanonicalItem = load_json(item)?;
    let saved = load_saved(saved)?;

    let report = build_price_report(item, &saved, config.resolver.clone(), &request)?;
    print_json(&report)
}

fn build_price_report(
    item: CanonicalItem,
    saved: &SelectionPayload,
    mut options: ResolverOptions,
    request: &PriceRequest,
) -> CliResult<PriceReport> {
    if request.strict {
        options.unknown_keys = UnknownKeyPolicy::Reject;
    }
    if request.quantity <= 0 {
        return Err(CliError::InvalidArgument(format!(
            "quantity must be positive, got {}",
            request.quantity
        )));
    }

    let mut session = Customization::resume(item, options, saved)?;

    for key in &request.toggles {
        session.toggle_base(key)?;
    }
    for choice in &request.choices {
        let (group_id, option_key) = parse_choice(choice)?;
        session.choose(group_id, option_key)?;
    }

    let item_name = session.item().name.clone();
    let modifiers = session.modifiers();
    let line = session.finish();
    debug!(item = %item_name, total_delta = %line.total_delta, "Priced line");

    let (unit_price, line_total) = match request.base_price {
        Some(raw) => {
            let base_price = Money::from_major_f64(raw).ok_or_else(|| {
                CliError::InvalidArgument(format!(
                    "base price {} is not a finite amount within {}",
                    raw,
                    Money::MAX_DOCUMENT
                ))
            })?;
            (
                Some(line.unit_price(base_price)?.to_string()),
                Some(line.line_total(base_price, request.quantity)?.to_string()),
            )
        }
        None => (None, None),
    };

    Ok(PriceReport {
        item: item_name,
        unit_price,
        line_total,
        modifiers,
        line,
    })
}

/// Splits `GROUP=OPTION`.
fn parse_choice(raw: &str) -> CliResult<(&str, &str)> {
    match raw.split_once('=') {
        Some((group, option)) if !group.is_empty() => Ok((group, option)),
        _ => Err(CliError::InvalidArgument(format!(
            "expected GROUP=OPTION, got '{}'",
            raw
        ))),
    }
}

// =============================================================================
// config
// =============================================================================

pub fn cmd_config(config: &CliConfig, path: Option<PathBuf>, write: bool) -> CliResult<()> {
    print!("{}", config.to_toml()?);
    if write {
        let written = config.save(path)?;
        eprintln!("Wrote {}", written.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cafe_core::CoreError;

    const LATTE: &str = r#"{
        "name": "latte",
        "baseIngredients": [
            {"key": "espresso", "label": "Espresso", "default": true, "removable": false},
            {"key": "milk", "label": "Milk", "default": true, "removable": true, "priceDelta": 0},
            {"key": "cream", "label": "Whipped Cream", "priceDelta": 0.3}
        ],
        "optionGroups": [
            {"id": "milk-type", "label": "Milk type", "type": "single", "required": true,
             "options": [
                {"key": "whole", "label": "Whole", "default": true},
                {"key": "oat", "label": "Oat", "priceDelta": 0.5}
             ]},
            {"id": "syrups", "label": "Syrups", "type": "multiple",
             "options": [
                {"key": "vanilla", "label": "Vanilla", "priceDelta": 0.4},
                {"key": "caramel", "label": "Caramel", "priceDelta": 0.4}
             ]}
        ]
    }"#;

    fn latte() -> CanonicalItem {
        serde_json::from_str(LATTE).unwrap()
    }

    fn request(toggles: &[&str], choices: &[&str]) -> PriceRequest {
        PriceRequest {
            toggles: toggles.iter().map(|s| s.to_string()).collect(),
            choices: choices.iter().map(|s| s.to_string()).collect(),
            quantity: 1,
            ..PriceRequest::default()
        }
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("milk-type=oat").unwrap(), ("milk-type", "oat"));
        assert_eq!(parse_choice("milk-type=").unwrap(), ("milk-type", ""));
        assert!(parse_choice("oat").is_err());
        assert!(parse_choice("=oat").is_err());
    }

    #[test]
    fn test_price_report() {
        let mut req = request(&["cream"], &["milk-type=oat", "syrups=vanilla"]);
        req.base_price = Some(4.5);
        req.quantity = 2;

        let report = build_price_report(
            latte(),
            &SelectionPayload::default(),
            ResolverOptions::default(),
            &req,
        )
        .unwrap();

        assert_eq!(report.item, "latte");
        assert_eq!(report.line.total_delta, Money::from_cents(120));
        assert_eq!(report.unit_price.as_deref(), Some("$5.70"));
        assert_eq!(report.line_total.as_deref(), Some("$11.40"));
        assert_eq!(
            report.modifiers,
            vec!["Add Whipped Cream (+$0.30)", "Oat (+$0.50)", "Add Vanilla (+$0.40)"]
        );

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["line"]["totalDelta"], 1.2);
    }

    #[test]
    fn test_price_report_milk_off_drops_milk_type() {
        let report = build_price_report(
            latte(),
            &SelectionPayload::default(),
            ResolverOptions::default(),
            &request(&["milk"], &["milk-type=oat"]),
        )
        .unwrap();

        // Toggles run first, so the oat choice lands on an inactive group.
        assert_eq!(report.line.total_delta, Money::zero());
        assert!(report.line.selection.option_selections["milk-type"].is_empty());
        assert!(report.unit_price.is_none());
    }

    #[test]
    fn test_price_report_strict_flag() {
        let mut req = request(&[], &["milk-type=hemp"]);
        assert!(build_price_report(
            latte(),
            &SelectionPayload::default(),
            ResolverOptions::default(),
            &req
        )
        .is_ok());

        req.strict = true;
        let err = build_price_report(
            latte(),
            &SelectionPayload::default(),
            ResolverOptions::default(),
            &req,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Core(_)));
    }

    #[test]
    fn test_price_report_rejects_bad_quantity() {
        let mut req = request(&[], &[]);
        req.quantity = 0;
        let err = build_price_report(
            latte(),
            &SelectionPayload::default(),
            ResolverOptions::default(),
            &req,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }

    #[test]
    fn test_price_report_rejects_out_of_range_prices() {
        let mut req = request(&[], &[]);
        req.base_price = Some(4.5);
        req.quantity = i64::MAX;
        let err = build_price_report(
            latte(),
            &SelectionPayload::default(),
            ResolverOptions::default(),
            &req,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Core(CoreError::PriceOverflow { .. })));

        req.quantity = 1;
        req.base_price = Some(f64::INFINITY);
        let err = build_price_report(
            latte(),
            &SelectionPayload::default(),
            ResolverOptions::default(),
            &req,
        )
        .unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }

    #[test]
    fn test_validation_uses_configured_separator() {
        let saved: SelectionPayload =
            serde_json::from_str(r#"{"optionSelections":{"milk-type":["oat"]}}"#).unwrap();
        assert!(build_validation(&latte(), &saved, &ResolverOptions::default()).is_ok());

        let stale: SelectionPayload =
            serde_json::from_str(r#"{"optionSelections":{"milk-type":["soy"]}}"#).unwrap();
        assert!(matches!(
            build_validation(&latte(), &stale, &ResolverOptions::default()),
            Err(CliError::Validation(_))
        ));
    }
}
