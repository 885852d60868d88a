//! # cafe-core: Order Line Customization Logic
//!
//! Pure business logic behind the "Customize" dialog of the cafe back office:
//! which ingredients are in, which options are picked, and what that does to
//! the price. Zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Cafe Back-Office Architecture                       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Web Frontend (POS screen)                       │   │
//! │  │     Order line ──► Customize dialog ──► Save line               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ cafe-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌───────────┐ ┌──────────┐ ┌────────────────┐  │   │
//! │  │   │   menu   │ │ selection │ │ resolver │ │ session        │  │   │
//! │  │   │ Canonical│ │ State     │ │ toggles  │ │ Customization  │  │   │
//! │  │   │ Item     │ │ Payload   │ │ pricing  │ │ modifiers      │  │   │
//! │  │   └──────────┘ └───────────┘ └──────────┘ └────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            Document store (canonical items, order lines)        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`menu`] - Canonical item definition (ingredients, option groups)
//! - [`selection`] - Selection state and the saved payload
//! - [`resolver`] - Initialize, edit, price and flatten selections
//! - [`session`] - Dialog-scoped wrapper and ticket modifiers
//! - [`validation`] - Item and saved-payload checks
//! - [`money`] - Integer cents
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use cafe_core::menu::{BaseIngredient, CanonicalItem, OptionChoice, OptionGroup};
//! use cafe_core::money::Money;
//! use cafe_core::resolver::ResolverOptions;
//! use cafe_core::session::Customization;
//!
//! let latte = CanonicalItem::new("latte")
//!     .with_base(BaseIngredient::new("milk", "Milk", true))
//!     .with_group(
//!         OptionGroup::single("milk-type", "Milk type", vec![
//!             OptionChoice::new("whole", "Whole").as_default(),
//!             OptionChoice::new("oat", "Oat").with_price_delta(Money::from_cents(50)),
//!         ])
//!         .required(),
//!     );
//!
//! let mut dialog = Customization::open(latte, ResolverOptions::default()).unwrap();
//! dialog.select("milk-type", "oat").unwrap();
//! assert_eq!(dialog.total_delta().to_string(), "$0.50");
//!
//! dialog.toggle_base("milk").unwrap();
//! assert!(dialog.total_delta().is_zero());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod menu;
pub mod money;
pub mod resolver;
pub mod selection;
pub mod session;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use menu::{BaseIngredient, CanonicalItem, OptionChoice, OptionGroup, SelectionMode};
pub use money::Money;
pub use resolver::{ResolverOptions, UnknownKeyPolicy};
pub use selection::{GroupSelection, SelectionPayload, SelectionState};
pub use session::{Customization, LineCustomization};
