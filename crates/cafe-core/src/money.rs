//! # Money Module
//!
//! Provides the `Money` type used for every price delta.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Oat milk +0.10, Extra shot +0.20 in floating point:                    │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    10 + 20 = 30 cents, exactly                                          │
//! │                                                                         │
//! │  Documents in the store keep decimal major units ("priceDelta": 0.5).   │
//! │  They are converted ONCE at the serde boundary (see `major_units`).     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cafe_core::money::Money;
//!
//! let oat = Money::from_cents(50);
//! let no_cream = Money::from_cents(-25);
//! assert_eq!((oat + no_cream).to_string(), "$0.25");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A signed monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: price deltas are often negative ("no cream: -$0.25")
/// - **Single field tuple struct**: zero-cost abstraction over i64
///
/// ## Where Money is Used
/// ```text
/// BaseIngredient.price_delta ──┐
///                              ├──► total_delta ──► LineCustomization
/// Option.price_delta ──────────┘                        │
///                                                       ▼
///                                  unit_price = base price + total_delta
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use cafe_core::money::Money;
    ///
    /// let oat = Money::from_cents(50); // $0.50
    /// assert_eq!(oat.cents(), 50);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Largest magnitude a document may carry: $1,000,000,000.00.
    ///
    /// Deltas and base prices beyond this are rejected when read, so sums of
    /// them stay far inside `i64`.
    pub const MAX_DOCUMENT: Money = Money(100_000_000_000);

    /// Converts a decimal amount in major units (dollars) to Money.
    ///
    /// Rounds half away from zero to the nearest cent. Returns `None` for
    /// NaN, infinities and amounts beyond [`Money::MAX_DOCUMENT`]. Only used
    /// at the document boundary, where the store keeps `0.5` style numbers.
    ///
    /// ```rust
    /// use cafe_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_f64(0.5).map(|m| m.cents()), Some(50));
    /// assert_eq!(Money::from_major_f64(-0.75).map(|m| m.cents()), Some(-75));
    /// assert_eq!(Money::from_major_f64(6e16), None);
    /// assert_eq!(Money::from_major_f64(f64::NAN), None);
    /// ```
    pub fn from_major_f64(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        let cents = (amount * 100.0).round();
        if cents.abs() > Self::MAX_DOCUMENT.0 as f64 {
            return None;
        }
        Some(Money(cents as i64))
    }

    /// True when the value is within [`Money::MAX_DOCUMENT`] either way.
    #[inline]
    pub const fn is_document_amount(&self) -> bool {
        self.0.unsigned_abs() <= Self::MAX_DOCUMENT.0 as u64
    }

    /// Returns the value as decimal major units (for documents and display only).
    #[inline]
    pub fn to_major_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion, truncated toward zero.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies by a line quantity, saturating at the `i64` bounds.
    ///
    /// ```rust
    /// use cafe_core::money::Money;
    ///
    /// let latte = Money::from_cents(450);
    /// assert_eq!(latte.multiply_quantity(2).cents(), 900);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Multiplies by a line quantity, `None` on overflow.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Formats the value as a signed adjustment: `+$0.50`, `-$0.25`.
    ///
    /// Used for modifier lines on tickets, where a bare `$0.50` would
    /// read as a price rather than a change to one.
    pub fn signed_display(&self) -> String {
        if self.is_negative() {
            self.to_string()
        } else {
            format!("+{}", self)
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

// `+`, `-` and `Sum` saturate at the `i64` bounds; use the `checked_*`
// methods where the caller has to report overflow.

/// Two-decimal display: `$10.99`, `-$0.25`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Document Boundary
// =============================================================================

/// Serde adapter for amounts stored as decimal major units.
///
/// ```text
/// document  "totalDelta": 0.5   ──deserialize──►  Money(50)
/// Money(-25)                    ──serialize────►  "totalDelta": -0.25
/// ```
///
/// The [`option`](major_units::option) submodule handles optional deltas;
/// pair it with `#[serde(default, skip_serializing_if = "Option::is_none")]`.
pub mod major_units {
    use super::Money;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Money, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.to_major_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Money, D::Error>
    where
        D: Deserializer<'de>,
    {
        let amount = f64::deserialize(deserializer)?;
        from_document(amount).map_err(D::Error::custom)
    }

    fn from_document(amount: f64) -> Result<Money, String> {
        Money::from_major_f64(amount).ok_or_else(|| {
            format!(
                "amount {} is not a finite value within {}",
                amount,
                Money::MAX_DOCUMENT
            )
        })
    }

    pub mod option {
        use super::{from_document, Money};
        use serde::de::Error;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(value: &Option<Money>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(money) => serializer.serialize_f64(money.to_major_f64()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Money>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let raw: Option<f64> = Option::deserialize(deserializer)?;
            raw.map(from_document).transpose().map_err(D::Error::custom)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(50).to_string(), "$0.50");
        assert_eq!(Money::from_cents(-25).to_string(), "-$0.25");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_signed_display() {
        assert_eq!(Money::from_cents(50).signed_display(), "+$0.50");
        assert_eq!(Money::from_cents(-125).signed_display(), "-$1.25");
        assert_eq!(Money::zero().signed_display(), "+$0.00");
    }

    #[test]
    fn test_from_major_f64_rounds_to_cents() {
        let cents = |amount: f64| Money::from_major_f64(amount).map(|m| m.cents());
        assert_eq!(cents(0.5), Some(50));
        assert_eq!(cents(1.1), Some(110));
        assert_eq!(cents(0.1 + 0.2), Some(30));
        assert_eq!(cents(-0.75), Some(-75));
    }

    #[test]
    fn test_from_major_f64_rejects_out_of_range() {
        assert_eq!(Money::from_major_f64(1_000_000_000.0), Some(Money::MAX_DOCUMENT));
        assert_eq!(Money::from_major_f64(-1_000_000_000.0), Some(-Money::MAX_DOCUMENT));
        assert_eq!(Money::from_major_f64(1_000_000_000.01), None);
        assert_eq!(Money::from_major_f64(6e16), None);
        assert_eq!(Money::from_major_f64(f64::NAN), None);
        assert_eq!(Money::from_major_f64(f64::NEG_INFINITY), None);
    }

    #[test]
    fn test_document_amount_bounds() {
        assert!(Money::MAX_DOCUMENT.is_document_amount());
        assert!((-Money::MAX_DOCUMENT).is_document_amount());
        assert!(!Money::from_cents(i64::MIN).is_document_amount());
        assert!(!(Money::MAX_DOCUMENT + Money::from_cents(1)).is_document_amount());
    }

    #[test]
    fn test_arithmetic_saturates() {
        let max = Money::from_cents(i64::MAX);
        assert_eq!(max + Money::from_cents(1), max);
        assert_eq!([max, max].iter().sum::<Money>(), max);
        assert_eq!(Money::from_cents(i64::MIN) - Money::from_cents(1), Money::from_cents(i64::MIN));
        assert_eq!((-Money::from_cents(i64::MIN)).cents(), i64::MAX);
        assert_eq!(max.multiply_quantity(2), max);
    }

    #[test]
    fn test_checked_arithmetic() {
        let latte = Money::from_cents(450);
        assert_eq!(latte.checked_add(Money::from_cents(50)), Some(Money::from_cents(500)));
        assert_eq!(latte.checked_multiply_quantity(3), Some(Money::from_cents(1350)));

        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
        assert_eq!(latte.checked_multiply_quantity(i64::MAX), None);
    }

    #[test]
    fn test_sum_of_deltas() {
        let deltas = [
            Money::from_cents(50),
            Money::from_cents(-25),
            Money::from_cents(75),
        ];
        let total: Money = deltas.iter().sum();
        assert_eq!(total.cents(), 100);

        let empty: Money = Vec::<Money>::new().into_iter().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(450);
        let b = Money::from_cents(50);
        assert_eq!((a + b).cents(), 500);
        assert_eq!((a - b).cents(), 400);
        assert_eq!((-b).cents(), -50);
        assert_eq!(a.multiply_quantity(3).cents(), 1350);
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Priced {
        #[serde(
            default,
            with = "major_units::option",
            skip_serializing_if = "Option::is_none"
        )]
        delta: Option<Money>,
    }

    #[test]
    fn test_major_units_document_boundary() {
        let parsed: Priced = serde_json::from_str(r#"{"delta":0.5}"#).unwrap();
        assert_eq!(parsed.delta, Some(Money::from_cents(50)));

        let absent: Priced = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.delta, None);

        let null: Priced = serde_json::from_str(r#"{"delta":null}"#).unwrap();
        assert_eq!(null.delta, None);

        assert!(serde_json::from_str::<Priced>(r#"{"delta":6e16}"#).is_err());

        let json = serde_json::to_string(&Priced {
            delta: Some(Money::from_cents(-25)),
        })
        .unwrap();
        assert_eq!(json, r#"{"delta":-0.25}"#);
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Total {
        #[serde(with = "major_units")]
        total: Money,
    }

    #[test]
    fn test_major_units_required_amount() {
        let parsed: Total = serde_json::from_str(r#"{"total":1.25}"#).unwrap();
        assert_eq!(parsed.total.cents(), 125);
        assert!(serde_json::from_str::<Total>("{}").is_err());

        let err = serde_json::from_str::<Total>(r#"{"total":-6e16}"#).unwrap_err();
        assert!(err.to_string().contains("not a finite value within"));

        let json = serde_json::to_string(&Total {
            total: Money::from_cents(50),
        })
        .unwrap();
        assert_eq!(json, r#"{"total":0.5}"#);
    }
}
