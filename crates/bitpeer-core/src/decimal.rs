//! Precision-safe decimal types for pricing.
//!
//! Uses `rust_decimal` for exact decimal arithmetic, avoiding
//! floating-point drift when fiat contributions are summed and compared.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rounding tolerance used for "remaining ≈ 0" and conservation checks,
/// expressed in the unit of the quantity being compared.
pub const FILL_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

/// Whether `value` is zero within [`FILL_EPSILON`].
#[inline]
pub fn approx_zero(value: Decimal) -> bool {
    value.abs() <= FILL_EPSILON
}

/// Unit price: fiat per one unit of the traded asset.
///
/// Wraps `Decimal` so prices cannot be mixed up with fiat or asset amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    #[inline]
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    #[inline]
    pub fn inner(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Fiat value of `asset` units at this price.
    ///
    /// `None` when the product is outside the `Decimal` range.
    #[inline]
    pub fn fiat_for(&self, asset: Decimal) -> Option<Decimal> {
        asset.checked_mul(self.0)
    }

    /// Asset units bought or sold for `fiat` at this price.
    ///
    /// `None` for a zero price or a quotient outside the `Decimal` range.
    #[inline]
    pub fn asset_for(&self, fiat: Decimal) -> Option<Decimal> {
        fiat.checked_div(self.0)
    }

    /// Calculate basis points difference from another price.
    #[inline]
    pub fn bps_from(&self, other: Price) -> Option<Decimal> {
        if other.is_zero() {
            return None;
        }
        (self.0 - other.0)
            .checked_div(other.0)?
            .checked_mul(Decimal::from(10000))
    }

    /// Calculate percentage difference from another price.
    #[inline]
    pub fn pct_from(&self, other: Price) -> Option<Decimal> {
        if other.is_zero() {
            return None;
        }
        (self.0 - other.0)
            .checked_div(other.0)?
            .checked_mul(Decimal::ONE_HUNDRED)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<Decimal> for Price {
    fn from(d: Decimal) -> Self {
        Self(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_epsilon_value() {
        assert_eq!(FILL_EPSILON, dec!(0.000001));
        assert!(approx_zero(dec!(0.0000005)));
        assert!(approx_zero(dec!(-0.000001)));
        assert!(!approx_zero(dec!(0.00001)));
    }

    #[test]
    fn test_price_pct() {
        let best = Price::new(dec!(100));
        let other = Price::new(dec!(100.5));

        assert_eq!(other.pct_from(best).unwrap(), dec!(0.5));
        assert_eq!(other.bps_from(best).unwrap(), dec!(50));
        assert!(other.pct_from(Price::ZERO).is_none());
    }

    #[test]
    fn test_fiat_asset_conversion() {
        let price = Price::new(dec!(95));

        assert_eq!(price.fiat_for(dec!(2)), Some(dec!(190)));
        assert_eq!(price.asset_for(dec!(190)), Some(dec!(2)));
        assert_eq!(Price::ZERO.asset_for(dec!(190)), None);
    }

    #[test]
    fn test_conversion_out_of_range_is_none() {
        let price = Price::new(dec!(3000000000));

        assert_eq!(price.fiat_for(dec!(100000000000000000000)), None);
        assert_eq!(Price::new(dec!(0.0000000001)).asset_for(Decimal::MAX), None);
        assert_eq!(Price::new(Decimal::MAX).pct_from(Price::new(dec!(0.0001))), None);
    }

    #[test]
    fn test_parse_and_serde() {
        let price: Price = "96.25".parse().unwrap();
        assert_eq!(price.inner(), dec!(96.25));

        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "\"96.25\"");
    }
}
