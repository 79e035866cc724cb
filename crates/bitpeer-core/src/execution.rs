//! Execution results produced by the pricing engine.

use crate::decimal::{approx_zero, Price};
use crate::intent::{TargetAmount, TradeDirection};
use crate::offer::{AdvertiserId, OfferId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One offer's contribution to an execution, in allocation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub offer_id: OfferId,
    pub advertiser_id: AdvertiserId,
    pub unit_price: Price,
    /// Fiat paid (buy) or received (sell) against this offer.
    pub fiat_contribution: Decimal,
    /// Asset received (buy) or delivered (sell) against this offer.
    pub asset_amount: Decimal,
}

/// Fiat and asset totals actually matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilledAmount {
    pub fiat: Decimal,
    pub asset: Decimal,
}

impl FilledAmount {
    pub const ZERO: Self = Self {
        fiat: Decimal::ZERO,
        asset: Decimal::ZERO,
    };

    /// Filled quantity in the unit of `target`.
    pub fn in_unit_of(&self, target: TargetAmount) -> Decimal {
        match target {
            TargetAmount::Fiat(_) => self.fiat,
            TargetAmount::Asset(_) => self.asset,
        }
    }
}

/// Best price a trader could actually obtain for one intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub direction: TradeDirection,
    pub target: TargetAmount,
    /// Effective unit price: total fiat / total asset. `None` when nothing filled.
    pub achieved_price: Option<Price>,
    pub filled: FilledAmount,
    pub offers_used: Vec<Fill>,
    /// Whether the whole target was filled under the constraints.
    pub fully_executable: bool,
}

impl ExecutionResult {
    /// Result for an intent where nothing could be matched.
    pub fn unfilled(direction: TradeDirection, target: TargetAmount) -> Self {
        Self {
            direction,
            target,
            achieved_price: None,
            filled: FilledAmount::ZERO,
            offers_used: Vec::new(),
            fully_executable: false,
        }
    }

    /// Build a result from fills, deriving totals and the VWAP.
    ///
    /// The price is the true volume-weighted average (total fiat over total
    /// asset), not an average of unit prices. Totals saturate at the
    /// `Decimal` bounds; a VWAP outside the range is reported as `None`.
    pub fn from_fills(
        direction: TradeDirection,
        target: TargetAmount,
        offers_used: Vec<Fill>,
        fully_executable: bool,
    ) -> Self {
        let filled = offers_used.iter().fold(FilledAmount::ZERO, |acc, f| FilledAmount {
            fiat: acc.fiat.saturating_add(f.fiat_contribution),
            asset: acc.asset.saturating_add(f.asset_amount),
        });

        let achieved_price = if filled.asset > Decimal::ZERO {
            filled.fiat.checked_div(filled.asset).map(Price::new)
        } else {
            None
        };

        Self {
            direction,
            target,
            achieved_price,
            filled,
            offers_used,
            fully_executable,
        }
    }

    /// Fraction of the target filled, in the target's unit.
    ///
    /// Saturates at `Decimal::MAX` when an overfill dwarfs a tiny target.
    pub fn fill_ratio(&self) -> Decimal {
        let target = self.target.value();
        if target.is_zero() {
            return Decimal::ZERO;
        }
        self.filled
            .in_unit_of(self.target)
            .checked_div(target)
            .unwrap_or(Decimal::MAX)
    }

    /// Whether anything at all was matched.
    pub fn has_fill(&self) -> bool {
        !self.offers_used.is_empty() && !approx_zero(self.filled.fiat)
    }

    /// Outcome label used in logs and metrics.
    pub fn outcome_label(&self) -> &'static str {
        if self.fully_executable {
            "full"
        } else if self.has_fill() {
            "partial"
        } else {
            "none"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn fill(id: &str, price: Decimal, fiat: Decimal) -> Fill {
        Fill {
            offer_id: OfferId::new(id),
            advertiser_id: AdvertiserId::new(format!("adv-{id}")),
            unit_price: Price::new(price),
            fiat_contribution: fiat,
            asset_amount: fiat / price,
        }
    }

    #[test]
    fn test_vwap_is_volume_weighted() {
        // 9500 fiat @ 95 = 100 asset, 1920 fiat @ 96 = 20 asset
        // VWAP = 11420 / 120, not (95 + 96) / 2
        let result = ExecutionResult::from_fills(
            TradeDirection::BuyAsset,
            TargetAmount::Fiat(dec!(11420)),
            vec![fill("a", dec!(95), dec!(9500)), fill("b", dec!(96), dec!(1920))],
            true,
        );

        assert_eq!(result.filled.fiat, dec!(11420));
        assert_eq!(result.filled.asset, dec!(120));
        assert_eq!(result.achieved_price.unwrap().inner(), dec!(11420) / dec!(120));
        assert_eq!(result.outcome_label(), "full");
    }

    #[test]
    fn test_unfilled() {
        let result =
            ExecutionResult::unfilled(TradeDirection::SellAsset, TargetAmount::Asset(dec!(5)));

        assert!(!result.fully_executable);
        assert!(result.achieved_price.is_none());
        assert!(result.offers_used.is_empty());
        assert_eq!(result.fill_ratio(), Decimal::ZERO);
        assert_eq!(result.outcome_label(), "none");
    }

    #[test]
    fn test_fill_ratio_uses_target_unit() {
        let result = ExecutionResult::from_fills(
            TradeDirection::BuyAsset,
            TargetAmount::Asset(dec!(200)),
            vec![fill("a", dec!(95), dec!(9500))],
            false,
        );

        assert_eq!(result.fill_ratio(), dec!(0.5));
        assert_eq!(result.outcome_label(), "partial");
    }

    #[test]
    fn test_totals_saturate_instead_of_overflowing() {
        let huge = Fill {
            offer_id: OfferId::new("a"),
            advertiser_id: AdvertiserId::new("adv-a"),
            unit_price: Price::new(dec!(1)),
            fiat_contribution: Decimal::MAX,
            asset_amount: Decimal::MAX,
        };
        let result = ExecutionResult::from_fills(
            TradeDirection::BuyAsset,
            TargetAmount::Fiat(dec!(0.0001)),
            vec![huge.clone(), huge],
            false,
        );

        assert_eq!(result.filled.fiat, Decimal::MAX);
        assert_eq!(result.achieved_price, Some(Price::new(dec!(1))));
        assert_eq!(result.fill_ratio(), Decimal::MAX);
    }
}
