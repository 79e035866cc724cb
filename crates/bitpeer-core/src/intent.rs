//! Trade intent: a hypothetical execution request.
//!
//! Intents are validated on construction. A violated precondition
//! (`max_splits == 0`, non-positive target or chunk size) is a caller bug and
//! is reported as [`CoreError::InvalidIntent`], distinct from any
//! market-data outcome.

use crate::error::{CoreError, Result};
use crate::offer::{OfferSide, PaymentMethod};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// What the trader wants to do with the asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    /// Spend fiat, receive asset.
    BuyAsset,
    /// Spend asset, receive fiat.
    SellAsset,
}

impl TradeDirection {
    /// Offer side that can fill this direction.
    pub fn counterparty_side(&self) -> OfferSide {
        match self {
            Self::BuyAsset => OfferSide::Sell,
            Self::SellAsset => OfferSide::Buy,
        }
    }

    /// Whether `a` is a strictly better unit price than `b` for this direction.
    pub fn is_better(&self, a: Decimal, b: Decimal) -> bool {
        match self {
            Self::BuyAsset => a < b,
            Self::SellAsset => a > b,
        }
    }
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuyAsset => write!(f, "buy_asset"),
            Self::SellAsset => write!(f, "sell_asset"),
        }
    }
}

/// Amount to fill, denominated in exactly one unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "amount", rename_all = "lowercase")]
pub enum TargetAmount {
    Fiat(Decimal),
    Asset(Decimal),
}

impl TargetAmount {
    pub fn value(&self) -> Decimal {
        match self {
            Self::Fiat(v) | Self::Asset(v) => *v,
        }
    }

    pub fn is_fiat(&self) -> bool {
        matches!(self, Self::Fiat(_))
    }
}

/// A validated execution request.
///
/// Serialize-only: intents are built from configuration through
/// [`TradeIntent::new`] so every instance has passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeIntent {
    direction: TradeDirection,
    target: TargetAmount,
    accepted_payment_methods: BTreeSet<PaymentMethod>,
    max_splits: u32,
    min_chunk_fiat: Decimal,
    overfill_tolerance_fiat: Decimal,
    merchant_only: bool,
    min_rating: Option<Decimal>,
}

impl TradeIntent {
    /// Create an intent with no payment restriction, no overfill tolerance
    /// and no quality constraints.
    pub fn new(
        direction: TradeDirection,
        target: TargetAmount,
        max_splits: u32,
        min_chunk_fiat: Decimal,
    ) -> Result<Self> {
        if max_splits == 0 {
            return Err(CoreError::InvalidIntent(
                "max_splits must be at least 1".to_string(),
            ));
        }
        if target.value() <= Decimal::ZERO {
            return Err(CoreError::InvalidIntent(format!(
                "target amount must be positive, got {}",
                target.value()
            )));
        }
        if min_chunk_fiat <= Decimal::ZERO {
            return Err(CoreError::InvalidIntent(format!(
                "min_chunk_fiat must be positive, got {min_chunk_fiat}"
            )));
        }

        Ok(Self {
            direction,
            target,
            accepted_payment_methods: BTreeSet::new(),
            max_splits,
            min_chunk_fiat,
            overfill_tolerance_fiat: Decimal::ZERO,
            merchant_only: false,
            min_rating: None,
        })
    }

    /// Restrict to offers accepting at least one of `methods` (empty = any).
    #[must_use]
    pub fn with_payment_methods(mut self, methods: impl IntoIterator<Item = PaymentMethod>) -> Self {
        self.accepted_payment_methods = methods.into_iter().collect();
        self
    }

    /// Allow the final chunk to overshoot the target by up to `tolerance` fiat.
    pub fn with_overfill_tolerance(mut self, tolerance: Decimal) -> Result<Self> {
        if tolerance.is_sign_negative() && !tolerance.is_zero() {
            return Err(CoreError::InvalidIntent(format!(
                "overfill tolerance must be non-negative, got {tolerance}"
            )));
        }
        self.overfill_tolerance_fiat = tolerance;
        Ok(self)
    }

    #[must_use]
    pub fn with_merchant_only(mut self, merchant_only: bool) -> Self {
        self.merchant_only = merchant_only;
        self
    }

    /// Drop offers whose rating is set and below `min_rating`.
    #[must_use]
    pub fn with_min_rating(mut self, min_rating: Option<Decimal>) -> Self {
        self.min_rating = min_rating.filter(|r| *r > Decimal::ZERO);
        self
    }

    /// Same intent with a different split cap.
    pub fn with_max_splits(mut self, max_splits: u32) -> Result<Self> {
        if max_splits == 0 {
            return Err(CoreError::InvalidIntent(
                "max_splits must be at least 1".to_string(),
            ));
        }
        self.max_splits = max_splits;
        Ok(self)
    }

    pub fn direction(&self) -> TradeDirection {
        self.direction
    }

    pub fn target(&self) -> TargetAmount {
        self.target
    }

    pub fn accepted_payment_methods(&self) -> &BTreeSet<PaymentMethod> {
        &self.accepted_payment_methods
    }

    pub fn max_splits(&self) -> u32 {
        self.max_splits
    }

    pub fn min_chunk_fiat(&self) -> Decimal {
        self.min_chunk_fiat
    }

    pub fn overfill_tolerance_fiat(&self) -> Decimal {
        self.overfill_tolerance_fiat
    }

    pub fn merchant_only(&self) -> bool {
        self.merchant_only
    }

    pub fn min_rating(&self) -> Option<Decimal> {
        self.min_rating
    }
}
