//! Combo evaluator: chain a buy leg and a sell leg into one cross rate.
//!
//! The rate is only reported when both legs are executable to the same
//! degree. A rate built from one full leg and one partial leg would overstate
//! what can actually be done, so that case is a typed `Infeasible` outcome.

use crate::config::{ComboMode, LegStrategy};
use crate::engine::evaluate;
use crate::error::{PricingError, PricingResult};
use bitpeer_core::{ExecutionResult, Offer, TradeDirection, TradeIntent};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Relaxed mode: fill fractions must agree within this.
pub const FRACTION_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComboLeg {
    Buy,
    Sell,
}

impl fmt::Display for ComboLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "leg", rename_all = "snake_case")]
pub enum InfeasibleReason {
    /// The leg matched nothing at all.
    NoFill(ComboLeg),
    /// Strict mode: the leg only filled partially.
    NotFullyExecutable(ComboLeg),
    /// Relaxed mode: the legs filled different fractions of their targets.
    FractionMismatch,
    /// The cross rate does not fit in a `Decimal`.
    RateOutOfRange,
}

impl fmt::Display for InfeasibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFill(leg) => write!(f, "{leg} leg has no fill"),
            Self::NotFullyExecutable(leg) => write!(f, "{leg} leg not fully executable"),
            Self::FractionMismatch => write!(f, "leg fill fractions differ"),
            Self::RateOutOfRange => write!(f, "effective rate out of decimal range"),
        }
    }
}

/// Both legs executable; the cross rate is meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboResult {
    pub buy_leg: ExecutionResult,
    pub sell_leg: ExecutionResult,
    /// Sell-leg fiat received per unit of buy-leg fiat spent.
    pub effective_rate: Decimal,
    pub mode: ComboMode,
    /// Fraction of each leg's target that was filled (1 in strict mode).
    pub fill_fraction: Decimal,
}

/// Why no rate is reported, with both leg results for inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboInfeasible {
    pub reason: InfeasibleReason,
    pub buy_leg: ExecutionResult,
    pub sell_leg: ExecutionResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComboOutcome {
    Feasible(ComboResult),
    Infeasible(ComboInfeasible),
}

impl ComboOutcome {
    pub fn effective_rate(&self) -> Option<Decimal> {
        match self {
            Self::Feasible(r) => Some(r.effective_rate),
            Self::Infeasible(_) => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Feasible(_) => "feasible",
            Self::Infeasible(_) => "infeasible",
        }
    }
}

/// Price both legs independently and combine them.
///
/// `buy_offers` / `sell_offers` are the raw offer sets of the two markets;
/// each leg is filtered for its own intent. Returns `Err` only when the legs
/// are passed in the wrong direction.
pub fn evaluate_combo(
    buy_intent: &TradeIntent,
    sell_intent: &TradeIntent,
    buy_offers: &[Offer],
    sell_offers: &[Offer],
    strategy: LegStrategy,
    mode: ComboMode,
) -> PricingResult<ComboOutcome> {
    if buy_intent.direction() != TradeDirection::BuyAsset {
        return Err(PricingError::LegDirection(format!(
            "buy leg must be buy_asset, got {}",
            buy_intent.direction()
        )));
    }
    if sell_intent.direction() != TradeDirection::SellAsset {
        return Err(PricingError::LegDirection(format!(
            "sell leg must be sell_asset, got {}",
            sell_intent.direction()
        )));
    }

    let buy_leg = evaluate(buy_offers, buy_intent, strategy);
    let sell_leg = evaluate(sell_offers, sell_intent, strategy);

    let checked = check_legs(&buy_leg, &sell_leg, mode).and_then(|fill_fraction| {
        sell_leg
            .filled
            .fiat
            .checked_div(buy_leg.filled.fiat)
            .map(|rate| (fill_fraction, rate))
            .ok_or(InfeasibleReason::RateOutOfRange)
    });

    let outcome = match checked {
        Err(reason) => {
            debug!(%reason, ?mode, "combo infeasible");
            ComboOutcome::Infeasible(ComboInfeasible {
                reason,
                buy_leg,
                sell_leg,
            })
        }
        Ok((fill_fraction, effective_rate)) => {
            debug!(%effective_rate, %fill_fraction, ?mode, "combo feasible");
            ComboOutcome::Feasible(ComboResult {
                buy_leg,
                sell_leg,
                effective_rate,
                mode,
                fill_fraction,
            })
        }
    };

    Ok(outcome)
}

/// Common fill fraction of the legs, or why they cannot be combined.
fn check_legs(
    buy: &ExecutionResult,
    sell: &ExecutionResult,
    mode: ComboMode,
) -> Result<Decimal, InfeasibleReason> {
    if !buy.has_fill() {
        return Err(InfeasibleReason::NoFill(ComboLeg::Buy));
    }
    if !sell.has_fill() {
        return Err(InfeasibleReason::NoFill(ComboLeg::Sell));
    }

    if buy.fully_executable && sell.fully_executable {
        return Ok(Decimal::ONE);
    }

    match mode {
        ComboMode::Strict => {
            let leg = if buy.fully_executable {
                ComboLeg::Sell
            } else {
                ComboLeg::Buy
            };
            Err(InfeasibleReason::NotFullyExecutable(leg))
        }
        ComboMode::Relaxed => {
            let (a, b) = (buy.fill_ratio(), sell.fill_ratio());
            if (a - b).abs() <= FRACTION_TOLERANCE {
                Ok(a.min(b))
            } else {
                Err(InfeasibleReason::FractionMismatch)
            }
        }
    }
}
