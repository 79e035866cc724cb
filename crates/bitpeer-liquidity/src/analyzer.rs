//! Per-snapshot liquidity proxies.

use crate::error::{LiquidityError, LiquidityResult};
use crate::identity::{top_identities, ByAdvertiserId, IdentityResolver, IdentitySnapshot};
use bitpeer_core::{Offer, OfferId, Price};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Thresholds for one analysis, passed explicitly per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityParams {
    /// X: offers within this percentage of the best price count as near-best.
    pub near_best_pct: Decimal,
    /// N: size of the top identity set.
    pub top_n: usize,
}

impl LiquidityParams {
    pub fn validate(&self) -> LiquidityResult<()> {
        if self.near_best_pct.is_sign_negative() {
            return Err(LiquidityError::InvalidParams(format!(
                "near_best_pct ({}) must be non-negative",
                self.near_best_pct
            )));
        }
        if self.top_n == 0 {
            return Err(LiquidityError::InvalidParams(
                "top_n must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// No depth to measure against.
    EmptyBook,
    /// No best price was supplied.
    NoReferencePrice,
    /// Not enough prior snapshots.
    InsufficientHistory,
}

/// A metric value, or why it could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Availability<T> {
    Available(T),
    Unavailable(UnavailableReason),
}

impl<T: Copy> Availability<T> {
    pub fn value(&self) -> Option<T> {
        match self {
            Self::Available(v) => Some(*v),
            Self::Unavailable(_) => None,
        }
    }
}

/// Time for half of a reference top-N to disappear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HalfLife {
    /// Fewer than half remained after `secs`.
    Observed { secs: i64 },
    /// At least half still present at the end of a window spanning `secs`.
    AtLeast { secs: i64 },
    /// Fewer than two snapshots in the window.
    Unavailable,
}

impl HalfLife {
    pub fn duration(&self) -> Option<Duration> {
        match self {
            Self::Observed { secs } | Self::AtLeast { secs } => Some(Duration::seconds(*secs)),
            Self::Unavailable => None,
        }
    }
}

/// Liquidity proxies for one market side at one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquiditySnapshot {
    pub observed_at: DateTime<Utc>,
    /// Fraction (0..=1) of total `max_fiat_amount` within X% of the best price.
    pub near_best_liquidity_pct: Availability<Decimal>,
    /// |top-N now ∩ top-N previous| / N.
    pub top_stability: Availability<Decimal>,
    pub half_life: HalfLife,
    pub total_depth_fiat: Decimal,
    pub offer_count: usize,
    /// Lookup-only references into the current snapshot.
    pub top_offer_ids: Vec<OfferId>,
    /// Entry to append to the history for the next snapshot.
    pub identities: IdentitySnapshot,
}

/// Analyze `filtered` (canonical order) keyed by advertiser id.
///
/// `history` must be ordered by time and strictly precede `observed_at`.
pub fn analyze(
    filtered: &[&Offer],
    best_price: Option<Price>,
    history: &[IdentitySnapshot],
    params: &LiquidityParams,
    observed_at: DateTime<Utc>,
) -> LiquidityResult<LiquiditySnapshot> {
    analyze_with(filtered, best_price, history, params, observed_at, &ByAdvertiserId)
}

/// [`analyze`] with an explicit identity mapping.
pub fn analyze_with<R: IdentityResolver + ?Sized>(
    filtered: &[&Offer],
    best_price: Option<Price>,
    history: &[IdentitySnapshot],
    params: &LiquidityParams,
    observed_at: DateTime<Utc>,
    resolver: &R,
) -> LiquidityResult<LiquiditySnapshot> {
    params.validate()?;
    check_ordered(history, observed_at)?;

    let total_depth_fiat = filtered
        .iter()
        .fold(Decimal::ZERO, |acc, o| acc.saturating_add(o.max_fiat_amount()));
    let near_best_liquidity_pct =
        near_best_share(filtered, best_price, params.near_best_pct, total_depth_fiat);

    let identities = IdentitySnapshot {
        observed_at,
        top: top_identities(filtered, params.top_n, resolver),
    };

    let top_stability = match history.last() {
        Some(previous) => {
            let overlap = identities.retained(&previous.identity_set());
            Availability::Available(Decimal::from(overlap) / Decimal::from(params.top_n))
        }
        None => Availability::Unavailable(UnavailableReason::InsufficientHistory),
    };

    let half_life = half_life(history, &identities);

    let top_offer_ids = filtered
        .iter()
        .take(params.top_n)
        .map(|o| o.offer_id().clone())
        .collect();

    debug!(
        offers = filtered.len(),
        %total_depth_fiat,
        near_best = ?near_best_liquidity_pct.value(),
        stability = ?top_stability.value(),
        ?half_life,
        "Liquidity analyzed"
    );

    Ok(LiquiditySnapshot {
        observed_at,
        near_best_liquidity_pct,
        top_stability,
        half_life,
        total_depth_fiat,
        offer_count: filtered.len(),
        top_offer_ids,
        identities,
    })
}

fn check_ordered(history: &[IdentitySnapshot], observed_at: DateTime<Utc>) -> LiquidityResult<()> {
    if let Some(pair) = history
        .windows(2)
        .find(|w| w[1].observed_at <= w[0].observed_at)
    {
        return Err(LiquidityError::UnorderedHistory(format!(
            "{} after {}",
            pair[1].observed_at, pair[0].observed_at
        )));
    }
    if let Some(last) = history.last() {
        if last.observed_at >= observed_at {
            return Err(LiquidityError::UnorderedHistory(format!(
                "history entry {} not before snapshot {}",
                last.observed_at, observed_at
            )));
        }
    }
    Ok(())
}

fn near_best_share(
    filtered: &[&Offer],
    best_price: Option<Price>,
    near_best_pct: Decimal,
    total_depth: Decimal,
) -> Availability<Decimal> {
    if total_depth.is_zero() {
        return Availability::Unavailable(UnavailableReason::EmptyBook);
    }
    let Some(best) = best_price.filter(Price::is_positive) else {
        return Availability::Unavailable(UnavailableReason::NoReferencePrice);
    };

    let threshold = near_best_pct / Decimal::ONE_HUNDRED;
    // A distance too large to represent is never near.
    let near = filtered
        .iter()
        .filter(|o| {
            (o.unit_price().inner() - best.inner())
                .abs()
                .checked_div(best.inner())
                .is_some_and(|distance| distance <= threshold)
        })
        .fold(Decimal::ZERO, |acc, o| acc.saturating_add(o.max_fiat_amount()));

    Availability::Available(near / total_depth)
}

/// Window is `history ++ [current]`; reference set is the first entry's top-N.
fn half_life(history: &[IdentitySnapshot], current: &IdentitySnapshot) -> HalfLife {
    let Some(first) = history.first() else {
        return HalfLife::Unavailable;
    };
    let reference = first.identity_set();
    if reference.is_empty() {
        return HalfLife::Unavailable;
    }

    let elapsed = |entry: &IdentitySnapshot| (entry.observed_at - first.observed_at).num_seconds();

    history
        .iter()
        .skip(1)
        .chain(std::iter::once(current))
        .find(|entry| entry.retained(&reference) * 2 < reference.len())
        .map(|entry| HalfLife::Observed {
            secs: elapsed(entry),
        })
        .unwrap_or(HalfLife::AtLeast {
            secs: elapsed(current),
        })
}
