//! Split allocator: greedy VWAP fill across several offers.
//!
//! Walks offers best price first and takes as much of each as the residual
//! needs, subject to:
//! - the minimum-chunk rule: a non-final contribution below
//!   `min_chunk_fiat` is skipped rather than taken as a sliver
//! - the offer's own minimum: a residual below `min_fiat_amount` is only
//!   taken if overshooting to that minimum stays within
//!   `overfill_tolerance_fiat`, otherwise the offer is skipped
//! - at most `max_splits` offers
//! - amounts outside the `Decimal` range: the offer is skipped
//!
//! Greedy is a heuristic here, not a global optimum: with minimum sizes the
//! assignment problem is bin-packing flavoured. Any replacement must keep
//! conservation (contributions sum to the filled amount) and the no-sliver
//! property.

use bitpeer_core::{
    approx_zero, ExecutionResult, Fill, Offer, TargetAmount, TradeIntent,
};
use rust_decimal::Decimal;
use tracing::{debug, field, instrument, Span};

/// Fill `intent` greedily from `filtered` (canonical order, best first).
///
/// Always returns a result. With no usable offers it is unfilled; when
/// `max_splits` or the offers run out first the partial fill is reported
/// with `fully_executable = false`.
#[instrument(
    target = "pricing",
    skip_all,
    fields(
        direction = %intent.direction(),
        target_amount = %intent.target().value(),
        candidates = filtered.len(),
        used = field::Empty,
        fully_executable = field::Empty
    )
)]
pub fn allocate(filtered: &[&Offer], intent: &TradeIntent) -> ExecutionResult {
    let target = intent.target();
    let max_splits = intent.max_splits() as usize;
    let min_chunk = intent.min_chunk_fiat();
    let tolerance = intent.overfill_tolerance_fiat();

    // Residual in the target's own unit.
    let mut remaining = target.value();
    let mut filled_fiat = Decimal::ZERO;
    let mut fills: Vec<Fill> = Vec::with_capacity(max_splits.min(filtered.len()));

    for offer in filtered {
        if approx_zero(remaining) {
            break;
        }
        if fills.len() == max_splits {
            debug!(max_splits, %remaining, "max_splits reached before target filled");
            break;
        }

        let price = offer.unit_price();
        let remaining_fiat = match target {
            TargetAmount::Fiat(_) => Some(remaining),
            TargetAmount::Asset(_) => price.fiat_for(remaining),
        };
        let Some(remaining_fiat) = remaining_fiat else {
            debug!(offer_id = %offer.offer_id(), %remaining, "skipping offer: fiat amount out of range");
            continue;
        };

        let mut contribution = remaining_fiat.min(offer.max_fiat_amount());
        let is_final = contribution >= remaining_fiat;

        if !is_final && contribution < min_chunk {
            debug!(
                offer_id = %offer.offer_id(),
                %contribution,
                %min_chunk,
                "skipping offer: non-final contribution below min_chunk_fiat"
            );
            continue;
        }

        if contribution < offer.min_fiat_amount() {
            let overshoot = offer.min_fiat_amount() - remaining_fiat;
            if overshoot > tolerance {
                debug!(
                    offer_id = %offer.offer_id(),
                    %remaining_fiat,
                    offer_min = %offer.min_fiat_amount(),
                    "skipping offer: residual below offer minimum"
                );
                continue;
            }
            debug!(
                offer_id = %offer.offer_id(),
                %overshoot,
                "taking offer minimum to avoid unfilled leftover"
            );
            contribution = offer.min_fiat_amount();
        }

        // Exact residual for the closing chunk of an asset target, so the
        // filled asset equals the target without division drift.
        let asset = match target {
            TargetAmount::Asset(_) if contribution == remaining_fiat => Some(remaining),
            _ => price.asset_for(contribution),
        };
        let (Some(asset), Some(total_fiat)) = (asset, filled_fiat.checked_add(contribution)) else {
            debug!(offer_id = %offer.offer_id(), %contribution, "skipping offer: amount out of range");
            continue;
        };
        filled_fiat = total_fiat;

        remaining -= match target {
            TargetAmount::Fiat(_) => contribution,
            TargetAmount::Asset(_) => asset,
        };
        if remaining.is_sign_negative() {
            remaining = Decimal::ZERO;
        }

        fills.push(Fill {
            offer_id: offer.offer_id().clone(),
            advertiser_id: offer.advertiser_id().clone(),
            unit_price: price,
            fiat_contribution: contribution,
            asset_amount: asset,
        });
    }

    let fully_executable = approx_zero(remaining);

    let span = Span::current();
    span.record("used", fills.len());
    span.record("fully_executable", fully_executable);

    if !fully_executable {
        debug!(%remaining, used = fills.len(), "allocation incomplete");
    }

    ExecutionResult::from_fills(intent.direction(), target, fills, fully_executable)
}
