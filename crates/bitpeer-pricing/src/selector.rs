//! Single-offer selector.

use bitpeer_core::{ExecutionResult, Fill, Offer, TargetAmount, TradeIntent};

/// Best single offer able to cover the whole target.
///
/// `filtered` must be in canonical order (see [`crate::filter`]). Returns
/// `None` only when `filtered` is empty, so callers can tell "no candidates"
/// from "candidates exist but none covers the amount" (an unfilled result).
/// `max_splits` and `min_chunk_fiat` do not apply to a single offer.
pub fn select_best(filtered: &[&Offer], intent: &TradeIntent) -> Option<ExecutionResult> {
    if filtered.is_empty() {
        return None;
    }

    let target = intent.target();
    let chosen = filtered.iter().find_map(|offer| {
        let price = offer.unit_price();
        // Amounts outside the Decimal range cannot be covered.
        let (fiat, asset) = match target {
            TargetAmount::Fiat(fiat) => (fiat, price.asset_for(fiat)?),
            TargetAmount::Asset(asset) => (price.fiat_for(asset)?, asset),
        };
        offer.covers_fiat(fiat).then(|| Fill {
            offer_id: offer.offer_id().clone(),
            advertiser_id: offer.advertiser_id().clone(),
            unit_price: price,
            fiat_contribution: fiat,
            asset_amount: asset,
        })
    });

    Some(match chosen {
        Some(fill) => {
            ExecutionResult::from_fills(intent.direction(), target, vec![fill], true)
        }
        None => ExecutionResult::unfilled(intent.direction(), target),
    })
}
