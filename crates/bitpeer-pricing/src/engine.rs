//! One-call pricing of an intent against a raw offer set.

use crate::allocator::allocate;
use crate::config::LegStrategy;
use crate::filter::filter;
use crate::selector::select_best;
use bitpeer_core::{ExecutionResult, Offer, TradeIntent};

/// Filter `offers` for `intent` and price it with `strategy`.
///
/// An empty candidate set yields an unfilled result for both strategies.
pub fn evaluate(offers: &[Offer], intent: &TradeIntent, strategy: LegStrategy) -> ExecutionResult {
    let filtered = filter(offers, intent);
    match strategy {
        LegStrategy::Split => allocate(&filtered, intent),
        LegStrategy::Single => select_best(&filtered, intent)
            .unwrap_or_else(|| ExecutionResult::unfilled(intent.direction(), intent.target())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ask, buy_fiat};
    use rust_decimal_macros::dec;

    #[test]
    fn test_strategies_differ_when_no_single_offer_covers() {
        let offers = vec![
            ask("o1", dec!(95), dec!(500), dec!(10000)),
            ask("o2", dec!(96), dec!(500), dec!(5000)),
        ];
        let intent = buy_fiat(dec!(12000), 3, dec!(500));

        assert!(evaluate(&offers, &intent, LegStrategy::Split).fully_executable);
        assert!(!evaluate(&offers, &intent, LegStrategy::Single).fully_executable);
    }

    #[test]
    fn test_empty_book() {
        let intent = buy_fiat(dec!(12000), 3, dec!(500));
        for strategy in [LegStrategy::Split, LegStrategy::Single] {
            let result = evaluate(&[], &intent, strategy);
            assert!(!result.fully_executable);
            assert!(result.offers_used.is_empty());
        }
    }
}
