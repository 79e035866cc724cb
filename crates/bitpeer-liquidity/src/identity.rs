//! Advertiser identity mapping.

use bitpeer_core::{AdvertiserId, Offer};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Maps an offer to the identity used for persistence metrics.
///
/// Keying on public signals only may be imperfect (one advertiser can post
/// under several ids, two can collide on a fingerprint).
pub trait IdentityResolver {
    fn resolve(&self, offer: &Offer) -> AdvertiserId;
}

/// Use the advertiser id as normalized (fingerprint when the venue hid it).
#[derive(Debug, Clone, Copy, Default)]
pub struct ByAdvertiserId;

impl IdentityResolver for ByAdvertiserId {
    fn resolve(&self, offer: &Offer) -> AdvertiserId {
        offer.advertiser_id().clone()
    }
}

/// Key every offer by its listing attributes (price and bounds).
///
/// For venues whose advertiser ids are session-scoped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByListingFingerprint;

impl IdentityResolver for ByListingFingerprint {
    fn resolve(&self, offer: &Offer) -> AdvertiserId {
        AdvertiserId::fingerprint(
            offer.unit_price().inner(),
            offer.min_fiat_amount(),
            offer.max_fiat_amount(),
        )
    }
}

/// Top-N identities of one snapshot, kept as history for later snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySnapshot {
    pub observed_at: DateTime<Utc>,
    /// Distinct identities in canonical offer order, at most N.
    pub top: Vec<AdvertiserId>,
}

impl IdentitySnapshot {
    pub fn identity_set(&self) -> BTreeSet<&AdvertiserId> {
        self.top.iter().collect()
    }

    /// How many of `reference` are still present here.
    pub fn retained(&self, reference: &BTreeSet<&AdvertiserId>) -> usize {
        self.top.iter().filter(|id| reference.contains(id)).count()
    }
}

/// First `n` distinct identities of `filtered` (canonical order).
pub fn top_identities<R: IdentityResolver + ?Sized>(
    filtered: &[&Offer],
    n: usize,
    resolver: &R,
) -> Vec<AdvertiserId> {
    let mut seen = BTreeSet::new();
    let mut top = Vec::with_capacity(n);

    for offer in filtered {
        if top.len() == n {
            break;
        }
        let id = resolver.resolve(offer);
        if seen.insert(id.clone()) {
            top.push(id);
        }
    }

    top
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::tests::offer;
    use rust_decimal_macros::dec;

    #[test]
    fn test_top_identities_are_distinct() {
        let offers = [
            offer("o1", "alice", dec!(95), dec!(1000)),
            offer("o2", "alice", dec!(95.1), dec!(1000)),
            offer("o3", "bob", dec!(95.2), dec!(1000)),
            offer("o4", "carol", dec!(95.3), dec!(1000)),
        ];
        let refs: Vec<&Offer> = offers.iter().collect();

        let top = top_identities(&refs, 2, &ByAdvertiserId);
        assert_eq!(top, vec![AdvertiserId::new("alice"), AdvertiserId::new("bob")]);
    }

    #[test]
    fn test_fingerprint_resolver() {
        let a = offer("o1", "alice", dec!(95), dec!(1000));
        let id = ByListingFingerprint.resolve(&a);
        assert!(id.is_fingerprint());
        assert_eq!(id, ByListingFingerprint.resolve(&offer("o9", "zed", dec!(95), dec!(1000))));
    }
}
