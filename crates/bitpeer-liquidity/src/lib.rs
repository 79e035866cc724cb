//! Liquidity analyzer.
//!
//! True depth of a P2P market is not observable, so this crate derives
//! public proxies from the filtered offer set of one snapshot:
//! - near-best concentration: share of depth priced close to the best offer
//! - top stability: advertiser overlap of the top-N with the previous snapshot
//! - half-life: time until fewer than half of a reference top-N remain
//!
//! Stability metrics key on advertiser identity, never on `offer_id`, which
//! exchanges rotate on repost. The mapping is pluggable via
//! [`IdentityResolver`].

pub mod analyzer;
pub mod error;
pub mod identity;
pub mod window;

pub use analyzer::{
    analyze, analyze_with, Availability, HalfLife, LiquidityParams, LiquiditySnapshot,
    UnavailableReason,
};
pub use error::{LiquidityError, LiquidityResult};
pub use identity::{top_identities, ByAdvertiserId, ByListingFingerprint, IdentityResolver, IdentitySnapshot};
pub use window::IdentityHistory;
