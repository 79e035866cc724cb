//! Offer types and identifiers.
//!
//! An [`Offer`] is immutable once constructed: fields are private and the
//! only way in is [`Offer::try_from_fields`], which enforces the basic
//! invariants (positive price, `0 < min <= max`). A new snapshot always
//! produces new `Offer` values, even for the same advertiser.

use crate::decimal::Price;
use crate::error::MalformedOffer;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Market side from the perspective of the advertiser (the counterparty).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferSide {
    /// Advertiser buys the asset (pays fiat).
    #[serde(alias = "BUY")]
    Buy,
    /// Advertiser sells the asset (receives fiat).
    #[serde(alias = "SELL")]
    Sell,
}

impl OfferSide {
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl fmt::Display for OfferSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

impl std::str::FromStr for OfferSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            other => Err(format!("unknown offer side: {other}")),
        }
    }
}

/// Listing identifier, unique within one snapshot's market and side.
///
/// Not stable across snapshots: exchanges rotate ids on repost.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfferId(String);

impl OfferId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Advertiser identity, stable across snapshots for the same advertiser.
///
/// Keys starting with [`AdvertiserId::FINGERPRINT_PREFIX`] were synthesized
/// from public listing attributes because the source carried no advertiser
/// field; they are best-effort and may split or merge real advertisers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdvertiserId(String);

impl AdvertiserId {
    pub const FINGERPRINT_PREFIX: &'static str = "anon:";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build a fingerprint key from listing attributes.
    pub fn fingerprint(price: Decimal, min_fiat: Decimal, max_fiat: Decimal) -> Self {
        Self(format!(
            "{}{}:{}:{}",
            Self::FINGERPRINT_PREFIX,
            price.normalize(),
            min_fiat.normalize(),
            max_fiat.normalize()
        ))
    }

    pub fn is_fingerprint(&self) -> bool {
        self.0.starts_with(Self::FINGERPRINT_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdvertiserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalized payment-method tag (trimmed, lower-case).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentMethod(String);

impl PaymentMethod {
    /// Normalize a raw tag. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let tag = raw.trim().to_lowercase();
        if tag.is_empty() {
            None
        } else {
            Some(Self(tag))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unvalidated offer attributes, as produced by a normalizer.
///
/// This is also the serialized shape of [`Offer`], so offers read back from
/// storage pass through the same validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferFields {
    pub offer_id: OfferId,
    pub advertiser_id: AdvertiserId,
    pub side: OfferSide,
    pub unit_price: Decimal,
    pub min_fiat_amount: Decimal,
    pub max_fiat_amount: Decimal,
    #[serde(default)]
    pub payment_methods: BTreeSet<PaymentMethod>,
    #[serde(default)]
    pub is_merchant: Option<bool>,
    #[serde(default)]
    pub advertiser_rating: Option<Decimal>,
    #[serde(default)]
    pub completion_rate: Option<Decimal>,
    pub observed_at: DateTime<Utc>,
}

/// One advertiser's standing listing in one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OfferFields", into = "OfferFields")]
pub struct Offer {
    offer_id: OfferId,
    advertiser_id: AdvertiserId,
    side: OfferSide,
    unit_price: Price,
    min_fiat_amount: Decimal,
    max_fiat_amount: Decimal,
    payment_methods: BTreeSet<PaymentMethod>,
    is_merchant: Option<bool>,
    advertiser_rating: Option<Decimal>,
    completion_rate: Option<Decimal>,
    observed_at: DateTime<Utc>,
}

impl Offer {
    /// Validate and freeze offer attributes.
    ///
    /// Quality signals outside `[0, 1]` are dropped (set to `None`) rather
    /// than rejecting the offer; they are optional by nature.
    pub fn try_from_fields(fields: OfferFields) -> Result<Self, MalformedOffer> {
        if fields.unit_price <= Decimal::ZERO {
            return Err(MalformedOffer::NonPositivePrice(
                fields.unit_price.to_string(),
            ));
        }
        if fields.min_fiat_amount <= Decimal::ZERO {
            return Err(MalformedOffer::NonPositiveMin(
                fields.min_fiat_amount.to_string(),
            ));
        }
        if fields.min_fiat_amount > fields.max_fiat_amount {
            return Err(MalformedOffer::MinExceedsMax {
                min: fields.min_fiat_amount.to_string(),
                max: fields.max_fiat_amount.to_string(),
            });
        }

        Ok(Self {
            offer_id: fields.offer_id,
            advertiser_id: fields.advertiser_id,
            side: fields.side,
            unit_price: Price::new(fields.unit_price),
            min_fiat_amount: fields.min_fiat_amount,
            max_fiat_amount: fields.max_fiat_amount,
            payment_methods: fields.payment_methods,
            is_merchant: fields.is_merchant,
            advertiser_rating: fields.advertiser_rating.filter(is_unit_interval),
            completion_rate: fields.completion_rate.filter(is_unit_interval),
            observed_at: fields.observed_at,
        })
    }

    pub fn offer_id(&self) -> &OfferId {
        &self.offer_id
    }

    pub fn advertiser_id(&self) -> &AdvertiserId {
        &self.advertiser_id
    }

    pub fn side(&self) -> OfferSide {
        self.side
    }

    pub fn unit_price(&self) -> Price {
        self.unit_price
    }

    pub fn min_fiat_amount(&self) -> Decimal {
        self.min_fiat_amount
    }

    pub fn max_fiat_amount(&self) -> Decimal {
        self.max_fiat_amount
    }

    pub fn payment_methods(&self) -> &BTreeSet<PaymentMethod> {
        &self.payment_methods
    }

    pub fn is_merchant(&self) -> Option<bool> {
        self.is_merchant
    }

    pub fn advertiser_rating(&self) -> Option<Decimal> {
        self.advertiser_rating
    }

    pub fn completion_rate(&self) -> Option<Decimal> {
        self.completion_rate
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    /// The same offer attributed to `observed_at`, e.g. the start of the
    /// collection tick it was fetched in.
    pub fn observed_at_tick(mut self, observed_at: DateTime<Utc>) -> Self {
        self.observed_at = observed_at;
        self
    }

    /// Whether a single transaction of `fiat` fits inside this offer's bounds.
    pub fn covers_fiat(&self, fiat: Decimal) -> bool {
        self.min_fiat_amount <= fiat && fiat <= self.max_fiat_amount
    }

    /// Whether the offer accepts at least one of `accepted` (empty = any).
    pub fn accepts_any(&self, accepted: &BTreeSet<PaymentMethod>) -> bool {
        accepted.is_empty() || !self.payment_methods.is_disjoint(accepted)
    }
}

impl TryFrom<OfferFields> for Offer {
    type Error = MalformedOffer;

    fn try_from(fields: OfferFields) -> Result<Self, Self::Error> {
        Self::try_from_fields(fields)
    }
}

impl From<Offer> for OfferFields {
    fn from(offer: Offer) -> Self {
        Self {
            offer_id: offer.offer_id,
            advertiser_id: offer.advertiser_id,
            side: offer.side,
            unit_price: offer.unit_price.inner(),
            min_fiat_amount: offer.min_fiat_amount,
            max_fiat_amount: offer.max_fiat_amount,
            payment_methods: offer.payment_methods,
            is_merchant: offer.is_merchant,
            advertiser_rating: offer.advertiser_rating,
            completion_rate: offer.completion_rate,
            observed_at: offer.observed_at,
        }
    }
}

fn is_unit_interval(value: &Decimal) -> bool {
    *value >= Decimal::ZERO && *value <= Decimal::ONE
}
