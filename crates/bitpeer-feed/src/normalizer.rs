//! Raw listing → [`Offer`] normalization.
//!
//! Field lookup checks the nested `adv`/`advertisement` object first for
//! listing attributes and the nested `advertiser`/`user` object first for
//! advertiser attributes, then falls back to the listing itself.

use crate::error::{FeedError, FeedResult};
use crate::extract::{
    extract_listings, first_present, ADVERTISER_KEYS, COMPLETION_KEYS, MAX_KEYS, MERCHANT_KEYS,
    MIN_KEYS, OFFER_ID_KEYS, PAYMENT_KEYS, PAYMENT_NAME_KEYS, PRICE_KEYS, RATING_KEYS,
};
use crate::raw::{RawFetchRecord, RAW_FORMAT_VERSION};
use bitpeer_core::{
    AdvertiserId, MalformedOffer, Offer, OfferFields, OfferId, OfferSide, PaymentMethod,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Where a listing came from; used for synthesized ids and offer metadata.
#[derive(Debug, Clone)]
pub struct ListingContext<'a> {
    pub market: &'a str,
    pub page: u32,
    pub side: OfferSide,
    pub observed_at: DateTime<Utc>,
}

impl<'a> ListingContext<'a> {
    pub fn from_record(record: &'a RawFetchRecord) -> Self {
        Self {
            market: &record.market,
            page: record.page,
            side: record.side,
            observed_at: record.ts_utc,
        }
    }
}

/// Valid offers of one raw record plus the number of rejected listings.
#[derive(Debug, Clone, Default)]
pub struct NormalizedSnapshot {
    pub offers: Vec<Offer>,
    pub malformed: usize,
}

impl NormalizedSnapshot {
    pub fn total(&self) -> usize {
        self.offers.len() + self.malformed
    }
}

/// Running counters across every record a normalizer has seen.
#[derive(Debug, Default)]
pub struct NormalizerStats {
    normalized: AtomicU64,
    malformed: AtomicU64,
}

impl NormalizerStats {
    fn record(&self, batch: &NormalizedSnapshot) {
        self.normalized
            .fetch_add(batch.offers.len() as u64, Ordering::Relaxed);
        self.malformed
            .fetch_add(batch.malformed as u64, Ordering::Relaxed);
    }

    pub fn normalized(&self) -> u64 {
        self.normalized.load(Ordering::Relaxed)
    }

    pub fn malformed(&self) -> u64 {
        self.malformed.load(Ordering::Relaxed)
    }
}

/// Offer normalizer.
#[derive(Debug, Default)]
pub struct OfferNormalizer {
    stats: NormalizerStats,
}

impl OfferNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &NormalizerStats {
        &self.stats
    }

    /// Normalize every listing in a raw fetch record.
    ///
    /// Fails only when the record as a whole is unusable (failed fetch,
    /// unknown format, body that is not JSON). Individual bad listings are
    /// counted in `malformed` and logged.
    pub fn normalize_record(&self, record: &RawFetchRecord) -> FeedResult<NormalizedSnapshot> {
        if record.format_version != RAW_FORMAT_VERSION {
            return Err(FeedError::UnsupportedFormat(record.format_version.clone()));
        }
        if !record.is_success() {
            return Err(FeedError::FetchFailed {
                market: record.market.clone(),
                page: record.page,
                reason: record
                    .error
                    .clone()
                    .or_else(|| record.http_status.map(|s| format!("http status {s}")))
                    .unwrap_or_else(|| "empty response".to_string()),
            });
        }

        let body = record.response_text.as_deref().unwrap_or_default();
        let payload: Value = serde_json::from_str(body)?;
        let listings = extract_listings(&payload);
        let batch = self.normalize_listings(&listings, &ListingContext::from_record(record));

        debug!(
            market = %record.market,
            page = record.page,
            offers = batch.offers.len(),
            malformed = batch.malformed,
            "Normalized raw record"
        );
        Ok(batch)
    }

    /// Normalize already-extracted listings. Never fails; bad listings are counted.
    pub fn normalize_listings(
        &self,
        listings: &[&Map<String, Value>],
        ctx: &ListingContext<'_>,
    ) -> NormalizedSnapshot {
        let mut batch = NormalizedSnapshot::default();

        for (index, item) in listings.iter().enumerate() {
            match normalize_listing(item, ctx, index) {
                Ok(offer) => batch.offers.push(offer),
                Err(e) => {
                    warn!(
                        market = ctx.market,
                        page = ctx.page,
                        index,
                        error = %e,
                        "Dropping malformed listing"
                    );
                    batch.malformed += 1;
                }
            }
        }

        self.stats.record(&batch);
        batch
    }
}

/// Normalize one raw listing into a validated offer.
pub fn normalize_listing(
    item: &Map<String, Value>,
    ctx: &ListingContext<'_>,
    index: usize,
) -> Result<Offer, MalformedOffer> {
    let adv = nested(item, &["adv", "advertisement"]);
    let advertiser = nested(item, &["advertiser", "user"]);

    let unit_price = required_decimal(adv, item, PRICE_KEYS, "price")?;
    let min_fiat_amount = required_decimal(adv, item, MIN_KEYS, "min_fiat_amount")?;
    let max_fiat_amount = required_decimal(adv, item, MAX_KEYS, "max_fiat_amount")?;

    let offer_id = lookup(adv, item, OFFER_ID_KEYS)
        .and_then(value_as_string)
        .map(OfferId::new)
        .unwrap_or_else(|| OfferId::new(format!("{}:{}:{}", ctx.market, ctx.page, index)));

    let advertiser_id = lookup(advertiser, item, ADVERTISER_KEYS)
        .and_then(value_as_string)
        .map(AdvertiserId::new)
        .unwrap_or_else(|| AdvertiserId::fingerprint(unit_price, min_fiat_amount, max_fiat_amount));

    let fields = OfferFields {
        offer_id,
        advertiser_id,
        side: ctx.side,
        unit_price,
        min_fiat_amount,
        max_fiat_amount,
        payment_methods: payment_methods(item),
        is_merchant: lookup(advertiser, item, MERCHANT_KEYS).and_then(value_as_bool),
        advertiser_rating: lookup(advertiser, item, RATING_KEYS)
            .and_then(value_as_decimal)
            .and_then(unit_score),
        completion_rate: lookup(advertiser, item, COMPLETION_KEYS)
            .and_then(value_as_decimal)
            .and_then(unit_score),
        observed_at: ctx.observed_at,
    };

    Offer::try_from_fields(fields)
}

fn nested<'a>(item: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Map<String, Value>> {
    keys.iter().find_map(|k| item.get(*k).and_then(Value::as_object))
}

fn lookup<'a>(
    primary: Option<&'a Map<String, Value>>,
    item: &'a Map<String, Value>,
    keys: &[&str],
) -> Option<&'a Value> {
    primary
        .and_then(|p| first_present(p, keys))
        .or_else(|| first_present(item, keys))
}

fn required_decimal(
    primary: Option<&Map<String, Value>>,
    item: &Map<String, Value>,
    keys: &[&str],
    field: &'static str,
) -> Result<Decimal, MalformedOffer> {
    let value = lookup(primary, item, keys).ok_or(MalformedOffer::MissingField(field))?;
    value_as_decimal(value).ok_or_else(|| MalformedOffer::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// JSON number or numeric string (thousands separators allowed).
fn value_as_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.replace(',', "").trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => {
            let s = s.trim().to_ascii_lowercase();
            Some(!(s.is_empty() || s == "0" || s == "false" || s == "no"))
        }
        _ => None,
    }
}

/// Scale percentage scores in `(1, 100]` down to `[0, 1]`.
fn unit_score(raw: Decimal) -> Option<Decimal> {
    if raw > Decimal::ONE && raw <= Decimal::ONE_HUNDRED {
        Some(raw / Decimal::ONE_HUNDRED)
    } else if raw >= Decimal::ZERO && raw <= Decimal::ONE {
        Some(raw)
    } else {
        None
    }
}

fn payment_methods(item: &Map<String, Value>) -> BTreeSet<PaymentMethod> {
    let raw_tags: Vec<String> = match first_present(item, PAYMENT_KEYS) {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|entry| match entry {
                Value::Object(obj) => first_present(obj, PAYMENT_NAME_KEYS).and_then(value_as_string),
                other => value_as_string(other),
            })
            .collect(),
        Some(Value::Object(by_method)) => by_method.keys().cloned().collect(),
        _ => Vec::new(),
    };

    raw_tags.iter().filter_map(|t| PaymentMethod::parse(t)).collect()
}
