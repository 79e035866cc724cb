//! Prometheus metrics for the bitpeer pipeline.
//!
//! Only the CLI pipeline records these; the pricing and liquidity crates
//! stay free of side effects.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent failure.
//! These panics only occur during static initialization, never at runtime.

use crate::error::TelemetryResult;
use once_cell::sync::Lazy;
use prometheus::{
    register_gauge_vec, register_int_counter_vec, Encoder, GaugeVec, IntCounterVec, TextEncoder,
};

/// Offers that passed normalization.
pub static OFFERS_NORMALIZED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "bitpeer_offers_normalized_total",
        "Total raw listings normalized into offers",
        &["market"]
    )
    .unwrap()
});

/// Listings dropped as malformed.
pub static OFFERS_MALFORMED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "bitpeer_offers_malformed_total",
        "Total raw listings rejected as malformed",
        &["market"]
    )
    .unwrap()
});

/// Snapshots run through the engine.
pub static SNAPSHOTS_ANALYZED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "bitpeer_snapshots_analyzed_total",
        "Total offer snapshots analyzed",
        &["market"]
    )
    .unwrap()
});

/// Intent evaluations by outcome.
/// Labels: outcome (full/partial/none)
pub static EXECUTION_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "bitpeer_execution_total",
        "Total intent evaluations by outcome",
        &["intent", "strategy", "outcome"]
    )
    .unwrap()
});

/// Latest achieved price per intent.
pub static ACHIEVED_PRICE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "bitpeer_achieved_price",
        "Latest achieved unit price (fiat per asset)",
        &["intent", "strategy"]
    )
    .unwrap()
});

/// Latest near-best depth share of each intent's executable offers.
pub static NEAR_BEST_SHARE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "bitpeer_near_best_share",
        "Latest share of depth within X% of the best price",
        &["intent"]
    )
    .unwrap()
});

/// Latest top-N stability of each intent's executable offers.
pub static TOP_STABILITY: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "bitpeer_top_stability",
        "Latest top-N advertiser overlap with the previous snapshot",
        &["intent"]
    )
    .unwrap()
});

/// Combo evaluations by outcome.
/// Labels: outcome (feasible/infeasible)
pub static COMBO_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "bitpeer_combo_total",
        "Total combo evaluations by outcome",
        &["combo", "outcome"]
    )
    .unwrap()
});

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    pub fn offers_normalized(market: &str, count: u64) {
        OFFERS_NORMALIZED_TOTAL
            .with_label_values(&[market])
            .inc_by(count);
    }

    pub fn offers_malformed(market: &str, count: u64) {
        OFFERS_MALFORMED_TOTAL
            .with_label_values(&[market])
            .inc_by(count);
    }

    pub fn snapshot_analyzed(market: &str) {
        SNAPSHOTS_ANALYZED_TOTAL.with_label_values(&[market]).inc();
    }

    pub fn execution(intent: &str, strategy: &str, outcome: &str) {
        EXECUTION_TOTAL
            .with_label_values(&[intent, strategy, outcome])
            .inc();
    }

    pub fn achieved_price(intent: &str, strategy: &str, price: f64) {
        ACHIEVED_PRICE
            .with_label_values(&[intent, strategy])
            .set(price);
    }

    pub fn near_best_share(intent: &str, share: f64) {
        NEAR_BEST_SHARE.with_label_values(&[intent]).set(share);
    }

    pub fn top_stability(intent: &str, stability: f64) {
        TOP_STABILITY.with_label_values(&[intent]).set(stability);
    }

    pub fn combo(combo: &str, outcome: &str) {
        COMBO_TOTAL.with_label_values(&[combo, outcome]).inc();
    }

    /// Render the default registry in the text exposition format.
    pub fn gather_text() -> TelemetryResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
