//! Batch pipeline: raw records → normalized offers → metrics.
//!
//! `process_day` replays the raw store of one UTC day through the
//! normalizer. `analyze_day` regroups the normalized offers into snapshots
//! and runs every configured intent and combo over them, one blocking task
//! per market.

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use bitpeer_core::{MarketKey, Offer, OfferSnapshot, TradeIntent};
use bitpeer_feed::OfferNormalizer;
use bitpeer_liquidity::{analyze, IdentityHistory, LiquidityParams};
use bitpeer_persistence::{
    read_jsonl, JsonLinesWriter, MetricPayload, MetricRecord, OfferRecord, RawStore, Timestamped,
};
use bitpeer_pricing::{evaluate, evaluate_combo, filter, LegStrategy};
use bitpeer_telemetry::Metrics;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

const WRITER_BUFFER: usize = 1000;

pub fn processed_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("processed")
}

pub fn metrics_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("metrics")
}

/// Outcome of normalizing one day of raw data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    pub records: usize,
    pub failed_records: usize,
    pub offers: usize,
    pub malformed: usize,
    pub output: PathBuf,
}

/// Outcome of analyzing one day of normalized offers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyzeSummary {
    pub snapshots: usize,
    pub executions: usize,
    pub liquidity: usize,
    pub combos: usize,
    pub unpaired_combo_snapshots: usize,
    pub output: PathBuf,
}

/// Open a day file writer, discarding any previous output for `day`.
fn fresh_writer<R>(dir: PathBuf, prefix: &str, day: &str) -> AppResult<(JsonLinesWriter<R>, PathBuf)>
where
    R: Serialize + Timestamped,
{
    let writer = JsonLinesWriter::new(dir, prefix, WRITER_BUFFER)?;
    let path = writer.path_for(day);
    if path.exists() {
        std::fs::remove_file(&path)?;
    }
    Ok((writer, path))
}

/// Normalize every raw record of `day` into `processed/offers_{day}.jsonl`.
///
/// Records that cannot be parsed as a whole (failed fetch, unknown format)
/// are logged and skipped; bad listings inside a good record are counted
/// as malformed.
pub fn process_day(config: &AppConfig, day: &str) -> AppResult<ProcessSummary> {
    let data_dir = &config.app.data_dir;
    let records = RawStore::new(data_dir).read_day(day)?;
    let normalizer = OfferNormalizer::new();
    let (mut writer, output) = fresh_writer::<OfferRecord>(processed_dir(data_dir), "offers", day)?;

    let mut summary = ProcessSummary {
        records: records.len(),
        output,
        ..Default::default()
    };

    for record in &records {
        let batch = match normalizer.normalize_record(record) {
            Ok(batch) => batch,
            Err(e) => {
                warn!(
                    market = %record.market,
                    page = record.page,
                    ts = %record.ts_utc,
                    error = %e,
                    "Skipping raw record"
                );
                summary.failed_records += 1;
                continue;
            }
        };

        Metrics::offers_normalized(&record.market, batch.offers.len() as u64);
        Metrics::offers_malformed(&record.market, batch.malformed as u64);
        summary.malformed += batch.malformed;

        for offer in batch.offers {
            writer.add_record(OfferRecord {
                market: record.market.clone(),
                page: record.page,
                offer,
            })?;
            summary.offers += 1;
        }
    }
    writer.close()?;

    info!(
        day,
        records = summary.records,
        failed = summary.failed_records,
        offers = normalizer.stats().normalized(),
        malformed = normalizer.stats().malformed(),
        output = %summary.output.display(),
        "Processed raw records"
    );
    Ok(summary)
}

/// Offers of one market fetched during one collection tick.
#[derive(Debug)]
struct Tick {
    observed_at: DateTime<Utc>,
    pages: BTreeSet<u32>,
    offers: Vec<Offer>,
}

/// Fold page batches, ordered by fetch time, into collection ticks.
///
/// A page above 1 joins the current tick unless that page was already seen
/// or it was fetched more than `window` after the tick started. Offers are
/// stamped with the tick's start time.
fn group_ticks(pages: BTreeMap<(DateTime<Utc>, u32), Vec<Offer>>, window: Duration) -> Vec<Tick> {
    let mut ticks: Vec<Tick> = Vec::new();

    for ((fetched_at, page), offers) in pages {
        match ticks.last_mut() {
            Some(tick)
                if page > 1
                    && !tick.pages.contains(&page)
                    && fetched_at - tick.observed_at <= window =>
            {
                let observed_at = tick.observed_at;
                tick.pages.insert(page);
                tick.offers
                    .extend(offers.into_iter().map(|o| o.observed_at_tick(observed_at)));
            }
            _ => ticks.push(Tick {
                observed_at: fetched_at,
                pages: BTreeSet::from([page]),
                offers,
            }),
        }
    }
    ticks
}

/// Group offer records into per-market snapshots, one per collection tick,
/// oldest first.
///
/// Records of markets absent from the configuration are dropped.
pub fn build_snapshots(
    config: &AppConfig,
    records: Vec<OfferRecord>,
) -> BTreeMap<String, Vec<OfferSnapshot>> {
    let window = Duration::seconds(config.app.tick_window_secs);
    let mut grouped: BTreeMap<String, BTreeMap<(DateTime<Utc>, u32), Vec<Offer>>> =
        BTreeMap::new();
    let mut unknown = BTreeSet::new();

    for record in records {
        if config.market(&record.market).is_none() {
            unknown.insert(record.market);
            continue;
        }
        grouped
            .entry(record.market)
            .or_default()
            .entry((record.offer.observed_at(), record.page))
            .or_default()
            .push(record.offer);
    }

    for market in &unknown {
        warn!(market = %market, "Ignoring offers of unconfigured market");
    }

    grouped
        .into_iter()
        .filter_map(|(name, pages)| {
            let key = config.market(&name)?.key();
            let snapshots: Vec<OfferSnapshot> = group_ticks(pages, window)
                .into_iter()
                .map(|tick| OfferSnapshot::new(key.clone(), tick.observed_at, tick.offers))
                .collect();
            debug!(market = %name, snapshots = snapshots.len(), "Grouped collection ticks");
            Some((name, snapshots))
        })
        .collect()
}

/// One intent evaluated on a market's snapshots.
#[derive(Debug, Clone)]
struct MarketIntent {
    name: String,
    intent: TradeIntent,
    strategy: LegStrategy,
}

/// Run every intent of one market over its snapshots.
///
/// Each intent keeps its own identity history, since its filter decides
/// which advertisers can make the top-N.
fn analyze_market(
    market: &str,
    key: &MarketKey,
    snapshots: &[OfferSnapshot],
    intents: &[MarketIntent],
    params: &LiquidityParams,
    history_len: usize,
) -> AppResult<Vec<MetricRecord>> {
    let mut histories: Vec<IdentityHistory> = intents
        .iter()
        .map(|_| IdentityHistory::new(history_len))
        .collect();
    let mut records = Vec::with_capacity(snapshots.len() * intents.len() * 2);

    for snapshot in snapshots {
        Metrics::snapshot_analyzed(market);

        for (mi, history) in intents.iter().zip(histories.iter_mut()) {
            let result = evaluate(&snapshot.offers, &mi.intent, mi.strategy);
            Metrics::execution(&mi.name, mi.strategy.as_str(), result.outcome_label());
            if let Some(price) = result.achieved_price.and_then(|p| p.inner().to_f64()) {
                Metrics::achieved_price(&mi.name, mi.strategy.as_str(), price);
            }

            let filtered = filter(&snapshot.offers, &mi.intent);
            let best_price = filtered.first().map(|o| o.unit_price());
            let liquidity = analyze(
                &filtered,
                best_price,
                history.window(),
                params,
                snapshot.observed_at,
            )?;
            history.push(liquidity.identities.clone())?;

            if let Some(share) = liquidity.near_best_liquidity_pct.value().and_then(|v| v.to_f64()) {
                Metrics::near_best_share(&mi.name, share);
            }
            if let Some(stability) = liquidity.top_stability.value().and_then(|v| v.to_f64()) {
                Metrics::top_stability(&mi.name, stability);
            }

            records.push(MetricRecord {
                observed_at: snapshot.observed_at,
                market: market.to_string(),
                name: mi.name.clone(),
                payload: MetricPayload::Execution {
                    strategy: mi.strategy,
                    result,
                },
            });
            records.push(MetricRecord {
                observed_at: snapshot.observed_at,
                market: market.to_string(),
                name: mi.name.clone(),
                payload: MetricPayload::Liquidity {
                    snapshot: liquidity,
                },
            });
        }
    }

    debug!(
        market,
        key = %key,
        snapshots = snapshots.len(),
        intents = intents.len(),
        records = records.len(),
        "Analyzed market"
    );
    Ok(records)
}

/// Snapshot of `candidates` closest in time to `at`, within `max_skew`.
///
/// `candidates` must be sorted by time; ties go to the earlier snapshot.
pub fn nearest_snapshot<'a>(
    candidates: &'a [OfferSnapshot],
    at: DateTime<Utc>,
    max_skew: Duration,
) -> Option<&'a OfferSnapshot> {
    let idx = candidates.partition_point(|s| s.observed_at < at);
    let before = idx.checked_sub(1).and_then(|i| candidates.get(i));
    let after = candidates.get(idx);

    let best = match (before, after) {
        (Some(b), Some(a)) => {
            if at - b.observed_at <= a.observed_at - at {
                b
            } else {
                a
            }
        }
        (Some(b), None) => b,
        (None, Some(a)) => a,
        (None, None) => return None,
    };

    let gap = if best.observed_at >= at {
        best.observed_at - at
    } else {
        at - best.observed_at
    };
    (gap <= max_skew).then_some(best)
}

fn intents_by_market(
    config: &AppConfig,
    intents: &BTreeMap<String, TradeIntent>,
) -> BTreeMap<String, Vec<MarketIntent>> {
    let mut by_market: BTreeMap<String, Vec<MarketIntent>> = BTreeMap::new();
    for cfg in &config.intents {
        if let Some(intent) = intents.get(&cfg.name) {
            by_market
                .entry(cfg.market.clone())
                .or_default()
                .push(MarketIntent {
                    name: cfg.name.clone(),
                    intent: intent.clone(),
                    strategy: cfg.strategy,
                });
        }
    }
    by_market
}

/// Evaluate every combo, pairing each buy-leg snapshot with the nearest
/// sell-leg snapshot.
fn analyze_combos(
    config: &AppConfig,
    intents: &BTreeMap<String, TradeIntent>,
    snapshots: &BTreeMap<String, Arc<Vec<OfferSnapshot>>>,
    summary: &mut AnalyzeSummary,
) -> AppResult<Vec<MetricRecord>> {
    let mut records = Vec::new();

    for combo in &config.combos {
        let (Some(buy_cfg), Some(sell_cfg), Some(buy_intent), Some(sell_intent)) = (
            config.intent(&combo.buy_intent),
            config.intent(&combo.sell_intent),
            intents.get(&combo.buy_intent),
            intents.get(&combo.sell_intent),
        ) else {
            return Err(AppError::Config(format!(
                "combo {} references unknown intents",
                combo.name
            )));
        };
        let (Some(buy_snaps), Some(sell_snaps)) = (
            snapshots.get(&buy_cfg.market),
            snapshots.get(&sell_cfg.market),
        ) else {
            warn!(combo = %combo.name, "No data for one of the combo legs");
            continue;
        };

        let max_skew = Duration::seconds(combo.max_skew_secs);
        for buy in buy_snaps.iter() {
            let Some(sell) = nearest_snapshot(sell_snaps, buy.observed_at, max_skew) else {
                debug!(combo = %combo.name, at = %buy.observed_at, "No sell snapshot within skew");
                summary.unpaired_combo_snapshots += 1;
                continue;
            };

            let outcome = evaluate_combo(
                buy_intent,
                sell_intent,
                &buy.offers,
                &sell.offers,
                combo.strategy,
                combo.mode,
            )?;
            Metrics::combo(&combo.name, outcome.label());

            records.push(MetricRecord {
                observed_at: buy.observed_at,
                market: buy_cfg.market.clone(),
                name: combo.name.clone(),
                payload: MetricPayload::Combo { outcome },
            });
        }
    }

    Ok(records)
}

/// Analyze `processed/offers_{day}.jsonl` into `metrics/metrics_{day}.jsonl`.
pub async fn analyze_day(config: Arc<AppConfig>, day: &str) -> AppResult<AnalyzeSummary> {
    let data_dir = config.app.data_dir.clone();
    let offers_path = processed_dir(&data_dir).join(format!("offers_{day}.jsonl"));
    let intents = config.build_intents()?;

    let records: Vec<OfferRecord> = read_jsonl(&offers_path)?;
    info!(path = %offers_path.display(), offers = records.len(), "Loaded processed offers");

    let snapshots: BTreeMap<String, Arc<Vec<OfferSnapshot>>> = build_snapshots(&config, records)
        .into_iter()
        .map(|(name, snaps)| (name, Arc::new(snaps)))
        .collect();

    let mut summary = AnalyzeSummary {
        snapshots: snapshots.values().map(|s| s.len()).sum(),
        ..Default::default()
    };

    let params = config.liquidity.params();
    let history_len = config.liquidity.history_len;
    let mut tasks = JoinSet::new();

    for (market, market_intents) in intents_by_market(&config, &intents) {
        let (Some(snaps), Some(market_cfg)) = (snapshots.get(&market), config.market(&market))
        else {
            debug!(market = %market, "No snapshots for market");
            continue;
        };
        let snaps = Arc::clone(snaps);
        let key = market_cfg.key();
        let params = params.clone();

        tasks.spawn_blocking(move || {
            let records =
                analyze_market(&market, &key, &snaps, &market_intents, &params, history_len);
            (market, records)
        });
    }

    let mut per_market: BTreeMap<String, Vec<MetricRecord>> = BTreeMap::new();
    while let Some(joined) = tasks.join_next().await {
        let (market, records) = joined?;
        per_market.insert(market, records?);
    }

    let combo_records = analyze_combos(&config, &intents, &snapshots, &mut summary)?;

    let mut metric_records: Vec<MetricRecord> = per_market.into_values().flatten().collect();
    for record in &metric_records {
        match record.payload {
            MetricPayload::Execution { .. } => summary.executions += 1,
            MetricPayload::Liquidity { .. } => summary.liquidity += 1,
            MetricPayload::Combo { .. } => {}
        }
    }
    summary.combos = combo_records.len();
    metric_records.extend(combo_records);
    metric_records.sort_by_key(|r| r.observed_at);

    let (mut writer, output) = fresh_writer::<MetricRecord>(metrics_dir(&data_dir), "metrics", day)?;
    for record in metric_records {
        writer.add_record(record)?;
    }
    writer.close()?;
    summary.output = output;

    info!(
        day,
        snapshots = summary.snapshots,
        executions = summary.executions,
        liquidity = summary.liquidity,
        combos = summary.combos,
        unpaired = summary.unpaired_combo_snapshots,
        output = %summary.output.display(),
        "Analyzed day"
    );
    Ok(summary)
}
