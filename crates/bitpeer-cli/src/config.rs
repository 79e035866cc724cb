//! Application configuration.
//!
//! Every threshold here is turned into an explicit argument for the pricing
//! and liquidity crates; nothing is read from global state at compute time.

use crate::error::{AppError, AppResult};
use bitpeer_core::{MarketKey, OfferSide, PaymentMethod, TargetAmount, TradeDirection, TradeIntent};
use bitpeer_liquidity::LiquidityParams;
use bitpeer_pricing::{ComboMode, LegStrategy, PricingConfig};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

pub const CONFIG_ENV: &str = "BITPEER_CONFIG";
pub const DATA_DIR_ENV: &str = "BITPEER_DATA_DIR";
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSection {
    /// Root of raw, processed and metrics data.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Collector's local timezone. Informational; all stored days are UTC.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Pages of one market fetched within this many seconds of the tick's
    /// first page belong to the same snapshot.
    #[serde(default = "default_tick_window_secs")]
    pub tick_window_secs: i64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_tick_window_secs() -> i64 {
    20
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            timezone: default_timezone(),
            tick_window_secs: default_tick_window_secs(),
        }
    }
}

/// Liquidity analyzer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityConfig {
    /// X: near-best band in percent of the best price.
    #[serde(default = "default_near_best_pct")]
    pub near_best_pct: Decimal,
    /// N: top identity set size.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Identity sets kept per intent for stability and half-life.
    #[serde(default = "default_history_len")]
    pub history_len: usize,
}

fn default_near_best_pct() -> Decimal {
    Decimal::new(5, 1) // 0.5%
}

fn default_top_n() -> usize {
    10
}

fn default_history_len() -> usize {
    120 // one hour at a 30s collection interval
}

impl Default for LiquidityConfig {
    fn default() -> Self {
        Self {
            near_best_pct: default_near_best_pct(),
            top_n: default_top_n(),
            history_len: default_history_len(),
        }
    }
}

impl LiquidityConfig {
    pub fn params(&self) -> LiquidityParams {
        LiquidityParams {
            near_best_pct: self.near_best_pct,
            top_n: self.top_n,
        }
    }
}

/// One order-book side the collector fetches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketConfig {
    /// Name used in raw records (e.g. "rub_sell").
    pub name: String,
    #[serde(default = "default_asset")]
    pub asset: String,
    pub fiat: String,
    /// Advertiser side listed in this market.
    pub side: OfferSide,
}

fn default_asset() -> String {
    "USDT".to_string()
}

impl MarketConfig {
    pub fn key(&self) -> MarketKey {
        MarketKey::new(&self.asset, &self.fiat, self.side)
    }
}

/// A trade intent evaluated on every snapshot of its market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentConfig {
    pub name: String,
    pub market: String,
    pub direction: TradeDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_fiat: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_asset: Option<Decimal>,
    /// Empty means any.
    #[serde(default)]
    pub payment_methods: Vec<String>,
    #[serde(default)]
    pub merchant_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<Decimal>,
    /// Overrides `[pricing].max_splits`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_splits: Option<u32>,
    /// Overrides `[pricing].min_chunk_fiat`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_chunk_fiat: Option<Decimal>,
    /// Overrides `[pricing].overfill_tolerance_fiat`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overfill_tolerance_fiat: Option<Decimal>,
    #[serde(default)]
    pub strategy: LegStrategy,
}

impl IntentConfig {
    pub fn target(&self) -> AppResult<TargetAmount> {
        match (self.amount_fiat, self.amount_asset) {
            (Some(fiat), None) => Ok(TargetAmount::Fiat(fiat)),
            (None, Some(asset)) => Ok(TargetAmount::Asset(asset)),
            _ => Err(AppError::Config(format!(
                "intent {}: set exactly one of amount_fiat / amount_asset",
                self.name
            ))),
        }
    }

    /// Build the validated intent, filling gaps from `defaults`.
    pub fn to_intent(&self, defaults: &PricingConfig) -> AppResult<TradeIntent> {
        let intent = TradeIntent::new(
            self.direction,
            self.target()?,
            self.max_splits.unwrap_or(defaults.max_splits),
            self.min_chunk_fiat.unwrap_or(defaults.min_chunk_fiat),
        )?
        .with_overfill_tolerance(
            self.overfill_tolerance_fiat
                .unwrap_or(defaults.overfill_tolerance_fiat),
        )?
        .with_payment_methods(self.payment_methods.iter().filter_map(|m| PaymentMethod::parse(m)))
        .with_merchant_only(self.merchant_only)
        .with_min_rating(self.min_rating);

        Ok(intent)
    }
}

/// A buy leg and a sell leg chained into one cross rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComboConfig {
    pub name: String,
    pub buy_intent: String,
    pub sell_intent: String,
    #[serde(default)]
    pub strategy: LegStrategy,
    #[serde(default)]
    pub mode: ComboMode,
    /// Largest time gap between paired leg snapshots.
    #[serde(default = "default_max_skew_secs")]
    pub max_skew_secs: i64,
}

fn default_max_skew_secs() -> i64 {
    60
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub liquidity: LiquidityConfig,
    #[serde(default)]
    pub markets: Vec<MarketConfig>,
    #[serde(default)]
    pub intents: Vec<IntentConfig>,
    #[serde(default)]
    pub combos: Vec<ComboConfig>,
}

impl AppConfig {
    /// Config path: CLI arg > `BITPEER_CONFIG` env var > default.
    pub fn resolve_path(cli: Option<String>) -> String {
        cli.or_else(|| std::env::var(CONFIG_ENV).ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
    }

    /// Load from a specific file and apply environment overrides.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config {path}: {e}")))?;

        let mut config = Self::from_toml(&content)?;
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            config.app.data_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    pub fn to_toml(&self) -> AppResult<String> {
        toml::to_string(self).map_err(|e| AppError::Config(format!("Failed to render config: {e}")))
    }

    pub fn market(&self, name: &str) -> Option<&MarketConfig> {
        self.markets.iter().find(|m| m.name == name)
    }

    pub fn intent(&self, name: &str) -> Option<&IntentConfig> {
        self.intents.iter().find(|i| i.name == name)
    }

    /// Validated intents keyed by name.
    pub fn build_intents(&self) -> AppResult<BTreeMap<String, TradeIntent>> {
        self.intents
            .iter()
            .map(|cfg| Ok((cfg.name.clone(), cfg.to_intent(&self.pricing)?)))
            .collect()
    }

    /// Reject inconsistent configuration before any work starts.
    pub fn validate(&self) -> AppResult<()> {
        self.pricing.validate().map_err(AppError::Config)?;
        self.liquidity
            .params()
            .validate()
            .map_err(|e| AppError::Config(e.to_string()))?;
        if self.liquidity.history_len == 0 {
            return Err(AppError::Config("history_len must be at least 1".to_string()));
        }
        if self.app.tick_window_secs <= 0 {
            return Err(AppError::Config(format!(
                "tick_window_secs must be positive, got {}",
                self.app.tick_window_secs
            )));
        }

        unique_names("market", self.markets.iter().map(|m| m.name.as_str()))?;
        unique_names("intent", self.intents.iter().map(|i| i.name.as_str()))?;
        unique_names("combo", self.combos.iter().map(|c| c.name.as_str()))?;

        for intent in &self.intents {
            let market = self.market(&intent.market).ok_or_else(|| {
                AppError::Config(format!(
                    "intent {} references unknown market {}",
                    intent.name, intent.market
                ))
            })?;
            if intent.direction.counterparty_side() != market.side {
                return Err(AppError::Config(format!(
                    "intent {} ({}) cannot execute against {} offers of market {}",
                    intent.name, intent.direction, market.side, market.name
                )));
            }
            intent.to_intent(&self.pricing)?;
        }

        for combo in &self.combos {
            let leg = |name: &str, direction: TradeDirection| -> AppResult<()> {
                let intent = self.intent(name).ok_or_else(|| {
                    AppError::Config(format!(
                        "combo {} references unknown intent {}",
                        combo.name, name
                    ))
                })?;
                if intent.direction != direction {
                    return Err(AppError::Config(format!(
                        "combo {}: intent {} must be {}",
                        combo.name, name, direction
                    )));
                }
                Ok(())
            };
            leg(&combo.buy_intent, TradeDirection::BuyAsset)?;
            leg(&combo.sell_intent, TradeDirection::SellAsset)?;
            if combo.max_skew_secs < 0 {
                return Err(AppError::Config(format!(
                    "combo {}: max_skew_secs must be non-negative",
                    combo.name
                )));
            }
        }

        Ok(())
    }
}

fn unique_names<'a>(kind: &str, names: impl Iterator<Item = &'a str>) -> AppResult<()> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(AppError::Config(format!("duplicate {kind} name: {name}")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SAMPLE: &str = r#"
[app]
data_dir = "data"
timezone = "Asia/Ho_Chi_Minh"

[pricing]
max_splits = 3
min_chunk_fiat = "500"

[liquidity]
near_best_pct = "0.5"
top_n = 5

[[markets]]
name = "rub_sell"
fiat = "RUB"
side = "sell"

[[markets]]
name = "vnd_buy"
fiat = "VND"
side = "buy"

[[intents]]
name = "buy_rub"
market = "rub_sell"
direction = "buy_asset"
amount_fiat = "50000"
payment_methods = ["SBP"]
min_rating = "0"

[[intents]]
name = "sell_vnd"
market = "vnd_buy"
direction = "sell_asset"
amount_asset = "500"
min_chunk_fiat = "100000"
strategy = "single"

[[combos]]
name = "rub_to_vnd"
buy_intent = "buy_rub"
sell_intent = "sell_vnd"
mode = "relaxed"
"#;

    #[test]
    fn test_parse_sample() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();

        assert_eq!(config.app.timezone, "Asia/Ho_Chi_Minh");
        assert_eq!(config.app.tick_window_secs, 20);
        assert_eq!(config.pricing.min_chunk_fiat, dec!(500));
        assert_eq!(config.pricing.overfill_tolerance_fiat, dec!(0));
        assert_eq!(config.liquidity.top_n, 5);
        assert_eq!(config.liquidity.history_len, 120);
        assert_eq!(config.markets[0].asset, "USDT");
        assert_eq!(config.markets[1].key().to_string(), "USDT/VND:buy");
        assert_eq!(config.intents[1].strategy, LegStrategy::Single);
        assert_eq!(config.combos[0].mode, ComboMode::Relaxed);
        assert_eq!(config.combos[0].strategy, LegStrategy::Split);
        config.validate().unwrap();
    }

    #[test]
    fn test_intent_defaults_and_overrides() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();
        let intents = config.build_intents().unwrap();

        let buy = &intents["buy_rub"];
        assert_eq!(buy.max_splits(), 3);
        assert_eq!(buy.min_chunk_fiat(), dec!(500));
        assert_eq!(buy.min_rating(), None);
        assert_eq!(buy.accepted_payment_methods().len(), 1);

        let sell = &intents["sell_vnd"];
        assert_eq!(sell.min_chunk_fiat(), dec!(100000));
        assert_eq!(sell.target(), TargetAmount::Asset(dec!(500)));
    }

    #[test]
    fn test_validate_rejects_side_mismatch() {
        let mut config = AppConfig::from_toml(SAMPLE).unwrap();
        config.intents[0].market = "vnd_buy".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cannot execute"));
    }

    #[test]
    fn test_validate_rejects_unknown_references() {
        let mut config = AppConfig::from_toml(SAMPLE).unwrap();
        config.combos[0].sell_intent = "missing".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::from_toml(SAMPLE).unwrap();
        config.intents[0].market = "missing".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_swapped_combo_legs() {
        let mut config = AppConfig::from_toml(SAMPLE).unwrap();
        config.combos[0].buy_intent = "sell_vnd".to_string();
        config.combos[0].sell_intent = "buy_rub".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_tick_window() {
        let mut config = AppConfig::from_toml(SAMPLE).unwrap();
        config.app.tick_window_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_ambiguous_amount() {
        let mut config = AppConfig::from_toml(SAMPLE).unwrap();
        config.intents[0].amount_asset = Some(dec!(10));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_shipped_default_config_is_valid() {
        let config = AppConfig::from_toml(include_str!("../../../config/default.toml")).unwrap();
        config.validate().unwrap();
        assert_eq!(config.build_intents().unwrap().len(), config.intents.len());
    }

    #[test]
    fn test_toml_round_trip_for_doctor() {
        let config = AppConfig::from_toml(SAMPLE).unwrap();
        let rendered = config.to_toml().unwrap();
        let back = AppConfig::from_toml(&rendered).unwrap();

        assert_eq!(back.intents.len(), 2);
        assert_eq!(back.intents[0].amount_fiat, Some(dec!(50000)));
        assert!(back.intents[0].amount_asset.is_none());
    }
}
