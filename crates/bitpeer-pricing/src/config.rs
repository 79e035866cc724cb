//! Pricing configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Defaults applied to intents that do not set their own limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Maximum number of offers combined by the split allocator.
    #[serde(default = "default_max_splits")]
    pub max_splits: u32,
    /// Minimum fiat amount a non-final contribution must cover.
    #[serde(default = "default_min_chunk_fiat")]
    pub min_chunk_fiat: Decimal,
    /// How far the allocator may overshoot the target to satisfy an offer
    /// minimum instead of leaving the residual unfilled. 0 disables overfill.
    #[serde(default)]
    pub overfill_tolerance_fiat: Decimal,
}

fn default_max_splits() -> u32 {
    3
}

fn default_min_chunk_fiat() -> Decimal {
    Decimal::from(500)
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            max_splits: default_max_splits(),
            min_chunk_fiat: default_min_chunk_fiat(),
            overfill_tolerance_fiat: Decimal::ZERO,
        }
    }
}

impl PricingConfig {
    /// Validate configuration values.
    ///
    /// Returns Err if:
    /// - max_splits == 0
    /// - min_chunk_fiat <= 0
    /// - overfill_tolerance_fiat < 0
    pub fn validate(&self) -> Result<(), String> {
        if self.max_splits == 0 {
            return Err("max_splits must be at least 1".to_string());
        }

        if self.min_chunk_fiat <= Decimal::ZERO {
            return Err(format!(
                "min_chunk_fiat ({}) must be positive",
                self.min_chunk_fiat
            ));
        }

        if self.overfill_tolerance_fiat.is_sign_negative() {
            return Err(format!(
                "overfill_tolerance_fiat ({}) must be non-negative",
                self.overfill_tolerance_fiat
            ));
        }

        Ok(())
    }
}

/// How one leg of an intent is priced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegStrategy {
    /// Greedy multi-offer VWAP fill.
    #[default]
    Split,
    /// Best single offer covering the whole amount.
    Single,
}

impl LegStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Split => "split",
            Self::Single => "single",
        }
    }
}

impl fmt::Display for LegStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When a combo rate may be reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComboMode {
    /// Both legs must be fully executable.
    #[default]
    Strict,
    /// Both legs must fill the same non-zero fraction of their targets.
    Relaxed,
}
