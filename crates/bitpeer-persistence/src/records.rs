//! Persisted record shapes.

use crate::writer::Timestamped;
use bitpeer_core::{ExecutionResult, Offer};
use bitpeer_liquidity::LiquiditySnapshot;
use bitpeer_pricing::{ComboOutcome, LegStrategy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One normalized offer, tagged with the configured market name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferRecord {
    pub market: String,
    pub page: u32,
    pub offer: Offer,
}

impl Timestamped for OfferRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.offer.observed_at()
    }
}

/// Computed result for one market (or combo) at one snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub observed_at: DateTime<Utc>,
    /// Market name; for combos, the buy leg's market.
    pub market: String,
    /// Intent or combo name.
    pub name: String,
    pub payload: MetricPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricPayload {
    Execution {
        strategy: LegStrategy,
        result: ExecutionResult,
    },
    Liquidity {
        snapshot: LiquiditySnapshot,
    },
    Combo {
        outcome: ComboOutcome,
    },
}

impl MetricPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Execution { .. } => "execution",
            Self::Liquidity { .. } => "liquidity",
            Self::Combo { .. } => "combo",
        }
    }
}

impl Timestamped for MetricRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.observed_at
    }
}
