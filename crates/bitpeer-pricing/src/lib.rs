//! Execution-feasibility and pricing engine.
//!
//! Given one snapshot of competing offers, answers "what price could a
//! trader actually get?" under real constraints: per-offer min/max size, a
//! cap on the number of offers combined, and no unusable slivers.
//!
//! Pipeline per trade intent:
//! `filter` → (`select_best` | `allocate`) → optional `evaluate_combo`.
//!
//! Everything here is a pure function of its arguments. No I/O, no clock,
//! no shared state; callers may evaluate markets in parallel freely.

pub mod allocator;
pub mod combo;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod history;
pub mod selector;

pub use allocator::allocate;
pub use combo::{evaluate_combo, ComboInfeasible, ComboLeg, ComboOutcome, ComboResult, InfeasibleReason};
pub use config::{ComboMode, LegStrategy, PricingConfig};
pub use engine::evaluate;
pub use error::{PricingError, PricingResult};
pub use filter::filter;
pub use history::{best_price_history, PricePoint};
pub use selector::select_best;

#[cfg(test)]
pub(crate) mod testing;
