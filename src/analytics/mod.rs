//! Analytics core
//!
//! Deterministic transformations from position and market tables to derived
//! metric tables. Nothing here touches the filesystem or the database.

pub mod allocation;
pub mod benchmark;
pub mod drawdown;
pub mod exposure;
pub mod funds;
pub mod futures;
pub mod holdings;
pub mod outliers;
pub mod performance;
pub mod sectors;

use rust_decimal::Decimal;

pub use allocation::{allocation, AllocationReport, AllocationRow, ComparisonTable, SectorLookthrough};
pub use benchmark::{combine, Basket, Constituent};
pub use exposure::{hedge_exposure, position_exposure, HedgeReport};
pub use holdings::{enrich_stock_positions, positions_vs_sector, Holding, InstrumentQuote};
pub use outliers::{screen, QuantileTable, ThresholdSelector};
pub use performance::{Metrics, MetricTable, Performance, PriceSeries, RelativeMetrics, Universe, Window};

/// Percentage change from `from` to `to`; None when `from` is zero.
pub fn pct_change(from: Decimal, to: Decimal) -> Option<Decimal> {
    if from.is_zero() {
        None
    } else {
        Some((to - from) / from * Decimal::ONE_HUNDRED)
    }
}
