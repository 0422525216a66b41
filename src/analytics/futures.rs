//! Futures positions overview.

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::debug;

use super::exposure::exposure_of;
use super::performance::PriceSeries;
use crate::config::Config;
use crate::db::{Position, PositionType};
use crate::error::BriefingError;

/// % change since average entry quote, signed by direction.
///
/// LONG: (last - aeq) / aeq × 100, SHORT: (aeq - last) / aeq × 100.
pub fn since_entry(direction: PositionType, aeq: Decimal, last: Decimal) -> Result<Decimal> {
    if aeq.is_zero() {
        return Err(BriefingError::InsufficientData("average entry quote is zero".to_string()).into());
    }
    Ok((last - aeq) / aeq * Decimal::ONE_HUNDRED * direction.sign())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FutureOverview {
    pub account_name: String,
    pub name: String,
    pub underlying: String,
    pub aeq: Decimal,
    pub since_aeq: Decimal,
    pub volume: Decimal,
    pub position_type: PositionType,
    pub last_price: Decimal,
    /// (last - aeq) × price per point × volume × fx, sign flipped for shorts
    pub pnl: Decimal,
    /// % of NAV
    pub exposure: Decimal,
}

/// Overview row for every equity future.
///
/// Underlying names resolve through the configured alias table before the
/// price-series lookup; an unresolved name aborts.
pub fn futures_overview(
    positions: &[Position],
    prices: &HashMap<String, PriceSeries>,
    config: &Config,
) -> Result<Vec<FutureOverview>> {
    positions
        .iter()
        .filter(|p| p.is_equity_future())
        .map(|p| {
            let underlying = p.underlying_name.as_deref().unwrap_or_default();
            let series_name = config.resolve_underlying(underlying);
            if series_name != underlying {
                debug!("Underlying '{}' resolved to series '{}'", underlying, series_name);
            }

            let (_, last_price) = prices
                .get(series_name)
                .and_then(PriceSeries::last)
                .ok_or_else(|| BriefingError::missing("underlying price series", series_name))?;

            let position_type = PositionType::from_str(p.position_type.as_deref().unwrap_or_default())?;
            let aeq = p.average_entry_quote;

            Ok(FutureOverview {
                account_name: p.account_name.clone(),
                name: p.name.clone(),
                underlying: series_name.to_string(),
                aeq,
                since_aeq: since_entry(position_type, aeq, last_price)?,
                volume: p.volume,
                position_type,
                last_price,
                pnl: (last_price - aeq) * p.price_per_point * p.volume * p.last_xrate * position_type.sign(),
                exposure: exposure_of(p)?,
            })
        })
        .collect()
}
