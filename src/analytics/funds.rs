//! Third-party funds and certificates.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

use super::holdings::InstrumentQuote;
use super::pct_change;
use super::performance::Metrics;
use crate::db::Position;

/// One fund line of one account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundHolding {
    pub account_name: String,
    pub name: String,
    pub query: Option<String>,
    pub aeq: Decimal,
    pub volume: Decimal,
    pub last_price: Decimal,
    pub since_aeq: Option<Decimal>,
    pub metrics: Metrics,
}

/// Left join of fund/certificate positions with vendor quotes on query key.
/// AEQ is converted with the last FX rate.
pub fn fund_holdings(positions: &[Position], quotes: &[InstrumentQuote]) -> Vec<FundHolding> {
    let by_query: HashMap<&str, &InstrumentQuote> = quotes
        .iter()
        .filter_map(|q| q.query.as_deref().map(|query| (query, q)))
        .collect();

    positions
        .iter()
        .filter(|p| p.is_fund())
        .map(|p| {
            let quote = p
                .bloomberg_query
                .as_deref()
                .and_then(|query| by_query.get(query))
                .copied();
            if quote.is_none() {
                warn!("No vendor quote for fund '{}' ({:?})", p.name, p.bloomberg_query);
            }

            let aeq = p.average_entry_quote * p.last_xrate;
            let last_price = quote.map(|q| q.last_price).unwrap_or_default();
            FundHolding {
                account_name: p.account_name.clone(),
                name: p.name.clone(),
                query: p.bloomberg_query.clone(),
                aeq,
                volume: p.volume,
                last_price,
                since_aeq: quote.and_then(|_| pct_change(aeq, last_price)),
                metrics: quote.map(|q| q.metrics).unwrap_or_default(),
            }
        })
        .collect()
}

/// Fund aggregated over every account holding it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundSummary {
    pub name: String,
    pub metrics: Metrics,
    pub last_price: Decimal,
    pub aeq: Decimal,
    pub since_aeq: Option<Decimal>,
}

fn mean(values: impl Iterator<Item = Decimal>) -> Option<Decimal> {
    let (sum, count) = values.fold((Decimal::ZERO, 0u32), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / Decimal::from(count))
}

/// Group by fund name: first metrics and last price, mean AEQ and mean
/// % since AEQ. Sorted by % since AEQ descending; funds without one go last.
pub fn group_funds(holdings: &[FundHolding]) -> Vec<FundSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&FundHolding>> = HashMap::new();
    for holding in holdings {
        let group = groups.entry(holding.name.as_str()).or_default();
        if group.is_empty() {
            order.push(holding.name.as_str());
        }
        group.push(holding);
    }

    let mut summaries: Vec<FundSummary> = order
        .into_iter()
        .filter_map(|name| {
            let group = groups.get(name)?;
            let first = group.first()?;
            Some(FundSummary {
                name: name.to_string(),
                metrics: first.metrics,
                last_price: first.last_price,
                aeq: mean(group.iter().map(|h| h.aeq)).unwrap_or_default(),
                since_aeq: mean(group.iter().filter_map(|h| h.since_aeq)),
            })
        })
        .collect();

    summaries.sort_by(|a, b| match (a.since_aeq, b.since_aeq) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    summaries
}
