//! Drawdown / drawup tracking over a price series.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::performance::PriceSeries;

/// State of the tracker after one observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DrawdownPoint {
    pub date: NaiveDate,
    pub price: Decimal,
    /// Running maximum
    pub peak: Decimal,
    /// Running minimum
    pub trough: Decimal,
    /// (price - peak) / peak, always <= 0
    pub drawdown: Decimal,
    /// (price - trough) / trough, always >= 0
    pub drawup: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DrawdownSummary {
    pub current_drawdown: Decimal,
    pub current_drawup: Decimal,
    pub max_drawdown: Decimal,
    pub max_drawup: Decimal,
    pub peak: Decimal,
    pub trough: Decimal,
}

fn deviation(price: Decimal, reference: Decimal) -> Decimal {
    if reference.is_zero() {
        Decimal::ZERO
    } else {
        (price - reference) / reference
    }
}

/// Single pass over the series; a new extreme resets the reference implicitly.
pub fn track(points: &[(NaiveDate, Decimal)]) -> Vec<DrawdownPoint> {
    let mut out = Vec::with_capacity(points.len());
    let mut extremes: Option<(Decimal, Decimal)> = None;

    for &(date, price) in points {
        let (peak, trough) = match extremes {
            Some((peak, trough)) => (peak.max(price), trough.min(price)),
            None => (price, price),
        };
        extremes = Some((peak, trough));

        out.push(DrawdownPoint {
            date,
            price,
            peak,
            trough,
            drawdown: deviation(price, peak).min(Decimal::ZERO),
            drawup: deviation(price, trough).max(Decimal::ZERO),
        });
    }

    out
}

pub fn track_series(series: &PriceSeries) -> Vec<DrawdownPoint> {
    track(series.points())
}

/// Current and extreme values of a tracked series; None when empty.
pub fn summarize(points: &[DrawdownPoint]) -> Option<DrawdownSummary> {
    let last = points.last()?;
    Some(DrawdownSummary {
        current_drawdown: last.drawdown,
        current_drawup: last.drawup,
        max_drawdown: points.iter().map(|p| p.drawdown).min().unwrap_or_default(),
        max_drawup: points.iter().map(|p| p.drawup).max().unwrap_or_default(),
        peak: last.peak,
        trough: last.trough,
    })
}
