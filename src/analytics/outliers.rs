//! Quantile outlier screen.
//!
//! Thresholds come from a whole universe (S&P 500 or STOXX Europe 600); a
//! holding is an outlier only when its absolute and its vs-sector performance
//! breach in the same direction, so a sector-wide move alone never flags it.

use anyhow::Result;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::performance::{Performance, Universe, Window};
use crate::error::BriefingError;

/// Quantile with linear interpolation between order statistics.
///
/// Position is `q * (n - 1)` over the sorted values. Returns None for an
/// empty slice.
pub fn quantile(values: &[Decimal], q: Decimal) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort();

    let pos = q * Decimal::from(sorted.len() - 1);
    let lower = pos.floor();
    let frac = pos - lower;
    let lo = lower.to_usize()?.min(sorted.len() - 1);
    let hi = (lo + 1).min(sorted.len() - 1);

    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Round to the nearest 0.5; exact midpoints go to the even half step.
pub fn round_half(value: Decimal) -> Decimal {
    let two = Decimal::TWO;
    (value * two).round() / two
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Threshold {
    pub lower: Decimal,
    pub upper: Decimal,
}

/// Lower/upper thresholds for the four absolute windows and their vs-sector deltas
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantileTable {
    pub absolute: [Threshold; 4],
    pub relative: [Threshold; 4],
}

impl QuantileTable {
    /// Compute the table over a universe, each threshold rounded to 0.5.
    pub fn from_rows<T: Performance>(rows: &[T], low: Decimal, high: Decimal) -> Result<Self> {
        if rows.is_empty() {
            return Err(BriefingError::InsufficientData(
                "cannot compute quantiles of an empty universe".to_string(),
            )
            .into());
        }

        let threshold = |values: Vec<Decimal>| -> Threshold {
            Threshold {
                lower: quantile(&values, low).map(round_half).unwrap_or_default(),
                upper: quantile(&values, high).map(round_half).unwrap_or_default(),
            }
        };

        let absolute = Window::ALL.map(|w| threshold(rows.iter().map(|r| r.metrics().window(w)).collect()));
        let relative = Window::ALL.map(|w| threshold(rows.iter().map(|r| r.relative().window(w)).collect()));

        debug!("Quantiles over {} rows: {:?} / {:?}", rows.len(), absolute, relative);
        Ok(Self { absolute, relative })
    }

    /// Labelled thresholds in report order: 1D..YTD, then 1D..YTD vs. Sector
    pub fn labelled(&self) -> Vec<(String, Threshold)> {
        let absolute = Window::ALL
            .iter()
            .zip(self.absolute)
            .map(|(w, t)| (w.label().to_string(), t));
        let relative = Window::ALL
            .iter()
            .zip(self.relative)
            .map(|(w, t)| (format!("{} vs. Sector", w.label()), t));
        absolute.chain(relative).collect()
    }
}

/// How each row picks its thresholds
#[derive(Debug, Clone, Copy)]
pub enum ThresholdSelector<'a> {
    /// One table for every row
    Fixed(&'a QuantileTable),
    /// US table for North American rows, EU table for everything else
    ByRegion {
        us: &'a QuantileTable,
        eu: &'a QuantileTable,
    },
}

impl<'a> ThresholdSelector<'a> {
    fn select<T: Performance>(&self, row: &T) -> &'a QuantileTable {
        match *self {
            ThresholdSelector::Fixed(table) => table,
            ThresholdSelector::ByRegion { us, eu } => {
                match row.region().and_then(Universe::from_region) {
                    Some(Universe::Us) => us,
                    _ => eu,
                }
            }
        }
    }
}

/// Per-row breach flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Breach {
    pub relative_above: bool,
    pub absolute_above: bool,
    pub relative_below: bool,
    pub absolute_below: bool,
    pub entry_loss: bool,
}

impl Breach {
    pub fn is_positive(&self) -> bool {
        self.relative_above && self.absolute_above
    }

    pub fn is_negative(&self) -> bool {
        (self.relative_below && self.absolute_below) || self.entry_loss
    }
}

fn breach_of<T: Performance>(row: &T, table: &QuantileTable, entry_loss: Option<Decimal>) -> Breach {
    let any = |pick: &dyn Fn(Window, usize) -> bool| {
        Window::ALL.iter().enumerate().any(|(i, w)| pick(*w, i))
    };
    let metrics = row.metrics();
    let relative = row.relative();

    Breach {
        relative_above: any(&|w, i| relative.window(w) > table.relative[i].upper),
        absolute_above: any(&|w, i| metrics.window(w) > table.absolute[i].upper),
        relative_below: any(&|w, i| relative.window(w) < table.relative[i].lower),
        absolute_below: any(&|w, i| metrics.window(w) < table.absolute[i].lower),
        entry_loss: match (entry_loss, row.since_entry()) {
            (Some(limit), Some(since)) => since < limit,
            _ => false,
        },
    }
}

/// Evaluate the breach predicate over the whole slice at once.
///
/// `entry_loss` enables the loose negative screen: any row whose % since
/// entry is below it is negative regardless of quantiles.
pub fn breaches<T: Performance>(
    rows: &[T],
    selector: ThresholdSelector<'_>,
    entry_loss: Option<Decimal>,
) -> Vec<Breach> {
    rows.iter()
        .map(|row| breach_of(row, selector.select(row), entry_loss))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outliers<T> {
    pub positive: Vec<T>,
    pub negative: Vec<T>,
}

/// Split rows into positive and negative outliers. A row can be neither.
pub fn screen<T: Performance + Clone>(
    rows: &[T],
    selector: ThresholdSelector<'_>,
    entry_loss: Option<Decimal>,
) -> Outliers<T> {
    let flags = breaches(rows, selector, entry_loss);

    let pick = |keep: fn(&Breach) -> bool| -> Vec<T> {
        rows.iter()
            .zip(&flags)
            .filter(|(_, b)| keep(b))
            .map(|(row, _)| row.clone())
            .collect()
    };

    let outliers = Outliers {
        positive: pick(Breach::is_positive),
        negative: pick(Breach::is_negative),
    };
    debug!(
        "Outlier screen: {} rows, {} positive, {} negative",
        rows.len(),
        outliers.positive.len(),
        outliers.negative.len()
    );
    outliers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::performance::{Metrics, RelativeMetrics};
    use rust_decimal_macros::dec;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        metrics: Metrics,
        relative: RelativeMetrics,
        since: Option<Decimal>,
        region: &'static str,
    }

    impl Performance for Row {
        fn metrics(&self) -> &Metrics {
            &self.metrics
        }
        fn relative(&self) -> &RelativeMetrics {
            &self.relative
        }
        fn since_entry(&self) -> Option<Decimal> {
            self.since
        }
        fn region(&self) -> Option<&str> {
            Some(self.region)
        }
    }

    fn row(d1: Decimal, d1_rel: Decimal) -> Row {
        let mut metrics = Metrics::default();
        metrics.set_window(Window::OneDay, d1);
        let mut relative = RelativeMetrics::default();
        relative.returns[0] = d1_rel;
        Row {
            metrics,
            relative,
            since: None,
            region: "EU",
        }
    }

    fn band(lower: Decimal, upper: Decimal) -> QuantileTable {
        let t = Threshold { lower, upper };
        QuantileTable {
            absolute: [t; 4],
            relative: [t; 4],
        }
    }

    #[test]
    fn test_quantile_interpolates_linearly() {
        let values: Vec<Decimal> = (1..=5).map(Decimal::from).collect();
        assert_eq!(quantile(&values, dec!(0.5)), Some(dec!(3)));
        // pos = 0.95 * 4 = 3.8 -> 4 + 0.8
        assert_eq!(quantile(&values, dec!(0.95)), Some(dec!(4.8)));
        assert_eq!(quantile(&values, dec!(0.05)), Some(dec!(1.2)));
        assert_eq!(quantile(&values, Decimal::ONE), Some(dec!(5)));
        assert_eq!(quantile(&[], dec!(0.5)), None);
    }

    #[test]
    fn test_quantile_of_single_value() {
        assert_eq!(quantile(&[dec!(-2.5)], dec!(0.95)), Some(dec!(-2.5)));
    }

    #[test]
    fn test_round_half_examples() {
        assert_eq!(round_half(dec!(1.24)), dec!(1.0));
        assert_eq!(round_half(dec!(1.26)), dec!(1.5));
        assert_eq!(round_half(dec!(-3.8)), dec!(-4.0));
        assert_eq!(round_half(dec!(0.25)), dec!(0.0));
        assert_eq!(round_half(dec!(0.75)), dec!(1.0));
    }

    #[test]
    fn test_both_breaches_required_for_positive() {
        let table = band(dec!(-2), dec!(2));
        let rows = vec![
            row(dec!(3), dec!(3)),
            row(dec!(3), dec!(1)),
            row(dec!(1), dec!(3)),
        ];

        let out = screen(&rows, ThresholdSelector::Fixed(&table), None);
        assert_eq!(out.positive, vec![rows[0].clone()]);
        assert!(out.negative.is_empty());
    }

    #[test]
    fn test_entry_loss_flags_negative_alone() {
        let table = band(dec!(-2), dec!(2));
        let mut losing = row(dec!(0), dec!(0));
        losing.since = Some(dec!(-6));
        let mut flat = row(dec!(0), dec!(0));
        flat.since = Some(dec!(-4));

        let rows = vec![losing.clone(), flat];
        let out = screen(&rows, ThresholdSelector::Fixed(&table), Some(dec!(-5)));
        assert_eq!(out.negative, vec![losing]);

        let out = screen(&rows, ThresholdSelector::Fixed(&table), None);
        assert!(out.negative.is_empty());
    }

    #[test]
    fn test_region_selects_threshold_table() {
        let us = band(dec!(-10), dec!(10));
        let eu = band(dec!(-1), dec!(1));
        let mut american = row(dec!(5), dec!(5));
        american.region = "NORTH AMERICA";
        let european = row(dec!(5), dec!(5));

        let flags = breaches(
            &[american, european],
            ThresholdSelector::ByRegion { us: &us, eu: &eu },
            None,
        );
        assert!(!flags[0].is_positive());
        assert!(flags[1].is_positive());
    }

    #[test]
    fn test_table_from_rows_rounds_thresholds() {
        let rows: Vec<Row> = (0..=10)
            .map(|i| row(Decimal::from(i) * dec!(0.3), Decimal::from(-i)))
            .collect();
        let table = QuantileTable::from_rows(&rows, dec!(0.05), dec!(0.95)).unwrap();

        // 1D values 0..3: q05 = 0.15 -> 0.0, q95 = 2.85 -> 3.0
        assert_eq!(table.absolute[0], Threshold { lower: dec!(0), upper: dec!(3) });
        // relative -10..0: q05 = -9.5, q95 = -0.5
        assert_eq!(table.relative[0], Threshold { lower: dec!(-9.5), upper: dec!(-0.5) });
        assert_eq!(table.labelled()[4].0, "1D vs. Sector");
    }

    #[test]
    fn test_empty_universe_is_an_error() {
        let rows: Vec<Row> = Vec::new();
        assert!(QuantileTable::from_rows(&rows, dec!(0.05), dec!(0.95)).is_err());
    }
}
