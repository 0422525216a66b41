//! Synthetic equal-notional benchmark baskets and their blend.

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::BriefingError;

/// One index member as listed in the workbook
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constituent {
    pub ticker: String,
    /// Bare GICS sector name
    pub sector: Option<String>,
    /// ISO country of issue
    pub country: Option<String>,
    pub close: Option<Decimal>,
    pub last: Option<Decimal>,
}

/// Constituent with its simulated holding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasketMember {
    pub ticker: String,
    pub sector: Option<String>,
    pub country: Option<String>,
    pub units: Decimal,
    pub initial_value: Decimal,
    /// % of basket initial value
    pub initial_weight: Decimal,
    pub current_value: Decimal,
    /// % of basket current value
    pub current_weight: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Basket {
    pub members: Vec<BasketMember>,
}

impl Basket {
    /// Allocate `capital` equally across every constituent with positive
    /// close and last prices, in whole units.
    pub fn equal_notional(constituents: &[Constituent], capital: Decimal) -> Result<Self> {
        let priced: Vec<(&Constituent, Decimal, Decimal)> = constituents
            .iter()
            .filter_map(|c| match (c.close, c.last) {
                (Some(close), Some(last)) if close > Decimal::ZERO && last > Decimal::ZERO => {
                    Some((c, close, last))
                }
                _ => None,
            })
            .collect();

        let dropped = constituents.len() - priced.len();
        if dropped > 0 {
            warn!("Dropped {} constituents without usable prices", dropped);
        }
        if priced.is_empty() {
            return Err(BriefingError::InsufficientData(
                "benchmark basket has no priced constituents".to_string(),
            )
            .into());
        }

        let notional = capital / Decimal::from(priced.len());

        let mut members: Vec<BasketMember> = priced
            .into_iter()
            .map(|(c, close, last)| {
                let units = (notional / close).floor();
                BasketMember {
                    ticker: c.ticker.clone(),
                    sector: c.sector.clone(),
                    country: c.country.clone(),
                    units,
                    initial_value: units * close,
                    initial_weight: Decimal::ZERO,
                    current_value: units * last,
                    current_weight: Decimal::ZERO,
                }
            })
            .collect();

        let total_initial: Decimal = members.iter().map(|m| m.initial_value).sum();
        let total_current: Decimal = members.iter().map(|m| m.current_value).sum();
        if total_initial.is_zero() || total_current.is_zero() {
            return Err(BriefingError::InsufficientData(
                "benchmark basket capital too small for a single unit".to_string(),
            )
            .into());
        }

        let hundred = Decimal::ONE_HUNDRED;
        for member in &mut members {
            member.initial_weight = member.initial_value / total_initial * hundred;
            member.current_weight = member.current_value / total_current * hundred;
        }

        info!("Built basket of {} members", members.len());
        Ok(Self { members })
    }

    fn scaled(&self, factor: Decimal) -> Vec<BasketMember> {
        self.members
            .iter()
            .map(|m| BasketMember {
                initial_weight: m.initial_weight * factor,
                current_weight: m.current_weight * factor,
                ..m.clone()
            })
            .collect()
    }

    pub fn total_current_weight(&self) -> Decimal {
        self.members.iter().map(|m| m.current_weight).sum()
    }
}

/// Scale each basket's weights by its blend factor and concatenate.
///
/// No re-normalisation: with 0.6/0.4 and two baskets summing to 100 each,
/// the blend sums to 100.
pub fn combine(eu: &Basket, us: &Basket, eu_weight: Decimal, us_weight: Decimal) -> Basket {
    let mut members = eu.scaled(eu_weight);
    members.extend(us.scaled(us_weight));
    Basket { members }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn constituent(ticker: &str, close: Option<Decimal>, last: Option<Decimal>) -> Constituent {
        Constituent {
            ticker: ticker.to_string(),
            sector: Some("Energy".to_string()),
            country: Some("DE".to_string()),
            close,
            last,
        }
    }

    fn close_to(a: Decimal, b: Decimal) -> bool {
        (a - b).abs() < dec!(0.000001)
    }

    #[test]
    fn test_whole_units_from_equal_notional() {
        let basket = Basket::equal_notional(
            &[
                constituent("A", Some(dec!(30)), Some(dec!(30))),
                constituent("B", Some(dec!(70)), Some(dec!(140))),
            ],
            dec!(1000),
        )
        .unwrap();

        // 500 / 30 = 16.67 -> 16 units, 500 / 70 = 7.14 -> 7 units
        assert_eq!(basket.members[0].units, dec!(16));
        assert_eq!(basket.members[1].units, dec!(7));
        assert_eq!(basket.members[0].initial_value, dec!(480));
        assert_eq!(basket.members[1].current_value, dec!(980));
        assert!(close_to(basket.total_current_weight(), dec!(100)));
    }

    #[test]
    fn test_unpriced_constituents_are_dropped() {
        let basket = Basket::equal_notional(
            &[
                constituent("A", Some(dec!(10)), Some(dec!(10))),
                constituent("B", None, Some(dec!(10))),
                constituent("C", Some(dec!(0)), Some(dec!(10))),
            ],
            dec!(100),
        )
        .unwrap();
        assert_eq!(basket.members.len(), 1);
        assert_eq!(basket.members[0].units, dec!(10));
    }

    #[test]
    fn test_empty_basket_is_an_error() {
        assert!(Basket::equal_notional(&[constituent("A", None, None)], dec!(100)).is_err());
    }

    #[test]
    fn test_blend_sums_to_hundred_without_renormalising() {
        let eu = Basket::equal_notional(
            &[
                constituent("A", Some(dec!(13)), Some(dec!(17))),
                constituent("B", Some(dec!(29)), Some(dec!(23))),
            ],
            dec!(100000),
        )
        .unwrap();
        let us = Basket::equal_notional(
            &[
                constituent("C", Some(dec!(101)), Some(dec!(99))),
                constituent("D", Some(dec!(7)), Some(dec!(9))),
                constituent("E", Some(dec!(55)), Some(dec!(60))),
            ],
            dec!(100000),
        )
        .unwrap();

        let blend = combine(&eu, &us, dec!(0.6), dec!(0.4));
        assert_eq!(blend.members.len(), 5);

        let eu_part: Decimal = blend.members[..2].iter().map(|m| m.current_weight).sum();
        assert!(close_to(eu_part, dec!(60)));
        assert!(close_to(blend.total_current_weight(), dec!(100)));
    }
}
