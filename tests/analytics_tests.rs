//! Properties of the analytics core through the public API

use briefing::analytics::benchmark::{combine, Basket, Constituent};
use briefing::analytics::drawdown::{summarize, track};
use briefing::analytics::exposure::hedge_exposure;
use briefing::analytics::outliers::{quantile, round_half};
use briefing::analytics::performance::{PriceSeries, Window};
use briefing::analytics::pct_change;
use briefing::db::{AssetCategory, AssetClass, Position};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn day(offset: u64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap() + chrono::Days::new(offset)
}

fn dated(prices: &[Decimal]) -> Vec<(NaiveDate, Decimal)> {
    prices.iter().enumerate().map(|(i, p)| (day(i as u64), *p)).collect()
}

fn constituent(ticker: &str, sector: &str, close: Decimal, last: Decimal) -> Constituent {
    Constituent {
        ticker: ticker.to_string(),
        sector: Some(sector.to_string()),
        country: Some("DE".to_string()),
        close: Some(close),
        last: Some(last),
    }
}

fn position(name: &str, class: AssetClass, category: AssetCategory, currency: &str, value: Decimal) -> Position {
    Position {
        account_segment_id: 1,
        account_id: 10,
        account_name: "Mandate".to_string(),
        nav: dec!(1000),
        base_currency: "EUR".to_string(),
        report_date: day(0),
        name: name.to_string(),
        isin: None,
        bloomberg_query: None,
        asset_class: class,
        category,
        region: None,
        currency: Some(currency.to_string()),
        forex_trade_currency: None,
        position_type: None,
        volume: Decimal::ZERO,
        average_entry_quote: Decimal::ZERO,
        average_entry_xrate: Decimal::ONE,
        last_quote: Decimal::ZERO,
        last_xrate: Decimal::ONE,
        price_per_point: Decimal::ONE,
        total_exposure: value,
        value_base_ccy: value,
        percent_nav: Decimal::ZERO,
        underlying_name: None,
        country: None,
        sector: None,
    }
}

#[test]
fn test_drawdown_never_positive_drawup_never_negative() {
    let prices = [
        dec!(50), dec!(55), dec!(53), dec!(40), dec!(61), dec!(61), dec!(58), dec!(30), dec!(35),
    ];
    let points = track(&dated(&prices));
    assert_eq!(points.len(), prices.len());

    let mut peak = Decimal::MIN;
    for point in &points {
        peak = peak.max(point.price);
        assert_eq!(point.peak, peak);
        assert!(point.drawdown <= Decimal::ZERO);
        assert!(point.drawup >= Decimal::ZERO);
    }

    let summary = summarize(&points).unwrap();
    assert!(summary.max_drawdown <= summary.current_drawdown);
    assert!(summary.max_drawup >= summary.current_drawup);
    assert_eq!(summary.trough, dec!(30));
}

#[test]
fn test_empty_series_has_no_summary() {
    assert!(track(&[]).is_empty());
    assert!(summarize(&[]).is_none());
}

#[test]
fn test_short_series_returns_none_for_long_windows() {
    let series = PriceSeries::new("X", dated(&[dec!(100), dec!(102)]));
    assert_eq!(series.trailing_return(Window::OneDay), Some(dec!(2)));
    assert_eq!(series.trailing_return(Window::FiveDays), None);
    assert_eq!(series.trailing_return(Window::OneMonth), None);
    assert_eq!(series.trailing_return(Window::YearToDate), Some(dec!(2)));
}

#[test]
fn test_quantiles_stay_within_range_and_round_to_halves() {
    let values: Vec<Decimal> = (0..21).map(|i| Decimal::from(i) * dec!(0.7) - dec!(3)).collect();
    let low = quantile(&values, dec!(0.05)).unwrap();
    let high = quantile(&values, dec!(0.95)).unwrap();

    assert!(low <= high);
    assert!(low >= values[0] && high <= values[20]);
    assert_eq!(quantile(&[dec!(4)], dec!(0.95)), Some(dec!(4)));
    assert_eq!(quantile(&[], dec!(0.5)), None);

    for value in [low, high, dec!(1.26), dec!(-0.74)] {
        let rounded = round_half(value);
        assert_eq!((rounded * Decimal::TWO).fract(), Decimal::ZERO);
        assert!((rounded - value).abs() <= dec!(0.25));
    }
}

#[test]
fn test_blended_basket_weights_sum_to_hundred() {
    let eu = Basket::equal_notional(
        &[
            constituent("SAP", "Information Technology", dec!(100), dec!(110)),
            constituent("SHEL", "Energy", dec!(30), dec!(27)),
            constituent("RWE", "Utilities", dec!(35), dec!(36)),
        ],
        dec!(1000000),
    )
    .unwrap();
    let us = Basket::equal_notional(
        &[
            constituent("AAPL", "Information Technology", dec!(200), dec!(220)),
            constituent("XOM", "Energy", dec!(100), dec!(100)),
        ],
        dec!(1000000),
    )
    .unwrap();

    assert!((eu.total_current_weight() - dec!(100)).abs() < dec!(0.000001));
    let blend = combine(&eu, &us, dec!(0.6), dec!(0.4));
    assert_eq!(blend.members.len(), 5);
    assert!((blend.total_current_weight() - dec!(100)).abs() < dec!(0.000001));
}

#[test]
fn test_basket_without_prices_is_an_error() {
    let unpriced = Constituent {
        close: None,
        ..constituent("GONE", "Energy", dec!(1), dec!(1))
    };
    assert!(Basket::equal_notional(&[unpriced], dec!(1000)).is_err());
}

#[test]
fn test_hedge_partition_sums_to_total() {
    let positions = vec![
        position("Stock EUR", AssetClass::Stock, AssetCategory::Equity, "EUR", dec!(400)),
        position("Stock USD", AssetClass::Stock, AssetCategory::Equity, "USD", dec!(300)),
        position("Cash", AssetClass::Cash, AssetCategory::Other("CASH".to_string()), "EUR", dec!(300)),
    ];
    let report = hedge_exposure(&positions).unwrap();

    let sum: Decimal = report.rows.iter().map(|r| r.sum).sum();
    assert_eq!(report.total.sum, sum);
    assert_eq!(report.total.sum, dec!(100));
    assert!(report.unclassified.is_empty());
}

#[test]
fn test_pct_change_guards_zero_base() {
    assert_eq!(pct_change(dec!(0), dec!(5)), None);
    assert_eq!(pct_change(dec!(50), dec!(40)), Some(dec!(-20)));
}
