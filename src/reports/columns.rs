//! Declarative column presentation.
//!
//! Every report column is an enum variant; its header and formatting rule
//! live here instead of being matched on header strings.

use serde::Serialize;

use crate::analytics::performance::Window;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Column {
    Return(Window),
    VsSector(Window),
    MovAvg200,
    High52w,
    Benchmark,
    Portfolio,
    Difference,
    Stocks,
    Cash,
    Futures,
    Forex,
    Sum,
    Account,
    Sector,
    Underlying,
    PositionType,
    Aeq,
    SinceAeq,
    Volume,
    LastPrice,
    Pnl,
    Exposure,
    LowerQuantile,
    UpperQuantile,
    Peak,
    Trough,
    Drawdown,
    Drawup,
    MaxDrawdown,
    MaxDrawup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Style {
    /// "12.34%"
    Percent,
    /// Index points, "4512.30"
    Points,
    /// "1,234.56"
    Amount,
    /// "1,234"
    Count,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnFormat {
    pub style: Style,
    /// Colour by sign
    pub signed: bool,
}

impl ColumnFormat {
    const fn new(style: Style, signed: bool) -> Self {
        Self { style, signed }
    }
}

impl Column {
    pub const METRICS: [Column; 6] = [
        Column::Return(Window::OneDay),
        Column::Return(Window::FiveDays),
        Column::Return(Window::OneMonth),
        Column::Return(Window::YearToDate),
        Column::MovAvg200,
        Column::High52w,
    ];

    pub const VS_SECTOR: [Column; 4] = [
        Column::VsSector(Window::OneDay),
        Column::VsSector(Window::FiveDays),
        Column::VsSector(Window::OneMonth),
        Column::VsSector(Window::YearToDate),
    ];

    pub const COMPARISON: [Column; 3] = [Column::Benchmark, Column::Portfolio, Column::Difference];

    pub const HEDGE: [Column; 5] = [
        Column::Stocks,
        Column::Cash,
        Column::Futures,
        Column::Forex,
        Column::Sum,
    ];

    pub fn header(&self) -> String {
        match self {
            Column::Return(w) => w.label().to_string(),
            Column::VsSector(w) => format!("{} vs. Sector", w.label()),
            Column::MovAvg200 => "Δ 200D Mvag".to_string(),
            Column::High52w => "Δ 52 Week High".to_string(),
            Column::Benchmark => "Benchmark".to_string(),
            Column::Portfolio => "Portfolio".to_string(),
            Column::Difference => "Difference".to_string(),
            Column::Stocks => "Stocks".to_string(),
            Column::Cash => "Cash".to_string(),
            Column::Futures => "Futures".to_string(),
            Column::Forex => "Forex".to_string(),
            Column::Sum => "Sum".to_string(),
            Column::Account => "Name".to_string(),
            Column::Sector => "Sector".to_string(),
            Column::Underlying => "Underlying".to_string(),
            Column::PositionType => "Type".to_string(),
            Column::Aeq => "AEQ".to_string(),
            Column::SinceAeq => "% since AEQ".to_string(),
            Column::Volume => "Volume".to_string(),
            Column::LastPrice => "Last Price".to_string(),
            Column::Pnl => "P&L".to_string(),
            Column::Exposure => "Exposure".to_string(),
            Column::LowerQuantile => "5th Quantile".to_string(),
            Column::UpperQuantile => "95th Quantile".to_string(),
            Column::Peak => "Peak".to_string(),
            Column::Trough => "Trough".to_string(),
            Column::Drawdown => "Drawdown".to_string(),
            Column::Drawup => "Drawup".to_string(),
            Column::MaxDrawdown => "Max Drawdown".to_string(),
            Column::MaxDrawup => "Max Drawup".to_string(),
        }
    }

    pub fn format(&self) -> ColumnFormat {
        use Style::*;
        match self {
            Column::Return(_) | Column::VsSector(_) | Column::MovAvg200 | Column::High52w => {
                ColumnFormat::new(Percent, true)
            }
            Column::Difference => ColumnFormat::new(Percent, true),
            Column::Benchmark | Column::Portfolio => ColumnFormat::new(Percent, false),
            Column::Stocks | Column::Cash | Column::Futures | Column::Forex | Column::Sum => {
                ColumnFormat::new(Percent, false)
            }
            Column::Account | Column::Sector | Column::Underlying | Column::PositionType => {
                ColumnFormat::new(Text, false)
            }
            Column::Aeq | Column::LastPrice => ColumnFormat::new(Amount, false),
            Column::SinceAeq => ColumnFormat::new(Percent, true),
            Column::Volume => ColumnFormat::new(Count, false),
            Column::Pnl => ColumnFormat::new(Amount, true),
            Column::Exposure => ColumnFormat::new(Percent, false),
            Column::LowerQuantile | Column::UpperQuantile => ColumnFormat::new(Percent, false),
            Column::Peak | Column::Trough => ColumnFormat::new(Points, false),
            Column::Drawdown | Column::MaxDrawdown => ColumnFormat::new(Percent, true),
            Column::Drawup | Column::MaxDrawup => ColumnFormat::new(Percent, true),
        }
    }
}
