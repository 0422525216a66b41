use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BriefingError;

/// Asset classes carried by the position warehouse
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AssetClass {
    Stock,
    Future,
    Forex,
    Cash,
    Bond,
    FundClass,
    Certificate,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Stock => "STOCK",
            AssetClass::Future => "FUTURE",
            AssetClass::Forex => "FOREX",
            AssetClass::Cash => "CASH",
            AssetClass::Bond => "BOND",
            AssetClass::FundClass => "FUND_CLASS",
            AssetClass::Certificate => "CERTIFICATE",
        }
    }
}

impl FromStr for AssetClass {
    type Err = BriefingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STOCK" => Ok(AssetClass::Stock),
            "FUTURE" => Ok(AssetClass::Future),
            "FOREX" => Ok(AssetClass::Forex),
            "CASH" => Ok(AssetClass::Cash),
            "BOND" => Ok(AssetClass::Bond),
            "FUND_CLASS" => Ok(AssetClass::FundClass),
            "CERTIFICATE" => Ok(AssetClass::Certificate),
            _ => Err(BriefingError::unsupported("asset class", s)),
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First-level house classification (`dr_class_level_1`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AssetCategory {
    Equity,
    Fx,
    FixedIncome,
    Other(String),
}

impl AssetCategory {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "EQUITY" => AssetCategory::Equity,
            "FX" => AssetCategory::Fx,
            "FIXED INCOME" => AssetCategory::FixedIncome,
            _ => AssetCategory::Other(s.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AssetCategory::Equity => "EQUITY",
            AssetCategory::Fx => "FX",
            AssetCategory::FixedIncome => "FIXED INCOME",
            AssetCategory::Other(s) => s,
        }
    }
}

/// Position direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PositionType {
    Long,
    Short,
}

impl PositionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionType::Long => "LONG",
            PositionType::Short => "SHORT",
        }
    }

    /// +1 for long, -1 for short
    pub fn sign(&self) -> Decimal {
        match self {
            PositionType::Long => Decimal::ONE,
            PositionType::Short => Decimal::NEGATIVE_ONE,
        }
    }
}

impl FromStr for PositionType {
    type Err = BriefingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LONG" => Ok(PositionType::Long),
            "SHORT" => Ok(PositionType::Short),
            _ => Err(BriefingError::unsupported("position type", s)),
        }
    }
}

/// One held instrument for one account segment on the newest report date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub account_segment_id: i64,
    pub account_id: i64,
    pub account_name: String,
    pub nav: Decimal,
    pub base_currency: String,
    pub report_date: NaiveDate,
    pub name: String,
    pub isin: Option<String>,
    pub bloomberg_query: Option<String>,
    pub asset_class: AssetClass,
    pub category: AssetCategory,
    /// `dr_class_level_2`, used as region ("EU", "NORTH AMERICA", ...)
    pub region: Option<String>,
    pub currency: Option<String>,
    pub forex_trade_currency: Option<String>,
    /// Raw direction; parsed where it matters so unknown values fail there
    pub position_type: Option<String>,
    pub volume: Decimal,
    pub average_entry_quote: Decimal,
    pub average_entry_xrate: Decimal,
    pub last_quote: Decimal,
    pub last_xrate: Decimal,
    pub price_per_point: Decimal,
    pub total_exposure: Decimal,
    pub value_base_ccy: Decimal,
    pub percent_nav: Decimal,
    pub underlying_name: Option<String>,
    pub country: Option<String>,
    pub sector: Option<String>,
}

impl Position {
    pub fn is_fx_future(&self) -> bool {
        self.asset_class == AssetClass::Future && self.category == AssetCategory::Fx
    }

    pub fn is_equity_future(&self) -> bool {
        self.asset_class == AssetClass::Future && self.category == AssetCategory::Equity
    }

    pub fn is_fund(&self) -> bool {
        matches!(
            self.asset_class,
            AssetClass::FundClass | AssetClass::Certificate
        )
    }
}
