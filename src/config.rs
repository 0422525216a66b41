//! Run configuration
//!
//! Everything a daily run needs that is not market or position data: where
//! the inputs live, which mandates to report on, and the analytics constants.
//! Loaded from TOML; every field has a default so a partial file is enough.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::BriefingError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Market data workbook
    pub workbook: PathBuf,
    /// Position warehouse (SQLite)
    pub database: PathBuf,
    /// Root of the artifact tree
    pub output_dir: PathBuf,
    /// Equity mandates: account segment name -> account segment id
    pub mandates: BTreeMap<String, i64>,
    pub allocation: AllocationConfig,
    pub risk: RiskConfig,
    pub third_party: ThirdPartyConfig,
    /// Underlying names in the warehouse that differ from the workbook's
    /// price series names
    pub underlying_aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// Mandate reported against the blended benchmark
    pub mandate: String,
    pub eu_weight: Decimal,
    pub us_weight: Decimal,
    /// Notional of each synthetic equal-weight basket
    pub basket_capital: Decimal,
    /// Countries with |active weight| at or below this fold into "Other"
    pub region_threshold: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub lower_quantile: Decimal,
    pub upper_quantile: Decimal,
    /// % since entry below which a holding is flagged regardless of quantiles
    pub entry_loss_threshold: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThirdPartyConfig {
    pub groups: Vec<MandateGroup>,
}

/// A report table built from every account whose name contains `pattern`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MandateGroup {
    pub label: String,
    pub pattern: String,
}

impl Default for Config {
    fn default() -> Self {
        let mandates = [
            ("D&R Aktien", 17154631),
            ("D&R Aktien Nachhaltigkeit", 79939969),
            ("D&R Aktien Strategie", 399443),
            ("D&R Premium Select", 93708903),
        ]
        .into_iter()
        .map(|(name, id)| (name.to_string(), id))
        .collect();

        let underlying_aliases = [(
            "Deutsche Boerse AG German Stock Index DAX",
            "Deutsche Boerse AG German Stock",
        )]
        .into_iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect();

        Self {
            workbook: PathBuf::from("data.xlsx"),
            database: PathBuf::from("warehouse.db"),
            output_dir: PathBuf::from("output"),
            mandates,
            allocation: AllocationConfig::default(),
            risk: RiskConfig::default(),
            third_party: ThirdPartyConfig::default(),
            underlying_aliases,
        }
    }
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            mandate: "D&R Aktien Nachhaltigkeit".to_string(),
            eu_weight: dec!(0.6),
            us_weight: dec!(0.4),
            basket_capital: dec!(100000000000),
            region_threshold: dec!(2),
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            lower_quantile: dec!(0.05),
            upper_quantile: dec!(0.95),
            entry_loss_threshold: dec!(-5),
        }
    }
}

impl Default for ThirdPartyConfig {
    fn default() -> Self {
        let groups = [
            ("VV-Flex", "VV-Flex"),
            ("VV-ESG", "VV-ESG"),
            ("Strategie-Select", "Strategie - Select"),
            ("Premium-Select", "Premium Select"),
        ]
        .into_iter()
        .map(|(label, pattern)| MandateGroup {
            label: label.to_string(),
            pattern: pattern.to_string(),
        })
        .collect();

        Self { groups }
    }
}

impl Config {
    /// Default config location: `<config_home>/briefing/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dir_spec::config_home().map(|dir| dir.join("briefing").join("config.toml"))
    }

    /// Load an explicit config file; it must exist.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(text).map_err(|e| BriefingError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else the default location if it exists, else defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(default) if default.exists() => Self::from_file(default),
            _ => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let risk = &self.risk;
        if !(Decimal::ZERO..=Decimal::ONE).contains(&risk.lower_quantile)
            || !(Decimal::ZERO..=Decimal::ONE).contains(&risk.upper_quantile)
            || risk.lower_quantile >= risk.upper_quantile
        {
            return Err(BriefingError::Config(format!(
                "quantile levels must satisfy 0 <= lower < upper <= 1 (got {} / {})",
                risk.lower_quantile, risk.upper_quantile
            ))
            .into());
        }

        if self.allocation.basket_capital <= Decimal::ZERO {
            return Err(BriefingError::Config("basket_capital must be positive".to_string()).into());
        }

        Ok(())
    }

    /// Resolve a mandate name to its account segment id
    pub fn mandate_id(&self, name: &str) -> Result<i64> {
        self.mandates
            .get(name)
            .copied()
            .ok_or_else(|| BriefingError::missing("mandate", name).into())
    }

    /// Workbook price-series name for a warehouse underlying name
    pub fn resolve_underlying<'a>(&'a self, name: &'a str) -> &'a str {
        self.underlying_aliases
            .get(name)
            .map(String::as_str)
            .unwrap_or(name)
    }
}
