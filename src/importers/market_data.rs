//! Typed loaders for the market data workbook.
//!
//! Each loader knows one sheet's layout (header row, label column, column
//! names) and returns analytics types.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::{parse_date, Sheet, SheetSource};
use crate::analytics::allocation::{LookthroughRow, SectorLookthrough};
use crate::analytics::benchmark::Constituent;
use crate::analytics::holdings::InstrumentQuote;
use crate::analytics::performance::{
    sector_aggregate, MetricTable, Metrics, PriceSeries, RelativeMetrics, SectorMember, Universe,
    UniverseMember, Window,
};

pub const FUTURES_SHEET: &str = "Futures";
pub const REGIONS_SHEET: &str = "Regions";
pub const STOCKS_SHEET: &str = "Stocks";
pub const FUNDS_SHEET: &str = "Funds";
pub const US_SECTOR_SHEET: &str = "US Sector";
pub const EU_SECTOR_SHEET: &str = "EU Sector";
pub const SECTOR_LOOKTHROUGH_SHEET: &str = "Sector";

/// Header row of the look-through sheet; the rows above hold a title block
const LOOKTHROUGH_HEADER_ROW: usize = 4;
/// First sector column of the look-through sheet
const LOOKTHROUGH_FIRST_SECTOR: usize = 4;
const LOOKTHROUGH_IGNORED: [&str; 2] = ["null", "NullGroup"];

const RETURN_COLUMNS: [(Window, &str); 4] = [
    (Window::OneDay, "CURRENT_TRR_1D"),
    (Window::FiveDays, "CURRENT_TRR_5D"),
    (Window::OneMonth, "CURRENT_TRR_1MO"),
    (Window::YearToDate, "CURRENT_TRR_YTD"),
];
const MOV_AVG_COLUMN: &str = "CHG_PCT_MOV_AVG_200D";
const HIGH_52W_COLUMN: &str = "CHG_PCT_HIGH_52WEEK";

/// Universe sheet name of a region
pub fn universe_sheet(universe: Universe) -> &'static str {
    match universe {
        Universe::Us => "S&P 500",
        Universe::Eu => "STOXX Europe 600",
    }
}

/// Benchmark constituent sheet name of a region
pub fn index_sheet(universe: Universe) -> &'static str {
    match universe {
        Universe::Us => "SPX Index",
        Universe::Eu => "SXXP Index",
    }
}

/// Column positions of the six metric fields
struct MetricColumns {
    returns: [usize; 4],
    mov_avg_200: usize,
    high_52w: usize,
}

impl MetricColumns {
    fn resolve(sheet: &Sheet) -> Result<Self> {
        let mut returns = [0usize; 4];
        for (slot, (_, name)) in returns.iter_mut().zip(RETURN_COLUMNS) {
            *slot = sheet.column(name)?;
        }
        Ok(Self {
            returns,
            mov_avg_200: sheet.column(MOV_AVG_COLUMN)?,
            high_52w: sheet.column(HIGH_52W_COLUMN)?,
        })
    }

    fn read(&self, sheet: &Sheet, row: &[calamine::Data]) -> Metrics {
        let mut metrics = Metrics {
            mov_avg_200: sheet.number(row, self.mov_avg_200),
            high_52w: sheet.number(row, self.high_52w),
            ..Default::default()
        };
        for ((window, _), idx) in RETURN_COLUMNS.iter().zip(self.returns) {
            metrics.set_window(*window, sheet.number(row, idx));
        }
        metrics
    }
}

/// Market data workbook behind any sheet source
pub struct MarketData {
    source: Box<dyn SheetSource>,
}

impl MarketData {
    pub fn new(source: Box<dyn SheetSource>) -> Self {
        Self { source }
    }

    fn sheet(&mut self, name: &str, header_row: usize, skip: &[usize]) -> Result<Sheet> {
        Sheet::load(self.source.as_mut(), name, header_row, skip)
            .with_context(|| format!("Failed to load sheet '{}'", name))
    }

    /// Futures price series, one per column in sheet order.
    ///
    /// Row 0 holds the series names, rows 1-2 vendor ticker/field lines,
    /// column 0 the dates. Rows with unparseable dates and empty cells are
    /// dropped per series.
    pub fn futures(&mut self) -> Result<Vec<PriceSeries>> {
        let sheet = self.sheet(FUTURES_SHEET, 0, &[1, 2])?;

        let dated: Vec<_> = sheet
            .rows()
            .filter_map(|row| match row.first().map(parse_date) {
                Some(Ok(date)) => Some((date, row)),
                _ => {
                    debug!("Futures: skipping row without a date: {:?}", row.first());
                    None
                }
            })
            .collect();

        let series: Vec<PriceSeries> = sheet
            .header()
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, name)| !name.is_empty())
            .map(|(idx, name)| {
                let points = dated
                    .iter()
                    .filter_map(|(date, row)| sheet.optional_number(row, idx).map(|p| (*date, p)))
                    .collect();
                PriceSeries::new(name.clone(), points)
            })
            .collect();

        info!("Loaded {} futures price series", series.len());
        Ok(series)
    }

    /// Index universe with per-constituent metrics; rows without a sector are dropped.
    pub fn universe(&mut self, universe: Universe) -> Result<Vec<UniverseMember>> {
        let sheet = self.sheet(universe_sheet(universe), 0, &[])?;
        let name_col = sheet.column("name")?;
        let sector_col = sheet.column("gics_sector_name")?;
        let metric_cols = MetricColumns::resolve(&sheet)?;

        let members: Vec<UniverseMember> = sheet
            .rows()
            .filter_map(|row| {
                let sector = sheet.text(row, sector_col).filter(|s| s != "0")?;
                Some(UniverseMember {
                    name: sheet.text(row, name_col).unwrap_or_default(),
                    sector,
                    metrics: metric_cols.read(&sheet, row),
                    relative: RelativeMetrics::default(),
                })
            })
            .collect();

        sheet.log_coercions();
        info!("Loaded {} {} universe members", members.len(), universe.label());
        Ok(members)
    }

    /// Regional index table, labelled by column 1
    pub fn regions(&mut self) -> Result<MetricTable> {
        let sheet = self.sheet(REGIONS_SHEET, 0, &[])?;
        self.labelled_table(&sheet, 1)
    }

    /// US sector table, labelled by column 0
    pub fn us_sectors(&mut self) -> Result<MetricTable> {
        let sheet = self.sheet(US_SECTOR_SHEET, 0, &[])?;
        self.labelled_table(&sheet, 0)
    }

    fn labelled_table(&self, sheet: &Sheet, label_col: usize) -> Result<MetricTable> {
        let metric_cols = MetricColumns::resolve(sheet)?;
        let index_name = sheet.header().get(label_col).cloned().unwrap_or_default();

        let rows: Vec<(String, Metrics)> = sheet
            .rows()
            .filter_map(|row| {
                let label = sheet.text(row, label_col)?;
                Some((label, metric_cols.read(sheet, row)))
            })
            .collect();

        sheet.log_coercions();
        debug!("Sheet '{}': {} labelled rows", sheet.name, rows.len());
        Ok(MetricTable::new(index_name, rows))
    }

    /// EU sector table, market-cap weighted from constituent rows
    pub fn eu_sectors(&mut self) -> Result<MetricTable> {
        let sheet = self.sheet(EU_SECTOR_SHEET, 0, &[])?;
        let gics_col = sheet.column("GICS")?;
        let cap_col = sheet.column("CUR_MKT_CAP")?;
        let metric_cols = MetricColumns::resolve(&sheet)?;

        let members: Vec<SectorMember> = sheet
            .rows()
            .filter_map(|row| {
                Some(SectorMember {
                    sector: sheet.text(row, gics_col)?,
                    market_cap: sheet.number(row, cap_col),
                    metrics: metric_cols.read(&sheet, row),
                })
            })
            .collect();

        sheet.log_coercions();
        Ok(sector_aggregate(&members, "GICS"))
    }

    /// Vendor quotes of single stocks, keyed by ISIN
    pub fn stock_quotes(&mut self) -> Result<Vec<InstrumentQuote>> {
        self.quotes(STOCKS_SHEET)
    }

    /// Vendor quotes of funds, keyed by query
    pub fn fund_quotes(&mut self) -> Result<Vec<InstrumentQuote>> {
        self.quotes(FUNDS_SHEET)
    }

    fn quotes(&mut self, sheet_name: &str) -> Result<Vec<InstrumentQuote>> {
        let sheet = self.sheet(sheet_name, 0, &[])?;
        let query_col = sheet.find_column("bloomberg_query");
        let isin_col = sheet.find_column("isin");
        let price_col = sheet.column("Last Price")?;
        let metric_cols = MetricColumns::resolve(&sheet)?;

        let quotes: Vec<InstrumentQuote> = sheet
            .rows()
            .map(|row| InstrumentQuote {
                query: query_col.and_then(|c| sheet.text(row, c)),
                isin: isin_col.and_then(|c| sheet.text(row, c)),
                last_price: sheet.number(row, price_col),
                metrics: metric_cols.read(&sheet, row),
            })
            .collect();

        sheet.log_coercions();
        info!("Loaded {} quotes from '{}'", quotes.len(), sheet_name);
        Ok(quotes)
    }

    /// Benchmark index constituents with close/last prices
    pub fn constituents(&mut self, universe: Universe) -> Result<Vec<Constituent>> {
        let sheet = self.sheet(index_sheet(universe), 0, &[])?;
        let close_col = sheet.column("#px_close")?;
        let last_col = sheet.column("#px_last")?;
        let sector_col = sheet.column("gics_sector_name")?;
        let country_col = sheet.column("cntry_issue_iso")?;

        let constituents = sheet
            .rows()
            .filter_map(|row| {
                Some(Constituent {
                    ticker: sheet.text(row, 0)?,
                    sector: sheet.text(row, sector_col),
                    country: sheet.text(row, country_col),
                    close: sheet.optional_number(row, close_col),
                    last: sheet.optional_number(row, last_col),
                })
            })
            .collect();
        Ok(constituents)
    }

    /// Sector weights per future underlying
    pub fn sector_lookthrough(&mut self) -> Result<SectorLookthrough> {
        let sheet = self.sheet(SECTOR_LOOKTHROUGH_SHEET, LOOKTHROUGH_HEADER_ROW, &[])?;
        let region_col = sheet.column("Region")?;

        let sector_cols: Vec<(usize, String)> = sheet
            .header()
            .iter()
            .enumerate()
            .skip(LOOKTHROUGH_FIRST_SECTOR)
            .filter(|(_, name)| !name.is_empty() && !LOOKTHROUGH_IGNORED.contains(&name.as_str()))
            .map(|(idx, name)| (idx, name.clone()))
            .collect();

        if sector_cols.is_empty() {
            warn!("Sheet '{}' has no sector columns", sheet.name);
        }

        let rows: Vec<(String, LookthroughRow)> = sheet
            .rows()
            .filter_map(|row| {
                let underlying = sheet.text(row, 0)?;
                let weights = sector_cols
                    .iter()
                    .map(|(idx, sector)| (sector.clone(), sheet.number(row, *idx)))
                    .filter(|(_, weight)| *weight != Decimal::ZERO)
                    .collect();
                Some((
                    underlying,
                    LookthroughRow {
                        region: sheet.text(row, region_col),
                        weights,
                    },
                ))
            })
            .collect();

        sheet.log_coercions();
        Ok(SectorLookthrough::new(rows))
    }
}
