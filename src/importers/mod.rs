// Import module - market data workbook access

pub mod market_data;

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook, Data, DataType, Reader, Xlsx};
use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::cell::Cell;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::error::BriefingError;

pub use market_data::MarketData;

/// Provider of raw sheet contents by sheet name.
///
/// Rows are returned in absolute layout: row 0 is the first row of the
/// sheet and column 0 its first column, regardless of where data starts.
pub trait SheetSource {
    fn rows(&mut self, sheet: &str) -> Result<Vec<Vec<Data>>>;
}

/// Workbook on disk, read with calamine
pub struct XlsxWorkbook {
    workbook: Xlsx<BufReader<File>>,
}

impl XlsxWorkbook {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening market data workbook: {:?}", path);
        let workbook: Xlsx<_> =
            open_workbook(path).with_context(|| format!("Failed to open workbook {:?}", path))?;
        Ok(Self { workbook })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }
}

impl SheetSource for XlsxWorkbook {
    fn rows(&mut self, sheet: &str) -> Result<Vec<Vec<Data>>> {
        if !self.workbook.sheet_names().iter().any(|s| s == sheet) {
            return Err(BriefingError::Sheet(format!("sheet '{}' not found", sheet)).into());
        }

        let range = self
            .workbook
            .worksheet_range(sheet)
            .with_context(|| format!("Failed to read sheet '{}'", sheet))?;

        // calamine trims leading empty rows and columns
        let (row_offset, col_offset) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or_default();

        let mut rows: Vec<Vec<Data>> = vec![Vec::new(); row_offset];
        rows.extend(range.rows().map(|row| {
            let mut padded = vec![Data::Empty; col_offset];
            padded.extend_from_slice(row);
            padded
        }));

        debug!("Sheet '{}': {} rows", sheet, rows.len());
        Ok(rows)
    }
}

/// In-memory workbook, for tests and for callers that build sheets themselves
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkbook {
    sheets: HashMap<String, Vec<Vec<Data>>>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: &str, rows: Vec<Vec<Data>>) -> Self {
        self.sheets.insert(name.to_string(), rows);
        self
    }
}

impl SheetSource for MemoryWorkbook {
    fn rows(&mut self, sheet: &str) -> Result<Vec<Vec<Data>>> {
        self.sheets
            .get(sheet)
            .cloned()
            .ok_or_else(|| BriefingError::Sheet(format!("sheet '{}' not found", sheet)).into())
    }
}

/// A sheet with a header row, addressed by column name.
///
/// Numeric reads never fail: empty or non-numeric cells become zero and are
/// counted, see [`Sheet::log_coercions`].
pub struct Sheet {
    pub name: String,
    header: Vec<String>,
    rows: Vec<Vec<Data>>,
    coerced: Cell<usize>,
}

impl Sheet {
    /// `header_row` and `skip` are absolute row indices.
    pub fn with_header(name: &str, raw: Vec<Vec<Data>>, header_row: usize, skip: &[usize]) -> Result<Self> {
        let header = raw
            .get(header_row)
            .ok_or_else(|| BriefingError::Sheet(format!("sheet '{}' has no header row {}", name, header_row)))?
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let rows = raw
            .into_iter()
            .enumerate()
            .skip(header_row + 1)
            .filter(|(idx, row)| !skip.contains(idx) && row.iter().any(|c| !c.is_empty()))
            .map(|(_, row)| row)
            .collect();

        Ok(Self {
            name: name.to_string(),
            header,
            rows,
            coerced: Cell::new(0),
        })
    }

    pub fn load(source: &mut dyn SheetSource, name: &str, header_row: usize, skip: &[usize]) -> Result<Self> {
        let raw = source.rows(name)?;
        Self::with_header(name, raw, header_row, skip)
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Data]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn find_column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    pub fn column(&self, name: &str) -> Result<usize> {
        self.find_column(name).ok_or_else(|| {
            BriefingError::Sheet(format!("column '{}' missing in sheet '{}'", name, self.name)).into()
        })
    }

    /// Trimmed text of a cell; None for empty cells
    pub fn text(&self, row: &[Data], idx: usize) -> Option<String> {
        row.get(idx)
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Number of a cell, None when empty or not numeric (no coercion count)
    pub fn optional_number(&self, row: &[Data], idx: usize) -> Option<Decimal> {
        row.get(idx).and_then(decimal_from_cell)
    }

    /// Number of a cell, zero when empty or not numeric
    pub fn number(&self, row: &[Data], idx: usize) -> Decimal {
        match self.optional_number(row, idx) {
            Some(value) => value,
            None => {
                debug!(
                    "Sheet '{}': coerced {:?} in column '{}' to 0",
                    self.name,
                    row.get(idx),
                    self.header.get(idx).map(String::as_str).unwrap_or_default()
                );
                self.coerced.set(self.coerced.get() + 1);
                Decimal::ZERO
            }
        }
    }

    pub fn coercions(&self) -> usize {
        self.coerced.get()
    }

    pub fn log_coercions(&self) {
        let count = self.coerced.get();
        if count > 0 {
            warn!("Sheet '{}': {} non-numeric cells read as 0", self.name, count);
        }
    }
}

/// Numeric value of a cell: numbers, numeric strings (a trailing % is
/// ignored); everything else is None.
pub fn decimal_from_cell(cell: &Data) -> Option<Decimal> {
    match cell {
        Data::Int(i) => Some(Decimal::from(*i)),
        Data::Float(f) if f.is_finite() => Decimal::from_f64(*f),
        Data::String(s) => {
            let cleaned = s.trim().trim_end_matches('%').replace(',', "");
            if cleaned.is_empty() {
                return None;
            }
            Decimal::from_str(&cleaned)
                .or_else(|_| Decimal::from_scientific(&cleaned))
                .ok()
        }
        _ => None,
    }
}

/// Parse date from an Excel date cell, a serial number or a text date
pub fn parse_date(cell: &Data) -> Result<NaiveDate> {
    let excel_epoch = NaiveDate::from_ymd_opt(1899, 12, 30).ok_or_else(|| anyhow!("Invalid Excel epoch"))?;
    let from_serial = |serial: f64| {
        // Beyond the i64 day range the cast saturates and try_days rejects it
        if !serial.is_finite() {
            return Err(anyhow!("Invalid date serial: {}", serial));
        }
        chrono::Duration::try_days(serial.floor() as i64)
            .and_then(|days| excel_epoch.checked_add_signed(days))
            .ok_or_else(|| anyhow!("Date serial out of range: {}", serial))
    };

    match cell {
        Data::DateTime(dt) => from_serial(dt.as_f64()),
        Data::Float(f) => from_serial(*f),
        Data::Int(i) => from_serial(*i as f64),
        Data::DateTimeIso(s) => NaiveDate::parse_from_str(s.get(..10).unwrap_or(s), "%Y-%m-%d")
            .with_context(|| format!("Could not parse date: {}", s)),
        _ => {
            let date_str = cell.to_string();
            let date_str = date_str.trim();

            for format in ["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y", "%d/%m/%Y"] {
                if let Ok(date) = NaiveDate::parse_from_str(date_str, format) {
                    return Ok(date);
                }
            }

            Err(anyhow!("Could not parse date: {}", date_str))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn s(text: &str) -> Data {
        Data::String(text.to_string())
    }

    #[test]
    fn test_decimal_from_cell() {
        assert_eq!(decimal_from_cell(&Data::Float(1.25)), Some(dec!(1.25)));
        assert_eq!(decimal_from_cell(&Data::Int(-3)), Some(dec!(-3)));
        assert_eq!(decimal_from_cell(&s(" 4.5% ")), Some(dec!(4.5)));
        assert_eq!(decimal_from_cell(&s("1,234.5")), Some(dec!(1234.5)));
        assert_eq!(decimal_from_cell(&s("#N/A N/A")), None);
        assert_eq!(decimal_from_cell(&Data::Empty), None);
        assert_eq!(decimal_from_cell(&Data::Float(f64::NAN)), None);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(parse_date(&s("2024-03-15")).unwrap(), expected);
        assert_eq!(parse_date(&s("15.03.2024")).unwrap(), expected);
        // Excel serial for 2024-03-15
        assert_eq!(parse_date(&Data::Float(45366.0)).unwrap(), expected);
        assert!(parse_date(&s("Ticker")).is_err());
    }

    #[test]
    fn test_parse_date_rejects_out_of_range_serials() {
        assert!(parse_date(&Data::Float(1.0e12)).is_err());
        assert!(parse_date(&Data::Float(f64::NAN)).is_err());
        assert!(parse_date(&Data::Float(f64::INFINITY)).is_err());
        assert!(parse_date(&Data::Int(i64::MAX)).is_err());
    }

    #[test]
    fn test_sheet_header_skip_and_coercion() {
        let raw = vec![
            vec![s("Date"), s("DAX")],
            vec![s("Ticker"), s("DAX Index")],
            vec![s("Field"), s("PX_LAST")],
            vec![s("2024-01-02"), Data::Float(16769.5)],
            vec![Data::Empty, Data::Empty],
            vec![s("2024-01-03"), s("#N/A")],
        ];
        let sheet = Sheet::with_header("Futures", raw, 0, &[1, 2]).unwrap();

        assert_eq!(sheet.header(), &["Date".to_string(), "DAX".to_string()]);
        assert_eq!(sheet.len(), 2);

        let col = sheet.column("DAX").unwrap();
        let values: Vec<Decimal> = sheet.rows().map(|r| sheet.number(r, col)).collect();
        assert_eq!(values, vec![dec!(16769.5), Decimal::ZERO]);
        assert_eq!(sheet.coercions(), 1);
        assert!(sheet.column("CAC").is_err());
    }

    #[test]
    fn test_memory_workbook_missing_sheet() {
        let mut book = MemoryWorkbook::new().with_sheet("Stocks", vec![]);
        assert!(book.rows("Stocks").is_ok());
        let err = book.rows("Funds").unwrap_err();
        assert!(err.to_string().contains("sheet 'Funds' not found"));
    }
}
