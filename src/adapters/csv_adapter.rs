//! CSV file trade data adapter.
//!
//! Each flow lives in its own CSV file with a header row. Columns are looked
//! up by name, so extra columns and any column order are accepted.

use crate::domain::aggregate::{max_code, DEFAULT_CODE_WIDTH};
use crate::domain::error::IitiError;
use crate::domain::trade_record::{Flow, TradeRecord, YearRange};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::TradeDataPort;
use csv::StringRecord;
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnNames {
    pub year: String,
    pub code: String,
    pub value_a: String,
    pub value_b: String,
    pub quantity: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            year: "year".into(),
            code: "code".into(),
            value_a: "dollar".into(),
            value_b: "rial".into(),
            quantity: "weight".into(),
        }
    }
}

impl ColumnNames {
    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let defaults = Self::default();
        let get = |key: &str, fallback: String| {
            config
                .get_string("input", key)
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(fallback)
        };
        Self {
            year: get("year_column", defaults.year),
            code: get("code_column", defaults.code),
            value_a: get("value_a_column", defaults.value_a),
            value_b: get("value_b_column", defaults.value_b),
            quantity: get("quantity_column", defaults.quantity),
        }
    }
}

struct ColumnIndex {
    year: usize,
    code: usize,
    value_a: usize,
    value_b: usize,
    quantity: usize,
}

#[derive(Debug)]
pub struct CsvTradeAdapter {
    export_path: PathBuf,
    import_path: PathBuf,
    columns: ColumnNames,
    code_width: u32,
}

impl CsvTradeAdapter {
    pub fn new(export_path: PathBuf, import_path: PathBuf) -> Self {
        Self {
            export_path,
            import_path,
            columns: ColumnNames::default(),
            code_width: DEFAULT_CODE_WIDTH,
        }
    }

    pub fn with_columns(mut self, columns: ColumnNames) -> Self {
        self.columns = columns;
        self
    }

    /// Codes with more digits than `code_width` are rejected on read.
    pub fn with_code_width(mut self, code_width: u32) -> Self {
        self.code_width = code_width;
        self
    }

    pub fn path(&self, flow: Flow) -> &Path {
        match flow {
            Flow::Export => &self.export_path,
            Flow::Import => &self.import_path,
        }
    }

    fn resolve_columns(&self, headers: &StringRecord, path: &Path) -> Result<ColumnIndex, IitiError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| IitiError::Input {
                    reason: format!("{}: missing column '{}'", path.display(), name),
                })
        };
        Ok(ColumnIndex {
            year: find(&self.columns.year)?,
            code: find(&self.columns.code)?,
            value_a: find(&self.columns.value_a)?,
            value_b: find(&self.columns.value_b)?,
            quantity: find(&self.columns.quantity)?,
        })
    }
}

fn field<'r>(record: &'r StringRecord, index: usize, name: &str, line: u64) -> Result<&'r str, IitiError> {
    record.get(index).map(str::trim).ok_or_else(|| IitiError::Input {
        reason: format!("line {line}: missing {name} field"),
    })
}

/// Integral value of `raw`, also in the `2020.0` form written by float columns.
fn parse_integral(raw: &str, min: f64, max: f64) -> Option<f64> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v >= min && v <= max => Some(v),
        _ => None,
    }
}

fn parse_year(raw: &str, line: u64) -> Result<i32, IitiError> {
    if let Ok(year) = raw.parse::<i32>() {
        return Ok(year);
    }
    parse_integral(raw, f64::from(i32::MIN), f64::from(i32::MAX))
        .map(|v| v as i32)
        .ok_or_else(|| IitiError::Input {
            reason: format!("line {line}: invalid year '{raw}'"),
        })
}

fn parse_code(raw: &str, line: u64, code_width: u32) -> Result<u64, IitiError> {
    let code = match raw.parse::<u64>() {
        Ok(code) => code,
        Err(_) => parse_integral(raw, 0.0, 1e19)
            .filter(|v| *v < u64::MAX as f64)
            .map(|v| v as u64)
            .ok_or_else(|| IitiError::Input {
                reason: format!("line {line}: invalid code '{raw}'"),
            })?,
    };
    if code >= max_code(code_width) {
        return Err(IitiError::Input {
            reason: format!("line {line}: code '{raw}' has more than {code_width} digits"),
        });
    }
    Ok(code)
}

/// Blank amounts count as zero.
fn parse_amount(raw: &str, name: &str, line: u64) -> Result<f64, IitiError> {
    if raw.is_empty() {
        return Ok(0.0);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(IitiError::Input {
            reason: format!("line {line}: invalid {name} value '{raw}'"),
        }),
    }
}

impl TradeDataPort for CsvTradeAdapter {
    fn fetch_records(&self, flow: Flow, years: YearRange) -> Result<Vec<TradeRecord>, IitiError> {
        let path = self.path(flow);
        let file = File::open(path).map_err(|e| IitiError::Input {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(file);
        let headers = rdr.headers().map_err(|e| IitiError::Input {
            reason: format!("{}: CSV header error: {}", path.display(), e),
        })?;
        let idx = self.resolve_columns(headers, path)?;

        let mut records = Vec::new();
        let mut skipped = 0usize;

        for result in rdr.records() {
            let record = result.map_err(|e| IitiError::Input {
                reason: format!("{}: CSV parse error: {}", path.display(), e),
            })?;
            let line = record.position().map_or(0, |p| p.line());
            let with_path = |e: IitiError| match e {
                IitiError::Input { reason } => IitiError::Input {
                    reason: format!("{}: {}", path.display(), reason),
                },
                other => other,
            };

            let year = parse_year(field(&record, idx.year, "year", line)?, line).map_err(with_path)?;
            if !years.contains(year) {
                skipped += 1;
                continue;
            }

            let code = parse_code(field(&record, idx.code, "code", line)?, line, self.code_width)
                .map_err(with_path)?;
            let value_a = parse_amount(field(&record, idx.value_a, "value_a", line)?, "value_a", line)
                .map_err(with_path)?;
            let value_b = parse_amount(field(&record, idx.value_b, "value_b", line)?, "value_b", line)
                .map_err(with_path)?;
            let quantity = parse_amount(field(&record, idx.quantity, "quantity", line)?, "quantity", line)
                .map_err(with_path)?;

            records.push(TradeRecord {
                year,
                code,
                value_a,
                value_b,
                quantity,
            });
        }

        tracing::debug!(
            flow = %flow,
            path = %path.display(),
            rows = records.len(),
            skipped,
            "read trade records"
        );
        Ok(records)
    }
}
