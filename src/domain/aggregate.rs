//! Aggregation of raw trade records by (year, truncated code).
//!
//! Codes are truncated by integer division, never rounded: with a 6-digit
//! code width, code 120345 at 2 digits becomes 12. Records sharing a
//! (year, truncated code) key have their value and quantity columns summed.
//!
//! Rows come out ordered by (year, code). Consumers must not rely on that
//! order, it only keeps repeated runs byte-identical.

use crate::domain::error::IitiError;
use crate::domain::trade_record::TradeRecord;
use std::collections::BTreeMap;

/// Width of Harmonized System codes at their finest level.
pub const DEFAULT_CODE_WIDTH: u32 = 6;

/// Widest code that still leaves room for the `10^width` divisor in a `u64`.
pub const MAX_CODE_WIDTH: u32 = 18;

/// A validated digit resolution for a given code width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Granularity {
    digits: u32,
    code_width: u32,
}

impl Granularity {
    pub fn new(digits: u32, code_width: u32) -> Result<Self, IitiError> {
        if digits == 0 || digits > code_width || code_width > MAX_CODE_WIDTH {
            return Err(IitiError::InvalidGranularity { digits, code_width });
        }
        Ok(Self { digits, code_width })
    }

    /// Resolution over 6-digit HS codes.
    pub fn hs(digits: u32) -> Result<Self, IitiError> {
        Self::new(digits, DEFAULT_CODE_WIDTH)
    }

    pub fn digits(&self) -> u32 {
        self.digits
    }

    pub fn code_width(&self) -> u32 {
        self.code_width
    }

    pub fn divisor(&self) -> u64 {
        10u64.pow(self.code_width - self.digits)
    }

    pub fn truncate(&self, code: u64) -> u64 {
        code / self.divisor()
    }

    /// Whether `code` has at most `code_width` digits.
    pub fn accepts(&self, code: u64) -> bool {
        code < max_code(self.code_width)
    }
}

/// Exclusive upper bound for codes of `code_width` digits.
pub fn max_code(code_width: u32) -> u64 {
    10u64.checked_pow(code_width).unwrap_or(u64::MAX)
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AggregatedRecord {
    pub year: i32,
    pub code: u64,
    #[serde(rename = "dollar")]
    pub value_a_sum: f64,
    #[serde(rename = "rial")]
    pub value_b_sum: f64,
    #[serde(rename = "weight")]
    pub quantity_sum: f64,
}

/// Aggregated rows plus the resolution they were produced at.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedTable {
    pub digits: u32,
    pub code_width: u32,
    pub records: Vec<AggregatedRecord>,
}

#[derive(Default)]
struct Sums {
    value_a: f64,
    value_b: f64,
    quantity: f64,
}

impl Sums {
    fn add(&mut self, value_a: f64, value_b: f64, quantity: f64) {
        self.value_a += value_a;
        self.value_b += value_b;
        self.quantity += quantity;
    }
}

fn collect_rows(groups: BTreeMap<(i32, u64), Sums>) -> Vec<AggregatedRecord> {
    groups
        .into_iter()
        .map(|((year, code), sums)| AggregatedRecord {
            year,
            code,
            value_a_sum: sums.value_a,
            value_b_sum: sums.value_b,
            quantity_sum: sums.quantity,
        })
        .collect()
}

/// Collapse records to one row per (year, truncated code).
pub fn aggregate(records: &[TradeRecord], granularity: Granularity) -> AggregatedTable {
    let mut groups: BTreeMap<(i32, u64), Sums> = BTreeMap::new();

    for record in records {
        let key = (record.year, granularity.truncate(record.code));
        groups
            .entry(key)
            .or_default()
            .add(record.value_a, record.value_b, record.quantity);
    }

    tracing::debug!(
        input_rows = records.len(),
        output_rows = groups.len(),
        digits = granularity.digits(),
        "aggregated trade records"
    );

    AggregatedTable {
        digits: granularity.digits(),
        code_width: granularity.code_width(),
        records: collect_rows(groups),
    }
}

/// Validate `digits` against 6-digit codes and aggregate.
pub fn aggregate_digits(records: &[TradeRecord], digits: u32) -> Result<AggregatedTable, IitiError> {
    Ok(aggregate(records, Granularity::hs(digits)?))
}

impl AggregatedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Re-aggregate to a coarser resolution. `coarsen(self.digits)` is the identity.
    pub fn coarsen(&self, digits: u32) -> Result<AggregatedTable, IitiError> {
        if digits == 0 || digits > self.digits {
            return Err(IitiError::InvalidGranularity {
                digits,
                code_width: self.digits,
            });
        }
        let divisor = 10u64.pow(self.digits - digits);

        let mut groups: BTreeMap<(i32, u64), Sums> = BTreeMap::new();
        for row in &self.records {
            groups.entry((row.year, row.code / divisor)).or_default().add(
                row.value_a_sum,
                row.value_b_sum,
                row.quantity_sum,
            );
        }

        Ok(AggregatedTable {
            digits,
            code_width: self.code_width,
            records: collect_rows(groups),
        })
    }

    /// Column sums: (value_a, value_b, quantity).
    pub fn totals(&self) -> (f64, f64, f64) {
        self.records.iter().fold((0.0, 0.0, 0.0), |acc, r| {
            (
                acc.0 + r.value_a_sum,
                acc.1 + r.value_b_sum,
                acc.2 + r.quantity_sum,
            )
        })
    }
}
