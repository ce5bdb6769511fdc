//! Index engine: outer merge of export/import tables and IITI, WIITI, MIITI.
//!
//! For one (year, code) row:
//! - `IITI  = 1 - |export - import| / (export + import)`, 0 when the sum is 0
//! - `weight = (export + import) / (year export total + year import total)`,
//!   0 when the year has no trade
//! - `WIITI = IITI * weight`
//! - `MIITI = 1 - |dExport - dImport| / (|dExport| + |dImport|)` on first
//!   differences within a code, 0 when both differences are 0
//!
//! Differences are taken between consecutive rows of the same code ordered by
//! year, so a code absent for a year is differenced against the last year it
//! traded. The first row of every code has zero differences.

use crate::domain::aggregate::{AggregatedRecord, AggregatedTable};
use crate::domain::error::IitiError;
use crate::domain::ranking::{top_n_by_year, TopNTable};
use crate::domain::summary::{summarize_by_year, YearSummary};
use crate::domain::trade_record::ValueField;
use std::collections::BTreeMap;

pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TradeIndexRow {
    pub year: i32,
    pub code: u64,
    pub export: f64,
    pub import: f64,
    /// Non-selected value column of the export side, `None` if it had no row.
    pub export_secondary: Option<f64>,
    pub import_secondary: Option<f64>,
    pub export_quantity: Option<f64>,
    pub import_quantity: Option<f64>,
    pub diff: f64,
    #[serde(rename = "IITI")]
    pub iiti: f64,
    #[serde(rename = "export_total")]
    pub year_export_total: f64,
    #[serde(rename = "import_total")]
    pub year_import_total: f64,
    pub weight: f64,
    #[serde(rename = "WIITI")]
    pub wiiti: f64,
    #[serde(rename = "dExport")]
    pub d_export: f64,
    #[serde(rename = "dImport")]
    pub d_import: f64,
    #[serde(rename = "MIITI")]
    pub miiti: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexOptions {
    pub top_n: usize,
    pub value_field: ValueField,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            value_field: ValueField::A,
        }
    }
}

/// Everything one engine run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexReport {
    pub digits: u32,
    pub summaries: Vec<YearSummary>,
    pub top: TopNTable,
    /// Full merged table ordered by (code, year).
    pub rows: Vec<TradeIndexRow>,
}

impl IndexReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn iiti(export: f64, import: f64) -> f64 {
    let total = export + import;
    if total == 0.0 {
        return 0.0;
    }
    1.0 - (export - import).abs() / total
}

pub fn miiti(d_export: f64, d_import: f64) -> f64 {
    if d_export == 0.0 && d_import == 0.0 {
        return 0.0;
    }
    1.0 - (d_export - d_import).abs() / (d_export.abs() + d_import.abs())
}

fn share(part: f64, whole: f64) -> f64 {
    if whole == 0.0 { 0.0 } else { part / whole }
}

#[derive(Debug, Clone, Copy)]
struct Side {
    value: f64,
    secondary: f64,
    quantity: f64,
}

impl Side {
    fn from_record(record: &AggregatedRecord, field: ValueField) -> Self {
        let (value, secondary) = match field {
            ValueField::A => (record.value_a_sum, record.value_b_sum),
            ValueField::B => (record.value_b_sum, record.value_a_sum),
        };
        Self {
            value,
            secondary,
            quantity: record.quantity_sum,
        }
    }
}

type MergedSides = (Option<Side>, Option<Side>);

/// Outer join keyed by (code, year) so iteration follows the differencing order.
fn outer_merge(
    exports: &AggregatedTable,
    imports: &AggregatedTable,
    field: ValueField,
) -> BTreeMap<(u64, i32), MergedSides> {
    let mut merged: BTreeMap<(u64, i32), MergedSides> = BTreeMap::new();
    for record in &exports.records {
        let entry = merged.entry((record.code, record.year)).or_default();
        entry.0 = Some(Side::from_record(record, field));
    }
    for record in &imports.records {
        let entry = merged.entry((record.code, record.year)).or_default();
        entry.1 = Some(Side::from_record(record, field));
    }
    merged
}

fn year_totals(merged: &BTreeMap<(u64, i32), MergedSides>) -> BTreeMap<i32, (f64, f64)> {
    let mut totals: BTreeMap<i32, (f64, f64)> = BTreeMap::new();
    for (&(_, year), (export, import)) in merged {
        let entry = totals.entry(year).or_default();
        entry.0 += export.map_or(0.0, |s| s.value);
        entry.1 += import.map_or(0.0, |s| s.value);
    }
    totals
}

/// Build the full per-(year, code) table, ordered by (code, year).
pub fn build_index_rows(
    exports: &AggregatedTable,
    imports: &AggregatedTable,
    field: ValueField,
) -> Vec<TradeIndexRow> {
    let merged = outer_merge(exports, imports, field);
    let totals = year_totals(&merged);

    let mut rows = Vec::with_capacity(merged.len());
    let mut previous: Option<(u64, f64, f64)> = None;
    let mut degenerate = 0usize;

    for (&(code, year), (export_side, import_side)) in &merged {
        let export = export_side.map_or(0.0, |s| s.value);
        let import = import_side.map_or(0.0, |s| s.value);
        let (year_export_total, year_import_total) =
            totals.get(&year).copied().unwrap_or_default();

        if export + import == 0.0 {
            degenerate += 1;
        }

        let iiti = iiti(export, import);
        let weight = share(export + import, year_export_total + year_import_total);

        let (d_export, d_import) = match previous {
            Some((prev_code, prev_export, prev_import)) if prev_code == code => {
                (export - prev_export, import - prev_import)
            }
            _ => (0.0, 0.0),
        };
        previous = Some((code, export, import));

        rows.push(TradeIndexRow {
            year,
            code,
            export,
            import,
            export_secondary: export_side.map(|s| s.secondary),
            import_secondary: import_side.map(|s| s.secondary),
            export_quantity: export_side.map(|s| s.quantity),
            import_quantity: import_side.map(|s| s.quantity),
            diff: (export - import).abs(),
            iiti,
            year_export_total,
            year_import_total,
            weight,
            wiiti: iiti * weight,
            d_export,
            d_import,
            miiti: miiti(d_export, d_import),
        });
    }

    if degenerate > 0 {
        tracing::debug!(rows = degenerate, "rows with zero total trade, IITI set to 0");
    }

    rows
}

/// Run the engine over two aggregated tables using the dollar column.
pub fn compute_indices(
    flow_a: &AggregatedTable,
    flow_b: &AggregatedTable,
    top_n: usize,
) -> Result<IndexReport, IitiError> {
    compute_indices_with(
        flow_a,
        flow_b,
        &IndexOptions {
            top_n,
            ..IndexOptions::default()
        },
    )
}

pub fn compute_indices_with(
    flow_a: &AggregatedTable,
    flow_b: &AggregatedTable,
    options: &IndexOptions,
) -> Result<IndexReport, IitiError> {
    if options.top_n == 0 {
        return Err(IitiError::InvalidTopN { top_n: 0 });
    }
    if flow_a.digits != flow_b.digits {
        return Err(IitiError::ResolutionMismatch {
            left: flow_a.digits,
            right: flow_b.digits,
        });
    }

    let rows = build_index_rows(flow_a, flow_b, options.value_field);
    let summaries = summarize_by_year(&rows);
    let top = top_n_by_year(&rows, options.top_n);

    tracing::info!(
        digits = flow_a.digits,
        rows = rows.len(),
        years = summaries.len(),
        "computed trade indices"
    );

    Ok(IndexReport {
        digits: flow_a.digits,
        summaries,
        top,
        rows,
    })
}
