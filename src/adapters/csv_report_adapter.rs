//! CSV report adapter implementing ReportPort.
//!
//! Writes the three result tables of a run:
//! - `IITI_Analysis_Results_<name>.csv`: per-year summary
//! - `Top_<n>_WIITI_<name>.csv`: top rows per year by WIITI
//! - `Trade_Data_<name>.csv`: the full merged table
//!
//! Tables with no rows produce empty files.

use crate::domain::aggregate::AggregatedTable;
use crate::domain::error::IitiError;
use crate::domain::index::IndexReport;
use crate::ports::report_port::ReportPort;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn summary_file(name: &str) -> String {
        format!("IITI_Analysis_Results_{name}.csv")
    }

    pub fn top_file(name: &str, top_n: usize) -> String {
        format!("Top_{top_n}_WIITI_{name}.csv")
    }

    pub fn trade_file(name: &str) -> String {
        format!("Trade_Data_{name}.csv")
    }
}

fn output_error(path: &Path, e: impl std::fmt::Display) -> IitiError {
    IitiError::Output {
        reason: format!("failed to write {}: {}", path.display(), e),
    }
}

/// Serialize `rows` as CSV with a header taken from the first row.
pub fn write_rows<'a, W, T, I>(writer: W, rows: I) -> Result<(), csv::Error>
where
    W: Write,
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_file<'a, T, I>(path: &Path, rows: I) -> Result<(), IitiError>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let file = File::create(path).map_err(|e| output_error(path, e))?;
    write_rows(file, rows).map_err(|e| output_error(path, e))
}

/// Write an aggregated table with the default input column names, so the
/// result can be read back as trade data at its own resolution.
pub fn write_aggregated<W: Write>(table: &AggregatedTable, writer: W) -> Result<(), IitiError> {
    write_rows(writer, &table.records).map_err(|e| IitiError::Output {
        reason: format!("failed to write aggregated table: {e}"),
    })
}

impl ReportPort for CsvReportAdapter {
    fn write(
        &self,
        report: &IndexReport,
        name: &str,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, IitiError> {
        fs::create_dir_all(output_dir).map_err(|e| output_error(output_dir, e))?;

        let summary_path = output_dir.join(Self::summary_file(name));
        write_file(&summary_path, &report.summaries)?;

        let top_path = output_dir.join(Self::top_file(name, report.top.top_n));
        write_file(&top_path, report.top.rows())?;

        let trade_path = output_dir.join(Self::trade_file(name));
        write_file(&trade_path, &report.rows)?;

        Ok(vec![summary_path, top_path, trade_path])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregate::AggregatedRecord;
    use crate::domain::index::compute_indices;
    use tempfile::TempDir;

    fn table(records: Vec<AggregatedRecord>) -> AggregatedTable {
        AggregatedTable {
            digits: 2,
            code_width: 6,
            records,
        }
    }

    fn agg(year: i32, code: u64, value: f64) -> AggregatedRecord {
        AggregatedRecord {
            year,
            code,
            value_a_sum: value,
            value_b_sum: value * 2.0,
            quantity_sum: 1.0,
        }
    }

    fn sample_report() -> IndexReport {
        let exports = table(vec![agg(2020, 12, 100.0), agg(2020, 27, 10.0)]);
        let imports = table(vec![agg(2020, 12, 60.0)]);
        compute_indices(&exports, &imports, 1).unwrap()
    }

    #[test]
    fn file_names_follow_run_name() {
        assert_eq!(CsvReportAdapter::summary_file("HS2"), "IITI_Analysis_Results_HS2.csv");
        assert_eq!(CsvReportAdapter::top_file("HS4", 10), "Top_10_WIITI_HS4.csv");
        assert_eq!(CsvReportAdapter::trade_file("HS2"), "Trade_Data_HS2.csv");
    }

    #[test]
    fn writes_three_tables() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("results");
        let written = CsvReportAdapter.write(&sample_report(), "HS2", &out).unwrap();

        assert_eq!(written.len(), 3);
        assert!(written.iter().all(|p| p.exists()));

        let summary = fs::read_to_string(out.join("IITI_Analysis_Results_HS2.csv")).unwrap();
        let mut lines = summary.lines();
        assert_eq!(lines.next(), Some("year,IITI,WIITI,MIITI,codes"));
        assert!(lines.next().unwrap().starts_with("2020,"));

        let top = fs::read_to_string(out.join("Top_1_WIITI_HS2.csv")).unwrap();
        assert_eq!(top.lines().count(), 2);
        assert!(top.lines().nth(1).unwrap().starts_with("2020,12,"));

        let trade = fs::read_to_string(out.join("Trade_Data_HS2.csv")).unwrap();
        let header = trade.lines().next().unwrap();
        assert!(header.starts_with("year,code,export,import,"));
        assert!(header.contains("dExport,dImport,MIITI"));
        assert!(header.contains("export_secondary,import_secondary,export_quantity,import_quantity"));
        assert_eq!(trade.lines().count(), 3);
    }

    #[test]
    fn one_sided_rows_leave_pass_through_columns_blank() {
        let dir = TempDir::new().unwrap();
        CsvReportAdapter.write(&sample_report(), "HS2", dir.path()).unwrap();
        let trade = fs::read_to_string(dir.path().join("Trade_Data_HS2.csv")).unwrap();
        // code 27 has no import row
        let row = trade.lines().find(|l| l.starts_with("2020,27,")).unwrap();
        assert!(row.starts_with("2020,27,10.0,0.0,20.0,,1.0,,"));
    }

    #[test]
    fn empty_report_writes_empty_files() {
        let dir = TempDir::new().unwrap();
        let report = compute_indices(&table(vec![]), &table(vec![]), 5).unwrap();
        let written = CsvReportAdapter.write(&report, "HS2", dir.path()).unwrap();
        for path in written {
            assert_eq!(fs::read_to_string(path).unwrap(), "");
        }
    }

    #[test]
    fn aggregated_table_uses_input_column_names() {
        let mut buf = Vec::new();
        write_aggregated(&table(vec![agg(2020, 12, 1.5)]), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "year,code,dollar,rial,weight\n2020,12,1.5,3.0,1.0\n");
    }
}
