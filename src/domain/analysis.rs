//! Analysis run: load both flows once, then aggregate, index and report at
//! every requested digit level.

use crate::domain::aggregate::{aggregate, max_code, Granularity};
use crate::domain::error::IitiError;
use crate::domain::index::{compute_indices_with, IndexOptions, IndexReport};
use crate::domain::trade_record::{Flow, TradeRecord, ValueField, YearRange};
use crate::ports::data_port::TradeDataPort;
use crate::ports::report_port::ReportPort;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Typst,
    Both,
}

impl OutputFormat {
    pub fn wants_csv(&self) -> bool {
        matches!(self, OutputFormat::Csv | OutputFormat::Both)
    }

    pub fn wants_typst(&self) -> bool {
        matches!(self, OutputFormat::Typst | OutputFormat::Both)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "typst" | "typ" => Ok(OutputFormat::Typst),
            "both" | "all" => Ok(OutputFormat::Both),
            other => Err(format!("unknown output format '{other}' (expected csv, typst or both)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Typst => "typst",
            OutputFormat::Both => "both",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub digit_levels: Vec<u32>,
    pub code_width: u32,
    pub top_n: usize,
    pub value_field: ValueField,
    pub years: YearRange,
    pub output_dir: PathBuf,
    pub name_prefix: String,
    pub format: OutputFormat,
}

impl AnalysisConfig {
    /// Run name for one level, e.g. `HS4`.
    pub fn run_name(&self, digits: u32) -> String {
        format!("{}{}", self.name_prefix, digits)
    }

    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            top_n: self.top_n,
            value_field: self.value_field,
        }
    }

    pub fn granularities(&self) -> Result<Vec<Granularity>, IitiError> {
        self.digit_levels
            .iter()
            .map(|&d| Granularity::new(d, self.code_width))
            .collect()
    }
}

/// Result of one digit level.
#[derive(Debug, Clone)]
pub struct LevelOutcome {
    pub name: String,
    pub report: IndexReport,
    pub written: Vec<PathBuf>,
}

/// Reject codes with more digits than `code_width`, which would otherwise
/// truncate to a code wider than the requested resolution.
fn check_code_width(records: &[TradeRecord], flow: Flow, code_width: u32) -> Result<(), IitiError> {
    let limit = max_code(code_width);
    match records.iter().find(|r| r.code >= limit) {
        Some(r) => Err(IitiError::Input {
            reason: format!(
                "{flow} code {} in {} has more than {code_width} digits",
                r.code, r.year
            ),
        }),
        None => Ok(()),
    }
}

/// Compute the reports for every configured level without writing anything.
pub fn compute_levels(
    data_port: &dyn TradeDataPort,
    config: &AnalysisConfig,
) -> Result<Vec<(String, IndexReport)>, IitiError> {
    let granularities = config.granularities()?;
    if config.top_n == 0 {
        return Err(IitiError::InvalidTopN { top_n: 0 });
    }

    let exports = data_port.fetch_records(Flow::Export, config.years)?;
    let imports = data_port.fetch_records(Flow::Import, config.years)?;
    check_code_width(&exports, Flow::Export, config.code_width)?;
    check_code_width(&imports, Flow::Import, config.code_width)?;
    tracing::info!(
        exports = exports.len(),
        imports = imports.len(),
        "loaded trade records"
    );

    let options = config.index_options();
    granularities
        .into_iter()
        .map(|granularity| {
            let export_table = aggregate(&exports, granularity);
            let import_table = aggregate(&imports, granularity);
            let report = compute_indices_with(&export_table, &import_table, &options)?;
            Ok((config.run_name(granularity.digits()), report))
        })
        .collect()
}

/// Compute every level and hand each report to all `report_ports`.
pub fn run_analysis(
    data_port: &dyn TradeDataPort,
    report_ports: &[&dyn ReportPort],
    config: &AnalysisConfig,
) -> Result<Vec<LevelOutcome>, IitiError> {
    let levels = compute_levels(data_port, config)?;

    let mut outcomes = Vec::with_capacity(levels.len());
    for (name, report) in levels {
        let mut written = Vec::new();
        for port in report_ports {
            written.extend(port.write(&report, &name, &config.output_dir)?);
        }
        tracing::info!(name = %name, files = written.len(), "wrote analysis outputs");
        outcomes.push(LevelOutcome {
            name,
            report,
            written,
        });
    }
    Ok(outcomes)
}
