#![allow(dead_code)]

use iiti::domain::aggregate::{AggregatedRecord, AggregatedTable};
use iiti::domain::error::IitiError;
use iiti::domain::index::IndexReport;
pub use iiti::domain::trade_record::{Flow, TradeRecord, YearRange};
use iiti::ports::data_port::TradeDataPort;
use iiti::ports::report_port::ReportPort;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct MockDataPort {
    pub data: HashMap<Flow, Vec<TradeRecord>>,
    pub errors: HashMap<Flow, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_records(mut self, flow: Flow, records: Vec<TradeRecord>) -> Self {
        self.data.insert(flow, records);
        self
    }

    pub fn with_error(mut self, flow: Flow, reason: &str) -> Self {
        self.errors.insert(flow, reason.to_string());
        self
    }
}

impl TradeDataPort for MockDataPort {
    fn fetch_records(&self, flow: Flow, years: YearRange) -> Result<Vec<TradeRecord>, IitiError> {
        if let Some(reason) = self.errors.get(&flow) {
            return Err(IitiError::Input {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(&flow)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| years.contains(r.year))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Report port that remembers which runs it was handed.
pub struct RecordingReport {
    pub runs: RefCell<Vec<(String, IndexReport)>>,
}

impl RecordingReport {
    pub fn new() -> Self {
        Self {
            runs: RefCell::new(Vec::new()),
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.runs.borrow().iter().map(|(n, _)| n.clone()).collect()
    }
}

impl ReportPort for RecordingReport {
    fn write(
        &self,
        report: &IndexReport,
        name: &str,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, IitiError> {
        self.runs
            .borrow_mut()
            .push((name.to_string(), report.clone()));
        Ok(vec![output_dir.join(format!("{name}.mock"))])
    }
}

pub struct FailingReport;

impl ReportPort for FailingReport {
    fn write(&self, _: &IndexReport, name: &str, _: &Path) -> Result<Vec<PathBuf>, IitiError> {
        Err(IitiError::Output {
            reason: format!("cannot write {name}"),
        })
    }
}

/// Record with dollar `value`, rial ten times that and unit weight.
pub fn rec(year: i32, code: u64, value: f64) -> TradeRecord {
    TradeRecord {
        year,
        code,
        value_a: value,
        value_b: value * 10.0,
        quantity: 1.0,
    }
}

pub fn agg(year: i32, code: u64, value: f64) -> AggregatedRecord {
    AggregatedRecord {
        year,
        code,
        value_a_sum: value,
        value_b_sum: value * 10.0,
        quantity_sum: 1.0,
    }
}

pub fn table(digits: u32, records: Vec<AggregatedRecord>) -> AggregatedTable {
    AggregatedTable {
        digits,
        code_width: 6,
        records,
    }
}
