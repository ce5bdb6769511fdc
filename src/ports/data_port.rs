//! Trade data access port trait.

use crate::domain::error::IitiError;
use crate::domain::trade_record::{Flow, TradeRecord, YearRange};

pub trait TradeDataPort {
    fn fetch_records(&self, flow: Flow, years: YearRange) -> Result<Vec<TradeRecord>, IitiError>;

    /// First year, last year and record count, `None` when the flow is empty.
    fn get_data_range(&self, flow: Flow) -> Result<Option<(i32, i32, usize)>, IitiError> {
        let records = self.fetch_records(flow, YearRange::all())?;
        let first = records.iter().map(|r| r.year).min();
        let last = records.iter().map(|r| r.year).max();
        Ok(first.zip(last).map(|(first, last)| (first, last, records.len())))
    }
}
