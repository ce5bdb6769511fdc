//! Top-N rows per year by WIITI.
//!
//! Each year is bucketed by row position, partially selected down to `top_n`
//! with `select_nth_unstable_by`, and only that prefix is sorted. Rows with
//! equal WIITI keep their order from the full table.

use crate::domain::index::TradeIndexRow;
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TopNTable {
    pub top_n: usize,
    pub years: BTreeMap<i32, Vec<TradeIndexRow>>,
}

impl TopNTable {
    pub fn year(&self, year: i32) -> &[TradeIndexRow] {
        self.years.get(&year).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All selected rows, years ascending, WIITI descending within a year.
    pub fn rows(&self) -> impl Iterator<Item = &TradeIndexRow> {
        self.years.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.years.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// -0.0 and 0.0 rank as equal
fn rank_key(wiiti: f64) -> f64 {
    if wiiti == 0.0 { 0.0 } else { wiiti }
}

pub fn top_n_by_year(rows: &[TradeIndexRow], top_n: usize) -> TopNTable {
    let mut buckets: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
    for (i, row) in rows.iter().enumerate() {
        buckets.entry(row.year).or_default().push(i);
    }

    let by_rank = |a: &usize, b: &usize| -> Ordering {
        rank_key(rows[*b].wiiti)
            .total_cmp(&rank_key(rows[*a].wiiti))
            .then(a.cmp(b))
    };

    let mut years = BTreeMap::new();
    if top_n == 0 {
        return TopNTable { top_n, years };
    }

    for (year, mut positions) in buckets {
        if positions.len() > top_n {
            positions.select_nth_unstable_by(top_n - 1, by_rank);
            positions.truncate(top_n);
        }
        positions.sort_unstable_by(by_rank);
        years.insert(year, positions.iter().map(|&i| rows[i].clone()).collect());
    }

    TopNTable { top_n, years }
}
