//! Per-year summary of the index table.

use crate::domain::index::TradeIndexRow;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct YearSummary {
    pub year: i32,
    #[serde(rename = "IITI")]
    pub mean_iiti: f64,
    #[serde(rename = "WIITI")]
    pub total_wiiti: f64,
    #[serde(rename = "MIITI")]
    pub mean_miiti: f64,
    pub codes: usize,
}

#[derive(Default)]
struct YearAccumulator {
    count: usize,
    iiti: f64,
    wiiti: f64,
    miiti: f64,
}

/// Mean IITI, summed WIITI and mean MIITI for every year, years ascending.
pub fn summarize_by_year(rows: &[TradeIndexRow]) -> Vec<YearSummary> {
    let mut years: BTreeMap<i32, YearAccumulator> = BTreeMap::new();

    for row in rows {
        let acc = years.entry(row.year).or_default();
        acc.count += 1;
        acc.iiti += row.iiti;
        acc.wiiti += row.wiiti;
        acc.miiti += row.miiti;
    }

    years
        .into_iter()
        .map(|(year, acc)| {
            let n = acc.count as f64;
            YearSummary {
                year,
                mean_iiti: acc.iiti / n,
                total_wiiti: acc.wiiti,
                mean_miiti: acc.miiti / n,
                codes: acc.count,
            }
        })
        .collect()
}
