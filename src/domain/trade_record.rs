//! Raw trade records and flow selection.

use std::fmt;
use std::str::FromStr;

/// One customs transaction line at the finest code granularity.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub year: i32,
    pub code: u64,
    /// Dollar value.
    pub value_a: f64,
    /// Local-currency (rial) value.
    pub value_b: f64,
    /// Shipped weight.
    pub quantity: f64,
}

/// Direction of a trade dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    Export,
    Import,
}

impl Flow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flow::Export => "export",
            Flow::Import => "import",
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "export" | "exports" => Ok(Flow::Export),
            "import" | "imports" => Ok(Flow::Import),
            other => Err(format!("unknown flow '{other}' (expected export or import)")),
        }
    }
}

/// Which monetary column feeds the indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueField {
    #[default]
    A,
    B,
}

impl FromStr for ValueField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "a" | "dollar" | "value_a" => Ok(ValueField::A),
            "b" | "rial" | "value_b" => Ok(ValueField::B),
            other => Err(format!(
                "unknown value column '{other}' (expected dollar/a or rial/b)"
            )),
        }
    }
}

/// Inclusive year filter applied when loading records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct YearRange {
    pub start: Option<i32>,
    pub end: Option<i32>,
}

impl YearRange {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn contains(&self, year: i32) -> bool {
        self.start.is_none_or(|s| year >= s) && self.end.is_none_or(|e| year <= e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_parses_case_insensitively() {
        assert_eq!("Export".parse::<Flow>(), Ok(Flow::Export));
        assert_eq!(" imports ".parse::<Flow>(), Ok(Flow::Import));
        assert!("transit".parse::<Flow>().is_err());
    }

    #[test]
    fn value_field_aliases() {
        assert_eq!("dollar".parse::<ValueField>(), Ok(ValueField::A));
        assert_eq!("B".parse::<ValueField>(), Ok(ValueField::B));
        assert_eq!("rial".parse::<ValueField>(), Ok(ValueField::B));
        assert!("euro".parse::<ValueField>().is_err());
    }

    #[test]
    fn year_range_bounds_are_inclusive() {
        let range = YearRange {
            start: Some(2015),
            end: Some(2018),
        };
        assert!(!range.contains(2014));
        assert!(range.contains(2015));
        assert!(range.contains(2018));
        assert!(!range.contains(2019));
    }

    #[test]
    fn open_year_range_contains_everything() {
        assert!(YearRange::all().contains(i32::MIN));
        assert!(YearRange::all().contains(i32::MAX));
        let from = YearRange {
            start: Some(2000),
            end: None,
        };
        assert!(from.contains(3000));
        assert!(!from.contains(1999));
    }
}
