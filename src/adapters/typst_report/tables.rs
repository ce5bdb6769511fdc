//! Typst table markup for index reports.
//!
//! Provides:
//! - Run overview (resolution, year span, row counts)
//! - Per-year summary table with IITI shading
//! - One top-N WIITI table per year

use crate::domain::index::IndexReport;
use crate::domain::ranking::TopNTable;
use crate::domain::summary::YearSummary;

pub fn format_run_summary(report: &IndexReport, name: &str) -> String {
    let years = match (report.summaries.first(), report.summaries.last()) {
        (Some(first), Some(last)) if first.year == last.year => first.year.to_string(),
        (Some(first), Some(last)) => format!("{}–{}", first.year, last.year),
        _ => "none".to_string(),
    };

    let mut out = String::from("#table(\n  columns: 2,\n  align: (left, right),\n");
    out.push_str(&format!("  [*Run*], [{}],\n", escape(name)));
    out.push_str(&format!("  [*Code digits*], [{}],\n", report.digits));
    out.push_str(&format!("  [*Years*], [{}],\n", years));
    out.push_str(&format!("  [*Year/code rows*], [{}],\n", report.rows.len()));
    out.push_str(&format!("  [*Top N*], [{}],\n", report.top.top_n));
    out.push_str(")\n\n");
    out
}

/// Returns (fill_color, needs_white_text) for an index value in [0, 1].
fn index_color(value: f64) -> (&'static str, bool) {
    if value >= 0.75 {
        ("rgb(\"#006400\")", true)
    } else if value >= 0.5 {
        ("rgb(\"#228B22\")", true)
    } else if value >= 0.25 {
        ("rgb(\"#90EE90\")", false)
    } else if value > 0.0 {
        ("rgb(\"#E0FFE0\")", false)
    } else {
        ("rgb(\"#FFFFFF\")", false)
    }
}

fn format_index_cell(value: f64) -> String {
    let (color, white_text) = index_color(value);
    if white_text {
        format!("box(fill: {}, text(fill: white, [{:.4}]))", color, value)
    } else {
        format!("box(fill: {}, [{:.4}])", color, value)
    }
}

pub fn format_year_summary(summaries: &[YearSummary]) -> String {
    if summaries.is_empty() {
        return "// No yearly data available\n".to_string();
    }

    let mut output = String::new();
    output.push_str("#table(\n");
    output.push_str("  columns: 5,\n");
    output.push_str("  align: (left, right, right, right, right),\n");
    output.push_str("  [*Year*], [*Codes*], [*Mean IITI*], [*Total WIITI*], [*Mean MIITI*],\n");

    for s in summaries {
        output.push_str(&format!(
            "  [{}], [{}], {}, {}, [{:.4}],\n",
            s.year,
            s.codes,
            format_index_cell(s.mean_iiti),
            format_index_cell(s.total_wiiti),
            s.mean_miiti
        ));
    }

    output.push_str(")\n\n");
    output
}

pub fn format_top_tables(top: &TopNTable) -> String {
    if top.is_empty() {
        return "// No ranked rows\n".to_string();
    }

    let mut output = String::new();
    for (year, rows) in &top.years {
        output.push_str(&format!("=== {}\n\n", year));
        output.push_str("#table(\n");
        output.push_str("  columns: 7,\n");
        output.push_str("  align: (right, left, right, right, right, right, right),\n");
        output.push_str("  [*#*], [*Code*], [*Export*], [*Import*], [*IITI*], [*Weight*], [*WIITI*],\n");

        for (i, row) in rows.iter().enumerate() {
            output.push_str(&format!(
                "  [{}], [{}], [{:.2}], [{:.2}], {}, [{:.4}], [{:.4}],\n",
                i + 1,
                row.code,
                row.export,
                row.import,
                format_index_cell(row.iiti),
                row.weight,
                row.wiiti
            ));
        }

        output.push_str(")\n\n");
    }
    output
}

/// Escape characters Typst treats as markup inside content brackets.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '[' | ']' | '#' | '*' | '_' | '\\' | '$' | '@' | '<' | '>') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
