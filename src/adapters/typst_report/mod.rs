//! Typst report generation.
//!
//! Reads a Typst template (the built-in default or a custom file via
//! `[output] template_path`), resolves its `{{PLACEHOLDER}}` markers with
//! markup from `tables`, and writes one `.typ` file per run.

pub mod default_template;
pub mod tables;

use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::error::IitiError;
use crate::domain::index::IndexReport;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;

/// Context for resolving template placeholders.
pub struct ReportContext<'a> {
    pub name: &'a str,
    pub report: &'a IndexReport,
    pub generated: NaiveDate,
}

/// Resolve all `{{PLACEHOLDER}}`s in `template`.
pub fn resolve(template: &str, ctx: &ReportContext) -> String {
    template
        .replace("{{TITLE}}", &tables::escape(ctx.name))
        .replace("{{GENERATED}}", &ctx.generated.format("%Y-%m-%d").to_string())
        .replace(
            "{{RUN_SUMMARY}}",
            &tables::format_run_summary(ctx.report, ctx.name),
        )
        .replace(
            "{{YEAR_SUMMARY}}",
            &tables::format_year_summary(&ctx.report.summaries),
        )
        .replace("{{TOP_TABLES}}", &tables::format_top_tables(&ctx.report.top))
}

#[derive(Default)]
pub struct TypstReportAdapter {
    template: Option<String>,
}

impl TypstReportAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(template: String) -> Self {
        Self {
            template: Some(template),
        }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, IitiError> {
        match config
            .get_string("output", "template_path")
            .filter(|s| !s.trim().is_empty())
        {
            Some(path) => {
                let content = fs::read_to_string(&path).map_err(|e| IitiError::ConfigInvalid {
                    section: "output".into(),
                    key: "template_path".into(),
                    reason: format!("failed to read {}: {}", path, e),
                })?;
                Ok(Self::with_template(content))
            }
            None => Ok(Self::new()),
        }
    }

    pub fn report_file(name: &str) -> String {
        format!("IITI_Report_{name}.typ")
    }

    pub fn render(&self, report: &IndexReport, name: &str, generated: NaiveDate) -> String {
        let template = self
            .template
            .as_deref()
            .unwrap_or(default_template::template());
        resolve(
            template,
            &ReportContext {
                name,
                report,
                generated,
            },
        )
    }
}

impl ReportPort for TypstReportAdapter {
    fn write(
        &self,
        report: &IndexReport,
        name: &str,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, IitiError> {
        let output_error = |path: &Path, e: std::io::Error| IitiError::Output {
            reason: format!("failed to write {}: {}", path.display(), e),
        };
        fs::create_dir_all(output_dir).map_err(|e| output_error(output_dir, e))?;

        let path = output_dir.join(Self::report_file(name));
        let content = self.render(report, name, chrono::Local::now().date_naive());
        fs::write(&path, content).map_err(|e| output_error(&path, e))?;
        Ok(vec![path])
    }
}
