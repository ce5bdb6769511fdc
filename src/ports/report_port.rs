//! Report generation port trait.

use crate::domain::error::IitiError;
use crate::domain::index::IndexReport;
use std::path::{Path, PathBuf};

/// Port for persisting the results of one index run.
pub trait ReportPort {
    /// Write `report` under `output_dir`, returning the paths created.
    fn write(
        &self,
        report: &IndexReport,
        name: &str,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, IitiError>;
}
