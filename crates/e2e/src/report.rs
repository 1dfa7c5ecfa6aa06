//! JSON results file

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::E2eResult;
use crate::runner::SuiteResult;

pub const REPORT_FILE: &str = "cucumber-report.json";

/// Write `result` as pretty JSON into `dir`, returning the file path.
pub fn write_json(result: &SuiteResult, dir: &Path) -> E2eResult<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let path = dir.join(REPORT_FILE);
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(&path, json)?;

    info!("Results written to: {}", path.display());
    Ok(path)
}
