//! Output formatter trait for CLI results.

use anyhow::Result;
use pyzkit_core::ArchiveReport;
use serde::Serialize;
use std::path::Path;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format the result of an archive build
    fn format_archive_result(&self, output_path: &Path, report: &ArchiveReport) -> Result<()>;

    /// Format a dry-run entry listing
    fn format_plan(&self, entries: &[std::path::PathBuf]) -> Result<()>;

    /// Format the interpreter read from an archive
    fn format_interpreter(&self, interpreter: Option<&str>) -> Result<()>;

    /// Format the result of shell-script generation
    fn format_script_result(&self, output_path: &Path) -> Result<()>;

    /// Format warning message
    #[allow(dead_code)]
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    #[allow(dead_code)]
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }
}
