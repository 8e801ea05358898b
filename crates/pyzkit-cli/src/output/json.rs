//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use pyzkit_core::ArchiveReport;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;
use std::path::PathBuf;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_archive_result(&self, output_path: &Path, report: &ArchiveReport) -> Result<()> {
        #[derive(Serialize)]
        struct ArchiveOutput {
            output_path: String,
            files_added: usize,
            directories_added: usize,
            files_skipped: usize,
            bytes_written: u64,
            archive_size: u64,
            compression_ratio: f64,
            duration_ms: u128,
        }

        let data = ArchiveOutput {
            output_path: output_path.display().to_string(),
            files_added: report.files_added,
            directories_added: report.directories_added,
            files_skipped: report.files_skipped,
            bytes_written: report.bytes_written,
            archive_size: report.archive_size,
            compression_ratio: report.compression_ratio(),
            duration_ms: report.duration.as_millis(),
        };

        let output = JsonOutput::success("create-archive", data);
        Self::output(&output)
    }

    fn format_plan(&self, entries: &[PathBuf]) -> Result<()> {
        #[derive(Serialize)]
        struct PlanOutput {
            entries: Vec<String>,
        }

        let data = PlanOutput {
            entries: entries
                .iter()
                .map(|entry| entry.display().to_string())
                .collect(),
        };

        let output = JsonOutput::success("dry-run", data);
        Self::output(&output)
    }

    fn format_interpreter(&self, interpreter: Option<&str>) -> Result<()> {
        #[derive(Serialize)]
        struct InterpreterOutput {
            interpreter: Option<String>,
        }

        let data = InterpreterOutput {
            interpreter: interpreter.map(str::to_owned),
        };

        let output = JsonOutput::success("info", data);
        Self::output(&output)
    }

    fn format_script_result(&self, output_path: &Path) -> Result<()> {
        #[derive(Serialize)]
        struct ScriptOutput {
            output_path: String,
        }

        let data = ScriptOutput {
            output_path: output_path.display().to_string(),
        };

        let output = JsonOutput::success("create-shell-script", data);
        Self::output(&output)
    }

    fn format_warning(&self, message: &str) {
        #[derive(Serialize)]
        struct WarningData {
            message: String,
        }

        let output = JsonOutput::success(
            "warning",
            WarningData {
                message: message.to_string(),
            },
        );
        let _ = Self::output(&output);
    }
}
