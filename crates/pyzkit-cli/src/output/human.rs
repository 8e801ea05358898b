//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use pyzkit_core::ArchiveReport;
use std::path::Path;
use std::path::PathBuf;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        #[allow(clippy::cast_precision_loss)]
        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_archive_result(&self, output_path: &Path, report: &ArchiveReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_colors {
            let _ = self.term.write_line(&format!(
                "{} Created {}",
                style("✓").green().bold(),
                output_path.display()
            ));
        } else {
            let _ = self
                .term
                .write_line(&format!("Created {}", output_path.display()));
        }

        let _ = self
            .term
            .write_line(&format!("  Files added: {}", report.files_added));
        if report.files_skipped > 0 {
            let _ = self
                .term
                .write_line(&format!("  Files skipped: {}", report.files_skipped));
        }
        let _ = self.term.write_line(&format!(
            "  Archive size: {}",
            Self::format_size(report.archive_size)
        ));

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Directories: {}", report.directories_added));
            let _ = self.term.write_line(&format!(
                "  Uncompressed: {}",
                Self::format_size(report.bytes_written)
            ));
            let _ = self
                .term
                .write_line(&format!("  Duration: {:?}", report.duration));
        }

        Ok(())
    }

    fn format_plan(&self, entries: &[PathBuf]) -> Result<()> {
        for entry in entries {
            let _ = self.term.write_line(&entry.display().to_string());
        }
        if !self.quiet {
            let _ = self
                .term
                .write_line(&format!("{} entries (dry run, nothing written)", entries.len()));
        }
        Ok(())
    }

    fn format_interpreter(&self, interpreter: Option<&str>) -> Result<()> {
        let _ = self.term.write_line(&format!(
            "Interpreter: {}",
            interpreter.unwrap_or("<none>")
        ));
        Ok(())
    }

    fn format_script_result(&self, output_path: &Path) -> Result<()> {
        if self.quiet {
            return Ok(());
        }
        if self.use_colors {
            let _ = self.term.write_line(&format!(
                "{} Created {}",
                style("✓").green().bold(),
                output_path.display()
            ));
        } else {
            let _ = self
                .term
                .write_line(&format!("Created {}", output_path.display()));
        }
        Ok(())
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.term.write_line(&format!("Warning: {message}"));
        }
    }
}
