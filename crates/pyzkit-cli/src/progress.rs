//! Spinner shown while dependency installation runs.

use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use std::time::Duration;

/// Indeterminate spinner for pip runs, cleaned up on drop.
///
/// pip's output is captured by the installer, so without this the terminal
/// sits silent for the duration of the install.
pub struct InstallSpinner {
    bar: ProgressBar,
}

impl InstallSpinner {
    /// Creates and starts a spinner with the given message.
    #[must_use]
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stdout().is_term()
    }
}

impl Drop for InstallSpinner {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}
