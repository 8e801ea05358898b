//! Dependency installation into a staging directory.
//!
//! The bundler never talks to pip directly; it goes through the
//! [`DependencyInstaller`] trait so tests can substitute a recording
//! implementation.

use crate::PackError;
use crate::Result;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;
use tracing::info;

/// What to install: explicit package specifiers or a requirements file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallRequest<'a> {
    /// Package specifiers, upgraded to their latest compatible versions.
    Packages(&'a [String]),
    /// A pip requirements file.
    Requirements(&'a Path),
}

/// Installs Python packages into a target directory.
pub trait DependencyInstaller {
    /// Performs one install run into `target_dir`.
    ///
    /// # Errors
    ///
    /// Fails if the request references a missing requirements file or the
    /// underlying installer exits unsuccessfully.
    fn install(&self, request: &InstallRequest<'_>, target_dir: &Path) -> Result<()>;
}

/// pip-backed installer running `python -m pip install --target <dir>`.
#[derive(Debug, Clone, Default)]
pub struct PipInstaller {
    python: Option<PathBuf>,
}

impl PipInstaller {
    /// Creates an installer that locates a Python interpreter on PATH
    /// (`python3`, then `python`) at install time.
    ///
    /// Resolution is deferred so that a packaging run with nothing to
    /// install works on machines without Python.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a specific interpreter instead of searching PATH.
    #[must_use]
    pub fn with_python(python: PathBuf) -> Self {
        Self {
            python: Some(python),
        }
    }

    fn resolve_python(&self) -> Result<PathBuf> {
        match &self.python {
            Some(python) => Ok(python.clone()),
            None => Ok(which::which("python3").or_else(|_| which::which("python"))?),
        }
    }

    fn pip_args(request: &InstallRequest<'_>, target_dir: &Path) -> Vec<String> {
        let mut args = vec!["-m".to_owned(), "pip".to_owned(), "install".to_owned()];
        match request {
            InstallRequest::Packages(packages) => {
                args.push("-U".to_owned());
                args.extend(packages.iter().cloned());
            }
            InstallRequest::Requirements(file) => {
                args.push("-r".to_owned());
                args.push(file.display().to_string());
            }
        }
        args.push("--target".to_owned());
        args.push(target_dir.display().to_string());
        args
    }
}

impl DependencyInstaller for PipInstaller {
    fn install(&self, request: &InstallRequest<'_>, target_dir: &Path) -> Result<()> {
        if let InstallRequest::Requirements(file) = request
            && !file.is_file()
        {
            return Err(PackError::MissingRequirements {
                path: file.to_path_buf(),
            });
        }

        let python = self.resolve_python()?;
        let args = Self::pip_args(request, target_dir);
        info!(python = %python.display(), ?args, "running pip");

        // Output is captured, not inherited: the CLI may be driving a
        // spinner, and pip's stderr only matters on failure.
        let output = Command::new(&python).args(&args).output()?;
        debug!(
            status = ?output.status.code(),
            stdout_bytes = output.stdout.len(),
            "pip finished"
        );
        if !output.status.success() {
            return Err(PackError::InstallFailed {
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(())
    }
}
