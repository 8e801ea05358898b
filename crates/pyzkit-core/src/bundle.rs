//! Packaging a single Python script into an executable archive.
//!
//! The `py2pyz` flow: resolve the script, install its dependencies into the
//! script's directory, materialize a `__main__.py` when the directory lacks
//! one, then hand the directory to the archive writer. The staging directory
//! is the script's parent, so the default output lands *next to* it rather
//! than inside it.

use crate::ArchiveOptions;
use crate::ArchiveReport;
use crate::DependencyInstaller;
use crate::InstallRequest;
use crate::PackError;
use crate::Result;
use crate::archive;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tracing::info;

/// Options controlling a script bundle.
#[derive(Debug, Clone, Default)]
pub struct BundleOptions {
    /// Package specifiers to install beside the script.
    pub deps: Vec<String>,

    /// Requirements file to install beside the script.
    pub requirements: Option<PathBuf>,

    /// Output archive path; defaults to the script's directory path with
    /// `.pyz` appended.
    pub output: Option<PathBuf>,

    /// Shebang interpreter for the archive.
    pub interpreter: Option<String>,

    /// `module:function` entry point for the generated `__main__.py`.
    ///
    /// When absent the stub runs the script itself as `__main__`.
    pub entry_point: Option<String>,

    /// Deflate-compress archive entries.
    pub compress: bool,
}

/// Default requirements file for a script: `requirements.txt` beside it.
#[must_use]
pub fn default_requirements(script: &Path) -> PathBuf {
    script.with_file_name("requirements.txt")
}

/// Packages `script` and its dependencies into an executable archive.
///
/// Returns the output path and the archive statistics.
///
/// # Errors
///
/// Fails if the script does not exist or is not a file, if dependency
/// installation fails (a missing requirements file included), or if the
/// archive writer rejects the configuration.
pub fn pack_script(
    script: &Path,
    options: &BundleOptions,
    installer: &dyn DependencyInstaller,
) -> Result<(PathBuf, ArchiveReport)> {
    let script = fs::canonicalize(script).map_err(|_| PackError::SourceNotFound {
        path: script.to_path_buf(),
    })?;
    if !script.is_file() {
        return Err(PackError::SourceNotFound { path: script });
    }
    // A canonical file path always has a parent directory.
    let stage = script
        .parent()
        .ok_or_else(|| PackError::SourceNotFound {
            path: script.clone(),
        })?
        .to_path_buf();

    info!(script = %script.display(), stage = %stage.display(), "packaging script");

    if let Some(requirements) = &options.requirements {
        installer.install(&InstallRequest::Requirements(requirements), &stage)?;
    }
    if !options.deps.is_empty() {
        installer.install(&InstallRequest::Packages(&options.deps), &stage)?;
    }

    let main_py = stage.join("__main__.py");
    if !main_py.is_file() {
        let stub = match &options.entry_point {
            Some(entry_point) => archive::entry_stub(entry_point)?,
            None => run_module_stub(&script)?,
        };
        fs::write(&main_py, stub)?;
        info!(path = %main_py.display(), "created entry module");
    }

    let archive_options = ArchiveOptions::new()
        .with_interpreter(options.interpreter.clone())
        .with_compress(options.compress);
    archive::create_archive(&stage, options.output.as_deref(), &archive_options)
}

/// Entry stub that re-runs the script as `__main__`, so its
/// `if __name__ == "__main__"` guard fires inside the archive.
fn run_module_stub(script: &Path) -> Result<String> {
    let stem = script
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| is_module_name(stem))
        .ok_or_else(|| PackError::InvalidEntryPoint {
            entry_point: script.display().to_string(),
        })?;
    Ok(format!(
        "# -*- coding: utf-8 -*-\nimport runpy\nrunpy.run_module({stem:?}, run_name=\"__main__\")\n"
    ))
}

fn is_module_name(stem: &str) -> bool {
    let mut chars = stem.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
