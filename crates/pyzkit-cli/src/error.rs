//! Error conversion utilities for CLI.
//!
//! Converts pyzkit-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance, while keeping the
//! original error in the chain so exit codes can be derived from it.

use anyhow::anyhow;
use pyzkit_core::PackError;
use std::path::Path;

/// Converts `PackError` to a user-friendly anyhow error with context
pub fn convert_pack_error(err: PackError, source: &Path) -> anyhow::Error {
    let hint = match &err {
        PackError::InvalidPattern { pattern, .. } => Some(format!(
            "Invalid filter pattern {pattern:?}\n\
             HINT: Patterns use shell glob syntax, e.g. '*.log' or '**/*.pyc'."
        )),
        PackError::PatternFile { path, .. } => Some(format!(
            "Cannot read pattern file '{}'\n\
             HINT: --include-from/--exclude-from expect a text file with one glob per line.",
            path.display()
        )),
        PackError::InPlaceEdit { path } => Some(format!(
            "Cannot overwrite '{}' with itself\n\
             HINT: Pass --output to write the new archive somewhere else.",
            path.display()
        )),
        PackError::EntryPointOnCopy => Some(
            "Cannot change the entry point when copying an archive\n\
             HINT: Drop --main, or rebuild from the source directory instead."
                .to_owned(),
        ),
        PackError::EntryPointConflict { path } => Some(format!(
            "'{}' already contains __main__.py\n\
             HINT: Drop --main to keep the existing entry module.",
            path.display()
        )),
        PackError::MissingEntryPoint => Some(
            "Archive has no entry point\n\
             HINT: Pass --main MODULE:FUNCTION or add a __main__.py to the source."
                .to_owned(),
        ),
        PackError::InvalidEntryPoint { entry_point } => Some(format!(
            "Invalid entry point {entry_point:?}\n\
             HINT: Use the form MODULE:FUNCTION, e.g. 'myapp.cli:main'."
        )),
        PackError::MissingRequirements { path } => Some(format!(
            "Requirements file '{}' does not exist\n\
             HINT: Create it, pass -r FILE explicitly, or use -d PACKAGE instead.",
            path.display()
        )),
        PackError::InstallFailed { stderr, .. } => {
            let tail = stderr.lines().rev().take(5).collect::<Vec<_>>();
            let tail = tail.into_iter().rev().collect::<Vec<_>>().join("\n  ");
            Some(format!(
                "Dependency installation failed while packaging '{}'\n  {tail}",
                source.display()
            ))
        }
        PackError::PythonNotFound(_) => Some(
            "No Python interpreter found on PATH\n\
             HINT: Install Python 3 or make `python3` resolvable."
                .to_owned(),
        ),
        _ => None,
    };

    match hint {
        Some(hint) => anyhow::Error::new(err).context(hint),
        None => anyhow::Error::new(err)
            .context(format!("Error processing '{}'", source.display())),
    }
}

/// Maps an error chain to a process exit code: configuration/usage errors
/// exit 2, everything else 1.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<PackError>() {
        Some(pack_err) if pack_err.is_configuration_error() => 2,
        _ => 1,
    }
}

/// Builds the error used when `--info` is requested for a non-archive.
pub fn info_requires_archive(source: &Path) -> anyhow::Error {
    anyhow!(
        "Can only get info for an archive file: '{}' is not a file",
        source.display()
    )
}
