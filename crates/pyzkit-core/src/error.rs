//! Error types for archive packaging operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `PackError`.
pub type Result<T> = std::result::Result<T, PackError>;

/// Errors that can occur while building filters, archives, or bundles.
#[derive(Error, Debug)]
pub enum PackError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A pattern file could not be read.
    #[error("cannot read pattern file {path}: {source}")]
    PatternFile {
        /// The pattern file path.
        path: PathBuf,
        /// The underlying read error.
        #[source]
        source: std::io::Error,
    },

    /// A glob pattern is not syntactically valid.
    #[error("invalid glob pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The offending pattern string.
        pattern: String,
        /// The underlying matcher error.
        #[source]
        source: glob::PatternError,
    },

    /// A matched path could not be read during enumeration.
    #[error("cannot scan {path}: {source}")]
    Scan {
        /// The path that failed to stat.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Source path does not exist.
    #[error("source {path} does not exist")]
    SourceNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Expected a directory.
    #[error("{path} is not a directory")]
    NotADirectory {
        /// The non-directory path.
        path: PathBuf,
    },

    /// Asked to rewrite an archive onto itself.
    #[error("in-place editing of archives is not supported: {path}")]
    InPlaceEdit {
        /// The archive path.
        path: PathBuf,
    },

    /// An entry point was supplied while copying an existing archive.
    #[error("cannot change the entry point when copying an archive")]
    EntryPointOnCopy,

    /// An entry point string is not of the form `module:function`.
    #[error("invalid entry point {entry_point:?}")]
    InvalidEntryPoint {
        /// The offending entry point string.
        entry_point: String,
    },

    /// An entry point was supplied but the source already has `__main__.py`.
    #[error("cannot supply an entry point: {path} already contains __main__.py")]
    EntryPointConflict {
        /// The source directory.
        path: PathBuf,
    },

    /// Neither an entry point nor an existing `__main__.py` is available.
    #[error("archive has no entry point")]
    MissingEntryPoint,

    /// The interpreter string cannot be written as a shebang line.
    #[error("invalid interpreter {interpreter:?}")]
    InvalidInterpreter {
        /// The offending interpreter string.
        interpreter: String,
    },

    /// A requirements file was requested but does not exist.
    #[error("requirements file {path} does not exist")]
    MissingRequirements {
        /// The missing requirements file.
        path: PathBuf,
    },

    /// No Python interpreter could be located on PATH.
    #[error("no python interpreter found on PATH: {0}")]
    PythonNotFound(#[from] which::Error),

    /// The dependency installer exited with a failure status.
    #[error("pip install failed{}", format_install_status(*status))]
    InstallFailed {
        /// Exit status code, if the process exited normally.
        status: Option<i32>,
        /// Captured standard error from the installer.
        stderr: String,
    },

    /// A file is not a readable archive.
    #[error("invalid archive {path}: {reason}")]
    InvalidArchive {
        /// The archive path.
        path: PathBuf,
        /// Why the file was rejected.
        reason: String,
    },

    /// Zip encoding or decoding failed.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

fn format_install_status(status: Option<i32>) -> String {
    status.map_or_else(
        || " (terminated by signal)".to_owned(),
        |code| format!(" with status {code}"),
    )
}

impl PackError {
    /// Returns `true` if this error was caused by how the operation was
    /// requested rather than by the state of the filesystem.
    ///
    /// Configuration errors are not retried and map to usage-style exit
    /// codes at the CLI boundary.
    ///
    /// # Examples
    ///
    /// ```
    /// use pyzkit_core::PackError;
    ///
    /// let err = PackError::MissingEntryPoint;
    /// assert!(err.is_configuration_error());
    ///
    /// let err = PackError::SourceNotFound {
    ///     path: "missing".into(),
    /// };
    /// assert!(!err.is_configuration_error());
    /// ```
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPattern { .. }
                | Self::InPlaceEdit { .. }
                | Self::EntryPointOnCopy
                | Self::InvalidEntryPoint { .. }
                | Self::EntryPointConflict { .. }
                | Self::MissingEntryPoint
                | Self::InvalidInterpreter { .. }
                | Self::MissingRequirements { .. }
        )
    }

    /// Returns a context string for this error, if available.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::InvalidArchive { reason, .. } => Some(reason),
            Self::InstallFailed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}
