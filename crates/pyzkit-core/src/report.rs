//! Archive creation reporting.

use std::time::Duration;

/// Statistics from a single archive build.
///
/// # Examples
///
/// ```
/// use pyzkit_core::ArchiveReport;
///
/// let mut report = ArchiveReport::new();
/// report.files_added = 4;
/// report.bytes_written = 2048;
/// report.archive_size = 1024;
/// assert_eq!(report.compression_ratio(), 2.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArchiveReport {
    /// Number of files written into the archive.
    pub files_added: usize,

    /// Number of directory entries written into the archive.
    pub directories_added: usize,

    /// Number of candidate files rejected by the filter.
    pub files_skipped: usize,

    /// Total uncompressed bytes written.
    pub bytes_written: u64,

    /// Size of the finished archive on disk, shebang line included.
    pub archive_size: u64,

    /// Duration of the build.
    pub duration: Duration,
}

impl ArchiveReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the compression ratio (uncompressed / on-disk).
    ///
    /// Returns 0.0 when either side is zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_written == 0 || self.archive_size == 0 {
            return 0.0;
        }
        self.bytes_written as f64 / self.archive_size as f64
    }
}
