//! Include/exclude filtering for archive creation.
//!
//! This module builds the file-inclusion predicate consumed by the archive
//! writer: [`PatternSet`] flattens literal glob patterns and pattern files
//! into one deduplicated set, and [`ArchiveFilter`] resolves those patterns
//! against a base directory into a fixed membership set over canonical file
//! paths.

use crate::PackError;
use crate::Result;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// A flattened, deduplicated set of glob pattern strings.
///
/// Patterns come from two sources: literal strings (e.g. repeated
/// `--exclude` flags) and pattern files listing one glob per line
/// (`--exclude-from`). Both collapse into a single unordered set.
///
/// # Examples
///
/// ```
/// use pyzkit_core::PatternSet;
///
/// let set = PatternSet::from_sources(
///     &["*.log".to_string(), "*.log".to_string(), "*.tmp".to_string()],
///     &[],
/// )?;
/// assert_eq!(set.len(), 2);
/// # Ok::<(), pyzkit_core::PackError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    patterns: BTreeSet<String>,
}

impl PatternSet {
    /// Creates an empty pattern set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a pattern set from literal patterns and pattern files.
    ///
    /// Each pattern file is read in full and split with the universal line
    /// rule (`\n`, `\r\n`, and `\r` all end a line; a trailing empty segment
    /// is dropped); every resulting line joins the set. Input order does not
    /// matter and duplicates collapse.
    ///
    /// # Errors
    ///
    /// Fails with [`PackError::PatternFile`] if any listed pattern file
    /// cannot be read. An empty pattern file is not an error.
    pub fn from_sources(literals: &[String], files: &[PathBuf]) -> Result<Self> {
        let mut patterns: BTreeSet<String> = literals.iter().cloned().collect();
        for file in files {
            let text = fs::read_to_string(file).map_err(|source| PackError::PatternFile {
                path: file.clone(),
                source,
            })?;
            patterns.extend(split_lines_universal(&text).into_iter().map(str::to_owned));
        }
        Ok(Self { patterns })
    }

    /// Returns the number of distinct patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns `true` if the set holds no patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Iterates over the pattern strings in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }
}

/// Splits on `\n`, `\r\n`, and `\r`, dropping a trailing empty segment.
///
/// `str::lines` does not treat a lone `\r` as a terminator, so pattern files
/// written with classic Mac line endings need a manual scan.
fn split_lines_universal(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                i += if bytes.get(i + 1) == Some(&b'\n') { 2 } else { 1 };
                start = i;
            }
            _ => i += 1,
        }
    }
    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// A membership predicate over the files of a base directory.
///
/// Built once per archive: the base directory is enumerated with the
/// recursive `*.?*` glob (every file whose name contains a `.` followed by
/// at least one character — extensionless files such as `Makefile` never
/// enter the candidate set), exclude patterns carve files out, and include
/// patterns override excludes for any path matched by both.
///
/// After construction the filter owns its final set and [`matches`] performs
/// no further globbing; two paths resolving to the same canonical file are
/// treated identically.
///
/// [`matches`]: ArchiveFilter::matches
#[derive(Debug, Clone)]
pub struct ArchiveFilter {
    included: BTreeSet<PathBuf>,
}

impl ArchiveFilter {
    /// Resolves include/exclude pattern sets against `base_dir`.
    ///
    /// The computation is all-or-nothing:
    ///
    /// 1. `base_dir` is canonicalized; it must exist and be a directory.
    /// 2. `all_files` = recursive `*.?*` matches under it, files only.
    /// 3. Each exclude pattern is globbed against the base directory (one
    ///    glob call per pattern) and the matches unioned; likewise each
    ///    include pattern.
    /// 4. `final = all_files − (excluded − included)`.
    ///
    /// A pattern matching zero files is not an error; empty include and
    /// exclude sets yield a filter accepting exactly `all_files`.
    ///
    /// # Errors
    ///
    /// - [`PackError::SourceNotFound`] / [`PackError::NotADirectory`] for a
    ///   bad base directory.
    /// - [`PackError::InvalidPattern`] if a pattern is not a syntactically
    ///   valid glob.
    /// - [`PackError::Scan`] if a matched path cannot be read.
    pub fn build(base_dir: &Path, include: &PatternSet, exclude: &PatternSet) -> Result<Self> {
        let base = fs::canonicalize(base_dir).map_err(|_| PackError::SourceNotFound {
            path: base_dir.to_path_buf(),
        })?;
        if !base.is_dir() {
            return Err(PackError::NotADirectory { path: base });
        }

        let all_files: BTreeSet<PathBuf> = glob_under(&base, "**/*.?*")?
            .into_iter()
            .filter(|path| path.is_file())
            .collect();

        let mut excluded = BTreeSet::new();
        for pattern in exclude.iter() {
            excluded.extend(glob_under(&base, pattern)?);
        }

        let mut included = BTreeSet::new();
        for pattern in include.iter() {
            included.extend(glob_under(&base, pattern)?);
        }

        // Include wins over exclude for any path matched by both.
        let net_excluded: BTreeSet<&PathBuf> = excluded.difference(&included).collect();
        let included = all_files
            .into_iter()
            .filter(|path| !net_excluded.contains(path))
            .collect();

        Ok(Self { included })
    }

    /// Reports whether `path` belongs to the archive.
    ///
    /// The path is resolved before the membership check, so relative paths
    /// and symlinked spellings of an included file all match. A path that
    /// cannot be resolved (it no longer exists) does not match.
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        fs::canonicalize(path).is_ok_and(|resolved| self.included.contains(&resolved))
    }

    /// Returns the number of files the filter accepts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.included.len()
    }

    /// Returns `true` if the filter accepts no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.included.is_empty()
    }
}

/// Runs a single glob call for `pattern` anchored at `base`, canonicalizing
/// every match.
fn glob_under(base: &Path, pattern: &str) -> Result<BTreeSet<PathBuf>> {
    let anchored = base.join(pattern);
    let anchored = anchored.to_str().ok_or_else(|| {
        PackError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("non-UTF-8 glob path: {}", anchored.display()),
        ))
    })?;

    let paths = glob::glob(anchored).map_err(|source| PackError::InvalidPattern {
        pattern: pattern.to_owned(),
        source,
    })?;

    let mut matches = BTreeSet::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            let path = err.path().to_path_buf();
            PackError::Scan {
                path,
                source: err.into_error(),
            }
        })?;
        let resolved = path.canonicalize().map_err(|source| PackError::Scan {
            path: path.clone(),
            source,
        })?;
        matches.insert(resolved);
    }
    Ok(matches)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Allow unwrap in tests for brevity
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(&path).unwrap();
        path
    }

    #[test]
    fn test_split_lines_universal() {
        assert_eq!(split_lines_universal("a\nb\nc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines_universal("a\r\nb\rc\n"), vec!["a", "b", "c"]);
        assert_eq!(split_lines_universal(""), Vec::<&str>::new());
        assert_eq!(split_lines_universal("only"), vec!["only"]);
        // Interior empty lines survive; only the trailing segment is dropped.
        assert_eq!(split_lines_universal("a\n\nb\n"), vec!["a", "", "b"]);
        assert_eq!(split_lines_universal("\r\r"), vec!["", ""]);
    }

    #[test]
    fn test_pattern_set_literals_dedup() {
        let set = PatternSet::from_sources(
            &["*.log".to_string(), "*.tmp".to_string(), "*.log".to_string()],
            &[],
        )
        .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["*.log", "*.tmp"]);
    }

    #[test]
    fn test_pattern_set_union_with_files() {
        let temp = TempDir::new().unwrap();
        let file_a = temp.path().join("a.patterns");
        let file_b = temp.path().join("b.patterns");
        fs::write(&file_a, "*.log\n*.tmp\n").unwrap();
        fs::write(&file_b, "*.tmp\r\n*.bak\r\n").unwrap();

        let forwards = PatternSet::from_sources(
            &["*.pyc".to_string()],
            &[file_a.clone(), file_b.clone()],
        )
        .unwrap();
        let backwards =
            PatternSet::from_sources(&["*.pyc".to_string()], &[file_b, file_a]).unwrap();

        // Order of pattern files does not matter; the result is a set.
        assert_eq!(forwards, backwards);
        assert_eq!(forwards.len(), 4);
    }

    #[test]
    fn test_pattern_set_empty_file_ok() {
        let temp = TempDir::new().unwrap();
        let empty = temp.path().join("empty");
        File::create(&empty).unwrap();
        let set = PatternSet::from_sources(&[], &[empty]).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_pattern_set_missing_file_errors() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.patterns");
        let result = PatternSet::from_sources(&[], &[missing.clone()]);
        match result {
            Err(PackError::PatternFile { path, source }) => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected PatternFile error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_filters_accept_all_dotted_files() {
        let temp = TempDir::new().unwrap();
        let a = touch(temp.path(), "a.txt");
        let b = touch(temp.path(), "sub/b.py");
        let hidden = touch(temp.path(), ".gitignore");

        let filter =
            ArchiveFilter::build(temp.path(), &PatternSet::new(), &PatternSet::new()).unwrap();

        assert!(filter.matches(&a));
        assert!(filter.matches(&b));
        assert!(filter.matches(&hidden));
        assert_eq!(filter.len(), 3);
    }

    #[test]
    fn test_extensionless_files_never_match() {
        let temp = TempDir::new().unwrap();
        let makefile = touch(temp.path(), "Makefile");
        touch(temp.path(), "a.txt");

        let filter =
            ArchiveFilter::build(temp.path(), &PatternSet::new(), &PatternSet::new()).unwrap();

        assert!(!filter.matches(&makefile));
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn test_pure_exclusion() {
        let temp = TempDir::new().unwrap();
        let keep = touch(temp.path(), "a.txt");
        let drop = touch(temp.path(), "b.log");

        let exclude = PatternSet::from_sources(&["*.log".to_string()], &[]).unwrap();
        let filter = ArchiveFilter::build(temp.path(), &PatternSet::new(), &exclude).unwrap();

        assert!(filter.matches(&keep));
        assert!(!filter.matches(&drop));
    }

    #[test]
    fn test_include_overrides_exclude() {
        let temp = TempDir::new().unwrap();
        let kept = touch(temp.path(), "keep.log");
        let dropped = touch(temp.path(), "drop.log");

        let include = PatternSet::from_sources(&["keep.log".to_string()], &[]).unwrap();
        let exclude = PatternSet::from_sources(&["*.log".to_string()], &[]).unwrap();
        let filter = ArchiveFilter::build(temp.path(), &include, &exclude).unwrap();

        assert!(filter.matches(&kept));
        assert!(!filter.matches(&dropped));
    }

    #[test]
    fn test_exclusion_in_subdirectories() {
        let temp = TempDir::new().unwrap();
        let kept = touch(temp.path(), "pkg/mod.py");
        let dropped = touch(temp.path(), "pkg/mod.pyc");

        let exclude = PatternSet::from_sources(&["**/*.pyc".to_string()], &[]).unwrap();
        let filter = ArchiveFilter::build(temp.path(), &PatternSet::new(), &exclude).unwrap();

        assert!(filter.matches(&kept));
        assert!(!filter.matches(&dropped));
    }

    #[test]
    fn test_pattern_matching_nothing_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let a = touch(temp.path(), "a.txt");

        let exclude = PatternSet::from_sources(&["*.doesnotexist".to_string()], &[]).unwrap();
        let filter = ArchiveFilter::build(temp.path(), &PatternSet::new(), &exclude).unwrap();

        assert!(filter.matches(&a));
    }

    #[test]
    fn test_invalid_pattern_errors() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a.txt");

        let exclude = PatternSet::from_sources(&["a[".to_string()], &[]).unwrap();
        let result = ArchiveFilter::build(temp.path(), &PatternSet::new(), &exclude);
        assert!(matches!(result, Err(PackError::InvalidPattern { .. })));
    }

    #[test]
    fn test_missing_base_dir_errors() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nowhere");
        let result = ArchiveFilter::build(&missing, &PatternSet::new(), &PatternSet::new());
        assert!(matches!(result, Err(PackError::SourceNotFound { .. })));
    }

    #[test]
    fn test_relative_and_absolute_spellings_agree() {
        let temp = TempDir::new().unwrap();
        let absolute = touch(temp.path(), "a.txt");

        let filter =
            ArchiveFilter::build(temp.path(), &PatternSet::new(), &PatternSet::new()).unwrap();

        // A non-canonical spelling of the same file still matches.
        let dotted = temp.path().join(".").join("a.txt");
        assert!(filter.matches(&absolute));
        assert!(filter.matches(&dotted));
    }

    #[test]
    fn test_vanished_path_does_not_match() {
        let temp = TempDir::new().unwrap();
        let a = touch(temp.path(), "a.txt");
        let filter =
            ArchiveFilter::build(temp.path(), &PatternSet::new(), &PatternSet::new()).unwrap();

        fs::remove_file(&a).unwrap();
        assert!(!filter.matches(&a));
    }

    #[test]
    fn test_idempotent_builds_agree() {
        let temp = TempDir::new().unwrap();
        let a = touch(temp.path(), "a.txt");
        let b = touch(temp.path(), "b.log");
        let mut pattern_file = File::create(temp.path().join("x.patterns")).unwrap();
        writeln!(pattern_file, "*.log").unwrap();

        let exclude =
            PatternSet::from_sources(&[], &[temp.path().join("x.patterns")]).unwrap();
        let first = ArchiveFilter::build(temp.path(), &PatternSet::new(), &exclude).unwrap();
        let second = ArchiveFilter::build(temp.path(), &PatternSet::new(), &exclude).unwrap();

        for path in [&a, &b] {
            assert_eq!(first.matches(path), second.matches(path));
        }
    }
}
