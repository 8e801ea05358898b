//! Executable zipapp archive writing.
//!
//! An archive is an optional `#!interpreter` line followed by a zip of the
//! source tree. Sources are either a directory (build mode) or an existing
//! archive file (copy mode, which only rewrites the interpreter line).

use crate::ArchiveFilter;
use crate::ArchiveReport;
use crate::PackError;
use crate::Result;
use std::fs;
use std::fs::File;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;
use tracing::info;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Interpreter written into generated shebang lines unless overridden.
pub const DEFAULT_INTERPRETER: &str = "/usr/bin/env python3";

/// Options controlling a single archive build.
///
/// # Examples
///
/// ```
/// use pyzkit_core::ArchiveOptions;
///
/// let options = ArchiveOptions::default()
///     .with_interpreter(Some("/usr/bin/env python3".to_string()))
///     .with_compress(true);
/// assert!(options.compress);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArchiveOptions {
    /// Interpreter for the shebang line; `None` writes no shebang.
    pub interpreter: Option<String>,

    /// `module:function` entry point used to generate a `__main__.py` stub.
    ///
    /// Only valid when the source has no `__main__.py` of its own.
    pub entry_point: Option<String>,

    /// Deflate-compress entries instead of storing them.
    pub compress: bool,

    /// File-inclusion predicate; `None` includes everything.
    pub filter: Option<ArchiveFilter>,
}

impl ArchiveOptions {
    /// Creates options with no interpreter, no entry point, no compression
    /// and no filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the shebang interpreter.
    #[must_use]
    pub fn with_interpreter(mut self, interpreter: Option<String>) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Sets the `module:function` entry point.
    #[must_use]
    pub fn with_entry_point(mut self, entry_point: Option<String>) -> Self {
        self.entry_point = entry_point;
        self
    }

    /// Sets whether entries are deflate-compressed.
    #[must_use]
    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Sets the file-inclusion filter.
    #[must_use]
    pub fn with_filter(mut self, filter: Option<ArchiveFilter>) -> Self {
        self.filter = filter;
        self
    }
}

/// Returns the default target path for a source: the source path with a
/// `.pyz` extension.
#[must_use]
pub fn default_target(source: &Path) -> PathBuf {
    source.with_extension("pyz")
}

/// Creates an executable archive from `source`.
///
/// With a directory source the tree is packed into a fresh archive; with a
/// file source (an existing archive) the zip body is copied and only the
/// interpreter line is rewritten. Returns the target path actually written
/// and the build statistics.
///
/// # Errors
///
/// Build mode fails on a missing source, an invalid interpreter or entry
/// point, an entry point supplied alongside an existing `__main__.py`, or an
/// archive with no entry point at all. Copy mode fails when the target
/// resolves to the source (in-place edit) or an entry point is supplied.
pub fn create_archive(
    source: &Path,
    target: Option<&Path>,
    options: &ArchiveOptions,
) -> Result<(PathBuf, ArchiveReport)> {
    let source = fs::canonicalize(source).map_err(|_| PackError::SourceNotFound {
        path: source.to_path_buf(),
    })?;
    let target = target.map_or_else(|| default_target(&source), Path::to_path_buf);

    if let Some(interpreter) = &options.interpreter
        && interpreter.chars().any(|c| c == '\n' || c == '\r')
    {
        return Err(PackError::InvalidInterpreter {
            interpreter: interpreter.clone(),
        });
    }

    info!(source = %source.display(), target = %target.display(), "creating archive");
    let report = if source.is_file() {
        copy_archive(&source, &target, options)?
    } else {
        build_archive(&source, &target, options)?
    };
    Ok((target, report))
}

/// Lists the relative entry names a build of `source` would add, in the
/// order the writer would add them. Directory entries are omitted; the
/// generated `__main__.py` stub is included when an entry point applies.
///
/// # Errors
///
/// Fails under exactly the conditions build mode would fail, so a dry run
/// surfaces the same configuration errors as a real build.
pub fn plan_archive(source: &Path, options: &ArchiveOptions) -> Result<Vec<PathBuf>> {
    let source = fs::canonicalize(source).map_err(|_| PackError::SourceNotFound {
        path: source.to_path_buf(),
    })?;
    if !source.is_dir() {
        return Err(PackError::NotADirectory { path: source });
    }

    let stub = resolve_entry_stub(&source, options)?;
    let mut planned = Vec::new();
    for entry in walk_source(&source) {
        let (path, relative, is_dir) = entry?;
        if is_dir || !accepted(options, &path) {
            continue;
        }
        planned.push(relative);
    }
    if stub.is_some() {
        planned.push(PathBuf::from("__main__.py"));
    }
    Ok(planned)
}

/// Reads the interpreter from an archive's shebang line, if it has one.
///
/// # Errors
///
/// Fails if `archive` does not exist or is not a file, or if its shebang
/// line is not valid UTF-8.
pub fn get_interpreter(archive: &Path) -> Result<Option<String>> {
    let metadata = fs::metadata(archive).map_err(|_| PackError::SourceNotFound {
        path: archive.to_path_buf(),
    })?;
    if !metadata.is_file() {
        return Err(PackError::InvalidArchive {
            path: archive.to_path_buf(),
            reason: "not an archive file".to_owned(),
        });
    }

    let mut reader = BufReader::new(File::open(archive)?);
    let mut first_line = Vec::new();
    reader.read_until(b'\n', &mut first_line)?;
    if !first_line.starts_with(b"#!") {
        return Ok(None);
    }

    let interpreter = std::str::from_utf8(&first_line[2..])
        .map_err(|_| PackError::InvalidArchive {
            path: archive.to_path_buf(),
            reason: "shebang line is not valid UTF-8".to_owned(),
        })?
        .trim_end_matches(['\r', '\n'])
        .to_owned();
    Ok(Some(interpreter))
}

/// Generates the `__main__.py` text for a `module:function` entry point.
pub(crate) fn entry_stub(entry_point: &str) -> Result<String> {
    let (module, function) = parse_entry_point(entry_point)?;
    Ok(format!(
        "# -*- coding: utf-8 -*-\nimport {module}\n{module}.{function}()\n"
    ))
}

fn parse_entry_point(entry_point: &str) -> Result<(&str, &str)> {
    let invalid = || PackError::InvalidEntryPoint {
        entry_point: entry_point.to_owned(),
    };
    let (module, function) = entry_point.split_once(':').ok_or_else(invalid)?;
    if !is_dotted_identifier(module) || !is_dotted_identifier(function) {
        return Err(invalid());
    }
    Ok((module, function))
}

fn is_dotted_identifier(value: &str) -> bool {
    !value.is_empty() && value.split('.').all(is_identifier)
}

fn is_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validates the entry-point rules for a directory source and returns the
/// stub to generate, if any.
fn resolve_entry_stub(source: &Path, options: &ArchiveOptions) -> Result<Option<String>> {
    let has_main = source.join("__main__.py").is_file();
    match &options.entry_point {
        Some(_) if has_main => Err(PackError::EntryPointConflict {
            path: source.to_path_buf(),
        }),
        Some(entry_point) => Ok(Some(entry_stub(entry_point)?)),
        None if has_main => Ok(None),
        None => Err(PackError::MissingEntryPoint),
    }
}

fn accepted(options: &ArchiveOptions, path: &Path) -> bool {
    options
        .filter
        .as_ref()
        .is_none_or(|filter| filter.matches(path))
}

/// Deterministic traversal of a source tree: absolute path, relative path
/// and directory flag per entry, sorted by file name within each directory.
fn walk_source(source: &Path) -> impl Iterator<Item = Result<(PathBuf, PathBuf, bool)>> {
    let root = source.to_path_buf();
    WalkDir::new(source)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .map(move |entry| {
            let entry = entry.map_err(|err| {
                let path = err.path().map_or_else(|| root.clone(), Path::to_path_buf);
                let source = err
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other("walk error"));
                PackError::Scan { path, source }
            })?;
            let is_dir = entry.file_type().is_dir();
            let path = entry.into_path();
            let relative = path
                .strip_prefix(&root)
                .map_err(|_| PackError::Scan {
                    path: path.clone(),
                    source: io::Error::other("entry escaped the source root"),
                })?
                .to_path_buf();
            Ok((path, relative, is_dir))
        })
}

fn zip_entry_name(relative: &Path) -> String {
    relative.to_string_lossy().replace('\\', "/")
}

fn build_archive(source: &Path, target: &Path, options: &ArchiveOptions) -> Result<ArchiveReport> {
    let start = Instant::now();
    let stub = resolve_entry_stub(source, options)?;

    let mut file = File::create(target)?;
    write_shebang(&mut file, options)?;

    let method = if options.compress {
        CompressionMethod::Deflated
    } else {
        CompressionMethod::Stored
    };
    let entry_options = SimpleFileOptions::default()
        .compression_method(method)
        .unix_permissions(0o644);

    let mut report = ArchiveReport::new();
    let mut zip = ZipWriter::new(file);
    for entry in walk_source(source) {
        let (path, relative, is_dir) = entry?;
        if !accepted(options, &path) {
            if !is_dir {
                report.files_skipped += 1;
            }
            continue;
        }
        let name = zip_entry_name(&relative);
        if is_dir {
            zip.add_directory(name, entry_options)?;
            report.directories_added += 1;
        } else {
            zip.start_file(name, entry_options)?;
            let mut reader = File::open(&path)?;
            report.bytes_written += io::copy(&mut reader, &mut zip)?;
            report.files_added += 1;
        }
    }

    if let Some(stub) = stub {
        zip.start_file("__main__.py", entry_options)?;
        zip.write_all(stub.as_bytes())?;
        report.bytes_written += stub.len() as u64;
        report.files_added += 1;
    }

    let mut file = zip.finish()?;
    file.flush()?;
    drop(file);

    finalize(target, options, &mut report, start)?;
    debug!(
        files = report.files_added,
        skipped = report.files_skipped,
        "archive written"
    );
    Ok(report)
}

/// Copy mode: rewrite an existing archive with a new interpreter line,
/// leaving the zip body untouched.
fn copy_archive(source: &Path, target: &Path, options: &ArchiveOptions) -> Result<ArchiveReport> {
    let start = Instant::now();
    if options.entry_point.is_some() {
        return Err(PackError::EntryPointOnCopy);
    }
    if target.exists() && fs::canonicalize(target)? == *source {
        return Err(PackError::InPlaceEdit {
            path: source.to_path_buf(),
        });
    }

    let mut reader = BufReader::new(File::open(source)?);
    let mut first_line = Vec::new();
    reader.read_until(b'\n', &mut first_line)?;

    let mut report = ArchiveReport::new();
    let mut out = File::create(target)?;
    write_shebang(&mut out, options)?;
    if !first_line.starts_with(b"#!") {
        // No shebang to strip; the first chunk is zip data.
        out.write_all(&first_line)?;
        report.bytes_written += first_line.len() as u64;
    }
    report.bytes_written += io::copy(&mut reader, &mut out)?;
    out.flush()?;
    drop(out);

    finalize(target, options, &mut report, start)?;
    Ok(report)
}

fn write_shebang(out: &mut File, options: &ArchiveOptions) -> Result<()> {
    if let Some(interpreter) = &options.interpreter {
        out.write_all(format!("#!{interpreter}\n").as_bytes())?;
    }
    Ok(())
}

fn finalize(
    target: &Path,
    options: &ArchiveOptions,
    report: &mut ArchiveReport,
    start: Instant,
) -> Result<()> {
    report.archive_size = fs::metadata(target)?.len();
    report.duration = start.elapsed();
    if options.interpreter.is_some() {
        make_executable(target)?;
    }
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | 0o111);
    fs::set_permissions(path, permissions)?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
