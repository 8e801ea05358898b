//! Integration tests for pyzkit-core.
//!
//! These tests build real archives on disk and read them back with the zip
//! crate to verify the written entries.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pyzkit_core::ArchiveOptions;
use pyzkit_core::ArchiveFilter;
use pyzkit_core::PackError;
use pyzkit_core::PatternSet;
use pyzkit_core::create_archive;
use pyzkit_core::get_interpreter;
use pyzkit_core::plan_archive;
use std::fs;
use std::fs::File;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_tree(dir: &Path, files: &[(&str, &str)]) {
    for (name, contents) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }
}

/// Reads the entry names of a zipapp, skipping any shebang line.
fn archive_entries(archive: &Path) -> Vec<String> {
    let mut file = File::open(archive).unwrap();
    let mut prefix = [0_u8; 2];
    file.read_exact(&mut prefix).unwrap();
    if &prefix == b"#!" {
        let mut byte = [0_u8; 1];
        while byte[0] != b'\n' {
            file.read_exact(&mut byte).unwrap();
        }
    } else {
        file.seek(SeekFrom::Start(0)).unwrap();
    }

    let mut zip = zip::ZipArchive::new(file).unwrap();
    let mut names: Vec<String> = (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_owned())
        .collect();
    names.sort();
    names
}

fn read_entry(archive: &Path, name: &str) -> String {
    let mut file = File::open(archive).unwrap();
    let mut prefix = [0_u8; 2];
    file.read_exact(&mut prefix).unwrap();
    if &prefix != b"#!" {
        file.seek(SeekFrom::Start(0)).unwrap();
    } else {
        let mut byte = [0_u8; 1];
        while byte[0] != b'\n' {
            file.read_exact(&mut byte).unwrap();
        }
    }
    let mut zip = zip::ZipArchive::new(file).unwrap();
    let mut entry = zip.by_name(name).unwrap();
    let mut contents = String::new();
    entry.read_to_string(&mut contents).unwrap();
    contents
}

#[test]
fn test_directory_builds_executable_archive() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("app");
    write_tree(
        &source,
        &[
            ("__main__.py", "print('hello')\n"),
            ("pkg/util.py", "X = 1\n"),
        ],
    );

    let options = ArchiveOptions::new()
        .with_interpreter(Some("/usr/bin/env python3".to_owned()));
    let (target, report) = create_archive(&source, None, &options).unwrap();

    assert_eq!(target, temp.path().join("app.pyz"));
    assert_eq!(report.files_added, 2);
    assert_eq!(report.directories_added, 1);

    let bytes = fs::read(&target).unwrap();
    assert!(bytes.starts_with(b"#!/usr/bin/env python3\n"));
    assert_eq!(
        archive_entries(&target),
        vec!["__main__.py", "pkg/", "pkg/util.py"]
    );
}

#[test]
fn test_no_interpreter_means_no_shebang() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("app");
    write_tree(&source, &[("__main__.py", "print('hello')\n")]);

    let (target, _) = create_archive(&source, None, &ArchiveOptions::new()).unwrap();

    let bytes = fs::read(&target).unwrap();
    assert!(bytes.starts_with(b"PK"));
    assert_eq!(get_interpreter(&target).unwrap(), None);
}

#[test]
fn test_entry_point_generates_stub_in_archive_only() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("app");
    write_tree(&source, &[("tool.py", "def main():\n    pass\n")]);

    let options = ArchiveOptions::new().with_entry_point(Some("tool:main".to_owned()));
    let (target, _) = create_archive(&source, None, &options).unwrap();

    let stub = read_entry(&target, "__main__.py");
    assert!(stub.contains("import tool"));
    assert!(stub.contains("tool.main()"));
    // The stub lives only in the archive, never in the source tree.
    assert!(!source.join("__main__.py").exists());
}

#[test]
fn test_filter_excludes_and_include_wins() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("app");
    write_tree(
        &source,
        &[
            ("__main__.py", "print('hello')\n"),
            ("keep.log", "keep\n"),
            ("drop.log", "drop\n"),
            ("data.txt", "data\n"),
        ],
    );

    let include = PatternSet::from_sources(&["keep.log".to_owned()], &[]).unwrap();
    let exclude = PatternSet::from_sources(&["*.log".to_owned()], &[]).unwrap();
    let filter = ArchiveFilter::build(&source, &include, &exclude).unwrap();

    let options = ArchiveOptions::new().with_filter(Some(filter));
    let (target, report) = create_archive(&source, None, &options).unwrap();

    assert_eq!(
        archive_entries(&target),
        vec!["__main__.py", "data.txt", "keep.log"]
    );
    assert_eq!(report.files_skipped, 1);
}

#[test]
fn test_filter_never_admits_extensionless_files() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("app");
    write_tree(
        &source,
        &[("__main__.py", "print('hello')\n"), ("Makefile", "all:\n")],
    );

    let filter =
        ArchiveFilter::build(&source, &PatternSet::new(), &PatternSet::new()).unwrap();
    let options = ArchiveOptions::new().with_filter(Some(filter));
    let (target, _) = create_archive(&source, None, &options).unwrap();

    assert_eq!(archive_entries(&target), vec!["__main__.py"]);
}

#[test]
fn test_compressed_archive_is_smaller() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("app");
    let repetitive = "spam and eggs\n".repeat(500);
    write_tree(
        &source,
        &[("__main__.py", repetitive.as_str()), ("data.txt", repetitive.as_str())],
    );

    let stored = temp.path().join("stored.pyz");
    let deflated = temp.path().join("deflated.pyz");
    create_archive(&source, Some(&stored), &ArchiveOptions::new()).unwrap();
    let (_, report) = create_archive(
        &source,
        Some(&deflated),
        &ArchiveOptions::new().with_compress(true),
    )
    .unwrap();

    let stored_size = fs::metadata(&stored).unwrap().len();
    let deflated_size = fs::metadata(&deflated).unwrap().len();
    assert!(deflated_size < stored_size);
    assert!(report.compression_ratio() > 1.0);
}

#[test]
fn test_copy_mode_swaps_interpreter_and_preserves_body() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("app");
    write_tree(&source, &[("__main__.py", "print('hello')\n")]);

    let original = temp.path().join("a.pyz");
    let options = ArchiveOptions::new().with_interpreter(Some("/usr/bin/python3.11".to_owned()));
    create_archive(&source, Some(&original), &options).unwrap();

    let copied = temp.path().join("b.pyz");
    let recopy = ArchiveOptions::new().with_interpreter(Some("/usr/bin/python3.12".to_owned()));
    create_archive(&original, Some(&copied), &recopy).unwrap();

    assert_eq!(
        get_interpreter(&copied).unwrap(),
        Some("/usr/bin/python3.12".to_owned())
    );
    assert_eq!(archive_entries(&copied), archive_entries(&original));
    assert_eq!(
        read_entry(&copied, "__main__.py"),
        read_entry(&original, "__main__.py")
    );
}

#[test]
fn test_copy_mode_rejects_in_place_edit() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("app");
    write_tree(&source, &[("__main__.py", "print('hello')\n")]);

    let archive = temp.path().join("app.pyz");
    create_archive(&source, Some(&archive), &ArchiveOptions::new()).unwrap();

    // The default target of `app.pyz` is `app.pyz` itself.
    let result = create_archive(&archive, None, &ArchiveOptions::new());
    assert!(matches!(result, Err(PackError::InPlaceEdit { .. })));
}

#[test]
fn test_copy_mode_rejects_entry_point() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("app");
    write_tree(&source, &[("__main__.py", "print('hello')\n")]);

    let archive = temp.path().join("app.pyz");
    create_archive(&source, Some(&archive), &ArchiveOptions::new()).unwrap();

    let copy_options = ArchiveOptions::new().with_entry_point(Some("app:main".to_owned()));
    let result = create_archive(&archive, Some(&temp.path().join("b.pyz")), &copy_options);
    assert!(matches!(result, Err(PackError::EntryPointOnCopy)));
}

#[test]
fn test_interpreter_round_trips_through_copy() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("app");
    write_tree(&source, &[("__main__.py", "print('hello')\n")]);

    let archive = temp.path().join("app.pyz");
    let options = ArchiveOptions::new().with_interpreter(Some("/opt/python/bin/python3".to_owned()));
    create_archive(&source, Some(&archive), &options).unwrap();

    assert_eq!(
        get_interpreter(&archive).unwrap(),
        Some("/opt/python/bin/python3".to_owned())
    );
}

#[cfg(unix)]
#[test]
fn test_archive_with_interpreter_is_executable() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let source = temp.path().join("app");
    write_tree(&source, &[("__main__.py", "print('hello')\n")]);

    let options = ArchiveOptions::new()
        .with_interpreter(Some("/usr/bin/env python3".to_owned()));
    let (target, _) = create_archive(&source, None, &options).unwrap();

    let mode = fs::metadata(&target).unwrap().permissions().mode();
    assert_eq!(mode & 0o111, 0o111);
}

#[test]
fn test_plan_matches_build() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("app");
    write_tree(
        &source,
        &[
            ("__main__.py", "print('hello')\n"),
            ("a.txt", "a\n"),
            ("b.log", "b\n"),
            ("pkg/mod.py", "X = 1\n"),
        ],
    );

    let exclude = PatternSet::from_sources(&["*.log".to_owned()], &[]).unwrap();
    let filter = ArchiveFilter::build(&source, &PatternSet::new(), &exclude).unwrap();
    let options = ArchiveOptions::new().with_filter(Some(filter));

    let planned = plan_archive(&source, &options).unwrap();
    let (target, _) = create_archive(&source, None, &options).unwrap();

    let mut planned_names: Vec<String> = planned
        .iter()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .collect();
    planned_names.sort();

    let built: Vec<String> = archive_entries(&target)
        .into_iter()
        .filter(|name| !name.ends_with('/'))
        .collect();
    assert_eq!(planned_names, built);
}

#[test]
fn test_plan_lists_generated_stub() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("app");
    write_tree(&source, &[("tool.py", "def main():\n    pass\n")]);

    let options = ArchiveOptions::new().with_entry_point(Some("tool:main".to_owned()));
    let planned = plan_archive(&source, &options).unwrap();

    assert!(planned.contains(&PathBuf::from("__main__.py")));
    assert!(planned.contains(&PathBuf::from("tool.py")));
}

#[test]
fn test_missing_source_errors() {
    let temp = TempDir::new().unwrap();
    let result = create_archive(
        &temp.path().join("ghost"),
        None,
        &ArchiveOptions::new(),
    );
    assert!(matches!(result, Err(PackError::SourceNotFound { .. })));
}
