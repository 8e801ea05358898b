//! Packaging toolkit for self-contained executable Python archives.
//!
//! `pyzkit-core` builds zipapp archives (`.pyz`): a shebang-style
//! interpreter line followed by a zip of the application tree, optionally
//! restricted by include/exclude glob filters, plus the surrounding
//! plumbing — dependency installation into the staging tree, entry-module
//! generation, and shell-script bootstrappers embedding an archive.
//!
//! # Examples
//!
//! ```no_run
//! use pyzkit_core::ArchiveOptions;
//! use pyzkit_core::create_archive;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = ArchiveOptions::new()
//!     .with_interpreter(Some("/usr/bin/env python3".to_string()));
//! let (target, report) = create_archive(Path::new("myapp"), None, &options)?;
//! println!("Created {} ({} files)", target.display(), report.files_added);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod bundle;
pub mod deps;
pub mod error;
pub mod filter;
pub mod report;
pub mod script;

// Re-export main API types
pub use archive::ArchiveOptions;
pub use archive::DEFAULT_INTERPRETER;
pub use archive::create_archive;
pub use archive::default_target;
pub use archive::get_interpreter;
pub use archive::plan_archive;
pub use bundle::BundleOptions;
pub use bundle::default_requirements;
pub use bundle::pack_script;
pub use deps::DependencyInstaller;
pub use deps::InstallRequest;
pub use deps::PipInstaller;
pub use error::PackError;
pub use error::Result;
pub use filter::ArchiveFilter;
pub use filter::PatternSet;
pub use report::ArchiveReport;
pub use script::create_shell_script;
