//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use pyzkit_core::DEFAULT_INTERPRETER;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pyzkit")]
#[command(author, version, about = "zipapp packaging utilities", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a zipapp archive from a source directory
    #[command(visible_aliases = ["ca", "zipapp"])]
    CreateArchive(CreateArchiveArgs),
    /// Package a Python script and its dependencies into an archive
    #[command(name = "py2pyz", visible_alias = "p")]
    Pack(PackArgs),
    /// Generate a shell script that bundles and runs an archive
    #[command(name = "create-shell-script", visible_alias = "sh")]
    ShellScript(ShellScriptArgs),
    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
pub struct CreateArchiveArgs {
    /// Source directory (or existing archive)
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// The name of the output archive (required if SOURCE is an archive)
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// The Python interpreter written into the shebang line
    #[arg(short, long, default_value = DEFAULT_INTERPRETER, value_name = "INTERPRETER")]
    pub python: String,

    /// The main function of the application, as `module:function`
    /// (default: use an existing `__main__.py`)
    #[arg(short, long, value_name = "MODULE:FUNCTION")]
    pub main: Option<String>,

    /// Compress files with the deflate method (stored uncompressed by default)
    #[arg(short, long)]
    pub compress: bool,

    /// Display the interpreter from the archive instead of creating one
    #[arg(long)]
    pub info: bool,

    /// Perform a trial run: list the entries that would be added
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Don't exclude files matching PATTERN (repeatable)
    #[arg(long, value_name = "PATTERN")]
    pub include: Vec<String>,

    /// Read include patterns from FILE (repeatable)
    #[arg(long = "include-from", value_name = "FILE")]
    pub include_from: Vec<PathBuf>,

    /// Exclude files matching PATTERN (repeatable)
    #[arg(long, value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Read exclude patterns from FILE (repeatable)
    #[arg(long = "exclude-from", value_name = "FILE")]
    pub exclude_from: Vec<PathBuf>,
}

impl CreateArchiveArgs {
    /// Returns `true` if any include/exclude flag was given.
    pub fn has_filter_flags(&self) -> bool {
        !self.include.is_empty()
            || !self.include_from.is_empty()
            || !self.exclude.is_empty()
            || !self.exclude_from.is_empty()
    }
}

#[derive(clap::Args)]
pub struct PackArgs {
    /// Python script file
    #[arg(value_name = "SCRIPT")]
    pub source: PathBuf,

    /// Add a dependency (repeatable)
    #[arg(short, long = "dep", value_name = "PACKAGE")]
    pub dep: Vec<String>,

    /// Install dependencies from the given requirements file
    /// (defaults to "requirements.txt" next to SCRIPT)
    #[arg(short, long, value_name = "FILE", num_args = 0..=1)]
    pub requirement: Option<Option<PathBuf>>,

    /// The name of the output archive
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// The Python interpreter written into the shebang line
    #[arg(short, long, default_value = DEFAULT_INTERPRETER, value_name = "INTERPRETER")]
    pub python: String,

    /// The main function of the application, as `module:function`
    #[arg(short, long, value_name = "MODULE:FUNCTION")]
    pub main: Option<String>,

    /// Compress files with the deflate method
    #[arg(short, long)]
    pub compress: bool,
}

#[derive(clap::Args)]
pub struct ShellScriptArgs {
    /// Path to the archive file
    #[arg(value_name = "PYTHON_APPLICATION_ARCHIVE")]
    pub pyz: PathBuf,

    /// Path to the output file
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,
}
