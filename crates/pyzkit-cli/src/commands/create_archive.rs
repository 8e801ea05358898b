//! Create-archive command implementation.

use crate::cli::CreateArchiveArgs;
use crate::error::convert_pack_error;
use crate::error::info_requires_archive;
use crate::output::OutputFormatter;
use anyhow::Result;
use pyzkit_core::ArchiveFilter;
use pyzkit_core::ArchiveOptions;
use pyzkit_core::PatternSet;
use pyzkit_core::create_archive;
use pyzkit_core::get_interpreter;
use pyzkit_core::plan_archive;

pub fn execute(args: &CreateArchiveArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    if args.info {
        if !args.source.is_file() {
            return Err(info_requires_archive(&args.source));
        }
        let interpreter =
            get_interpreter(&args.source).map_err(|e| convert_pack_error(e, &args.source))?;
        formatter.format_interpreter(interpreter.as_deref())?;
        return Ok(());
    }

    let filter = build_filter(args)?;
    let options = ArchiveOptions::new()
        .with_interpreter(Some(args.python.clone()))
        .with_entry_point(args.main.clone())
        .with_compress(args.compress)
        .with_filter(filter);

    if args.dry_run {
        let entries =
            plan_archive(&args.source, &options).map_err(|e| convert_pack_error(e, &args.source))?;
        formatter.format_plan(&entries)?;
        return Ok(());
    }

    let (target, report) = create_archive(&args.source, args.output.as_deref(), &options)
        .map_err(|e| convert_pack_error(e, &args.source))?;
    formatter.format_archive_result(&target, &report)?;
    Ok(())
}

/// Builds the file-inclusion filter, but only when a filter flag was given:
/// with no patterns at all the archive writer's include-everything default
/// applies (which, unlike an empty filter, also admits extensionless files).
fn build_filter(args: &CreateArchiveArgs) -> Result<Option<ArchiveFilter>> {
    if !args.has_filter_flags() {
        return Ok(None);
    }
    let include = PatternSet::from_sources(&args.include, &args.include_from)
        .map_err(|e| convert_pack_error(e, &args.source))?;
    let exclude = PatternSet::from_sources(&args.exclude, &args.exclude_from)
        .map_err(|e| convert_pack_error(e, &args.source))?;
    let filter = ArchiveFilter::build(&args.source, &include, &exclude)
        .map_err(|e| convert_pack_error(e, &args.source))?;
    Ok(Some(filter))
}
