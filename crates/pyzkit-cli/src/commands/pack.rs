//! py2pyz command implementation.

use crate::cli::PackArgs;
use crate::error::convert_pack_error;
use crate::output::OutputFormatter;
use crate::progress::InstallSpinner;
use anyhow::Result;
use pyzkit_core::BundleOptions;
use pyzkit_core::PipInstaller;
use pyzkit_core::default_requirements;
use pyzkit_core::pack_script;

pub fn execute(args: &PackArgs, formatter: &dyn OutputFormatter, show_spinner: bool) -> Result<()> {
    let requirements = args.requirement.as_ref().map(|explicit| {
        explicit
            .clone()
            .unwrap_or_else(|| default_requirements(&args.source))
    });
    let wants_install = requirements.is_some() || !args.dep.is_empty();

    let options = BundleOptions {
        deps: args.dep.clone(),
        requirements,
        output: args.output.clone(),
        interpreter: Some(args.python.clone()),
        entry_point: args.main.clone(),
        compress: args.compress,
    };

    let installer = PipInstaller::new();
    let spinner = (show_spinner && wants_install && InstallSpinner::should_show())
        .then(|| InstallSpinner::new("Installing dependencies"));
    let result = pack_script(&args.source, &options, &installer);
    drop(spinner);

    let (target, report) = result.map_err(|e| convert_pack_error(e, &args.source))?;
    formatter.format_archive_result(&target, &report)?;
    Ok(())
}
