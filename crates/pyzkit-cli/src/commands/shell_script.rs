//! create-shell-script command implementation.

use crate::cli::ShellScriptArgs;
use crate::error::convert_pack_error;
use crate::output::OutputFormatter;
use anyhow::Result;
use pyzkit_core::create_shell_script;

pub fn execute(args: &ShellScriptArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let output = create_shell_script(&args.pyz, args.output.as_deref())
        .map_err(|e| convert_pack_error(e, &args.pyz))?;
    formatter.format_script_result(&output)?;
    Ok(())
}
