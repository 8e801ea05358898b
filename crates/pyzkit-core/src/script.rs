//! Shell-script bootstrappers for archives.
//!
//! The generated script is plain ASCII `sh`: the archive travels inside it
//! as a base64 heredoc, gets decoded to a temp file at run time and handed
//! to `python3` with the caller's arguments and exit status preserved.

use crate::PackError;
use crate::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tracing::info;

/// Base64 heredocs wrap at the width `base64(1)` itself emits.
const PAYLOAD_LINE_WIDTH: usize = 76;

const BOOTSTRAP_TEMPLATE: &str = r#"#!/bin/sh
# Runs the Python application archive embedded below.
set -u

PYZ="$(mktemp "${TMPDIR:-/tmp}/pyzkit.XXXXXX")"
base64 -d > "$PYZ" <<'PYZKIT_PAYLOAD'
@payload@
PYZKIT_PAYLOAD

python3 "$PYZ" "$@"
status=$?
rm -f "$PYZ"
exit $status
"#;

/// Encodes a file as wrapped base64 lines.
pub fn encode_file(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    let encoded = STANDARD.encode(bytes);
    let mut wrapped = String::with_capacity(encoded.len() + encoded.len() / PAYLOAD_LINE_WIDTH);
    let mut rest = encoded.as_str();
    while rest.len() > PAYLOAD_LINE_WIDTH {
        let (line, tail) = rest.split_at(PAYLOAD_LINE_WIDTH);
        wrapped.push_str(line);
        wrapped.push('\n');
        rest = tail;
    }
    wrapped.push_str(rest);
    Ok(wrapped)
}

/// Generates a self-contained shell script that runs `pyz`.
///
/// Returns the script path; defaults to the archive path with an `.sh`
/// extension. On Unix the script is made executable.
///
/// # Errors
///
/// Fails if the archive does not exist or either file cannot be read or
/// written.
pub fn create_shell_script(pyz: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let pyz = fs::canonicalize(pyz).map_err(|_| PackError::SourceNotFound {
        path: pyz.to_path_buf(),
    })?;
    if !pyz.is_file() {
        return Err(PackError::InvalidArchive {
            path: pyz,
            reason: "not an archive file".to_owned(),
        });
    }

    let payload = encode_file(&pyz)?;
    let script = BOOTSTRAP_TEMPLATE.replace("@payload@", &payload);

    let output = output.map_or_else(|| pyz.with_extension("sh"), Path::to_path_buf);
    fs::write(&output, script)?;
    make_executable(&output)?;
    info!(archive = %pyz.display(), script = %output.display(), "wrote bootstrap script");
    Ok(output)
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
