use anyhow::{Context, Result, bail};
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output};
use tracing::trace;

pub const DOCKER_BIN: &str = "docker";

/// Runs `docker <args>` and returns its trimmed stdout.
///
/// Output is always captured so it never interleaves with the spinners; on a
/// non-zero exit the captured stderr becomes part of the error.
pub fn docker<I, S>(args: I, workdir: Option<&Path>, context: &str) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = docker_output(args, workdir, context)?;
    ensure_success(&output, context)?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn docker_output<I, S>(args: I, workdir: Option<&Path>, context: &str) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(DOCKER_BIN);
    cmd.args(args.into_iter().map(|item| item.as_ref().to_os_string()));

    if let Some(dir) = workdir {
        cmd.current_dir(dir);
    }

    trace!(command = ?cmd, "executando");

    cmd.output().with_context(|| context.to_string())
}

fn ensure_success(output: &Output, context: &str) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        bail!("docker retornou status {:?} ({context})", output.status.code());
    }

    bail!(
        "docker retornou status {:?} ({context}): {stderr}",
        output.status.code()
    )
}
