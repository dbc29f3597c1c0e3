//! External formatter invocation.

use std::path::PathBuf;
use std::process::Command;

use crate::config::Formatter;
use crate::error::{Error, Result};

/// Run `formatter` over `paths` in one invocation.
///
/// # Errors
///
/// Returns [`Error::FormatterFailure`] when the program cannot be started
/// or exits non-zero. Callers treat this as a warning: the files are
/// already written.
pub fn run(formatter: &Formatter, paths: &[PathBuf]) -> Result<()> {
    let Some((program, args)) = formatter.command.split_first() else {
        return Ok(());
    };
    if paths.is_empty() {
        return Ok(());
    }
    tracing::debug!(program, files = paths.len(), "running formatter");

    let status = Command::new(program)
        .args(args)
        .args(paths)
        .status()
        .map_err(|err| Error::FormatterFailure {
            command: program.clone(),
            status: err.to_string(),
        })?;

    if !status.success() {
        return Err(Error::FormatterFailure {
            command: program.clone(),
            status: status.to_string(),
        });
    }
    Ok(())
}
