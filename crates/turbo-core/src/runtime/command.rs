//! Allow-listed execution of template-declared commands
//!
//! Templates may declare an `installCommand` and a `startCommand`. Only the
//! leading program is checked, against the configured allow-list; arguments
//! are passed through unchanged and no shell is involved on unix.

use crate::error::{Error, Result};
use colored::Colorize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command as TokioCommand;

/// Return `program` if it is on the allow-list
pub fn check_command<'a, S: AsRef<str>>(program: &'a str, allow_list: &[S]) -> Result<&'a str> {
    if allow_list.iter().any(|allowed| allowed.as_ref() == program) {
        Ok(program)
    } else {
        Err(Error::CommandRejected(program.to_string()))
    }
}

/// Split a command line on whitespace into program and arguments
pub fn parse_command_line(line: &str) -> Option<(&str, Vec<&str>)> {
    let mut parts = line.split_whitespace();
    let program = parts.next()?;
    Some((program, parts.collect()))
}

/// Run `line` in `cwd` with inherited stdio, rejecting programs outside `allow_list`
///
/// A non-zero exit status is an [`Error::Install`].
pub async fn exec_command<S: AsRef<str>>(line: &str, cwd: &Path, allow_list: &[S]) -> Result<()> {
    let (program, args) = parse_command_line(line)
        .ok_or_else(|| Error::NotFound("empty command".into()))?;
    let program = check_command(program, allow_list)?;

    println!("{} {}", "Running:".dimmed(), line.yellow());
    tracing::debug!(program, ?args, cwd = %cwd.display(), "spawning command");

    let mut command = platform_command(program, &args);
    let status = command
        .current_dir(cwd)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| Error::Install(format!("failed to start '{}': {}", program, e)))?;

    if status.success() {
        Ok(())
    } else {
        Err(Error::Install(format!(
            "'{}' failed with exit code {}",
            line,
            status.code().unwrap_or(-1)
        )))
    }
}

/// npm and cnpm are `.cmd` shims on Windows and must go through `cmd /c`
fn platform_command(program: &str, args: &[&str]) -> TokioCommand {
    if cfg!(windows) {
        let mut command = TokioCommand::new("cmd");
        command.arg("/c").arg(program).args(args);
        command
    } else {
        let mut command = TokioCommand::new(program);
        command.args(args);
        command
    }
}
