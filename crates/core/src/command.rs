//! Shell command execution used by the download strategies.

use std::process::Command;

use tracing::debug;

use crate::error::{DownloadError, Result};

/// Exit status and captured text of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Runs a shell command line to completion.
pub trait CommandRunner {
    fn run(&self, command: &str) -> Result<CommandOutput>;
}

/// Runs commands through the platform shell and blocks until they exit.
///
/// Output is stdout followed by stderr with the final line terminator
/// removed; anything else the tool printed (quotes included) is kept.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> Result<CommandOutput> {
        debug!(command, "Running command");

        let output = shell(command)
            .output()
            .map_err(|source| DownloadError::CommandLaunch {
                command: command.to_string(),
                source,
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        let text = text.strip_suffix('\n').unwrap_or(&text);
        let text = text.strip_suffix('\r').unwrap_or(text);

        // Killed by a signal: no code, report as failure
        let exit_code = output.status.code().unwrap_or(-1);
        debug!(command, exit_code, "Command finished");

        Ok(CommandOutput {
            exit_code,
            output: text.to_string(),
        })
    }
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", command]);
    cmd
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", command]);
    cmd
}

/// Quote a path or URI so `sh` passes it to the tool as one literal word.
#[cfg(not(windows))]
pub fn quote(arg: &str) -> Result<String> {
    shlex::try_quote(arg)
        .map(|quoted| quoted.into_owned())
        .map_err(|e| DownloadError::InvalidArgument {
            arg: arg.to_string(),
            reason: e.to_string(),
        })
}

/// Quote a path or URI for `cmd /C`.
#[cfg(windows)]
pub fn quote(arg: &str) -> Result<String> {
    if arg.contains(['"', '\0']) {
        return Err(DownloadError::InvalidArgument {
            arg: arg.to_string(),
            reason: "contains a double quote or nul byte".to_string(),
        });
    }
    Ok(format!("\"{}\"", arg))
}
