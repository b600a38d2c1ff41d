use std::{
    ffi::OsStr,
    io::ErrorKind,
    path::Path,
    process::{ExitStatus, Stdio},
};

use tokio::{
    io::{AsyncBufReadExt, BufReader},
    process::Command,
    select,
};
use tracing::debug;

use crate::{error::ReconError, tools::Tool};

/// Exit status and combined stdout/stderr of an external tool.
#[derive(Debug)]
pub struct ToolOutput {
    pub status: ExitStatus,
    /// Lines of stdout and stderr in the order they were read.
    pub output: String,
}

/// Run an external tool, echoing its stdout and stderr line by line while collecting both.
pub async fn run_streamed<I, S>(
    tool: Tool,
    program: &Path,
    args: I,
) -> Result<ToolOutput, ReconError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<_> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
    println!(
        "+ {} {}",
        tool,
        args.iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let mut child = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| match source.kind() {
            ErrorKind::NotFound => ReconError::ToolMissing {
                tool,
                hint: tool.install_hint(),
            },
            _ => ReconError::Spawn { tool, source },
        })?;

    // SAFETY: `Stdio::piped()` is used above for both streams, so they should be present.
    let mut stdout = BufReader::new(child.stdout.take().expect("missing stdout handle")).lines();
    let mut stderr = BufReader::new(child.stderr.take().expect("missing stderr handle")).lines();

    let mut lines = Vec::new();
    let (mut stdout_done, mut stderr_done) = (false, false);
    while !(stdout_done && stderr_done) {
        let line = select! {
            line = stdout.next_line(), if !stdout_done => {
                let line = line?;
                stdout_done = line.is_none();
                line
            }
            line = stderr.next_line(), if !stderr_done => {
                let line = line?;
                stderr_done = line.is_none();
                line
            }
        };
        if let Some(line) = line {
            println!("{line}");
            lines.push(line);
        }
    }

    let status = child.wait().await?;
    debug!(%tool, %status, lines = lines.len(), "External tool finished");

    Ok(ToolOutput {
        status,
        output: lines.join("\n"),
    })
}
