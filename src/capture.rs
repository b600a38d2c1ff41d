pub mod utils;

use std::{
    ffi::OsString,
    io::ErrorKind,
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use nix::{
    sys::signal::{self, Signal},
    unistd::Pid,
};
use tokio::{fs, process::Command, time::timeout};
use tracing::{debug, warn};

use crate::{error::ReconError, parse::Row, tools::Tool};

/// Restricts a capture to a single network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetFilter {
    pub bssid: Option<String>,
    pub channel: Option<String>,
}

/// File formats the capture tool should write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Pcap,
}

impl OutputFormat {
    fn as_arg(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Pcap => "pcap",
        }
    }

    /// Extension of the file written for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Pcap => "cap",
        }
    }
}

/// Defines options for a passive capture on a monitor mode interface.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Name of the interface to capture on. Must already be in monitor mode.
    pub interface: String,
    pub filter: TargetFilter,
    /// How long the capture should run before the tool is asked to stop.
    pub duration: Duration,
    /// How long the tool may take to exit after being asked to stop.
    pub grace: Duration,
    /// How long to wait for the tool to be reaped after it was killed.
    pub terminate_wait: Duration,
    /// Seconds between two flushes of the output files.
    pub write_interval: u64,
    pub formats: Vec<OutputFormat>,
}

impl CaptureConfig {
    /// Build the process arguments for a capture writing files starting with `prefix`.
    pub fn args(&self, prefix: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            self.interface.clone().into(),
            "-w".into(),
            prefix.as_os_str().to_owned(),
            "--write-interval".into(),
            self.write_interval.to_string().into(),
        ];

        if !self.formats.is_empty() {
            let formats = self
                .formats
                .iter()
                .map(|f| f.as_arg())
                .collect::<Vec<_>>()
                .join(",");
            args.push("-o".into());
            args.push(formats.into());
        }
        if let Some(bssid) = &self.filter.bssid {
            args.push("--bssid".into());
            args.push(bssid.into());
        }
        if let Some(channel) = &self.filter.channel {
            args.push("-c".into());
            args.push(channel.into());
        }
        args
    }
}

/// Where a finished capture left its files.
#[derive(Debug, Clone)]
pub struct CaptureOutput {
    pub prefix: PathBuf,
    /// The tool did not exit within the grace period and was killed. Files may be incomplete.
    pub timed_out: bool,
}

impl CaptureOutput {
    /// Path of the first file the tool writes for a format.
    pub fn path(&self, format: OutputFormat) -> PathBuf {
        let mut name = self.prefix.as_os_str().to_owned();
        name.push(format!("-01.{}", format.extension()));
        PathBuf::from(name)
    }

    /// Find the written file for a format. Falls back to any file in the same directory that
    /// starts with the prefix, as the tool increments the `-01` suffix when files already exist.
    pub async fn find(&self, format: OutputFormat) -> Option<PathBuf> {
        let exact = self.path(format);
        if fs::try_exists(&exact).await.unwrap_or(false) {
            return Some(exact);
        }

        let dir = match self.prefix.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_owned(),
            _ => PathBuf::from("."),
        };
        let stem = self.prefix.file_name()?.to_string_lossy().into_owned();
        let suffix = format!(".{}", format.extension());

        let mut entries = fs::read_dir(&dir).await.ok()?;
        let mut candidates = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(&stem) && name.ends_with(&suffix) {
                candidates.push(entry.path());
            }
        }
        candidates.sort();
        candidates.into_iter().next()
    }
}

/// Run the capture tool with the given configuration and wait for it to finish.
///
/// The tool runs until it is stopped, so after `duration` it receives SIGTERM, which makes it
/// flush its files. If it is still running after `grace` it gets killed.
pub async fn run_capture(
    tool: &Path,
    config: &CaptureConfig,
    prefix: &Path,
) -> Result<CaptureOutput, ReconError> {
    let args = config.args(prefix);
    debug!(interface = config.interface, ?args, "Starting capture");

    let mut child = Command::new(tool)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| match source.kind() {
            ErrorKind::NotFound => ReconError::ToolMissing {
                tool: Tool::AirodumpNg,
                hint: Tool::AirodumpNg.install_hint(),
            },
            _ => ReconError::Spawn {
                tool: Tool::AirodumpNg,
                source,
            },
        })?;

    let mut timed_out = false;
    match timeout(config.duration, child.wait()).await {
        Ok(status) => {
            let status = status?;
            debug!(%status, "Capture tool exited on its own");
        }
        Err(_) => {
            if let Some(id) = child.id() {
                if let Err(err) = signal::kill(Pid::from_raw(id as i32), Signal::SIGTERM) {
                    debug!("Could not signal capture tool: {err}");
                }
            }

            if timeout(config.grace, child.wait()).await.is_err() {
                debug!(
                    interface = config.interface,
                    "Capture overran its grace period and was killed"
                );
                timed_out = true;
                child.start_kill()?;
                if timeout(config.terminate_wait, child.wait()).await.is_err() {
                    warn!("Killed capture tool was not reaped in time");
                }
            }
        }
    }

    Ok(CaptureOutput {
        prefix: prefix.to_owned(),
        timed_out,
    })
}

/// Run a CSV capture in a temporary directory and return its rows. The directory is removed
/// before returning.
pub async fn scan_rows(tool: &Path, config: &CaptureConfig) -> Result<Vec<Row>, ReconError> {
    let dir = tempfile::Builder::new().prefix("airwatch-").tempdir()?;
    let prefix = dir.path().join("scan");

    let output = run_capture(tool, config, &prefix).await?;
    read_rows(&output.path(OutputFormat::Csv)).await
}

/// Read a CSV output file into rows.
pub async fn read_rows(path: &Path) -> Result<Vec<Row>, ReconError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(rows_from_text(&String::from_utf8_lossy(&bytes))),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            Err(ReconError::OutputMissing(path.to_owned()))
        }
        Err(err) => Err(err.into()),
    }
}

/// Split text into comma separated rows, skipping blank lines.
pub fn rows_from_text(text: &str) -> Vec<Row> {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .map(|line| line.split(',').map(str::to_string).collect())
        .collect()
}
