use std::{path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use tokio::fs;

/// Tunables for the monitor and crack workflows. Every field has a default, so an empty file (or
/// no file at all) is a valid configuration.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    /// How long a single monitor capture runs before the tool is asked to stop.
    pub scan_duration_secs: u64,
    /// How long a capture may overrun its duration before it is killed.
    pub grace_period_secs: u64,
    /// How long to wait for a killed capture to be reaped.
    pub terminate_wait_secs: u64,
    /// Passed to the capture tool as `--write-interval`.
    pub write_interval_secs: u64,
    /// Interval at which the presenter drains the delivery queue and redraws.
    pub poll_interval_ms: u64,
    /// Number of samples kept in the channel utilization history.
    pub channel_history: usize,
    /// Pause after a failed capture before the worker retries.
    pub error_backoff_secs: u64,
    /// Pause between two successful monitor cycles.
    pub cycle_pause_ms: u64,
    /// Bounded wait for the worker to exit when stopping.
    pub stop_wait_ms: u64,
    /// Upper bound of targets accepted by the crack workflow.
    pub max_targets: usize,
    pub min_capture_secs: u64,
    pub default_capture_secs: u64,
    /// Pause between two targets in the crack workflow.
    pub target_pause_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scan_duration_secs: 10,
            grace_period_secs: 4,
            terminate_wait_secs: 2,
            write_interval_secs: 5,
            poll_interval_ms: 1000,
            channel_history: 30,
            error_backoff_secs: 2,
            cycle_pause_ms: 300,
            stop_wait_ms: 1000,
            max_targets: 6,
            min_capture_secs: 10,
            default_capture_secs: 60,
            target_pause_secs: 2,
        }
    }
}

impl Settings {
    /// Reads a settings file to a [Settings] object.
    pub async fn read(p: impl AsRef<Path>) -> anyhow::Result<Self> {
        let conf = fs::read_to_string(p)
            .await
            .context("could not read settings file")?;
        Self::parse(&conf)
    }

    /// Parse settings from TOML text and validate them.
    pub fn parse(conf: &str) -> anyhow::Result<Self> {
        let settings: Self = toml::from_str(conf)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the configuration for any disallowed values.
    fn validate(&self) -> anyhow::Result<()> {
        if self.channel_history == 0 {
            anyhow::bail!("`channel-history` must be at least 1");
        }
        if self.scan_duration_secs == 0 {
            anyhow::bail!("`scan-duration-secs` must be at least 1");
        }
        if self.poll_interval_ms == 0 {
            anyhow::bail!("`poll-interval-ms` must be at least 1");
        }
        if self.max_targets == 0 {
            anyhow::bail!("`max-targets` must be at least 1");
        }
        Ok(())
    }

    pub fn scan_duration(&self) -> Duration {
        Duration::from_secs(self.scan_duration_secs)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }

    pub fn terminate_wait(&self) -> Duration {
        Duration::from_secs(self.terminate_wait_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }

    pub fn cycle_pause(&self) -> Duration {
        Duration::from_millis(self.cycle_pause_ms)
    }

    pub fn stop_wait(&self) -> Duration {
        Duration::from_millis(self.stop_wait_ms)
    }
}
