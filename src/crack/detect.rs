//! Interpretation of external tool results: handshake presence and recovered keys.
//!
//! The crack tool reports success only through its console text, so the literal markers are kept
//! behind [OutputMatcher] and can be swapped when the tool's wording changes.

use std::{future::Future, io::Cursor, path::Path};

use anyhow::Context;
use clap::ValueEnum;
use tokio::fs;
use tracing::info;

use crate::{capture::utils::count_eapol_frames, tools::Tool, utils::run_streamed};

/// Recognizes a result in the combined output of an external tool.
pub trait OutputMatcher: Send + Sync {
    fn matches(&self, output: &str) -> bool;

    /// Extract the value the match refers to, if the output carries one.
    fn extract(&self, _output: &str) -> Option<String> {
        None
    }
}

/// Matches the crack tool's `KEY FOUND! [ key ]` line.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyFoundMatcher;

const KEY_FOUND: &str = "KEY FOUND!";

impl OutputMatcher for KeyFoundMatcher {
    fn matches(&self, output: &str) -> bool {
        output.contains(KEY_FOUND)
    }

    fn extract(&self, output: &str) -> Option<String> {
        let rest = &output[output.rfind(KEY_FOUND)? + KEY_FOUND.len()..];
        let line = rest.lines().next()?;
        let start = line.find('[')? + 1;
        let end = start + line[start..].find(']')?;
        Some(line[start..end].trim().to_string())
    }
}

/// Matches a non-zero handshake count such as `WPA (1 handshake)` in the crack tool's listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct HandshakeCountMatcher;

impl HandshakeCountMatcher {
    /// Sum of all handshake counts mentioned in the output.
    pub fn count(output: &str) -> u64 {
        let lower = output.to_lowercase();
        lower
            .match_indices("handshake")
            .filter_map(|(idx, _)| {
                let before = lower[..idx].trim_end();
                let digits = before.bytes().rev().take_while(u8::is_ascii_digit).count();
                before[before.len() - digits..].parse::<u64>().ok()
            })
            .sum()
    }
}

impl OutputMatcher for HandshakeCountMatcher {
    fn matches(&self, output: &str) -> bool {
        Self::count(output) > 0
    }
}

/// Decides whether a capture file holds a usable handshake.
pub trait HandshakeDetector {
    fn detect(&self, capture: &Path) -> impl Future<Output = anyhow::Result<bool>> + Send;
}

/// Let the crack tool list the capture and look for a handshake count.
#[derive(Debug, Clone)]
pub struct AircrackHandshakeCheck {
    pub aircrack: std::path::PathBuf,
}

impl HandshakeDetector for AircrackHandshakeCheck {
    async fn detect(&self, capture: &Path) -> anyhow::Result<bool> {
        let out = run_streamed(Tool::AircrackNg, &self.aircrack, [capture.as_os_str()]).await?;
        Ok(HandshakeCountMatcher.matches(&out.output))
    }
}

/// Inspect the capture directly for EAPOL key frames.
#[derive(Debug, Clone, Copy)]
pub struct EapolFrameCheck {
    /// Frames needed to call it a handshake. Two messages of the 4-way exchange are enough to
    /// test a password offline.
    pub min_frames: usize,
}

impl Default for EapolFrameCheck {
    fn default() -> Self {
        Self { min_frames: 2 }
    }
}

impl HandshakeDetector for EapolFrameCheck {
    async fn detect(&self, capture: &Path) -> anyhow::Result<bool> {
        let bytes = fs::read(capture)
            .await
            .context("could not read capture file")?;
        let frames = count_eapol_frames(Cursor::new(bytes))?;
        info!(frames, capture = %capture.display(), "Counted EAPOL frames");
        Ok(frames >= self.min_frames)
    }
}

/// How the crack workflow checks captures for handshakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HandshakeCheckKind {
    /// Ask aircrack-ng to list the capture.
    Aircrack,
    /// Count EAPOL frames in the capture.
    Eapol,
}

/// Runtime selected [HandshakeDetector].
#[derive(Debug, Clone)]
pub enum HandshakeCheck {
    Aircrack(AircrackHandshakeCheck),
    Eapol(EapolFrameCheck),
}

impl HandshakeCheck {
    pub fn new(kind: HandshakeCheckKind, aircrack: &Path) -> Self {
        match kind {
            HandshakeCheckKind::Aircrack => HandshakeCheck::Aircrack(AircrackHandshakeCheck {
                aircrack: aircrack.to_owned(),
            }),
            HandshakeCheckKind::Eapol => HandshakeCheck::Eapol(EapolFrameCheck::default()),
        }
    }
}

impl HandshakeDetector for HandshakeCheck {
    async fn detect(&self, capture: &Path) -> anyhow::Result<bool> {
        match self {
            HandshakeCheck::Aircrack(check) => check.detect(capture).await,
            HandshakeCheck::Eapol(check) => check.detect(capture).await,
        }
    }
}
