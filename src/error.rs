use std::{io, path::PathBuf};

use thiserror::Error;

use crate::tools::Tool;

/// Failures surfaced by the capture and crack plumbing.
///
/// None of these abort a run on their own: the monitor worker turns them into a status line and
/// the crack workflow skips the affected target.
#[derive(Debug, Error)]
pub enum ReconError {
    /// A required external program could not be found in the `PATH`.
    #[error("required program `{tool}` not found; {hint}")]
    ToolMissing { tool: Tool, hint: String },
    /// The external tool ran but never produced the expected output file.
    #[error("expected output file `{}` was never written", .0.display())]
    OutputMissing(PathBuf),
    /// The operator re-typed a confirmation that did not match.
    #[error("confirmation did not match")]
    ConfirmationMismatch,
    #[error("failed to start `{tool}`")]
    Spawn {
        tool: Tool,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}
