//! Lookup of the external programs this controller shells out to.

use std::{
    env,
    fmt::Display,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::error::ReconError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    /// Passive capture tool writing CSV and pcap files.
    AirodumpNg,
    /// Dictionary cracker, also used to inspect captures for handshakes.
    AircrackNg,
    /// Converts captures to the hashcat `22000` format.
    HcxPcapngTool,
}

impl Tool {
    /// Name of the executable as found in the `PATH`.
    pub fn binary(&self) -> &'static str {
        match self {
            Tool::AirodumpNg => "airodump-ng",
            Tool::AircrackNg => "aircrack-ng",
            Tool::HcxPcapngTool => "hcxpcapngtool",
        }
    }

    /// Get the name of the package that ships the tool.
    pub fn package(&self) -> &'static str {
        match self {
            Tool::AirodumpNg | Tool::AircrackNg => "aircrack-ng",
            Tool::HcxPcapngTool => "hcxtools",
        }
    }

    /// A remediation hint shown when the tool is missing.
    pub fn install_hint(&self) -> String {
        format!(
            "install it (e.g. sudo apt install {}) and retry",
            self.package()
        )
    }

    /// Find the tool in the `PATH`, returning the full path of the executable.
    pub fn locate(&self) -> Result<PathBuf, ReconError> {
        let path = env::var_os("PATH").unwrap_or_default();
        self.locate_in(env::split_paths(&path))
    }

    /// Find the tool in the provided directories, in order.
    pub fn locate_in(
        &self,
        dirs: impl IntoIterator<Item = PathBuf>,
    ) -> Result<PathBuf, ReconError> {
        let found = dirs
            .into_iter()
            .map(|dir| dir.join(self.binary()))
            .find(|candidate| is_executable(candidate));

        match found {
            Some(path) => {
                debug!(tool = %self, path = %path.display(), "Located external tool");
                Ok(path)
            }
            None => Err(ReconError::ToolMissing {
                tool: *self,
                hint: self.install_hint(),
            }),
        }
    }
}

impl Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.binary())
    }
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    match path.metadata() {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}
