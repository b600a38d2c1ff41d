//! Interactive passive capture and dictionary test of operator owned networks.
//!
//! Each target must be confirmed by re-typing its SSID, and the whole run by typing `YES`. Only
//! passive captures are made: a handshake shows up when one of the operator's own clients
//! reconnects during the capture.

pub mod detect;
pub mod prompt;

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    time::Duration,
};

use chrono::{Local, NaiveDateTime};
use tokio::{
    fs,
    io::{AsyncBufRead, AsyncWrite},
    time::sleep,
};
use tracing::{info, warn};

use crate::{
    capture::{run_capture, CaptureConfig, OutputFormat, TargetFilter},
    config::Settings,
    error::ReconError,
    tools::Tool,
    utils::run_streamed,
};

use self::{
    detect::{HandshakeDetector, OutputMatcher},
    prompt::Prompter,
};

/// A confirmed network to capture and test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub bssid: String,
    pub channel: String,
    pub ssid: String,
    pub wordlist: PathBuf,
    pub duration: Duration,
}

/// The confirmed interface and targets of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub interface: String,
    pub targets: Vec<Target>,
}

/// How a single target ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    /// No capture file was written.
    CaptureMissing,
    NoHandshake,
    KeyFound(Option<String>),
    KeyNotFound {
        /// Hashcat file written on the operator's request.
        converted: Option<PathBuf>,
    },
    /// A step failed. The run moves on to the next target.
    Failed(String),
}

/// Paths of the tools the workflow cannot run without.
#[derive(Debug, Clone)]
pub struct CrackTools {
    pub airodump: PathBuf,
    pub aircrack: PathBuf,
}

impl CrackTools {
    pub fn locate() -> Result<Self, ReconError> {
        Ok(Self {
            airodump: Tool::AirodumpNg.locate()?,
            aircrack: Tool::AircrackNg.locate()?,
        })
    }
}

/// Clamp the requested number of targets. Unparsable input means one target.
pub fn parse_target_count(answer: &str, max: usize) -> usize {
    let answer = if answer.is_empty() { "1" } else { answer };
    match answer.parse::<i64>() {
        Ok(n) => n.clamp(1, max as i64) as usize,
        Err(_) => 1,
    }
}

/// Parse a capture duration, raising short ones to `min` and using `default` for bad input.
pub fn parse_capture_secs(answer: &str, min: u64, default: u64) -> u64 {
    match answer.parse::<i64>() {
        Ok(n) if n < min as i64 => min,
        Ok(n) => n as u64,
        Err(_) => default,
    }
}

/// Parse the length of a retry capture.
pub fn parse_retry_secs(answer: &str) -> u64 {
    match answer.parse::<i64>() {
        Ok(n) if n < 5 => 15,
        Ok(n) => n as u64,
        Err(_) => 30,
    }
}

/// Check that the re-typed SSID matches the first one.
pub fn confirm_ssid(ssid: &str, confirmation: &str) -> Result<(), ReconError> {
    if ssid.is_empty() || ssid != confirmation {
        return Err(ReconError::ConfirmationMismatch);
    }
    Ok(())
}

/// File name prefix for the captures of a target.
pub fn capture_prefix(bssid: &str, now: NaiveDateTime) -> String {
    format!(
        "auto_{}_{}",
        bssid.replace(':', ""),
        now.format("%Y%m%d_%H%M%S")
    )
}

/// Ask the operator for the interface and targets. Returns `None` if the operator did not
/// confirm the run with `YES`.
pub async fn collect_plan<R, W>(
    prompter: &mut Prompter<R, W>,
    settings: &Settings,
) -> anyhow::Result<Option<Plan>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let interface = prompter
        .ask("Enter wireless interface to use, already in monitor mode (e.g. wlan0mon): ")
        .await?;
    if interface.is_empty() {
        anyhow::bail!("an interface is required");
    }

    let count = parse_target_count(
        &prompter
            .ask(format!(
                "How many targets (1-{})? Recommend 1-3: ",
                settings.max_targets
            ))
            .await?,
        settings.max_targets,
    );

    let mut targets = Vec::with_capacity(count);
    for i in 0..count {
        prompter.say(format!("\n--- Target #{} ---", i + 1)).await?;
        let bssid = prompter.ask("BSSID (AA:BB:CC:DD:EE:FF): ").await?;
        let channel = prompter.ask("Channel (e.g. 6): ").await?;
        let ssid = prompter.ask("SSID (network name): ").await?;
        let confirmation = prompter
            .ask("Type the SSID EXACTLY to confirm you own this network: ")
            .await?;
        if let Err(err) = confirm_ssid(&ssid, &confirmation) {
            warn!(bssid, "Target skipped: {err}");
            prompter.say("Confirmation mismatch. Skipping this target.").await?;
            continue;
        }

        let wordlist = PathBuf::from(
            prompter
                .ask("Path to wordlist for this target (one password per line): ")
                .await?,
        );
        let is_file = fs::metadata(&wordlist)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if wordlist.as_os_str().is_empty() || !is_file {
            prompter.say("Wordlist not found. Skipping this target.").await?;
            continue;
        }

        let secs = parse_capture_secs(
            &prompter
                .ask("Capture duration in seconds (recommended 30-120): ")
                .await?,
            settings.min_capture_secs,
            settings.default_capture_secs,
        );

        targets.push(Target {
            bssid,
            channel,
            ssid,
            wordlist,
            duration: Duration::from_secs(secs),
        });
    }

    if targets.is_empty() {
        anyhow::bail!("no confirmed targets");
    }

    prompter.say("\nSummary of confirmed targets:").await?;
    for t in &targets {
        prompter
            .say(format!(
                " - {} (chan {}) SSID={} wordlist={} dur={}s",
                t.bssid,
                t.channel,
                t.ssid,
                t.wordlist.display(),
                t.duration.as_secs()
            ))
            .await?;
    }

    let ok = prompter
        .ask("Type YES to proceed with passive captures for these targets: ")
        .await?;
    if ok != "YES" {
        return Ok(None);
    }

    Ok(Some(Plan { interface, targets }))
}

/// Drives the per target steps with the located tools.
pub struct Cracker<D> {
    tools: CrackTools,
    detector: D,
    matcher: Box<dyn OutputMatcher>,
    settings: Settings,
    /// Directory the captures are written to.
    workdir: PathBuf,
}

impl<D: HandshakeDetector> Cracker<D> {
    /// `matcher` decides from the crack tool's output whether the key was recovered.
    pub fn new(
        tools: CrackTools,
        detector: D,
        matcher: impl OutputMatcher + 'static,
        settings: Settings,
        workdir: PathBuf,
    ) -> Self {
        Self {
            tools,
            detector,
            matcher: Box::new(matcher),
            settings,
            workdir,
        }
    }

    fn capture_config(&self, interface: &str, target: &Target, duration: Duration) -> CaptureConfig {
        CaptureConfig {
            interface: interface.to_string(),
            filter: TargetFilter {
                bssid: Some(target.bssid.clone()),
                channel: Some(target.channel.clone()).filter(|c| !c.is_empty()),
            },
            duration,
            grace: self.settings.grace_period(),
            terminate_wait: self.settings.terminate_wait(),
            write_interval: self.settings.write_interval_secs,
            formats: vec![OutputFormat::Pcap, OutputFormat::Csv],
        }
    }

    /// Capture into files starting with `prefix` and return the pcap file.
    async fn capture(
        &self,
        interface: &str,
        target: &Target,
        duration: Duration,
        prefix: &Path,
    ) -> Result<PathBuf, ReconError> {
        let config = self.capture_config(interface, target, duration);
        let output = run_capture(&self.tools.airodump, &config, prefix).await?;
        if output.timed_out {
            warn!(bssid = target.bssid, "Capture was force-stopped; using partial output");
        }
        output
            .find(OutputFormat::Pcap)
            .await
            .ok_or_else(|| ReconError::OutputMissing(output.path(OutputFormat::Pcap)))
    }

    /// Run every target of a confirmed plan in order.
    pub async fn run<R, W>(
        &self,
        prompter: &mut Prompter<R, W>,
        plan: &Plan,
    ) -> anyhow::Result<Vec<(String, TargetOutcome)>>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut outcomes = Vec::with_capacity(plan.targets.len());
        for (i, target) in plan.targets.iter().enumerate() {
            if i > 0 {
                sleep(Duration::from_secs(self.settings.target_pause_secs)).await;
            }
            let outcome = self.run_target(prompter, &plan.interface, target).await?;
            info!(bssid = target.bssid, ?outcome, "Target finished");
            outcomes.push((target.bssid.clone(), outcome));
        }
        Ok(outcomes)
    }

    async fn run_target<R, W>(
        &self,
        prompter: &mut Prompter<R, W>,
        interface: &str,
        target: &Target,
    ) -> anyhow::Result<TargetOutcome>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let prefix = self
            .workdir
            .join(capture_prefix(&target.bssid, Local::now().naive_local()));

        prompter
            .say(format!(
                "\n=== Processing {} (chan {}) ===",
                target.bssid, target.channel
            ))
            .await?;
        prompter
            .say(format!(
                "[*] Passive capturing for {}s. If you want a handshake, temporarily disconnect & \
                 reconnect one of your OWN clients now.",
                target.duration.as_secs()
            ))
            .await?;

        let mut capfile = match self.capture(interface, target, target.duration, &prefix).await {
            Ok(path) => path,
            Err(ReconError::OutputMissing(path)) => {
                warn!(bssid = target.bssid, path = %path.display(), "Capture file not found");
                prompter
                    .say("[WARN] Capture file not found after capture. Skipping this target.")
                    .await?;
                return Ok(TargetOutcome::CaptureMissing);
            }
            Err(err) => {
                let err = anyhow::Error::from(err).context("capture failed");
                return give_up(prompter, target, err).await;
            }
        };

        prompter
            .say(format!(
                "[*] Capture saved to {}. Checking for handshake...",
                capfile.display()
            ))
            .await?;
        let mut has_handshake = match self.detector.detect(&capfile).await {
            Ok(found) => found,
            Err(err) => {
                return give_up(prompter, target, err.context("handshake check failed")).await
            }
        };

        if !has_handshake {
            prompter.say("[NOTICE] No handshake detected.").await?;
            let retry = prompter
                .ask(
                    "Type 'retry' to run a short retry capture (you should toggle your client \
                     now), or press Enter to skip cracking: ",
                )
                .await?;
            if retry.eq_ignore_ascii_case("retry") {
                let secs = parse_retry_secs(&prompter.ask("Retry seconds (recommended 15-45): ").await?);
                prompter
                    .say(format!(
                        "[*] Running retry passive capture for {secs}s. Toggle your client now."
                    ))
                    .await?;

                let mut retry_prefix = prefix.clone().into_os_string();
                retry_prefix.push("_retry");
                match self
                    .capture(interface, target, Duration::from_secs(secs), Path::new(&retry_prefix))
                    .await
                {
                    Ok(path) => {
                        prompter.say("[*] Retry complete. Re-checking handshake...").await?;
                        has_handshake = match self.detector.detect(&path).await {
                            Ok(found) => found,
                            Err(err) => {
                                return give_up(prompter, target, err.context("handshake check failed"))
                                    .await
                            }
                        };
                        capfile = path;
                    }
                    Err(ReconError::OutputMissing(_)) => {
                        prompter.say("[WARN] Retry capture produced no file.").await?;
                    }
                    Err(err) => {
                        let err = anyhow::Error::from(err).context("retry capture failed");
                        return give_up(prompter, target, err).await;
                    }
                }
            }
        }

        if !has_handshake {
            prompter
                .say("[X] Still no handshake present. Cannot attempt cracking for this target.")
                .await?;
            return Ok(TargetOutcome::NoHandshake);
        }

        prompter
            .say(format!(
                "[*] Running aircrack-ng with wordlist {} on BSSID {} ...",
                target.wordlist.display(),
                target.bssid
            ))
            .await?;
        let out = match run_streamed(
            Tool::AircrackNg,
            &self.tools.aircrack,
            [
                OsStr::new("-w"),
                target.wordlist.as_os_str(),
                OsStr::new("-b"),
                OsStr::new(&target.bssid),
                capfile.as_os_str(),
            ],
        )
        .await
        {
            Ok(out) => out,
            Err(err) => {
                let err = anyhow::Error::from(err).context("aircrack-ng failed");
                return give_up(prompter, target, err).await;
            }
        };

        if self.matcher.matches(&out.output) {
            let key = self.matcher.extract(&out.output);
            prompter
                .say("[SUCCESS] Password recovered! See above output for KEY FOUND.")
                .await?;
            return Ok(TargetOutcome::KeyFound(key));
        }

        prompter
            .say("[INFO] aircrack-ng did not find the key with provided wordlist.")
            .await?;
        let convert = prompter
            .ask("Convert capture to hashcat format (.22000) for GPU cracking? (y/N): ")
            .await?;
        let converted = if convert.eq_ignore_ascii_case("y") {
            let mut outname = prefix.into_os_string();
            outname.push(".22000");
            let outname = PathBuf::from(outname);
            let converted = match convert_to_hashcat(&capfile, &outname).await {
                Ok(converted) => converted,
                Err(err) => {
                    warn!("Conversion failed: {err:#}");
                    false
                }
            };
            if converted {
                prompter
                    .say(format!(
                        "[OK] Converted to {0}. Example hashcat command:\n  hashcat -m 22000 {0} {1}",
                        outname.display(),
                        target.wordlist.display()
                    ))
                    .await?;
                Some(outname)
            } else {
                prompter
                    .say("[WARN] Conversion failed or hcxpcapngtool missing.")
                    .await?;
                None
            }
        } else {
            None
        };

        Ok(TargetOutcome::KeyNotFound { converted })
    }
}

/// Report a failed step to the operator and give up on the target. Only prompt errors are
/// returned.
async fn give_up<R, W>(
    prompter: &mut Prompter<R, W>,
    target: &Target,
    err: anyhow::Error,
) -> anyhow::Result<TargetOutcome>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    warn!(bssid = target.bssid, "Target failed: {err:#}");
    prompter
        .say(format!("[WARN] {err:#}. Skipping this target."))
        .await?;
    Ok(TargetOutcome::Failed(format!("{err:#}")))
}

/// Convert a capture to the hashcat `22000` format. A missing converter is not an error.
async fn convert_to_hashcat(capfile: &Path, outname: &Path) -> anyhow::Result<bool> {
    let tool = match Tool::HcxPcapngTool.locate() {
        Ok(path) => path,
        Err(err) => {
            warn!("{err}");
            return Ok(false);
        }
    };
    let out = run_streamed(
        Tool::HcxPcapngTool,
        &tool,
        [OsStr::new("-o"), outname.as_os_str(), capfile.as_os_str()],
    )
    .await?;
    Ok(out.status.success())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{
        detect::{AircrackHandshakeCheck, EapolFrameCheck, KeyFoundMatcher},
        *,
    };

    fn settings() -> Settings {
        Settings::default()
    }

    async fn plan_for(input: &str) -> (anyhow::Result<Option<Plan>>, String) {
        let mut prompter = Prompter::new(input.as_bytes(), Vec::new());
        let plan = collect_plan(&mut prompter, &settings()).await;
        (plan, String::from_utf8(prompter.into_output()).unwrap())
    }

    fn wordlist() -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "password\nhunter22\n").unwrap();
        file
    }

    #[test]
    fn target_count_is_clamped() {
        assert_eq!(parse_target_count("", 6), 1);
        assert_eq!(parse_target_count("0", 6), 1);
        assert_eq!(parse_target_count("-3", 6), 1);
        assert_eq!(parse_target_count("4", 6), 4);
        assert_eq!(parse_target_count("9", 6), 6);
        assert_eq!(parse_target_count("two", 6), 1);
    }

    #[test]
    fn durations_have_floors_and_defaults() {
        assert_eq!(parse_capture_secs("5", 10, 60), 10);
        assert_eq!(parse_capture_secs("90", 10, 60), 90);
        assert_eq!(parse_capture_secs("", 10, 60), 60);
        assert_eq!(parse_retry_secs("3"), 15);
        assert_eq!(parse_retry_secs("20"), 20);
        assert_eq!(parse_retry_secs("soon"), 30);
    }

    #[test]
    fn ssid_confirmation() {
        assert!(confirm_ssid("MyNet", "MyNet").is_ok());
        assert!(matches!(
            confirm_ssid("MyNet", "mynet"),
            Err(ReconError::ConfirmationMismatch)
        ));
        assert!(confirm_ssid("", "").is_err());
    }

    #[test]
    fn prefix_strips_colons() {
        let now = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(
            capture_prefix("AA:BB:CC:DD:EE:FF", now),
            "auto_AABBCCDDEEFF_20240102_030405"
        );
    }

    #[tokio::test]
    async fn confirmed_plan() {
        let wl = wordlist();
        let input = format!(
            "wlan0mon\n1\nAA:BB:CC:DD:EE:FF\n6\nMyNet\nMyNet\n{}\n5\nYES\n",
            wl.path().display()
        );
        let (plan, out) = plan_for(&input).await;

        let plan = plan.unwrap().unwrap();
        assert_eq!(plan.interface, "wlan0mon");
        assert_eq!(
            plan.targets,
            vec![Target {
                bssid: "AA:BB:CC:DD:EE:FF".into(),
                channel: "6".into(),
                ssid: "MyNet".into(),
                wordlist: wl.path().to_owned(),
                duration: Duration::from_secs(10),
            }]
        );
        assert!(out.contains("Summary of confirmed targets"));
    }

    #[tokio::test]
    async fn mismatched_target_is_skipped_but_run_continues() {
        let wl = wordlist();
        let input = format!(
            "wlan0mon\n2\n\
             AA:AA:AA:AA:AA:AA\n1\nFirst\nfirst\n\
             BB:BB:BB:BB:BB:BB\n11\nSecond\nSecond\n{}\n60\nYES\n",
            wl.path().display()
        );
        let (plan, out) = plan_for(&input).await;

        let plan = plan.unwrap().unwrap();
        assert_eq!(plan.targets.len(), 1);
        assert_eq!(plan.targets[0].bssid, "BB:BB:BB:BB:BB:BB");
        assert_eq!(plan.targets[0].duration, Duration::from_secs(60));
        assert!(out.contains("Confirmation mismatch"));
    }

    #[tokio::test]
    async fn missing_wordlist_skips_target() {
        let input = "wlan0mon\n1\nAA:BB\n6\nNet\nNet\n/nonexistent/words.txt\n";
        let (plan, out) = plan_for(input).await;

        assert!(plan.unwrap_err().to_string().contains("no confirmed targets"));
        assert!(out.contains("Wordlist not found"));
    }

    #[tokio::test]
    async fn empty_interface_is_fatal() {
        let (plan, _) = plan_for("\n").await;
        assert!(plan.unwrap_err().to_string().contains("interface"));
    }

    #[tokio::test]
    async fn anything_but_yes_aborts() {
        let wl = wordlist();
        let input = format!(
            "wlan0mon\n1\nAA:BB\n6\nNet\nNet\n{}\n30\nyes\n",
            wl.path().display()
        );
        let (plan, _) = plan_for(&input).await;
        assert_eq!(plan.unwrap(), None);
    }

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Capture tool that writes `first` into a regular capture and `retry` into a retry capture.
    fn fake_airodump(dir: &Path, first: &str, retry: &str) -> PathBuf {
        script(
            dir,
            "airodump-ng",
            &format!(
                "case \"$3\" in\n  *_retry) printf '{retry}' > \"$3-01.cap\" ;;\n  *) printf '{first}' > \"$3-01.cap\" ;;\nesac\n"
            ),
        )
    }

    /// Crack tool that lists one handshake for captures containing `handshake` and recovers
    /// `hunter22` when the wordlist holds it.
    fn fake_aircrack(dir: &Path) -> PathBuf {
        script(
            dir,
            "aircrack-ng",
            "if [ \"$#\" -eq 1 ]; then\n\
             \x20 if grep -q handshake \"$1\"; then n=1; else n=0; fi\n\
             \x20 echo \"   1  AA:BB:CC:DD:EE:FF  MyNet  WPA ($n handshake)\"\n\
             elif grep -q hunter22 \"$2\"; then\n\
             \x20 echo 'KEY FOUND! [ hunter22 ]'\n\
             else\n\
             \x20 echo 'Passphrase not in dictionary'\n\
             fi\n",
        )
    }

    fn cracker<D: HandshakeDetector>(dir: &Path, airodump: PathBuf, detector: D) -> Cracker<D> {
        let tools = CrackTools {
            airodump,
            aircrack: fake_aircrack(dir),
        };
        let settings = Settings {
            target_pause_secs: 0,
            ..Settings::default()
        };
        Cracker::new(tools, detector, KeyFoundMatcher, settings, dir.to_owned())
    }

    fn aircrack_check(dir: &Path) -> AircrackHandshakeCheck {
        AircrackHandshakeCheck {
            aircrack: dir.join("aircrack-ng"),
        }
    }

    fn target(bssid: &str, wordlist: &Path) -> Target {
        Target {
            bssid: bssid.into(),
            channel: "6".into(),
            ssid: "MyNet".into(),
            wordlist: wordlist.to_owned(),
            duration: Duration::from_secs(5),
        }
    }

    async fn run_plan<D: HandshakeDetector>(
        cracker: &Cracker<D>,
        targets: Vec<Target>,
        input: &str,
    ) -> (Vec<(String, TargetOutcome)>, String) {
        let mut prompter = Prompter::new(input.as_bytes(), Vec::new());
        let plan = Plan {
            interface: "wlan0mon".into(),
            targets,
        };
        let outcomes = cracker.run(&mut prompter, &plan).await.unwrap();
        (outcomes, String::from_utf8(prompter.into_output()).unwrap())
    }

    fn retry_captures(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with("_retry-01.cap"))
            .collect()
    }

    #[tokio::test]
    async fn key_is_recovered_from_handshake() {
        let dir = tempfile::tempdir().unwrap();
        let wl = wordlist();
        let cracker = cracker(
            dir.path(),
            fake_airodump(dir.path(), "handshake", "handshake"),
            aircrack_check(dir.path()),
        );

        let (outcomes, out) =
            run_plan(&cracker, vec![target("AA:BB:CC:DD:EE:FF", wl.path())], "").await;

        assert_eq!(
            outcomes,
            [(
                "AA:BB:CC:DD:EE:FF".to_string(),
                TargetOutcome::KeyFound(Some("hunter22".into()))
            )]
        );
        assert!(out.contains("[SUCCESS]"));
        assert!(retry_captures(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn skipped_retry_means_no_handshake() {
        let dir = tempfile::tempdir().unwrap();
        let wl = wordlist();
        let cracker = cracker(
            dir.path(),
            fake_airodump(dir.path(), "nothing", "handshake"),
            aircrack_check(dir.path()),
        );

        let (outcomes, out) =
            run_plan(&cracker, vec![target("AA:BB:CC:DD:EE:FF", wl.path())], "\n").await;

        assert_eq!(outcomes[0].1, TargetOutcome::NoHandshake);
        assert!(out.contains("[NOTICE] No handshake detected."));
        assert!(out.contains("Still no handshake present"));
        assert!(retry_captures(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn retry_capture_is_checked_and_cracked() {
        let dir = tempfile::tempdir().unwrap();
        let wl = dir.path().join("words.txt");
        std::fs::write(&wl, "password\nletmein\n").unwrap();
        let cracker = cracker(
            dir.path(),
            fake_airodump(dir.path(), "nothing", "handshake"),
            aircrack_check(dir.path()),
        );

        let (outcomes, out) = run_plan(
            &cracker,
            vec![target("AA:BB:CC:DD:EE:FF", &wl)],
            "retry\n20\nn\n",
        )
        .await;

        assert_eq!(
            outcomes[0].1,
            TargetOutcome::KeyNotFound { converted: None }
        );
        assert!(out.contains("Retry complete. Re-checking handshake"));
        assert!(out.contains("did not find the key"));
        let retries = retry_captures(dir.path());
        assert_eq!(retries.len(), 1);
        assert!(retries[0].starts_with("auto_AABBCCDDEEFF_"));
    }

    #[tokio::test]
    async fn failed_target_does_not_end_run() {
        let dir = tempfile::tempdir().unwrap();
        let wl = wordlist();
        // Empty captures are not valid pcap files.
        let cracker = cracker(
            dir.path(),
            fake_airodump(dir.path(), "", ""),
            EapolFrameCheck::default(),
        );

        let (outcomes, out) = run_plan(
            &cracker,
            vec![
                target("AA:AA:AA:AA:AA:AA", wl.path()),
                target("BB:BB:BB:BB:BB:BB", wl.path()),
            ],
            "",
        )
        .await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1].0, "BB:BB:BB:BB:BB:BB");
        for (_, outcome) in &outcomes {
            assert!(
                matches!(outcome, TargetOutcome::Failed(msg) if msg.contains("handshake check failed"))
            );
        }
        assert_eq!(out.matches("[WARN]").count(), 2);
        assert!(out.contains("=== Processing BB:BB:BB:BB:BB:BB"));
    }
}
