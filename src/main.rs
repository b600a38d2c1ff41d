pub mod capture;
pub mod config;
pub mod crack;
pub mod error;
pub mod history;
pub mod latest;
pub mod monitor;
pub mod parse;
pub mod scanner;
pub mod tools;
pub mod utils;

use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use config::Settings;
use crack::{
    detect::{HandshakeCheck, HandshakeCheckKind, KeyFoundMatcher},
    prompt::Prompter,
    CrackTools, Cracker,
};
use tokio::io::{stdin, stdout, BufReader};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Passive Wi-Fi reconnaissance driven by the aircrack-ng suite. Use only on networks you own.
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// Sets the logging verbosity.
    ///
    /// Can be: `trace`, `debug`, `info`, `warn`, `error`. Per-module directives can also be used,
    /// for example: `info,airwatch=debug.`
    #[arg(short = 'L', long, env, default_value = "INFO")]
    log_level: String,
    /// Settings file path. Built-in defaults are used when omitted.
    #[clap(short = 'C', long, value_parser)]
    config: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Continuously scan all networks in range and show them in a terminal UI.
    ///
    /// Logs go to stderr; redirect it to keep them off the screen.
    Monitor {
        /// Wireless interface, already in monitor mode.
        #[clap(short, long)]
        interface: String,
    },
    /// Passively capture handshakes of your own networks and test them against a wordlist.
    Crack {
        /// How captures are checked for a handshake.
        #[clap(long, value_enum, default_value = "aircrack")]
        handshake_check: HandshakeCheckKind,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse command-line arguments based on the [Args] struct.
    let args = Args::parse();

    // Set up human-readable logging using the `tracing-subcriber` crate. Stdout belongs to the
    // terminal UI and the operator prompts.
    tracing_subscriber::fmt()
        .with_env_filter(match EnvFilter::builder().parse(args.log_level) {
            Ok(v) => v,
            Err(err) => {
                eprintln!("Failed to parse log_level argument: {err:?}");
                return ExitCode::FAILURE;
            }
        })
        .with_writer(std::io::stderr)
        .init();
    debug!("Debug logging is enabled");

    let settings = match &args.config {
        Some(path) => match Settings::read(path).await {
            Ok(v) => v,
            Err(err) => {
                error!("Unable to parse `{path}`: {err:#}");
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };

    let result = match args.command {
        Command::Monitor { interface } => monitor(&interface, &settings).await,
        Command::Crack { handshake_check } => crack(handshake_check, settings).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn monitor(interface: &str, settings: &Settings) -> anyhow::Result<()> {
    if interface.trim().is_empty() {
        anyhow::bail!("an interface is required");
    }
    monitor::run(interface, settings).await
}

async fn crack(kind: HandshakeCheckKind, settings: Settings) -> anyhow::Result<()> {
    let tools = CrackTools::locate()?;
    let mut prompter = Prompter::new(BufReader::new(stdin()), stdout());
    prompter
        .say("MULTI PASSIVE CRACK (passive-only). Use only on your OWN networks.\n")
        .await?;

    let Some(plan) = crack::collect_plan(&mut prompter, &settings).await? else {
        prompter.say("Aborting.").await?;
        return Ok(());
    };

    let detector = HandshakeCheck::new(kind, &tools.aircrack);
    let cracker = Cracker::new(
        tools,
        detector,
        KeyFoundMatcher,
        settings,
        PathBuf::from("."),
    );
    let outcomes = cracker.run(&mut prompter, &plan).await?;
    for (bssid, outcome) in &outcomes {
        info!(bssid, ?outcome, "Result");
    }

    prompter
        .say("\n[*] All done. Remember: only test your own networks.")
        .await?;
    Ok(())
}
