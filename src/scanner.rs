//! Background worker that repeatedly captures, parses and publishes scan samples.

use std::{fmt::Display, future::Future, path::PathBuf, sync::Arc, time::Duration};

use tokio::{select, sync::watch, task::JoinHandle, time::sleep, time::timeout};
use tracing::{debug, info, warn};

use crate::{
    capture::{self, CaptureConfig, OutputFormat, TargetFilter},
    config::Settings,
    error::ReconError,
    latest::Publisher,
    parse::{parse_rows, ParsedScan, Row},
    tools::Tool,
};

/// Something that produces raw scan rows, one capture per call.
pub trait ScanSource: Send + Sync + 'static {
    fn scan(&self) -> impl Future<Output = Result<Vec<Row>, ReconError>> + Send;
}

/// Passive scan of all networks in range with the capture tool.
#[derive(Debug, Clone)]
pub struct AirodumpSource {
    tool: PathBuf,
    config: CaptureConfig,
}

impl AirodumpSource {
    /// Locate the capture tool and prepare an untargeted CSV capture on `interface`.
    pub fn new(interface: &str, settings: &Settings) -> Result<Self, ReconError> {
        Ok(Self {
            tool: Tool::AirodumpNg.locate()?,
            config: CaptureConfig {
                interface: interface.to_string(),
                filter: TargetFilter::default(),
                duration: settings.scan_duration(),
                grace: settings.grace_period(),
                terminate_wait: settings.terminate_wait(),
                write_interval: settings.write_interval_secs,
                formats: vec![OutputFormat::Csv],
            },
        })
    }
}

impl ScanSource for AirodumpSource {
    async fn scan(&self) -> Result<Vec<Row>, ReconError> {
        capture::scan_rows(&self.tool, &self.config).await
    }
}

/// An item passed from the worker to the presenter.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    Sample(ParsedScan),
    /// The capture failed. Carries a human readable status.
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Running,
    Stopping,
}

impl Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            WorkerState::Idle => "idle",
            WorkerState::Running => "running",
            WorkerState::Stopping => "stopping",
        })
    }
}

/// Pauses of the worker loop.
#[derive(Debug, Clone, Copy)]
pub struct WorkerTiming {
    /// Pause between two successful cycles.
    pub cycle_pause: Duration,
    /// Pause after a failed cycle.
    pub error_backoff: Duration,
    /// Bounded wait for the worker to exit on [Scanner::stop].
    pub stop_wait: Duration,
}

impl From<&Settings> for WorkerTiming {
    fn from(settings: &Settings) -> Self {
        Self {
            cycle_pause: settings.cycle_pause(),
            error_backoff: settings.error_backoff(),
            stop_wait: settings.stop_wait(),
        }
    }
}

struct Worker {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Owns at most one worker task feeding a latest-wins slot.
pub struct Scanner<S> {
    source: Arc<S>,
    publisher: Publisher<ScanEvent>,
    timing: WorkerTiming,
    worker: Option<Worker>,
    state: WorkerState,
}

impl<S: ScanSource> Scanner<S> {
    pub fn new(source: S, publisher: Publisher<ScanEvent>, timing: WorkerTiming) -> Self {
        Self {
            source: Arc::new(source),
            publisher,
            timing,
            worker: None,
            state: WorkerState::Idle,
        }
    }

    pub fn state(&self) -> WorkerState {
        match (&self.worker, self.state) {
            (Some(worker), WorkerState::Running) if worker.handle.is_finished() => {
                WorkerState::Idle
            }
            (_, state) => state,
        }
    }

    /// Spawn the worker. Does nothing and returns false if a worker is already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) -> bool {
        if let Some(worker) = &self.worker {
            if !worker.handle.is_finished() {
                debug!("Scan worker already running");
                return false;
            }
        }

        let (stop, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(run_worker(
            self.source.clone(),
            self.publisher.clone(),
            self.timing,
            stop_rx,
        ));
        self.worker = Some(Worker { stop, handle });
        self.state = WorkerState::Running;
        true
    }

    /// Signal the worker to exit and wait a bounded time for it. A worker that does not exit in
    /// time is left to finish its current cycle on its own.
    pub async fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.state = WorkerState::Stopping;

        // The receiver keeps observing `true` even once the sender is dropped.
        let _ = worker.stop.send(true);
        let mut handle = worker.handle;
        match timeout(self.timing.stop_wait, &mut handle).await {
            Ok(Ok(())) => debug!("Scan worker joined"),
            Ok(Err(err)) => warn!("Scan worker ended abnormally: {err}"),
            Err(_) => warn!("Scan worker did not stop in time; abandoning it"),
        }
        self.state = WorkerState::Idle;
    }
}

async fn run_worker<S: ScanSource>(
    source: Arc<S>,
    publisher: Publisher<ScanEvent>,
    timing: WorkerTiming,
    mut stop: watch::Receiver<bool>,
) {
    info!("Scan worker started");
    while !*stop.borrow() {
        let (event, pause) = match source.scan().await {
            Ok(rows) => {
                let parsed = parse_rows(&rows);
                if parsed.degraded {
                    debug!("Station section missing from scan output; showing access points only");
                }
                debug!(
                    access_points = parsed.sample.access_points.len(),
                    stations = parsed.sample.stations.len(),
                    "Scan cycle finished"
                );
                (ScanEvent::Sample(parsed), timing.cycle_pause)
            }
            Err(err) => {
                debug!("Scan failed: {err}");
                (ScanEvent::Error(err.to_string()), timing.error_backoff)
            }
        };

        if *stop.borrow() {
            break;
        }
        if publisher.publish(event).is_some() {
            debug!("Replaced a scan result that was never displayed");
        }
        if !keep_running(&mut stop, pause).await {
            break;
        }
    }
    info!("Scan worker stopped");
}

/// Sleep for `pause`, returning false early if a stop was requested.
async fn keep_running(stop: &mut watch::Receiver<bool>, pause: Duration) -> bool {
    select! {
        _ = sleep(pause) => true,
        _ = stop.wait_for(|stopped| *stopped) => false,
    }
}
