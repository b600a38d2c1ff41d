use crate::{
    history::{compare_channels, ChannelHistory},
    latest::Drain,
    parse::{AccessPointRecord, StationRecord},
    scanner::{ScanEvent, WorkerState},
};

/// Outcome of the most recent scan cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// No scan result received yet.
    Waiting,
    Ok {
        /// The station section was missing from the last sample.
        degraded: bool,
    },
    Error(String),
}

/// Everything the monitor screen shows. Owned by the presenter loop and passed to the renderer.
#[derive(Debug)]
pub struct App {
    pub interface: String,
    pub access_points: Vec<AccessPointRecord>,
    pub stations: Vec<StationRecord>,
    pub history: ChannelHistory,
    pub status: Status,
    pub worker: WorkerState,
    /// Number of samples received since startup.
    pub samples: u64,
}

impl App {
    pub fn new(interface: impl Into<String>, history_capacity: usize) -> Self {
        Self {
            interface: interface.into(),
            access_points: Vec::new(),
            stations: Vec::new(),
            history: ChannelHistory::new(history_capacity),
            status: Status::Waiting,
            worker: WorkerState::Idle,
            samples: 0,
        }
    }

    /// Apply a single worker event. Errors only change the status, the last good sample stays on
    /// screen.
    pub fn apply(&mut self, event: ScanEvent) {
        match event {
            ScanEvent::Sample(parsed) => {
                self.history.record(&parsed.sample.access_points);
                self.access_points = parsed.sample.access_points;
                self.stations = parsed.sample.stations;
                self.samples += 1;
                self.status = Status::Ok {
                    degraded: parsed.degraded,
                };
            }
            ScanEvent::Error(message) => self.status = Status::Error(message),
        }
    }

    /// Apply every pending event without blocking. Returns how many were applied.
    pub fn drain(&mut self, rx: &Drain<ScanEvent>) -> usize {
        let mut applied = 0;
        for event in rx.drain() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// One line summary of the newest channel histogram.
    pub fn channel_summary(&self) -> String {
        let Some(latest) = self.history.latest() else {
            return "Channel counts (latest): none".to_string();
        };
        let mut channels: Vec<_> = latest.iter().collect();
        channels.sort_by(|(a, _), (b, _)| compare_channels(a, b));
        let counts = channels
            .iter()
            .map(|(channel, count)| format!("{channel}:{count}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("Channel counts (latest): {counts}")
    }

    pub fn status_text(&self) -> String {
        match &self.status {
            Status::Waiting => "waiting for first scan".to_string(),
            Status::Ok { degraded: false } => format!("ok ({} samples)", self.samples),
            Status::Ok { degraded: true } => {
                format!("ok ({} samples, station list unavailable)", self.samples)
            }
            Status::Error(message) => format!("error: {message}"),
        }
    }
}
