//! Live passive monitor: a background scan worker feeding a terminal UI.

pub mod app;
pub mod ui;

use std::{io::stdout, panic, time::Duration};

use anyhow::Context;
use crossterm::{
    cursor::Show,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, prelude::CrosstermBackend, Terminal};
use tokio::{select, sync::mpsc, time::interval};
use tracing::{debug, info};

use crate::{
    config::Settings,
    latest::{self, Drain},
    scanner::{AirodumpSource, ScanEvent, ScanSource, Scanner, WorkerTiming},
};

use self::app::App;

const INPUT_POLL: Duration = Duration::from_millis(200);

/// What the presenter should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Start,
    Stop,
    Quit,
}

fn action_for(key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char('s') => Some(Action::Start),
        KeyCode::Char('x') => Some(Action::Stop),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        _ => None,
    }
}

/// Run the monitor on an interface that is already in monitor mode until the operator quits.
pub async fn run(interface: &str, settings: &Settings) -> anyhow::Result<()> {
    let source = AirodumpSource::new(interface, settings)?;
    let (tx, rx) = latest::channel();
    let mut scanner = Scanner::new(source, tx, WorkerTiming::from(settings));
    let mut app = App::new(interface, settings.channel_history);

    restore_on_panic();
    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    info!(interface, "Starting passive monitor");
    scanner.start();
    let result = present(&mut terminal, &mut app, &mut scanner, &rx, settings.poll_interval()).await;
    scanner.stop().await;

    result
}

/// Raw mode and the alternate screen, left again when dropped.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> anyhow::Result<Self> {
        enable_raw_mode().context("could not enable raw terminal mode")?;
        let guard = TerminalGuard;
        execute!(stdout(), EnterAlternateScreen).context("could not enter alternate screen")?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

fn restore_terminal() {
    if let Err(err) = disable_raw_mode() {
        debug!("Could not disable raw mode: {err}");
    }
    if let Err(err) = execute!(stdout(), LeaveAlternateScreen, Show) {
        debug!("Could not leave alternate screen: {err}");
    }
}

/// Leave the terminal usable before the panic message is printed.
fn restore_on_panic() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        restore_terminal();
        default_hook(info);
    }));
}

/// Forward key presses from the blocking terminal reader until the receiver is dropped.
fn spawn_input_reader() -> mpsc::UnboundedReceiver<KeyEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::task::spawn_blocking(move || loop {
        match event::poll(INPUT_POLL) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) => {
                    if tx.send(key).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    debug!("Terminal input failed: {err}");
                    break;
                }
            },
            Ok(false) if tx.is_closed() => break,
            Ok(false) => {}
            Err(err) => {
                debug!("Terminal input failed: {err}");
                break;
            }
        }
    });
    rx
}

async fn present<B: Backend, S: ScanSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    scanner: &mut Scanner<S>,
    rx: &Drain<ScanEvent>,
    poll_interval: Duration,
) -> anyhow::Result<()> {
    let mut keys = spawn_input_reader();
    let mut ticker = interval(poll_interval);

    loop {
        app.worker = scanner.state();
        terminal.draw(|frame| ui::draw(frame, app))?;

        select! {
            _ = ticker.tick() => {
                let applied = app.drain(rx);
                if applied > 0 {
                    debug!(applied, "Applied scan results");
                }
            }
            key = keys.recv() => {
                let Some(key) = key else {
                    return Ok(());
                };
                match action_for(key) {
                    Some(Action::Start) => {
                        scanner.start();
                    }
                    Some(Action::Stop) => scanner.stop().await,
                    Some(Action::Quit) => return Ok(()),
                    None => {}
                }
            }
        }
    }
}
