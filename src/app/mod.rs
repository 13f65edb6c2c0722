//! App event loop and shared state.

mod handlers;
mod render;

use anyhow::Result;
use crossterm::event::{self, Event};
use std::{
    path::PathBuf,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;

use crate::{
    config::Config,
    events::AppEvent,
    input::InputBoxState,
    progress::ProgressTicker,
    shortcuts::Shortcuts,
    ui::Tui,
    worker::{self, WorkerCmd},
    workflow::{Stage, Workflow},
};

use handlers::{handle_key, is_ctrl_c};
use render::draw;

/// State shared between input handling and rendering.
pub struct App {
    /// In-memory configuration.
    pub cfg: Config,
    /// The extraction workflow controller; single source of truth for
    /// everything the stage panel renders.
    pub workflow: Workflow,
    /// Command channel into the worker.
    pub worker_tx: mpsc::Sender<WorkerCmd>,
    /// Event channel out of the worker and the progress ticker.
    pub events_rx: mpsc::Receiver<AppEvent>,
    /// Kept to hand a sender to each new progress ticker.
    pub events_tx: mpsc::Sender<AppEvent>,
    /// Path input popup (open while `Some`).
    pub input_box: Option<InputBoxState>,
    /// Keybindings.
    pub shortcuts: Shortcuts,
    /// Status bar text.
    pub status: String,
    /// Alive exactly while the workflow is processing; dropping it aborts
    /// the ticker task.
    ticker: Option<ProgressTicker>,
}

/// Run the main TUI loop until the user quits.
pub async fn run_app(terminal: &mut Tui) -> Result<()> {
    let cfg_path = PathBuf::from("config.toml");
    let cfg = Config::load_or_default(&cfg_path)?;

    let shortcuts_path = PathBuf::from("shortcut.toml");
    let shortcuts = Shortcuts::load_or_default(&shortcuts_path)?;

    let (tx_cmd, rx_cmd) = mpsc::channel::<WorkerCmd>(64);
    let (tx_ev, rx_ev) = mpsc::channel::<AppEvent>(256);

    tokio::spawn(worker::run(rx_cmd, tx_ev.clone(), cfg.clone()));

    let mut app = App {
        cfg,
        workflow: Workflow::new(),
        worker_tx: tx_cmd,
        events_rx: rx_ev,
        events_tx: tx_ev,
        input_box: None,
        shortcuts,
        status: "Ready".into(),
        ticker: None,
    };

    loop {
        terminal.draw(|f| draw(f, &app))?;

        // Drain background events before reading input.
        while let Ok(ev) = app.events_rx.try_recv() {
            handle_app_event(&mut app, ev);
        }
        app.workflow.expire_transients(Instant::now());
        sync_ticker(&mut app);

        // Short poll timeout keeps the UI responsive.
        if event::poll(Duration::from_millis(50))?
            && let Event::Key(k) = event::read()?
        {
            if is_ctrl_c(&k) {
                break;
            }
            if handle_key(&mut app, k).await? {
                break;
            }
            sync_ticker(&mut app);
        }
    }
    Ok(())
}

/// Apply one background event to the workflow.
fn handle_app_event(app: &mut App, ev: AppEvent) {
    match ev {
        AppEvent::Extracted { seq, outcome } => {
            app.workflow.apply_extraction(seq, outcome);
            app.status = match app.workflow.stage() {
                Stage::Result => "Extraction complete".into(),
                Stage::Error => "Extraction failed".into(),
                // A stale outcome leaves the stage untouched.
                _ => app.status.clone(),
            };
        }
        AppEvent::Exported { outcome } => {
            app.status = match &outcome {
                Ok(name) => format!("Saved {name}"),
                Err(_) => "Export failed".into(),
            };
            app.workflow.finish_download(outcome, Instant::now());
        }
        AppEvent::ProgressTick => app.workflow.advance_progress(),
    }
}

/// Keep the ticker's lifetime tied to the processing stage.
fn sync_ticker(app: &mut App) {
    let processing = app.workflow.stage() == Stage::Processing;
    match (processing, app.ticker.is_some()) {
        (true, false) => app.ticker = Some(ProgressTicker::spawn(app.events_tx.clone())),
        (false, true) => app.ticker = None,
        _ => {}
    }
}
