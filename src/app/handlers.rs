//! Key input handlers.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::{
    clipboard,
    input::InputBoxState,
    shortcuts,
    validate::UploadCandidate,
    worker::WorkerCmd,
};

use super::App;

/// Handle one key event; returns true when the app should exit.
pub async fn handle_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    // An open input box takes priority over everything else.
    if app.input_box.is_some() {
        return handle_input_box_key(app, k).await;
    }

    let sc = &app.shortcuts.main;

    if shortcuts::matches_shortcut(&k, &sc.quit) {
        return Ok(true);
    } else if shortcuts::matches_shortcut(&k, &sc.upload) {
        app.input_box = Some(InputBoxState::new("Invoice image path (JPG/PNG):"));
    } else if shortcuts::matches_shortcut(&k, &sc.sample) {
        run_sample(app).await?;
    } else if shortcuts::matches_shortcut(&k, &sc.download) {
        request_download(app).await?;
    } else if shortcuts::matches_shortcut(&k, &sc.copy) {
        copy_line_items(app);
    } else if shortcuts::matches_shortcut(&k, &sc.reset) {
        app.workflow.reset();
        app.status = "Ready".into();
    }

    Ok(false)
}

/// True for Ctrl+C, which quits from any state.
pub fn is_ctrl_c(k: &KeyEvent) -> bool {
    k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c')
}

/// Keys while the path input box is open.
async fn handle_input_box_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    let sc = app.shortcuts.input_box.clone();

    if shortcuts::matches_shortcut(&k, &sc.cancel) {
        app.input_box = None;
        return Ok(false);
    }
    if shortcuts::matches_shortcut(&k, &sc.confirm) {
        let path = app
            .input_box
            .take()
            .map(|b| b.value.trim().to_string())
            .unwrap_or_default();
        if !path.is_empty() {
            submit_path(app, &path).await?;
        }
        return Ok(false);
    }

    let Some(input) = app.input_box.as_mut() else {
        return Ok(false);
    };

    if shortcuts::matches_shortcut(&k, &sc.backspace) {
        input.backspace();
    } else if shortcuts::matches_shortcut(&k, &sc.delete) {
        input.delete();
    } else if shortcuts::matches_shortcut(&k, &sc.left) {
        input.move_left();
    } else if shortcuts::matches_shortcut(&k, &sc.right) {
        input.move_right();
    } else if shortcuts::matches_shortcut(&k, &sc.home) {
        input.move_home();
    } else if shortcuts::matches_shortcut(&k, &sc.end) {
        input.move_end();
    } else if shortcuts::matches_shortcut(&k, &sc.clear_line) {
        input.clear_line();
    } else if let KeyCode::Char(c) = k.code {
        if k.modifiers.is_empty() || k.modifiers == KeyModifiers::SHIFT {
            input.insert_char(c);
        }
    }

    Ok(false)
}

/// Read the file, run validation through the workflow, and dispatch the
/// extraction when it passes. A failing validation never reaches the
/// worker.
async fn submit_path(app: &mut App, path: &str) -> Result<()> {
    let candidate = match UploadCandidate::from_path(Path::new(path)).await {
        Ok(candidate) => candidate,
        Err(err) => {
            tracing::warn!("upload aborted: {err:#}");
            app.status = format!("Could not read {path}");
            return Ok(());
        }
    };

    let name = candidate.file_name.clone();
    if let Some(req) = app.workflow.submit_file(candidate) {
        app.status = format!("Processing {name}…");
        app.worker_tx
            .send(WorkerCmd::Extract {
                seq: req.seq,
                candidate: req.candidate,
            })
            .await?;
    } else {
        app.status = "Upload rejected".into();
    }
    Ok(())
}

/// Kick off the bundled sample. Reachable from any stage, including the
/// error panel's "try sample invoice" affordance.
async fn run_sample(app: &mut App) -> Result<()> {
    let req = app.workflow.use_sample();
    app.status = "Processing sample invoice…".into();
    app.worker_tx
        .send(WorkerCmd::ExtractSample { seq: req.seq })
        .await?;
    Ok(())
}

/// Request the spreadsheet export for the current result.
async fn request_download(app: &mut App) -> Result<()> {
    if let Some(req) = app.workflow.begin_download() {
        app.status = "Building Excel…".into();
        app.worker_tx
            .send(WorkerCmd::Export { result: req.result })
            .await?;
    } else {
        app.status = "Nothing to download yet".into();
    }
    Ok(())
}

/// Copy the line items as TSV.
fn copy_line_items(app: &mut App) {
    let Some(text) = app.workflow.copy_rows() else {
        app.status = "Nothing to copy yet".into();
        return;
    };
    match clipboard::copy(&text) {
        Ok(()) => {
            app.workflow.note_copied(Instant::now());
            app.status = "Copied line items".into();
        }
        Err(err) => {
            tracing::warn!("clipboard write failed: {err:#}");
            app.status = "Copy failed".into();
        }
    }
}
