//! Background worker executing network jobs for the workflow.
//!
//! Commands arrive over an mpsc channel and are processed one at a time;
//! every outcome goes back to the event loop as an [`AppEvent`]. The
//! worker never touches workflow state directly.

use std::path::Path;

use reqwest::Client;
use tokio::sync::mpsc;

use crate::{
    api::{ApiError, ExtractionApi, HttpApi},
    config::Config,
    events::AppEvent,
    model::ExtractionResult,
    validate::UploadCandidate,
    workflow::SAMPLE_FILE_NAME,
};

/// Fixed name of the saved spreadsheet.
pub const EXPORT_FILE_NAME: &str = "snap2sheet.xlsx";

/// Shown when the bundled sample cannot be read or reached.
pub const SAMPLE_UNAVAILABLE: &str = "Unable to run the sample right now.";

/// Shown when the service rejects the sample upload.
pub const SAMPLE_EXTRACTION_FAILED: &str = "Sample extraction failed. Try again.";

/// Commands sent from the event loop to the worker.
#[derive(Debug)]
pub enum WorkerCmd {
    /// Upload a validated candidate for extraction.
    Extract {
        seq: u64,
        candidate: UploadCandidate,
    },
    /// Read the bundled sample invoice and extract it.
    ExtractSample { seq: u64 },
    /// Export the result as a spreadsheet and save it to disk.
    Export {
        result: ExtractionResult,
    },
}

/// Main worker loop with the reqwest-backed client.
pub async fn run(rx: mpsc::Receiver<WorkerCmd>, tx: mpsc::Sender<AppEvent>, cfg: Config) {
    let api = HttpApi::new(Client::new(), cfg.api.base_url.clone());
    run_with_api(rx, tx, cfg, api).await;
}

/// Loop body, generic over the service client so tests can stub it.
pub async fn run_with_api<A: ExtractionApi>(
    mut rx: mpsc::Receiver<WorkerCmd>,
    tx: mpsc::Sender<AppEvent>,
    cfg: Config,
    api: A,
) {
    tracing::info!("worker started, base url {}", cfg.api.base_url);

    while let Some(cmd) = rx.recv().await {
        match cmd {
            WorkerCmd::Extract { seq, candidate } => {
                let outcome = api
                    .extract(&candidate)
                    .await
                    .map_err(|err| err.to_string());
                let _ = tx.send(AppEvent::Extracted { seq, outcome }).await;
            }

            WorkerCmd::ExtractSample { seq } => {
                let outcome = extract_sample(&api, &cfg.sample.path).await;
                let _ = tx.send(AppEvent::Extracted { seq, outcome }).await;
            }

            WorkerCmd::Export { result } => {
                let outcome = export_and_save(&api, &cfg.download.dir, &result).await;
                let _ = tx.send(AppEvent::Exported { outcome }).await;
            }
        }
    }
    tracing::info!("worker stopped");
}

/// Read the sample asset and run it through extraction. The asset is
/// trusted, so no validation happens here either.
async fn extract_sample<A: ExtractionApi>(
    api: &A,
    path: &Path,
) -> Result<ExtractionResult, String> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!("sample asset unreadable at {}: {err}", path.display());
            return Err(SAMPLE_UNAVAILABLE.to_string());
        }
    };
    let candidate = UploadCandidate {
        bytes,
        mime_type: "image/jpeg".to_string(),
        file_name: SAMPLE_FILE_NAME.to_string(),
    };
    api.extract(&candidate).await.map_err(|err| match err {
        ApiError::Extraction(_) => SAMPLE_EXTRACTION_FAILED.to_string(),
        _ => SAMPLE_UNAVAILABLE.to_string(),
    })
}

/// Fetch the spreadsheet bytes and write them under the fixed export name.
async fn export_and_save<A: ExtractionApi>(
    api: &A,
    dir: &Path,
    result: &ExtractionResult,
) -> Result<String, String> {
    let bytes = api
        .export_xlsx(result)
        .await
        .map_err(|err| err.to_string())?;

    if let Err(err) = tokio::fs::create_dir_all(dir).await {
        tracing::error!("could not create download dir {}: {err}", dir.display());
        return Err(crate::api::EXPORT_FAILED.to_string());
    }
    let path = dir.join(EXPORT_FILE_NAME);
    match tokio::fs::write(&path, bytes).await {
        Ok(()) => {
            tracing::info!("spreadsheet saved to {}", path.display());
            Ok(EXPORT_FILE_NAME.to_string())
        }
        Err(err) => {
            tracing::error!("could not write {}: {err}", path.display());
            Err(crate::api::EXPORT_FAILED.to_string())
        }
    }
}
