//! End-to-end scenarios: workflow controller driving the worker against a
//! mock extraction service.

use std::time::Instant;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use snap2sheet_tui::config::Config;
use snap2sheet_tui::events::AppEvent;
use snap2sheet_tui::model::{ExtractionResult, LineItem, Summary};
use snap2sheet_tui::validate::UploadCandidate;
use snap2sheet_tui::worker::{self, WorkerCmd};
use snap2sheet_tui::workflow::{Stage, Workflow};

struct Harness {
    cmd_tx: mpsc::Sender<WorkerCmd>,
    ev_rx: mpsc::Receiver<AppEvent>,
    _download_dir: TempDir,
    download_path: std::path::PathBuf,
}

/// Spawn a worker wired to the given mock server, downloading into a
/// temp directory.
fn start_worker(server_uri: String, sample_path: std::path::PathBuf) -> Harness {
    let download_dir = TempDir::new().unwrap();
    let download_path = download_dir.path().to_path_buf();

    let mut cfg = Config::default();
    cfg.api.base_url = server_uri;
    cfg.sample.path = sample_path;
    cfg.download.dir = download_path.clone();

    let (cmd_tx, cmd_rx) = mpsc::channel(8);
    let (ev_tx, ev_rx) = mpsc::channel(8);
    tokio::spawn(worker::run(cmd_rx, ev_tx, cfg));

    Harness {
        cmd_tx,
        ev_rx,
        _download_dir: download_dir,
        download_path,
    }
}

fn png_candidate(len: usize) -> UploadCandidate {
    UploadCandidate {
        bytes: vec![0u8; len],
        mime_type: "image/png".into(),
        file_name: "invoice.png".into(),
    }
}

fn acme_result() -> ExtractionResult {
    ExtractionResult {
        summary: Summary {
            vendor_name: "Acme".into(),
            invoice_number: "INV-1".into(),
            ..Summary::default()
        },
        line_items: vec![LineItem {
            description: "Widget".into(),
            quantity: "2".into(),
            unit_price: "10".into(),
            amount: "20".into(),
        }],
    }
}

async fn apply_next_extraction(wf: &mut Workflow, h: &mut Harness) {
    match h.ev_rx.recv().await.expect("worker event") {
        AppEvent::Extracted { seq, outcome } => wf.apply_extraction(seq, outcome),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn valid_png_reaches_the_result_stage_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(acme_result()))
        .expect(1)
        .mount(&server)
        .await;

    let mut h = start_worker(server.uri(), "missing-sample.jpg".into());
    let mut wf = Workflow::new();

    let req = wf.submit_file(png_candidate(2 * 1024 * 1024)).unwrap();
    assert_eq!(wf.stage(), Stage::Processing);
    h.cmd_tx
        .send(WorkerCmd::Extract {
            seq: req.seq,
            candidate: req.candidate,
        })
        .await
        .unwrap();

    apply_next_extraction(&mut wf, &mut h).await;
    assert_eq!(wf.stage(), Stage::Result);
    assert_eq!(wf.state().result.as_ref(), Some(&acme_result()));
}

#[tokio::test]
async fn oversized_jpeg_errors_with_zero_network_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(acme_result()))
        .expect(0)
        .mount(&server)
        .await;

    let h = start_worker(server.uri(), "missing-sample.jpg".into());
    let mut wf = Workflow::new();

    let candidate = UploadCandidate {
        bytes: vec![0u8; 10 * 1024 * 1024],
        mime_type: "image/jpeg".into(),
        file_name: "huge.jpg".into(),
    };
    assert!(wf.submit_file(candidate).is_none());
    assert_eq!(wf.stage(), Stage::Error);
    assert_eq!(wf.state().error.as_deref(), Some("Max file size is 5MB."));

    // Dropping the command channel stops the worker; the mock server
    // verifies its zero-call expectation on drop.
    drop(h.cmd_tx);
}

#[tokio::test]
async fn service_failure_body_becomes_the_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/extract"))
        .respond_with(ResponseTemplate::new(500).set_body_string("ocr timeout"))
        .mount(&server)
        .await;

    let mut h = start_worker(server.uri(), "missing-sample.jpg".into());
    let mut wf = Workflow::new();

    let req = wf.submit_file(png_candidate(1024)).unwrap();
    h.cmd_tx
        .send(WorkerCmd::Extract {
            seq: req.seq,
            candidate: req.candidate,
        })
        .await
        .unwrap();

    apply_next_extraction(&mut wf, &mut h).await;
    assert_eq!(wf.stage(), Stage::Error);
    assert_eq!(wf.state().error.as_deref(), Some("ocr timeout"));
}

#[tokio::test]
async fn export_saves_the_spreadsheet_under_the_fixed_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(acme_result()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/export"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x03\x04".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let mut h = start_worker(server.uri(), "missing-sample.jpg".into());
    let mut wf = Workflow::new();

    let req = wf.submit_file(png_candidate(1024)).unwrap();
    h.cmd_tx
        .send(WorkerCmd::Extract {
            seq: req.seq,
            candidate: req.candidate,
        })
        .await
        .unwrap();
    apply_next_extraction(&mut wf, &mut h).await;

    let export = wf.begin_download().unwrap();
    assert!(wf.state().downloading);
    h.cmd_tx
        .send(WorkerCmd::Export {
            result: export.result,
        })
        .await
        .unwrap();

    match h.ev_rx.recv().await.expect("worker event") {
        AppEvent::Exported { outcome } => wf.finish_download(outcome, Instant::now()),
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(!wf.state().downloading);
    assert_eq!(wf.stage(), Stage::Result);

    let saved = h.download_path.join("snap2sheet.xlsx");
    assert_eq!(std::fs::read(&saved).unwrap(), b"PK\x03\x04");
}

#[tokio::test]
async fn export_failure_clears_the_flag_and_moves_to_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(acme_result()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/export"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut h = start_worker(server.uri(), "missing-sample.jpg".into());
    let mut wf = Workflow::new();

    let req = wf.submit_file(png_candidate(1024)).unwrap();
    h.cmd_tx
        .send(WorkerCmd::Extract {
            seq: req.seq,
            candidate: req.candidate,
        })
        .await
        .unwrap();
    apply_next_extraction(&mut wf, &mut h).await;

    let export = wf.begin_download().unwrap();
    h.cmd_tx
        .send(WorkerCmd::Export {
            result: export.result,
        })
        .await
        .unwrap();

    match h.ev_rx.recv().await.expect("worker event") {
        AppEvent::Exported { outcome } => wf.finish_download(outcome, Instant::now()),
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(!wf.state().downloading);
    assert_eq!(wf.stage(), Stage::Error);
    assert_eq!(
        wf.state().error.as_deref(),
        Some("Could not generate Excel.")
    );
}

#[tokio::test]
async fn sample_runs_without_validation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(acme_result()))
        .expect(1)
        .mount(&server)
        .await;

    let asset_dir = TempDir::new().unwrap();
    let asset = asset_dir.path().join("sample-invoice.jpg");
    std::fs::write(&asset, b"\xFF\xD8\xFF\xD9").unwrap();

    let mut h = start_worker(server.uri(), asset);
    let mut wf = Workflow::new();

    let req = wf.use_sample();
    assert_eq!(wf.stage(), Stage::Processing);
    assert_eq!(wf.state().file_name.as_deref(), Some("sample-invoice.jpg"));
    h.cmd_tx
        .send(WorkerCmd::ExtractSample { seq: req.seq })
        .await
        .unwrap();

    apply_next_extraction(&mut wf, &mut h).await;
    assert_eq!(wf.stage(), Stage::Result);
}

#[tokio::test]
async fn missing_sample_asset_surfaces_the_generic_message() {
    let server = MockServer::start().await;
    let mut h = start_worker(server.uri(), "no/such/sample.jpg".into());
    let mut wf = Workflow::new();

    let req = wf.use_sample();
    h.cmd_tx
        .send(WorkerCmd::ExtractSample { seq: req.seq })
        .await
        .unwrap();

    apply_next_extraction(&mut wf, &mut h).await;
    assert_eq!(wf.stage(), Stage::Error);
    assert_eq!(
        wf.state().error.as_deref(),
        Some("Unable to run the sample right now.")
    );
}
