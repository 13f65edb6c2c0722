//! The extraction workflow state machine.
//!
//! One `Workflow` instance owns the session state; the TUI only reads it
//! and dispatches actions. Actions that need the network return a request
//! value for the worker instead of touching the transport themselves, so
//! every transition stays synchronous and testable.

use std::time::{Duration, Instant};

use crate::{
    model::ExtractionResult,
    progress::STEP_COUNT,
    validate::{self, UploadCandidate},
};

/// Display name used for the bundled sample invoice.
pub const SAMPLE_FILE_NAME: &str = "sample-invoice.jpg";

/// How long success toasts and the copy feedback stay visible.
const TRANSIENT_TTL: Duration = Duration::from_secs(2);

/// The workflow's current phase. Exactly one is active at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Landing,
    Processing,
    Result,
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// Transient notification, distinct from the persistent error-stage
/// message. Success toasts expire; error toasts stay until replaced.
#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    expires_at: Option<Instant>,
}

/// Aggregate state read by the presentation layer.
///
/// Invariants: `result` is set iff `stage == Result`; `error` is set iff
/// `stage == Error`.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkflowState {
    pub stage: Stage,
    pub file_name: Option<String>,
    pub result: Option<ExtractionResult>,
    pub error: Option<String>,
    pub progress_step: usize,
    pub copy_feedback: Option<String>,
    pub downloading: bool,
    pub toast: Option<Toast>,
}

impl WorkflowState {
    pub fn initial() -> Self {
        Self {
            stage: Stage::Landing,
            file_name: None,
            result: None,
            error: None,
            progress_step: 0,
            copy_feedback: None,
            downloading: false,
            toast: None,
        }
    }
}

/// Extraction request for the worker, tagged with the sequence number the
/// response must echo back.
#[derive(Clone, Debug)]
pub struct ExtractRequest {
    pub seq: u64,
    pub candidate: UploadCandidate,
}

/// Sample-invoice request; the worker reads the bundled asset itself.
#[derive(Clone, Copy, Debug)]
pub struct SampleRequest {
    pub seq: u64,
}

/// Spreadsheet export request carrying the result to encode.
#[derive(Clone, Debug)]
pub struct ExportRequest {
    pub result: ExtractionResult,
}

/// The workflow controller. Mutated only on the event-loop task.
pub struct Workflow {
    state: WorkflowState,
    /// Monotonic sequence; only the extraction outcome matching the latest
    /// issued request is applied, so overlapping submissions cannot
    /// clobber each other with a stale response.
    seq: u64,
    copy_feedback_until: Option<Instant>,
}

impl Workflow {
    pub fn new() -> Self {
        Self {
            state: WorkflowState::initial(),
            seq: 0,
            copy_feedback_until: None,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn stage(&self) -> Stage {
        self.state.stage
    }

    /// Validate and stage a file for extraction. Returns the request to
    /// hand to the worker, or `None` when validation failed (in which case
    /// no network call may be made).
    pub fn submit_file(&mut self, candidate: UploadCandidate) -> Option<ExtractRequest> {
        if let Err(err) = validate::validate(&candidate) {
            tracing::warn!("upload rejected: {err}");
            self.fail(err.to_string());
            return None;
        }
        self.enter_processing(candidate.file_name.clone());
        Some(ExtractRequest {
            seq: self.seq,
            candidate,
        })
    }

    /// Run the bundled sample invoice. The asset is trusted, so the
    /// validator is skipped; allowed from any stage, including `Error`.
    pub fn use_sample(&mut self) -> SampleRequest {
        self.enter_processing(SAMPLE_FILE_NAME.to_string());
        SampleRequest { seq: self.seq }
    }

    /// Apply an extraction outcome from the worker. Outcomes whose
    /// sequence does not match the latest request are stale and dropped.
    pub fn apply_extraction(&mut self, seq: u64, outcome: Result<ExtractionResult, String>) {
        if seq != self.seq {
            tracing::info!("dropping stale extraction outcome (seq {seq}, current {})", self.seq);
            return;
        }
        match outcome {
            Ok(result) => {
                self.state.stage = Stage::Result;
                self.state.result = Some(result);
                self.state.error = None;
            }
            Err(message) => self.fail(message),
        }
    }

    /// Start a spreadsheet download. Only meaningful on the result stage.
    pub fn begin_download(&mut self) -> Option<ExportRequest> {
        if self.state.stage != Stage::Result {
            return None;
        }
        let result = self.state.result.clone()?;
        self.state.downloading = true;
        Some(ExportRequest { result })
    }

    /// Record the export outcome. The in-flight flag clears in all cases;
    /// a failure moves the whole workflow to the error stage, discarding
    /// the shown result (see DESIGN.md).
    pub fn finish_download(&mut self, outcome: Result<String, String>, now: Instant) {
        self.state.downloading = false;
        match outcome {
            Ok(saved) => {
                self.state.toast = Some(Toast {
                    message: format!("Saved {saved}"),
                    kind: ToastKind::Success,
                    expires_at: Some(now + TRANSIENT_TTL),
                });
            }
            Err(message) => self.fail(message),
        }
    }

    /// TSV payload for the clipboard: line items only, header row first.
    pub fn copy_rows(&self) -> Option<String> {
        if self.state.stage != Stage::Result {
            return None;
        }
        self.state.result.as_ref().map(ExtractionResult::line_items_tsv)
    }

    /// Record a successful clipboard write; both signals auto-clear.
    pub fn note_copied(&mut self, now: Instant) {
        self.state.copy_feedback = Some("Copied!".to_string());
        self.copy_feedback_until = Some(now + TRANSIENT_TTL);
        self.state.toast = Some(Toast {
            message: "Copied to clipboard".to_string(),
            kind: ToastKind::Success,
            expires_at: Some(now + TRANSIENT_TTL),
        });
    }

    /// Advance the cosmetic progress step. Ticks arriving after the stage
    /// changed are ignored.
    pub fn advance_progress(&mut self) {
        if self.state.stage == Stage::Processing {
            self.state.progress_step = (self.state.progress_step + 1) % STEP_COUNT;
        }
    }

    /// Drop expired transient signals. Called once per loop iteration.
    pub fn expire_transients(&mut self, now: Instant) {
        if let Some(toast) = &self.state.toast
            && toast.expires_at.is_some_and(|t| t <= now)
        {
            self.state.toast = None;
        }
        if self.copy_feedback_until.is_some_and(|t| t <= now) {
            self.state.copy_feedback = None;
            self.copy_feedback_until = None;
        }
    }

    /// Return to the landing defaults. Bumps the sequence so any response
    /// still in flight is dropped on arrival. Never fails.
    pub fn reset(&mut self) {
        self.seq += 1;
        self.state = WorkflowState::initial();
        self.copy_feedback_until = None;
    }

    fn enter_processing(&mut self, file_name: String) {
        self.seq += 1;
        self.state.stage = Stage::Processing;
        self.state.file_name = Some(file_name);
        self.state.result = None;
        self.state.error = None;
        self.state.progress_step = 0;
        self.state.copy_feedback = None;
        self.copy_feedback_until = None;
    }

    fn fail(&mut self, message: String) {
        self.state.stage = Stage::Error;
        self.state.result = None;
        self.state.error = Some(message.clone());
        // Error toasts have no expiry; they persist like the stage itself.
        self.state.toast = Some(Toast {
            message,
            kind: ToastKind::Error,
            expires_at: None,
        });
    }
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LineItem, Summary};
    use crate::progress::STEP_COUNT;

    fn png(len: usize) -> UploadCandidate {
        UploadCandidate {
            bytes: vec![0u8; len],
            mime_type: "image/png".into(),
            file_name: "invoice.png".into(),
        }
    }

    fn sample_result() -> ExtractionResult {
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

    fn now() -> Instant {
        Instant::now()
    }

    #[test]
    fn unsupported_type_errors_without_request() {
        let mut wf = Workflow::new();
        let candidate = UploadCandidate {
            bytes: vec![0u8; 64],
            mime_type: "image/gif".into(),
            file_name: "invoice.gif".into(),
        };
        assert!(wf.submit_file(candidate).is_none());
        assert_eq!(wf.stage(), Stage::Error);
        assert_eq!(
            wf.state().error.as_deref(),
            Some("Please upload a JPG or PNG image.")
        );
        let toast = wf.state().toast.as_ref().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
    }

    #[test]
    fn oversized_file_errors_without_request() {
        let mut wf = Workflow::new();
        assert!(wf.submit_file(png(10 * 1024 * 1024)).is_none());
        assert_eq!(wf.stage(), Stage::Error);
        assert_eq!(wf.state().error.as_deref(), Some("Max file size is 5MB."));
    }

    #[test]
    fn valid_submit_always_passes_through_processing() {
        let mut wf = Workflow::new();
        let req = wf.submit_file(png(2 * 1024 * 1024)).unwrap();
        assert_eq!(wf.stage(), Stage::Processing);
        assert_eq!(wf.state().file_name.as_deref(), Some("invoice.png"));
        assert_eq!(wf.state().progress_step, 0);

        wf.apply_extraction(req.seq, Ok(sample_result()));
        assert_eq!(wf.stage(), Stage::Result);
        assert_eq!(wf.state().result.as_ref(), Some(&sample_result()));

        // Resubmitting from the result stage goes through processing again.
        let req = wf.submit_file(png(16)).unwrap();
        assert_eq!(wf.stage(), Stage::Processing);
        assert!(wf.state().result.is_none());
        wf.apply_extraction(req.seq, Err("ocr timeout".into()));
        assert_eq!(wf.stage(), Stage::Error);
        assert_eq!(wf.state().error.as_deref(), Some("ocr timeout"));
    }

    #[test]
    fn stale_outcome_is_dropped() {
        let mut wf = Workflow::new();
        let first = wf.submit_file(png(16)).unwrap();
        let second = wf.submit_file(png(16)).unwrap();
        assert_ne!(first.seq, second.seq);

        // The first request resolves late; only the second one counts.
        wf.apply_extraction(first.seq, Err("late failure".into()));
        assert_eq!(wf.stage(), Stage::Processing);
        wf.apply_extraction(second.seq, Ok(sample_result()));
        assert_eq!(wf.stage(), Stage::Result);
    }

    #[test]
    fn outcome_after_reset_is_dropped() {
        let mut wf = Workflow::new();
        let req = wf.submit_file(png(16)).unwrap();
        wf.reset();
        wf.apply_extraction(req.seq, Ok(sample_result()));
        assert_eq!(wf.state(), &WorkflowState::initial());
    }

    #[test]
    fn progress_stays_in_range_and_stops_on_exit() {
        let mut wf = Workflow::new();
        let req = wf.submit_file(png(16)).unwrap();
        for _ in 0..(STEP_COUNT + 2) {
            wf.advance_progress();
            assert!(wf.state().progress_step < STEP_COUNT);
        }
        wf.apply_extraction(req.seq, Ok(sample_result()));
        let frozen = wf.state().progress_step;
        wf.advance_progress();
        assert_eq!(wf.state().progress_step, frozen);

        // Re-entering processing starts over from zero.
        wf.use_sample();
        assert_eq!(wf.state().progress_step, 0);
    }

    #[test]
    fn sample_runs_from_error_stage() {
        let mut wf = Workflow::new();
        wf.submit_file(png(10 * 1024 * 1024));
        assert_eq!(wf.stage(), Stage::Error);
        wf.use_sample();
        assert_eq!(wf.stage(), Stage::Processing);
        assert_eq!(wf.state().file_name.as_deref(), Some(SAMPLE_FILE_NAME));
        assert!(wf.state().error.is_none());
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut wf = Workflow::new();
        let req = wf.submit_file(png(16)).unwrap();
        wf.apply_extraction(req.seq, Ok(sample_result()));
        wf.note_copied(now());
        wf.reset();
        assert_eq!(wf.state(), &WorkflowState::initial());
    }

    #[test]
    fn download_only_from_result_stage() {
        let mut wf = Workflow::new();
        assert!(wf.begin_download().is_none());
        let req = wf.submit_file(png(16)).unwrap();
        assert!(wf.begin_download().is_none());
        wf.apply_extraction(req.seq, Ok(sample_result()));
        let export = wf.begin_download().unwrap();
        assert_eq!(export.result, sample_result());
        assert!(wf.state().downloading);
    }

    #[test]
    fn download_flag_clears_on_both_outcomes() {
        let mut wf = Workflow::new();
        let req = wf.submit_file(png(16)).unwrap();
        wf.apply_extraction(req.seq, Ok(sample_result()));

        wf.begin_download().unwrap();
        wf.finish_download(Ok("snap2sheet.xlsx".into()), now());
        assert!(!wf.state().downloading);
        assert_eq!(wf.stage(), Stage::Result);

        wf.begin_download().unwrap();
        wf.finish_download(Err("Could not generate Excel.".into()), now());
        assert!(!wf.state().downloading);
        assert_eq!(wf.stage(), Stage::Error);
        assert_eq!(
            wf.state().error.as_deref(),
            Some("Could not generate Excel.")
        );
    }

    #[test]
    fn copy_rows_serializes_line_items_only() {
        let mut wf = Workflow::new();
        assert!(wf.copy_rows().is_none());
        let req = wf.submit_file(png(16)).unwrap();
        wf.apply_extraction(req.seq, Ok(sample_result()));
        assert_eq!(
            wf.copy_rows().as_deref(),
            Some("description\tquantity\tunit_price\tamount\nWidget\t2\t10\t20")
        );
    }

    #[test]
    fn copy_feedback_and_toast_expire() {
        let mut wf = Workflow::new();
        let req = wf.submit_file(png(16)).unwrap();
        wf.apply_extraction(req.seq, Ok(sample_result()));

        let t0 = now();
        wf.note_copied(t0);
        assert_eq!(wf.state().copy_feedback.as_deref(), Some("Copied!"));
        wf.expire_transients(t0 + Duration::from_millis(500));
        assert!(wf.state().copy_feedback.is_some());
        wf.expire_transients(t0 + Duration::from_secs(3));
        assert!(wf.state().copy_feedback.is_none());
        assert!(wf.state().toast.is_none());
    }

    #[test]
    fn error_toast_does_not_expire() {
        let mut wf = Workflow::new();
        wf.submit_file(png(10 * 1024 * 1024));
        let t0 = now();
        wf.expire_transients(t0 + Duration::from_secs(60));
        assert!(wf.state().toast.is_some());
    }
}
