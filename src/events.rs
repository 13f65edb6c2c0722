//! Events delivered to the app event loop.

use crate::model::ExtractionResult;

/// Everything the loop can receive from background tasks: worker outcomes
/// plus the progress ticker.
#[derive(Clone, Debug)]
pub enum AppEvent {
    /// Extraction finished; `seq` echoes the request so the workflow can
    /// drop stale outcomes.
    Extracted {
        seq: u64,
        outcome: Result<ExtractionResult, String>,
    },
    /// Spreadsheet export finished; `Ok` carries the saved file name.
    Exported { outcome: Result<String, String> },
    /// Cosmetic progress advance while processing.
    ProgressTick,
}
