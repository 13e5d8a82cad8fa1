use crate::records::ScrapedRecord;
use crate::request::{AnalysisOutcome, RequestId, ServiceFailure};
use crate::selectors::{SelectorEdits, SelectorField};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the URL input box.
    UrlInputChanged(String),
    /// User flipped the pagination toggle.
    PaginationToggled(bool),
    /// User edited the pagination selector input.
    PaginationSelectorChanged(String),
    /// Manual selector entry outside the edit surface (e.g. seeded from flags).
    SelectorsEntered(SelectorEdits),
    /// User submitted the form.
    SubmitClicked,
    /// Backend progress for the in-flight analyze call.
    AnalysisProgress { request_id: RequestId, status: String },
    AnalysisSucceeded {
        request_id: RequestId,
        outcome: AnalysisOutcome,
    },
    AnalysisFailed {
        request_id: RequestId,
        failure: ServiceFailure,
    },
    /// User opened the edit surface.
    EditSelectorsClicked,
    /// User typed into one field of the edit surface.
    DraftFieldChanged { field: SelectorField, value: String },
    /// User closed the edit surface without saving.
    EditCancelled,
    /// User saved the edit surface; triggers a regenerate.
    SaveSelectorsClicked,
    /// User asked for a regenerate with the current selectors.
    RegenerateClicked,
    /// User clicked Run Script.
    RunScriptClicked,
    RunSucceeded {
        request_id: RequestId,
        records: Vec<ScrapedRecord>,
    },
    RunFailed {
        request_id: RequestId,
        failure: ServiceFailure,
    },
    /// User clicked Export CSV.
    ExportCsvClicked,
    CsvDownloaded {
        request_id: RequestId,
        payload: Vec<u8>,
    },
    CsvExportFailed {
        request_id: RequestId,
        failure: ServiceFailure,
    },
    /// User clicked Download Script.
    DownloadScriptClicked,
    /// User acknowledged the blocking alert.
    AlertDismissed,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
