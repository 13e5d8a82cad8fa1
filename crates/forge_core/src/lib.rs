//! Selector forge core: pure workflow state machine and view-model helpers.
pub mod display;
mod effect;
mod msg;
pub mod records;
mod report;
mod request;
mod selectors;
mod state;
mod update;
mod view_model;

pub use display::ValidationView;
pub use effect::{Download, DownloadKind, Effect};
pub use msg::Msg;
pub use records::{records_to_csv, RecordRow, ScrapedRecord};
pub use report::{ElementSample, FieldVerdict, HistoryEntry, SampleItem, ScriptArtifact, ValidationReport};
pub use request::{
    AnalysisOutcome, AnalyzeMode, AnalyzeRequest, OutputFormat, RequestId, RunRequest,
    ServiceFailure, MAX_ITERATIONS, MAX_PAGES, NO_DETAILS,
};
pub use selectors::{SelectorEdits, SelectorField, SelectorSet, SelectorStore};
pub use state::{AppState, InFlight, Phase, RunPanel};
pub use update::update;
pub use view_model::{AppViewModel, Controls, RunPanelView, SelectorRowView};
