use crate::display::ValidationView;
use crate::records::RecordRow;
use crate::{Phase, SelectorField};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub phase: Phase,
    pub url_input: String,
    pub session_url: String,
    pub pagination_enabled: bool,
    pub pagination_selector: String,
    pub loading_status: Option<String>,
    pub form_visible: bool,
    pub results_visible: bool,
    pub selectors: Option<Vec<SelectorRowView>>,
    pub validation: Option<ValidationView>,
    pub script: Option<String>,
    pub edit_draft: Option<Vec<SelectorRowView>>,
    pub run_panel: RunPanelView,
    pub alert: Option<String>,
    pub controls: Controls,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorRowView {
    pub field: SelectorField,
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunPanelView {
    Hidden,
    Loading,
    Data { count: usize, rows: Vec<RecordRow> },
    Error { message: String, detail: String },
}

/// Which action controls are enabled. Disabled while any request is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Controls {
    pub submit: bool,
    pub edit: bool,
    pub save: bool,
    pub regenerate: bool,
    pub run: bool,
    pub export_csv: bool,
    pub download_script: bool,
}
