use forge_logging::forge_debug;

use crate::effect::{Download, DownloadKind, Effect};
use crate::records::{records_to_csv, ScrapedRecord};
use crate::report::{ScriptArtifact, ValidationReport};
use crate::request::{
    AnalysisOutcome, AnalyzeMode, AnalyzeRequest, OutputFormat, RequestId, RunRequest,
    ServiceFailure, MAX_ITERATIONS, MAX_PAGES,
};
use crate::selectors::{SelectorEdits, SelectorField, SelectorSet, SelectorStore};
use crate::view_model::{AppViewModel, Controls, RunPanelView, SelectorRowView};
use crate::display::ValidationView;
use crate::records::record_rows;

pub const EMPTY_URL_ALERT: &str = "Please enter a valid URL";
pub const NO_SELECTORS_ALERT: &str = "Please fill in the selectors before analyzing.";
pub const RUN_FALLBACK_ERROR: &str = "Error running scraper";
pub const CSV_FALLBACK_ERROR: &str = "Error exporting CSV";

/// Workflow position of the selector loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Analyzing,
    Ready,
    Editing,
    Regenerating,
}

/// The script-run panel, orthogonal to [`Phase`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunPanel {
    #[default]
    Hidden,
    Loading,
    Data,
    Error { message: String, detail: String },
}

/// The single outstanding backend call, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InFlight {
    Analyze(AnalyzeMode),
    Run,
    CsvExport,
}

/// Session state. Mutated only through [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    url_input: String,
    pagination_enabled: bool,
    pagination_selector: String,
    store: SelectorStore,
    script: Option<ScriptArtifact>,
    report: Option<ValidationReport>,
    records: Vec<ScrapedRecord>,
    phase: Phase,
    results_visible: bool,
    run_panel: RunPanel,
    in_flight: Option<(RequestId, InFlight)>,
    next_request_id: RequestId,
    edit_draft: Option<SelectorEdits>,
    loading_status: Option<String>,
    alert: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with six empty selectors so the first submit lets the backend infer them.
    pub fn with_blank_selectors() -> Self {
        Self {
            store: SelectorStore::with_blank_selectors(),
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selectors(&self) -> Option<&SelectorSet> {
        self.store.current()
    }

    pub fn session_url(&self) -> &str {
        self.store.url()
    }

    pub fn script(&self) -> Option<&ScriptArtifact> {
        self.script.as_ref()
    }

    pub fn report(&self) -> Option<&ValidationReport> {
        self.report.as_ref()
    }

    pub fn records(&self) -> &[ScrapedRecord] {
        &self.records
    }

    pub fn in_flight(&self) -> Option<InFlight> {
        self.in_flight.map(|(_, kind)| kind)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Returns and clears the dirty flag; callers re-render when true.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn view(&self) -> AppViewModel {
        let showing_results = self.results_visible && !self.is_busy_with_analyze();
        let selector_rows = |set: &SelectorSet, placeholder: bool| {
            set.iter()
                .map(|(field, value)| SelectorRowView {
                    field,
                    label: field.label(),
                    value: if placeholder && value.is_empty() {
                        "Not identified".to_string()
                    } else {
                        value.to_string()
                    },
                })
                .collect::<Vec<_>>()
        };

        AppViewModel {
            phase: self.phase,
            url_input: self.url_input.clone(),
            session_url: self.store.url().to_string(),
            pagination_enabled: self.pagination_enabled,
            pagination_selector: self.pagination_selector.clone(),
            loading_status: self.loading_status.clone(),
            form_visible: !matches!(self.phase, Phase::Analyzing),
            results_visible: showing_results,
            selectors: self
                .store
                .current()
                .filter(|_| showing_results)
                .map(|set| selector_rows(set, true)),
            validation: self
                .report
                .as_ref()
                .filter(|_| showing_results)
                .map(ValidationView::from_report),
            script: self
                .script
                .as_ref()
                .filter(|_| showing_results)
                .map(|script| script.as_str().to_string()),
            edit_draft: self.edit_draft.as_ref().map(|draft| selector_rows(&draft.0, false)),
            run_panel: match &self.run_panel {
                RunPanel::Hidden => RunPanelView::Hidden,
                RunPanel::Loading => RunPanelView::Loading,
                RunPanel::Data => RunPanelView::Data {
                    count: self.records.len(),
                    rows: record_rows(&self.records),
                },
                RunPanel::Error { message, detail } => RunPanelView::Error {
                    message: message.clone(),
                    detail: detail.clone(),
                },
            },
            alert: self.alert.clone(),
            controls: self.controls(),
            dirty: self.dirty,
        }
    }

    fn controls(&self) -> Controls {
        let idle = !self.is_busy();
        let ready = idle && self.phase == Phase::Ready && self.results_visible;
        Controls {
            submit: idle && matches!(self.phase, Phase::Idle | Phase::Ready),
            edit: ready && self.store.is_initialized(),
            save: idle && self.phase == Phase::Editing,
            regenerate: ready,
            run: ready && self.script.is_some(),
            export_csv: ready && self.script.is_some(),
            download_script: ready && self.script.is_some(),
        }
    }

    fn is_busy_with_analyze(&self) -> bool {
        matches!(self.in_flight(), Some(InFlight::Analyze(_)))
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            forge_debug!("phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
        self.mark_dirty();
    }

    pub(crate) fn raise_alert(&mut self, text: impl Into<String>) {
        self.alert = Some(text.into());
        self.mark_dirty();
    }

    pub(crate) fn dismiss_alert(&mut self) {
        if self.alert.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn set_url_input(&mut self, text: String) {
        self.url_input = text;
        self.mark_dirty();
    }

    pub(crate) fn url_input(&self) -> &str {
        &self.url_input
    }

    /// False once the URL box names a page other than the analyzed one.
    fn url_matches_session(&self) -> bool {
        self.url_input.trim() == self.session_url()
    }

    pub(crate) fn set_pagination(&mut self, enabled: Option<bool>, selector: Option<String>) {
        if let Some(enabled) = enabled {
            self.pagination_enabled = enabled;
        }
        if let Some(selector) = selector {
            self.pagination_selector = selector;
        }
        self.mark_dirty();
    }

    /// Hides every result section without touching held selectors or script.
    pub(crate) fn hide_results(&mut self) {
        self.results_visible = false;
        self.run_panel = RunPanel::Hidden;
        self.edit_draft = None;
        self.mark_dirty();
    }

    pub(crate) fn store_mut(&mut self) -> &mut SelectorStore {
        &mut self.store
    }

    pub(crate) fn store(&self) -> &SelectorStore {
        &self.store
    }

    fn next_request(&mut self, kind: InFlight) -> RequestId {
        self.next_request_id += 1;
        let id = self.next_request_id;
        self.in_flight = Some((id, kind));
        id
    }

    /// Clears the in-flight slot if `request_id` matches it.
    pub(crate) fn settle(&mut self, request_id: RequestId) -> Option<InFlight> {
        match self.in_flight {
            Some((id, kind)) if id == request_id => {
                self.in_flight = None;
                self.loading_status = None;
                self.mark_dirty();
                Some(kind)
            }
            _ => None,
        }
    }

    pub(crate) fn in_flight_id(&self) -> Option<RequestId> {
        self.in_flight.map(|(id, _)| id)
    }

    pub(crate) fn set_loading_status(&mut self, status: impl Into<String>) {
        self.loading_status = Some(status.into());
        self.mark_dirty();
    }

    /// Issues the analyze call for either mode. Caller checks preconditions.
    pub(crate) fn start_analyze(&mut self, mode: AnalyzeMode) -> Effect {
        let selectors = self.store.current().cloned().unwrap_or_default();
        let request = AnalyzeRequest {
            url: self.store.url().to_string(),
            pagination_enabled: self.pagination_enabled,
            pagination_selector: self.pagination_selector.trim().to_string(),
            selectors,
            max_iterations: MAX_ITERATIONS,
        };
        let request_id = self.next_request(InFlight::Analyze(mode));
        self.results_visible = false;
        self.loading_status = Some(mode.loading_text().to_string());
        self.set_phase(match mode {
            AnalyzeMode::Initial => Phase::Analyzing,
            AnalyzeMode::Regenerate => Phase::Regenerating,
        });
        Effect::Analyze {
            request_id,
            mode,
            request,
        }
    }

    pub(crate) fn apply_analysis(&mut self, outcome: AnalysisOutcome) {
        forge_debug!(
            "analysis merged: iterations={} all_valid={}",
            outcome.report.iterations,
            outcome.report.all_fields_valid()
        );
        self.store.replace(outcome.selectors);
        self.script = Some(outcome.script);
        self.report = Some(outcome.report);
        self.results_visible = true;
        self.set_phase(Phase::Ready);
    }

    pub(crate) fn apply_analysis_failure(&mut self, mode: AnalyzeMode, failure: &ServiceFailure) {
        let message = failure.message_or(mode.fallback_error()).to_string();
        match mode {
            AnalyzeMode::Initial => {
                self.results_visible = false;
                self.set_phase(Phase::Idle);
            }
            AnalyzeMode::Regenerate if self.url_matches_session() => {
                self.results_visible = true;
                self.set_phase(Phase::Ready);
            }
            AnalyzeMode::Regenerate => {
                forge_debug!("url changed during regenerate; results stay hidden");
                self.set_phase(Phase::Idle);
            }
        }
        self.raise_alert(format!("Error: {message}"));
    }

    pub(crate) fn open_editor(&mut self) -> bool {
        let Some(current) = self.store.current() else {
            return false;
        };
        self.edit_draft = Some(SelectorEdits::from_current(current));
        self.set_phase(Phase::Editing);
        true
    }

    pub(crate) fn edit_draft_field(&mut self, field: SelectorField, value: String) {
        if let Some(draft) = self.edit_draft.as_mut() {
            draft.set(field, value);
            self.mark_dirty();
        }
    }

    pub(crate) fn close_editor(&mut self) -> Option<SelectorEdits> {
        let draft = self.edit_draft.take();
        self.set_phase(Phase::Ready);
        draft
    }

    fn run_request(&self, format: OutputFormat) -> Option<RunRequest> {
        self.script.as_ref().map(|script| RunRequest {
            script: script.as_str().to_string(),
            url: self.store.url().to_string(),
            format,
            max_pages: MAX_PAGES,
        })
    }

    pub(crate) fn start_run(&mut self) -> Option<Effect> {
        let request = self.run_request(OutputFormat::Json)?;
        let request_id = self.next_request(InFlight::Run);
        self.run_panel = RunPanel::Loading;
        self.mark_dirty();
        Some(Effect::RunScript {
            request_id,
            request,
        })
    }

    pub(crate) fn start_csv_export(&mut self) -> Option<Effect> {
        let request = self.run_request(OutputFormat::Csv)?;
        let request_id = self.next_request(InFlight::CsvExport);
        self.run_panel = RunPanel::Loading;
        self.mark_dirty();
        Some(Effect::ExportCsv {
            request_id,
            request,
        })
    }

    pub(crate) fn apply_records(&mut self, records: Vec<ScrapedRecord>) {
        forge_debug!("run returned {} records", records.len());
        self.records = records;
        self.run_panel = if self.results_visible {
            RunPanel::Data
        } else {
            RunPanel::Hidden
        };
        self.mark_dirty();
    }

    pub(crate) fn apply_run_failure(&mut self, fallback: &str, failure: &ServiceFailure) {
        if !self.results_visible {
            self.run_panel = RunPanel::Hidden;
            self.mark_dirty();
            return;
        }
        self.run_panel = RunPanel::Error {
            message: failure.message_or(fallback).to_string(),
            detail: failure.detail().to_string(),
        };
        self.mark_dirty();
    }

    pub(crate) fn local_csv_download(&self) -> Download {
        Download::new(DownloadKind::Csv, records_to_csv(&self.records))
    }

    pub(crate) fn script_download(&self) -> Option<Download> {
        self.script
            .as_ref()
            .map(|script| Download::new(DownloadKind::Script, script.as_str()))
    }

    pub(crate) fn results_visible(&self) -> bool {
        self.results_visible
    }
}
