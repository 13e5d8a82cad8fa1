use forge_logging::{forge_debug, forge_info, forge_warn};

use crate::state::{
    CSV_FALLBACK_ERROR, EMPTY_URL_ALERT, NO_SELECTORS_ALERT, RUN_FALLBACK_ERROR,
};
use crate::{AnalyzeMode, AppState, Effect, InFlight, Msg, Phase};

/// Pure update function: applies a message to state and returns any effects.
///
/// While a backend call is outstanding every action that would issue another
/// call is dropped, so at most one request is ever in flight.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::UrlInputChanged(text) => {
            let differs = text.trim() != state.session_url();
            state.set_url_input(text);
            if differs {
                state.hide_results();
                if matches!(state.phase(), Phase::Ready | Phase::Editing) {
                    state.set_phase(Phase::Idle);
                }
            }
            Vec::new()
        }
        Msg::PaginationToggled(enabled) => {
            state.set_pagination(Some(enabled), None);
            Vec::new()
        }
        Msg::PaginationSelectorChanged(selector) => {
            state.set_pagination(None, Some(selector));
            Vec::new()
        }
        Msg::SelectorsEntered(edits) => {
            if state.is_busy() || matches!(state.phase(), Phase::Editing) {
                return ignored(state, "SelectorsEntered");
            }
            state.store_mut().patch(&edits);
            state.mark_dirty();
            Vec::new()
        }
        Msg::SubmitClicked => {
            if state.is_busy() || !matches!(state.phase(), Phase::Idle | Phase::Ready) {
                return ignored(state, "SubmitClicked");
            }
            let url = state.url_input().trim().to_string();
            if url.is_empty() {
                state.raise_alert(EMPTY_URL_ALERT);
                return (state, Vec::new());
            }
            if !state.store().is_initialized() {
                state.raise_alert(NO_SELECTORS_ALERT);
                return (state, Vec::new());
            }
            forge_info!("submit url={}", url);
            state.store_mut().set_url(url);
            vec![state.start_analyze(AnalyzeMode::Initial)]
        }
        Msg::AnalysisProgress { request_id, status } => {
            if state.in_flight_id() == Some(request_id) {
                state.set_loading_status(status);
            }
            Vec::new()
        }
        Msg::AnalysisSucceeded {
            request_id,
            outcome,
        } => {
            match state.settle(request_id) {
                Some(InFlight::Analyze(_)) => state.apply_analysis(outcome),
                other => stale(request_id, other),
            }
            Vec::new()
        }
        Msg::AnalysisFailed {
            request_id,
            failure,
        } => {
            match state.settle(request_id) {
                Some(InFlight::Analyze(mode)) => {
                    forge_warn!("analyze ({:?}) failed: {:?}", mode, failure.message);
                    state.apply_analysis_failure(mode, &failure);
                }
                other => stale(request_id, other),
            }
            Vec::new()
        }
        Msg::EditSelectorsClicked => {
            if state.is_busy() || state.phase() != Phase::Ready || !state.results_visible() {
                return ignored(state, "EditSelectorsClicked");
            }
            state.open_editor();
            Vec::new()
        }
        Msg::DraftFieldChanged { field, value } => {
            if state.phase() == Phase::Editing {
                state.edit_draft_field(field, value);
            }
            Vec::new()
        }
        Msg::EditCancelled => {
            if state.phase() == Phase::Editing {
                state.close_editor();
            }
            Vec::new()
        }
        Msg::SaveSelectorsClicked => {
            if state.is_busy() || state.phase() != Phase::Editing {
                return ignored(state, "SaveSelectorsClicked");
            }
            if let Some(draft) = state.close_editor() {
                let saved = state.store_mut().patch(&draft).summary();
                forge_info!("selectors saved: {}", saved);
                state.raise_alert(format!("Selectors saved: {saved}"));
            }
            vec![state.start_analyze(AnalyzeMode::Regenerate)]
        }
        Msg::RegenerateClicked => {
            if state.is_busy() || state.phase() != Phase::Ready || !state.results_visible() {
                return ignored(state, "RegenerateClicked");
            }
            vec![state.start_analyze(AnalyzeMode::Regenerate)]
        }
        Msg::RunScriptClicked => {
            if !can_use_script(&state) {
                return ignored(state, "RunScriptClicked");
            }
            state.start_run().into_iter().collect()
        }
        Msg::RunSucceeded {
            request_id,
            records,
        } => {
            match state.settle(request_id) {
                Some(InFlight::Run) => state.apply_records(records),
                other => stale(request_id, other),
            }
            Vec::new()
        }
        Msg::RunFailed {
            request_id,
            failure,
        } => {
            match state.settle(request_id) {
                Some(InFlight::Run) => {
                    forge_warn!("run failed: {:?}", failure.message);
                    state.apply_run_failure(RUN_FALLBACK_ERROR, &failure);
                }
                other => stale(request_id, other),
            }
            Vec::new()
        }
        Msg::ExportCsvClicked => {
            if !can_use_script(&state) {
                return ignored(state, "ExportCsvClicked");
            }
            if state.records().is_empty() {
                forge_info!("no records held; exporting CSV through the backend");
                state.start_csv_export().into_iter().collect()
            } else {
                vec![Effect::SaveDownload(state.local_csv_download())]
            }
        }
        Msg::CsvDownloaded {
            request_id,
            payload,
        } => match state.settle(request_id) {
            // Backend CSV goes straight to disk; a JSON run then fills the table.
            Some(InFlight::CsvExport) => {
                let mut effects = vec![Effect::SaveDownload(crate::Download::new(
                    crate::DownloadKind::Csv,
                    payload,
                ))];
                effects.extend(state.start_run());
                effects
            }
            other => {
                stale(request_id, other);
                Vec::new()
            }
        },
        Msg::CsvExportFailed {
            request_id,
            failure,
        } => {
            match state.settle(request_id) {
                Some(InFlight::CsvExport) => {
                    forge_warn!("csv export failed: {:?}", failure.message);
                    state.apply_run_failure(CSV_FALLBACK_ERROR, &failure);
                }
                other => stale(request_id, other),
            }
            Vec::new()
        }
        Msg::DownloadScriptClicked => state
            .script_download()
            .map(Effect::SaveDownload)
            .into_iter()
            .collect(),
        Msg::AlertDismissed => {
            state.dismiss_alert();
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn can_use_script(state: &AppState) -> bool {
    !state.is_busy()
        && state.phase() == Phase::Ready
        && state.results_visible()
        && state.script().is_some()
}

fn ignored(state: AppState, action: &str) -> (AppState, Vec<Effect>) {
    forge_debug!(
        "{} ignored in phase {:?} (in flight: {:?})",
        action,
        state.phase(),
        state.in_flight()
    );
    (state, Vec::new())
}

fn stale(request_id: crate::RequestId, settled: Option<InFlight>) {
    forge_warn!(
        "completion for request {} does not match in-flight call ({:?}); dropped",
        request_id,
        settled
    );
}
