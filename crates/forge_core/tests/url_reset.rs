mod common;

use common::*;
use forge_core::{update, Effect, Msg, Phase, RunPanelView, ServiceFailure};

#[test]
fn changing_url_hides_results_but_keeps_selectors_and_script() {
    let state = ready_state();
    let (state, effects) = update(state, Msg::RunScriptClicked);
    let (state, _) = update(
        state,
        Msg::RunSucceeded {
            request_id: request_id_of(&effects),
            records: vec![record("a")],
        },
    );

    let (state, effects) = update(state, Msg::UrlInputChanged("https://other.example/list".into()));

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.phase, Phase::Idle);
    assert!(!view.results_visible);
    assert_eq!(view.selectors, None);
    assert_eq!(view.validation, None);
    assert_eq!(view.script, None);
    assert_eq!(view.run_panel, RunPanelView::Hidden);
    assert!(!view.controls.run);

    assert_eq!(state.selectors(), Some(&shop_selectors()));
    assert!(state.script().is_some());
}

#[test]
fn resubmit_after_reset_reuses_stale_selectors() {
    let state = ready_state();
    let (state, _) = update(state, Msg::UrlInputChanged("https://other.example/list".into()));
    let (state, effects) = update(state, Msg::SubmitClicked);

    let Effect::Analyze { request, .. } = &effects[0] else {
        panic!("expected analyze effect");
    };
    assert_eq!(request.url, "https://other.example/list");
    assert_eq!(request.selectors, shop_selectors());
    assert_eq!(state.session_url(), "https://other.example/list");
}

#[test]
fn retyping_the_session_url_keeps_results_visible() {
    let state = ready_state();
    let (state, _) = update(state, Msg::UrlInputChanged(format!(" {SHOP_URL} ")));

    let view = state.view();
    assert_eq!(view.phase, Phase::Ready);
    assert!(view.results_visible);
}

#[test]
fn url_change_closes_the_editor() {
    let state = ready_state();
    let (state, _) = update(state, Msg::EditSelectorsClicked);
    let (state, _) = update(state, Msg::UrlInputChanged("https://x.example".into()));

    assert_eq!(state.phase(), Phase::Idle);
    assert_eq!(state.view().edit_draft, None);
}

#[test]
fn run_finishing_after_url_change_stays_hidden() {
    let state = ready_state();
    let (state, effects) = update(state, Msg::RunScriptClicked);
    let (state, _) = update(state, Msg::UrlInputChanged("https://other.example/list".into()));
    let (state, _) = update(
        state,
        Msg::RunSucceeded {
            request_id: request_id_of(&effects),
            records: vec![record("a")],
        },
    );

    let view = state.view();
    assert_eq!(view.phase, Phase::Idle);
    assert!(!view.results_visible);
    assert_eq!(view.run_panel, RunPanelView::Hidden);
    assert_eq!(state.records().len(), 1);
}

#[test]
fn run_failing_after_url_change_stays_hidden() {
    let state = ready_state();
    let (state, effects) = update(state, Msg::RunScriptClicked);
    let (state, _) = update(state, Msg::UrlInputChanged("https://other.example/list".into()));
    let (state, _) = update(
        state,
        Msg::RunFailed {
            request_id: request_id_of(&effects),
            failure: ServiceFailure::default(),
        },
    );

    assert_eq!(state.view().run_panel, RunPanelView::Hidden);
}

#[test]
fn regenerate_failing_after_url_change_does_not_restore_results() {
    let state = ready_state();
    let (state, effects) = update(state, Msg::RegenerateClicked);
    let (state, _) = update(state, Msg::UrlInputChanged("https://other.example/list".into()));
    let (state, _) = update(
        state,
        Msg::AnalysisFailed {
            request_id: request_id_of(&effects),
            failure: ServiceFailure::default(),
        },
    );

    let view = state.view();
    assert_eq!(view.phase, Phase::Idle);
    assert!(!view.results_visible);
    assert!(view.controls.submit);
    assert_eq!(view.alert.as_deref(), Some("Error: Error regenerating script"));
}
