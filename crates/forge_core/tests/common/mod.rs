#![allow(dead_code)]

use std::sync::Once;

use forge_core::{
    update, AnalysisOutcome, AppState, ElementSample, Effect, FieldVerdict, HistoryEntry, Msg,
    RequestId, SampleItem, ScrapedRecord, ScriptArtifact, SelectorEdits, SelectorField,
    SelectorSet, ValidationReport,
};

pub const SHOP_URL: &str = "https://shop.example/cat";

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(forge_logging::initialize_for_tests);
}

pub fn shop_selectors() -> SelectorSet {
    SelectorSet {
        product_container: ".item".into(),
        product_title: ".item h2".into(),
        product_url: ".item a".into(),
        product_image: ".item img".into(),
        product_price: ".item .price".into(),
        pagination_next: String::new(),
    }
}

pub fn element(selector: &str, value: &str) -> Option<ElementSample> {
    Some(ElementSample {
        selector: selector.into(),
        value: Some(value.into()),
        html: Some(format!("<span>{value}</span>")),
    })
}

pub fn report(iterations: u32, all_valid: bool) -> ValidationReport {
    ValidationReport {
        final_validation: ["title", "url", "image", "price"]
            .iter()
            .map(|field| FieldVerdict {
                field: field.to_string(),
                valid: all_valid || *field != "price",
            })
            .collect(),
        iterations,
        history: vec![HistoryEntry {
            samples: vec![SampleItem {
                elements: vec![
                    ("title".into(), element(".item h2", "Shoe")),
                    ("price".into(), element(".item .price", "$10")),
                ],
            }],
        }],
        ..Default::default()
    }
}

pub fn outcome(selectors: SelectorSet, script: &str) -> AnalysisOutcome {
    AnalysisOutcome {
        selectors,
        script: ScriptArtifact(script.into()),
        report: report(2, true),
    }
}

pub fn record(title: &str) -> ScrapedRecord {
    ScrapedRecord {
        title: Some(title.into()),
        url: Some(format!("{SHOP_URL}/{title}")),
        image_url: None,
        price: Some("$1".into()),
    }
}

/// Seeds selectors and URL, then submits.
pub fn submit(state: AppState, url: &str, selectors: SelectorSet) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::SelectorsEntered(SelectorEdits(selectors)));
    let (state, _) = update(state, Msg::UrlInputChanged(url.to_string()));
    update(state, Msg::SubmitClicked)
}

pub fn request_id_of(effects: &[Effect]) -> RequestId {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::Analyze { request_id, .. }
            | Effect::RunScript { request_id, .. }
            | Effect::ExportCsv { request_id, .. } => Some(*request_id),
            Effect::SaveDownload(_) => None,
        })
        .expect("backend effect")
}

/// A session that finished its first analyze round and shows results.
pub fn ready_state() -> AppState {
    init_logging();
    let (state, effects) = submit(AppState::new(), SHOP_URL, shop_selectors());
    let request_id = request_id_of(&effects);
    let (state, _) = update(
        state,
        Msg::AnalysisSucceeded {
            request_id,
            outcome: outcome(shop_selectors(), "print('scrape')"),
        },
    );
    state
}

pub fn field_edit(field: SelectorField, value: &str) -> Msg {
    Msg::DraftFieldChanged {
        field,
        value: value.into(),
    }
}
