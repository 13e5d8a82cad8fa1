//! Plain-text rendering of the view model.

use forge_core::display::{SampleCell, ValidationView, NO_SELECTOR, SAMPLE_FIELDS};
use forge_core::records::EMPTY_TABLE_NOTICE;
use forge_core::{AppViewModel, Controls, RunPanelView, SelectorRowView};

const RULE: &str = "------------------------------------------------------------";

pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = vec![RULE.to_string()];

    if let Some(alert) = &view.alert {
        lines.push(format!("!! {alert}  (type `dismiss`)"));
    }
    if let Some(status) = &view.loading_status {
        lines.push(format!("... {status}"));
    }

    if view.form_visible {
        lines.push(format!("URL: {}", or_dash(&view.url_input)));
        lines.push(if view.pagination_enabled {
            format!("Pagination: on ({})", or_dash(&view.pagination_selector))
        } else {
            "Pagination: off".to_string()
        });
    }

    if view.results_visible {
        render_results(view, &mut lines);
    }

    if let Some(draft) = &view.edit_draft {
        lines.push(String::new());
        lines.push("Editing selectors (`set <field> <selector>`, then `save` or `cancel`):".into());
        push_selector_rows(draft, &mut lines);
    }

    render_run_panel(&view.run_panel, &mut lines);

    lines.push(String::new());
    lines.push(format!("Actions: {}", available_actions(&view.controls)));
    lines
}

fn render_results(view: &AppViewModel, lines: &mut Vec<String>) {
    lines.push(String::new());
    lines.push(format!("Results for {}", view.session_url));

    if let Some(selectors) = &view.selectors {
        lines.push("Selectors:".into());
        push_selector_rows(selectors, lines);
    }
    if let Some(validation) = &view.validation {
        render_validation(validation, lines);
    }
    if let Some(script) = &view.script {
        lines.push(String::new());
        lines.push("Generated script:".into());
        lines.extend(script.lines().map(|line| format!("    {line}")));
    }
}

fn push_selector_rows(rows: &[SelectorRowView], lines: &mut Vec<String>) {
    for row in rows {
        lines.push(format!("  {:<18} {}", format!("{}:", row.label), row.value));
    }
}

fn render_validation(validation: &ValidationView, lines: &mut Vec<String>) {
    lines.push(String::new());
    lines.push(format!(
        "{} [{}] after {} iteration(s)",
        validation.headline,
        validation.overall.label(),
        validation.iterations
    ));
    lines.push(format!("  {}", validation.message));

    if !validation.live_status.is_empty() {
        lines.push("Live status:".into());
        for row in &validation.live_status {
            let sample = if row.sample_found {
                row.sample_value.clone()
            } else {
                format!("({})", row.sample_value)
            };
            lines.push(format!(
                "  {:<16} {:<13} {} -> {}",
                row.label,
                row.badge.label(),
                row.selector,
                sample
            ));
            if let Some(reason) = &row.reason {
                lines.push(format!("      reason: {reason}"));
            }
        }
    }

    if !validation.sample_rows.is_empty() {
        lines.push("Samples:".into());
        for row in &validation.sample_rows {
            let cells = row
                .cells
                .iter()
                .zip(SAMPLE_FIELDS)
                .map(|(cell, field)| match cell {
                    SampleCell::NoSelector => format!("{field}: {NO_SELECTOR}"),
                    SampleCell::Element { value, badge, .. } => {
                        format!("{field}: {value} [{}]", badge.label())
                    }
                })
                .collect::<Vec<_>>();
            lines.push(format!("  #{} {}", row.index, cells.join(" | ")));
        }
    }

    if !validation.field_summaries.is_empty() {
        lines.push("Summary:".into());
        for summary in &validation.field_summaries {
            let mark = if summary.valid { "ok " } else { "fix" };
            lines.push(format!("  [{mark}] {}: {}", summary.label, summary.text));
        }
    }
}

fn render_run_panel(panel: &RunPanelView, lines: &mut Vec<String>) {
    match panel {
        RunPanelView::Hidden => {}
        RunPanelView::Loading => {
            lines.push(String::new());
            lines.push("Running scraper...".into());
        }
        RunPanelView::Data { count, rows } => {
            lines.push(String::new());
            lines.push(format!("Scraped data: {count} items"));
            if rows.is_empty() {
                lines.push(format!("  {EMPTY_TABLE_NOTICE}"));
            }
            for row in rows {
                lines.push(format!(
                    "  {:>3}. {} | {} | {} | {}",
                    row.index, row.title, row.url, row.image_url, row.price
                ));
            }
        }
        RunPanelView::Error { message, detail } => {
            lines.push(String::new());
            lines.push(format!("Error: {message}"));
            lines.push("Details:".into());
            lines.extend(detail.lines().map(|line| format!("  {line}")));
        }
    }
}

fn available_actions(controls: &Controls) -> String {
    let actions = [
        (controls.submit, "submit"),
        (controls.edit, "edit"),
        (controls.save, "save"),
        (controls.regenerate, "regenerate"),
        (controls.run, "run"),
        (controls.export_csv, "export"),
        (controls.download_script, "script"),
    ];
    let enabled: Vec<&str> = actions
        .iter()
        .filter(|(on, _)| *on)
        .map(|(_, name)| *name)
        .collect();
    if enabled.is_empty() {
        "(waiting for backend)".to_string()
    } else {
        enabled.join(", ")
    }
}

fn or_dash(text: &str) -> &str {
    if text.trim().is_empty() {
        "-"
    } else {
        text
    }
}
