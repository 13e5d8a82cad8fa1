//! Pure rendering of a [`ValidationReport`] into display rows.
//!
//! Two views are derived independently from the same report and are never
//! merged: sample columns come from the last history snapshot, while every
//! pass/fail badge comes from `final_validation`.

use crate::report::{ElementSample, ValidationReport};

/// Sample-table columns, in display order.
///
/// The image column reads the `image` element key, which is what the analyze
/// backend emits; an `image_url` key never appears in sample elements.
pub const SAMPLE_FIELDS: [&str; 4] = ["title", "url", "image", "price"];

pub const NOT_FOUND: &str = "Not found";
pub const NO_SELECTOR: &str = "No selector";
pub const VALID_TEXT: &str = "Field correctly identified and validated.";
pub const INVALID_TEXT: &str =
    "Field needs improvement - current value does not match expected pattern.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverallStatus {
    Complete,
    InProgress,
}

impl OverallStatus {
    pub fn label(self) -> &'static str {
        match self {
            OverallStatus::Complete => "Complete",
            OverallStatus::InProgress => "In Progress",
        }
    }
}

/// Badge sourced from the global verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictBadge {
    Valid,
    Validating,
}

impl VerdictBadge {
    fn from_verdict(valid: bool) -> Self {
        if valid {
            VerdictBadge::Valid
        } else {
            VerdictBadge::Validating
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VerdictBadge::Valid => "Valid",
            VerdictBadge::Validating => "Validating...",
        }
    }

    pub fn is_valid(self) -> bool {
        self == VerdictBadge::Valid
    }
}

/// One row of the live-status table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveStatusRow {
    pub field: String,
    pub label: String,
    pub selector: String,
    pub sample_value: String,
    /// Whether the first sample yielded a value. Independent of `badge`.
    pub sample_found: bool,
    pub badge: VerdictBadge,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleCell {
    NoSelector,
    Element {
        value: String,
        selector: String,
        html: String,
        badge: VerdictBadge,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRow {
    pub index: usize,
    pub cells: Vec<SampleCell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSummary {
    pub field: String,
    pub label: String,
    pub valid: bool,
    pub text: &'static str,
}

/// Everything the validation panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationView {
    pub overall: OverallStatus,
    pub headline: &'static str,
    pub iterations: u32,
    pub message: String,
    pub live_status: Vec<LiveStatusRow>,
    pub sample_rows: Vec<SampleRow>,
    pub field_summaries: Vec<FieldSummary>,
}

impl ValidationView {
    pub fn from_report(report: &ValidationReport) -> Self {
        let overall = overall_status(report);
        Self {
            overall,
            headline: match overall {
                OverallStatus::Complete => "All Fields Valid",
                OverallStatus::InProgress => "Validating Fields",
            },
            iterations: report.iterations,
            message: status_message(report),
            live_status: live_status_rows(report),
            sample_rows: sample_rows(report),
            field_summaries: field_summaries(report),
        }
    }
}

pub fn overall_status(report: &ValidationReport) -> OverallStatus {
    if report.all_fields_valid() {
        OverallStatus::Complete
    } else {
        OverallStatus::InProgress
    }
}

pub fn status_message(report: &ValidationReport) -> String {
    match report.message.as_deref().filter(|m| !m.is_empty()) {
        Some(message) => message.to_string(),
        None if report.all_fields_valid() => "All selectors validated successfully.".to_string(),
        None => format!(
            "Validating fields - {} iterations so far",
            report.iterations
        ),
    }
}

/// Rows from the first sample of the last history entry.
pub fn live_status_rows(report: &ValidationReport) -> Vec<LiveStatusRow> {
    let Some(first) = report
        .last_history()
        .and_then(|entry| entry.samples.first())
    else {
        return Vec::new();
    };

    first
        .elements
        .iter()
        .filter_map(|(field, element)| element.as_ref().map(|element| (field, element)))
        .map(|(field, element)| {
            let found = extracted_value(element).is_some();
            LiveStatusRow {
                field: field.clone(),
                label: field_label(field),
                selector: or_na(&element.selector),
                sample_value: extracted_value(element).unwrap_or(NOT_FOUND).to_string(),
                sample_found: found,
                badge: VerdictBadge::from_verdict(report.verdict(field)),
                reason: report.reason(field).map(str::to_string),
            }
        })
        .collect()
}

/// One row per sample item in the last history entry.
pub fn sample_rows(report: &ValidationReport) -> Vec<SampleRow> {
    let Some(last) = report.last_history() else {
        return Vec::new();
    };

    last.samples
        .iter()
        .enumerate()
        .map(|(i, item)| SampleRow {
            index: i + 1,
            cells: SAMPLE_FIELDS
                .iter()
                .map(|field| match item.element(field) {
                    None => SampleCell::NoSelector,
                    Some(element) => SampleCell::Element {
                        value: extracted_value(element).unwrap_or(NOT_FOUND).to_string(),
                        selector: or_na(&element.selector),
                        html: element
                            .html
                            .as_deref()
                            .filter(|h| !h.is_empty())
                            .unwrap_or(NOT_FOUND)
                            .to_string(),
                        badge: VerdictBadge::from_verdict(report.verdict(field)),
                    },
                })
                .collect(),
        })
        .collect()
}

/// One block per verdict. Field reasons are deliberately absent here.
pub fn field_summaries(report: &ValidationReport) -> Vec<FieldSummary> {
    report
        .final_validation
        .iter()
        .map(|verdict| FieldSummary {
            field: verdict.field.clone(),
            label: field_label(&verdict.field),
            valid: verdict.valid,
            text: if verdict.valid { VALID_TEXT } else { INVALID_TEXT },
        })
        .collect()
}

pub fn field_label(field: &str) -> String {
    match field {
        "container" => "Product Container".to_string(),
        "title" => "Product Title".to_string(),
        "url" => "Product URL".to_string(),
        "image" => "Product Image".to_string(),
        "price" => "Product Price".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

fn extracted_value(element: &ElementSample) -> Option<&str> {
    element.value.as_deref().filter(|v| !v.is_empty())
}

fn or_na(text: &str) -> String {
    if text.is_empty() {
        "N/A".to_string()
    } else {
        text.to_string()
    }
}
