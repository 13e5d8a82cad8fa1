//! Decoding of backend response bodies into core types.
//!
//! The analyze endpoint answers either with one JSON object or with a
//! newline-delimited stream of typed frames (`init`, `validation`,
//! `complete`, `error`). Both shapes decode to the same outcome.

use std::collections::BTreeMap;

use forge_core::{
    AnalysisOutcome, ElementSample, FieldVerdict, HistoryEntry, SampleItem, ScrapedRecord,
    ScriptArtifact, SelectorSet, ValidationReport,
};
use forge_logging::{forge_debug, forge_warn};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{FailureKind, ServiceError};

const MISSING_SELECTORS: &str = "Selectors data is missing from the response.";
const REASONS_KEY: &str = "reasons";

#[derive(Debug, Deserialize)]
struct AnalyzeBody {
    #[serde(default)]
    selectors: Option<SelectorSet>,
    #[serde(default)]
    script: String,
    #[serde(default)]
    validation_summary: SummaryBody,
    #[serde(default)]
    validation_history: Vec<HistoryBody>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SummaryBody {
    #[serde(default)]
    all_fields_valid: Option<bool>,
    #[serde(default)]
    iterations: u32,
    #[serde(default)]
    final_validation: Map<String, Value>,
    #[serde(default)]
    reasons: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct HistoryBody {
    #[serde(default)]
    sample_data: Vec<SampleBody>,
}

#[derive(Debug, Default, Deserialize)]
struct SampleBody {
    #[serde(default)]
    elements: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RunBody {
    #[serde(default)]
    scraped_data: Vec<ScrapedRecord>,
}

/// Decodes a complete analyze response body, single object or frame stream.
pub fn decode_analyze_body(body: &[u8]) -> Result<AnalysisOutcome, ServiceError> {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        return decode_terminal(value);
    }

    let terminal = body
        .split(|byte| *byte == b'\n')
        .filter_map(parse_line)
        .filter(is_terminal)
        .last();

    match terminal {
        Some(frame) => decode_terminal(frame),
        None => Err(ServiceError::decode(None)),
    }
}

pub fn decode_run_body(body: &[u8]) -> Result<Vec<ScrapedRecord>, ServiceError> {
    serde_json::from_slice::<RunBody>(body)
        .map(|run| run.scraped_data)
        .map_err(|err| {
            forge_warn!("run response is not valid JSON: {}", err);
            ServiceError::decode(None)
        })
}

/// Human-readable status for a progress frame; `None` for terminal frames.
pub fn progress_status(frame: &Value) -> Option<String> {
    match frame_type(frame)? {
        "init" => Some("Validating selectors...".to_string()),
        "validation" => {
            let field = frame.get("field").and_then(Value::as_str).unwrap_or("fields");
            match frame.get("iteration").and_then(Value::as_u64) {
                Some(iteration) => Some(format!("Validating {field} (iteration {iteration})...")),
                None => Some(format!("Validating {field}...")),
            }
        }
        _ => None,
    }
}

/// Splits a byte stream into complete JSON lines as chunks arrive.
#[derive(Debug, Default)]
pub struct FrameSplitter {
    pending: Vec<u8>,
}

impl FrameSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns every frame completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Value> {
        self.pending.extend_from_slice(chunk);
        let Some(last_newline) = self.pending.iter().rposition(|b| *b == b'\n') else {
            return Vec::new();
        };
        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);
        complete
            .split(|byte| *byte == b'\n')
            .filter_map(parse_line)
            .collect()
    }
}

fn parse_line(line: &[u8]) -> Option<Value> {
    let line = line.trim_ascii();
    if line.is_empty() {
        return None;
    }
    serde_json::from_slice::<Value>(line).ok()
}

fn frame_type(frame: &Value) -> Option<&str> {
    frame.get("type").and_then(Value::as_str)
}

/// Untyped `{"error": ...}` lines count as error frames.
fn is_untyped_error(frame: &Value) -> bool {
    frame_type(frame).is_none()
        && frame.get("selectors").is_none()
        && frame.get("error").is_some()
}

fn is_terminal(frame: &Value) -> bool {
    matches!(frame_type(frame), Some("complete") | Some("error")) || is_untyped_error(frame)
}

fn decode_terminal(value: Value) -> Result<AnalysisOutcome, ServiceError> {
    match frame_type(&value) {
        Some("error") => Err(ServiceError::new(
            FailureKind::Backend,
            value.get("error").and_then(Value::as_str).map(str::to_string),
        )),
        Some("init") | Some("validation") => {
            forge_warn!("analyze stream ended without a complete frame");
            Err(ServiceError::decode(None))
        }
        _ if is_untyped_error(&value) => {
            let message = value.get("error").and_then(Value::as_str).map(str::to_string);
            forge_warn!("analyze stream reported an error: {:?}", message);
            Err(ServiceError::new(FailureKind::Backend, message))
        }
        _ => {
            let body: AnalyzeBody = serde_json::from_value(value).map_err(|err| {
                forge_warn!("analyze response has unexpected shape: {}", err);
                ServiceError::decode(None)
            })?;
            body.into_outcome()
        }
    }
}

impl AnalyzeBody {
    fn into_outcome(self) -> Result<AnalysisOutcome, ServiceError> {
        let selectors = self
            .selectors
            .ok_or_else(|| ServiceError::decode(Some(MISSING_SELECTORS)))?;

        let mut reasons = string_map(&self.validation_summary.reasons);
        let mut final_validation = Vec::new();
        for (field, value) in self.validation_summary.final_validation {
            if field == REASONS_KEY {
                if let Value::Object(nested) = &value {
                    reasons.extend(string_map(nested));
                }
                continue;
            }
            final_validation.push(FieldVerdict {
                field,
                valid: value.as_bool().unwrap_or(false),
            });
        }

        let report = ValidationReport {
            final_validation,
            reasons,
            iterations: self.validation_summary.iterations,
            history: self
                .validation_history
                .into_iter()
                .map(HistoryBody::into_entry)
                .collect(),
            message: self.message,
        };

        if let Some(reported) = self.validation_summary.all_fields_valid {
            if reported != report.all_fields_valid() {
                forge_warn!(
                    "backend reported all_fields_valid={} but verdicts derive {}",
                    reported,
                    report.all_fields_valid()
                );
            }
        }
        forge_debug!(
            "decoded analysis: iterations={} verdicts={} history={}",
            report.iterations,
            report.final_validation.len(),
            report.history.len()
        );

        Ok(AnalysisOutcome {
            selectors,
            script: ScriptArtifact(self.script),
            report,
        })
    }
}

impl HistoryBody {
    fn into_entry(self) -> HistoryEntry {
        HistoryEntry {
            samples: self
                .sample_data
                .into_iter()
                .map(|sample| SampleItem {
                    elements: sample
                        .elements
                        .into_iter()
                        .map(|(field, value)| {
                            let element = decode_element(&field, value);
                            (field, element)
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

fn decode_element(field: &str, value: Value) -> Option<ElementSample> {
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value) {
        Ok(element) => Some(element),
        Err(err) => {
            forge_warn!("sample element for {} is malformed: {}", field, err);
            None
        }
    }
}

fn string_map(map: &Map<String, Value>) -> BTreeMap<String, String> {
    map.iter()
        .filter_map(|(key, value)| value.as_str().map(|s| (key.clone(), s.to_string())))
        .collect()
}
