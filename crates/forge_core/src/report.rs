use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Verdict for one validated field, kept in the order the backend reported it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldVerdict {
    pub field: String,
    pub valid: bool,
}

/// What one selector extracted from one sample item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementSample {
    #[serde(default)]
    pub selector: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
}

/// One sampled product item: per-field element samples in backend order.
///
/// `None` means the field had no selector configured when the sample was taken.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SampleItem {
    pub elements: Vec<(String, Option<ElementSample>)>,
}

impl SampleItem {
    pub fn element(&self, field: &str) -> Option<&ElementSample> {
        self.elements
            .iter()
            .find(|(name, _)| name == field)
            .and_then(|(_, element)| element.as_ref())
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.elements.iter().any(|(name, _)| name == field)
    }
}

/// Snapshot of one refinement iteration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryEntry {
    pub samples: Vec<SampleItem>,
}

/// The backend's report for one analyze/regenerate call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    pub final_validation: Vec<FieldVerdict>,
    pub reasons: BTreeMap<String, String>,
    pub iterations: u32,
    pub history: Vec<HistoryEntry>,
    pub message: Option<String>,
}

impl ValidationReport {
    /// True iff every verdict in `final_validation` is true.
    pub fn all_fields_valid(&self) -> bool {
        self.final_validation.iter().all(|verdict| verdict.valid)
    }

    /// Global verdict for a field; unknown fields are not valid.
    pub fn verdict(&self, field: &str) -> bool {
        self.final_validation
            .iter()
            .any(|verdict| verdict.field == field && verdict.valid)
    }

    pub fn reason(&self, field: &str) -> Option<&str> {
        self.reasons
            .get(field)
            .map(String::as_str)
            .filter(|reason| !reason.is_empty())
    }

    pub fn last_history(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }

    pub fn valid_count(&self) -> usize {
        self.final_validation.iter().filter(|v| v.valid).count()
    }
}

/// Opaque generated script text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScriptArtifact(pub String);

impl ScriptArtifact {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
