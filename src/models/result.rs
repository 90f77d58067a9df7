use crate::models::FieldLabel;
use serde::Serialize;
use std::collections::BTreeMap;

/// Final label-keyed field values of one document.
///
/// Labels that could not be recovered are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExtractionResult {
    fields: BTreeMap<FieldLabel, String>,
}

impl ExtractionResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: FieldLabel, value: String) {
        if label != FieldLabel::Outside {
            self.fields.insert(label, value);
        }
    }

    pub fn get(&self, label: FieldLabel) -> Option<&str> {
        self.fields.get(&label).map(String::as_str)
    }

    /// Value of `label`, or `""` when absent.
    pub fn value(&self, label: FieldLabel) -> &str {
        self.get(label).unwrap_or("")
    }

    pub fn contains(&self, label: FieldLabel) -> bool {
        self.fields.contains_key(&label)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldLabel, &str)> {
        self.fields.iter().map(|(label, value)| (*label, value.as_str()))
    }

    /// Plain `label name -> value` map.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|(label, value)| (label.as_str().to_string(), value.to_string()))
            .collect()
    }
}

/// Result of one document run as seen by batch drivers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractionOutcome {
    Failed { error: String },
    Extracted(ExtractionResult),
}

impl ExtractionOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ExtractionOutcome::Failed { .. })
    }

    /// Flat map view: the field map on success, `{"error": message}` otherwise.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        match self {
            ExtractionOutcome::Extracted(result) => result.to_map(),
            ExtractionOutcome::Failed { error } => {
                BTreeMap::from([("error".to_string(), error.clone())])
            }
        }
    }
}
