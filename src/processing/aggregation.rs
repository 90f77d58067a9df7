use crate::config::ExtractorConfig;
use crate::models::{ExtractionResult, FieldLabel, ReconstructedWord};
use crate::validation::field_cleaning::clean_field;
use crate::validation::format::chunk_access_key;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static HEADER_INVOICE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{3}\.\d{3}\.\d{3})").expect("header invoice pattern"));
static HEADER_SERIES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)S[ÉE]RIE[:\s]*(\d+)").expect("header series pattern"));

/// Text segments per label, each with the x position it was printed at.
pub type FieldBuckets = BTreeMap<FieldLabel, Vec<(String, i32)>>;

pub fn confidence_floor(label: FieldLabel, config: &ExtractorConfig) -> f32 {
    if label.uses_lowered_floor() {
        config.lowered_confidence_floor
    } else {
        config.default_confidence_floor
    }
}

/// Groups words by label, dropping `O` and anything under its field's floor.
pub fn bucket_words(words: &[ReconstructedWord], config: &ExtractorConfig) -> FieldBuckets {
    let mut buckets = FieldBuckets::new();
    for word in words {
        if word.label == FieldLabel::Outside {
            continue;
        }
        if word.confidence < confidence_floor(word.label, config) {
            continue;
        }
        buckets
            .entry(word.label)
            .or_default()
            .push((word.text.clone(), word.x_pos()));
    }
    buckets
}

/// Invoice number and series found in the header replace whatever the
/// classifier put in those buckets.
pub fn apply_header_overrides(buckets: &mut FieldBuckets, header_text: &str) {
    if let Some(caps) = HEADER_INVOICE_NUMBER.captures(header_text) {
        debug!("Header invoice number: {}", &caps[1]);
        buckets.insert(FieldLabel::InvoiceNumber, vec![(caps[1].to_string(), 0)]);
    }
    if let Some(caps) = HEADER_SERIES.captures(header_text) {
        debug!("Header series: {}", &caps[1]);
        buckets.insert(FieldLabel::InvoiceSeries, vec![(caps[1].to_string(), 0)]);
    }
}

/// Left-to-right join of one bucket. Access keys are rebuilt from their
/// digit stream.
pub fn join_bucket(label: FieldLabel, parts: &mut [(String, i32)]) -> String {
    parts.sort_by_key(|(_, x)| *x);
    let text = parts
        .iter()
        .map(|(t, _)| t.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let text = text.trim();
    if label == FieldLabel::AccessKey {
        chunk_access_key(text)
    } else {
        text.to_string()
    }
}

/// Builds the field map from classified words and the page header.
pub fn aggregate_fields(
    words: &[ReconstructedWord],
    header_text: &str,
    config: &ExtractorConfig,
) -> ExtractionResult {
    let mut buckets = bucket_words(words, config);
    apply_header_overrides(&mut buckets, header_text);

    let mut result = ExtractionResult::new();
    for (label, mut parts) in buckets {
        let joined = join_bucket(label, &mut parts);
        let cleaned = clean_field(label, &joined);
        if cleaned.chars().count() > 1 {
            result.insert(label, cleaned);
        } else {
            debug!("Dropping {} after cleaning: {:?}", label, joined);
        }
    }
    result
}
