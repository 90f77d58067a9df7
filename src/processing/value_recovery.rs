use crate::config::ExtractorConfig;
use crate::models::Detection;
use once_cell::sync::Lazy;
use regex::Regex;

static STRICT_CURRENCY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,3}(?:\.\d{3})*,\d{2}$").expect("strict currency pattern"));

/// Parses `1.234,56`-style text into a number.
pub fn parse_brl(text: &str) -> Option<f64> {
    text.replace('.', "").replace(',', ".").parse().ok()
}

/// Currency text of a detection if it is a plausible invoice amount.
///
/// Tiny amounts and values that look like a printed year are rejected.
pub fn currency_candidate(text: &str, config: &ExtractorConfig) -> Option<(String, f64)> {
    let clean = text.replace("R$", "");
    let clean = clean.trim();
    if !STRICT_CURRENCY.is_match(clean) {
        return None;
    }
    let value = parse_brl(clean)?;
    let (year_low, year_high) = config.fallback_year_range;
    if value <= config.fallback_min_value || (year_low..=year_high).contains(&value) {
        return None;
    }
    Some((clean.to_string(), value))
}

/// Largest plausible amount printed anywhere on the page, as printed.
/// Equal amounts resolve to the first one detected.
pub fn recover_total_value(detections: &[Detection], config: &ExtractorConfig) -> Option<String> {
    let mut best: Option<(String, f64)> = None;
    for detection in detections {
        if let Some((text, value)) = currency_candidate(&detection.text, config) {
            let better = match &best {
                Some((_, current)) => value > *current,
                None => true,
            };
            if better {
                best = Some((text, value));
            }
        }
    }
    best.map(|(text, _)| text)
}
