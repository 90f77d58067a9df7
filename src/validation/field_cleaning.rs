//! Field-specific cleanup of the joined OCR text of each label.
//!
//! Each rule turns noisy recognizer output into the canonical shape the
//! output envelope expects: formatted tax ids, `DD/MM/YYYY` dates,
//! comma-decimal currency, grouped access keys.

use crate::config::ACCESS_KEY_DIGITS;
use crate::models::{FieldKind, FieldLabel};
use crate::validation::format::{chunk_access_key, digits_only, format_tax_id};
use once_cell::sync::Lazy;
use regex::Regex;

static INVOICE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{3}\.?\d{3}\.?\d{3}").expect("invoice number pattern"));
static TIME_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{2}[:.]\d{2}[:.]\d{2}").expect("time pattern"));
static CURRENCY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,3}(?:[., ]\d{3})*[., ]\d{2})\b").expect("currency pattern")
});
static DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{2}\s*/\s*\d{2}\s*/\s*\d{4}").expect("date pattern"));
static LEADING_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^a-zA-Z0-9]+").expect("leading noise pattern"));

/// Labels that bleed into name fields when the classifier over-extends a
/// span. `enda ` catches a truncated "Venda".
const NAME_MARKERS: [&str; 9] = [
    "Venda", "Natureza", "Fone", "CNPJ", "CPF", "Inscr", "Endereço", "enda ", "Data",
];

static NAME_MARKER_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    NAME_MARKERS
        .iter()
        .map(|m| Regex::new(&format!("(?i){}", regex::escape(m))).expect("name marker pattern"))
        .collect()
});

pub fn clean_field(label: FieldLabel, text: &str) -> String {
    let text = text.replace('\n', " ");
    let text = text.trim();

    match label.kind() {
        FieldKind::DocumentNumber => clean_invoice_number(text),
        FieldKind::Series => clean_series(text),
        FieldKind::Currency => clean_currency(text),
        FieldKind::AccessKey => clean_access_key(text),
        FieldKind::TaxId => format_tax_id(text).unwrap_or_else(|| text.to_string()),
        FieldKind::Name => clean_name(text),
        FieldKind::Date => clean_date(text),
        FieldKind::None => text.to_string(),
    }
}

fn clean_invoice_number(text: &str) -> String {
    match INVOICE_NUMBER.find(text) {
        Some(m) => m.as_str().to_string(),
        None => text
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect(),
    }
}

/// Series numbers are at most three digits; a longer run means neighbouring
/// text was swallowed, and the series sits at its end.
fn clean_series(text: &str) -> String {
    let digits = digits_only(&text.replace(['O', 'o'], "0"));
    let count = digits.chars().count();
    if count > 3 {
        digits.chars().skip(count - 3).collect()
    } else {
        digits
    }
}

fn clean_currency(text: &str) -> String {
    let without_times = TIME_LIKE.replace_all(text, "");
    match CURRENCY.captures(&without_times) {
        Some(caps) => {
            let value = caps[1].to_string();
            if value.contains('.') && !value.contains(',') {
                value.replace('.', ",")
            } else {
                value
            }
        }
        None => String::new(),
    }
}

fn clean_access_key(text: &str) -> String {
    let digits = digits_only(text);
    if digits.len() >= ACCESS_KEY_DIGITS {
        chunk_access_key(&digits)
    } else {
        digits
    }
}

fn clean_name(text: &str) -> String {
    let mut name = text.to_string();
    for pattern in NAME_MARKER_PATTERNS.iter() {
        if pattern.is_match(&name) {
            name = pattern.split(&name).last().unwrap_or("").to_string();
        }
    }
    LEADING_NOISE.replace(&name, "").trim().to_string()
}

fn clean_date(text: &str) -> String {
    match DATE.find(text) {
        Some(m) => m.as_str().chars().filter(|c| !c.is_whitespace()).collect(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_number_pattern() {
        assert_eq!(clean_field(FieldLabel::InvoiceNumber, "Nº 000.012.345"), "000.012.345");
        assert_eq!(clean_field(FieldLabel::InvoiceNumber, "N 000012345 FOLHA"), "000012345");
        assert_eq!(clean_field(FieldLabel::InvoiceNumber, "Nº 12.34"), "12.34");
    }

    #[test]
    fn test_series_keeps_last_three_digits() {
        assert_eq!(clean_field(FieldLabel::InvoiceSeries, "SÉRIE 0O1"), "001");
        assert_eq!(clean_field(FieldLabel::InvoiceSeries, "1 2024 001"), "001");
        assert_eq!(clean_field(FieldLabel::InvoiceSeries, "1"), "1");
    }

    #[test]
    fn test_currency_ignores_timestamps() {
        assert_eq!(clean_field(FieldLabel::TotalValue, "14:32:10 R$ 1.234,56"), "1.234,56");
        assert_eq!(clean_field(FieldLabel::TotalValue, "TOTAL 150.00"), "150,00");
        assert_eq!(clean_field(FieldLabel::TotalValue, "sem valor"), "");
    }

    #[test]
    fn test_tax_id_fields() {
        assert_eq!(clean_field(FieldLabel::IssuerTaxId, "12345678000199"), "12.345.678/0001-99");
        assert_eq!(clean_field(FieldLabel::RecipientTaxId, "12345678901"), "123.456.789-01");
        assert_eq!(clean_field(FieldLabel::RecipientTaxId, "ISENTO"), "ISENTO");
    }

    #[test]
    fn test_name_strips_contamination() {
        assert_eq!(
            clean_field(FieldLabel::IssuerName, "Natureza da operação Venda - ACME COMERCIO LTDA"),
            "ACME COMERCIO LTDA"
        );
        assert_eq!(clean_field(FieldLabel::RecipientName, "cpf: maria da silva"), "maria da silva");
        assert_eq!(clean_field(FieldLabel::RecipientName, "  - JOSE SOUZA"), "JOSE SOUZA");
    }

    #[test]
    fn test_date_tolerates_spaces() {
        assert_eq!(clean_field(FieldLabel::IssueDate, "Emissão 05 / 03 /2024"), "05/03/2024");
        assert_eq!(clean_field(FieldLabel::IssueDate, "ontem"), "ontem");
    }

    #[test]
    fn test_short_access_key_left_ungrouped() {
        assert_eq!(clean_field(FieldLabel::AccessKey, "3520 0112 3456"), "352001123456");
    }
}
