use crate::models::{ExtractionOutcome, ExtractionResult, FieldLabel};
use crate::validation::format::digits_only;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";
pub const CURRENCY_BRL: &str = "BRL";

/// Report envelope for one input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentReport {
    pub metadata: ReportMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice: Option<InvoiceReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub processed_at: String,
    pub source_file: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceReport {
    pub general_info: GeneralInfo,
    pub issuer: Issuer,
    pub recipient: Recipient,
    pub financial: Financial,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneralInfo {
    pub number: String,
    pub series: String,
    pub access_key: String,
    pub issue_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issuer {
    pub legal_name: String,
    pub tax_id: String,
    pub person_type: PersonType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipient {
    pub name: String,
    pub tax_id: String,
    pub person_type: PersonType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PersonType {
    /// Company (CNPJ)
    PJ,
    /// Individual (CPF)
    PF,
}

impl PersonType {
    pub fn from_tax_id(digits: &str) -> Self {
        if digits.len() > 11 {
            PersonType::PJ
        } else {
            PersonType::PF
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Financial {
    pub total_value: f64,
    pub currency: String,
}

/// `DD/MM/YYYY` to `YYYY-MM-DD`; anything else is returned unchanged.
pub fn convert_date_iso(date: &str) -> String {
    match NaiveDate::parse_from_str(date.trim(), "%d/%m/%Y") {
        Ok(parsed) => parsed.format("%Y-%m-%d").to_string(),
        Err(_) => date.to_string(),
    }
}

/// Brazilian currency text as a number, `0.0` when it does not parse.
pub fn convert_value_float(value: &str) -> f64 {
    value
        .replace("R$", "")
        .replace('.', "")
        .replace(',', ".")
        .trim()
        .parse()
        .unwrap_or(0.0)
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the
/// rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

/// Digits of a tax id and the person type they imply.
fn tax_identity(raw: &str) -> (String, PersonType) {
    let digits = digits_only(raw);
    let person_type = PersonType::from_tax_id(&digits);
    (digits, person_type)
}

fn invoice_report(result: &ExtractionResult) -> InvoiceReport {
    let total = result.get(FieldLabel::TotalValue).unwrap_or("0");
    let (issuer_tax_id, issuer_type) = tax_identity(result.value(FieldLabel::IssuerTaxId));
    let (recipient_tax_id, recipient_type) = tax_identity(result.value(FieldLabel::RecipientTaxId));
    InvoiceReport {
        general_info: GeneralInfo {
            number: digits_only(result.value(FieldLabel::InvoiceNumber)),
            series: result.value(FieldLabel::InvoiceSeries).to_string(),
            access_key: result.value(FieldLabel::AccessKey).replace(' ', ""),
            issue_date: convert_date_iso(result.value(FieldLabel::IssueDate)),
        },
        issuer: Issuer {
            legal_name: result.value(FieldLabel::IssuerName).to_uppercase(),
            tax_id: issuer_tax_id,
            person_type: issuer_type,
        },
        recipient: Recipient {
            name: title_case(result.value(FieldLabel::RecipientName)),
            tax_id: recipient_tax_id,
            person_type: recipient_type,
        },
        financial: Financial {
            total_value: convert_value_float(total),
            currency: CURRENCY_BRL.to_string(),
        },
    }
}

/// Wraps one document outcome in its report envelope.
pub fn format_output(filename: &str, outcome: &ExtractionOutcome) -> DocumentReport {
    let processed_at = Local::now().to_rfc3339();
    match outcome {
        ExtractionOutcome::Failed { error } => DocumentReport {
            metadata: ReportMetadata {
                transaction_id: None,
                processed_at,
                source_file: filename.to_string(),
                status: STATUS_ERROR.to_string(),
                message: Some(error.clone()),
            },
            invoice: None,
        },
        ExtractionOutcome::Extracted(result) => DocumentReport {
            metadata: ReportMetadata {
                transaction_id: Some(Uuid::new_v4().to_string()),
                processed_at,
                source_file: filename.to_string(),
                status: STATUS_SUCCESS.to_string(),
                message: None,
            },
            invoice: Some(invoice_report(result)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> ExtractionResult {
        let mut result = ExtractionResult::new();
        result.insert(FieldLabel::InvoiceNumber, "000.012.345".to_string());
        result.insert(FieldLabel::InvoiceSeries, "007".to_string());
        result.insert(
            FieldLabel::AccessKey,
            "3520 0112 3456 7800 0199 5500 1000 0000 0112 3456 7890".to_string(),
        );
        result.insert(FieldLabel::IssueDate, "05/03/2024".to_string());
        result.insert(FieldLabel::IssuerName, "Acme Comercio Ltda".to_string());
        result.insert(FieldLabel::IssuerTaxId, "12.345.678/0001-99".to_string());
        result.insert(FieldLabel::RecipientName, "MARIA DA SILVA".to_string());
        result.insert(FieldLabel::RecipientTaxId, "123.456.789-01".to_string());
        result.insert(FieldLabel::TotalValue, "1.234,56".to_string());
        result
    }

    #[test]
    fn test_date_conversion() {
        assert_eq!(convert_date_iso("05/03/2024"), "2024-03-05");
        assert_eq!(convert_date_iso("31/02/2024"), "31/02/2024");
        assert_eq!(convert_date_iso(""), "");
    }

    #[test]
    fn test_value_conversion() {
        assert_eq!(convert_value_float("1.234,56"), 1234.56);
        assert_eq!(convert_value_float("R$ 89,90"), 89.9);
        assert_eq!(convert_value_float("abc"), 0.0);
        assert_eq!(convert_value_float(""), 0.0);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("MARIA DA SILVA"), "Maria Da Silva");
        assert_eq!(title_case("joão d'ávila"), "João D'Ávila");
    }

    #[test]
    fn test_person_type() {
        assert_eq!(PersonType::from_tax_id("12345678000199"), PersonType::PJ);
        assert_eq!(PersonType::from_tax_id("12345678901"), PersonType::PF);
        assert_eq!(PersonType::from_tax_id(""), PersonType::PF);
    }

    #[test]
    fn test_success_envelope() {
        let outcome = ExtractionOutcome::Extracted(sample_result());
        let report = format_output("nota.png", &outcome);

        assert_eq!(report.metadata.status, STATUS_SUCCESS);
        assert!(report.metadata.message.is_none());
        let id = report.metadata.transaction_id.as_deref().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
        assert!(chrono::DateTime::parse_from_rfc3339(&report.metadata.processed_at).is_ok());

        let invoice = report.invoice.unwrap();
        assert_eq!(invoice.general_info.number, "000012345");
        assert_eq!(invoice.general_info.series, "007");
        assert_eq!(
            invoice.general_info.access_key,
            "35200112345678000199550010000000011234567890"
        );
        assert_eq!(invoice.general_info.issue_date, "2024-03-05");
        assert_eq!(invoice.issuer.legal_name, "ACME COMERCIO LTDA");
        assert_eq!(invoice.issuer.tax_id, "12345678000199");
        assert_eq!(invoice.issuer.person_type, PersonType::PJ);
        assert_eq!(invoice.recipient.name, "Maria Da Silva");
        assert_eq!(invoice.recipient.person_type, PersonType::PF);
        assert_eq!(invoice.financial.total_value, 1234.56);
        assert_eq!(invoice.financial.currency, "BRL");
    }

    #[test]
    fn test_missing_fields_take_empty_defaults() {
        let report = format_output("blank.png", &ExtractionOutcome::Extracted(ExtractionResult::new()));
        let invoice = report.invoice.unwrap();
        assert_eq!(invoice.general_info.number, "");
        assert_eq!(invoice.issuer.tax_id, "");
        assert_eq!(invoice.issuer.person_type, PersonType::PF);
        assert_eq!(invoice.financial.total_value, 0.0);
    }

    #[test]
    fn test_error_envelope() {
        let outcome = ExtractionOutcome::Failed {
            error: "Conversion error: no pages".to_string(),
        };
        let report = format_output("broken.pdf", &outcome);
        assert_eq!(report.metadata.status, STATUS_ERROR);
        assert_eq!(report.metadata.message.as_deref(), Some("Conversion error: no pages"));
        assert!(report.invoice.is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("invoice").is_none());
        assert!(json["metadata"].get("transaction_id").is_none());
        assert_eq!(json["metadata"]["source_file"], "broken.pdf");
    }

    #[test]
    fn test_serialized_field_names() {
        let report = format_output("nota.png", &ExtractionOutcome::Extracted(sample_result()));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["metadata"]["status"], "success");
        assert_eq!(json["invoice"]["issuer"]["person_type"], "PJ");
        assert_eq!(json["invoice"]["issuer"]["legal_name"], "ACME COMERCIO LTDA");
        assert_eq!(json["invoice"]["recipient"]["name"], "Maria Da Silva");
        assert_eq!(json["invoice"]["financial"]["total_value"], 1234.56);
    }
}
