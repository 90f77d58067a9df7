use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed label schema of the fine-tuned layout classifier.
///
/// Variant order matches the classifier's label ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FieldLabel {
    #[serde(rename = "O")]
    Outside,
    #[serde(rename = "CHAVE_ACESSO")]
    AccessKey,
    #[serde(rename = "NOME_EMITENTE")]
    IssuerName,
    #[serde(rename = "CNPJ_EMITENTE")]
    IssuerTaxId,
    #[serde(rename = "NOME_DESTINATARIO")]
    RecipientName,
    #[serde(rename = "CNPJ_DESTINATARIO")]
    RecipientTaxId,
    #[serde(rename = "DATA_EMISSAO")]
    IssueDate,
    #[serde(rename = "VALOR_TOTAL")]
    TotalValue,
    #[serde(rename = "NUM_NOTA_FISCAL")]
    InvoiceNumber,
    #[serde(rename = "NUM_SERIE")]
    InvoiceSeries,
}

/// Cleaning family a label belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    AccessKey,
    Name,
    TaxId,
    Date,
    Currency,
    DocumentNumber,
    Series,
    None,
}

impl FieldLabel {
    pub const ALL: [FieldLabel; 10] = [
        FieldLabel::Outside,
        FieldLabel::AccessKey,
        FieldLabel::IssuerName,
        FieldLabel::IssuerTaxId,
        FieldLabel::RecipientName,
        FieldLabel::RecipientTaxId,
        FieldLabel::IssueDate,
        FieldLabel::TotalValue,
        FieldLabel::InvoiceNumber,
        FieldLabel::InvoiceSeries,
    ];

    pub fn from_id(id: usize) -> Option<Self> {
        Self::ALL.get(id).copied()
    }

    pub fn id(self) -> usize {
        self as usize
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|label| label.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldLabel::Outside => "O",
            FieldLabel::AccessKey => "CHAVE_ACESSO",
            FieldLabel::IssuerName => "NOME_EMITENTE",
            FieldLabel::IssuerTaxId => "CNPJ_EMITENTE",
            FieldLabel::RecipientName => "NOME_DESTINATARIO",
            FieldLabel::RecipientTaxId => "CNPJ_DESTINATARIO",
            FieldLabel::IssueDate => "DATA_EMISSAO",
            FieldLabel::TotalValue => "VALOR_TOTAL",
            FieldLabel::InvoiceNumber => "NUM_NOTA_FISCAL",
            FieldLabel::InvoiceSeries => "NUM_SERIE",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            FieldLabel::AccessKey => FieldKind::AccessKey,
            FieldLabel::IssuerName | FieldLabel::RecipientName => FieldKind::Name,
            FieldLabel::IssuerTaxId | FieldLabel::RecipientTaxId => FieldKind::TaxId,
            FieldLabel::IssueDate => FieldKind::Date,
            FieldLabel::TotalValue => FieldKind::Currency,
            FieldLabel::InvoiceNumber => FieldKind::DocumentNumber,
            FieldLabel::InvoiceSeries => FieldKind::Series,
            FieldLabel::Outside => FieldKind::None,
        }
    }

    /// Fields the classifier is known to under-score get the lowered floor.
    pub fn uses_lowered_floor(self) -> bool {
        matches!(
            self,
            FieldLabel::RecipientName
                | FieldLabel::TotalValue
                | FieldLabel::AccessKey
                | FieldLabel::IssuerTaxId
                | FieldLabel::RecipientTaxId
        )
    }
}

impl fmt::Display for FieldLabel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
