pub mod config;
pub mod invoice_extractor;
pub mod models;
pub mod output;
pub mod processing;
pub mod utils;
pub mod validation;

pub use config::ExtractorConfig;
pub use invoice_extractor::InvoiceExtractor;
pub use models::{ExtractionOutcome, ExtractionResult, FieldLabel};
pub use utils::{InvoiceError, Result};
