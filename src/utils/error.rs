use thiserror::Error;

pub type Result<T> = std::result::Result<T, InvoiceError>;

/// Failures raised by the pipeline stages.
///
/// None of these escape a document run: `InvoiceExtractor::process_file`
/// turns them into the `{"error": ...}` sentinel.
#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error("PDF conversion failed: {0}")]
    Conversion(String),

    #[error("Text detection failed: {0}")]
    Detection(String),

    #[error("Layout classification failed: {0}")]
    Classification(String),

    #[error("Image loading failed: {0}")]
    ImageLoad(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<image::ImageError> for InvoiceError {
    fn from(err: image::ImageError) -> Self {
        InvoiceError::ImageLoad(err.to_string())
    }
}
