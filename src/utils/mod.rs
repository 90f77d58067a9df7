pub mod error;

pub use error::{InvoiceError, Result};
