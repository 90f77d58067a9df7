pub mod envelope;

pub use envelope::{format_output, DocumentReport, PersonType};
