pub mod field_cleaning;
pub mod format;

pub use field_cleaning::clean_field;
pub use format::{chunk_access_key, format_tax_id};
