pub mod access_key;
pub mod aggregation;
pub mod classifier;
pub mod layout;
pub mod ocr;
pub mod raster;
pub mod reconstruction;
pub mod value_recovery;

pub use access_key::expand_access_key;
pub use aggregation::aggregate_fields;
pub use classifier::{ClassifierInput, ClassifierOutput, CommandClassifier, LayoutClassifier};
pub use layout::{tokenize, TokenizedPage};
pub use ocr::{TesseractDetector, TextDetector};
pub use raster::{rasterize, DocumentKind, PdfRasterizer, RasterImage};
pub use reconstruction::reconstruct_words;
pub use value_recovery::recover_total_value;
