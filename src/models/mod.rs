pub mod data;
pub mod labels;
pub mod result;

pub use data::{
    Detection, LayoutToken, NormalizedBox, Point, Quad, ReconstructedWord, SubTokenPrediction,
};
pub use labels::{FieldKind, FieldLabel};
pub use result::{ExtractionOutcome, ExtractionResult};
