use crate::config::NORMALIZED_EXTENT;
use crate::models::{Detection, LayoutToken, NormalizedBox};

/// Classifier-ready view of one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenizedPage {
    /// One token per detection, in detection order.
    pub tokens: Vec<LayoutToken>,
    /// Space-joined text of the detections in the top band of the page.
    pub header_text: String,
}

impl TokenizedPage {
    pub fn words(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.raw_text.clone()).collect()
    }

    pub fn boxes(&self) -> Vec<NormalizedBox> {
        self.tokens.iter().map(|t| t.normalized_box).collect()
    }
}

/// Rescales a pixel coordinate into the classifier space, truncating toward
/// zero.
fn scale(value: f32, extent: u32) -> i32 {
    if extent == 0 {
        return 0;
    }
    (value as f64 / extent as f64 * NORMALIZED_EXTENT as f64) as i32
}

pub fn normalize_detection(detection: &Detection, width: u32, height: u32) -> NormalizedBox {
    let (x1, y1, x2, y2) = detection.quad.bounds();
    NormalizedBox::clamped(
        scale(x1, width),
        scale(y1, height),
        scale(x2, width),
        scale(y2, height),
    )
}

/// Converts detections into layout tokens and collects the header blob.
///
/// `header_fraction` is the share of the page height, measured from the top,
/// that counts as header.
pub fn tokenize(detections: &[Detection], width: u32, height: u32, header_fraction: f32) -> TokenizedPage {
    let header_limit = height as f32 * header_fraction;
    let mut tokens = Vec::with_capacity(detections.len());
    let mut header_parts: Vec<&str> = Vec::new();

    for detection in detections {
        if detection.quad.vertical_midpoint() < header_limit {
            header_parts.push(&detection.text);
        }
        tokens.push(LayoutToken {
            raw_text: detection.text.clone(),
            normalized_box: normalize_detection(detection, width, height),
        });
    }

    TokenizedPage {
        tokens,
        header_text: header_parts.join(" "),
    }
}
