use crate::config::NORMALIZED_EXTENT;
use crate::models::FieldLabel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Four corners of a detected text region in source pixel space,
/// clockwise from the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quad(pub [Point; 4]);

impl Quad {
    pub fn from_rect(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Quad([
            Point { x: left, y: top },
            Point { x: right, y: top },
            Point { x: right, y: bottom },
            Point { x: left, y: bottom },
        ])
    }

    /// Axis-aligned extrema as `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for p in &self.0 {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        (min_x, min_y, max_x, max_y)
    }

    pub fn vertical_midpoint(&self) -> f32 {
        let (_, min_y, _, max_y) = self.bounds();
        (min_y + max_y) / 2.0
    }
}

/// One line of recognized text as reported by the text detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub quad: Quad,
    pub text: String,
    pub confidence: f32,
}

/// Box in the classifier's fixed `[0, 1000]` coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct NormalizedBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl NormalizedBox {
    /// Builds a box with every coordinate clamped into range. Callers pass
    /// already ordered corners.
    pub fn clamped(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let clamp = |v: i32| v.clamp(0, NORMALIZED_EXTENT);
        NormalizedBox {
            x1: clamp(x1),
            y1: clamp(y1),
            x2: clamp(x2),
            y2: clamp(y2),
        }
    }

    pub fn vertical_center(&self) -> f32 {
        (self.y1 + self.y2) as f32 / 2.0
    }
}

impl From<[i32; 4]> for NormalizedBox {
    fn from(v: [i32; 4]) -> Self {
        NormalizedBox {
            x1: v[0],
            y1: v[1],
            x2: v[2],
            y2: v[3],
        }
    }
}

impl From<NormalizedBox> for [i32; 4] {
    fn from(b: NormalizedBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutToken {
    pub raw_text: String,
    pub normalized_box: NormalizedBox,
}

/// One sub-word piece emitted by the layout classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct SubTokenPrediction {
    pub subtoken_text: String,
    pub predicted_label: FieldLabel,
    pub confidence: f32,
    pub bbox: NormalizedBox,
}

/// A whole word rebuilt from consecutive sub-tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructedWord {
    pub text: String,
    pub label: FieldLabel,
    pub confidence: f32,
    pub bbox: NormalizedBox,
}

impl ReconstructedWord {
    /// Horizontal position used for left-to-right ordering.
    pub fn x_pos(&self) -> i32 {
        self.bbox.x1
    }
}
