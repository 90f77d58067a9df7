use crate::models::{Detection, Quad};
use crate::utils::{InvoiceError, Result};
use log::debug;
use std::path::Path;
use tesseract::Tesseract;

/// Produces line-level detections over a raster image.
///
/// Boxes are in source pixel space, in the engine's own scan order.
pub trait TextDetector {
    fn detect(&self, image_path: &Path) -> Result<Vec<Detection>>;
}

/// Tesseract word boxes (TSV output) grouped back into text lines.
pub struct TesseractDetector {
    language: String,
    datapath: Option<String>,
}

impl TesseractDetector {
    pub fn new(language: &str, datapath: Option<String>) -> Self {
        Self {
            language: language.to_string(),
            datapath,
        }
    }

    /// Fails when the engine cannot load the configured language data.
    pub fn ensure_available(&self) -> Result<()> {
        Tesseract::new(self.datapath.as_deref(), Some(self.language.as_str())).map_err(|e| {
            InvoiceError::Detection(format!(
                "Tesseract cannot load language '{}': {}",
                self.language, e
            ))
        })?;
        Ok(())
    }
}

impl Default for TesseractDetector {
    fn default() -> Self {
        Self::new("por", None)
    }
}

impl TextDetector for TesseractDetector {
    fn detect(&self, image_path: &Path) -> Result<Vec<Detection>> {
        let path_str = image_path
            .to_str()
            .ok_or_else(|| InvoiceError::Detection("Could not convert path to string".to_string()))?;

        let mut tess = Tesseract::new(self.datapath.as_deref(), Some(self.language.as_str()))
            .map_err(|e| InvoiceError::Detection(format!("Failed to initialize Tesseract: {}", e)))?
            .set_image(path_str)
            .map_err(|e| InvoiceError::Detection(format!("Failed to set image: {}", e)))?;

        let tsv = tess
            .get_tsv_text(0)
            .map_err(|e| InvoiceError::Detection(format!("Failed to extract TSV: {}", e)))?;

        let detections = lines_from_tsv(&tsv);
        debug!("Tesseract found {} text lines in {}", detections.len(), image_path.display());
        Ok(detections)
    }
}

const TSV_MIN_FIELDS: usize = 12;
const TSV_WORD_LEVEL: u32 = 5;

struct LineAccumulator {
    key: (u32, u32, u32, u32),
    words: Vec<String>,
    confidences: Vec<f32>,
    left: f32,
    top: f32,
    right: f32,
    bottom: f32,
}

impl LineAccumulator {
    fn into_detection(self) -> Detection {
        let confidence = if self.confidences.is_empty() {
            0.0
        } else {
            self.confidences.iter().sum::<f32>() / self.confidences.len() as f32
        };
        Detection {
            quad: Quad::from_rect(self.left, self.top, self.right, self.bottom),
            text: self.words.join(" "),
            confidence: (confidence / 100.0).clamp(0.0, 1.0),
        }
    }
}

/// Groups word rows of Tesseract TSV output by `(page, block, paragraph, line)`.
/// Lines are emitted in the order their first word appears.
pub fn lines_from_tsv(tsv: &str) -> Vec<Detection> {
    let mut lines: Vec<LineAccumulator> = Vec::new();

    for (line_num, row) in tsv.lines().enumerate() {
        if line_num == 0 && row.starts_with("level") {
            continue;
        }
        let fields: Vec<&str> = row.split('\t').collect();
        if fields.len() < TSV_MIN_FIELDS {
            continue;
        }
        if fields[0].trim().parse::<u32>().unwrap_or(0) != TSV_WORD_LEVEL {
            continue;
        }
        let text = fields[11].trim();
        if text.is_empty() {
            continue;
        }

        let num = |i: usize| fields[i].trim().parse::<u32>().unwrap_or(0);
        let px = |i: usize| fields[i].trim().parse::<f32>().unwrap_or(0.0);
        let key = (num(1), num(2), num(3), num(4));
        let (left, top) = (px(6), px(7));
        let (right, bottom) = (left + px(8), top + px(9));
        let conf = fields[10].trim().parse::<f32>().unwrap_or(0.0).max(0.0);

        match lines.iter_mut().find(|l| l.key == key) {
            Some(line) => {
                line.words.push(text.to_string());
                line.confidences.push(conf);
                line.left = line.left.min(left);
                line.top = line.top.min(top);
                line.right = line.right.max(right);
                line.bottom = line.bottom.max(bottom);
            }
            None => lines.push(LineAccumulator {
                key,
                words: vec![text.to_string()],
                confidences: vec![conf],
                left,
                top,
                right,
                bottom,
            }),
        }
    }

    lines.into_iter().map(LineAccumulator::into_detection).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    #[test]
    fn test_words_grouped_into_lines() {
        let tsv = format!(
            "{}\n\
             4\t1\t1\t1\t1\t0\t100\t50\t300\t30\t-1\t\n\
             5\t1\t1\t1\t1\t1\t100\t50\t80\t30\t90\tVALOR\n\
             5\t1\t1\t1\t1\t2\t190\t52\t70\t30\t80\tTOTAL\n\
             5\t1\t1\t1\t2\t1\t100\t100\t120\t28\t96\t1.234,56\n",
            HEADER
        );

        let lines = lines_from_tsv(&tsv);
        assert_eq!(lines.len(), 2);

        assert_eq!(lines[0].text, "VALOR TOTAL");
        assert_eq!(lines[0].quad.bounds(), (100.0, 50.0, 260.0, 82.0));
        assert!((lines[0].confidence - 0.85).abs() < 1e-6);

        assert_eq!(lines[1].text, "1.234,56");
        assert!((lines[1].confidence - 0.96).abs() < 1e-6);
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let tsv = format!(
            "{}\nnot a row\n5\t1\t1\n5\t1\t1\t1\t1\t1\t10\t10\t5\t5\t70\t \n5\t1\t1\t1\t3\t1\t10\t40\t50\t10\t70\tSÉRIE\n",
            HEADER
        );
        let lines = lines_from_tsv(&tsv);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "SÉRIE");
    }

    #[test]
    fn test_empty_output() {
        assert!(lines_from_tsv("").is_empty());
        assert!(lines_from_tsv(HEADER).is_empty());
    }
}
