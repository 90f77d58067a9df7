use crate::models::{FieldLabel, NormalizedBox, SubTokenPrediction};
use crate::utils::{InvoiceError, Result};
use image::RgbImage;
use log::debug;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

pub struct ClassifierInput<'a> {
    pub image_path: &'a Path,
    pub image: &'a RgbImage,
    pub words: &'a [String],
    pub boxes: &'a [NormalizedBox],
}

/// Sub-token stream of one classifier pass, sentinels included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifierOutput {
    pub predictions: Vec<SubTokenPrediction>,
    /// Set when words past the model's context window were dropped.
    pub truncated: bool,
}

/// Token-classification model over words, boxes and page image.
pub trait LayoutClassifier {
    fn classify(&self, input: &ClassifierInput<'_>) -> Result<ClassifierOutput>;
}

#[derive(Debug, Serialize)]
struct ClassifierRequest<'a> {
    image_path: &'a Path,
    width: u32,
    height: u32,
    words: &'a [String],
    boxes: &'a [NormalizedBox],
}

/// Raw model output: parallel arrays, one entry per sub-token.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawClassification {
    pub tokens: Vec<String>,
    pub label_ids: Vec<usize>,
    pub scores: Vec<f32>,
    pub boxes: Vec<NormalizedBox>,
    #[serde(default)]
    pub truncated: bool,
}

impl RawClassification {
    /// Zips the arrays into predictions, rejecting ragged arrays and label
    /// ids outside the schema.
    pub fn into_output(self) -> Result<ClassifierOutput> {
        let n = self.tokens.len();
        if self.label_ids.len() != n || self.scores.len() != n || self.boxes.len() != n {
            return Err(InvoiceError::Classification(format!(
                "shape mismatch: {} tokens, {} labels, {} scores, {} boxes",
                n,
                self.label_ids.len(),
                self.scores.len(),
                self.boxes.len()
            )));
        }

        let mut predictions = Vec::with_capacity(n);
        for (((text, id), score), bbox) in self
            .tokens
            .into_iter()
            .zip(self.label_ids)
            .zip(self.scores)
            .zip(self.boxes)
        {
            let label = FieldLabel::from_id(id).ok_or_else(|| {
                InvoiceError::Classification(format!("label id {} out of range", id))
            })?;
            predictions.push(SubTokenPrediction {
                subtoken_text: text,
                predicted_label: label,
                confidence: score,
                bbox,
            });
        }

        Ok(ClassifierOutput {
            predictions,
            truncated: self.truncated,
        })
    }
}

/// Runs an external model-serving program once per document.
///
/// The request (raster path, page size, words, boxes) goes to the program's
/// stdin as JSON; its stdout must hold a [`RawClassification`] document.
pub struct CommandClassifier {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandClassifier {
    pub fn new<P: Into<PathBuf>>(program: P, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

impl LayoutClassifier for CommandClassifier {
    fn classify(&self, input: &ClassifierInput<'_>) -> Result<ClassifierOutput> {
        let request = ClassifierRequest {
            image_path: input.image_path,
            width: input.image.width(),
            height: input.image.height(),
            words: input.words,
            boxes: input.boxes,
        };
        let payload = serde_json::to_vec(&request)?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                InvoiceError::Classification(format!(
                    "Failed to start {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        // The request is written on its own thread so stdout and stderr are
        // drained while the program is still reading.
        let writer = child.stdin.take().map(|mut stdin| {
            thread::spawn(move || -> std::io::Result<()> {
                match stdin.write_all(&payload) {
                    // A program that exits without reading its input surfaces
                    // through the exit status below, not as a pipe error.
                    Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
                    other => other,
                }
            })
        });

        let output = child.wait_with_output()?;
        if let Some(writer) = writer {
            writer
                .join()
                .map_err(|_| InvoiceError::Classification("Request writer thread panicked".to_string()))??;
        }
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InvoiceError::Classification(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        let raw: RawClassification = serde_json::from_slice(&output.stdout)
            .map_err(|e| InvoiceError::Classification(format!("Malformed classifier output: {}", e)))?;
        debug!("Classifier returned {} sub-tokens for {} words", raw.tokens.len(), input.words.len());
        raw.into_output()
    }
}
