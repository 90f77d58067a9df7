use crate::config::ExtractorConfig;
use crate::models::{Detection, ExtractionOutcome, ExtractionResult, FieldLabel};
use crate::output::{format_output, DocumentReport};
use crate::processing::*;
use crate::utils::Result;
use image::RgbImage;
use log::{debug, error, info, warn};
use std::path::Path;

/// Runs the full extraction pipeline over one document at a time.
///
/// The detector and classifier are built once by the caller and reused for
/// every document; the extractor never mutates them.
pub struct InvoiceExtractor {
    detector: Box<dyn TextDetector>,
    classifier: Box<dyn LayoutClassifier>,
    rasterizer: Option<PdfRasterizer>,
    config: ExtractorConfig,
}

impl InvoiceExtractor {
    pub fn new(
        detector: Box<dyn TextDetector>,
        classifier: Box<dyn LayoutClassifier>,
        config: ExtractorConfig,
    ) -> Self {
        InvoiceExtractor {
            detector,
            classifier,
            rasterizer: None,
            config,
        }
    }

    /// Enables PDF input.
    pub fn with_pdf_rasterizer(mut self, rasterizer: PdfRasterizer) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extracts the fields of one document.
    ///
    /// Never fails: stage errors come back as `ExtractionOutcome::Failed`, so
    /// one bad document cannot stop a batch.
    pub fn process_file(&self, path: &Path) -> ExtractionOutcome {
        info!("Processing {}", path.display());
        match self.try_process(path) {
            Ok(result) => {
                info!("Extracted {} fields from {}", result.len(), path.display());
                ExtractionOutcome::Extracted(result)
            }
            Err(err) => {
                error!("Failed to process {}: {}", path.display(), err);
                ExtractionOutcome::Failed {
                    error: err.to_string(),
                }
            }
        }
    }

    /// Processes each file in order and wraps the outcome in its report
    /// envelope.
    pub fn process_batch<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<DocumentReport> {
        paths
            .iter()
            .map(|path| {
                let path = path.as_ref();
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                let outcome = self.process_file(path);
                format_output(&filename, &outcome)
            })
            .collect()
    }

    fn try_process(&self, path: &Path) -> Result<ExtractionResult> {
        // Step 1: Rasterize (a rendered PDF page is deleted when `raster` drops)
        let raster = rasterize(path, self.rasterizer.as_ref())?;
        let image = image::open(raster.path())?.to_rgb8();

        // Step 2: Detect text lines
        let detections = self.detector.detect(raster.path())?;
        debug!("{} detections in {}", detections.len(), path.display());
        self.extract_from_detections(raster.path(), &image, &detections)
    }

    /// Everything after text detection: tokenization, classification, word
    /// reconstruction, key clustering, aggregation and value fallback.
    pub fn extract_from_detections(
        &self,
        image_path: &Path,
        image: &RgbImage,
        detections: &[Detection],
    ) -> Result<ExtractionResult> {
        if detections.is_empty() {
            warn!("No text detected in {}", image_path.display());
            return Ok(ExtractionResult::new());
        }

        // Step 3: Normalize boxes and collect the header text
        let page = tokenize(
            detections,
            image.width(),
            image.height(),
            self.config.header_region_fraction,
        );
        let words = page.words();
        let boxes = page.boxes();

        // Step 4: Classify
        let output = self.classifier.classify(&ClassifierInput {
            image_path,
            image,
            words: &words,
            boxes: &boxes,
        })?;
        if output.truncated {
            warn!(
                "Classifier input for {} was truncated; fields printed after the cut are lost",
                image_path.display()
            );
        }

        // Step 5: Rebuild words and pull in stray access-key fragments
        let mut reconstructed = reconstruct_words(&output.predictions);
        debug!("Reconstructed {} words from {} sub-tokens", reconstructed.len(), output.predictions.len());
        expand_access_key(&mut reconstructed, &self.config.access_key);

        // Step 6: Aggregate and clean fields
        let mut result = aggregate_fields(&reconstructed, &page.header_text, &self.config);

        // Step 7: Fall back to the largest printed amount
        if result.value(FieldLabel::TotalValue).is_empty() {
            if let Some(value) = recover_total_value(detections, &self.config) {
                info!("Recovered total value {} from raw detections", value);
                result.insert(FieldLabel::TotalValue, value);
            }
        }

        Ok(result)
    }
}
