use crate::utils::{InvoiceError, Result};
use image::ImageFormat;
use log::debug;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Image,
    Pdf,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => DocumentKind::Pdf,
            _ => DocumentKind::Image,
        }
    }
}

/// Raster the detector and classifier work on.
///
/// A rendered PDF page lives in a temporary file that is deleted when this
/// value is dropped, whichever way the document run ends.
#[derive(Debug)]
pub enum RasterImage {
    Original(PathBuf),
    Rendered(TempPath),
}

impl RasterImage {
    pub fn path(&self) -> &Path {
        match self {
            RasterImage::Original(path) => path,
            RasterImage::Rendered(temp) => temp,
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, RasterImage::Rendered(_))
    }
}

/// Raster for `path`. Images pass through; PDFs are rendered by `pdf`, and
/// fail with a conversion error when no renderer is available.
pub fn rasterize(path: &Path, pdf: Option<&PdfRasterizer>) -> Result<RasterImage> {
    match (DocumentKind::from_path(path), pdf) {
        (DocumentKind::Image, _) => Ok(RasterImage::Original(path.to_path_buf())),
        (DocumentKind::Pdf, Some(rasterizer)) => rasterizer.render_first_page(path),
        (DocumentKind::Pdf, None) => Err(InvoiceError::Conversion(format!(
            "{}: PDF input requires a pdfium rasterizer",
            path.display()
        ))),
    }
}

/// Renders the first page of PDF inputs.
pub struct PdfRasterizer {
    pdfium: Pdfium,
    scale: f32,
}

impl PdfRasterizer {
    /// Binds a `libpdfium` shipped next to the executable, falling back to
    /// the system library.
    pub fn new(scale: f32) -> Result<Self> {
        let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| InvoiceError::Conversion(format!("Failed to bind pdfium: {}", e)))?;
        Ok(Self {
            pdfium: Pdfium::new(bindings),
            scale,
        })
    }

    /// Pages after the first are ignored.
    pub fn render_first_page(&self, path: &Path) -> Result<RasterImage> {
        let document = self
            .pdfium
            .load_pdf_from_file(path, None)
            .map_err(|e| InvoiceError::Conversion(format!("Failed to open {}: {}", path.display(), e)))?;

        let pages = document.pages();
        if pages.len() == 0 {
            return Err(InvoiceError::Conversion(format!(
                "{} has no pages",
                path.display()
            )));
        }

        let page = pages
            .get(0)
            .map_err(|e| InvoiceError::Conversion(format!("Failed to load page 1: {}", e)))?;

        let config = PdfRenderConfig::new().scale_page_by_factor(self.scale);
        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| InvoiceError::Conversion(format!("Failed to render page 1: {}", e)))?;
        let rgb = bitmap.as_image().into_rgb8();

        let temp = tempfile::Builder::new()
            .prefix("nfe_raster_")
            .suffix(".png")
            .tempfile()?
            .into_temp_path();
        rgb.save_with_format(&temp, ImageFormat::Png)
            .map_err(|e| InvoiceError::Conversion(format!("Failed to write raster: {}", e)))?;

        debug!(
            "Rendered {} page 1 at {}x to {} ({}x{})",
            path.display(),
            self.scale,
            temp.display(),
            rgb.width(),
            rgb.height()
        );
        Ok(RasterImage::Rendered(temp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(DocumentKind::from_path(Path::new("nota.PDF")), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_path(Path::new("nota.pdf")), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_path(Path::new("nota.jpeg")), DocumentKind::Image);
        assert_eq!(DocumentKind::from_path(Path::new("nota")), DocumentKind::Image);
    }

    #[test]
    fn test_rendered_raster_removed_on_drop() {
        let temp = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .unwrap()
            .into_temp_path();
        let path = temp.to_path_buf();

        let raster = RasterImage::Rendered(temp);
        assert!(raster.is_temporary());
        assert!(raster.path().exists());
        drop(raster);
        assert!(!path.exists());
    }

    /// Smallest well-formed PDF with `pages` blank pages of 200x100 points.
    fn blank_pdf(pages: usize) -> Vec<u8> {
        let kids: Vec<String> = (0..pages).map(|i| format!("{} 0 R", i + 3)).collect();
        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), pages),
        ];
        for _ in 0..pages {
            objects.push("<< /Type /Page /Parent 2 0 R /MediaBox [0 0 200 100] >>".to_string());
        }

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }
        let xref_at = pdf.len();
        pdf.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
        for offset in offsets {
            pdf.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_at
            )
            .as_bytes(),
        );
        pdf
    }

    // One test per process binding, since pdfium is initialised globally.
    #[test]
    fn test_pdf_rendering_and_failures() {
        let rasterizer = match PdfRasterizer::new(3.0) {
            Ok(rasterizer) => rasterizer,
            Err(e) => {
                eprintln!("skipping, pdfium unavailable: {}", e);
                return;
            }
        };
        let dir = tempfile::tempdir().unwrap();

        let garbage = dir.path().join("garbage.pdf");
        std::fs::write(&garbage, b"this is not a pdf").unwrap();
        assert!(matches!(
            rasterize(&garbage, Some(&rasterizer)),
            Err(InvoiceError::Conversion(_))
        ));

        let missing = dir.path().join("missing.pdf");
        assert!(matches!(
            rasterize(&missing, Some(&rasterizer)),
            Err(InvoiceError::Conversion(_))
        ));

        let empty = dir.path().join("empty.pdf");
        std::fs::write(&empty, blank_pdf(0)).unwrap();
        assert!(matches!(
            rasterize(&empty, Some(&rasterizer)),
            Err(InvoiceError::Conversion(_))
        ));

        let two_pages = dir.path().join("nota.pdf");
        std::fs::write(&two_pages, blank_pdf(2)).unwrap();
        let raster = rasterize(&two_pages, Some(&rasterizer)).unwrap();
        assert!(raster.is_temporary());
        let rendered = raster.path().to_path_buf();
        assert_eq!(rendered.extension().and_then(|e| e.to_str()), Some("png"));

        let (width, height) = image::image_dimensions(&rendered).unwrap();
        assert!((598..=602).contains(&width), "width {}", width);
        assert!((298..=302).contains(&height), "height {}", height);

        drop(raster);
        assert!(!rendered.exists());

        // images never touch pdfium
        let scan = dir.path().join("scan.jpg");
        let raster = rasterize(&scan, Some(&rasterizer)).unwrap();
        assert_eq!(raster.path(), scan.as_path());
    }

    #[test]
    fn test_pdf_without_renderer() {
        let err = rasterize(Path::new("nota.pdf"), None).unwrap_err();
        assert!(matches!(err, InvoiceError::Conversion(_)));
        let raster = rasterize(Path::new("nota.png"), None).unwrap();
        assert!(!raster.is_temporary());
    }

    #[test]
    fn test_original_raster_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, b"not really a png").unwrap();

        let raster = RasterImage::Original(path.clone());
        assert!(!raster.is_temporary());
        drop(raster);
        assert!(path.exists());
    }
}
