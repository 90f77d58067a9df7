use clap::Parser;
use log::{info, warn};
use nfe_extract::output::DocumentReport;
use nfe_extract::processing::{CommandClassifier, PdfRasterizer, TesseractDetector};
use nfe_extract::{ExtractorConfig, InvoiceExtractor, Result};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const ACCEPTED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "pdf"];

/// Batch extraction of NF-e invoice fields from scanned DANFE documents
#[derive(Parser)]
#[command(name = "nfe_extract")]
#[command(about = "Extract invoice fields from every document in a folder")]
struct Args {
    /// Folder holding the documents to process
    #[arg(long = "input-dir", default_value = "input_documents")]
    input_dir: PathBuf,

    /// JSON file overriding the extraction thresholds
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tesseract language
    #[arg(long, default_value = "por")]
    lang: String,

    /// Tesseract data directory
    #[arg(long)]
    tessdata: Option<String>,

    /// Program that runs the token classifier (reads JSON on stdin)
    #[arg(long = "classifier-cmd")]
    classifier_cmd: PathBuf,

    /// Extra arguments passed to the classifier program
    #[arg(long = "classifier-arg", allow_hyphen_values = true)]
    classifier_args: Vec<String>,
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

fn build_extractor(args: &Args) -> Result<InvoiceExtractor> {
    let config = match &args.config {
        Some(path) => ExtractorConfig::from_json_file(path)?,
        None => ExtractorConfig::default(),
    };

    let detector = TesseractDetector::new(&args.lang, args.tessdata.clone());
    detector.ensure_available()?;
    let classifier = CommandClassifier::new(args.classifier_cmd.clone(), args.classifier_args.clone());

    let scale = config.pdf_render_scale;
    let extractor = InvoiceExtractor::new(Box::new(detector), Box::new(classifier), config);
    match PdfRasterizer::new(scale) {
        Ok(rasterizer) => Ok(extractor.with_pdf_rasterizer(rasterizer)),
        Err(e) => {
            warn!("PDF input disabled: {}", e);
            Ok(extractor)
        }
    }
}

fn is_accepted(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
}

/// Accepted documents in `dir`, sorted by file name.
fn collect_documents(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if is_accepted(&path) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn run(args: &Args) -> Result<()> {
    if !args.input_dir.exists() {
        fs::create_dir_all(&args.input_dir)?;
        print_json(&json!({
            "notice": format!(
                "Folder '{}' created. Place invoice documents there and run again.",
                args.input_dir.display()
            )
        }));
        return Ok(());
    }

    let files = collect_documents(&args.input_dir)?;
    if files.is_empty() {
        print_json(&json!({
            "notice": format!("No documents found in '{}'.", args.input_dir.display())
        }));
        return Ok(());
    }

    let extractor = build_extractor(args)?;
    info!("Processing {} documents from {}", files.len(), args.input_dir.display());
    let reports: Vec<DocumentReport> = extractor.process_batch(&files);
    print_json(&serde_json::to_value(&reports)?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_json(&json!({ "fatal_error": e.to_string() }));
            ExitCode::FAILURE
        }
    }
}
