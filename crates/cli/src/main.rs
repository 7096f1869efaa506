use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use face_extract_core::detection::infrastructure::detector_factory::{
    create_detector, DetectorKind,
};
use face_extract_core::encoding::infrastructure::onnx_sface_encoder::OnnxSfaceEncoder;
use face_extract_core::imaging::infrastructure::image_file_reader::ImageFileReader;
use face_extract_core::pipeline::extract_faces_use_case::ExtractFacesUseCase;
use face_extract_core::shared::constants::{
    EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL, YOLO_MODEL_NAME, YOLO_MODEL_URL,
};
use face_extract_core::shared::model_resolver;
use face_extract_core::worker::line_worker::LineWorker;

/// Face detection and encoding worker.
///
/// Reads one image path per line on stdin and answers each with a JSON
/// line `{"locations": [...], "encodings": [...]}` on stdout. `ping` is
/// answered with `pong`; a blank line or end of input exits.
#[derive(Parser, Debug)]
#[command(name = "face-extract", version)]
struct Cli {
    /// Face detection backend: yolo or blazeface.
    #[arg(long, default_value = "yolo")]
    detector: DetectorKind,

    /// BlazeFace ONNX model file (required with --detector blazeface).
    #[arg(long)]
    blazeface_model: Option<PathBuf>,

    /// Face detection confidence threshold (0.0-1.0). Defaults per backend.
    #[arg(long)]
    confidence: Option<f64>,

    /// Directory checked for model files before the cache and download.
    #[arg(long)]
    models_dir: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let use_case = build_use_case(&cli)?;

    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    let mut worker = LineWorker::new(use_case, stdin, stdout);
    worker.run()?;
    Ok(())
}

/// Loads every model up front so requests never pay load cost.
fn build_use_case(cli: &Cli) -> Result<ExtractFacesUseCase, Box<dyn std::error::Error>> {
    let models_dir = cli.models_dir.as_deref();

    let detector_path = match cli.detector {
        DetectorKind::Yolo => {
            log::info!("Resolving model: {YOLO_MODEL_NAME}");
            model_resolver::resolve(
                YOLO_MODEL_NAME,
                YOLO_MODEL_URL,
                models_dir,
                Some(Box::new(|d: u64, t: u64| {
                    download_progress("face detection", d, t)
                })),
            )?
        }
        DetectorKind::Blazeface => cli
            .blazeface_model
            .clone()
            .ok_or("--blazeface-model is required with --detector blazeface")?,
    };
    let detector = create_detector(cli.detector, &detector_path, cli.confidence)?;

    log::info!("Resolving model: {EMBEDDING_MODEL_NAME}");
    let encoder_path = model_resolver::resolve(
        EMBEDDING_MODEL_NAME,
        EMBEDDING_MODEL_URL,
        models_dir,
        Some(Box::new(|d: u64, t: u64| {
            download_progress("face encoding", d, t)
        })),
    )?;
    let encoder = OnnxSfaceEncoder::new(&encoder_path)?;

    Ok(ExtractFacesUseCase::new(
        Box::new(ImageFileReader::new()),
        detector,
        Box::new(encoder),
    ))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(c) = cli.confidence {
        if !(0.0..=1.0).contains(&c) {
            return Err(format!("Confidence must be between 0.0 and 1.0, got {c}").into());
        }
    }
    if let Some(ref path) = cli.blazeface_model {
        if !path.is_file() {
            return Err(format!("BlazeFace model not found: {}", path.display()).into());
        }
    }
    if let Some(ref dir) = cli.models_dir {
        if !dir.is_dir() {
            return Err(format!("Models directory not found: {}", dir.display()).into());
        }
    }
    Ok(())
}

// Progress goes to stderr: stdout carries protocol lines only.
fn download_progress(what: &str, downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading {what} model... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading {what} model... {downloaded} bytes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("face-extract").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_no_flags_uses_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.detector, DetectorKind::Yolo);
        assert!(cli.confidence.is_none());
        assert!(validate(&cli).is_ok());
    }

    #[test]
    fn test_rejects_unknown_detector() {
        let result = Cli::try_parse_from(["face-extract", "--detector", "hog"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_out_of_range_confidence() {
        let cli = parse(&["--confidence", "1.5"]);
        assert!(validate(&cli).is_err());
    }

    #[test]
    fn test_blazeface_requires_model() {
        let cli = parse(&["--detector", "blazeface"]);
        let err = build_use_case(&cli).err().unwrap();
        assert!(err.to_string().contains("--blazeface-model"));
    }

    #[test]
    fn test_rejects_missing_blazeface_model_file() {
        let cli = parse(&[
            "--detector",
            "blazeface",
            "--blazeface-model",
            "/nonexistent/blazeface.onnx",
        ]);
        let err = validate(&cli).unwrap_err();
        assert!(err.to_string().contains("BlazeFace model not found"));
    }

    #[test]
    fn test_rejects_missing_models_dir() {
        let cli = parse(&["--models-dir", "/nonexistent/face-extract-models"]);
        assert!(validate(&cli).is_err());
    }
}
