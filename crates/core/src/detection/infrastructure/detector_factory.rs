use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::detection::domain::face_detector::FaceDetector;

use super::onnx_blazeface_detector::{self, OnnxBlazefaceDetector};
use super::onnx_yolo_detector::{self, OnnxYoloDetector};

/// Face detection backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DetectorKind {
    /// YOLO11n face model: the fast default, fetched automatically.
    #[default]
    Yolo,
    /// BlazeFace short-range model: smaller, user-supplied model file.
    Blazeface,
}

impl DetectorKind {
    pub fn default_confidence(self) -> f64 {
        match self {
            DetectorKind::Yolo => onnx_yolo_detector::DEFAULT_CONFIDENCE,
            DetectorKind::Blazeface => onnx_blazeface_detector::DEFAULT_CONFIDENCE,
        }
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectorKind::Yolo => f.write_str("yolo"),
            DetectorKind::Blazeface => f.write_str("blazeface"),
        }
    }
}

impl FromStr for DetectorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yolo" => Ok(DetectorKind::Yolo),
            "blazeface" => Ok(DetectorKind::Blazeface),
            other => Err(format!(
                "Detector must be 'yolo' or 'blazeface', got '{other}'"
            )),
        }
    }
}

/// Loads the detector for `kind` from `model_path`.
///
/// `confidence` falls back to the backend's default when `None`.
pub fn create_detector(
    kind: DetectorKind,
    model_path: &Path,
    confidence: Option<f64>,
) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    let confidence = confidence.unwrap_or_else(|| kind.default_confidence());
    log::info!(
        "Loading {kind} detector from {} (confidence={confidence})",
        model_path.display()
    );
    match kind {
        DetectorKind::Yolo => Ok(Box::new(OnnxYoloDetector::new(model_path, confidence)?)),
        DetectorKind::Blazeface => Ok(Box::new(OnnxBlazefaceDetector::new(
            model_path, confidence,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("yolo", DetectorKind::Yolo)]
    #[case("YOLO", DetectorKind::Yolo)]
    #[case("blazeface", DetectorKind::Blazeface)]
    fn test_parse_detector_kind(#[case] input: &str, #[case] expected: DetectorKind) {
        assert_eq!(input.parse::<DetectorKind>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_detector_kind() {
        let err = "hog".parse::<DetectorKind>().unwrap_err();
        assert!(err.contains("hog"));
    }

    #[test]
    fn test_display_round_trips() {
        for kind in [DetectorKind::Yolo, DetectorKind::Blazeface] {
            assert_eq!(kind.to_string().parse::<DetectorKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_default_is_yolo() {
        assert_eq!(DetectorKind::default(), DetectorKind::Yolo);
        assert_eq!(
            DetectorKind::default().default_confidence(),
            onnx_yolo_detector::DEFAULT_CONFIDENCE
        );
    }
}
