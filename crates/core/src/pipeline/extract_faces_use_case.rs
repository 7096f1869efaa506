use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::encoding::domain::face_encoder::FaceEncoder;
use crate::imaging::domain::image_reader::ImageReader;
use crate::shared::face_extraction::FaceExtraction;

/// Single-image extraction pipeline: read → detect → encode.
///
/// Owns the loaded models for the lifetime of the worker so their load
/// cost is paid once.
pub struct ExtractFacesUseCase {
    reader: Box<dyn ImageReader>,
    detector: Box<dyn FaceDetector>,
    encoder: Box<dyn FaceEncoder>,
}

impl ExtractFacesUseCase {
    pub fn new(
        reader: Box<dyn ImageReader>,
        detector: Box<dyn FaceDetector>,
        encoder: Box<dyn FaceEncoder>,
    ) -> Self {
        Self {
            reader,
            detector,
            encoder,
        }
    }

    /// Reads the image at `path`, detects faces and encodes each one.
    pub fn execute(&mut self, path: &Path) -> Result<FaceExtraction, Box<dyn std::error::Error>> {
        let frame = self.reader.read(path)?;
        let faces = self.detector.detect(&frame)?;
        let encodings = if faces.is_empty() {
            Vec::new()
        } else {
            self.encoder.encode(&frame, &faces)?
        };
        let locations: Vec<_> = faces.into_iter().map(|face| face.location).collect();

        if encodings.len() != locations.len() {
            return Err(format!(
                "Encoder returned {} encodings for {} faces",
                encodings.len(),
                locations.len()
            )
            .into());
        }

        log::debug!("{}: {} face(s)", path.display(), locations.len());
        Ok(FaceExtraction {
            locations,
            encodings,
        })
    }
}
