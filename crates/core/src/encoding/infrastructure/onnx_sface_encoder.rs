/// SFace face encoder using ONNX Runtime.
///
/// Faces with a full set of landmarks are aligned onto the 112×112 template;
/// the rest fall back to a square crop around the box, resized to 112×112.
/// Each face yields an [`ENCODING_DIM`]-long, L2-normalized encoding.
use std::path::Path;

use crate::encoding::domain::face_encoder::FaceEncoder;
use crate::shared::constants::ENCODING_DIM;
use crate::shared::detected_face::DetectedFace;
use crate::shared::face_encoding::{l2_normalize, FaceEncoding};
use crate::shared::face_location::FaceLocation;
use crate::shared::frame::Frame;
use crate::shared::onnx_session;

use super::face_alignment;

const INPUT_SIZE: u32 = 112;

/// Fraction of the face size added on every side of the fallback crop.
const CROP_MARGIN: f64 = 0.1;

pub struct OnnxSfaceEncoder {
    session: ort::session::Session,
}

impl OnnxSfaceEncoder {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        log::info!("Loading SFace encoder from {}", model_path.display());
        let session = onnx_session::load_session(model_path)?;
        Ok(Self { session })
    }

    fn embed(&mut self, face: &Frame) -> Result<FaceEncoding, Box<dyn std::error::Error>> {
        let tensor = preprocess(face.data(), face.width(), face.height());
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        let embedding_array = outputs[0].try_extract_array::<f32>()?;
        let embedding_slice = embedding_array
            .as_slice()
            .ok_or("Cannot get embedding slice")?;
        to_encoding(embedding_slice)
    }
}

impl FaceEncoder for OnnxSfaceEncoder {
    fn encode(
        &mut self,
        frame: &Frame,
        faces: &[DetectedFace],
    ) -> Result<Vec<FaceEncoding>, Box<dyn std::error::Error>> {
        faces
            .iter()
            .map(|face| {
                let input = face_input(frame, face)?;
                self.embed(&input)
            })
            .collect()
    }
}

/// The encoder input for one face: aligned when its landmarks allow it.
fn face_input(frame: &Frame, face: &DetectedFace) -> Result<Frame, Box<dyn std::error::Error>> {
    let aligned = face
        .landmarks
        .as_ref()
        .and_then(|lm| face_alignment::align(frame, lm, INPUT_SIZE));
    match aligned {
        Some(aligned) => Ok(aligned),
        None => {
            log::debug!("No usable landmarks for {:?}, using square crop", face.location);
            square_crop(frame, &face.location)
        }
    }
}

/// Extracts a square crop centered on the location, padded by
/// [`CROP_MARGIN`] and clamped to frame bounds.
fn square_crop(frame: &Frame, loc: &FaceLocation) -> Result<Frame, Box<dyn std::error::Error>> {
    if loc.area() == 0 {
        return Err(format!("Cannot encode empty face location {loc:?}").into());
    }
    let (cx, cy) = loc.center();
    let side = loc.width().max(loc.height()) as f64 * (1.0 + 2.0 * CROP_MARGIN);
    let half = side / 2.0;

    let x1 = (cx - half).round().max(0.0) as u32;
    let y1 = (cy - half).round().max(0.0) as u32;
    let x2 = ((cx + half).round().max(0.0) as u32).min(frame.width());
    let y2 = ((cy + half).round().max(0.0) as u32).min(frame.height());

    let crop = frame.crop(x1, y1, x2.saturating_sub(x1), y2.saturating_sub(y1));
    if crop.width() == 0 || crop.height() == 0 {
        return Err(format!("Face location {loc:?} lies outside the image").into());
    }
    Ok(crop)
}

/// Resize to 112x112, NCHW RGB. SFace takes raw 0-255 pixel values.
fn preprocess(rgb_data: &[u8], width: u32, height: u32) -> ndarray::Array4<f32> {
    let src_w = width as usize;
    let src_h = height as usize;
    let s = INPUT_SIZE as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, s, s));

    for y in 0..s {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / s as f64) as usize).min(src_h - 1);
        for x in 0..s {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / s as f64) as usize).min(src_w - 1);
            let offset = (src_y * src_w + src_x) * 3;
            for c in 0..3 {
                tensor[[0, c, y, x]] = rgb_data[offset + c] as f32;
            }
        }
    }

    tensor
}

/// Checks the model output length and L2-normalizes it.
fn to_encoding(raw: &[f32]) -> Result<FaceEncoding, Box<dyn std::error::Error>> {
    if raw.len() != ENCODING_DIM {
        return Err(format!(
            "Encoder model produced {} values, expected {ENCODING_DIM}",
            raw.len()
        )
        .into());
    }
    let mut embedding = raw.to_vec();
    l2_normalize(&mut embedding);
    Ok(FaceEncoding::new(embedding))
}
