use crate::shared::detected_face::DetectedFace;
use crate::shared::face_encoding::FaceEncoding;
use crate::shared::frame::Frame;

/// Domain interface for computing face embeddings.
///
/// Returns exactly one encoding per face, in the same order.
pub trait FaceEncoder: Send {
    fn encode(
        &mut self,
        frame: &Frame,
        faces: &[DetectedFace],
    ) -> Result<Vec<FaceEncoding>, Box<dyn std::error::Error>>;
}
