use super::face_landmarks::FaceLandmarks;
use super::face_location::FaceLocation;

/// A face found by a detector: its box and, when the backend provides
/// them, its 5-point landmarks.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedFace {
    pub location: FaceLocation,
    pub landmarks: Option<FaceLandmarks>,
}

impl DetectedFace {
    pub fn new(location: FaceLocation) -> Self {
        Self {
            location,
            landmarks: None,
        }
    }

    pub fn with_landmarks(mut self, landmarks: FaceLandmarks) -> Self {
        self.landmarks = Some(landmarks);
        self
    }
}
