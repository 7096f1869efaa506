use serde::{Deserialize, Serialize};

use crate::shared::face_encoding::FaceEncoding;
use crate::shared::face_location::FaceLocation;

/// Result of one extraction request: detected faces and their embeddings,
/// correlated by index.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceExtraction {
    pub locations: Vec<FaceLocation>,
    pub encodings: Vec<FaceEncoding>,
}

impl FaceExtraction {
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Compact single-line JSON: `{"locations":[[t,r,b,l],...],"encodings":[[...],...]}`.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FaceExtraction {
        FaceExtraction {
            locations: vec![FaceLocation::new(10, 60, 70, 5), FaceLocation::new(1, 2, 3, 0)],
            encodings: vec![
                FaceEncoding::new(vec![0.5, -0.25]),
                FaceEncoding::new(vec![1.0, 0.0]),
            ],
        }
    }

    #[test]
    fn test_to_json_line_shape() {
        let line = sample().to_json_line().unwrap();
        assert_eq!(
            line,
            r#"{"locations":[[10,60,70,5],[1,2,3,0]],"encodings":[[0.5,-0.25],[1.0,0.0]]}"#
        );
    }

    #[test]
    fn test_to_json_line_has_no_newline() {
        assert!(!sample().to_json_line().unwrap().contains('\n'));
    }

    #[test]
    fn test_empty_extraction() {
        let empty = FaceExtraction::default();
        assert!(empty.is_empty());
        assert_eq!(
            empty.to_json_line().unwrap(),
            r#"{"locations":[],"encodings":[]}"#
        );
    }

    #[test]
    fn test_json_contains_only_numeric_arrays() {
        let value: serde_json::Value =
            serde_json::from_str(&sample().to_json_line().unwrap()).unwrap();
        for key in ["locations", "encodings"] {
            for row in value[key].as_array().unwrap() {
                assert!(row.as_array().unwrap().iter().all(|v| v.is_number()));
            }
        }
    }

    #[test]
    fn test_parses_back() {
        let line = sample().to_json_line().unwrap();
        let parsed: FaceExtraction = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, sample());
    }
}
