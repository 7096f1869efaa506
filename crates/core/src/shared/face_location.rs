use serde::{Deserialize, Serialize};

/// Pixel bounding box of a detected face.
///
/// Serializes as the four-element array `[top, right, bottom, left]`,
/// the layout consumers of the worker protocol index into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct FaceLocation {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl FaceLocation {
    pub fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Builds a location from detector corner coordinates `(x1, y1, x2, y2)`,
    /// clamping to a `frame_width × frame_height` image.
    pub fn from_corners(
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        frame_width: u32,
        frame_height: u32,
    ) -> Self {
        let fw = frame_width as f64;
        let fh = frame_height as f64;
        let left = x1.clamp(0.0, fw).round() as i32;
        let top = y1.clamp(0.0, fh).round() as i32;
        let right = x2.clamp(0.0, fw).round() as i32;
        let bottom = y2.clamp(0.0, fh).round() as i32;
        Self {
            top,
            right: right.max(left),
            bottom: bottom.max(top),
            left,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn area(&self) -> i64 {
        self.width().max(0) as i64 * self.height().max(0) as i64
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.left + self.right) as f64 / 2.0,
            (self.top + self.bottom) as f64 / 2.0,
        )
    }
}

impl From<[i32; 4]> for FaceLocation {
    fn from([top, right, bottom, left]: [i32; 4]) -> Self {
        Self::new(top, right, bottom, left)
    }
}

impl From<FaceLocation> for [i32; 4] {
    fn from(loc: FaceLocation) -> Self {
        [loc.top, loc.right, loc.bottom, loc.left]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_from_corners_maps_to_trbl() {
        let loc = FaceLocation::from_corners(10.0, 20.0, 60.0, 90.0, 100, 100);
        assert_eq!(loc, FaceLocation::new(20, 60, 90, 10));
        assert_eq!(loc.width(), 50);
        assert_eq!(loc.height(), 70);
        assert_eq!(loc.area(), 3500);
    }

    #[test]
    fn test_from_corners_clamps_to_frame() {
        let loc = FaceLocation::from_corners(-15.0, -5.0, 130.0, 80.0, 120, 60);
        assert_eq!(loc, FaceLocation::new(0, 120, 60, 0));
    }

    #[test]
    fn test_from_corners_rounds() {
        let loc = FaceLocation::from_corners(10.4, 10.6, 20.5, 30.49, 100, 100);
        assert_eq!(loc, FaceLocation::new(11, 21, 30, 10));
    }

    #[test]
    fn test_from_corners_inverted_box_collapses() {
        let loc = FaceLocation::from_corners(50.0, 50.0, 40.0, 30.0, 100, 100);
        assert_eq!(loc.area(), 0);
    }

    #[rstest]
    #[case::square(FaceLocation::new(0, 10, 10, 0), (5.0, 5.0))]
    #[case::offset(FaceLocation::new(20, 50, 40, 30), (40.0, 30.0))]
    fn test_center(#[case] loc: FaceLocation, #[case] expected: (f64, f64)) {
        assert_eq!(loc.center(), expected);
    }

    #[test]
    fn test_serializes_as_trbl_array() {
        let loc = FaceLocation::new(1, 2, 3, 4);
        assert_eq!(serde_json::to_string(&loc).unwrap(), "[1,2,3,4]");
    }

    #[test]
    fn test_deserializes_from_array() {
        let loc: FaceLocation = serde_json::from_str("[5,60,70,8]").unwrap();
        assert_eq!(loc, FaceLocation::new(5, 60, 70, 8));
    }
}
