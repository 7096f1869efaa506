//! 5-point face landmarks in image pixel coordinates.
//!
//! Order: [left_eye, right_eye, nose, left_mouth, right_mouth], where left
//! and right are as seen in the image.

#[derive(Clone, Debug, PartialEq)]
pub struct FaceLandmarks {
    /// Points with x <= 0 are treated as invisible.
    points: [(f64, f64); 5],
}

impl FaceLandmarks {
    pub fn new(points: [(f64, f64); 5]) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[(f64, f64); 5] {
        &self.points
    }

    /// True when every landmark was detected with enough confidence.
    pub fn all_visible(&self) -> bool {
        self.points.iter().all(|(x, _)| *x > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_visible() {
        let lm = FaceLandmarks::new([(10.0, 10.0); 5]);
        assert!(lm.all_visible());
    }

    #[test]
    fn test_one_hidden_point_is_not_all_visible() {
        let mut points = [(10.0, 10.0); 5];
        points[3] = (0.0, 0.0);
        assert!(!FaceLandmarks::new(points).all_visible());
    }
}
