//! 5-point similarity alignment onto the standard 112×112 face template.
//!
//! The transform (rotation, uniform scale, translation) is the least-squares
//! fit from detected landmarks to the template points. The aligned image is
//! produced by inverse mapping with bilinear sampling; pixels that map
//! outside the source are black.

use ndarray::ArrayView3;

use crate::shared::face_landmarks::FaceLandmarks;
use crate::shared::frame::Frame;

/// Template landmark positions in a 112×112 face, in [`FaceLandmarks`] order.
const REFERENCE_112: [(f64, f64); 5] = [
    (38.2946, 51.6963),
    (73.5318, 51.5014),
    (56.0252, 71.7366),
    (41.5493, 92.3655),
    (70.7299, 92.2041),
];

/// `u = a·x − b·y + tx`, `v = b·x + a·y + ty`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimilarityTransform {
    a: f64,
    b: f64,
    tx: f64,
    ty: f64,
}

impl SimilarityTransform {
    /// Least-squares similarity mapping `src` onto `dst`.
    ///
    /// Returns `None` with fewer than two point pairs or when all source
    /// points coincide.
    pub fn estimate(src: &[(f64, f64)], dst: &[(f64, f64)]) -> Option<Self> {
        let n = src.len().min(dst.len());
        if n < 2 {
            return None;
        }
        let (sx, sy) = mean(&src[..n]);
        let (dx, dy) = mean(&dst[..n]);

        let mut var = 0.0;
        let mut num_a = 0.0;
        let mut num_b = 0.0;
        for (&(x, y), &(u, v)) in src.iter().zip(dst).take(n) {
            let (x, y) = (x - sx, y - sy);
            let (u, v) = (u - dx, v - dy);
            var += x * x + y * y;
            num_a += x * u + y * v;
            num_b += x * v - y * u;
        }
        if var < f64::EPSILON {
            return None;
        }

        let a = num_a / var;
        let b = num_b / var;
        Some(Self {
            a,
            b,
            tx: dx - (a * sx - b * sy),
            ty: dy - (b * sx + a * sy),
        })
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x - self.b * y + self.tx,
            self.b * x + self.a * y + self.ty,
        )
    }

    /// `None` when the transform has zero scale.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.a * self.a + self.b * self.b;
        if det < f64::EPSILON {
            return None;
        }
        let a = self.a / det;
        let b = -self.b / det;
        Some(Self {
            a,
            b,
            tx: -(a * self.tx - b * self.ty),
            ty: -(b * self.tx + a * self.ty),
        })
    }
}

/// Warps the face described by `landmarks` into a `size × size` RGB frame.
///
/// Returns `None` when a landmark is hidden or the points are degenerate.
pub fn align(frame: &Frame, landmarks: &FaceLandmarks, size: u32) -> Option<Frame> {
    if !landmarks.all_visible() {
        return None;
    }
    let scale = size as f64 / 112.0;
    let dst: Vec<(f64, f64)> = REFERENCE_112
        .iter()
        .map(|&(x, y)| (x * scale, y * scale))
        .collect();
    let to_source = SimilarityTransform::estimate(landmarks.points(), &dst)?.inverse()?;

    let src = frame.as_ndarray();
    let mut data = vec![0u8; (size * size * 3) as usize];
    for v in 0..size as usize {
        for u in 0..size as usize {
            let (x, y) = to_source.apply(u as f64, v as f64);
            if let Some(px) = sample_bilinear(&src, x, y) {
                let offset = (v * size as usize + u) * 3;
                data[offset..offset + 3].copy_from_slice(&px);
            }
        }
    }
    Some(Frame::new(data, size, size, 3))
}

fn mean(points: &[(f64, f64)]) -> (f64, f64) {
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(ax, ay), &(x, y)| (ax + x, ay + y));
    (sx / n, sy / n)
}

fn sample_bilinear(src: &ArrayView3<'_, u8>, x: f64, y: f64) -> Option<[u8; 3]> {
    let (h, w, _) = src.dim();
    if w == 0 || h == 0 || x < 0.0 || y < 0.0 || x > (w - 1) as f64 || y > (h - 1) as f64 {
        return None;
    }
    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let mut out = [0u8; 3];
    for (c, value) in out.iter_mut().enumerate() {
        let top = src[[y0, x0, c]] as f64 * (1.0 - fx) + src[[y0, x1, c]] as f64 * fx;
        let bottom = src[[y1, x0, c]] as f64 * (1.0 - fx) + src[[y1, x1, c]] as f64 * fx;
        *value = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Some(out)
}
