use ndarray::ArrayView3;

/// A decoded image: contiguous RGB bytes in row-major order.
///
/// Format conversion happens at I/O boundaries only; detectors and
/// encoders treat pixel data as opaque.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Copies the `w × h` rectangle at `(x, y)` into a new frame.
    ///
    /// The rectangle is clamped to the frame bounds and may come back
    /// smaller than requested (or empty).
    pub fn crop(&self, x: u32, y: u32, w: u32, h: u32) -> Frame {
        let x = x.min(self.width);
        let y = y.min(self.height);
        let w = w.min(self.width - x);
        let h = h.min(self.height - y);

        let ch = self.channels as usize;
        let row_len = w as usize * ch;
        let mut data = Vec::with_capacity(row_len * h as usize);
        for row in y..y + h {
            let start = (row as usize * self.width as usize + x as usize) * ch;
            data.extend_from_slice(&self.data[start..start + row_len]);
        }
        Frame::new(data, w, h, self.channels)
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Frame where every pixel's R channel holds its column and G its row.
    fn coordinate_frame(width: u32, height: u32) -> Frame {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[x as u8, y as u8, 0]);
            }
        }
        Frame::new(data, width, height, 3)
    }

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, 3);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        let data = vec![0u8; 10]; // wrong size for 2x2x3
        Frame::new(data, 2, 2, 3);
    }

    #[test]
    fn test_as_ndarray_shape() {
        let data = vec![0u8; 24]; // 2x4x3
        let frame = Frame::new(data, 4, 2, 3);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 4, 3]); // (height, width, channels)
    }

    #[test]
    fn test_as_ndarray_pixel_access() {
        let frame = coordinate_frame(4, 3);
        let arr = frame.as_ndarray();
        assert_eq!(arr[[2, 1, 0]], 1); // column
        assert_eq!(arr[[2, 1, 1]], 2); // row
    }

    #[test]
    fn test_crop_copies_requested_rectangle() {
        let frame = coordinate_frame(10, 8);
        let crop = frame.crop(3, 2, 4, 5);
        assert_eq!((crop.width(), crop.height()), (4, 5));
        let arr = crop.as_ndarray();
        assert_eq!(arr[[0, 0, 0]], 3);
        assert_eq!(arr[[0, 0, 1]], 2);
        assert_eq!(arr[[4, 3, 0]], 6);
        assert_eq!(arr[[4, 3, 1]], 6);
    }

    #[test]
    fn test_crop_clamps_to_bounds() {
        let frame = coordinate_frame(10, 8);
        let crop = frame.crop(7, 6, 100, 100);
        assert_eq!((crop.width(), crop.height()), (3, 2));
    }

    #[test]
    fn test_crop_outside_frame_is_empty() {
        let frame = coordinate_frame(10, 8);
        let crop = frame.crop(20, 20, 5, 5);
        assert_eq!((crop.width(), crop.height()), (0, 0));
        assert!(crop.data().is_empty());
    }
}
