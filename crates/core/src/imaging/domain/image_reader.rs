use std::path::Path;

use crate::shared::frame::Frame;

/// Loads an image file into an RGB [`Frame`].
///
/// A zero-width or zero-height image is an error, never an empty frame.
pub trait ImageReader: Send {
    fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>>;
}
