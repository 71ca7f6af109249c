use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio;

use crate::error::{Error, Result};

/// A stream of frames. `None` means the source is exhausted and the
/// session should terminate cleanly.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<Mat>>;
}

/// Webcam input. The device is released when the value drops, on every
/// exit path of the session.
pub struct Camera {
    inner: videoio::VideoCapture,
}

impl Camera {
    /// Open the capture device with the given index.
    pub fn open(index: i32) -> Result<Self> {
        let inner = videoio::VideoCapture::new(index, videoio::CAP_ANY)?;
        if !inner.is_opened()? {
            return Err(Error::CameraUnavailable { index });
        }
        Ok(Camera { inner })
    }
}

impl FrameSource for Camera {
    fn next_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        if !self.inner.read(&mut frame)? || frame.empty() {
            return Ok(None);
        }
        Ok(Some(frame))
    }
}
