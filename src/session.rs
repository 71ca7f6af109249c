use std::sync::{Arc, Mutex, PoisonError};

use opencv::core::{Mat, Rect, Scalar};
use opencv::prelude::*;
use opencv::{highgui, imgproc};

use crate::capture::FrameSource;
use crate::dataset::TrainingCorpus;
use crate::error::{Error, Result};
use crate::recognition::{prepare_sample, Prediction, Recognizer};
use crate::roi::RoiController;

/// Title of the live display window.
pub const WINDOW_TITLE: &str = "Live Video...";

/// Target cadence of the capture loop.
const TARGET_FPS: f64 = 30.0;

const KEY_ESCAPE: i32 = 27;
const KEY_SPACE: i32 = 32;

/// Initial position and size of the capture rectangle.
pub fn default_roi() -> Rect {
    Rect::new(250, 200, 200, 200)
}

/// What the operator asked for this iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quit,
    Recognize,
    Ignore,
}

impl Command {
    fn from_key(code: i32) -> Self {
        match code {
            KEY_ESCAPE => Command::Quit,
            KEY_SPACE => Command::Recognize,
            _ => Command::Ignore,
        }
    }
}

/// Presentation and input surface of the session.
pub trait Surface {
    fn show(&mut self, frame: &Mat) -> Result<()>;

    /// Poll for a key press, waiting at most `delay_ms`. Returns the raw
    /// key code, negative when no key was pressed.
    fn poll_key(&mut self, delay_ms: i32) -> Result<i32>;
}

/// Window with the mouse callback wired to the ROI controller.
///
/// The callback runs on the same thread while the loop blocks inside the
/// key poll; the mutex exists to satisfy the callback's `Send + Sync`
/// bound and is uncontended.
pub struct LiveWindow {
    name: String,
}

impl LiveWindow {
    pub fn open(name: &str, roi: Arc<Mutex<RoiController>>) -> Result<Self> {
        highgui::named_window(name, highgui::WINDOW_AUTOSIZE)?;
        highgui::set_mouse_callback(
            name,
            Some(Box::new(move |event, x, y, _flags| {
                let mut roi = roi.lock().unwrap_or_else(PoisonError::into_inner);
                match event {
                    highgui::EVENT_LBUTTONDOWN => roi.pointer_down(x, y),
                    highgui::EVENT_MOUSEMOVE => roi.pointer_move(x, y),
                    highgui::EVENT_LBUTTONUP => roi.pointer_up(),
                    _ => {}
                }
            })),
        )?;
        Ok(LiveWindow {
            name: name.to_string(),
        })
    }
}

impl Surface for LiveWindow {
    fn show(&mut self, frame: &Mat) -> Result<()> {
        highgui::imshow(&self.name, frame)?;
        Ok(())
    }

    fn poll_key(&mut self, delay_ms: i32) -> Result<i32> {
        Ok(highgui::wait_key(delay_ms)?)
    }
}

impl Drop for LiveWindow {
    fn drop(&mut self) {
        let _ = highgui::destroy_window(&self.name);
    }
}

/// The per-frame capture loop: render the frame with the capture region
/// marked, poll for a command, and on request train on the full corpus
/// and predict the identity inside the region.
pub struct Session<'a> {
    corpus: &'a TrainingCorpus,
    roi: &'a Mutex<RoiController>,
    poll_delay_ms: i32,
}

impl<'a> Session<'a> {
    pub fn new(corpus: &'a TrainingCorpus, roi: &'a Mutex<RoiController>) -> Self {
        Session {
            corpus,
            roi,
            poll_delay_ms: (1000.0 / TARGET_FPS) as i32,
        }
    }

    /// Run until the quit key is pressed or the source runs out of frames.
    pub fn run(
        &self,
        source: &mut impl FrameSource,
        surface: &mut impl Surface,
        recognizer: &mut impl Recognizer,
    ) -> Result<()> {
        loop {
            let Some(frame) = source.next_frame()? else {
                tracing::info!("capture source exhausted");
                return Ok(());
            };
            let roi = self.current_roi();
            let display = render_display(&frame, roi)?;
            surface.show(&display)?;

            match Command::from_key(surface.poll_key(self.poll_delay_ms)?) {
                Command::Quit => return Ok(()),
                Command::Recognize => match self.recognize(&frame, roi, recognizer) {
                    Ok(prediction) => {
                        println!("Predicted class = {}", prediction.label);
                        tracing::debug!(
                            label = prediction.label,
                            confidence = prediction.confidence,
                            "prediction"
                        );
                    }
                    Err(err) if err.is_recoverable() => eprintln!("Error: {err}."),
                    Err(err) => return Err(err),
                },
                Command::Ignore => {}
            }
        }
    }

    fn current_roi(&self) -> Rect {
        self.roi
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .rect()
    }

    /// Crop, train and predict. Bounds and corpus are validated here,
    /// against the original frame rather than the display copy.
    fn recognize(
        &self,
        frame: &Mat,
        roi: Rect,
        recognizer: &mut impl Recognizer,
    ) -> Result<Prediction> {
        if !fits_within(roi, frame) {
            return Err(Error::RoiOutOfBounds {
                roi,
                cols: frame.cols(),
                rows: frame.rows(),
            });
        }
        if self.corpus.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        let sample = prepare_sample(frame, roi)?;
        println!("Thinking...");
        recognizer.train(self.corpus)?;
        recognizer.predict(&sample)
    }
}

/// True when `roi` lies entirely inside `frame`.
fn fits_within(roi: Rect, frame: &Mat) -> bool {
    roi.x >= 0
        && roi.y >= 0
        && roi.x + roi.width <= frame.cols()
        && roi.y + roi.height <= frame.rows()
}

/// Display copy of `frame`: the capture region desaturated so the operator
/// sees exactly what the recognizer will get, with the rectangle outlined
/// on top. A region hanging outside the frame is outlined but left in
/// color.
fn render_display(frame: &Mat, roi: Rect) -> Result<Mat> {
    let mut display = frame.try_clone()?;
    if fits_within(roi, frame) {
        let region = Mat::roi(frame, roi)?;
        let mut grey = Mat::default();
        imgproc::cvt_color_def(&region, &mut grey, imgproc::COLOR_BGR2GRAY)?;
        let mut grey_bgr = Mat::default();
        imgproc::cvt_color_def(&grey, &mut grey_bgr, imgproc::COLOR_GRAY2BGR)?;
        let mut target = Mat::roi_mut(&mut display, roi)?;
        grey_bgr.copy_to(&mut target)?;
    }
    imgproc::rectangle(
        &mut display,
        roi,
        Scalar::new(0.0, 0.0, 255.0, 0.0),
        2,
        imgproc::LINE_8,
        0,
    )?;
    Ok(display)
}
