use opencv::core::{Mat, Ptr, Rect, Size};
use opencv::face::EigenFaceRecognizer;
use opencv::imgproc;
use opencv::prelude::*;

use crate::dataset::{TrainingCorpus, SAMPLE_HEIGHT, SAMPLE_WIDTH};
use crate::error::Result;

/// Identity predicted for a prepared sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: i32,
    /// Distance reported by the model; lower means a closer match.
    pub confidence: f64,
}

/// The face-recognition capability: fit a model to a corpus, then predict
/// a label for a prepared sample.
pub trait Recognizer {
    fn train(&mut self, corpus: &TrainingCorpus) -> Result<()>;
    fn predict(&self, sample: &Mat) -> Result<Prediction>;
}

/// Eigenface model backed by the vision library.
///
/// `train` replaces the model with a freshly created instance, so every
/// recognition request fits the full corpus from scratch.
pub struct EigenRecognizer {
    model: Ptr<EigenFaceRecognizer>,
}

impl EigenRecognizer {
    pub fn new() -> Result<Self> {
        Ok(EigenRecognizer {
            model: Self::create_model()?,
        })
    }

    fn create_model() -> Result<Ptr<EigenFaceRecognizer>> {
        // Stock component count and threshold.
        Ok(EigenFaceRecognizer::create(0, f64::MAX)?)
    }
}

impl Recognizer for EigenRecognizer {
    fn train(&mut self, corpus: &TrainingCorpus) -> Result<()> {
        self.model = Self::create_model()?;
        self.model.train(corpus.images(), corpus.labels())?;
        tracing::debug!(samples = corpus.len(), "eigenface model trained");
        Ok(())
    }

    fn predict(&self, sample: &Mat) -> Result<Prediction> {
        let mut label = -1;
        let mut confidence = 0.0;
        self.model.predict(sample, &mut label, &mut confidence)?;
        Ok(Prediction { label, confidence })
    }
}

/// Crop `frame` to `roi`, convert to grayscale and resize to the corpus
/// sample geometry. The caller has already validated the bounds against
/// the frame.
pub fn prepare_sample(frame: &Mat, roi: Rect) -> Result<Mat> {
    let crop = Mat::roi(frame, roi)?;
    let mut grey = Mat::default();
    imgproc::cvt_color_def(&crop, &mut grey, imgproc::COLOR_BGR2GRAY)?;
    let mut sample = Mat::default();
    imgproc::resize_def(&grey, &mut sample, Size::new(SAMPLE_WIDTH, SAMPLE_HEIGHT))?;
    Ok(sample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_8UC3};

    #[test]
    fn prepared_sample_has_corpus_geometry() {
        let frame =
            Mat::new_rows_cols_with_default(480, 640, CV_8UC3, Scalar::all(64.0)).unwrap();
        let sample = prepare_sample(&frame, Rect::new(100, 100, 200, 200)).unwrap();
        assert_eq!(sample.cols(), SAMPLE_WIDTH);
        assert_eq!(sample.rows(), SAMPLE_HEIGHT);
        assert_eq!(sample.channels(), 1);
    }
}
