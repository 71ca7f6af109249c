use std::path::PathBuf;

use opencv::core::Rect;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read dataset directory {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("directory name {name:?} does not follow the <prefix><number> label convention")]
    LabelParse { name: String },

    #[error("sample {path} could not be decoded")]
    Decode { path: PathBuf },

    #[error("camera {index} could not be opened for capture")]
    CameraUnavailable { index: i32 },

    #[error("ROI {roi:?} is out of bounds for the {cols}x{rows} frame")]
    RoiOutOfBounds { roi: Rect, cols: i32, rows: i32 },

    #[error("no training samples loaded, recognition request rejected")]
    EmptyCorpus,

    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
}

impl Error {
    /// Recoverable errors are reported to the operator and the capture
    /// loop keeps running; everything else aborts the session.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::RoiOutOfBounds { .. } | Error::EmptyCorpus)
    }
}
