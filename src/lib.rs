//! Live webcam face recognition over a labeled grayscale sample set.
//!
//! The binary points at a dataset root (one subdirectory per identity,
//! `.pgm` samples inside), streams camera frames into a window, and lets
//! the operator drag a capture rectangle over a face. Space trains an
//! eigenface model on the full dataset and prints the predicted label;
//! Escape quits.

pub mod capture;
pub mod dataset;
pub mod error;
pub mod recognition;
pub mod roi;
pub mod session;

pub use error::{Error, Result};
