use std::fs;
use std::path::Path;

use opencv::core::{Mat, Vector};
use opencv::imgcodecs;
use opencv::prelude::*;

use crate::error::{Error, Result};

/// Width of a training sample in pixels.
pub const SAMPLE_WIDTH: i32 = 92;
/// Height of a training sample in pixels.
pub const SAMPLE_HEIGHT: i32 = 112;

/// Extension of the grayscale sample files in the dataset.
const SAMPLE_EXTENSION: &str = "pgm";

/// Labeled face images in traversal order, ready to be handed to the
/// recognizer. Image and label sequences are always index-aligned.
pub struct TrainingCorpus {
    images: Vector<Mat>,
    labels: Vector<i32>,
}

impl TrainingCorpus {
    /// Build a corpus from pre-decoded samples. Sequences must be
    /// index-aligned.
    pub fn from_parts(images: Vector<Mat>, labels: Vector<i32>) -> Self {
        debug_assert_eq!(images.len(), labels.len());
        TrainingCorpus { images, labels }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &Vector<Mat> {
        &self.images
    }

    pub fn labels(&self) -> &Vector<i32> {
        &self.labels
    }
}

/// Load every sample beneath `root`, deriving each label from the sample's
/// parent directory name. Files without the sample extension are skipped.
pub fn load_corpus(root: &Path) -> Result<TrainingCorpus> {
    let mut images = Vector::new();
    let mut labels = Vector::new();
    visit(root, &mut images, &mut labels)?;
    tracing::info!(samples = images.len(), "dataset loaded from {}", root.display());
    Ok(TrainingCorpus::from_parts(images, labels))
}

fn visit(dir: &Path, images: &mut Vector<Mat>, labels: &mut Vector<i32>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|source| Error::Filesystem {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut entries: Vec<_> = entries
        .collect::<std::io::Result<_>>()
        .map_err(|source| Error::Filesystem {
            path: dir.to_path_buf(),
            source,
        })?;
    // Platform directory order is arbitrary; sort so the corpus order is
    // reproducible across runs.
    entries.sort_by_key(|entry| entry.path());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            visit(&path, images, labels)?;
        } else if is_sample_file(&path) {
            let label = label_for(&path)?;
            let image =
                imgcodecs::imread(&path.to_string_lossy(), imgcodecs::IMREAD_GRAYSCALE)?;
            if image.empty() {
                return Err(Error::Decode { path });
            }
            images.push(image);
            labels.push(label);
        }
    }
    Ok(())
}

fn is_sample_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase() == SAMPLE_EXTENSION)
        .unwrap_or(false)
}

fn label_for(path: &Path) -> Result<i32> {
    let name = path
        .parent()
        .and_then(|dir| dir.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_label(&name)
}

/// Label encoded in a subject directory name: one non-numeric prefix
/// character followed by the label digits ("s26" -> 26).
pub fn parse_label(name: &str) -> Result<i32> {
    let mut chars = name.chars();
    match chars.next() {
        Some(prefix) if !prefix.is_ascii_digit() => {
            chars.as_str().parse().map_err(|_| Error::LabelParse {
                name: name.to_string(),
            })
        }
        _ => Err(Error::LabelParse {
            name: name.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_pgm(path: &Path, width: usize, height: usize, value: u8) {
        let mut bytes = format!("P5\n{width} {height}\n255\n").into_bytes();
        bytes.extend(std::iter::repeat(value).take(width * height));
        fs::write(path, bytes).unwrap();
    }

    #[test]
    fn parses_prefixed_labels() {
        assert_eq!(parse_label("s1").unwrap(), 1);
        assert_eq!(parse_label("s26").unwrap(), 26);
        assert_eq!(parse_label("x107").unwrap(), 107);
    }

    #[test]
    fn rejects_malformed_labels() {
        for name in ["", "s", "faces", "26", "sx1"] {
            assert!(
                matches!(parse_label(name), Err(Error::LabelParse { .. })),
                "{name:?} should not parse"
            );
        }
    }

    #[test]
    fn loads_images_and_labels_index_aligned() {
        let root = tempfile::tempdir().unwrap();
        for subject in 1..=3 {
            let dir = root.path().join(format!("s{subject}"));
            fs::create_dir(&dir).unwrap();
            for sample in 1..=2 {
                write_pgm(&dir.join(format!("{sample}.pgm")), 8, 8, subject as u8);
            }
        }
        // Stray non-sample files are skipped, not errors.
        fs::write(root.path().join("README"), b"not a sample").unwrap();

        let corpus = load_corpus(root.path()).unwrap();
        assert_eq!(corpus.len(), 6);
        assert_eq!(corpus.images().len(), corpus.labels().len());
        let labels: Vec<i32> = corpus.labels().iter().collect();
        assert_eq!(labels, vec![1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn empty_root_yields_empty_corpus() {
        let root = tempfile::tempdir().unwrap();
        let corpus = load_corpus(root.path()).unwrap();
        assert!(corpus.is_empty());
    }

    #[test]
    fn missing_root_is_a_filesystem_error() {
        let err = load_corpus(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, Error::Filesystem { .. }));
    }

    #[test]
    fn bad_subject_directory_is_a_label_parse_error() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("faces");
        fs::create_dir(&dir).unwrap();
        write_pgm(&dir.join("1.pgm"), 8, 8, 0);
        assert!(matches!(
            load_corpus(root.path()),
            Err(Error::LabelParse { .. })
        ));
    }
}
