use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::sample::{Sample, DIGIT_CLASSES};
use crate::data::{csv, idx};
use crate::error::Result;

/// An in-memory list of samples loaded from one of the supported formats.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    samples: Vec<Sample>,
}

/// Where a dataset comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum DatasetSource {
    /// `label,pixel...` text file.
    MnistCsv { path: PathBuf },
    /// IDX3 image file plus IDX1 label file.
    Idx { images: PathBuf, labels: PathBuf },
}

impl Dataset {
    pub fn from_samples(samples: Vec<Sample>) -> Dataset {
        Dataset { samples }
    }

    /// Loads a digit dataset with `input_size` pixels per sample.
    pub fn load(source: &DatasetSource, input_size: usize) -> Result<Dataset> {
        match source {
            DatasetSource::MnistCsv { path } => Dataset::from_mnist_csv(path, input_size),
            DatasetSource::Idx { images, labels } => Dataset::from_idx(images, labels),
        }
    }

    pub fn from_mnist_csv<P: AsRef<Path>>(path: P, input_size: usize) -> Result<Dataset> {
        Ok(Dataset {
            samples: csv::load_mnist_csv(path, input_size, DIGIT_CLASSES)?,
        })
    }

    pub fn from_idx<P: AsRef<Path>, Q: AsRef<Path>>(images: P, labels: Q) -> Result<Dataset> {
        Ok(Dataset {
            samples: idx::load_idx_pair(images, labels, DIGIT_CLASSES)?,
        })
    }

    /// EMNIST digits training split stored under `dir` with its standard file names.
    pub fn emnist_digits<P: AsRef<Path>>(dir: P) -> Result<Dataset> {
        let dir = dir.as_ref();
        Dataset::from_idx(
            dir.join("emnist-digits-train-images-idx3-ubyte"),
            dir.join("emnist-digits-train-labels-idx1-ubyte"),
        )
    }

    /// MNIST digits training split stored under `dir`, named like the EMNIST files.
    pub fn mnist_digits<P: AsRef<Path>>(dir: P) -> Result<Dataset> {
        let dir = dir.as_ref();
        Dataset::from_idx(
            dir.join("mnist-digits-train-images-idx3-ubyte"),
            dir.join("mnist-digits-train-labels-idx1-ubyte"),
        )
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Uniform in-place permutation (Fisher-Yates).
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.samples.shuffle(rng);
    }
}
