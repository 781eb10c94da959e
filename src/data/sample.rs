use crate::error::{NetworkError, Result};

/// Number of digit classes in MNIST-style datasets.
pub const DIGIT_CLASSES: usize = 10;

/// Target value for the true class.
pub const TARGET_ON: f64 = 0.99;
/// Target value for every other class.
pub const TARGET_OFF: f64 = 0.01;

/// One training example.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub inputs: Vec<f64>,
    pub targets: Vec<f64>,
}

impl Sample {
    /// Builds a sample whose targets are the soft one-hot encoding of `label`.
    pub fn from_label(inputs: Vec<f64>, label: usize, classes: usize) -> Result<Sample> {
        if label >= classes {
            return Err(NetworkError::Format(format!(
                "label {} is out of range for {} classes",
                label, classes
            )));
        }
        let mut targets = vec![TARGET_OFF; classes];
        targets[label] = TARGET_ON;
        Ok(Sample { inputs, targets })
    }

    /// Index of the largest target value.
    pub fn label(&self) -> usize {
        argmax(&self.targets)
    }
}

/// Maps a raw 0-255 intensity into `[0.01, 1.0]`.
///
/// Zero inputs are avoided so they still carry signal through weight updates.
pub fn normalize_pixel(value: f64) -> f64 {
    value / 255.0 * 0.99 + 0.01
}

/// Index of the first maximum in `values`; `0` for an empty slice.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
