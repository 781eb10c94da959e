use std::path::Path;

use crate::data::sample::argmax;
use crate::error::Result;
use crate::network::network::Network;

/// Predicts a class from a normalized pixel vector using a trained network.
///
/// Resizing and brightness conversion happen before this point; see
/// [`crate::preprocess`]. Mapping the class onto domain meaning (for example
/// rejecting `0` as a sudoku digit) is up to the caller.
#[derive(Debug, Clone)]
pub struct DigitClassifier {
    network: Network,
}

impl DigitClassifier {
    pub fn from_network(network: Network) -> DigitClassifier {
        DigitClassifier { network }
    }

    /// Loads a network saved with [`Network::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DigitClassifier> {
        Ok(DigitClassifier {
            network: Network::load(path)?,
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Pixel count the classifier expects.
    pub fn input_size(&self) -> usize {
        self.network.input_size()
    }

    /// Raw network outputs, one per class.
    pub fn scores(&self, pixels: &[f64]) -> Result<Vec<f64>> {
        self.network.query(pixels)
    }

    /// Index of the highest output; the first one wins a tie.
    pub fn classify(&self, pixels: &[f64]) -> Result<usize> {
        Ok(argmax(&self.scores(pixels)?))
    }
}
