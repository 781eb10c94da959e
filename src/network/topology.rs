use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::activation::activation::ActivationFunction;
use crate::error::Result;
use crate::network::builder::NetworkBuilder;

/// One declared layer: neuron count and the activation applied to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub size: usize,
    pub activation: ActivationFunction,
}

/// Serializable network architecture plus learning rate.
///
/// Stored as JSON so that an architecture can be kept next to the models
/// trained from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkTopology {
    pub learning_rate: f64,
    pub input_size: usize,
    #[serde(default)]
    pub hidden: Vec<LayerSpec>,
    pub output: LayerSpec,
}

impl Default for NetworkTopology {
    /// The 784 -> 150 -> 100 -> 10 sigmoid digit recognizer.
    fn default() -> Self {
        NetworkTopology {
            learning_rate: 0.035,
            input_size: 28 * 28,
            hidden: vec![
                LayerSpec { size: 150, activation: ActivationFunction::Sigmoid },
                LayerSpec { size: 100, activation: ActivationFunction::Sigmoid },
            ],
            output: LayerSpec { size: 10, activation: ActivationFunction::Sigmoid },
        }
    }
}

impl NetworkTopology {
    pub fn builder(&self) -> NetworkBuilder {
        let builder = NetworkBuilder::new()
            .learning_rate(self.learning_rate)
            .input_layer(self.input_size);
        self.hidden
            .iter()
            .fold(builder, |b, layer| b.hidden_layer(layer.size, layer.activation))
            .output_layer(self.output.size, self.output.activation)
    }

    /// Serializes the topology to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `NetworkTopology` from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<NetworkTopology> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
