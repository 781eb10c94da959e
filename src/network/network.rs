use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    error::{NetworkError, Result},
    layers::dense::{Backward, Layer},
};

/// Feed-forward network: an ordered chain of layers plus the learning rate
/// used by [`Network::train`].
///
/// Layer `i` always outputs as many values as layer `i + 1` takes in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNetwork")]
pub struct Network {
    learning_rate: f64,
    layers: Vec<Layer>,
}

/// Unvalidated serde form of a [`Network`].
#[derive(Deserialize)]
struct RawNetwork {
    learning_rate: f64,
    layers: Vec<Layer>,
}

impl TryFrom<RawNetwork> for Network {
    type Error = NetworkError;

    fn try_from(raw: RawNetwork) -> Result<Network> {
        validate_chain(&raw.layers).map_err(NetworkError::Format)?;
        Ok(Network {
            learning_rate: raw.learning_rate,
            layers: raw.layers,
        })
    }
}

impl Network {
    /// Wraps already-built layers, checking that their shapes chain.
    pub fn from_layers(layers: Vec<Layer>, learning_rate: f64) -> Result<Network> {
        validate_chain(&layers).map_err(NetworkError::Configuration)?;
        Ok(Network {
            learning_rate,
            layers,
        })
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn input_size(&self) -> usize {
        self.layers[0].input_count()
    }

    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].output_count()
    }

    /// One stochastic gradient descent step on a single sample.
    ///
    /// Returns the network output computed before the weights were updated.
    pub fn train(&mut self, inputs: &[f64], targets: &[f64]) -> Result<Vec<f64>> {
        // layer_inputs[i] feeds layer i; the final entry is the network output.
        let mut layer_inputs: Vec<Vec<f64>> = Vec::with_capacity(self.layers.len() + 1);
        let mut passes = Vec::with_capacity(self.layers.len());
        layer_inputs.push(inputs.to_vec());

        for (i, layer) in self.layers.iter().enumerate() {
            let pass = layer.forward(&layer_inputs[i])?;
            layer_inputs.push(pass.values());
            passes.push(pass);
        }

        let last = self.layers.len() - 1;
        let mut backwards: Vec<Backward> = Vec::with_capacity(self.layers.len());
        for i in (0..self.layers.len()).rev() {
            let backward = if i == last {
                self.layers[i].backward_output(&passes[i], targets, &layer_inputs[i])?
            } else {
                // backwards is filled right-to-left, so its last entry belongs to layer i + 1.
                let next = &backwards[backwards.len() - 1];
                self.layers[i].backward_hidden(&passes[i], &self.layers[i + 1], next, &layer_inputs[i])?
            };
            backwards.push(backward);
        }

        let learning_rate = self.learning_rate;
        for (layer, backward) in self.layers.iter_mut().zip(backwards.iter().rev()) {
            layer.apply_update(backward, learning_rate)?;
        }

        Ok(layer_inputs.pop().unwrap_or_default())
    }

    /// Forward pass only. Safe to call from several threads at once.
    pub fn query(&self, inputs: &[f64]) -> Result<Vec<f64>> {
        let mut current = inputs.to_vec();
        for layer in &self.layers {
            current = layer.forward(&current)?.values();
        }
        Ok(current)
    }

    /// Writes `learning_rate` (f64), layer count (i32), then every layer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_f64::<LittleEndian>(self.learning_rate)?;
        let count = i32::try_from(self.layers.len()).map_err(|_| {
            NetworkError::Format(format!("{} layers do not fit the model format", self.layers.len()))
        })?;
        writer.write_i32::<LittleEndian>(count)?;
        for layer in &self.layers {
            layer.write_to(writer)?;
        }
        Ok(())
    }

    /// Reads a network written by [`Network::write_to`].
    ///
    /// Fails if fewer layers are present than the header declares.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Network> {
        let learning_rate = reader.read_f64::<LittleEndian>()?;
        let declared = reader.read_i32::<LittleEndian>()?;
        if declared < 1 {
            return Err(NetworkError::Format(format!(
                "model declares {} layers, expected at least 1",
                declared
            )));
        }

        let declared = declared as usize;
        let mut layers = Vec::with_capacity(declared.min(64));
        for i in 0..declared {
            match Layer::read_from(reader) {
                Ok(layer) => {
                    debug!(
                        "layer {}: {} -> {} ({})",
                        i,
                        layer.input_count(),
                        layer.output_count(),
                        layer.activation().tag()
                    );
                    layers.push(layer);
                }
                Err(NetworkError::Io(e)) if e.kind() == ErrorKind::UnexpectedEof => {
                    return Err(NetworkError::Format(format!(
                        "model is truncated: declares {} layers but layer {} is incomplete",
                        declared, i
                    )));
                }
                Err(e) => return Err(e),
            }
        }

        validate_chain(&layers).map_err(NetworkError::Format)?;
        Ok(Network {
            learning_rate,
            layers,
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        info!("saved network ({} layers) to {}", self.layers.len(), path.display());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Network> {
        let path = path.as_ref();
        let mut reader = BufReader::new(File::open(path)?);
        let network = Network::read_from(&mut reader)?;
        info!(
            "loaded network from {}: {} layers, learning rate {}",
            path.display(),
            network.layers.len(),
            network.learning_rate
        );
        Ok(network)
    }

    /// Serializes the network to a pretty-printed JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a network from a JSON file previously written by `save_json`.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Network> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

fn validate_chain(layers: &[Layer]) -> std::result::Result<(), String> {
    if layers.is_empty() {
        return Err("network needs at least one layer".into());
    }
    for (i, pair) in layers.windows(2).enumerate() {
        if pair[0].output_count() != pair[1].input_count() {
            return Err(format!(
                "layer {} outputs {} values but layer {} takes {}",
                i,
                pair[0].output_count(),
                i + 1,
                pair[1].input_count()
            ));
        }
    }
    Ok(())
}
