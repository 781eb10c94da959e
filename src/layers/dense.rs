use std::io::{Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    activation::activation::ActivationFunction,
    error::{NetworkError, Result},
    math::matrix::Matrix,
};

/// Longest activation tag accepted when reading a model file.
const MAX_TAG_LEN: usize = 256;

/// A fully connected layer without biases.
///
/// `weights` has shape `[outputs x inputs]` and multiplies column vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    weights: Matrix,
    activator: ActivationFunction,
}

/// Result of [`Layer::forward`]; the backward pass for the same sample consumes it.
#[derive(Debug, Clone)]
pub struct LayerOutput {
    /// Pre-activation sum `W · x`.
    pub linear: Matrix,
    /// `activation(linear)`.
    pub activated: Matrix,
}

impl LayerOutput {
    pub fn values(&self) -> Vec<f64> {
        // `activated` is always a column vector.
        self.activated.row_iter().map(|row| row[0]).collect()
    }
}

/// Error signal and weight gradient produced by a backward pass.
#[derive(Debug, Clone)]
pub struct Backward {
    pub error: Matrix,
    pub weight_delta: Matrix,
}

impl Layer {
    /// Creates a layer with zeroed weights.
    pub fn new(inputs: usize, outputs: usize, activation: ActivationFunction) -> Result<Layer> {
        if inputs == 0 || outputs == 0 {
            return Err(NetworkError::Configuration(format!(
                "layer must have at least one input and one output, got {} -> {}",
                inputs, outputs
            )));
        }
        Ok(Layer {
            weights: Matrix::zeros(outputs, inputs)?,
            activator: activation,
        })
    }

    pub fn from_weights(weights: Matrix, activation: ActivationFunction) -> Layer {
        Layer {
            weights,
            activator: activation,
        }
    }

    /// Redraws every weight uniformly from `[-0.5, 0.5)`.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.weights.randomize(rng);
    }

    pub fn input_count(&self) -> usize {
        self.weights.cols()
    }

    pub fn output_count(&self) -> usize {
        self.weights.rows()
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activator
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn forward(&self, input: &[f64]) -> Result<LayerOutput> {
        if input.len() != self.input_count() {
            return Err(NetworkError::ShapeMismatch(format!(
                "layer expects {} inputs, got {}",
                self.input_count(),
                input.len()
            )));
        }
        let linear = self.weights.matrix_multiply(&Matrix::column(input)?)?;
        let activated = linear.map(|x| self.activator.function(x));
        Ok(LayerOutput { linear, activated })
    }

    /// Backward pass for the last layer: `error = targets - output`.
    pub fn backward_output(
        &self,
        pass: &LayerOutput,
        targets: &[f64],
        previous_outputs: &[f64],
    ) -> Result<Backward> {
        if targets.len() != self.output_count() {
            return Err(NetworkError::ShapeMismatch(format!(
                "layer produces {} outputs, got {} targets",
                self.output_count(),
                targets.len()
            )));
        }
        let error = Matrix::column(targets)?.subtract(&pass.activated)?;
        self.gradient(pass, error, previous_outputs)
    }

    /// Backward pass for a hidden layer: `error = next.weightsᵗ · next.error`.
    pub fn backward_hidden(
        &self,
        pass: &LayerOutput,
        next_layer: &Layer,
        next: &Backward,
        previous_outputs: &[f64],
    ) -> Result<Backward> {
        let error = next_layer
            .weights
            .transpose()
            .matrix_multiply(&next.error)?;
        self.gradient(pass, error, previous_outputs)
    }

    /// `weights += learning_rate * weight_delta`
    pub fn apply_update(&mut self, backward: &Backward, learning_rate: f64) -> Result<()> {
        self.weights
            .zip_map_in_place(&backward.weight_delta, |w, d| w + learning_rate * d)
    }

    fn gradient(
        &self,
        pass: &LayerOutput,
        error: Matrix,
        previous_outputs: &[f64],
    ) -> Result<Backward> {
        if previous_outputs.len() != self.input_count() {
            return Err(NetworkError::ShapeMismatch(format!(
                "layer expects {} previous outputs, got {}",
                self.input_count(),
                previous_outputs.len()
            )));
        }
        let derivative = pass.linear.map(|x| self.activator.derivative(x));
        // gamma = error ⊙ f'(linear)
        let gamma = error.elementwise_multiply(&derivative)?;
        let weight_delta = gamma.matrix_multiply(&Matrix::column(previous_outputs)?.transpose())?;
        Ok(Backward {
            error,
            weight_delta,
        })
    }

    /// Writes the activation tag followed by the weight matrix.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_tag(writer, self.activator.tag())?;
        self.weights.write_to(writer)
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Layer> {
        let tag = read_tag(reader)?;
        let activator = ActivationFunction::from_tag(&tag)?;
        let weights = Matrix::read_from(reader)?;
        Ok(Layer { weights, activator })
    }
}

/// Length-prefixed UTF-8 string; the length is a 7-bit variable-length integer.
fn write_tag<W: Write>(writer: &mut W, tag: &str) -> Result<()> {
    let mut len = tag.len();
    while len >= 0x80 {
        writer.write_u8((len as u8 & 0x7F) | 0x80)?;
        len >>= 7;
    }
    writer.write_u8(len as u8)?;
    writer.write_all(tag.as_bytes())?;
    Ok(())
}

fn read_tag<R: Read>(reader: &mut R) -> Result<String> {
    let mut len = 0usize;
    let mut shift = 0;
    loop {
        let byte = reader.read_u8()?;
        len |= ((byte & 0x7F) as usize) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
        if shift > 28 {
            return Err(NetworkError::Format("activation tag length is malformed".into()));
        }
    }
    if len > MAX_TAG_LEN {
        return Err(NetworkError::Format(format!(
            "activation tag of {} bytes exceeds the {} byte limit",
            len, MAX_TAG_LEN
        )));
    }

    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes)
        .map_err(|_| NetworkError::Format("activation tag is not valid UTF-8".into()))
}
