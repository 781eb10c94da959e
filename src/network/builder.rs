use log::info;
use rand::Rng;

use crate::{
    activation::activation::ActivationFunction,
    error::{NetworkError, Result},
    layers::dense::Layer,
    network::network::Network,
};

/// Fluent construction of a [`Network`] from declared layer sizes.
///
/// The input layer only fixes the input width; every later declaration
/// becomes one weight layer connecting it to the declaration before it.
///
/// ```no_run
/// use digit_nn::{ActivationFunction, NetworkBuilder};
///
/// let network = NetworkBuilder::new()
///     .learning_rate(0.035)
///     .input_layer(784)
///     .hidden_layer(150, ActivationFunction::Sigmoid)
///     .output_layer(10, ActivationFunction::Sigmoid)
///     .build()
///     .unwrap();
/// assert_eq!(network.output_size(), 10);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NetworkBuilder {
    learning_rate: Option<f64>,
    input: Option<usize>,
    hidden: Vec<(usize, ActivationFunction)>,
    output: Option<(usize, ActivationFunction)>,
}

impl NetworkBuilder {
    pub fn new() -> NetworkBuilder {
        NetworkBuilder::default()
    }

    pub fn learning_rate(mut self, learning_rate: f64) -> NetworkBuilder {
        self.learning_rate = Some(learning_rate);
        self
    }

    pub fn input_layer(mut self, nodes: usize) -> NetworkBuilder {
        self.input = Some(nodes);
        self
    }

    /// Appends a hidden layer; hidden layers keep the order they were added in.
    pub fn hidden_layer(mut self, nodes: usize, activation: ActivationFunction) -> NetworkBuilder {
        self.hidden.push((nodes, activation));
        self
    }

    pub fn output_layer(mut self, nodes: usize, activation: ActivationFunction) -> NetworkBuilder {
        self.output = Some((nodes, activation));
        self
    }

    /// Builds the network with weights drawn from the thread-local RNG.
    pub fn build(self) -> Result<Network> {
        self.build_with_rng(&mut rand::thread_rng())
    }

    /// Builds the network with weights drawn from `rng`.
    pub fn build_with_rng<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Network> {
        let learning_rate = self
            .learning_rate
            .ok_or_else(|| missing("learning rate"))?;
        let input = self.input.ok_or_else(|| missing("input layer"))?;
        let output = self.output.ok_or_else(|| missing("output layer"))?;

        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(NetworkError::Configuration(format!(
                "learning rate must be a positive finite number, got {}",
                learning_rate
            )));
        }

        let mut declared = Vec::with_capacity(self.hidden.len() + 1);
        declared.extend(self.hidden.iter().copied());
        declared.push(output);

        let mut layers = Vec::with_capacity(declared.len());
        let mut inputs = input;
        for (nodes, activation) in declared {
            let mut layer = Layer::new(inputs, nodes, activation)?;
            layer.randomize(rng);
            layers.push(layer);
            inputs = nodes;
        }

        let network = Network::from_layers(layers, learning_rate)?;
        info!(
            "built network {} with learning rate {}",
            describe(&network),
            learning_rate
        );
        Ok(network)
    }
}

fn missing(field: &str) -> NetworkError {
    NetworkError::Configuration(format!("{} was never set", field))
}

/// `784 -> 150 (Sigmoid) -> 10 (Sigmoid)` style summary.
pub fn describe(network: &Network) -> String {
    let mut out = network.input_size().to_string();
    for layer in network.layers() {
        out.push_str(&format!(
            " -> {} ({})",
            layer.output_count(),
            layer.activation().tag()
        ));
    }
    out
}
