// Tests for a single weight layer: forward pass, both backward passes and the update.

use approx::assert_relative_eq;
use digit_nn::{ActivationFunction, Layer, Matrix, NetworkError};

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn layer(rows: Vec<Vec<f64>>, activation: ActivationFunction) -> Layer {
    Layer::from_weights(Matrix::from_data(rows).unwrap(), activation)
}

#[test]
fn activations_match_their_formulas() {
    let s = ActivationFunction::Sigmoid;
    assert_relative_eq!(s.function(0.0), 0.5);
    assert_relative_eq!(s.derivative(0.0), 0.25);
    assert_relative_eq!(s.function(2.0), sigmoid(2.0), epsilon = 1e-12);

    let r = ActivationFunction::ReLU;
    assert_eq!(r.function(-1.0), 0.0);
    assert_eq!(r.function(3.0), 3.0);
    assert_eq!(r.derivative(-1e-9), 0.0);
    assert_eq!(r.derivative(0.0), 1.0);
    assert_eq!(r.derivative(2.0), 1.0);
}

#[test]
fn forward_caches_the_linear_sum() {
    let l = layer(vec![vec![0.5, -0.5], vec![1.0, 1.0]], ActivationFunction::ReLU);
    let pass = l.forward(&[1.0, 2.0]).unwrap();

    assert_eq!(pass.linear.to_column_vec().unwrap(), vec![-0.5, 3.0]);
    assert_eq!(pass.values(), vec![0.0, 3.0]);
}

#[test]
fn forward_rejects_wrong_input_length() {
    let l = layer(vec![vec![0.5, -0.5]], ActivationFunction::ReLU);
    assert!(matches!(l.forward(&[1.0]), Err(NetworkError::ShapeMismatch(_))));
}

#[test]
fn output_backward_and_update() {
    let mut l = layer(vec![vec![0.5, -0.5]], ActivationFunction::ReLU);
    let input = [1.0, 0.2];
    let pass = l.forward(&input).unwrap();
    assert_relative_eq!(pass.values()[0], 0.4, epsilon = 1e-12);

    let back = l.backward_output(&pass, &[1.0], &input).unwrap();
    assert_relative_eq!(back.error.get(0, 0).unwrap(), 0.6, epsilon = 1e-12);
    assert_relative_eq!(back.weight_delta.get(0, 0).unwrap(), 0.6, epsilon = 1e-12);
    assert_relative_eq!(back.weight_delta.get(0, 1).unwrap(), 0.12, epsilon = 1e-12);

    l.apply_update(&back, 0.5).unwrap();
    assert_relative_eq!(l.weights().get(0, 0).unwrap(), 0.8, epsilon = 1e-12);
    assert_relative_eq!(l.weights().get(0, 1).unwrap(), -0.44, epsilon = 1e-12);
}

#[test]
fn derivative_uses_pre_activation_value() {
    let l = layer(vec![vec![2.0]], ActivationFunction::Sigmoid);
    let pass = l.forward(&[1.0]).unwrap();
    let back = l.backward_output(&pass, &[1.0], &[1.0]).unwrap();

    let out = sigmoid(2.0);
    let expected = (1.0 - out) * out * (1.0 - out);
    assert_relative_eq!(back.weight_delta.get(0, 0).unwrap(), expected, epsilon = 1e-12);

    let applied_twice = sigmoid(out) * (1.0 - sigmoid(out));
    assert!((back.weight_delta.get(0, 0).unwrap() - (1.0 - out) * applied_twice).abs() > 1e-6);
}

#[test]
fn hidden_backward_propagates_next_error() {
    let hidden = layer(vec![vec![1.0], vec![-1.0]], ActivationFunction::ReLU);
    let output = layer(vec![vec![0.5, 0.25]], ActivationFunction::Sigmoid);

    let input = [2.0];
    let h_pass = hidden.forward(&input).unwrap();
    let h_values = h_pass.values();
    assert_eq!(h_values, vec![2.0, 0.0]);

    let o_pass = output.forward(&h_values).unwrap();
    let o_back = output.backward_output(&o_pass, &[0.9], &h_values).unwrap();
    let e = o_back.error.get(0, 0).unwrap();

    let h_back = hidden.backward_hidden(&h_pass, &output, &o_back, &input).unwrap();
    assert_relative_eq!(h_back.error.get(0, 0).unwrap(), 0.5 * e, epsilon = 1e-12);
    assert_relative_eq!(h_back.error.get(1, 0).unwrap(), 0.25 * e, epsilon = 1e-12);

    // ReLU'(2) = 1, ReLU'(-2) = 0
    assert_relative_eq!(h_back.weight_delta.get(0, 0).unwrap(), 0.5 * e * 2.0, epsilon = 1e-12);
    assert_eq!(h_back.weight_delta.get(1, 0).unwrap(), 0.0);
}

#[test]
fn output_backward_rejects_wrong_target_length() {
    let l = layer(vec![vec![0.5, -0.5]], ActivationFunction::Sigmoid);
    let pass = l.forward(&[1.0, 1.0]).unwrap();
    let err = l.backward_output(&pass, &[1.0, 0.0], &[1.0, 1.0]);
    assert!(matches!(err, Err(NetworkError::ShapeMismatch(_))));
}

#[test]
fn zero_sized_layer_is_a_configuration_error() {
    let err = Layer::new(0, 3, ActivationFunction::ReLU).unwrap_err();
    assert!(matches!(err, NetworkError::Configuration(_)));
}
