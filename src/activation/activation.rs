use serde::{Deserialize, Serialize};
use std::f64::consts::E;

use crate::error::{NetworkError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    ReLU,
}

/// Tag table used by the model format. The first entry for a variant is the
/// tag written on save; later entries are accepted on load only.
const REGISTRY: &[(&str, ActivationFunction)] = &[
    ("Sigmoid", ActivationFunction::Sigmoid),
    ("ReLU", ActivationFunction::ReLU),
    ("DigitClassifier.Activation_Functions.Sigmoid", ActivationFunction::Sigmoid),
    ("DigitClassifier.Activation_Functions.ReLU", ActivationFunction::ReLU),
];

impl ActivationFunction {
    pub fn function(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
        }
    }

    /// Derivative evaluated at the pre-activation value `x`, not at `function(x)`.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => {
                let fx = self.function(x);
                fx * (1.0 - fx)
            }
            ActivationFunction::ReLU => if x < 0.0 { 0.0 } else { 1.0 },
        }
    }

    /// Stable tag written to model files.
    pub fn tag(&self) -> &'static str {
        REGISTRY
            .iter()
            .find(|(_, f)| f == self)
            .map(|(tag, _)| *tag)
            .unwrap_or("unregistered")
    }

    pub fn from_tag(tag: &str) -> Result<ActivationFunction> {
        REGISTRY
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|(_, f)| *f)
            .ok_or_else(|| NetworkError::Format(format!("unknown activation tag '{}'", tag)))
    }
}
