pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod data;
pub mod train;
pub mod classifier;
pub mod preprocess;

// Convenience re-exports
pub use error::{NetworkError, Result};
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::{Backward, Layer, LayerOutput};
pub use network::builder::NetworkBuilder;
pub use network::network::Network;
pub use network::topology::{LayerSpec, NetworkTopology};
pub use loss::mse::MseLoss;
pub use data::dataset::{Dataset, DatasetSource};
pub use data::sample::Sample;
pub use train::{evaluate, run_training, train_epoch, TrainConfig, TrainingOptions};
pub use classifier::DigitClassifier;
