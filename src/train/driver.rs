use std::path::PathBuf;

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{
    data::dataset::{Dataset, DatasetSource},
    error::{NetworkError, Result},
    network::{builder::describe, network::Network, topology::NetworkTopology},
    train::progress::EpochSummary,
    train::train_config::TrainConfig,
    train::trainer::train_epoch,
};

/// Everything needed for a training run from scratch.
#[derive(Debug, Clone)]
pub struct TrainingOptions {
    pub topology: NetworkTopology,
    pub dataset: DatasetSource,
    /// Where the trained network is saved.
    pub model_path: PathBuf,
    /// Full passes over the dataset; the data is reshuffled before each one.
    pub epochs: usize,
    /// Seed for weight initialization and shuffling; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl TrainingOptions {
    pub fn new(topology: NetworkTopology, dataset: DatasetSource, model_path: PathBuf) -> Self {
        TrainingOptions {
            topology,
            dataset,
            model_path,
            epochs: 1,
            seed: None,
        }
    }
}

/// Builds a network, trains it on the dataset and saves it to `model_path`.
///
/// Blocks until every epoch has finished; there is no cancellation.
pub fn run_training(
    options: &TrainingOptions,
    config: &TrainConfig,
) -> Result<(Network, Vec<EpochSummary>)> {
    if options.epochs == 0 {
        return Err(NetworkError::Configuration("epochs must be at least 1".into()));
    }

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut network = options.topology.builder().build_with_rng(&mut rng)?;

    info!("loading dataset {:?}", options.dataset);
    let mut dataset = Dataset::load(&options.dataset, network.input_size())?;
    if dataset.is_empty() {
        return Err(NetworkError::Format("dataset contains no samples".into()));
    }

    let mut summaries = Vec::with_capacity(options.epochs);
    for epoch in 1..=options.epochs {
        dataset.shuffle(&mut rng);
        info!(
            "epoch {}/{}: training {} on {} samples",
            epoch,
            options.epochs,
            describe(&network),
            dataset.len()
        );
        let summary = train_epoch(&mut network, dataset.samples(), epoch, config)?;
        info!(
            "epoch {} done in {} ms, mean loss {:.6}",
            epoch, summary.elapsed_ms, summary.mean_loss
        );
        summaries.push(summary);
    }

    network.save(&options.model_path)?;
    Ok((network, summaries))
}
