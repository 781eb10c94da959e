use std::time::Instant;

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    data::sample::{argmax, Sample},
    error::Result,
    loss::mse::MseLoss,
    network::network::Network,
    train::progress::{EpochSummary, TrainingProgress},
    train::train_config::TrainConfig,
};

/// Runs one sequential pass over `samples`, one weight update per sample.
///
/// Samples are visited in the order given; shuffle beforehand for SGD.
/// The first failing sample aborts the epoch.
pub fn train_epoch(
    network: &mut Network,
    samples: &[Sample],
    epoch: usize,
    config: &TrainConfig,
) -> Result<EpochSummary> {
    let total = samples.len();
    let t_start = Instant::now();
    let mut total_loss = 0.0;
    let mut window_loss = 0.0;
    let mut window_len = 0usize;
    let report_every = config.report_every.max(1);

    for (i, sample) in samples.iter().enumerate() {
        let output = network.train(&sample.inputs, &sample.targets)?;
        let loss = MseLoss::loss(&output, &sample.targets);
        total_loss += loss;
        window_loss += loss;
        window_len += 1;

        let processed = i + 1;
        if processed % report_every == 0 || processed == total {
            let progress = TrainingProgress {
                epoch,
                processed,
                total,
                recent_loss: window_loss / window_len as f64,
                elapsed_ms: t_start.elapsed().as_millis() as u64,
            };
            info!(
                "epoch {} {} loss {:.6}",
                epoch,
                progress.bar(40),
                progress.recent_loss
            );
            if let Some(ref tx) = config.progress_tx {
                // A dropped receiver only means nobody is listening.
                let _ = tx.send(progress);
            }
            window_loss = 0.0;
            window_len = 0;
        }
    }

    Ok(EpochSummary {
        epoch,
        samples: total,
        mean_loss: if total == 0 { 0.0 } else { total_loss / total as f64 },
        elapsed_ms: t_start.elapsed().as_millis() as u64,
    })
}

/// Accuracy and loss of a network over a labelled set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub samples: usize,
    pub correct: usize,
    pub mean_loss: f64,
}

impl Evaluation {
    /// Fraction of samples classified correctly, in `[0, 1]`.
    pub fn accuracy(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.correct as f64 / self.samples as f64
        }
    }
}

/// Queries every sample and compares the argmax of the output with the label.
pub fn evaluate(network: &Network, samples: &[Sample]) -> Result<Evaluation> {
    let mut correct = 0;
    let mut total_loss = 0.0;
    for sample in samples {
        let output = network.query(&sample.inputs)?;
        total_loss += MseLoss::loss(&output, &sample.targets);
        if argmax(&output) == sample.label() {
            correct += 1;
        }
    }
    Ok(Evaluation {
        samples: samples.len(),
        correct,
        mean_loss: if samples.is_empty() { 0.0 } else { total_loss / samples.len() as f64 },
    })
}
