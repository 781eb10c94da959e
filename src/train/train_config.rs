use std::sync::mpsc;

use crate::train::progress::TrainingProgress;

/// Runtime settings for [`train_epoch`](crate::train::trainer::train_epoch).
///
/// # Fields
/// - `report_every` — a progress report is logged and sent after this many
///                    samples, and once more when the epoch ends; `0`
///                    is treated as `1`
/// - `progress_tx`  — optional channel sender that receives every report;
///                    a dropped receiver is ignored, training carries on
pub struct TrainConfig {
    pub report_every: usize,
    pub progress_tx: Option<mpsc::Sender<TrainingProgress>>,
}

impl TrainConfig {
    /// Creates a `TrainConfig` without a progress channel.
    pub fn new(report_every: usize) -> Self {
        TrainConfig {
            report_every: report_every.max(1),
            progress_tx: None,
        }
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<TrainingProgress>) -> Self {
        self.progress_tx = Some(tx);
        self
    }
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig::new(1000)
    }
}
