use serde::{Deserialize, Serialize};

/// Snapshot emitted by the training loop every `report_every` samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingProgress {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Samples trained so far in this epoch.
    pub processed: usize,
    /// Samples in the epoch.
    pub total: usize,
    /// Mean squared error over the samples since the previous report,
    /// measured on the outputs before each update.
    pub recent_loss: f64,
    /// Wall-clock time since the epoch started, in milliseconds.
    pub elapsed_ms: u64,
}

impl TrainingProgress {
    /// Fraction of the epoch completed, in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.processed as f64 / self.total as f64
        }
    }

    /// `|█████     | 50.00%` style bar of `width` cells.
    pub fn bar(&self, width: usize) -> String {
        let fraction = self.fraction();
        let bar: String = (0..width)
            .map(|i| if (i as f64 / width as f64) < fraction { '█' } else { ' ' })
            .collect();
        format!("|{}| {:.2}%", bar, fraction * 100.0)
    }
}

/// Totals for one completed epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochSummary {
    pub epoch: usize,
    pub samples: usize,
    /// Mean squared error over the epoch, measured before each update.
    pub mean_loss: f64,
    pub elapsed_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_fills_proportionally() {
        let p = TrainingProgress {
            epoch: 1,
            processed: 5,
            total: 10,
            recent_loss: 0.0,
            elapsed_ms: 0,
        };
        assert_eq!(p.bar(4), "|██  | 50.00%");
    }
}
