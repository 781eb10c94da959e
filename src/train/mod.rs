pub mod driver;
pub mod progress;
pub mod train_config;
pub mod trainer;

pub use driver::{run_training, TrainingOptions};
pub use progress::{EpochSummary, TrainingProgress};
pub use train_config::TrainConfig;
pub use trainer::{evaluate, train_epoch, Evaluation};
