pub mod csv;
pub mod dataset;
pub mod idx;
pub mod sample;

pub use dataset::{Dataset, DatasetSource};
pub use sample::Sample;
