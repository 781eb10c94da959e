pub mod dense;

pub use dense::{Backward, Layer, LayerOutput};
