pub mod builder;
pub mod network;
pub mod topology;

pub use builder::NetworkBuilder;
pub use network::Network;
pub use topology::{LayerSpec, NetworkTopology};
