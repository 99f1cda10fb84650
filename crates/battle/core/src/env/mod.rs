//! Environment services consumed by execution.

mod rng;

pub use rng::{PcgRng, RngOracle, compute_seed};
