//! Simulated data: the `Dataset` table and the sampler that fills it.

pub mod dataset;
pub mod sample;

pub use dataset::*;
pub use sample::*;
