//! Monte-Carlo simulation: the replicate driver and its estimate matrices.

pub mod driver;
pub mod matrix;

pub use driver::*;
pub use matrix::*;
