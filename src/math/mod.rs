//! Numerical utilities: least squares and empirical percentiles.

pub mod ols;
pub mod quantile;

pub use ols::*;
pub use quantile::*;
