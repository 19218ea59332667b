//! Structural causal models and their noise calibration.
//!
//! - `structural`: the variable arena, equations and topological order
//! - `scenarios`: the two reference models (A and B)
//! - `calibration`: residual noise scales that keep every variable standardized

pub mod calibration;
pub mod scenarios;
pub mod structural;

pub use calibration::*;
pub use scenarios::*;
pub use structural::*;
