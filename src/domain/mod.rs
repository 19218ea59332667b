//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - scenario and estimator identifiers (`Scenario`, `ModelId`)
//! - run configuration (`SimConfig`, `Schedule`, `ScenarioSet`)

pub mod types;

pub use types::*;
