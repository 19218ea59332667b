//! `lords-paradox` library crate.
//!
//! Monte-Carlo study of Lord's paradox: two structural causal models of sex,
//! baseline weight and follow-up weight, a battery of five estimators of the
//! "effect of sex", and percentile summaries of their sampling distributions.
//!
//! The binary (`lords`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - modules are reusable (notebooks, other front-ends)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod sim;
