//! Input/output helpers.
//!
//! - dataset and results CSV exports (`export`)
//! - run summary JSON (`summary`)

pub mod export;
pub mod summary;

pub use export::*;
pub use summary::*;
