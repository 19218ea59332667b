//! Effect estimation.
//!
//! Responsibilities:
//!
//! - fit the named estimator battery to one dataset (`battery`)
//! - g-computation with the baseline held fixed and post-exposure confounders modelled (`gcomp`)

pub mod battery;
pub mod gcomp;

pub use battery::*;
pub use gcomp::*;
