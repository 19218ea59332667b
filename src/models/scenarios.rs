//! Reference structural models for the two scenarios.
//!
//! Both encode the classic two-wave weight study: `sex` (±1) affects weight at
//! baseline (`wt0`) and at follow-up (`wt1`); the route through the dining
//! `hall` and its `diet` is a deterministic chain. Scenario B adds `height`,
//! which is caused by sex and in turn affects both weight measurements.

use crate::domain::Scenario;
use crate::error::SamplingError;
use crate::models::structural::{GCompSpec, Roles, StructuralModel};

pub const ROLES: Roles = Roles {
    exposure: "sex",
    baseline: "wt0",
    follow_up: "wt1",
    change: "change",
};

/// Weight is reported in kg, height in cm.
const WT_SCALE: f64 = 10.0;
const WT_OFFSET: f64 = 70.0;
const HEIGHT_SCALE: f64 = 8.0;
const HEIGHT_OFFSET: f64 = 170.0;

pub fn structural_model(scenario: Scenario) -> Result<StructuralModel, SamplingError> {
    match scenario {
        Scenario::NoConfounding => StructuralModel::builder(scenario, ROLES)
            .coin("sex")
            .linear("wt0", &[("sex", 0.5)])
            .report(WT_SCALE, WT_OFFSET)
            .pass_through("hall", &[("sex", 1.0)])
            .pass_through("diet", &[("hall", 1.0)])
            .linear("wt1", &[("sex", 0.1), ("wt0", 0.6), ("diet", 0.2)])
            .report(WT_SCALE, WT_OFFSET)
            .build(),
        Scenario::MediatorConfounding => StructuralModel::builder(scenario, ROLES)
            .coin("sex")
            .linear("height", &[("sex", 0.6)])
            .report(HEIGHT_SCALE, HEIGHT_OFFSET)
            .linear("wt0", &[("sex", 0.3), ("height", 0.4)])
            .report(WT_SCALE, WT_OFFSET)
            .pass_through("hall", &[("sex", 1.0)])
            .pass_through("diet", &[("hall", 1.0)])
            .linear(
                "wt1",
                &[("sex", 0.1), ("wt0", 0.5), ("diet", 0.2), ("height", 0.2)],
            )
            .report(WT_SCALE, WT_OFFSET)
            .gcomp(GCompSpec {
                confounders: vec!["height"],
                mediator_value: WT_OFFSET,
            })
            .build(),
    }
}
