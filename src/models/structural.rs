//! Structural causal models.
//!
//! A model is an arena of `Variable`s. Parents are stored as indices into the
//! arena, so evaluating an equation is a plain loop over `(parent, coefficient)`
//! pairs with no callbacks.
//!
//! Every variable lives on a standardized scale (mean 0, variance 1). The
//! noise scale that keeps a variable standardized is *not* stored here; it is
//! derived from the coefficients by `models::calibrate`.

use crate::domain::Scenario;
use crate::error::SamplingError;

/// Index of a variable in its model's arena.
pub type VarId = usize;

/// How a variable is generated from its parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Exogenous fair coin mapped to {-1, +1}.
    Coin,
    /// Weighted sum of parents plus scaled standard-normal noise.
    Linear,
    /// Weighted sum of parents with no noise. Calibration requires the
    /// parents to explain all of the variance.
    PassThrough,
}

impl Rule {
    pub fn is_stochastic(self) -> bool {
        matches!(self, Rule::Linear)
    }
}

/// Affine map from the standardized scale to reporting units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub scale: f64,
    pub offset: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        scale: 1.0,
        offset: 0.0,
    };

    pub fn new(scale: f64, offset: f64) -> Self {
        Self { scale, offset }
    }

    #[inline]
    pub fn apply(self, value: f64) -> f64 {
        value * self.scale + self.offset
    }
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: &'static str,
    pub rule: Rule,
    pub parents: Vec<VarId>,
    /// One coefficient per parent, same order.
    pub coefficients: Vec<f64>,
    pub report: Affine,
}

/// A standardized path weight on the edge `from -> to`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathCoefficient {
    pub from: &'static str,
    pub to: &'static str,
    pub value: f64,
}

/// The structural equation of one variable, borrowed from its model.
#[derive(Debug, Clone, Copy)]
pub struct Equation<'a> {
    pub rule: Rule,
    pub coefficients: &'a [f64],
}

impl Equation<'_> {
    /// Evaluate the equation.
    ///
    /// `parent_values` must be in the same order as the variable's parents.
    /// For `Rule::Coin`, `noise` is the coin outcome already mapped to ±1.
    pub fn evaluate(&self, parent_values: &[f64], noise_scale: f64, noise: f64) -> f64 {
        match self.rule {
            Rule::Coin => noise,
            Rule::Linear => weighted_sum(self.coefficients, parent_values) + noise_scale * noise,
            Rule::PassThrough => weighted_sum(self.coefficients, parent_values),
        }
    }
}

fn weighted_sum(coefficients: &[f64], values: &[f64]) -> f64 {
    coefficients.iter().zip(values).map(|(c, v)| c * v).sum()
}

/// Which variables play the exposure / baseline / follow-up roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roles {
    pub exposure: &'static str,
    pub baseline: &'static str,
    pub follow_up: &'static str,
    /// Name of the derived `follow_up - baseline` column.
    pub change: &'static str,
}

/// Configuration of the g-computation estimator for a scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct GCompSpec {
    /// Post-exposure confounders of baseline -> follow-up, in the order they
    /// are modelled.
    pub confounders: Vec<&'static str>,
    /// Level (reporting units) at which the baseline is held in the outcome
    /// model under both exposure levels.
    pub mediator_value: f64,
}

#[derive(Debug, Clone)]
pub struct StructuralModel {
    scenario: Scenario,
    variables: Vec<Variable>,
    order: Vec<VarId>,
    roles: Roles,
    gcomp: Option<GCompSpec>,
}

impl StructuralModel {
    pub fn builder(scenario: Scenario, roles: Roles) -> StructuralModelBuilder {
        StructuralModelBuilder {
            scenario,
            roles,
            decls: Vec::new(),
            gcomp: None,
            orphan_report: false,
        }
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn roles(&self) -> &Roles {
        &self.roles
    }

    pub fn gcomp(&self) -> Option<&GCompSpec> {
        self.gcomp.as_ref()
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Result<VarId, SamplingError> {
        self.variables
            .iter()
            .position(|v| v.name == name)
            .ok_or_else(|| SamplingError::UnknownVariable(name.to_string()))
    }

    /// Parent names of `name`, in equation order.
    pub fn parents(&self, name: &str) -> Result<Vec<&'static str>, SamplingError> {
        let id = self.index_of(name)?;
        Ok(self.variables[id]
            .parents
            .iter()
            .map(|&p| self.variables[p].name)
            .collect())
    }

    pub fn equation(&self, name: &str) -> Result<Equation<'_>, SamplingError> {
        let id = self.index_of(name)?;
        Ok(self.equation_at(id))
    }

    pub fn equation_at(&self, id: VarId) -> Equation<'_> {
        let v = &self.variables[id];
        Equation {
            rule: v.rule,
            coefficients: &v.coefficients,
        }
    }

    /// Topologically sorted variable ids (parents always precede children).
    pub fn generation_order(&self) -> &[VarId] {
        &self.order
    }

    pub fn generation_order_names(&self) -> Vec<&'static str> {
        self.order.iter().map(|&i| self.variables[i].name).collect()
    }

    pub fn path_coefficients(&self) -> Vec<PathCoefficient> {
        let mut out = Vec::new();
        for &id in &self.order {
            let v = &self.variables[id];
            for (&p, &c) in v.parents.iter().zip(&v.coefficients) {
                out.push(PathCoefficient {
                    from: self.variables[p].name,
                    to: v.name,
                    value: c,
                });
            }
        }
        out
    }

    /// Copy of the model with the coefficient on `from -> to` replaced.
    pub fn with_coefficient(&self, from: &str, to: &str, value: f64) -> Result<Self, SamplingError> {
        let to_id = self.index_of(to)?;
        let from_id = self.index_of(from)?;
        let mut out = self.clone();
        let var = &mut out.variables[to_id];
        let slot = var
            .parents
            .iter()
            .position(|&p| p == from_id)
            .ok_or_else(|| SamplingError::UnknownParent {
                variable: to.to_string(),
                parent: from.to_string(),
            })?;
        var.coefficients[slot] = value;
        Ok(out)
    }
}

#[derive(Debug, Clone)]
struct VarDecl {
    name: &'static str,
    rule: Rule,
    parents: Vec<(&'static str, f64)>,
    report: Affine,
}

/// Declarative builder; all validation happens in `build`.
#[derive(Debug, Clone)]
pub struct StructuralModelBuilder {
    scenario: Scenario,
    roles: Roles,
    decls: Vec<VarDecl>,
    gcomp: Option<GCompSpec>,
    orphan_report: bool,
}

impl StructuralModelBuilder {
    pub fn coin(self, name: &'static str) -> Self {
        self.push(name, Rule::Coin, &[])
    }

    pub fn linear(self, name: &'static str, parents: &[(&'static str, f64)]) -> Self {
        self.push(name, Rule::Linear, parents)
    }

    pub fn pass_through(self, name: &'static str, parents: &[(&'static str, f64)]) -> Self {
        self.push(name, Rule::PassThrough, parents)
    }

    /// Set the reporting transform of the most recently declared variable.
    /// Calling it before any declaration makes `build` fail.
    pub fn report(mut self, scale: f64, offset: f64) -> Self {
        match self.decls.last_mut() {
            Some(last) => last.report = Affine::new(scale, offset),
            None => self.orphan_report = true,
        }
        self
    }

    pub fn gcomp(mut self, spec: GCompSpec) -> Self {
        self.gcomp = Some(spec);
        self
    }

    fn push(mut self, name: &'static str, rule: Rule, parents: &[(&'static str, f64)]) -> Self {
        self.decls.push(VarDecl {
            name,
            rule,
            parents: parents.to_vec(),
            report: Affine::IDENTITY,
        });
        self
    }

    pub fn build(self) -> Result<StructuralModel, SamplingError> {
        if self.orphan_report {
            return Err(SamplingError::ReportWithoutVariable);
        }
        let mut variables: Vec<Variable> = Vec::with_capacity(self.decls.len());
        for decl in &self.decls {
            if variables.iter().any(|v| v.name == decl.name) {
                return Err(SamplingError::DuplicateVariable(decl.name.to_string()));
            }
            variables.push(Variable {
                name: decl.name,
                rule: decl.rule,
                parents: Vec::with_capacity(decl.parents.len()),
                coefficients: decl.parents.iter().map(|&(_, c)| c).collect(),
                report: decl.report,
            });
        }

        for (id, decl) in self.decls.iter().enumerate() {
            for &(parent, _) in &decl.parents {
                let pid = self
                    .decls
                    .iter()
                    .position(|d| d.name == parent)
                    .ok_or_else(|| SamplingError::UnknownParent {
                        variable: decl.name.to_string(),
                        parent: parent.to_string(),
                    })?;
                variables[id].parents.push(pid);
            }
            if decl.rule != Rule::Coin && decl.parents.is_empty() {
                return Err(SamplingError::CoefficientMismatch {
                    variable: decl.name.to_string(),
                    parents: 0,
                    coefficients: 0,
                });
            }
        }

        let order = topological_order(&variables)?;

        let model = StructuralModel {
            scenario: self.scenario,
            variables,
            order,
            roles: self.roles,
            gcomp: self.gcomp,
        };

        for name in [model.roles.exposure, model.roles.baseline, model.roles.follow_up] {
            model.index_of(name)?;
        }
        if let Some(spec) = &model.gcomp {
            for name in &spec.confounders {
                model.index_of(name)?;
            }
        }

        Ok(model)
    }
}

/// Kahn's algorithm; ties broken by declaration order so the result is stable.
fn topological_order(variables: &[Variable]) -> Result<Vec<VarId>, SamplingError> {
    let n = variables.len();
    let mut indegree: Vec<usize> = variables.iter().map(|v| v.parents.len()).collect();
    let mut placed = vec![false; n];
    let mut order = Vec::with_capacity(n);

    while order.len() < n {
        let Some(next) = (0..n).find(|&i| !placed[i] && indegree[i] == 0) else {
            let remaining = (0..n)
                .filter(|&i| !placed[i])
                .map(|i| variables[i].name.to_string())
                .collect();
            return Err(SamplingError::Cycle { remaining });
        };
        placed[next] = true;
        order.push(next);
        for (child, v) in variables.iter().enumerate() {
            let edges = v.parents.iter().filter(|&&p| p == next).count();
            indegree[child] -= edges;
        }
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles() -> Roles {
        Roles {
            exposure: "x",
            baseline: "y0",
            follow_up: "y1",
            change: "dy",
        }
    }

    #[test]
    fn order_respects_parents_even_when_declared_out_of_order() {
        let model = StructuralModel::builder(Scenario::NoConfounding, roles())
            .linear("y1", &[("x", 0.2), ("y0", 0.5)])
            .linear("y0", &[("x", 0.3)])
            .coin("x")
            .build()
            .unwrap();

        assert_eq!(model.generation_order_names(), vec!["x", "y0", "y1"]);
        assert_eq!(model.parents("y1").unwrap(), vec!["x", "y0"]);
    }

    #[test]
    fn cycle_is_rejected_at_construction() {
        let err = StructuralModel::builder(Scenario::NoConfounding, roles())
            .coin("x")
            .linear("y0", &[("y1", 0.3)])
            .linear("y1", &[("y0", 0.3)])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SamplingError::Cycle {
                remaining: vec!["y0".to_string(), "y1".to_string()]
            }
        );
    }

    #[test]
    fn unknown_parent_and_duplicates_are_rejected() {
        let err = StructuralModel::builder(Scenario::NoConfounding, roles())
            .coin("x")
            .linear("y0", &[("z", 0.3)])
            .build()
            .unwrap_err();
        assert!(matches!(err, SamplingError::UnknownParent { .. }));

        let err = StructuralModel::builder(Scenario::NoConfounding, roles())
            .coin("x")
            .coin("x")
            .build()
            .unwrap_err();
        assert_eq!(err, SamplingError::DuplicateVariable("x".to_string()));
    }

    #[test]
    fn report_before_any_variable_is_rejected() {
        let err = StructuralModel::builder(Scenario::NoConfounding, roles())
            .report(10.0, 70.0)
            .coin("x")
            .linear("y0", &[("x", 0.3)])
            .linear("y1", &[("y0", 0.3)])
            .build()
            .unwrap_err();
        assert_eq!(err, SamplingError::ReportWithoutVariable);
    }

    #[test]
    fn equation_evaluates_weighted_parents_plus_noise() {
        let model = StructuralModel::builder(Scenario::NoConfounding, roles())
            .coin("x")
            .linear("y0", &[("x", 0.5)])
            .linear("y1", &[("x", 0.1), ("y0", 0.6)])
            .build()
            .unwrap();

        let eq = model.equation("y1").unwrap();
        let v = eq.evaluate(&[1.0, 2.0], 0.5, -1.0);
        assert!((v - (0.1 + 1.2 - 0.5)).abs() < 1e-12, "got {v}");

        let model = model.with_coefficient("x", "y1", 0.3).unwrap();
        let v = model.equation("y1").unwrap().evaluate(&[1.0, 0.0], 0.0, 0.0);
        assert!((v - 0.3).abs() < 1e-12);
    }
}
