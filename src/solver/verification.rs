//! Single-shot property verification over a scoped solver.
//!
//! Domain constraints live at the base level of the solver. Each property is checked inside a
//! `ConstraintFrame`, which pushes on creation and pops on drop, so a property's negated claim
//! is gone before the next check starts regardless of how the check returns.

use serde::Serialize;
use std::fmt;
use z3::ast::{Bool, Int};
use z3::{Context, SatResult, Solver};

use crate::error::Result;
use crate::solver::domain::{SymbolicDomain, VariableSpec};
use crate::solver::invariants::PropertyCheck;
use crate::symbolic::z3_ext::{configure_solver, u256_from_int};
use crate::utils::config::SolverSettings;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Counterexample {
    /// Declared variables, in declaration order.
    pub assignments: Vec<Assignment>,
    /// Derived terms of the property evaluated under the same model.
    pub observables: Vec<Assignment>,
}

impl Counterexample {
    pub fn value_of(&self, name: &str) -> Option<&str> {
        self.assignments
            .iter()
            .chain(self.observables.iter())
            .find(|entry| entry.name == name)
            .map(|entry| entry.value.as_str())
    }
}

/// Outcome of checking one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Verdict {
    /// The negated claim is unsatisfiable under the domain.
    Proved,
    /// The negated claim is satisfiable; the model is a witness.
    Refuted(Counterexample),
    /// The solver gave up (timeout, resource limit, incomplete theory).
    Indeterminate { reason: String },
}

impl Verdict {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Proved => "holds",
            Self::Refuted(_) => "counterexample found",
            Self::Indeterminate { .. } => "unknown",
        }
    }

    pub fn is_conclusive(&self) -> bool {
        !matches!(self, Self::Indeterminate { .. })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Indeterminate { reason } => write!(f, "unknown: {reason}"),
            other => f.write_str(other.label()),
        }
    }
}

/// Satisfiability of the bare domain, checked before any property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DomainSanity {
    Satisfiable,
    Unsatisfiable,
    Unknown { reason: String },
}

/// RAII scope for solver assertions.
pub struct ConstraintFrame<'a, 'ctx> {
    solver: &'a Solver<'ctx>,
}

impl<'a, 'ctx> ConstraintFrame<'a, 'ctx> {
    fn enter(solver: &'a Solver<'ctx>) -> Self {
        solver.push();
        Self { solver }
    }

    pub fn assert(&self, constraint: &Bool<'ctx>) {
        self.solver.assert(constraint);
    }
}

impl Drop for ConstraintFrame<'_, '_> {
    fn drop(&mut self) {
        self.solver.pop(1);
    }
}

pub struct VerificationContext<'ctx> {
    ctx: &'ctx Context,
    solver: Solver<'ctx>,
    domain: SymbolicDomain<'ctx>,
}

impl<'ctx> VerificationContext<'ctx> {
    pub fn new(
        ctx: &'ctx Context,
        specs: &[VariableSpec],
        settings: &SolverSettings,
    ) -> Result<Self> {
        let domain = SymbolicDomain::declare(ctx, specs)?;
        let solver = Solver::new(ctx);
        configure_solver(ctx, &solver, settings);
        for constraint in domain.constraints() {
            solver.assert(constraint);
        }
        Ok(Self {
            ctx,
            solver,
            domain,
        })
    }

    pub fn ctx(&self) -> &'ctx Context {
        self.ctx
    }

    pub fn domain(&self) -> &SymbolicDomain<'ctx> {
        &self.domain
    }

    pub fn frame(&self) -> ConstraintFrame<'_, 'ctx> {
        ConstraintFrame::enter(&self.solver)
    }

    /// Number of assertions currently on the solver, across all open frames.
    pub fn assertion_count(&self) -> usize {
        self.solver.get_assertions().len()
    }

    pub fn check_domain_satisfiable(&self) -> DomainSanity {
        match self.solver.check() {
            SatResult::Sat => DomainSanity::Satisfiable,
            SatResult::Unsat => DomainSanity::Unsatisfiable,
            SatResult::Unknown => DomainSanity::Unknown {
                reason: self.reason_unknown(),
            },
        }
    }

    pub fn check_property(&self, check: &PropertyCheck<'ctx>) -> Verdict {
        let frame = self.frame();
        frame.assert(&check.violation);

        match self.solver.check() {
            SatResult::Unsat => Verdict::Proved,
            SatResult::Unknown => Verdict::Indeterminate {
                reason: self.reason_unknown(),
            },
            SatResult::Sat => match self.counterexample(&check.observables) {
                Some(counterexample) => Verdict::Refuted(counterexample),
                None => Verdict::Indeterminate {
                    reason: "solver reported sat without producing a model".to_string(),
                },
            },
        }
    }

    fn reason_unknown(&self) -> String {
        self.solver
            .get_reason_unknown()
            .unwrap_or_else(|| "no reason given".to_string())
    }

    fn counterexample(&self, observables: &[(String, Int<'ctx>)]) -> Option<Counterexample> {
        let model = self.solver.get_model()?;
        let render = |term: &Int<'ctx>| -> String {
            match model.eval(term, true) {
                Some(value) => u256_from_int(&value)
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| value.to_string()),
                None => "?".to_string(),
            }
        };

        let assignments = self
            .domain
            .variables()
            .map(|(name, var)| Assignment {
                name: name.to_string(),
                value: render(var),
            })
            .collect();
        let observables = observables
            .iter()
            .map(|(name, term)| Assignment {
                name: name.clone(),
                value: render(term),
            })
            .collect();
        Some(Counterexample {
            assignments,
            observables,
        })
    }
}
