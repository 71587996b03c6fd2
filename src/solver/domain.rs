//! Declarative symbolic variable catalog.
//!
//! Each variable is a named unbounded integer with a lower and an upper bound. A bound is either
//! a literal or another variable declared earlier in the same catalog, which is how the
//! non-decreasing index chain is expressed.

use alloy_primitives::U256;
use std::collections::BTreeMap;
use z3::ast::{Bool, Int};
use z3::Context;

use crate::error::DomainError;
use crate::symbolic::z3_ext::int_from_u256;
use crate::utils::constants::{
    MAX_AMOUNT_U256, MAX_DRAWN_INDEX_U256, ONE_U256, PERCENTAGE_FACTOR_U256, RAY_U256,
};

pub const LIQUIDITY_FEE: &str = "liquidityFee";
pub const DRAWN_INDEX_1: &str = "drawnIndex1";
pub const DRAWN_INDEX_2: &str = "drawnIndex2";
pub const DRAWN_INDEX_3: &str = "drawnIndex3";
pub const DRAWN_SHARES: &str = "drawnShares";
pub const PREMIUM_SHARES: &str = "premiumShares";
pub const REALIZED_PREMIUM_RAY: &str = "realizedPremiumRay";
pub const LIQUIDITY_SWEPT_DEFICIT: &str = "liquiditySweptDeficit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundRef {
    Literal(U256),
    Variable(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bound {
    pub value: BoundRef,
    pub inclusive: bool,
}

impl Bound {
    pub const fn at_least(value: U256) -> Self {
        Self {
            value: BoundRef::Literal(value),
            inclusive: true,
        }
    }

    pub const fn at_most(value: U256) -> Self {
        Self {
            value: BoundRef::Literal(value),
            inclusive: true,
        }
    }

    pub const fn below(value: U256) -> Self {
        Self {
            value: BoundRef::Literal(value),
            inclusive: false,
        }
    }

    pub const fn variable(name: &'static str) -> Self {
        Self {
            value: BoundRef::Variable(name),
            inclusive: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableSpec {
    pub name: &'static str,
    pub lower: Bound,
    pub upper: Bound,
}

pub const MONOTONICITY_DOMAIN: &[VariableSpec] = &[
    VariableSpec {
        name: LIQUIDITY_FEE,
        lower: Bound::at_least(U256::ZERO),
        upper: Bound::at_most(PERCENTAGE_FACTOR_U256),
    },
    VariableSpec {
        name: DRAWN_INDEX_1,
        lower: Bound::at_least(RAY_U256),
        upper: Bound::below(MAX_DRAWN_INDEX_U256),
    },
    VariableSpec {
        name: DRAWN_INDEX_2,
        lower: Bound::variable(DRAWN_INDEX_1),
        upper: Bound::below(MAX_DRAWN_INDEX_U256),
    },
    VariableSpec {
        name: DRAWN_INDEX_3,
        lower: Bound::variable(DRAWN_INDEX_2),
        upper: Bound::below(MAX_DRAWN_INDEX_U256),
    },
    VariableSpec {
        name: DRAWN_SHARES,
        lower: Bound::at_least(ONE_U256),
        upper: Bound::at_most(MAX_AMOUNT_U256),
    },
    VariableSpec {
        name: PREMIUM_SHARES,
        lower: Bound::at_least(U256::ZERO),
        upper: Bound::at_most(MAX_AMOUNT_U256),
    },
    VariableSpec {
        name: REALIZED_PREMIUM_RAY,
        lower: Bound::at_least(U256::ZERO),
        upper: Bound::at_most(MAX_AMOUNT_U256),
    },
    VariableSpec {
        name: LIQUIDITY_SWEPT_DEFICIT,
        lower: Bound::at_least(U256::ZERO),
        upper: Bound::at_most(MAX_AMOUNT_U256),
    },
];

/// Declared variables and the constraints that bound them.
pub struct SymbolicDomain<'ctx> {
    ctx: &'ctx Context,
    order: Vec<&'static str>,
    variables: BTreeMap<&'static str, Int<'ctx>>,
    constraints: Vec<Bool<'ctx>>,
}

impl<'ctx> SymbolicDomain<'ctx> {
    pub fn declare(ctx: &'ctx Context, specs: &[VariableSpec]) -> Result<Self, DomainError> {
        let mut domain = Self {
            ctx,
            order: Vec::with_capacity(specs.len()),
            variables: BTreeMap::new(),
            constraints: Vec::with_capacity(specs.len() * 2),
        };

        for spec in specs {
            if domain.variables.contains_key(spec.name) {
                return Err(DomainError::DuplicateVariable(spec.name.to_string()));
            }
            let lower = domain.resolve(spec.name, &spec.lower)?;
            let upper = domain.resolve(spec.name, &spec.upper)?;

            let var = Int::new_const(ctx, spec.name);
            domain.constraints.push(if spec.lower.inclusive {
                lower.le(&var)
            } else {
                lower.lt(&var)
            });
            domain.constraints.push(if spec.upper.inclusive {
                var.le(&upper)
            } else {
                var.lt(&upper)
            });
            domain.order.push(spec.name);
            domain.variables.insert(spec.name, var);
        }

        tracing::debug!(
            "[DOMAIN] Declared {} variables with {} bound constraints",
            domain.order.len(),
            domain.constraints.len()
        );
        Ok(domain)
    }

    fn resolve(&self, variable: &str, bound: &Bound) -> Result<Int<'ctx>, DomainError> {
        match bound.value {
            BoundRef::Literal(value) => Ok(int_from_u256(self.ctx, value)),
            BoundRef::Variable(reference) => {
                self.variables
                    .get(reference)
                    .cloned()
                    .ok_or_else(|| DomainError::ForwardReference {
                        variable: variable.to_string(),
                        reference: reference.to_string(),
                    })
            }
        }
    }

    pub fn ctx(&self) -> &'ctx Context {
        self.ctx
    }

    pub fn var(&self, name: &str) -> Result<&Int<'ctx>, DomainError> {
        self.variables
            .get(name)
            .ok_or_else(|| DomainError::UnknownVariable(name.to_string()))
    }

    /// Variables in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = (&'static str, &Int<'ctx>)> + '_ {
        self.order
            .iter()
            .filter_map(move |name| self.variables.get(name).map(|var| (*name, var)))
    }

    pub fn constraints(&self) -> &[Bool<'ctx>] {
        &self.constraints
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use z3::{Config, SatResult, Solver};

    #[test]
    fn test_monotonicity_domain_declares_every_variable() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let domain = SymbolicDomain::declare(&ctx, MONOTONICITY_DOMAIN).expect("valid catalog");

        assert_eq!(domain.len(), 8);
        assert_eq!(domain.constraints().len(), 16);
        let names = domain.variables().map(|(name, _)| name).collect::<Vec<_>>();
        assert_eq!(names.first(), Some(&LIQUIDITY_FEE));
        assert_eq!(names.last(), Some(&LIQUIDITY_SWEPT_DEFICIT));
        assert!(domain.var(DRAWN_INDEX_3).is_ok());
    }

    #[test]
    fn test_index_chain_bounds_forbid_decrease() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let solver = Solver::new(&ctx);
        let domain = SymbolicDomain::declare(&ctx, MONOTONICITY_DOMAIN).expect("valid catalog");
        for constraint in domain.constraints() {
            solver.assert(constraint);
        }

        let i1 = domain.var(DRAWN_INDEX_1).expect("declared");
        let i3 = domain.var(DRAWN_INDEX_3).expect("declared");
        solver.assert(&i3.lt(i1));
        assert_eq!(solver.check(), SatResult::Unsat);
    }

    #[test]
    fn test_declare_rejects_forward_reference_and_duplicates() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);

        let forward = [VariableSpec {
            name: "a",
            lower: Bound::variable("b"),
            upper: Bound::at_most(ONE_U256),
        }];
        assert_eq!(
            SymbolicDomain::declare(&ctx, &forward).err(),
            Some(DomainError::ForwardReference {
                variable: "a".to_string(),
                reference: "b".to_string(),
            })
        );

        let spec = VariableSpec {
            name: "a",
            lower: Bound::at_least(U256::ZERO),
            upper: Bound::at_most(ONE_U256),
        };
        assert_eq!(
            SymbolicDomain::declare(&ctx, &[spec, spec]).err(),
            Some(DomainError::DuplicateVariable("a".to_string()))
        );
    }

    #[test]
    fn test_inclusive_and_exclusive_upper_bounds() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let point = |upper: Bound| {
            let spec = [VariableSpec {
                name: "x",
                lower: Bound::at_least(ONE_U256),
                upper,
            }];
            let domain = SymbolicDomain::declare(&ctx, &spec).expect("valid spec");
            let solver = Solver::new(&ctx);
            for constraint in domain.constraints() {
                solver.assert(constraint);
            }
            solver.check()
        };

        assert!(Bound::at_most(ONE_U256).inclusive);
        assert_eq!(point(Bound::at_most(ONE_U256)), SatResult::Sat);
        assert_eq!(point(Bound::below(ONE_U256)), SatResult::Unsat);
    }

    #[test]
    fn test_unknown_variable_lookup_is_an_error() {
        let cfg = Config::new();
        let ctx = Context::new(&cfg);
        let domain = SymbolicDomain::declare(&ctx, MONOTONICITY_DOMAIN).expect("valid catalog");
        assert_eq!(
            domain.var("drawnIndex4").err(),
            Some(DomainError::UnknownVariable("drawnIndex4".to_string()))
        );
    }
}
