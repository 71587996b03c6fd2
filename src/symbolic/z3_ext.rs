use alloy_primitives::U256;
use z3::ast::{Ast, Int};
use z3::Context;

use crate::error::Z3Error;
use crate::utils::config::SolverSettings;

/// Lift a ground integer term back to `U256`.
/// Returns `None` for negative values, non-numerals, and values wider than 256 bits.
pub fn u256_from_int(value: &Int) -> Option<U256> {
    let simplified = value.simplify();

    if let Some(small) = simplified.as_u64() {
        return Some(U256::from(small));
    }

    // Z3 prints integer numerals in decimal; negatives come out as `(- n)` and fail the parse.
    let rendered = simplified.to_string();
    U256::from_str_radix(rendered.trim(), 10).ok()
}

/// Like [`u256_from_int`], for terms that must be ground. `label` names the term in the error.
pub fn require_u256(label: &str, value: &Int) -> Result<U256, Z3Error> {
    u256_from_int(value).ok_or_else(|| Z3Error::NonNumeral(label.to_string()))
}

/// Lower a `U256` into an unbounded Z3 integer.
/// Built from 64-bit limbs by Horner's rule so no string parsing is involved and the
/// mapping is total.
pub fn int_from_u256<'ctx>(ctx: &'ctx Context, value: U256) -> Int<'ctx> {
    let half_limb = Int::from_u64(ctx, 1u64 << 32);
    let limb_base = Int::mul(ctx, &[&half_limb, &half_limb]);

    let mut acc = Int::from_u64(ctx, 0);
    for limb in value.as_limbs().iter().rev() {
        let shifted = Int::mul(ctx, &[&acc, &limb_base]);
        acc = Int::add(ctx, &[&shifted, &Int::from_u64(ctx, *limb)]);
    }
    acc.simplify()
}

pub fn configure_solver(ctx: &Context, solver: &z3::Solver, settings: &SolverSettings) {
    let mut params = z3::Params::new(ctx);
    params.set_u32("timeout", settings.timeout_ms);
    if let Some(rlimit) = settings.rlimit {
        params.set_u32("rlimit", rlimit);
    }
    params.set_u32("random_seed", settings.random_seed);
    solver.set_params(&params);
}
