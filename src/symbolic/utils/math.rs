//! Canonical location for shared fixed-point helpers over unbounded integers.
//! Rule: every rounding direction is explicit in the function name.
//!
//! All helpers assume non-negative operands and a positive divisor. Z3 integer `div` is
//! Euclidean, which coincides with floor division under that precondition.

use z3::ast::Int;
use z3::Context;

use crate::symbolic::z3_ext::int_from_u256;
use crate::utils::constants::{PERCENTAGE_FACTOR_U256, RAY_U256};

/// Constant: RAY (10^27)
pub fn ray<'ctx>(ctx: &'ctx Context) -> Int<'ctx> {
    int_from_u256(ctx, RAY_U256)
}

/// Constant: PERCENTAGE_FACTOR (10^4)
pub fn percentage_factor<'ctx>(ctx: &'ctx Context) -> Int<'ctx> {
    int_from_u256(ctx, PERCENTAGE_FACTOR_U256)
}

/// Constant: arbitrary u64
pub fn int_val<'ctx>(ctx: &'ctx Context, v: u64) -> Int<'ctx> {
    Int::from_u64(ctx, v)
}

/// floor(a * b / RAY)
pub fn ray_mul_down<'ctx>(ctx: &'ctx Context, a: &Int<'ctx>, b: &Int<'ctx>) -> Int<'ctx> {
    Int::mul(ctx, &[a, b]).div(&ray(ctx))
}

/// ceil(a * b / RAY), computed as (a * b + RAY - 1) / RAY.
pub fn ray_mul_up<'ctx>(ctx: &'ctx Context, a: &Int<'ctx>, b: &Int<'ctx>) -> Int<'ctx> {
    let ray = ray(ctx);
    let product = Int::mul(ctx, &[a, b]);
    let biased = Int::sub(ctx, &[&Int::add(ctx, &[&product, &ray]), &int_val(ctx, 1)]);
    biased.div(&ray)
}

/// floor(a * b / PERCENTAGE_FACTOR)
pub fn percent_mul_down<'ctx>(ctx: &'ctx Context, a: &Int<'ctx>, b: &Int<'ctx>) -> Int<'ctx> {
    Int::mul(ctx, &[a, b]).div(&percentage_factor(ctx))
}

/// ceil(a / b), computed as (a + b - 1) / b. Requires b > 0.
pub fn div_up<'ctx>(ctx: &'ctx Context, a: &Int<'ctx>, b: &Int<'ctx>) -> Int<'ctx> {
    let biased = Int::sub(ctx, &[&Int::add(ctx, &[a, b]), &int_val(ctx, 1)]);
    biased.div(b)
}
