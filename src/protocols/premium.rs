//! Premium debt model.
//!
//! Premium shares accrue against the drawn index like drawn shares, but the debt is tracked
//! incrementally: `premium_offset_ray` records `premium_shares * index` at the last reset and
//! `realized_premium_ray` carries the debt recognised before that reset.

use serde::{Deserialize, Serialize};
use z3::ast::Int;
use z3::Context;

use crate::symbolic::utils::math::{div_up, ray};

/// How the growth of premium debt between two indices is rounded to asset units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PremiumRounding {
    /// Round both absolute debts up, then subtract.
    Independent,
    /// Round the raw ray-scaled difference up. Can overstate growth by one unit.
    OnDifference,
}

impl PremiumRounding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Independent => "independent",
            Self::OnDifference => "on_difference",
        }
    }
}

/// realized_premium_ray + premium_shares * index - premium_offset_ray
pub fn premium_debt_ray<'ctx>(
    ctx: &'ctx Context,
    realized_premium_ray: &Int<'ctx>,
    premium_shares: &Int<'ctx>,
    index: &Int<'ctx>,
    premium_offset_ray: &Int<'ctx>,
) -> Int<'ctx> {
    let accrued = Int::mul(ctx, &[premium_shares, index]);
    Int::sub(
        ctx,
        &[
            &Int::add(ctx, &[realized_premium_ray, &accrued]),
            premium_offset_ray,
        ],
    )
}

/// Premium debt in asset units, rounded up.
pub fn premium_debt<'ctx>(
    ctx: &'ctx Context,
    realized_premium_ray: &Int<'ctx>,
    premium_shares: &Int<'ctx>,
    index: &Int<'ctx>,
    premium_offset_ray: &Int<'ctx>,
) -> Int<'ctx> {
    let debt_ray = premium_debt_ray(
        ctx,
        realized_premium_ray,
        premium_shares,
        index,
        premium_offset_ray,
    );
    div_up(ctx, &debt_ray, &ray(ctx))
}

/// Growth of premium debt from `previous_index` to `index` under the given rounding policy.
pub fn premium_growth<'ctx>(
    ctx: &'ctx Context,
    rounding: PremiumRounding,
    realized_premium_ray: &Int<'ctx>,
    premium_shares: &Int<'ctx>,
    previous_index: &Int<'ctx>,
    index: &Int<'ctx>,
    premium_offset_ray: &Int<'ctx>,
) -> Int<'ctx> {
    match rounding {
        PremiumRounding::Independent => {
            let after = premium_debt(
                ctx,
                realized_premium_ray,
                premium_shares,
                index,
                premium_offset_ray,
            );
            let before = premium_debt(
                ctx,
                realized_premium_ray,
                premium_shares,
                previous_index,
                premium_offset_ray,
            );
            Int::sub(ctx, &[&after, &before])
        }
        PremiumRounding::OnDifference => {
            let after = premium_debt_ray(
                ctx,
                realized_premium_ray,
                premium_shares,
                index,
                premium_offset_ray,
            );
            let before = premium_debt_ray(
                ctx,
                realized_premium_ray,
                premium_shares,
                previous_index,
                premium_offset_ray,
            );
            div_up(ctx, &Int::sub(ctx, &[&after, &before]), &ray(ctx))
        }
    }
}
