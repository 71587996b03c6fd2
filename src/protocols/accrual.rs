//! Liquidity accrual and fee model.
//!
//! `total_added_assets = swept_deficit + drawn_debt + premium_debt - cumulative_fee`
//!
//! An accrual step consumes an `AccrualState` and yields a new one; previews evaluate the same
//! formulas against an existing state without producing a successor.

use z3::ast::Int;
use z3::Context;

use crate::protocols::premium::{premium_debt, premium_debt_ray, premium_growth, PremiumRounding};
use crate::symbolic::utils::math::{int_val, percent_mul_down, ray, ray_mul_up};

/// Fee owed on liquidity growth between two indices, independent rounding.
#[allow(clippy::too_many_arguments)]
pub fn unrealized_fee_amount<'ctx>(
    ctx: &'ctx Context,
    drawn_shares: &Int<'ctx>,
    previous_index: &Int<'ctx>,
    index: &Int<'ctx>,
    realized_premium_ray: &Int<'ctx>,
    premium_shares: &Int<'ctx>,
    premium_offset_ray: &Int<'ctx>,
    liquidity_fee: &Int<'ctx>,
) -> Int<'ctx> {
    unrealized_fee_amount_with(
        ctx,
        PremiumRounding::Independent,
        drawn_shares,
        previous_index,
        index,
        realized_premium_ray,
        premium_shares,
        premium_offset_ray,
        liquidity_fee,
    )
}

/// Total liquidity growth (drawn + premium) between two indices.
#[allow(clippy::too_many_arguments)]
pub fn liquidity_growth<'ctx>(
    ctx: &'ctx Context,
    rounding: PremiumRounding,
    drawn_shares: &Int<'ctx>,
    previous_index: &Int<'ctx>,
    index: &Int<'ctx>,
    realized_premium_ray: &Int<'ctx>,
    premium_shares: &Int<'ctx>,
    premium_offset_ray: &Int<'ctx>,
) -> Int<'ctx> {
    let drawn_growth = Int::sub(
        ctx,
        &[
            &ray_mul_up(ctx, drawn_shares, index),
            &ray_mul_up(ctx, drawn_shares, previous_index),
        ],
    );
    let premium_growth = premium_growth(
        ctx,
        rounding,
        realized_premium_ray,
        premium_shares,
        previous_index,
        index,
        premium_offset_ray,
    );
    Int::add(ctx, &[&drawn_growth, &premium_growth])
}

#[allow(clippy::too_many_arguments)]
pub fn unrealized_fee_amount_with<'ctx>(
    ctx: &'ctx Context,
    rounding: PremiumRounding,
    drawn_shares: &Int<'ctx>,
    previous_index: &Int<'ctx>,
    index: &Int<'ctx>,
    realized_premium_ray: &Int<'ctx>,
    premium_shares: &Int<'ctx>,
    premium_offset_ray: &Int<'ctx>,
    liquidity_fee: &Int<'ctx>,
) -> Int<'ctx> {
    let growth = liquidity_growth(
        ctx,
        rounding,
        drawn_shares,
        previous_index,
        index,
        realized_premium_ray,
        premium_shares,
        premium_offset_ray,
    );
    percent_mul_down(ctx, &growth, liquidity_fee)
}

/// Quantities held constant along one accrual chain.
#[derive(Debug, Clone)]
pub struct AccrualParams<'ctx> {
    pub drawn_shares: Int<'ctx>,
    pub premium_shares: Int<'ctx>,
    pub liquidity_fee: Int<'ctx>,
    pub liquidity_swept_deficit: Int<'ctx>,
    pub rounding: PremiumRounding,
}

/// Accrual bookkeeping as of the last accrue.
#[derive(Debug, Clone)]
pub struct AccrualState<'ctx> {
    pub index: Int<'ctx>,
    pub realized_premium_ray: Int<'ctx>,
    pub premium_offset_ray: Int<'ctx>,
    pub cumulative_fee: Int<'ctx>,
}

/// Observable result of an accrue or preview at some index.
#[derive(Debug, Clone)]
pub struct AccrualSnapshot<'ctx> {
    pub index: Int<'ctx>,
    pub fee: Int<'ctx>,
    pub total_added_assets: Int<'ctx>,
}

impl<'ctx> AccrualState<'ctx> {
    /// State before the first accrue: index at RAY, premium offset fully covering the premium
    /// shares, no fee taken yet.
    pub fn genesis(
        ctx: &'ctx Context,
        params: &AccrualParams<'ctx>,
        realized_premium_ray: Int<'ctx>,
    ) -> Self {
        let index = ray(ctx);
        let premium_offset_ray = Int::mul(ctx, &[&params.premium_shares, &index]);
        Self {
            index,
            realized_premium_ray,
            premium_offset_ray,
            cumulative_fee: int_val(ctx, 0),
        }
    }

    fn snapshot_at(
        &self,
        ctx: &'ctx Context,
        params: &AccrualParams<'ctx>,
        index: &Int<'ctx>,
    ) -> AccrualSnapshot<'ctx> {
        let unrealized = unrealized_fee_amount_with(
            ctx,
            params.rounding,
            &params.drawn_shares,
            &self.index,
            index,
            &self.realized_premium_ray,
            &params.premium_shares,
            &self.premium_offset_ray,
            &params.liquidity_fee,
        );
        let fee = Int::add(ctx, &[&self.cumulative_fee, &unrealized]);
        let total_added_assets = total_added_assets(
            ctx,
            params,
            index,
            &self.realized_premium_ray,
            &self.premium_offset_ray,
            &fee,
        );
        AccrualSnapshot {
            index: index.clone(),
            fee,
            total_added_assets,
        }
    }

    /// Accrue to `index`: realise premium growth, reset the offset, and book the fee.
    pub fn accrue(
        &self,
        ctx: &'ctx Context,
        params: &AccrualParams<'ctx>,
        index: &Int<'ctx>,
    ) -> (AccrualSnapshot<'ctx>, AccrualState<'ctx>) {
        let snapshot = self.snapshot_at(ctx, params, index);
        let next = AccrualState {
            index: index.clone(),
            realized_premium_ray: premium_debt_ray(
                ctx,
                &self.realized_premium_ray,
                &params.premium_shares,
                index,
                &self.premium_offset_ray,
            ),
            premium_offset_ray: Int::mul(ctx, &[&params.premium_shares, index]),
            cumulative_fee: snapshot.fee.clone(),
        };
        (snapshot, next)
    }

    /// Evaluate what an accrue to `index` would report, leaving this state as is.
    pub fn preview(
        &self,
        ctx: &'ctx Context,
        params: &AccrualParams<'ctx>,
        index: &Int<'ctx>,
    ) -> AccrualSnapshot<'ctx> {
        self.snapshot_at(ctx, params, index)
    }
}

pub fn total_added_assets<'ctx>(
    ctx: &'ctx Context,
    params: &AccrualParams<'ctx>,
    index: &Int<'ctx>,
    realized_premium_ray: &Int<'ctx>,
    premium_offset_ray: &Int<'ctx>,
    fee: &Int<'ctx>,
) -> Int<'ctx> {
    let drawn = ray_mul_up(ctx, &params.drawn_shares, index);
    let premium = premium_debt(
        ctx,
        realized_premium_ray,
        &params.premium_shares,
        index,
        premium_offset_ray,
    );
    let gross = Int::add(ctx, &[&params.liquidity_swept_deficit, &drawn, &premium]);
    Int::sub(ctx, &[&gross, fee])
}
