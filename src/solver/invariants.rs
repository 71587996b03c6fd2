//! Share price monotonicity properties.
//!
//! Every check is phrased as the negation of the claim it stands for: `violation` is satisfiable
//! exactly when a counterexample to the claim exists inside the declared domain.
//!
//! Core:
//!     T1 := accrue(genesis, drawnIndex1)
//!     T2 := preview(T1, drawnIndex2)
//!     T3 := preview(T1, drawnIndex3)
//!     total_added_assets(T1) <= total_added_assets(T2) <= total_added_assets(T3)
//!
//! Lemmas cover the fixed-point brackets, premium debt monotonicity, and fee boundedness.
//! Regression checks pin down the premium growth rounding policy: rounding the raw difference up
//! breaks the core claim, rounding each absolute debt up does not.

use alloy_primitives::U256;
use serde::Serialize;
use z3::ast::{Ast, Bool, Int};
use z3::Context;

use crate::error::{DomainError, Z3Error};
use crate::protocols::accrual::{
    liquidity_growth, unrealized_fee_amount, AccrualParams, AccrualSnapshot, AccrualState,
};
use crate::protocols::premium::{premium_debt, premium_debt_ray, PremiumRounding};
use crate::solver::domain::{
    SymbolicDomain, DRAWN_INDEX_1, DRAWN_INDEX_2, DRAWN_INDEX_3, DRAWN_SHARES, LIQUIDITY_FEE,
    LIQUIDITY_SWEPT_DEFICIT, PREMIUM_SHARES, REALIZED_PREMIUM_RAY,
};
use crate::symbolic::utils::math::{div_up, int_val, ray, ray_mul_down, ray_mul_up};
use crate::symbolic::z3_ext::{int_from_u256, require_u256};
use crate::utils::constants::{PERCENTAGE_FACTOR_U256, RAY_U256};

pub const SHARE_PRICE_T1_TO_T2: &str = "share_price_t1_to_t2";
pub const SHARE_PRICE_T2_TO_T3: &str = "share_price_t2_to_t3";
pub const RAY_MUL_BRACKETS_PRODUCT: &str = "ray_mul_brackets_product";
pub const DIV_UP_IS_CEILING: &str = "div_up_is_ceiling";
pub const PREMIUM_DEBT_MONOTONE_IN_INDEX: &str = "premium_debt_monotone_in_index";
pub const FEE_BOUNDED_BY_GROWTH: &str = "fee_bounded_by_growth";
pub const ON_DIFFERENCE_ROUNDING_BREAKS_T1_TO_T2: &str = "on_difference_rounding_breaks_t1_to_t2";
pub const PINNED_INDEPENDENT_ROUNDING_HOLDS: &str = "pinned_independent_rounding_holds";
pub const PINNED_ON_DIFFERENCE_ROUNDING_BREAKS: &str = "pinned_on_difference_rounding_breaks";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckGroup {
    Core,
    Lemma,
    Regression,
}

/// Name and group of every check the suite knows, in run order.
pub const CHECK_CATALOG: &[(&str, CheckGroup)] = &[
    (SHARE_PRICE_T1_TO_T2, CheckGroup::Core),
    (SHARE_PRICE_T2_TO_T3, CheckGroup::Core),
    (RAY_MUL_BRACKETS_PRODUCT, CheckGroup::Lemma),
    (DIV_UP_IS_CEILING, CheckGroup::Lemma),
    (PREMIUM_DEBT_MONOTONE_IN_INDEX, CheckGroup::Lemma),
    (FEE_BOUNDED_BY_GROWTH, CheckGroup::Lemma),
    (PINNED_INDEPENDENT_ROUNDING_HOLDS, CheckGroup::Regression),
    (PINNED_ON_DIFFERENCE_ROUNDING_BREAKS, CheckGroup::Regression),
    (ON_DIFFERENCE_ROUNDING_BREAKS_T1_TO_T2, CheckGroup::Regression),
];

/// What the solver is expected to conclude about the claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// No counterexample exists.
    Holds,
    /// A counterexample exists.
    Refuted,
}

pub struct PropertyCheck<'ctx> {
    pub name: String,
    pub description: String,
    pub expectation: Expectation,
    pub violation: Bool<'ctx>,
    /// Derived terms worth reporting alongside a counterexample.
    pub observables: Vec<(String, Int<'ctx>)>,
}

impl<'ctx> PropertyCheck<'ctx> {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        expectation: Expectation,
        violation: Bool<'ctx>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            expectation,
            violation,
            observables: Vec::new(),
        }
    }

    pub fn with_observable(mut self, name: impl Into<String>, term: Int<'ctx>) -> Self {
        self.observables.push((name.into(), term));
        self
    }
}

/// T1 accrue followed by T2 and T3 previews over the domain's symbolic variables.
pub struct MonotonicityChain<'ctx> {
    pub params: AccrualParams<'ctx>,
    pub accrued: AccrualState<'ctx>,
    pub t1: AccrualSnapshot<'ctx>,
    pub t2: AccrualSnapshot<'ctx>,
    pub t3: AccrualSnapshot<'ctx>,
}

impl<'ctx> MonotonicityChain<'ctx> {
    pub fn build(
        domain: &SymbolicDomain<'ctx>,
        rounding: PremiumRounding,
    ) -> Result<Self, DomainError> {
        let ctx = domain.ctx();
        let params = AccrualParams {
            drawn_shares: domain.var(DRAWN_SHARES)?.clone(),
            premium_shares: domain.var(PREMIUM_SHARES)?.clone(),
            liquidity_fee: domain.var(LIQUIDITY_FEE)?.clone(),
            liquidity_swept_deficit: domain.var(LIQUIDITY_SWEPT_DEFICIT)?.clone(),
            rounding,
        };
        let genesis =
            AccrualState::genesis(ctx, &params, domain.var(REALIZED_PREMIUM_RAY)?.clone());

        let (t1, accrued) = genesis.accrue(ctx, &params, domain.var(DRAWN_INDEX_1)?);
        let t2 = accrued.preview(ctx, &params, domain.var(DRAWN_INDEX_2)?);
        let t3 = accrued.preview(ctx, &params, domain.var(DRAWN_INDEX_3)?);

        Ok(Self {
            params,
            accrued,
            t1,
            t2,
            t3,
        })
    }

    /// Violation of "total added assets does not decrease from `earlier` to `later`".
    fn decrease(earlier: &AccrualSnapshot<'ctx>, later: &AccrualSnapshot<'ctx>) -> Bool<'ctx> {
        earlier
            .total_added_assets
            .gt(&later.total_added_assets)
            .simplify()
    }

    pub fn t1_to_t2_decrease(&self) -> Bool<'ctx> {
        Self::decrease(&self.t1, &self.t2)
    }

    pub fn t2_to_t3_decrease(&self) -> Bool<'ctx> {
        Self::decrease(&self.t2, &self.t3)
    }

    fn observe(&self, check: PropertyCheck<'ctx>) -> PropertyCheck<'ctx> {
        check
            .with_observable("totalAddedAssets1", self.t1.total_added_assets.clone())
            .with_observable("totalAddedAssets2", self.t2.total_added_assets.clone())
            .with_observable("totalAddedAssets3", self.t3.total_added_assets.clone())
            .with_observable("feeAmount1", self.t1.fee.clone())
            .with_observable("feeAmount2", self.t2.fee.clone())
            .with_observable("feeAmount3", self.t3.fee.clone())
    }
}

pub fn share_price_t1_to_t2<'ctx>(
    domain: &SymbolicDomain<'ctx>,
) -> Result<PropertyCheck<'ctx>, DomainError> {
    let chain = MonotonicityChain::build(domain, PremiumRounding::Independent)?;
    let check = PropertyCheck::new(
        SHARE_PRICE_T1_TO_T2,
        "Share price does not decrease from T1 to T2",
        Expectation::Holds,
        chain.t1_to_t2_decrease(),
    );
    Ok(chain.observe(check))
}

pub fn share_price_t2_to_t3<'ctx>(
    domain: &SymbolicDomain<'ctx>,
) -> Result<PropertyCheck<'ctx>, DomainError> {
    let chain = MonotonicityChain::build(domain, PremiumRounding::Independent)?;
    let check = PropertyCheck::new(
        SHARE_PRICE_T2_TO_T3,
        "Share price does not decrease from T2 to T3",
        Expectation::Holds,
        chain.t2_to_t3_decrease(),
    );
    Ok(chain.observe(check))
}

/// down * RAY <= a * b <= up * RAY and up - down <= 1
///
/// Quantified over the domain's operand ranges, a = drawnShares in [1, 10^30] and
/// b = drawnIndex1 in [RAY, 100 * RAY), which are the ranges the accrual chain feeds `rayMulUp`.
/// Arbitrary non-negative operands are covered concretely by the fixed-point proptest.
pub fn ray_mul_brackets_product<'ctx>(
    domain: &SymbolicDomain<'ctx>,
) -> Result<PropertyCheck<'ctx>, DomainError> {
    let ctx = domain.ctx();
    let a = domain.var(DRAWN_SHARES)?;
    let b = domain.var(DRAWN_INDEX_1)?;
    let ray = ray(ctx);

    let product = Int::mul(ctx, &[a, b]);
    let down = ray_mul_down(ctx, a, b);
    let up = ray_mul_up(ctx, a, b);
    let gap = Int::sub(ctx, &[&up, &down]);

    let violation = Bool::or(
        ctx,
        &[
            &Int::mul(ctx, &[&down, &ray]).gt(&product),
            &product.gt(&Int::mul(ctx, &[&up, &ray])),
            &gap.gt(&int_val(ctx, 1)),
        ],
    );
    Ok(PropertyCheck::new(
        RAY_MUL_BRACKETS_PRODUCT,
        "rayMulDown <= a*b/RAY <= rayMulUp within one unit",
        Expectation::Holds,
        violation,
    )
    .with_observable("rayMulDown", down)
    .with_observable("rayMulUp", up))
}

/// divUp(a, b) * b >= a and (divUp(a, b) - 1) * b < a, for b > 0
pub fn div_up_is_ceiling<'ctx>(
    domain: &SymbolicDomain<'ctx>,
) -> Result<PropertyCheck<'ctx>, DomainError> {
    let ctx = domain.ctx();
    let a = domain.var(REALIZED_PREMIUM_RAY)?;
    let b = domain.var(DRAWN_SHARES)?;

    let quotient = div_up(ctx, a, b);
    // (q - 1) * b is spelled q * b - b so both sides share one product term.
    let covered = Int::mul(ctx, &[&quotient, b]);
    let violation = Bool::or(
        ctx,
        &[&covered.lt(a), &Int::sub(ctx, &[&covered, b]).ge(a)],
    );
    Ok(PropertyCheck::new(
        DIV_UP_IS_CEILING,
        "divUp(a, b) is the least multiple count covering a",
        Expectation::Holds,
        violation,
    )
    .with_observable("divUp", quotient))
}

/// Premium debt is non-decreasing in the index under both offsets the chain uses: the genesis
/// offset (`premiumShares * RAY`) from drawnIndex1 to drawnIndex2, and the post-accrue offset
/// (`premiumShares * drawnIndex1`, with the realized premium booked at T1) from drawnIndex2 to
/// drawnIndex3.
pub fn premium_debt_monotone_in_index<'ctx>(
    domain: &SymbolicDomain<'ctx>,
) -> Result<PropertyCheck<'ctx>, DomainError> {
    let ctx = domain.ctx();
    let shares = domain.var(PREMIUM_SHARES)?;
    let index1 = domain.var(DRAWN_INDEX_1)?;
    let index2 = domain.var(DRAWN_INDEX_2)?;
    let index3 = domain.var(DRAWN_INDEX_3)?;

    let genesis_realized = domain.var(REALIZED_PREMIUM_RAY)?;
    let genesis_offset = Int::mul(ctx, &[shares, &ray(ctx)]);
    let genesis_low = premium_debt(ctx, genesis_realized, shares, index1, &genesis_offset);
    let genesis_high = premium_debt(ctx, genesis_realized, shares, index2, &genesis_offset);

    let accrued_realized = premium_debt_ray(ctx, genesis_realized, shares, index1, &genesis_offset);
    let accrued_offset = Int::mul(ctx, &[shares, index1]);
    let accrued_low = premium_debt(ctx, &accrued_realized, shares, index2, &accrued_offset);
    let accrued_high = premium_debt(ctx, &accrued_realized, shares, index3, &accrued_offset);

    let violation = Bool::or(
        ctx,
        &[&genesis_low.gt(&genesis_high), &accrued_low.gt(&accrued_high)],
    );
    Ok(PropertyCheck::new(
        PREMIUM_DEBT_MONOTONE_IN_INDEX,
        "Premium debt is non-decreasing in the drawn index",
        Expectation::Holds,
        violation,
    )
    .with_observable("premiumDebtGenesisAtIndex1", genesis_low)
    .with_observable("premiumDebtGenesisAtIndex2", genesis_high)
    .with_observable("premiumDebtAccruedAtIndex2", accrued_low)
    .with_observable("premiumDebtAccruedAtIndex3", accrued_high))
}

/// 0 <= unrealizedFeeAmount <= liquidity growth, on the preview leg after T1.
pub fn fee_bounded_by_growth<'ctx>(
    domain: &SymbolicDomain<'ctx>,
) -> Result<PropertyCheck<'ctx>, DomainError> {
    let ctx = domain.ctx();
    let chain = MonotonicityChain::build(domain, PremiumRounding::Independent)?;
    let state = &chain.accrued;
    let params = &chain.params;
    let next_index = domain.var(DRAWN_INDEX_2)?;

    let growth = liquidity_growth(
        ctx,
        PremiumRounding::Independent,
        &params.drawn_shares,
        &state.index,
        next_index,
        &state.realized_premium_ray,
        &params.premium_shares,
        &state.premium_offset_ray,
    );
    let fee = unrealized_fee_amount(
        ctx,
        &params.drawn_shares,
        &state.index,
        next_index,
        &state.realized_premium_ray,
        &params.premium_shares,
        &state.premium_offset_ray,
        &params.liquidity_fee,
    );
    let violation = Bool::or(ctx, &[&fee.lt(&int_val(ctx, 0)), &fee.gt(&growth)]);
    Ok(PropertyCheck::new(
        FEE_BOUNDED_BY_GROWTH,
        "Unrealized fee is non-negative and never exceeds liquidity growth",
        Expectation::Holds,
        violation,
    )
    .with_observable("liquidityGrowth", growth)
    .with_observable("unrealizedFeeAmount", fee))
}

pub fn on_difference_rounding_breaks_t1_to_t2<'ctx>(
    domain: &SymbolicDomain<'ctx>,
) -> Result<PropertyCheck<'ctx>, DomainError> {
    let chain = MonotonicityChain::build(domain, PremiumRounding::OnDifference)?;
    let check = PropertyCheck::new(
        ON_DIFFERENCE_ROUNDING_BREAKS_T1_TO_T2,
        "Rounding premium growth on the raw difference lets share price drop from T1 to T2",
        Expectation::Refuted,
        chain.t1_to_t2_decrease(),
    );
    Ok(chain.observe(check))
}

/// Concrete instance where the two premium growth rounding policies disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegressionScenario {
    pub liquidity_fee: U256,
    pub drawn_index_1: U256,
    pub drawn_index_2: U256,
    pub drawn_index_3: U256,
    pub drawn_shares: U256,
    pub premium_shares: U256,
    pub realized_premium_ray: U256,
    pub liquidity_swept_deficit: U256,
}

impl Default for RegressionScenario {
    /// Premium debt moves from one ray-unit to exactly 2 RAY at full fee: independent rounding
    /// books growth 1, rounding the raw difference books 2 and pushes the total below T1.
    fn default() -> Self {
        let drawn_index_2 = RAY_U256 * U256::from(3u64) - U256::from(1u64);
        Self {
            liquidity_fee: PERCENTAGE_FACTOR_U256,
            drawn_index_1: RAY_U256,
            drawn_index_2,
            drawn_index_3: drawn_index_2,
            drawn_shares: U256::from(1u64),
            premium_shares: U256::from(1u64),
            realized_premium_ray: U256::from(1u64),
            liquidity_swept_deficit: U256::ZERO,
        }
    }
}

/// Concrete totals of a pinned scenario at T1, T2 and T3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioTotals {
    pub t1: U256,
    pub t2: U256,
    pub t3: U256,
}

impl RegressionScenario {
    /// Run the accrual chain on the scenario's literals and fold each total to a numeral.
    pub fn totals(
        &self,
        ctx: &Context,
        rounding: PremiumRounding,
    ) -> Result<ScenarioTotals, Z3Error> {
        let lit = |value: U256| int_from_u256(ctx, value);
        let params = AccrualParams {
            drawn_shares: lit(self.drawn_shares),
            premium_shares: lit(self.premium_shares),
            liquidity_fee: lit(self.liquidity_fee),
            liquidity_swept_deficit: lit(self.liquidity_swept_deficit),
            rounding,
        };
        let genesis = AccrualState::genesis(ctx, &params, lit(self.realized_premium_ray));
        let (t1, accrued) = genesis.accrue(ctx, &params, &lit(self.drawn_index_1));
        let t2 = accrued.preview(ctx, &params, &lit(self.drawn_index_2));
        let t3 = accrued.preview(ctx, &params, &lit(self.drawn_index_3));

        Ok(ScenarioTotals {
            t1: require_u256("totalAddedAssets1", &t1.total_added_assets)?,
            t2: require_u256("totalAddedAssets2", &t2.total_added_assets)?,
            t3: require_u256("totalAddedAssets3", &t3.total_added_assets)?,
        })
    }

    pub fn assignments(&self) -> [(&'static str, U256); 8] {
        [
            (LIQUIDITY_FEE, self.liquidity_fee),
            (DRAWN_INDEX_1, self.drawn_index_1),
            (DRAWN_INDEX_2, self.drawn_index_2),
            (DRAWN_INDEX_3, self.drawn_index_3),
            (DRAWN_SHARES, self.drawn_shares),
            (PREMIUM_SHARES, self.premium_shares),
            (REALIZED_PREMIUM_RAY, self.realized_premium_ray),
            (LIQUIDITY_SWEPT_DEFICIT, self.liquidity_swept_deficit),
        ]
    }

    /// Equalities fixing every domain variable to this scenario.
    pub fn pins<'ctx>(&self, domain: &SymbolicDomain<'ctx>) -> Result<Bool<'ctx>, DomainError> {
        let ctx = domain.ctx();
        let equalities = self
            .assignments()
            .iter()
            .map(|(name, value)| Ok(domain.var(name)?._eq(&int_from_u256(ctx, *value))))
            .collect::<Result<Vec<_>, DomainError>>()?;
        let refs = equalities.iter().collect::<Vec<_>>();
        Ok(Bool::and(ctx, &refs))
    }

    pub fn check<'ctx>(
        &self,
        domain: &SymbolicDomain<'ctx>,
        rounding: PremiumRounding,
    ) -> Result<PropertyCheck<'ctx>, DomainError> {
        let ctx = domain.ctx();
        let chain = MonotonicityChain::build(domain, rounding)?;
        let pins = self.pins(domain)?;
        let violation = Bool::and(ctx, &[&pins, &chain.t1_to_t2_decrease()]);
        let (name, description, expectation) = match rounding {
            PremiumRounding::Independent => (
                PINNED_INDEPENDENT_ROUNDING_HOLDS,
                "Pinned scenario: independent premium rounding keeps T1 <= T2",
                Expectation::Holds,
            ),
            PremiumRounding::OnDifference => (
                PINNED_ON_DIFFERENCE_ROUNDING_BREAKS,
                "Pinned scenario: rounding the premium difference drops T2 below T1",
                Expectation::Refuted,
            ),
        };
        let check = PropertyCheck::new(name, description, expectation, violation);
        Ok(chain.observe(check))
    }
}

/// Build a catalog check by name.
pub fn build_check<'ctx>(
    domain: &SymbolicDomain<'ctx>,
    name: &str,
) -> Result<Option<PropertyCheck<'ctx>>, DomainError> {
    let scenario = RegressionScenario::default();
    let check = match name {
        SHARE_PRICE_T1_TO_T2 => share_price_t1_to_t2(domain)?,
        SHARE_PRICE_T2_TO_T3 => share_price_t2_to_t3(domain)?,
        RAY_MUL_BRACKETS_PRODUCT => ray_mul_brackets_product(domain)?,
        DIV_UP_IS_CEILING => div_up_is_ceiling(domain)?,
        PREMIUM_DEBT_MONOTONE_IN_INDEX => premium_debt_monotone_in_index(domain)?,
        FEE_BOUNDED_BY_GROWTH => fee_bounded_by_growth(domain)?,
        PINNED_INDEPENDENT_ROUNDING_HOLDS => {
            scenario.check(domain, PremiumRounding::Independent)?
        }
        PINNED_ON_DIFFERENCE_ROUNDING_BREAKS => {
            scenario.check(domain, PremiumRounding::OnDifference)?
        }
        ON_DIFFERENCE_ROUNDING_BREAKS_T1_TO_T2 => on_difference_rounding_breaks_t1_to_t2(domain)?,
        _ => return Ok(None),
    };
    Ok(Some(check))
}
