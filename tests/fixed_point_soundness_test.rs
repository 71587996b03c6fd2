use alloy_primitives::U256;
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, TestCaseError, TestRunner};
use share_price_prover::solver::domain::MONOTONICITY_DOMAIN;
use share_price_prover::solver::invariants::{div_up_is_ceiling, ray_mul_brackets_product};
use share_price_prover::solver::{Verdict, VerificationContext};
use share_price_prover::symbolic::utils::math::{div_up, percent_mul_down, ray_mul_down, ray_mul_up};
use share_price_prover::symbolic::z3_ext::{int_from_u256, u256_from_int};
use share_price_prover::utils::config::SolverSettings;
use share_price_prover::utils::constants::{PERCENTAGE_FACTOR_U256, RAY_U256};
use z3::{Config, Context};

fn concrete_ray_mul_down(a: U256, b: U256) -> U256 {
    a * b / RAY_U256
}

fn concrete_ray_mul_up(a: U256, b: U256) -> U256 {
    (a * b + RAY_U256 - U256::from(1u64)) / RAY_U256
}

fn concrete_percent_mul_down(a: U256, b: U256) -> U256 {
    a * b / PERCENTAGE_FACTOR_U256
}

fn concrete_div_up(a: U256, b: U256) -> U256 {
    (a + b - U256::from(1u64)) / b
}

fn compare_primitives(ctx: &Context, a: U256, b: U256) -> Result<(), String> {
    let sa = int_from_u256(ctx, a);
    let sb = int_from_u256(ctx, b);

    let pairs = [
        ("ray_mul_down", ray_mul_down(ctx, &sa, &sb), concrete_ray_mul_down(a, b)),
        ("ray_mul_up", ray_mul_up(ctx, &sa, &sb), concrete_ray_mul_up(a, b)),
        ("percent_mul_down", percent_mul_down(ctx, &sa, &sb), concrete_percent_mul_down(a, b)),
        ("div_up", div_up(ctx, &sa, &sb), concrete_div_up(a, b)),
    ];
    for (label, symbolic, expected) in pairs {
        let folded = u256_from_int(&symbolic)
            .ok_or_else(|| format!("{label}({a}, {b}) did not fold to a numeral"))?;
        if folded != expected {
            return Err(format!("{label}({a}, {b}): symbolic={folded} concrete={expected}"));
        }
    }

    let down = concrete_ray_mul_down(a, b);
    let up = concrete_ray_mul_up(a, b);
    if up < down || up - down > U256::from(1u64) {
        return Err(format!("ray_mul bracket too wide for ({a}, {b}): down={down} up={up}"));
    }
    Ok(())
}

#[test]
fn test_fixed_point_primitives_smoke() {
    let cfg = Config::new();
    let ctx = Context::new(&cfg);
    for (a, b) in [
        (U256::ZERO, U256::from(1u64)),
        (U256::from(1u64), RAY_U256),
        (U256::from(3u64), RAY_U256 / U256::from(2u64)),
        (U256::from(999u64), U256::from(1_500u64)),
        (RAY_U256, RAY_U256 * U256::from(99u64)),
    ] {
        compare_primitives(&ctx, a, b).unwrap_or_else(|msg| panic!("smoke mismatch: {msg}"));
    }
}

#[test]
fn test_fixed_point_primitives_match_u256_proptest() {
    let cfg = Config::new();
    let ctx = Context::new(&cfg);
    let mut runner = TestRunner::new(ProptestConfig {
        cases: 512,
        ..ProptestConfig::default()
    });

    let operand = any::<u128>().prop_map(U256::from);
    let divisor = (1u128..=u128::MAX).prop_map(U256::from);
    let result = runner.run(&(operand, divisor), |(a, b)| {
        compare_primitives(&ctx, a, b).map_err(TestCaseError::fail)
    });

    if let Err(err) = result {
        panic!("fixed-point soundness proptest failed: {err}");
    }
}

#[test]
fn test_ray_mul_bracket_lemma_is_proved() {
    let cfg = Config::new();
    let ctx = Context::new(&cfg);
    let vc = VerificationContext::new(&ctx, MONOTONICITY_DOMAIN, &SolverSettings::default())
        .expect("context builds");

    let check = ray_mul_brackets_product(vc.domain()).expect("domain variables resolve");
    assert_eq!(vc.check_property(&check), Verdict::Proved);
}

#[test]
fn test_div_up_ceiling_lemma_is_proved() {
    let cfg = Config::new();
    let ctx = Context::new(&cfg);
    let vc = VerificationContext::new(&ctx, MONOTONICITY_DOMAIN, &SolverSettings::default())
        .expect("context builds");

    let check = div_up_is_ceiling(vc.domain()).expect("domain variables resolve");
    assert_eq!(vc.check_property(&check), Verdict::Proved);
}
