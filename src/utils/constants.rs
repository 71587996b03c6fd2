use alloy_primitives::U256;

/// Ray scale (10^27) used for indices and per-share rates.
pub const RAY_U256: U256 = U256::from_limbs([11_515_845_246_265_065_472, 54_210_108, 0, 0]);

/// Percentage scale (10^4 = 100.00%) used for fee rates.
pub const PERCENTAGE_FACTOR_U256: U256 = U256::from_limbs([10_000, 0, 0, 0]);

/// Exclusive upper bound for every drawn index (100 * RAY).
pub const MAX_DRAWN_INDEX_U256: U256 =
    U256::from_limbs([7_886_392_056_514_347_008, 5_421_010_862, 0, 0]);

/// Inclusive upper bound for share counts and premium quantities (10^30).
pub const MAX_AMOUNT_U256: U256 =
    U256::from_limbs([5_076_944_270_305_263_616, 54_210_108_624, 0, 0]);

pub const ONE_U256: U256 = U256::from_limbs([1, 0, 0, 0]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limb_constants_match_decimal_scales() {
        let ten = U256::from(10u64);
        assert_eq!(RAY_U256, ten.pow(U256::from(27u64)));
        assert_eq!(PERCENTAGE_FACTOR_U256, U256::from(10_000u64));
        assert_eq!(MAX_DRAWN_INDEX_U256, RAY_U256 * U256::from(100u64));
        assert_eq!(MAX_AMOUNT_U256, ten.pow(U256::from(30u64)));
    }
}
