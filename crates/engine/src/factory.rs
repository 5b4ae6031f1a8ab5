//! Deterministic curve addresses.
//!
//! A deployer that creates curves with CREATE2 places each one at an address
//! fixed by the deployer, a caller-chosen salt and the hash of the creation
//! code with its constructor arguments appended. The functions here compute
//! that address from a [`CurveConfig`] alone, so the result depends only on
//! the parameters and never on any curve's runtime state.
//!
//! Constructor arguments are encoded as consecutive 32-byte big-endian words
//! in declaration order. An adaptive curve without an explicit optimum
//! encodes the resolved midpoint, so both spellings of the same curve share
//! an address.

use alloy_primitives::{keccak256, Address, B256, U256};

use crate::adaptive::AdaptiveCurveParams;
use crate::config::CurveConfig;
use crate::static_curve::StaticCurveParams;

/// Creation-code tag of the static jump curve
pub const STATIC_CURVE_CODE: &[u8] = b"utilcurve:StaticJumpCurve:v1";

/// Creation-code tag of the adaptive level curve
pub const ADAPTIVE_CURVE_CODE: &[u8] = b"utilcurve:AdaptiveLevelCurve:v1";

fn encode_words(words: &[U256]) -> Vec<u8> {
    words
        .iter()
        .flat_map(|word| word.to_be_bytes::<32>())
        .collect()
}

fn static_args(params: &StaticCurveParams) -> Vec<u8> {
    encode_words(&[
        params.zero_level,
        params.kink.utilization,
        params.kink.level,
        params.full_level,
    ])
}

fn adaptive_args(params: &AdaptiveCurveParams) -> Vec<u8> {
    encode_words(&[
        params.low_bound,
        params.high_bound,
        params.zero_level,
        params.full_level,
        params.initial_plateau,
        params.optimum(),
        params.daily_rate,
    ])
}

/// Creation code followed by the encoded constructor arguments
pub fn init_code(config: &CurveConfig) -> Vec<u8> {
    let (code, args) = match config {
        CurveConfig::Static(params) => (STATIC_CURVE_CODE, static_args(params)),
        CurveConfig::Adaptive(params) => (ADAPTIVE_CURVE_CODE, adaptive_args(params)),
    };
    let mut init_code = Vec::with_capacity(code.len() + args.len());
    init_code.extend_from_slice(code);
    init_code.extend_from_slice(&args);
    init_code
}

/// keccak256 of [`init_code`]
pub fn init_code_hash(config: &CurveConfig) -> B256 {
    keccak256(init_code(config))
}

/// Address `deployer` would create the curve at with `salt`.
///
/// # Example
///
/// ```rust
/// use utilcurve_engine::factory::predict_address;
/// use utilcurve_engine::{math::from_ppm, Anchor, CurveConfig, StaticCurveParams, WAD};
/// use alloy_primitives::{Address, B256};
///
/// let config = CurveConfig::Static(StaticCurveParams {
///     zero_level: from_ppm(10_000),
///     kink: Anchor::new(from_ppm(800_000), from_ppm(50_000)),
///     full_level: WAD,
/// });
///
/// let deployer = Address::repeat_byte(0x42);
/// let a = predict_address(deployer, B256::ZERO, &config);
/// let b = predict_address(deployer, B256::repeat_byte(1), &config);
/// assert_ne!(a, b);
/// assert_eq!(a, predict_address(deployer, B256::ZERO, &config));
/// ```
pub fn predict_address(deployer: Address, salt: B256, config: &CurveConfig) -> Address {
    deployer.create2(salt, init_code_hash(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{from_ppm, WAD};
    use crate::piecewise::Anchor;

    fn static_config() -> CurveConfig {
        CurveConfig::Static(StaticCurveParams {
            zero_level: from_ppm(10_000),
            kink: Anchor::new(from_ppm(800_000), from_ppm(50_000)),
            full_level: WAD,
        })
    }

    fn adaptive_params() -> AdaptiveCurveParams {
        AdaptiveCurveParams {
            low_bound: from_ppm(250_000),
            high_bound: from_ppm(750_000),
            zero_level: from_ppm(5_000),
            full_level: WAD,
            initial_plateau: from_ppm(100_000),
            optimum: None,
            daily_rate: from_ppm(100_000),
        }
    }

    #[test]
    fn test_static_init_code_layout() {
        let code = init_code(&static_config());
        assert_eq!(code.len(), STATIC_CURVE_CODE.len() + 4 * 32);
        assert!(code.starts_with(STATIC_CURVE_CODE));

        // Last word is the full level
        let tail = &code[code.len() - 32..];
        assert_eq!(U256::from_be_slice(tail), WAD);
    }

    #[test]
    fn test_adaptive_init_code_layout() {
        let code = init_code(&CurveConfig::Adaptive(adaptive_params()));
        assert_eq!(code.len(), ADAPTIVE_CURVE_CODE.len() + 7 * 32);
    }

    #[test]
    fn test_address_depends_on_params() {
        let deployer = Address::repeat_byte(0x42);
        let other = CurveConfig::Adaptive(AdaptiveCurveParams {
            daily_rate: from_ppm(200_000),
            ..adaptive_params()
        });
        let base = CurveConfig::Adaptive(adaptive_params());
        assert_ne!(
            predict_address(deployer, B256::ZERO, &base),
            predict_address(deployer, B256::ZERO, &other)
        );
    }

    #[test]
    fn test_address_depends_on_deployer() {
        let config = static_config();
        assert_ne!(
            predict_address(Address::repeat_byte(1), B256::ZERO, &config),
            predict_address(Address::repeat_byte(2), B256::ZERO, &config)
        );
    }

    #[test]
    fn test_default_and_explicit_midpoint_share_address() {
        let deployer = Address::repeat_byte(0x42);
        let implicit = CurveConfig::Adaptive(adaptive_params());
        let explicit = CurveConfig::Adaptive(AdaptiveCurveParams {
            optimum: Some(from_ppm(500_000)),
            ..adaptive_params()
        });
        assert_eq!(
            predict_address(deployer, B256::ZERO, &implicit),
            predict_address(deployer, B256::ZERO, &explicit)
        );
    }
}
