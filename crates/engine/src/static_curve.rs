//! Static jump curve: three fixed anchors and no state.
//!
//! ```text
//! level
//!   full |                       /
//!        |                      /
//!        |                     /
//!   kink |          _________/
//!   zero |_________/
//!        +-----------------+-----+--> utilization
//!        0               kink   100%
//! ```
//!
//! Every query is a pure function of the parameters and the interval.
//! Utilization is capped at 100% on every path.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::auth::{CallerRegistry, UpdateAuthority};
use crate::curve::PricingCurve;
use crate::error::{CurveError, Result};
use crate::math::{RoundingDirection, WAD};
use crate::piecewise::{Anchor, PiecewiseLinear};

/// Construction parameters of a [`StaticJumpCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticCurveParams {
    /// Price at 0% utilization (WAD-scaled)
    pub zero_level: U256,
    /// The single inflection point
    pub kink: Anchor,
    /// Price at 100% utilization (WAD-scaled)
    pub full_level: U256,
}

impl StaticCurveParams {
    /// Anchors in curve order
    pub fn anchors(&self) -> [Anchor; 3] {
        [
            Anchor::new(U256::ZERO, self.zero_level),
            self.kink,
            Anchor::new(WAD, self.full_level),
        ]
    }
}

/// A stateless three-anchor pricing curve.
#[derive(Debug)]
pub struct StaticJumpCurve {
    params: StaticCurveParams,
    curve: PiecewiseLinear<3>,
    registry: CallerRegistry,
}

impl StaticJumpCurve {
    /// Validates `params` and builds the curve.
    ///
    /// # Errors
    ///
    /// - [`CurveError::InvalidConfiguration`] if the kink lies above 100%, a
    ///   level exceeds 100%, or the levels decrease along the curve
    pub fn new(params: StaticCurveParams) -> Result<Self> {
        if params.kink.utilization > WAD {
            return Err(CurveError::InvalidConfiguration(format!(
                "kink utilization {} exceeds 100%",
                params.kink.utilization
            )));
        }
        let curve = PiecewiseLinear::new(params.anchors())?;

        Ok(Self {
            params,
            curve,
            registry: CallerRegistry::new(),
        })
    }

    /// The curve's parameters
    pub fn params(&self) -> &StaticCurveParams {
        &self.params
    }

    fn check_interval(from: U256, to: U256) -> Result<()> {
        if to < from || to > WAD {
            return Err(CurveError::InvalidUtilization { from, to });
        }
        Ok(())
    }
}

impl PricingCurve for StaticJumpCurve {
    fn point_price(&self, utilization: U256) -> Result<U256> {
        Self::check_interval(utilization, utilization)?;
        self.curve.value_at(utilization, RoundingDirection::Up)
    }

    fn average_price(&self, from: U256, to: U256) -> Result<U256> {
        Self::check_interval(from, to)?;
        self.curve.average(from, to, RoundingDirection::Up)
    }

    fn cost_factor(&self, from: U256, to: U256) -> Result<U256> {
        self.average_price(from, to)
    }

    fn refund_factor(&self, from: U256, to: U256) -> Result<U256> {
        if to > from || from > WAD {
            return Err(CurveError::InvalidUtilization { from, to });
        }
        self.curve.area_share(from, to)
    }

    fn register_caller(&self, caller: Address) -> Result<UpdateAuthority> {
        self.registry.register(caller)
    }

    fn update(&self, _authority: &UpdateAuthority, _from: U256, _to: U256) -> Result<()> {
        Ok(())
    }
}
