//! The pricing interface shared by every curve variant.

use std::fmt::Debug;
use std::sync::Arc;

use alloy_primitives::{Address, U256};

use crate::adaptive::AdaptiveLevelCurve;
use crate::auth::UpdateAuthority;
use crate::error::Result;
use crate::static_curve::StaticJumpCurve;

/// Prices utilization changes against a curve.
///
/// All values are WAD-scaled fractions. Read methods never mutate state and
/// may be called concurrently; [`PricingCurve::update`] is the only writer.
pub trait PricingCurve: Send + Sync + Debug {
    /// Price at exactly `utilization`, rounded up.
    fn point_price(&self, utilization: U256) -> Result<U256>;

    /// Average price over `[from, to]`, rounded up.
    ///
    /// When `from == to` this is the point price at `from`.
    fn average_price(&self, from: U256, to: U256) -> Result<U256>;

    /// Fee fraction charged for raising utilization from `from` to `to`.
    ///
    /// # Errors
    ///
    /// - [`crate::CurveError::InvalidUtilization`] if `to < from` or `to`
    ///   exceeds 100%
    fn cost_factor(&self, from: U256, to: U256) -> Result<U256>;

    /// Fraction of accumulated fees returned when utilization drops from
    /// `from` to `to`, rounded down.
    ///
    /// # Errors
    ///
    /// - [`crate::CurveError::InvalidUtilization`] if `to > from`, or `from`
    ///   exceeds the curve's ceiling
    fn refund_factor(&self, from: U256, to: U256) -> Result<U256>;

    /// Binds `caller` as the curve's only writer and returns its handle.
    fn register_caller(&self, caller: Address) -> Result<UpdateAuthority>;

    /// Commits state after a utilization change from `from` to `to`.
    fn update(&self, authority: &UpdateAuthority, from: U256, to: U256) -> Result<()>;
}

/// The closed set of curve variants.
#[derive(Debug)]
pub enum Curve {
    /// Fixed three-anchor curve
    Static(StaticJumpCurve),
    /// Curve whose plateau drifts with utilization over time
    Adaptive(AdaptiveLevelCurve),
}

impl Curve {
    fn inner(&self) -> &dyn PricingCurve {
        match self {
            Curve::Static(curve) => curve,
            Curve::Adaptive(curve) => curve,
        }
    }

    /// Wraps the curve for sharing between threads
    pub fn into_shared(self) -> Arc<dyn PricingCurve> {
        match self {
            Curve::Static(curve) => Arc::new(curve),
            Curve::Adaptive(curve) => Arc::new(curve),
        }
    }
}

impl PricingCurve for Curve {
    fn point_price(&self, utilization: U256) -> Result<U256> {
        self.inner().point_price(utilization)
    }

    fn average_price(&self, from: U256, to: U256) -> Result<U256> {
        self.inner().average_price(from, to)
    }

    fn cost_factor(&self, from: U256, to: U256) -> Result<U256> {
        self.inner().cost_factor(from, to)
    }

    fn refund_factor(&self, from: U256, to: U256) -> Result<U256> {
        self.inner().refund_factor(from, to)
    }

    fn register_caller(&self, caller: Address) -> Result<UpdateAuthority> {
        self.inner().register_caller(caller)
    }

    fn update(&self, authority: &UpdateAuthority, from: U256, to: U256) -> Result<()> {
        self.inner().update(authority, from, to)
    }
}

impl From<StaticJumpCurve> for Curve {
    fn from(curve: StaticJumpCurve) -> Self {
        Curve::Static(curve)
    }
}

impl From<AdaptiveLevelCurve> for Curve {
    fn from(curve: AdaptiveLevelCurve) -> Self {
        Curve::Adaptive(curve)
    }
}
