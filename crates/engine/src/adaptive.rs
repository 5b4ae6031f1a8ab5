//! Adaptive level curve with a time-decayed plateau.
//!
//! # Curve Shape
//!
//! ```text
//! level
//!   full |                              /
//!        |                             /
//!        |                            /
//!  plat. |          ________________/
//!        |        /
//!   zero |______/
//!        +------+----------------+-----+--> utilization
//!        0     low              high  100%
//! ```
//!
//! Between `low_bound` and `high_bound` the price holds at the current
//! plateau regardless of the exact position in the zone. Outside the zone
//! the curve is linear toward the fixed edge levels.
//!
//! # Plateau Adaptation
//!
//! While utilization sits below the optimum the plateau drifts down toward
//! `zero_level`; at or above it, up toward `full_level`. The remaining
//! distance to the target shrinks geometrically:
//!
//! ```text
//! per_second = daily_rate / 86_400
//! remaining  = |plateau - target| * (1 - per_second)^elapsed
//! ```
//!
//! so the plateau approaches the target monotonically and can never cross
//! it. A zero `daily_rate` freezes the plateau.
//!
//! Reads project the plateau to the current time on demand and never write.
//! [`AdaptiveLevelCurve::update`] is the only path that commits a projection,
//! and only the registered caller may invoke it.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use utilcurve_engine::{
//!     math::from_ppm, AdaptiveCurveParams, AdaptiveLevelCurve, ManualClock, PricingCurve, WAD,
//! };
//! use alloy_primitives::U256;
//!
//! let curve = AdaptiveLevelCurve::new(
//!     AdaptiveCurveParams {
//!         low_bound: from_ppm(250_000),
//!         high_bound: from_ppm(750_000),
//!         zero_level: from_ppm(5_000),
//!         full_level: WAD,
//!         initial_plateau: from_ppm(100_000),
//!         optimum: None,
//!         daily_rate: from_ppm(100_000),
//!     },
//!     Arc::new(ManualClock::new(0)),
//! )
//! .unwrap();
//!
//! assert_eq!(curve.cost_factor(U256::ZERO, WAD).unwrap(), from_ppm(200_625));
//! ```

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::auth::{CallerRegistry, UpdateAuthority};
use crate::clock::Clock;
use crate::curve::PricingCurve;
use crate::error::{CurveError, Result};
use crate::math::{w_mul, w_pow, zero_floor_sub, RoundingDirection, SECONDS_PER_DAY, WAD};
use crate::piecewise::{Anchor, PiecewiseLinear};

/// Construction parameters of an [`AdaptiveLevelCurve`]. All values WAD-scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdaptiveCurveParams {
    /// Lower edge of the optimal zone
    pub low_bound: U256,
    /// Upper edge of the optimal zone
    pub high_bound: U256,
    /// Price at 0% utilization
    pub zero_level: U256,
    /// Price at 100% utilization
    pub full_level: U256,
    /// Plateau level before any adaptation
    pub initial_plateau: U256,
    /// Utilization deciding the drift direction. Defaults to the zone midpoint.
    #[serde(default)]
    pub optimum: Option<U256>,
    /// Fraction of the distance to the target level closed per day, before
    /// compounding
    pub daily_rate: U256,
}

impl AdaptiveCurveParams {
    /// The drift reference utilization
    pub fn optimum(&self) -> U256 {
        self.optimum
            .unwrap_or_else(|| self.low_bound.saturating_add(self.high_bound) / U256::from(2))
    }

    /// Checks every parameter bound.
    ///
    /// # Errors
    ///
    /// - [`CurveError::InvalidConfiguration`] naming the first violated bound
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(CurveError::InvalidConfiguration(reason));

        if self.high_bound > WAD {
            return invalid(format!("high bound {} exceeds 100%", self.high_bound));
        }
        if self.low_bound > self.high_bound {
            return invalid(format!(
                "low bound {} exceeds high bound {}",
                self.low_bound, self.high_bound
            ));
        }
        if self.full_level > WAD {
            return invalid(format!("full level {} exceeds 100%", self.full_level));
        }
        if self.zero_level > self.full_level {
            return invalid(format!(
                "zero level {} exceeds full level {}",
                self.zero_level, self.full_level
            ));
        }
        if self.initial_plateau < self.zero_level || self.initial_plateau > self.full_level {
            return invalid(format!(
                "initial plateau {} outside [{}, {}]",
                self.initial_plateau, self.zero_level, self.full_level
            ));
        }
        let optimum = self.optimum();
        if optimum < self.low_bound || optimum > self.high_bound {
            return invalid(format!(
                "optimum {} outside zone [{}, {}]",
                optimum, self.low_bound, self.high_bound
            ));
        }
        if self.daily_rate > WAD {
            return invalid(format!("daily rate {} exceeds 100%", self.daily_rate));
        }
        Ok(())
    }
}

/// Committed adaptive state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlateauState {
    /// Plateau level as of `last_update` (WAD-scaled)
    pub plateau_level: U256,
    /// Clock time of the last committed update, in seconds
    pub last_update: u64,
}

/// A curve whose optimal-zone price adapts over time.
#[derive(Debug)]
pub struct AdaptiveLevelCurve {
    params: AdaptiveCurveParams,
    optimum: U256,
    state: RwLock<PlateauState>,
    registry: CallerRegistry,
    clock: Arc<dyn Clock>,
}

impl AdaptiveLevelCurve {
    /// Validates `params` and creates the curve with its plateau at
    /// `initial_plateau`, stamped with the clock's current time.
    ///
    /// # Errors
    ///
    /// - [`CurveError::InvalidConfiguration`] if any bound is violated. No
    ///   state exists in that case.
    pub fn new(params: AdaptiveCurveParams, clock: Arc<dyn Clock>) -> Result<Self> {
        params.validate()?;

        let state = PlateauState {
            plateau_level: params.initial_plateau,
            last_update: clock.now(),
        };

        Ok(Self {
            optimum: params.optimum(),
            params,
            state: RwLock::new(state),
            registry: CallerRegistry::new(),
            clock,
        })
    }

    /// The curve's parameters
    pub fn params(&self) -> &AdaptiveCurveParams {
        &self.params
    }

    /// The resolved drift reference utilization
    pub fn optimum(&self) -> U256 {
        self.optimum
    }

    /// Snapshot of the committed state
    pub fn state(&self) -> PlateauState {
        *self.state.read()
    }

    /// The registered caller, if any
    pub fn registered_caller(&self) -> Option<Address> {
        self.registry.registered()
    }

    /// The plateau as of now, assuming `utilization` held since the last
    /// committed update. Does not write.
    ///
    /// # Errors
    ///
    /// - [`CurveError::ClockRegression`] if the clock reads earlier than the
    ///   last committed update
    pub fn projected_plateau(&self, utilization: U256) -> Result<U256> {
        let state = self.state();
        let elapsed = self.elapsed_since(state.last_update)?;
        self.project(state.plateau_level, utilization, elapsed)
    }

    /// Plateau after `elapsed` seconds at `utilization`, starting from `plateau`.
    ///
    /// A zone collapsed to a single point has no side to drift toward, so the
    /// plateau holds.
    pub fn project(&self, plateau: U256, utilization: U256, elapsed: u64) -> Result<U256> {
        if elapsed == 0 || self.params.daily_rate.is_zero() || self.has_degenerate_zone() {
            return Ok(plateau);
        }

        let per_second = self.params.daily_rate / U256::from(SECONDS_PER_DAY);
        let retention = w_pow(WAD - per_second, elapsed)?;

        // Remaining distance rounds up so the target is approached, never crossed
        let projected = if utilization < self.optimum {
            let distance = zero_floor_sub(plateau, self.params.zero_level);
            self.params.zero_level + w_mul(distance, retention, RoundingDirection::Up)?
        } else {
            let distance = zero_floor_sub(self.params.full_level, plateau);
            self.params.full_level - w_mul(distance, retention, RoundingDirection::Up)?
        };

        trace!(%plateau, %projected, %utilization, elapsed, "projected plateau");
        Ok(projected)
    }

    fn has_degenerate_zone(&self) -> bool {
        self.params.low_bound == self.params.high_bound
    }

    fn elapsed_since(&self, last_update: u64) -> Result<u64> {
        let now = self.clock.now();
        now.checked_sub(last_update)
            .ok_or(CurveError::ClockRegression { now, last_update })
    }

    fn curve_at(&self, plateau: U256) -> Result<PiecewiseLinear<4>> {
        PiecewiseLinear::new([
            Anchor::new(U256::ZERO, self.params.zero_level),
            Anchor::new(self.params.low_bound, plateau),
            Anchor::new(self.params.high_bound, plateau),
            Anchor::new(WAD, self.params.full_level),
        ])
    }

    /// The curve as of now for a pool currently at `utilization`
    fn current_curve(&self, utilization: U256) -> Result<PiecewiseLinear<4>> {
        self.curve_at(self.projected_plateau(utilization)?)
    }
}

impl PricingCurve for AdaptiveLevelCurve {
    fn point_price(&self, utilization: U256) -> Result<U256> {
        self.current_curve(utilization)?
            .value_at(utilization, RoundingDirection::Up)
    }

    fn average_price(&self, from: U256, to: U256) -> Result<U256> {
        if to < from {
            return Err(CurveError::InvalidUtilization { from, to });
        }
        self.current_curve(from)?
            .average(from, to, RoundingDirection::Up)
    }

    fn cost_factor(&self, from: U256, to: U256) -> Result<U256> {
        if to > WAD {
            return Err(CurveError::InvalidUtilization { from, to });
        }
        self.average_price(from, to)
    }

    fn refund_factor(&self, from: U256, to: U256) -> Result<U256> {
        if to > from {
            return Err(CurveError::InvalidUtilization { from, to });
        }
        self.current_curve(from)?.area_share(from, to)
    }

    fn register_caller(&self, caller: Address) -> Result<UpdateAuthority> {
        self.registry.register(caller)
    }

    /// Commits the plateau projected over the period spent at `from`.
    ///
    /// # Errors
    ///
    /// - [`CurveError::Unauthorized`] if `authority` is not this curve's
    ///   registered caller's handle
    /// - [`CurveError::ClockRegression`] if the clock moved backwards
    fn update(&self, authority: &UpdateAuthority, from: U256, to: U256) -> Result<()> {
        self.registry.authorize(authority)?;

        let mut state = self.state.write();
        let now = self.clock.now();
        let elapsed = now
            .checked_sub(state.last_update)
            .ok_or(CurveError::ClockRegression {
                now,
                last_update: state.last_update,
            })?;
        let plateau_level = self.project(state.plateau_level, from, elapsed)?;

        debug!(
            previous = %state.plateau_level,
            plateau = %plateau_level,
            %from,
            %to,
            elapsed,
            "plateau updated"
        );
        *state = PlateauState {
            plateau_level,
            last_update: now,
        };
        Ok(())
    }
}
