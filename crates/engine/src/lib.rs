//! Utilization Pricing Curve Engine
//!
//! This crate prices usage of a shared, utilization-bounded pool. Given the
//! pool's utilization it answers two questions:
//!
//! - **Cost factor**: what fraction is charged for raising utilization
//!   across an interval
//! - **Refund factor**: what fraction of accumulated fees is returned when
//!   utilization falls across an interval
//!
//! # Overview
//!
//! Two curves implement the [`PricingCurve`] interface:
//! - [`StaticJumpCurve`] - three fixed anchors, no state
//! - [`AdaptiveLevelCurve`] - a flat optimal zone whose level drifts over
//!   time toward the zero-utilization or full-utilization level
//!
//! Interval prices are exact: the area under the piecewise-linear curve is
//! integrated in closed form on WAD-scaled integers, with cost paths rounding
//! up and refund paths rounding down.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use utilcurve_engine::{math::from_ppm, CurveConfig, ManualClock, PricingCurve, WAD};
//! use alloy_primitives::{Address, U256};
//!
//! let config = CurveConfig::from_json(r#"{
//!     "kind": "adaptive",
//!     "low_bound": "250000000000000000",
//!     "high_bound": "750000000000000000",
//!     "zero_level": "5000000000000000",
//!     "full_level": "1000000000000000000",
//!     "initial_plateau": "100000000000000000",
//!     "daily_rate": "100000000000000000"
//! }"#)?;
//!
//! let clock = Arc::new(ManualClock::new(1_700_000_000));
//! let curve = config.build(clock.clone())?;
//!
//! // Fee for moving from 0% to 25% utilization
//! assert_eq!(curve.cost_factor(U256::ZERO, from_ppm(250_000))?, from_ppm(52_500));
//!
//! // The pool operator registers once and commits state after each change
//! let authority = curve.register_caller(Address::repeat_byte(0x01))?;
//! clock.advance(86_400);
//! curve.update(&authority, from_ppm(100_000), from_ppm(200_000))?;
//!
//! // A full exit refunds everything
//! assert_eq!(curve.refund_factor(from_ppm(200_000), U256::ZERO)?, WAD);
//! # Ok::<(), utilcurve_engine::CurveError>(())
//! ```

pub mod adaptive;
pub mod auth;
pub mod clock;
pub mod config;
pub mod curve;
pub mod error;
pub mod factory;
pub mod math;
pub mod piecewise;
pub mod static_curve;

pub use error::{CurveError, Result};

pub use adaptive::{AdaptiveCurveParams, AdaptiveLevelCurve, PlateauState};
pub use auth::UpdateAuthority;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CurveConfig;
pub use curve::{Curve, PricingCurve};
pub use math::{RoundingDirection, SECONDS_PER_DAY, WAD};
pub use piecewise::Anchor;
pub use static_curve::{StaticCurveParams, StaticJumpCurve};
