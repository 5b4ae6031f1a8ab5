//! Serializable curve configuration.
//!
//! A [`CurveConfig`] names the curve variant and carries its parameters, so a
//! whole curve can be described in JSON:
//!
//! ```json
//! {
//!   "kind": "adaptive",
//!   "low_bound": "250000000000000000",
//!   "high_bound": "750000000000000000",
//!   "zero_level": "5000000000000000",
//!   "full_level": "1000000000000000000",
//!   "initial_plateau": "100000000000000000",
//!   "daily_rate": "100000000000000000"
//! }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adaptive::{AdaptiveCurveParams, AdaptiveLevelCurve};
use crate::clock::Clock;
use crate::curve::Curve;
use crate::error::{CurveError, Result};
use crate::static_curve::{StaticCurveParams, StaticJumpCurve};

/// Parameters for one of the curve variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurveConfig {
    Static(StaticCurveParams),
    Adaptive(AdaptiveCurveParams),
}

impl CurveConfig {
    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// - [`CurveError::InvalidConfiguration`] if the JSON is malformed or
    ///   names an unknown variant. Parameter bounds are checked by
    ///   [`CurveConfig::build`].
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CurveError::InvalidConfiguration(e.to_string()))
    }

    /// Serializes the configuration to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| CurveError::InvalidConfiguration(e.to_string()))
    }

    /// Validates the parameters and constructs the curve.
    ///
    /// `clock` is only used by the adaptive variant.
    pub fn build(&self, clock: Arc<dyn Clock>) -> Result<Curve> {
        let curve = match self {
            CurveConfig::Static(params) => Curve::Static(StaticJumpCurve::new(*params)?),
            CurveConfig::Adaptive(params) => {
                Curve::Adaptive(AdaptiveLevelCurve::new(*params, clock)?)
            }
        };
        debug!(kind = self.kind(), "curve built");
        Ok(curve)
    }

    /// Variant name as it appears in JSON
    pub fn kind(&self) -> &'static str {
        match self {
            CurveConfig::Static(_) => "static",
            CurveConfig::Adaptive(_) => "adaptive",
        }
    }
}
