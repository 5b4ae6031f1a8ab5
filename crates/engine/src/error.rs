//! Error types for the curve engine.

use alloy_primitives::{Address, U256};
use thiserror::Error;

/// Errors returned by curve construction, price queries and state updates.
///
/// Every variant is a deterministic function of the inputs. No operation that
/// returns an error leaves a partial mutation behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurveError {
    /// Construction parameters are out of range or mis-ordered
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The queried utilization interval is reversed or exceeds the curve's ceiling
    #[error("Invalid utilization interval: from {from} to {to}")]
    InvalidUtilization { from: U256, to: U256 },

    /// An update was attempted without the registered caller's authority
    #[error("Unauthorized update from {caller}")]
    Unauthorized { caller: Address },

    /// A different caller is already bound to the curve
    #[error("Curve already registered to {registered}, rejected {caller}")]
    SetAlreadyRegistered { registered: Address, caller: Address },

    /// The clock reported a time before the last committed update
    #[error("Clock regression: now {now} is before last update {last_update}")]
    ClockRegression { now: u64, last_update: u64 },

    /// An intermediate value exceeded 256 bits
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,
}

/// Result type alias for curve operations.
pub type Result<T> = std::result::Result<T, CurveError>;
