//! Single-writer registration for curve state updates.
//!
//! The first caller to register with a curve is bound to it permanently and
//! receives an [`UpdateAuthority`]. Only that handle, presented back to the
//! same curve, permits `update`.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::Address;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{CurveError, Result};

static NEXT_CURVE_ID: AtomicU64 = AtomicU64::new(1);

/// Capability handle issued by [`CallerRegistry::register`].
///
/// A handle is bound to the curve instance that issued it; presenting it to
/// any other curve is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateAuthority {
    curve_id: u64,
    caller: Address,
}

impl UpdateAuthority {
    /// The caller this handle was issued to
    pub fn caller(&self) -> Address {
        self.caller
    }
}

/// Binds exactly one caller to a curve.
#[derive(Debug)]
pub struct CallerRegistry {
    curve_id: u64,
    registered: Mutex<Option<Address>>,
}

impl Default for CallerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CallerRegistry {
    /// Create an empty registry with a process-unique curve identity
    pub fn new() -> Self {
        Self {
            curve_id: NEXT_CURVE_ID.fetch_add(1, Ordering::Relaxed),
            registered: Mutex::new(None),
        }
    }

    /// Returns the registered caller, if any
    pub fn registered(&self) -> Option<Address> {
        *self.registered.lock()
    }

    /// Binds `caller` on first use.
    ///
    /// Registering the already-bound caller again succeeds and returns an
    /// equivalent handle.
    ///
    /// # Errors
    ///
    /// - [`CurveError::SetAlreadyRegistered`] if a different caller is bound
    pub fn register(&self, caller: Address) -> Result<UpdateAuthority> {
        let mut registered = self.registered.lock();
        match *registered {
            Some(existing) if existing != caller => {
                warn!(%existing, %caller, "rejected conflicting registration");
                Err(CurveError::SetAlreadyRegistered {
                    registered: existing,
                    caller,
                })
            }
            Some(_) => Ok(self.issue(caller)),
            None => {
                *registered = Some(caller);
                debug!(%caller, curve_id = self.curve_id, "caller registered");
                Ok(self.issue(caller))
            }
        }
    }

    /// Checks that `authority` was issued by this registry to the bound caller.
    ///
    /// # Errors
    ///
    /// - [`CurveError::Unauthorized`] otherwise
    pub fn authorize(&self, authority: &UpdateAuthority) -> Result<()> {
        let bound = self.registered() == Some(authority.caller);
        if authority.curve_id != self.curve_id || !bound {
            warn!(caller = %authority.caller, "rejected unauthorized update");
            return Err(CurveError::Unauthorized {
                caller: authority.caller,
            });
        }
        Ok(())
    }

    fn issue(&self, caller: Address) -> UpdateAuthority {
        UpdateAuthority {
            curve_id: self.curve_id,
            caller,
        }
    }
}
