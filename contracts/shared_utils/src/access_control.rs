//! Single-admin access control backed by instance storage.

use soroban_sdk::{symbol_short, Address, Env, Symbol};

pub const ADMIN_KEY: Symbol = symbol_short!("ADMIN");

/// Failures reported by [`AccessControl::require_admin`]. Contracts convert
/// these into their own error enums.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AccessError {
    NotInitialized,
    Unauthorized,
}

pub struct AccessControl;

impl AccessControl {
    pub fn has_admin(e: &Env) -> bool {
        e.storage().instance().has(&ADMIN_KEY)
    }

    pub fn set_admin(e: &Env, admin: &Address) {
        e.storage().instance().set(&ADMIN_KEY, admin);
    }

    pub fn get_admin(e: &Env) -> Option<Address> {
        e.storage().instance().get::<_, Address>(&ADMIN_KEY)
    }

    /// Require that `caller` signed the invocation and is the stored admin.
    pub fn require_admin(e: &Env, caller: &Address) -> Result<(), AccessError> {
        caller.require_auth();
        let admin = Self::get_admin(e).ok_or(AccessError::NotInitialized)?;
        if *caller != admin {
            return Err(AccessError::Unauthorized);
        }
        Ok(())
    }
}
