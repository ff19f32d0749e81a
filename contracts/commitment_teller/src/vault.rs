//! Calls into the reward vault.
//!
//! The vault reports failures with its own error codes, which overlap
//! numerically with the teller's. Every call goes through `try_invoke_contract`
//! so a vault code is decoded as a [`VaultError`] and then mapped onto the
//! teller error with the same meaning.

use soroban_sdk::{contracterror, Address, Env, Symbol, TryFromVal, Val, Vec};

use crate::Error;

/// Error codes returned by the reward vault.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum VaultError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidAmount = 4,
    NotAContract = 5,
    PriorityMustBePositive = 6,
    AlreadyRegistered = 7,
    CallerIsNotDistributor = 8,
    UnknownDistributor = 9,
    TooSoon = 10,
    InsufficientTreasury = 11,
}

impl From<VaultError> for Error {
    fn from(err: VaultError) -> Self {
        match err {
            VaultError::InvalidAmount => Error::InvalidAmount,
            VaultError::PriorityMustBePositive => Error::PriorityMustBePositive,
            VaultError::CallerIsNotDistributor | VaultError::UnknownDistributor => {
                Error::UnknownDistributor
            }
            VaultError::TooSoon => Error::TooSoon,
            VaultError::InsufficientTreasury => Error::InsufficientTreasury,
            VaultError::NotInitialized
            | VaultError::AlreadyInitialized
            | VaultError::Unauthorized
            | VaultError::NotAContract
            | VaultError::AlreadyRegistered => Error::VaultCallFailed,
        }
    }
}

/// Invoke `function` on the vault. Vault errors come back as teller errors;
/// host failures and undecodable results become `VaultCallFailed`.
pub fn call<T>(e: &Env, vault: &Address, function: &str, args: Vec<Val>) -> Result<T, Error>
where
    T: TryFromVal<Env, Val>,
{
    match e.try_invoke_contract::<T, VaultError>(vault, &Symbol::new(e, function), args) {
        Ok(Ok(value)) => Ok(value),
        Err(Ok(err)) => Err(err.into()),
        _ => Err(Error::VaultCallFailed),
    }
}
