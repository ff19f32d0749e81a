#![no_std]

//! Reward vault.
//!
//! Holds the reward token and keeps the registry of distributors (teller
//! contracts) allowed to draw from it. Each distributor carries a priority
//! that only the distributor itself may change, at most once per
//! [`PRIORITY_COOLDOWN`].

use shared_utils::{
    AccessControl, AccessError, Cooldown, Storage, TimeUtils, Validation,
};
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, log, token, Address, Env,
};

mod events;


/// Minimum spacing between two priority changes of the same distributor.
pub const PRIORITY_COOLDOWN: u64 = 7 * 24 * 60 * 60;

// ============================================================================
// Error Types
// ============================================================================

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    /// Contract has not been initialized
    NotInitialized = 1,
    /// Contract has already been initialized
    AlreadyInitialized = 2,
    /// Caller is not the admin
    Unauthorized = 3,
    /// Amount must be greater than zero
    InvalidAmount = 4,
    /// Address is an account, not a contract
    NotAContract = 5,
    PriorityMustBePositive = 6,
    AlreadyRegistered = 7,
    /// Only a distributor may change its own priority
    CallerIsNotDistributor = 8,
    UnknownDistributor = 9,
    /// Priority cooldown has not elapsed
    TooSoon = 10,
    InsufficientTreasury = 11,
}

impl Error {
    pub fn message(&self) -> &'static str {
        match self {
            Error::NotInitialized => "Vault: contract not initialized",
            Error::AlreadyInitialized => "Vault: contract already initialized",
            Error::Unauthorized => "Vault: caller is not the admin",
            Error::InvalidAmount => "Vault: amount must be greater than zero",
            Error::NotAContract => "Vault: address is not a contract address",
            Error::PriorityMustBePositive => "Vault: priority should be more than zero",
            Error::AlreadyRegistered => "Vault: distributor is already registered",
            Error::CallerIsNotDistributor => "Vault: caller is not the distributor",
            Error::UnknownDistributor => "Vault: distributor is not registered",
            Error::TooSoon => "Vault: not time to change the priority",
            Error::InsufficientTreasury => "Vault: not enough reward tokens",
        }
    }
}

impl From<AccessError> for Error {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::NotInitialized => Error::NotInitialized,
            AccessError::Unauthorized => Error::Unauthorized,
        }
    }
}

// ============================================================================
// Data Types
// ============================================================================

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DistributorRecord {
    pub priority: u32,
    pub last_priority_change_at: u64,
}

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    /// Reward token contract address
    RewardToken,
    /// Distributor registry (distributor -> DistributorRecord)
    Distributor(Address),
}

// ============================================================================
// Storage helpers
// ============================================================================

fn read_distributor(e: &Env, distributor: &Address) -> Option<DistributorRecord> {
    let key = DataKey::Distributor(distributor.clone());
    let record = e.storage().persistent().get::<_, DistributorRecord>(&key);
    if record.is_some() {
        Storage::extend_persistent(e, &key);
    }
    record
}

fn write_distributor(e: &Env, distributor: &Address, record: &DistributorRecord) {
    let key = DataKey::Distributor(distributor.clone());
    e.storage().persistent().set(&key, record);
    Storage::extend_persistent(e, &key);
}

fn read_reward_token(e: &Env) -> Result<Address, Error> {
    e.storage()
        .instance()
        .get::<_, Address>(&DataKey::RewardToken)
        .ok_or(Error::NotInitialized)
}

fn require_contract(e: &Env, address: &Address) -> Result<(), Error> {
    if !Validation::is_contract_address(e, address) {
        log!(e, "rejecting non-contract distributor {}", address);
        return Err(Error::NotAContract);
    }
    Ok(())
}

fn require_priority(priority: u32) -> Result<(), Error> {
    if priority == 0 {
        return Err(Error::PriorityMustBePositive);
    }
    Ok(())
}

// ============================================================================
// Contract Implementation
// ============================================================================

#[contract]
pub struct RewardVaultContract;

#[contractimpl]
impl RewardVaultContract {
    /// Initialize the vault with its admin and the reward token it pays out.
    pub fn initialize(e: Env, admin: Address, reward_token: Address) -> Result<(), Error> {
        if AccessControl::has_admin(&e) {
            return Err(Error::AlreadyInitialized);
        }
        AccessControl::set_admin(&e, &admin);
        e.storage()
            .instance()
            .set(&DataKey::RewardToken, &reward_token);
        Storage::extend_instance(&e);
        Ok(())
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Register a distributor contract. Admin only.
    ///
    /// # Errors
    /// * `NotAContract` - `distributor` is an account address
    /// * `PriorityMustBePositive` - `priority` is zero
    /// * `AlreadyRegistered` - `distributor` is already in the registry
    pub fn register_distributor(
        e: Env,
        caller: Address,
        distributor: Address,
        priority: u32,
    ) -> Result<(), Error> {
        AccessControl::require_admin(&e, &caller)?;
        require_contract(&e, &distributor)?;
        require_priority(priority)?;
        if read_distributor(&e, &distributor).is_some() {
            return Err(Error::AlreadyRegistered);
        }

        let record = DistributorRecord {
            priority,
            last_priority_change_at: TimeUtils::now(&e),
        };
        write_distributor(&e, &distributor, &record);
        Storage::extend_instance(&e);

        events::distributor_registered(&e, &distributor, priority);
        Ok(())
    }

    /// Remove a distributor from the registry. Admin only.
    pub fn remove_distributor(e: Env, caller: Address, distributor: Address) -> Result<(), Error> {
        AccessControl::require_admin(&e, &caller)?;
        if read_distributor(&e, &distributor).is_none() {
            return Err(Error::UnknownDistributor);
        }
        e.storage()
            .persistent()
            .remove(&DataKey::Distributor(distributor.clone()));

        events::distributor_removed(&e, &distributor);
        Ok(())
    }

    /// Change a distributor's priority. Only the distributor itself may call
    /// this, and only once per [`PRIORITY_COOLDOWN`].
    ///
    /// # Errors
    /// * `NotAContract` - `distributor` is an account address
    /// * `PriorityMustBePositive` - `new_priority` is zero
    /// * `CallerIsNotDistributor` - `caller` differs from `distributor`
    /// * `UnknownDistributor` - `distributor` is not registered
    /// * `TooSoon` - the previous change was less than a cooldown ago
    pub fn change_priority(
        e: Env,
        caller: Address,
        distributor: Address,
        new_priority: u32,
    ) -> Result<(), Error> {
        caller.require_auth();
        require_contract(&e, &distributor)?;
        require_priority(new_priority)?;
        if caller != distributor {
            return Err(Error::CallerIsNotDistributor);
        }

        let mut record = read_distributor(&e, &distributor).ok_or(Error::UnknownDistributor)?;
        if !Cooldown::is_ready(&e, record.last_priority_change_at, PRIORITY_COOLDOWN) {
            log!(
                &e,
                "priority change too soon, ready at {}",
                Cooldown::ready_at(record.last_priority_change_at, PRIORITY_COOLDOWN)
            );
            return Err(Error::TooSoon);
        }

        let old_priority = record.priority;
        record.priority = new_priority;
        record.last_priority_change_at = TimeUtils::now(&e);
        write_distributor(&e, &distributor, &record);

        events::priority_changed(&e, &distributor, old_priority, new_priority);
        Ok(())
    }

    // ========================================================================
    // Funding
    // ========================================================================

    /// Pay `amount` reward tokens to a registered distributor. The
    /// distributor must authorize the draw; there is no partial fill.
    ///
    /// # Errors
    /// * `InvalidAmount` - `amount` is not positive
    /// * `UnknownDistributor` - `distributor` is not registered
    /// * `InsufficientTreasury` - the vault holds less than `amount`
    pub fn disburse(e: Env, distributor: Address, amount: i128) -> Result<(), Error> {
        distributor.require_auth();
        if !Validation::is_positive(amount) {
            return Err(Error::InvalidAmount);
        }
        if read_distributor(&e, &distributor).is_none() {
            return Err(Error::UnknownDistributor);
        }

        let token_client = token::Client::new(&e, &read_reward_token(&e)?);
        let vault_address = e.current_contract_address();
        let available = token_client.balance(&vault_address);
        if available < amount {
            log!(&e, "Insufficient treasury: {} < {}", available, amount);
            return Err(Error::InsufficientTreasury);
        }

        token_client.transfer(&vault_address, &distributor, &amount);
        Storage::extend_instance(&e);

        events::disbursed(&e, &distributor, amount);
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn get_admin(e: Env) -> Result<Address, Error> {
        AccessControl::get_admin(&e).ok_or(Error::NotInitialized)
    }

    pub fn reward_token(e: Env) -> Result<Address, Error> {
        read_reward_token(&e)
    }

    /// Reward tokens currently held by the vault.
    pub fn balance(e: Env) -> Result<i128, Error> {
        let token_client = token::Client::new(&e, &read_reward_token(&e)?);
        Ok(token_client.balance(&e.current_contract_address()))
    }

    pub fn is_distributor(e: Env, distributor: Address) -> bool {
        read_distributor(&e, &distributor).is_some()
    }

    pub fn get_distributor(e: Env, distributor: Address) -> Result<DistributorRecord, Error> {
        read_distributor(&e, &distributor).ok_or(Error::UnknownDistributor)
    }

    /// Earliest timestamp at which `distributor` may change its priority.
    pub fn next_priority_change_at(e: Env, distributor: Address) -> Result<u64, Error> {
        let record = read_distributor(&e, &distributor).ok_or(Error::UnknownDistributor)?;
        Ok(Cooldown::ready_at(
            record.last_priority_change_at,
            PRIORITY_COOLDOWN,
        ))
    }
}
