#![no_std]

//! Commitment teller.
//!
//! Providers deposit the principal token, lock part of it into one of the
//! configured plans, and later either withdraw principal plus bonus after
//! maturity or break the commitment early and forfeit a penalty. Bonuses are
//! drawn from the reward vault, where the teller is a registered distributor.

use shared_utils::{AccessControl, AccessError, Storage, TimeUtils, Validation};
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, log, token, Address, Env, IntoVal, Vec,
};

mod events;
pub mod ledger;
pub mod plans;
mod vault;

pub use ledger::{Commitment, CommitmentSlot, ProviderLedger, TellerTotals};
pub use plans::CommitmentPlan;
pub use vault::VaultError;

use ledger::Settlement;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidAmount = 4,
    /// Plan scale must be positive and rates non-negative
    InvalidPlan = 5,
    PlanNotFound = 6,
    PlanNotActive = 7,
    TellerNotOpen = 8,
    InsufficientFreeBalance = 9,
    /// Provider already holds a commitment to a different plan
    CommitmentMismatch = 10,
    NoCommitmentToBreak = 11,
    /// Teller is not a distributor of the vault
    UnknownDistributor = 12,
    InsufficientTreasury = 13,
    /// Vault priority cooldown has not elapsed
    TooSoon = 14,
    PriorityMustBePositive = 15,
    /// Vault call failed for a reason the teller does not surface
    VaultCallFailed = 16,
}

impl Error {
    /// Human-readable message for debugging.
    pub fn message(&self) -> &'static str {
        match self {
            Error::NotInitialized => "Teller: contract not initialized",
            Error::AlreadyInitialized => "Teller: contract already initialized",
            Error::Unauthorized => "Teller: caller is not the admin",
            Error::InvalidAmount => "Teller: amount must be greater than zero",
            Error::InvalidPlan => "Teller: invalid plan parameters",
            Error::PlanNotFound => "Teller: current index is not listed in the commitment array",
            Error::PlanNotActive => "Teller: current commitment is not active",
            Error::TellerNotOpen => "Teller: teller is not opened",
            Error::InsufficientFreeBalance => "Teller: provider hasn't got enough deposited tokens",
            Error::CommitmentMismatch => "Teller: current commitment is not same as provider's",
            Error::NoCommitmentToBreak => "Teller: no commitment to break",
            Error::UnknownDistributor => "Teller: teller is not registered in the vault",
            Error::InsufficientTreasury => "Teller: vault cannot fund the bonus",
            Error::TooSoon => "Teller: vault priority cooldown has not elapsed",
            Error::PriorityMustBePositive => "Teller: priority must be greater than zero",
            Error::VaultCallFailed => "Teller: reward vault call failed",
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

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    PrincipalToken,
    Vault,
    /// Deposit gate
    Open,
    PlanCount,
    Plan(u32),            // plan_id -> CommitmentPlan
    Ledger(Address),      // provider -> ProviderLedger
    Totals,
}

// ─── Storage helpers ──────────────────────────────────────────────────────────

fn require_initialized(e: &Env) -> Result<(), Error> {
    if !AccessControl::has_admin(e) {
        return Err(Error::NotInitialized);
    }
    Storage::extend_instance(e);
    Ok(())
}

fn read_address(e: &Env, key: &DataKey) -> Result<Address, Error> {
    e.storage()
        .instance()
        .get::<_, Address>(key)
        .ok_or(Error::NotInitialized)
}

fn read_ledger(e: &Env, provider: &Address) -> ProviderLedger {
    let key = DataKey::Ledger(provider.clone());
    match e.storage().persistent().get::<_, ProviderLedger>(&key) {
        Some(ledger) => {
            Storage::extend_persistent(e, &key);
            ledger
        }
        None => ProviderLedger::default(),
    }
}

fn write_ledger(e: &Env, provider: &Address, ledger: &ProviderLedger) {
    let key = DataKey::Ledger(provider.clone());
    e.storage().persistent().set(&key, ledger);
    Storage::extend_persistent(e, &key);
}

fn read_totals(e: &Env) -> TellerTotals {
    e.storage()
        .instance()
        .get::<_, TellerTotals>(&DataKey::Totals)
        .unwrap_or_default()
}

fn write_totals(e: &Env, totals: &TellerTotals) {
    e.storage().instance().set(&DataKey::Totals, totals);
}

fn read_open(e: &Env) -> bool {
    e.storage()
        .instance()
        .get::<_, bool>(&DataKey::Open)
        .unwrap_or(false)
}

// ─── Vault helpers ────────────────────────────────────────────────────────────

/// Confirm the vault will honour a draw of `bonus` before any state changes.
fn check_bonus_funding(e: &Env, bonus: i128) -> Result<(), Error> {
    let vault_id = read_address(e, &DataKey::Vault)?;
    let teller = e.current_contract_address();

    let mut args = Vec::new(e);
    args.push_back(teller.into_val(e));
    if !vault::call::<bool>(e, &vault_id, "is_distributor", args)? {
        return Err(Error::UnknownDistributor);
    }

    let available = vault::call::<i128>(e, &vault_id, "balance", Vec::new(e))?;
    if available < bonus {
        log!(e, "Insufficient treasury: {} < {}", available, bonus);
        return Err(Error::InsufficientTreasury);
    }
    Ok(())
}

/// Draw `settlement.bonus` from the vault and forward it to `provider`.
fn pay_bonus(e: &Env, provider: &Address, settlement: &Settlement) -> Result<(), Error> {
    if settlement.bonus <= 0 {
        return Ok(());
    }
    let vault_id = read_address(e, &DataKey::Vault)?;
    let teller = e.current_contract_address();

    let mut args = Vec::new(e);
    args.push_back(teller.clone().into_val(e));
    args.push_back(settlement.bonus.into_val(e));
    vault::call::<()>(e, &vault_id, "disburse", args)?;

    let reward_token = vault::call::<Address>(e, &vault_id, "reward_token", Vec::new(e))?;
    token::Client::new(e, &reward_token).transfer(&teller, provider, &settlement.bonus);
    Ok(())
}

/// Settle a matured commitment in memory. Checks the vault can pay the bonus
/// so that callers can persist the result before paying it.
fn settle_matured(
    e: &Env,
    ledger: &mut ProviderLedger,
    totals: &mut TellerTotals,
) -> Result<Option<Settlement>, Error> {
    let plan_id = match ledger.commitment() {
        Some(c) => c.plan_id,
        None => return Ok(None),
    };
    let plan = plans::read_plan(e, plan_id)?;
    let settlement = match ledger.settle(&plan, TimeUtils::now(e)) {
        Some(s) => s,
        None => return Ok(None),
    };
    if settlement.bonus > 0 {
        check_bonus_funding(e, settlement.bonus)?;
    }
    totals.settled(&settlement);
    Ok(Some(settlement))
}

fn finish_settlement(
    e: &Env,
    provider: &Address,
    settlement: Option<Settlement>,
) -> Result<(), Error> {
    if let Some(settlement) = settlement {
        pay_bonus(e, provider, &settlement)?;
        events::settled(e, provider, &settlement);
    }
    Ok(())
}

#[contract]
pub struct CommitmentTellerContract;

#[contractimpl]
impl CommitmentTellerContract {
    /// Initialize the teller. It starts closed with an empty plan catalog.
    pub fn initialize(
        e: Env,
        admin: Address,
        principal_token: Address,
        vault: Address,
    ) -> Result<(), Error> {
        if AccessControl::has_admin(&e) {
            return Err(Error::AlreadyInitialized);
        }
        AccessControl::set_admin(&e, &admin);
        e.storage()
            .instance()
            .set(&DataKey::PrincipalToken, &principal_token);
        e.storage().instance().set(&DataKey::Vault, &vault);
        e.storage().instance().set(&DataKey::Open, &false);
        e.storage().instance().set(&DataKey::PlanCount, &0u32);
        write_totals(&e, &TellerTotals::default());
        Storage::extend_instance(&e);
        Ok(())
    }

    // ========================================================================
    // Administration
    // ========================================================================

    /// Open or close the deposit gate. Commit, break and withdraw are not
    /// affected.
    pub fn set_open(e: Env, caller: Address, open: bool) -> Result<(), Error> {
        AccessControl::require_admin(&e, &caller)?;
        e.storage().instance().set(&DataKey::Open, &open);
        Storage::extend_instance(&e);
        events::gate_changed(&e, open);
        Ok(())
    }

    /// Append a plan to the catalog and return its id.
    pub fn add_plan(
        e: Env,
        caller: Address,
        bonus_rate: i128,
        duration: u64,
        penalty_rate: i128,
        scale: i128,
    ) -> Result<u32, Error> {
        AccessControl::require_admin(&e, &caller)?;
        let plan = plans::append_plan(&e, bonus_rate, duration, penalty_rate, scale)?;
        Storage::extend_instance(&e);
        events::plan_added(&e, &plan);
        Ok(plan.id)
    }

    /// Flip a plan between active and inactive; returns the new state.
    pub fn toggle_plan(e: Env, caller: Address, plan_id: u32) -> Result<bool, Error> {
        AccessControl::require_admin(&e, &caller)?;
        let active = plans::toggle_plan(&e, plan_id)?;
        events::plan_toggled(&e, plan_id, active);
        Ok(active)
    }

    /// Change this teller's priority in the vault. The vault only accepts the
    /// change from the distributor itself, so the teller makes the call.
    /// Vault rejections surface as `TooSoon`, `PriorityMustBePositive` or
    /// `UnknownDistributor`.
    pub fn set_vault_priority(e: Env, caller: Address, priority: u32) -> Result<(), Error> {
        AccessControl::require_admin(&e, &caller)?;
        let vault_id = read_address(&e, &DataKey::Vault)?;
        let teller = e.current_contract_address();

        let mut args = Vec::new(&e);
        args.push_back(teller.clone().into_val(&e));
        args.push_back(teller.into_val(&e));
        args.push_back(priority.into_val(&e));
        vault::call::<()>(&e, &vault_id, "change_priority", args)
    }

    // ========================================================================
    // Provider operations
    // ========================================================================

    /// Pull `amount` principal tokens from `provider` into free principal.
    /// The provider must have approved the teller as spender beforehand.
    pub fn deposit(e: Env, provider: Address, amount: i128) -> Result<(), Error> {
        require_initialized(&e)?;
        provider.require_auth();
        if !Validation::is_positive(amount) {
            return Err(Error::InvalidAmount);
        }
        if !read_open(&e) {
            return Err(Error::TellerNotOpen);
        }
        let principal_token = read_address(&e, &DataKey::PrincipalToken)?;

        // EFFECTS
        let mut ledger = read_ledger(&e, &provider);
        let mut totals = read_totals(&e);
        ledger.credit(amount);
        totals.deposited(amount);
        write_ledger(&e, &provider, &ledger);
        write_totals(&e, &totals);

        // INTERACTIONS
        let teller = e.current_contract_address();
        token::Client::new(&e, &principal_token).transfer_from(&teller, &provider, &teller, &amount);

        events::deposited(&e, &provider, amount);
        Ok(())
    }

    /// Lock `amount` of free principal into `plan_id`.
    ///
    /// A matured commitment is settled first. Adding to an open commitment
    /// requires the same plan and re-bases its start time by weight.
    ///
    /// # Errors
    /// * `PlanNotFound` - `plan_id` is outside the catalog
    /// * `PlanNotActive` - the plan is toggled off
    /// * `InsufficientFreeBalance` - `amount` exceeds free principal
    /// * `CommitmentMismatch` - an open commitment targets another plan
    pub fn commit(e: Env, provider: Address, amount: i128, plan_id: u32) -> Result<(), Error> {
        require_initialized(&e)?;
        provider.require_auth();
        if !Validation::is_positive(amount) {
            return Err(Error::InvalidAmount);
        }
        let plan = plans::read_plan(&e, plan_id)?;
        if !plan.active {
            return Err(Error::PlanNotActive);
        }

        let mut ledger = read_ledger(&e, &provider);
        let mut totals = read_totals(&e);
        let settlement = settle_matured(&e, &mut ledger, &mut totals)?;

        ledger.commit(plan_id, amount, TimeUtils::now(&e))?;
        totals.committed(amount);

        // EFFECTS
        write_ledger(&e, &provider, &ledger);
        write_totals(&e, &totals);

        // INTERACTIONS
        finish_settlement(&e, &provider, settlement)?;

        events::committed(&e, &provider, plan_id, amount, &ledger);
        Ok(())
    }

    /// Exit the provider's commitment before maturity. The penalty stays in
    /// the teller; the rest returns to free principal. Returns the refund.
    pub fn break_commitment(e: Env, provider: Address) -> Result<i128, Error> {
        require_initialized(&e)?;
        provider.require_auth();

        let mut ledger = read_ledger(&e, &provider);
        let plan_id = ledger
            .commitment()
            .map(|c| c.plan_id)
            .ok_or(Error::NoCommitmentToBreak)?;
        let plan = plans::read_plan(&e, plan_id)?;

        let forfeiture = ledger.break_commitment(&plan, TimeUtils::now(&e))?;
        let mut totals = read_totals(&e);
        totals.forfeited(&forfeiture);

        write_ledger(&e, &provider, &ledger);
        write_totals(&e, &totals);

        events::broken(&e, &provider, plan_id, &forfeiture);
        Ok(forfeiture.refund)
    }

    /// Withdraw `amount` of free principal, settling a matured commitment
    /// (principal plus bonus) first.
    ///
    /// Settlement is mandatory: while the provider holds a matured commitment
    /// whose bonus the vault cannot fund (`InsufficientTreasury`,
    /// `UnknownDistributor`), the whole withdraw fails, free principal
    /// included. The provider can withdraw again once the vault is topped up
    /// or the teller re-registered.
    pub fn withdraw(e: Env, provider: Address, amount: i128) -> Result<(), Error> {
        require_initialized(&e)?;
        provider.require_auth();
        if !Validation::is_positive(amount) {
            return Err(Error::InvalidAmount);
        }
        let principal_token = read_address(&e, &DataKey::PrincipalToken)?;

        let mut ledger = read_ledger(&e, &provider);
        let mut totals = read_totals(&e);
        let settlement = settle_matured(&e, &mut ledger, &mut totals)?;

        ledger.debit(amount)?;
        totals.withdrawn(amount);

        // EFFECTS
        write_ledger(&e, &provider, &ledger);
        write_totals(&e, &totals);

        // INTERACTIONS
        finish_settlement(&e, &provider, settlement)?;
        let teller = e.current_contract_address();
        token::Client::new(&e, &principal_token).transfer(&teller, &provider, &amount);

        events::withdrawn(&e, &provider, amount);
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn get_admin(e: Env) -> Result<Address, Error> {
        AccessControl::get_admin(&e).ok_or(Error::NotInitialized)
    }

    pub fn principal_token(e: Env) -> Result<Address, Error> {
        read_address(&e, &DataKey::PrincipalToken)
    }

    pub fn vault(e: Env) -> Result<Address, Error> {
        read_address(&e, &DataKey::Vault)
    }

    pub fn is_open(e: Env) -> bool {
        read_open(&e)
    }

    pub fn plan_count(e: Env) -> u32 {
        plans::plan_count(&e)
    }

    pub fn get_plan(e: Env, plan_id: u32) -> Result<CommitmentPlan, Error> {
        plans::read_plan(&e, plan_id)
    }

    pub fn get_ledger(e: Env, provider: Address) -> ProviderLedger {
        read_ledger(&e, &provider)
    }

    /// Whether the provider's commitment has reached maturity.
    pub fn is_matured(e: Env, provider: Address) -> Result<bool, Error> {
        match read_ledger(&e, &provider).slot {
            CommitmentSlot::Locked(c) => {
                let plan = plans::read_plan(&e, c.plan_id)?;
                Ok(c.is_matured(&plan, TimeUtils::now(&e)))
            }
            CommitmentSlot::Empty => Ok(false),
        }
    }

    /// Bonus the provider's current commitment pays at maturity.
    pub fn pending_bonus(e: Env, provider: Address) -> Result<i128, Error> {
        match read_ledger(&e, &provider).slot {
            CommitmentSlot::Locked(c) => Ok(plans::read_plan(&e, c.plan_id)?.bonus_for(c.principal)),
            CommitmentSlot::Empty => Ok(0),
        }
    }

    pub fn get_totals(e: Env) -> TellerTotals {
        read_totals(&e)
    }
}
