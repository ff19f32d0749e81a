//! Append-only catalog of commitment plans.
//!
//! Plans are never removed or renumbered; only their `active` flag changes.

use shared_utils::{SafeMath, Storage};
use soroban_sdk::{contracttype, Env};

use crate::{DataKey, Error};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CommitmentPlan {
    pub id: u32,
    /// Bonus paid at maturity, as `bonus_rate / scale` of the principal
    pub bonus_rate: i128,
    /// Lock duration in seconds
    pub duration: u64,
    /// Forfeited on early exit, as `penalty_rate / scale` of the principal
    pub penalty_rate: i128,
    pub scale: i128,
    pub active: bool,
}

impl CommitmentPlan {
    pub fn bonus_for(&self, principal: i128) -> i128 {
        SafeMath::apply_rate(principal, self.bonus_rate, self.scale)
    }

    pub fn penalty_for(&self, principal: i128) -> i128 {
        SafeMath::capped_rate(principal, self.penalty_rate, self.scale)
    }
}

pub fn plan_count(e: &Env) -> u32 {
    e.storage()
        .instance()
        .get::<_, u32>(&DataKey::PlanCount)
        .unwrap_or(0)
}

pub fn read_plan(e: &Env, plan_id: u32) -> Result<CommitmentPlan, Error> {
    if plan_id >= plan_count(e) {
        return Err(Error::PlanNotFound);
    }
    let key = DataKey::Plan(plan_id);
    let plan = e
        .storage()
        .persistent()
        .get::<_, CommitmentPlan>(&key)
        .ok_or(Error::PlanNotFound)?;
    Storage::extend_persistent(e, &key);
    Ok(plan)
}

fn write_plan(e: &Env, plan: &CommitmentPlan) {
    let key = DataKey::Plan(plan.id);
    e.storage().persistent().set(&key, plan);
    Storage::extend_persistent(e, &key);
}

/// Append a new active plan and return its id.
pub fn append_plan(
    e: &Env,
    bonus_rate: i128,
    duration: u64,
    penalty_rate: i128,
    scale: i128,
) -> Result<CommitmentPlan, Error> {
    if scale <= 0 || bonus_rate < 0 || penalty_rate < 0 {
        return Err(Error::InvalidPlan);
    }

    let id = plan_count(e);
    let plan = CommitmentPlan {
        id,
        bonus_rate,
        duration,
        penalty_rate,
        scale,
        active: true,
    };
    write_plan(e, &plan);
    e.storage().instance().set(&DataKey::PlanCount, &(id + 1));
    Ok(plan)
}

/// Flip a plan's `active` flag and return the new value.
pub fn toggle_plan(e: &Env, plan_id: u32) -> Result<bool, Error> {
    let mut plan = read_plan(e, plan_id)?;
    plan.active = !plan.active;
    write_plan(e, &plan);
    Ok(plan.active)
}
