use soroban_sdk::{symbol_short, Address, Env};

use crate::ledger::{Forfeiture, ProviderLedger, Settlement};
use crate::plans::CommitmentPlan;

pub fn gate_changed(e: &Env, open: bool) {
    e.events()
        .publish((symbol_short!("gate"),), (open, e.ledger().timestamp()));
}

pub fn plan_added(e: &Env, plan: &CommitmentPlan) {
    e.events().publish(
        (symbol_short!("plan_add"), plan.id),
        (plan.bonus_rate, plan.duration, plan.penalty_rate, plan.scale),
    );
}

pub fn plan_toggled(e: &Env, plan_id: u32, active: bool) {
    e.events()
        .publish((symbol_short!("plan_tgl"), plan_id), active);
}

pub fn deposited(e: &Env, provider: &Address, amount: i128) {
    e.events().publish(
        (symbol_short!("deposit"), provider.clone()),
        (amount, e.ledger().timestamp()),
    );
}

pub fn committed(e: &Env, provider: &Address, plan_id: u32, amount: i128, ledger: &ProviderLedger) {
    let (principal, started_at) = ledger
        .commitment()
        .map(|c| (c.principal, c.started_at))
        .unwrap_or((0, 0));
    e.events().publish(
        (symbol_short!("commit"), provider.clone(), plan_id),
        (amount, principal, started_at),
    );
}

pub fn broken(e: &Env, provider: &Address, plan_id: u32, forfeiture: &Forfeiture) {
    e.events().publish(
        (symbol_short!("break"), provider.clone(), plan_id),
        (forfeiture.penalty, forfeiture.refund, e.ledger().timestamp()),
    );
}

pub fn settled(e: &Env, provider: &Address, settlement: &Settlement) {
    e.events().publish(
        (symbol_short!("settled"), provider.clone(), settlement.plan_id),
        (settlement.principal, settlement.bonus, e.ledger().timestamp()),
    );
}

pub fn withdrawn(e: &Env, provider: &Address, amount: i128) {
    e.events().publish(
        (symbol_short!("withdraw"), provider.clone()),
        (amount, e.ledger().timestamp()),
    );
}
