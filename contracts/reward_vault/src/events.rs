use soroban_sdk::{symbol_short, Address, Env};

pub fn distributor_registered(e: &Env, distributor: &Address, priority: u32) {
    e.events().publish(
        (symbol_short!("dist_add"), distributor.clone()),
        (priority, e.ledger().timestamp()),
    );
}

pub fn distributor_removed(e: &Env, distributor: &Address) {
    e.events().publish(
        (symbol_short!("dist_rm"), distributor.clone()),
        e.ledger().timestamp(),
    );
}

pub fn priority_changed(e: &Env, distributor: &Address, old_priority: u32, new_priority: u32) {
    e.events().publish(
        (symbol_short!("priority"), distributor.clone()),
        (old_priority, new_priority, e.ledger().timestamp()),
    );
}

pub fn disbursed(e: &Env, distributor: &Address, amount: i128) {
    e.events().publish(
        (symbol_short!("disburse"), distributor.clone()),
        (amount, e.ledger().timestamp()),
    );
}
