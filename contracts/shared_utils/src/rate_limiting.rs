//! Cooldown windows between repeated privileged actions.

use soroban_sdk::Env;

use crate::TimeUtils;

pub struct Cooldown;

impl Cooldown {
    /// Earliest timestamp at which an action last taken at `last` may repeat.
    pub fn ready_at(last: u64, period: u64) -> u64 {
        TimeUtils::deadline(last, period)
    }

    /// `true` when at least `period` seconds have passed since `last`.
    pub fn is_ready(e: &Env, last: u64, period: u64) -> bool {
        TimeUtils::elapsed_since(e, last) >= period
    }
}
