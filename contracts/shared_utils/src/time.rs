use soroban_sdk::Env;

pub struct TimeUtils;

impl TimeUtils {
    /// Current ledger timestamp in seconds.
    pub fn now(e: &Env) -> u64 {
        e.ledger().timestamp()
    }

    /// `start + duration`, saturating instead of wrapping.
    pub fn deadline(start: u64, duration: u64) -> u64 {
        start.saturating_add(duration)
    }

    pub fn elapsed_since(e: &Env, since: u64) -> u64 {
        Self::now(e).saturating_sub(since)
    }
}
