//! Per-provider accounting.
//!
//! A provider holds free principal (withdrawable) and at most one commitment.
//! The methods here only touch the in-memory record; the contract decides when
//! to persist it and when to move tokens.

use shared_utils::{SafeMath, TimeUtils};
use soroban_sdk::contracttype;

use crate::plans::CommitmentPlan;
use crate::Error;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Commitment {
    pub plan_id: u32,
    pub principal: i128,
    pub started_at: u64,
}

impl Commitment {
    pub fn matures_at(&self, plan: &CommitmentPlan) -> u64 {
        TimeUtils::deadline(self.started_at, plan.duration)
    }

    pub fn is_matured(&self, plan: &CommitmentPlan, now: u64) -> bool {
        now >= self.matures_at(plan)
    }
}

/// Stored form of a provider's single commitment.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CommitmentSlot {
    Empty,
    Locked(Commitment),
}

impl Default for CommitmentSlot {
    fn default() -> Self {
        CommitmentSlot::Empty
    }
}

impl CommitmentSlot {
    pub fn as_option(&self) -> Option<&Commitment> {
        match self {
            CommitmentSlot::Empty => None,
            CommitmentSlot::Locked(c) => Some(c),
        }
    }
}

impl From<Option<Commitment>> for CommitmentSlot {
    fn from(commitment: Option<Commitment>) -> Self {
        match commitment {
            Some(c) => CommitmentSlot::Locked(c),
            None => CommitmentSlot::Empty,
        }
    }
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProviderLedger {
    pub free_principal: i128,
    pub slot: CommitmentSlot,
}

/// Outcome of breaking a commitment before maturity.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Forfeiture {
    pub principal: i128,
    pub penalty: i128,
    pub refund: i128,
}

/// Outcome of folding a matured commitment back into free principal.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settlement {
    pub plan_id: u32,
    pub principal: i128,
    pub bonus: i128,
}

impl ProviderLedger {
    pub fn commitment(&self) -> Option<&Commitment> {
        self.slot.as_option()
    }

    fn set_commitment(&mut self, commitment: Option<Commitment>) {
        self.slot = commitment.into();
    }

    pub fn credit(&mut self, amount: i128) {
        self.free_principal = SafeMath::add(self.free_principal, amount);
    }

    pub fn debit(&mut self, amount: i128) -> Result<(), Error> {
        if amount > self.free_principal {
            return Err(Error::InsufficientFreeBalance);
        }
        self.free_principal = SafeMath::sub(self.free_principal, amount);
        Ok(())
    }

    /// Move `amount` of free principal into the commitment for `plan_id`.
    ///
    /// A second commit to the same plan re-bases the start time to the
    /// principal-weighted average of the old start and `now`:
    /// `start + (now - start) * amount / (principal + amount)`.
    pub fn commit(&mut self, plan_id: u32, amount: i128, now: u64) -> Result<(), Error> {
        if amount > self.free_principal {
            return Err(Error::InsufficientFreeBalance);
        }
        let next = match self.commitment() {
            None => Commitment {
                plan_id,
                principal: amount,
                started_at: now,
            },
            Some(existing) if existing.plan_id != plan_id => {
                return Err(Error::CommitmentMismatch);
            }
            Some(existing) => {
                let principal = SafeMath::add(existing.principal, amount);
                let elapsed = now.saturating_sub(existing.started_at) as i128;
                let shift = SafeMath::mul_div(elapsed, amount, principal) as u64;
                Commitment {
                    plan_id,
                    principal,
                    started_at: existing.started_at + shift,
                }
            }
        };

        self.debit(amount)?;
        self.set_commitment(Some(next));
        Ok(())
    }

    /// Exit a locked commitment early, keeping `principal - penalty` as free
    /// principal. Matured commitments have nothing to forfeit and cannot be
    /// broken.
    pub fn break_commitment(
        &mut self,
        plan: &CommitmentPlan,
        now: u64,
    ) -> Result<Forfeiture, Error> {
        let commitment = match self.commitment() {
            Some(c) if !c.is_matured(plan, now) => c.clone(),
            _ => return Err(Error::NoCommitmentToBreak),
        };

        let penalty = plan.penalty_for(commitment.principal);
        let refund = SafeMath::sub(commitment.principal, penalty);
        self.set_commitment(None);
        self.credit(refund);

        Ok(Forfeiture {
            principal: commitment.principal,
            penalty,
            refund,
        })
    }

    /// Fold a matured commitment into free principal. Returns `None` while the
    /// commitment is still locked or when there is none.
    pub fn settle(&mut self, plan: &CommitmentPlan, now: u64) -> Option<Settlement> {
        let commitment = match self.commitment() {
            Some(c) if c.is_matured(plan, now) => c.clone(),
            _ => return None,
        };

        self.set_commitment(None);
        self.credit(commitment.principal);

        Some(Settlement {
            plan_id: commitment.plan_id,
            principal: commitment.principal,
            bonus: plan.bonus_for(commitment.principal),
        })
    }
}

/// Aggregates across all providers. Together they account for every
/// principal token the teller holds:
/// `balance == free + committed + retained`.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TellerTotals {
    pub free: i128,
    pub committed: i128,
    /// Penalties kept from broken commitments
    pub retained: i128,
}

impl TellerTotals {
    pub fn deposited(&mut self, amount: i128) {
        self.free = SafeMath::add(self.free, amount);
    }

    pub fn committed(&mut self, amount: i128) {
        self.free = SafeMath::sub(self.free, amount);
        self.committed = SafeMath::add(self.committed, amount);
    }

    pub fn forfeited(&mut self, forfeiture: &Forfeiture) {
        self.committed = SafeMath::sub(self.committed, forfeiture.principal);
        self.free = SafeMath::add(self.free, forfeiture.refund);
        self.retained = SafeMath::add(self.retained, forfeiture.penalty);
    }

    pub fn settled(&mut self, settlement: &Settlement) {
        self.committed = SafeMath::sub(self.committed, settlement.principal);
        self.free = SafeMath::add(self.free, settlement.principal);
    }

    pub fn withdrawn(&mut self, amount: i128) {
        self.free = SafeMath::sub(self.free, amount);
    }

    pub fn custodied(&self) -> i128 {
        SafeMath::add(SafeMath::add(self.free, self.committed), self.retained)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = 86_400;

    fn plan(bonus_rate: i128, duration: u64, penalty_rate: i128, scale: i128) -> CommitmentPlan {
        CommitmentPlan {
            id: 0,
            bonus_rate,
            duration,
            penalty_rate,
            scale,
            active: true,
        }
    }

    fn funded(amount: i128) -> ProviderLedger {
        let mut ledger = ProviderLedger::default();
        ledger.credit(amount);
        ledger
    }

    #[test]
    fn test_commit_folds_same_plan() {
        let mut ledger = funded(1000);
        ledger.commit(0, 100, 1_000).unwrap();
        ledger.commit(0, 100, 1_000).unwrap();

        assert_eq!(ledger.free_principal, 800);
        let c = ledger.commitment().cloned().unwrap();
        assert_eq!(c.principal, 200);
        assert_eq!(c.started_at, 1_000);

        assert_eq!(ledger.commit(0, 900, 1_000), Err(Error::InsufficientFreeBalance));
        assert_eq!(ledger.free_principal, 800);
    }

    #[test]
    fn test_commit_rebases_start_by_weight() {
        let mut ledger = funded(1000);
        ledger.commit(0, 300, 0).unwrap();
        // 100 more after 4 days: start moves by 4d * 100 / 400 = 1 day.
        ledger.commit(0, 100, 4 * DAY).unwrap();

        let c = ledger.commitment().cloned().unwrap();
        assert_eq!(c.principal, 400);
        assert_eq!(c.started_at, DAY);
    }

    #[test]
    fn test_commit_to_other_plan_is_rejected() {
        let mut ledger = funded(1000);
        ledger.commit(0, 100, 0).unwrap();
        let before = ledger.clone();

        assert_eq!(ledger.commit(1, 100, 10), Err(Error::CommitmentMismatch));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_break_refunds_minus_penalty() {
        let p = plan(500, 7 * DAY, 100, 1000);
        let mut ledger = funded(300);
        ledger.commit(0, 300, 0).unwrap();

        let f = ledger.break_commitment(&p, DAY).unwrap();
        assert_eq!(f, Forfeiture { principal: 300, penalty: 30, refund: 270 });
        assert_eq!(ledger.free_principal, 270);
        assert!(ledger.commitment().is_none());

        assert_eq!(ledger.break_commitment(&p, DAY), Err(Error::NoCommitmentToBreak));
    }

    #[test]
    fn test_break_at_maturity_is_rejected() {
        let p = plan(500, 7 * DAY, 100, 1000);
        let mut ledger = funded(100);
        ledger.commit(0, 100, 50).unwrap();

        assert_eq!(
            ledger.break_commitment(&p, 50 + 7 * DAY),
            Err(Error::NoCommitmentToBreak)
        );
        let f = ledger.break_commitment(&p, 50 + 7 * DAY - 1).unwrap();
        assert_eq!(f.penalty, 10);
    }

    #[test]
    fn test_penalty_is_capped_at_principal() {
        let p = plan(0, DAY, 3, 2);
        let mut ledger = funded(100);
        ledger.commit(0, 100, 0).unwrap();

        let f = ledger.break_commitment(&p, 0).unwrap();
        assert_eq!(f.penalty, 100);
        assert_eq!(f.refund, 0);
    }

    #[test]
    fn test_settle_only_after_maturity() {
        let p = plan(500, 7 * DAY, 100, 1000);
        let mut ledger = funded(200);
        ledger.commit(0, 200, 0).unwrap();

        assert_eq!(ledger.settle(&p, 7 * DAY - 1), None);
        let s = ledger.settle(&p, 7 * DAY).unwrap();
        assert_eq!(s, Settlement { plan_id: 0, principal: 200, bonus: 100 });
        assert_eq!(ledger.free_principal, 200);
        assert!(ledger.commitment().is_none());
        assert_eq!(ledger.settle(&p, 8 * DAY), None);
    }

    #[test]
    fn test_totals_track_every_transition() {
        let mut totals = TellerTotals::default();
        totals.deposited(1000);
        totals.committed(300);
        totals.forfeited(&Forfeiture { principal: 300, penalty: 30, refund: 270 });
        totals.committed(200);
        totals.settled(&Settlement { plan_id: 0, principal: 200, bonus: 100 });
        totals.withdrawn(500);

        assert_eq!(totals.committed, 0);
        assert_eq!(totals.retained, 30);
        assert_eq!(totals.free, 470);
        assert_eq!(totals.custodied(), 500);
    }
}
