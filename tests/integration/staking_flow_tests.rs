// Cross-contract staking flows: many providers interleaving deposit, commit,
// break and withdraw against one teller funded by one vault.

use commitment_teller::{
    CommitmentTellerContract, CommitmentTellerContractClient, Error as TellerError,
};
use reward_vault::{Error as VaultError, RewardVaultContract, RewardVaultContractClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token::{StellarAssetClient, TokenClient},
    Address, Env,
};

const DAY: u64 = 86_400;
const WEEK: u64 = 7 * DAY;
const YEAR: u64 = 365 * DAY;
const START: u64 = 1_700_000_000;
const E18: i128 = 1_000_000_000_000_000_000;
// Rates are expressed against 1_000e18
const SCALE: i128 = 1_000 * E18;
const VAULT_FUNDING: i128 = 1_000_000;

struct StakingFixture {
    env: Env,
    admin: Address,
    lp: TokenClient<'static>,
    lp_admin: StellarAssetClient<'static>,
    reward: TokenClient<'static>,
    vault: RewardVaultContractClient<'static>,
    teller: CommitmentTellerContractClient<'static>,
    weekly: u32,
    yearly: u32,
}

impl StakingFixture {
    fn setup() -> Self {
        let env = Env::default();
        env.mock_all_auths();
        env.budget().reset_unlimited();
        env.ledger().with_mut(|l| l.timestamp = START);

        let admin = Address::generate(&env);

        // Deploy tokens
        let lp_id = env.register_stellar_asset_contract(admin.clone());
        let reward_id = env.register_stellar_asset_contract(admin.clone());
        let lp = TokenClient::new(&env, &lp_id);
        let lp_admin = StellarAssetClient::new(&env, &lp_id);
        let reward = TokenClient::new(&env, &reward_id);
        let reward_admin = StellarAssetClient::new(&env, &reward_id);

        // Deploy Vault contract
        let vault_id = env.register_contract(None, RewardVaultContract);
        let vault = RewardVaultContractClient::new(&env, &vault_id);
        vault.initialize(&admin, &reward_id);

        // Deploy Teller contract
        let teller_id = env.register_contract(None, CommitmentTellerContract);
        let teller = CommitmentTellerContractClient::new(&env, &teller_id);
        teller.initialize(&admin, &lp_id, &vault_id);

        vault.register_distributor(&admin, &teller_id, &10);
        reward_admin.mint(&vault_id, &VAULT_FUNDING);

        // Bonus: 50%, duration: 1 week, penalty: 10%
        let weekly = teller.add_plan(&admin, &(500 * E18), &WEEK, &(100 * E18), &SCALE);
        // Bonus: 70%, duration: 1 year, penalty: 20%
        let yearly = teller.add_plan(&admin, &(700 * E18), &YEAR, &(200 * E18), &SCALE);
        teller.set_open(&admin, &true);

        StakingFixture {
            env,
            admin,
            lp,
            lp_admin,
            reward,
            vault,
            teller,
            weekly,
            yearly,
        }
    }

    fn provider(&self, funds: i128) -> Address {
        let provider = Address::generate(&self.env);
        self.lp_admin.mint(&provider, &funds);
        self.lp
            .approve(&provider, &self.teller.address, &funds, &200_000);
        provider
    }

    fn advance(&self, seconds: u64) {
        self.env.ledger().with_mut(|l| l.timestamp += seconds);
    }

    /// Sum of every provider's free and committed principal.
    fn ledger_sum(&self, providers: &[Address]) -> i128 {
        providers
            .iter()
            .map(|p| {
                let ledger = self.teller.get_ledger(p);
                ledger.free_principal + ledger.commitment().map(|c| c.principal).unwrap_or(0)
            })
            .sum()
    }

    fn assert_conserved(&self, providers: &[Address]) {
        let totals = self.teller.get_totals();
        let held = self.lp.balance(&self.teller.address);
        assert_eq!(held, totals.custodied());
        assert_eq!(self.ledger_sum(providers), totals.free + totals.committed);
        assert_eq!(held, self.ledger_sum(providers) + totals.retained);
    }
}

#[test]
fn test_interleaved_providers_conserve_principal() {
    let f = StakingFixture::setup();
    let alice = f.provider(10_000);
    let bob = f.provider(10_000);
    let carol = f.provider(10_000);
    let everyone = [alice.clone(), bob.clone(), carol.clone()];

    f.teller.deposit(&alice, &1_000);
    f.teller.deposit(&bob, &2_000);
    f.teller.deposit(&carol, &3_000);
    f.assert_conserved(&everyone);

    f.teller.commit(&alice, &1_000, &f.weekly);
    f.teller.commit(&bob, &500, &f.yearly);
    f.teller.commit(&carol, &1_500, &f.weekly);
    f.assert_conserved(&everyone);

    f.advance(2 * DAY);
    f.teller.commit(&bob, &500, &f.yearly);
    f.teller.withdraw(&carol, &1_000);
    f.assert_conserved(&everyone);

    // Bob leaves the yearly plan early: 20% of 1_000 stays behind.
    assert_eq!(f.teller.break_commitment(&bob), 800);
    f.assert_conserved(&everyone);
    assert_eq!(f.teller.get_totals().retained, 200);

    f.advance(WEEK);
    f.teller.withdraw(&alice, &1_000);
    f.teller.withdraw(&carol, &2_000);
    f.teller.withdraw(&bob, &1_800);
    f.assert_conserved(&everyone);

    // 50% bonus on 1_000 and on 1_500
    assert_eq!(f.reward.balance(&alice), 500);
    assert_eq!(f.reward.balance(&carol), 750);
    assert_eq!(f.reward.balance(&bob), 0);
    assert_eq!(f.vault.balance(), VAULT_FUNDING - 1_250);

    // Only the forfeited penalty remains in custody.
    assert_eq!(f.lp.balance(&f.teller.address), 200);
    assert_eq!(f.ledger_sum(&everyone), 0);
}

#[test]
fn test_failed_calls_leave_state_untouched() {
    let f = StakingFixture::setup();
    let alice = f.provider(10_000);
    let everyone = [alice.clone()];

    f.teller.deposit(&alice, &1_000);
    f.teller.commit(&alice, &300, &f.weekly);
    let ledger = f.teller.get_ledger(&alice);
    let totals = f.teller.get_totals();

    assert_eq!(
        f.teller.try_commit(&alice, &100, &f.yearly),
        Err(Ok(TellerError::CommitmentMismatch))
    );
    assert_eq!(
        f.teller.try_commit(&alice, &800, &f.weekly),
        Err(Ok(TellerError::InsufficientFreeBalance))
    );
    assert_eq!(
        f.teller.try_withdraw(&alice, &701),
        Err(Ok(TellerError::InsufficientFreeBalance))
    );

    assert_eq!(f.teller.get_ledger(&alice), ledger);
    assert_eq!(f.teller.get_totals(), totals);
    f.assert_conserved(&everyone);
}

#[test]
fn test_scenario_fold_then_mature() {
    let f = StakingFixture::setup();
    let alice = f.provider(10_000);

    f.teller.deposit(&alice, &1_000);
    f.teller.commit(&alice, &100, &f.weekly);
    f.teller.commit(&alice, &100, &f.weekly);
    assert_eq!(
        f.teller.try_commit(&alice, &900, &f.weekly),
        Err(Ok(TellerError::InsufficientFreeBalance))
    );

    f.advance(WEEK);
    assert!(f.teller.is_matured(&alice));
    f.teller.withdraw(&alice, &1_000);

    assert_eq!(f.lp.balance(&alice), 10_000);
    assert_eq!(f.reward.balance(&alice), 100);
    assert_eq!(
        f.teller.try_withdraw(&alice, &1),
        Err(Ok(TellerError::InsufficientFreeBalance))
    );
}

#[test]
fn test_vault_priority_is_owned_by_the_teller() {
    let f = StakingFixture::setup();
    let teller_id = f.teller.address.clone();

    // Neither the admin nor anyone else may change the teller's priority directly.
    f.advance(WEEK);
    assert_eq!(
        f.vault.try_change_priority(&f.admin, &teller_id, &7),
        Err(Ok(VaultError::CallerIsNotDistributor))
    );

    f.teller.set_vault_priority(&f.admin, &7);
    assert_eq!(f.vault.get_distributor(&teller_id).priority, 7);
    assert_eq!(
        f.vault.next_priority_change_at(&teller_id),
        START + 2 * WEEK
    );
}
