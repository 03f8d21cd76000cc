use crate::{events, ContractError, LockerContract, LockerContractClient};
use common::access::Action;
use proptest::prelude::*;
use soroban_sdk::{
    symbol_short,
    testutils::{storage::Persistent as _, Address as _, Events, Ledger},
    token, Address, Env, IntoVal, TryIntoVal,
};

const UNIT: i128 = 10_000_000;
const DAY: u64 = 86_400;
const GENESIS: u64 = 1_000;
const START: u64 = GENESIS + 150;
const REWARD: i128 = 86_400 * UNIT;
const DELAY: u64 = 5 * DAY;

struct Setup {
    env: Env,
    client: LockerContractClient<'static>,
    admin: Address,
    lock_token: token::Client<'static>,
    reward_token: token::Client<'static>,
}

impl Setup {
    fn new(funding: i128) -> Self {
        let env = Env::default();
        env.mock_all_auths();
        env.ledger().with_mut(|l| l.timestamp = GENESIS);

        let admin = Address::generate(&env);
        let lock_asset = env.register_stellar_asset_contract_v2(admin.clone());
        let reward_asset = env.register_stellar_asset_contract_v2(admin.clone());

        let contract_id = env.register(LockerContract, ());
        let client = LockerContractClient::new(&env, &contract_id);
        client.initialize(
            &admin,
            &lock_asset.address(),
            &reward_asset.address(),
            &REWARD,
            &DAY,
            &START,
            &DELAY,
        );

        if funding > 0 {
            token::StellarAssetClient::new(&env, &reward_asset.address()).mint(&admin, &funding);
            client.add_reward(&admin, &funding);
        }

        let lock_token = token::Client::new(&env, &lock_asset.address());
        let reward_token = token::Client::new(&env, &reward_asset.address());
        Setup {
            env,
            client,
            admin,
            lock_token,
            reward_token,
        }
    }

    fn user(&self, tokens: i128) -> Address {
        let user = Address::generate(&self.env);
        token::StellarAssetClient::new(&self.env, &self.lock_token.address)
            .mint(&user, &(tokens * UNIT));
        user
    }

    fn jump(&self, seconds: u64) {
        self.env.ledger().with_mut(|l| l.timestamp += seconds);
    }

    fn at_start(&self) {
        self.env.ledger().with_mut(|l| l.timestamp = START);
    }
}

// ── Initialisation ───────────────────────────────────────────────────────────

#[test]
fn test_initialize() {
    let s = Setup::new(0);

    assert!(s.client.is_initialized());
    assert_eq!(s.client.get_admin(), s.admin);
    assert_eq!(s.client.reward_rate(), REWARD);
    assert_eq!(s.client.distribution_time(), DAY);
    assert_eq!(s.client.start_time(), START);
    assert_eq!(s.client.unlock_delay(), DELAY);
    assert_eq!(s.client.last_checkpoint(), GENESIS);
    assert_eq!(s.client.total_supply(), 0);
    assert_eq!(
        s.client.try_initialize(
            &s.admin,
            &s.lock_token.address,
            &s.reward_token.address,
            &REWARD,
            &DAY,
            &START,
            &DELAY,
        ),
        Err(Ok(ContractError::AlreadyInitialized))
    );
}

#[test]
fn test_initialize_rejects_bad_config() {
    let env = Env::default();
    env.mock_all_auths();
    let admin = Address::generate(&env);
    let asset = env.register_stellar_asset_contract_v2(admin.clone());
    let other = env.register_stellar_asset_contract_v2(admin.clone());
    let client = LockerContractClient::new(&env, &env.register(LockerContract, ()));

    assert_eq!(
        client.try_initialize(&admin, &asset.address(), &asset.address(), &REWARD, &DAY, &0, &0),
        Err(Ok(ContractError::TokensIdentical))
    );
    assert_eq!(
        client.try_initialize(&admin, &asset.address(), &other.address(), &REWARD, &0, &0, &0),
        Err(Ok(ContractError::InvalidAmount))
    );
    assert_eq!(
        client.try_initialize(&admin, &asset.address(), &other.address(), &-1, &DAY, &0, &0),
        Err(Ok(ContractError::InvalidAmount))
    );
    assert!(!client.is_initialized());
}

#[test]
fn test_calls_before_initialize_fail() {
    let env = Env::default();
    env.mock_all_auths();
    let client = LockerContractClient::new(&env, &env.register(LockerContract, ()));
    let user = Address::generate(&env);

    assert_eq!(
        client.try_lock(&user, &UNIT),
        Err(Ok(ContractError::NotInitialized))
    );
    assert_eq!(client.try_update(), Err(Ok(ContractError::NotInitialized)));
}

// ── Locking and the unlock timer ─────────────────────────────────────────────

#[test]
fn test_lock_before_start_fails() {
    let s = Setup::new(0);
    let user = s.user(1_000);

    assert_eq!(
        s.client.try_lock(&user, &(1_000 * UNIT)),
        Err(Ok(ContractError::NotStarted))
    );

    s.at_start();
    s.client.lock(&user, &(1_000 * UNIT));
    assert_eq!(s.client.locked_of(&user), 1_000 * UNIT);
}

#[test]
fn test_lock_zero_fails() {
    let s = Setup::new(0);
    s.at_start();
    let user = s.user(10);

    assert_eq!(s.client.try_lock(&user, &0), Err(Ok(ContractError::InvalidAmount)));
    assert_eq!(s.client.try_unlock(&user, &0), Err(Ok(ContractError::InvalidAmount)));
}

#[test]
fn test_lock_unlock_withdraw_flow() {
    let s = Setup::new(0);
    s.at_start();
    let user = s.user(1_000);

    s.client.lock(&user, &(1_000 * UNIT));
    assert_eq!(s.lock_token.balance(&user), 0);
    assert_eq!(s.client.total_locked(), 1_000 * UNIT);

    s.client.unlock(&user, &(400 * UNIT));
    let info = s.client.get_info(&user);
    assert_eq!(info.locked, 600 * UNIT);
    assert_eq!(info.unlocking, 400 * UNIT);
    assert_eq!(info.unlock_at, START + DELAY);
    assert_eq!(info.withdrawable, 0);

    assert_eq!(s.client.total_locked(), 600 * UNIT);
    assert_eq!(s.client.total_unlocking(), 400 * UNIT);
    assert_eq!(s.client.total_supply(), 1_000 * UNIT);

    assert_eq!(
        s.client.try_withdraw(&user),
        Err(Ok(ContractError::NotYetAvailable))
    );

    s.jump(DELAY);
    assert_eq!(s.client.get_info(&user).withdrawable, 400 * UNIT);
    assert_eq!(s.client.withdraw(&user), 400 * UNIT);
    assert_eq!(s.lock_token.balance(&user), 400 * UNIT);
    assert_eq!(s.client.total_unlocking(), 0);
    assert_eq!(s.client.total_supply(), 600 * UNIT);

    assert_eq!(
        s.client.try_withdraw(&user),
        Err(Ok(ContractError::NothingToWithdraw))
    );
}

#[test]
fn test_unlock_more_than_locked_fails() {
    let s = Setup::new(0);
    s.at_start();
    let user = s.user(100);
    let stranger = Address::generate(&s.env);

    s.client.lock(&user, &(100 * UNIT));
    assert_eq!(
        s.client.try_unlock(&user, &(101 * UNIT)),
        Err(Ok(ContractError::InsufficientLocked))
    );
    assert_eq!(
        s.client.try_unlock_all(&stranger),
        Err(Ok(ContractError::InsufficientLocked))
    );
    assert_eq!(s.client.locked_of(&user), 100 * UNIT);
}

#[test]
fn test_new_unlock_restarts_timer() {
    let s = Setup::new(0);
    s.at_start();
    let user = s.user(1_000);

    s.client.lock(&user, &(1_000 * UNIT));
    s.client.unlock(&user, &(200 * UNIT));

    s.jump(DELAY - 10);
    s.client.unlock(&user, &(300 * UNIT));

    s.jump(10);
    assert_eq!(
        s.client.try_withdraw(&user),
        Err(Ok(ContractError::NotYetAvailable))
    );

    s.jump(DELAY - 10);
    assert_eq!(s.client.withdraw(&user), 500 * UNIT);
}

#[test]
fn test_unlock_delay_change_applies_to_new_unlocks() {
    let s = Setup::new(0);
    s.at_start();
    let user = s.user(100);

    s.client.lock(&user, &(100 * UNIT));
    s.client.set_unlock_delay(&s.admin, &DAY);
    assert_eq!(s.client.unlock_delay(), DAY);

    s.client.unlock_all(&user);
    assert_eq!(s.client.unlocking_of(&user), 100 * UNIT);
    assert_eq!(s.client.get_info(&user).unlock_at, START + DAY);

    s.jump(DAY);
    assert_eq!(s.client.withdraw(&user), 100 * UNIT);
}

// ── Reward distribution ──────────────────────────────────────────────────────

#[test]
fn test_single_locker_receives_whole_emission() {
    let s = Setup::new(1_000_000 * UNIT);
    s.at_start();
    let user = s.user(1_000);

    s.client.lock(&user, &(1_000 * UNIT));
    s.jump(DAY + 1);

    // Nothing has touched the pool since the lock; the view projects.
    assert_eq!(s.client.get_claim(&user), 86_401 * UNIT);

    let paid = s.client.claim(&user);
    assert_eq!(paid, 86_401 * UNIT);
    assert_eq!(s.reward_token.balance(&user), paid);
    assert_eq!(s.client.total_distributed(), paid);
    assert_eq!(s.client.reward_pool(), 1_000_000 * UNIT - paid);
}

#[test]
fn test_claim_twice_in_same_ledger() {
    let s = Setup::new(1_000_000 * UNIT);
    s.at_start();
    let user = s.user(1_000);

    assert_eq!(s.client.try_claim(&user), Err(Ok(ContractError::NothingToClaim)));

    s.client.lock(&user, &(1_000 * UNIT));
    s.jump(DAY);
    s.client.claim(&user);
    assert_eq!(s.client.try_claim(&user), Err(Ok(ContractError::NothingToClaim)));
    assert_eq!(s.client.get_claim(&user), 0);
}

#[test]
fn test_rewards_split_by_weight() {
    let s = Setup::new(1_000_000 * UNIT);
    s.at_start();
    let small = s.user(1_000);
    let large = s.user(3_000);

    s.client.lock(&small, &(1_000 * UNIT));
    s.client.lock(&large, &(3_000 * UNIT));
    s.jump(DAY);

    assert_eq!(s.client.get_claim(&small), 21_600 * UNIT);
    assert_eq!(s.client.get_claim(&large), 64_800 * UNIT);
}

#[test]
fn test_late_joiner_and_early_leaver() {
    let s = Setup::new(1_000_000 * UNIT);
    s.at_start();
    let u1 = s.user(1_000);
    let u2 = s.user(1_000);
    let u3 = s.user(2_000);

    s.client.lock(&u1, &(1_000 * UNIT));
    s.client.lock(&u2, &(1_000 * UNIT));

    s.jump(DAY);
    s.client.lock(&u3, &(2_000 * UNIT));
    assert_eq!(s.client.get_claim(&u1), 43_200 * UNIT);
    assert_eq!(s.client.get_claim(&u3), 0);

    s.jump(DAY);
    s.client.unlock_all(&u1);
    assert_eq!(s.client.get_claim(&u1), 64_800 * UNIT);

    s.jump(DAY);
    // u1 stopped earning the moment it unlocked.
    assert_eq!(s.client.get_claim(&u1), 64_800 * UNIT);
    assert_eq!(s.client.get_claim(&u2), 93_600 * UNIT);
    assert_eq!(s.client.get_claim(&u3), 100_800 * UNIT);

    let total = s.client.claim(&u1) + s.client.claim(&u2) + s.client.claim(&u3);
    assert_eq!(total, 3 * REWARD);
}

#[test]
fn test_rate_change_splits_interval() {
    let s = Setup::new(1_000_000 * UNIT);
    s.at_start();
    let user = s.user(1_000);

    s.client.lock(&user, &(1_000 * UNIT));
    s.jump(DAY / 2);
    s.client.set_reward(&s.admin, &(2 * REWARD));
    assert_eq!(s.client.get_claim(&user), 43_200 * UNIT);

    s.jump(DAY / 2);
    assert_eq!(s.client.claim(&user), 129_600 * UNIT);

    let history = s.client.rate_history();
    assert_eq!(history.len(), 2);
    assert_eq!(history.get(1).unwrap().start, START + DAY / 2);
    assert_eq!(history.get(1).unwrap().rate, 2 * REWARD);
}

#[test]
fn test_rate_change_inside_throttle_window() {
    let s = Setup::new(1_000_000 * UNIT);
    s.at_start();
    let user = s.user(1_000);

    s.client.lock(&user, &(1_000 * UNIT));
    s.client.set_update_time_limit(&s.admin, &DAY);
    assert_eq!(s.client.update_time_limit(), DAY);

    s.jump(DAY / 2);
    s.client.set_reward(&s.admin, &(2 * REWARD));
    // Throttled: the accumulator has not moved yet.
    assert_eq!(s.client.last_checkpoint(), START);
    assert_eq!(s.client.get_claim(&user), 0);

    s.jump(DAY / 2);
    // Both halves priced at their own rate once the window closes.
    assert_eq!(s.client.claim(&user), 129_600 * UNIT);
    assert_eq!(s.client.last_checkpoint(), START + DAY);
}

#[test]
fn test_lock_inside_throttle_window_does_not_reprice_past_time() {
    let s = Setup::new(1_000_000 * UNIT);
    s.at_start();
    let u1 = s.user(1_000);
    let u2 = s.user(1_000);

    s.client.lock(&u1, &(1_000 * UNIT));
    s.client.set_update_time_limit(&s.admin, &DAY);

    s.jump(DAY / 2);
    s.client.lock(&u2, &(1_000 * UNIT));
    // The weight change checkpoints even inside the window.
    assert_eq!(s.client.last_checkpoint(), START + DAY / 2);

    s.jump(DAY / 2);
    assert_eq!(s.client.claim(&u1), 64_800 * UNIT);
    assert_eq!(s.client.claim(&u2), 21_600 * UNIT);
}

#[test]
fn test_unlock_inside_throttle_window_keeps_earned_share() {
    let s = Setup::new(1_000_000 * UNIT);
    s.at_start();
    let u1 = s.user(1_000);
    let u2 = s.user(3_000);

    s.client.lock(&u1, &(1_000 * UNIT));
    s.client.lock(&u2, &(3_000 * UNIT));
    s.client.set_update_time_limit(&s.admin, &DAY);

    s.jump(DAY / 2);
    s.client.unlock_all(&u2);

    s.jump(DAY / 2);
    // u2 earned 3/4 of the first half only; u1 takes the rest.
    assert_eq!(s.client.claim(&u2), 32_400 * UNIT);
    assert_eq!(s.client.claim(&u1), 54_000 * UNIT);
}

#[test]
fn test_explicit_update_still_throttled() {
    let s = Setup::new(0);
    s.at_start();
    let user = s.user(100);

    s.client.lock(&user, &(100 * UNIT));
    s.client.set_update_time_limit(&s.admin, &DAY);

    s.jump(DAY / 2);
    s.client.update();
    assert_eq!(s.client.last_checkpoint(), START);

    s.jump(DAY / 2);
    s.client.update();
    assert_eq!(s.client.last_checkpoint(), START + DAY);
}

#[test]
fn test_position_ttl_extended() {
    let s = Setup::new(0);
    s.at_start();
    let user = s.user(100);

    s.client.lock(&user, &(100 * UNIT));

    let ttl = s.env.as_contract(&s.client.address, || {
        s.env
            .storage()
            .persistent()
            .get_ttl(&(symbol_short!("POSITION"), user.clone()))
    });
    assert!(ttl >= 5_184_000);
}

#[test]
fn test_same_timestamp_rate_change_overwrites() {
    let s = Setup::new(0);
    s.at_start();

    s.client.set_reward(&s.admin, &(2 * REWARD));
    s.client.set_reward(&s.admin, &(3 * REWARD));

    let history = s.client.rate_history();
    assert_eq!(history.len(), 2);
    assert_eq!(history.get(1).unwrap().rate, 3 * REWARD);
    assert_eq!(s.client.reward_rate(), 3 * REWARD);
}

#[test]
fn test_empty_interval_distributes_nothing() {
    let s = Setup::new(1_000_000 * UNIT);
    s.at_start();
    let u1 = s.user(1_000);
    let u2 = s.user(1_000);

    s.client.lock(&u1, &(1_000 * UNIT));
    s.jump(DAY);
    s.client.unlock_all(&u1);

    let before = s.client.reward_per_token();
    s.jump(DAY);
    s.client.update();
    assert_eq!(s.client.reward_per_token(), before);

    s.client.lock(&u2, &(1_000 * UNIT));
    s.jump(DAY);

    assert_eq!(s.client.claim(&u1), 86_400 * UNIT);
    assert_eq!(s.client.claim(&u2), 86_400 * UNIT);
}

#[test]
fn test_claim_and_unlock() {
    let s = Setup::new(1_000_000 * UNIT);
    s.at_start();
    let user = s.user(1_000);

    s.client.lock(&user, &(1_000 * UNIT));
    s.jump(DAY);

    assert_eq!(s.client.claim_and_unlock(&user), 86_400 * UNIT);
    let info = s.client.get_info(&user);
    assert_eq!(info.locked, 0);
    assert_eq!(info.unlocking, 1_000 * UNIT);
    assert_eq!(info.claimable, 0);

    s.jump(DAY);
    assert_eq!(s.client.get_claim(&user), 0);
}

#[test]
fn test_claim_capped_by_pool() {
    let s = Setup::new(50_000 * UNIT);
    s.at_start();
    let user = s.user(1_000);

    s.client.lock(&user, &(1_000 * UNIT));
    s.jump(DAY);

    assert_eq!(s.client.claim(&user), 50_000 * UNIT);
    let last = s.env.events().all().last().unwrap();
    assert_eq!(
        last.1,
        (symbol_short!("SHORTFALL"), user.clone()).into_val(&s.env)
    );
    let payload: events::ShortfallEvent = last.2.try_into_val(&s.env).unwrap();
    assert_eq!(payload.paid, 50_000 * UNIT);
    assert_eq!(payload.unpaid, 36_400 * UNIT);

    assert_eq!(s.client.get_claim(&user), 36_400 * UNIT);
    assert_eq!(
        s.client.try_claim(&user),
        Err(Ok(ContractError::InsufficientLiquidity))
    );

    token::StellarAssetClient::new(&s.env, &s.reward_token.address)
        .mint(&s.admin, &(100_000 * UNIT));
    s.client.add_reward(&s.admin, &(100_000 * UNIT));
    assert_eq!(s.client.claim(&user), 36_400 * UNIT);
    assert_eq!(s.client.total_funded(), 150_000 * UNIT);
}

// ── Administration ───────────────────────────────────────────────────────────

#[test]
fn test_rate_change_requires_grant() {
    let s = Setup::new(0);
    let operator = Address::generate(&s.env);

    assert_eq!(
        s.client.try_set_reward(&operator, &REWARD),
        Err(Ok(ContractError::Unauthorized))
    );
    assert_eq!(
        s.client.try_grant_role(&operator, &operator, &Action::SetRate),
        Err(Ok(ContractError::Unauthorized))
    );

    s.client.grant_role(&s.admin, &operator, &Action::SetRate);
    s.client.set_reward(&operator, &(2 * REWARD));
    assert_eq!(s.client.reward_rate(), 2 * REWARD);

    // Wrong capability.
    assert_eq!(
        s.client.try_set_update_time_limit(&operator, &60),
        Err(Ok(ContractError::Unauthorized))
    );

    s.client.revoke_role(&s.admin, &operator, &Action::SetRate);
    assert_eq!(
        s.client.try_set_reward(&operator, &REWARD),
        Err(Ok(ContractError::Unauthorized))
    );
}

#[test]
fn test_set_reward_rejects_negative() {
    let s = Setup::new(0);
    assert_eq!(
        s.client.try_set_reward(&s.admin, &-1),
        Err(Ok(ContractError::InvalidAmount))
    );
}

#[test]
fn test_pause_blocks_user_operations() {
    let s = Setup::new(0);
    s.at_start();
    let user = s.user(100);

    s.client.pause(&s.admin);
    assert!(s.client.is_paused());
    assert_eq!(
        s.client.try_lock(&user, &(100 * UNIT)),
        Err(Ok(ContractError::Paused))
    );

    s.client.unpause(&s.admin);
    s.client.lock(&user, &(100 * UNIT));
    assert_eq!(s.client.locked_of(&user), 100 * UNIT);
}

#[test]
fn test_lock_emits_event() {
    let s = Setup::new(0);
    s.at_start();
    let user = s.user(100);

    s.client.lock(&user, &(100 * UNIT));

    let last = s.env.events().all().last().unwrap();
    assert_eq!(last.0, s.client.address);
    assert_eq!(
        last.1,
        (symbol_short!("LOCKED"), user.clone()).into_val(&s.env)
    );
    let payload: events::LockedEvent = last.2.try_into_val(&s.env).unwrap();
    assert_eq!(payload.user, user);
    assert_eq!(payload.amount, 100 * UNIT);
    assert_eq!(payload.total_locked, 100 * UNIT);
}

// ── Properties ───────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn claims_never_exceed_emission(
        ops in prop::collection::vec((0usize..3, 1i128..1_000, 0u64..DAY / 4), 1..12),
    ) {
        let s = Setup::new(1_000_000 * UNIT);
        s.at_start();
        let users = [s.user(20_000), s.user(20_000), s.user(20_000)];

        for (who, tokens, advance) in ops {
            s.client.lock(&users[who], &(tokens * UNIT));
            s.jump(advance);
        }

        let mut paid = 0i128;
        for user in users.iter() {
            if s.client.get_claim(user) > 0 {
                paid += s.client.claim(user);
            }
        }

        let elapsed = s.env.ledger().timestamp() - START;
        prop_assert!(paid <= REWARD * elapsed as i128 / DAY as i128);
        prop_assert_eq!(s.client.total_distributed(), paid);
    }
}
