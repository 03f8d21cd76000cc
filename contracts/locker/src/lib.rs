#![no_std]

#[cfg(test)]
extern crate std;

pub mod events;
pub mod timelock;

use common::access::{self, Action};
use common::accrual;
use common::checkpoint::{self, RatePoint, Refresh};
use common::guard::ReentrancyGuard;
use common::pausable;
use soroban_sdk::{
    contract, contractimpl, contracttype, log, symbol_short, token, Address, Env, Symbol, Vec,
};

use timelock::LockPosition;

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const LOCK_TOKEN: Symbol = symbol_short!("LCK_TOK");
const REWARD_TOKEN: Symbol = symbol_short!("RWD_TOK");
const START_TIME: Symbol = symbol_short!("START");
const DIST_TIME: Symbol = symbol_short!("DIST_TIME");
const UNLOCK_DELAY: Symbol = symbol_short!("UNLK_DLY");
const TOTAL_LOCKED: Symbol = symbol_short!("TOT_LCK");
const TOTAL_UNLOCKING: Symbol = symbol_short!("TOT_ULK");
const REWARD_PER_TOKEN: Symbol = symbol_short!("RPT");
const TOTAL_FUNDED: Symbol = symbol_short!("FUNDED");
const TOTAL_PAID: Symbol = symbol_short!("PAID");

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidAmount = 4,
    NotStarted = 5,
    InsufficientLocked = 6,
    NotYetAvailable = 7,
    NothingToWithdraw = 8,
    NothingToClaim = 9,
    Paused = 10,
    InsufficientLiquidity = 11,
    Reentrant = 12,
    TokensIdentical = 13,
}

// ── Public-facing types ──────────────────────────────────────────────────────

/// Snapshot of a locker's position returned by `get_info`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LockerInfo {
    pub locked: i128,
    pub unlocking: i128,
    pub unlock_at: u64,
    /// Portion of `unlocking` that can be withdrawn right now.
    pub withdrawable: i128,
    /// Rewards claimable if `claim` were called now.
    pub claimable: i128,
}

// ── Contract ─────────────────────────────────────────────────────────────────

/// Lock-and-distribute reward pool.
///
/// A fixed emission of `reward_per_distribution` tokens every
/// `distribution_time` seconds is shared pro-rata among locked balances.
/// Unlocked tokens stop earning immediately and become withdrawable after
/// `unlock_delay`.
#[contract]
pub struct LockerContract;

#[contractimpl]
impl LockerContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the pool.
    ///
    /// * `lock_token`              – SAC address of the token users lock.
    /// * `reward_token`            – SAC address of the token distributed.
    /// * `reward_per_distribution` – tokens emitted every `distribution_time`.
    /// * `start_time`              – ledger timestamp from which locking opens.
    /// * `unlock_delay`            – seconds between `unlock` and `withdraw`.
    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        env: Env,
        admin: Address,
        lock_token: Address,
        reward_token: Address,
        reward_per_distribution: i128,
        distribution_time: u64,
        start_time: u64,
        unlock_delay: u64,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }
        if reward_per_distribution < 0 || distribution_time == 0 {
            return Err(ContractError::InvalidAmount);
        }
        if lock_token == reward_token {
            return Err(ContractError::TokensIdentical);
        }

        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&LOCK_TOKEN, &lock_token);
        env.storage().instance().set(&REWARD_TOKEN, &reward_token);
        env.storage().instance().set(&START_TIME, &start_time);
        env.storage().instance().set(&DIST_TIME, &distribution_time);
        env.storage().instance().set(&UNLOCK_DELAY, &unlock_delay);
        // Totals and the accumulator start at zero; absent keys read as 0.

        access::set_admin(&env, &admin);
        checkpoint::init(&env, reward_per_distribution, 0);

        events::publish_initialized(
            &env,
            events::InitializedEvent {
                admin,
                lock_token,
                reward_token,
                reward_per_distribution,
                distribution_time,
                start_time,
                unlock_delay,
            },
        );

        Ok(())
    }

    // ── Locking ─────────────────────────────────────────────────────────────

    /// Lock `amount` tokens.
    ///
    /// The accumulator is flushed and the locker settled first so the new
    /// weight never earns for time that already passed.
    pub fn lock(env: Env, user: Address, amount: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        user.require_auth();
        let _guard = ReentrancyGuard::enter(&env).ok_or(ContractError::Reentrant)?;
        Self::require_not_paused(&env)?;

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        let start_time: u64 = env.storage().instance().get(&START_TIME).unwrap_or(0);
        if env.ledger().timestamp() < start_time {
            return Err(ContractError::NotStarted);
        }

        let mut position = Self::update_reward(&env, &user);
        position.lock(amount);
        timelock::store_position(&env, &user, &position);

        let total = Self::total_locked(env.clone()).saturating_add(amount);
        env.storage().instance().set(&TOTAL_LOCKED, &total);

        let lock_token = Self::stored_address(&env, &LOCK_TOKEN)?;
        token::Client::new(&env, &lock_token).transfer(
            &user,
            &env.current_contract_address(),
            &amount,
        );

        events::publish_locked(&env, user, amount, total);

        Ok(())
    }

    /// Start unlocking `amount` of the locked balance.
    ///
    /// The withdrawal timer restarts for everything already unlocking.
    pub fn unlock(env: Env, user: Address, amount: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        user.require_auth();
        let _guard = ReentrancyGuard::enter(&env).ok_or(ContractError::Reentrant)?;
        Self::require_not_paused(&env)?;

        Self::unlock_inner(&env, &user, Some(amount))
    }

    /// Start unlocking the whole locked balance.
    pub fn unlock_all(env: Env, user: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        user.require_auth();
        let _guard = ReentrancyGuard::enter(&env).ok_or(ContractError::Reentrant)?;
        Self::require_not_paused(&env)?;

        Self::unlock_inner(&env, &user, None)
    }

    /// Withdraw the matured unlocking bucket. Returns the amount paid back.
    pub fn withdraw(env: Env, user: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        user.require_auth();
        let _guard = ReentrancyGuard::enter(&env).ok_or(ContractError::Reentrant)?;
        Self::require_not_paused(&env)?;

        let mut position = timelock::load_position(&env, &user);
        let amount = position.take_withdrawable(env.ledger().timestamp())?;
        timelock::store_position(&env, &user, &position);

        let total = Self::total_unlocking(env.clone()).saturating_sub(amount);
        env.storage().instance().set(&TOTAL_UNLOCKING, &total);

        let lock_token = Self::stored_address(&env, &LOCK_TOKEN)?;
        token::Client::new(&env, &lock_token).transfer(
            &env.current_contract_address(),
            &user,
            &amount,
        );

        events::publish_withdrawn(&env, user, amount);

        Ok(amount)
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Claim settled rewards. Returns the amount paid.
    ///
    /// Payout is capped by the reward pool; whatever the pool cannot cover
    /// stays claimable.
    pub fn claim(env: Env, user: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        user.require_auth();
        let _guard = ReentrancyGuard::enter(&env).ok_or(ContractError::Reentrant)?;
        Self::require_not_paused(&env)?;

        Self::claim_inner(&env, &user)
    }

    /// Claim rewards and start unlocking everything, atomically.
    pub fn claim_and_unlock(env: Env, user: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        user.require_auth();
        let _guard = ReentrancyGuard::enter(&env).ok_or(ContractError::Reentrant)?;
        Self::require_not_paused(&env)?;

        let paid = Self::claim_inner(&env, &user)?;
        Self::unlock_inner(&env, &user, None)?;
        Ok(paid)
    }

    /// Fund the reward pool with `amount` reward tokens.
    pub fn add_reward(env: Env, funder: Address, amount: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        funder.require_auth();
        let _guard = ReentrancyGuard::enter(&env).ok_or(ContractError::Reentrant)?;

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        let total = Self::total_funded(env.clone()).saturating_add(amount);
        env.storage().instance().set(&TOTAL_FUNDED, &total);

        let reward_token = Self::stored_address(&env, &REWARD_TOKEN)?;
        token::Client::new(&env, &reward_token).transfer(
            &funder,
            &env.current_contract_address(),
            &amount,
        );

        events::publish_reward_added(&env, funder, amount, total);

        Ok(())
    }

    /// Force a checkpoint of the global accumulator. Returns its value.
    pub fn update(env: Env) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        let _guard = ReentrancyGuard::enter(&env).ok_or(ContractError::Reentrant)?;
        Self::require_not_paused(&env)?;

        Ok(Self::update_global_reward(&env, false))
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Rewards `user` could claim right now.
    pub fn get_claim(env: Env, user: Address) -> i128 {
        let position = timelock::load_position(&env, &user);
        accrual::earned(
            position.locked,
            Self::reward_per_token(env),
            position.reward_snapshot,
            position.unclaimed,
        )
    }

    pub fn get_info(env: Env, user: Address) -> LockerInfo {
        let now = env.ledger().timestamp();
        let position = timelock::load_position(&env, &user);
        let claimable = accrual::earned(
            position.locked,
            Self::reward_per_token(env),
            position.reward_snapshot,
            position.unclaimed,
        );

        LockerInfo {
            locked: position.locked,
            unlocking: position.unlocking,
            unlock_at: position.unlock_at,
            withdrawable: position.withdrawable(now),
            claimable,
        }
    }

    /// Locked (reward-earning) balance of `user`.
    pub fn locked_of(env: Env, user: Address) -> i128 {
        timelock::load_position(&env, &user).locked
    }

    pub fn unlocking_of(env: Env, user: Address) -> i128 {
        timelock::load_position(&env, &user).unlocking
    }

    pub fn total_locked(env: Env) -> i128 {
        env.storage().instance().get(&TOTAL_LOCKED).unwrap_or(0)
    }

    pub fn total_unlocking(env: Env) -> i128 {
        env.storage().instance().get(&TOTAL_UNLOCKING).unwrap_or(0)
    }

    /// Everything held for lockers: locked plus not yet withdrawn.
    pub fn total_supply(env: Env) -> i128 {
        Self::total_locked(env.clone()).saturating_add(Self::total_unlocking(env))
    }

    /// The accumulator as a refresh at the current time would leave it.
    pub fn reward_per_token(env: Env) -> i128 {
        let stored: i128 = env.storage().instance().get(&REWARD_PER_TOKEN).unwrap_or(0);
        match checkpoint::peek(&env) {
            Refresh::Advanced { integral, .. } => accrual::compute_reward_per_token(
                stored,
                integral,
                Self::distribution_time(env.clone()),
                Self::total_locked(env),
            ),
            Refresh::Current | Refresh::Deferred => stored,
        }
    }

    /// Tokens emitted every `distribution_time` seconds.
    pub fn reward_rate(env: Env) -> i128 {
        checkpoint::current_rate(&env)
    }

    pub fn rate_history(env: Env) -> Vec<RatePoint> {
        checkpoint::history(&env)
    }

    pub fn last_checkpoint(env: Env) -> u64 {
        checkpoint::last_checkpoint(&env)
    }

    pub fn update_time_limit(env: Env) -> u64 {
        checkpoint::min_interval(&env)
    }

    pub fn distribution_time(env: Env) -> u64 {
        env.storage().instance().get(&DIST_TIME).unwrap_or(0)
    }

    pub fn start_time(env: Env) -> u64 {
        env.storage().instance().get(&START_TIME).unwrap_or(0)
    }

    pub fn unlock_delay(env: Env) -> u64 {
        env.storage().instance().get(&UNLOCK_DELAY).unwrap_or(0)
    }

    /// Reward tokens currently held and available for payouts.
    pub fn reward_pool(env: Env) -> Result<i128, ContractError> {
        let reward_token = Self::stored_address(&env, &REWARD_TOKEN)?;
        Ok(token::Client::new(&env, &reward_token).balance(&env.current_contract_address()))
    }

    pub fn total_funded(env: Env) -> i128 {
        env.storage().instance().get(&TOTAL_FUNDED).unwrap_or(0)
    }

    pub fn total_distributed(env: Env) -> i128 {
        env.storage().instance().get(&TOTAL_PAID).unwrap_or(0)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    pub fn is_paused(env: Env) -> bool {
        pausable::is_paused(&env)
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        access::get_admin(&env).ok_or(ContractError::NotInitialized)
    }

    // ── Admin functions ──────────────────────────────────────────────────────

    /// Change the emission.
    ///
    /// Time already elapsed stays priced at the old rate: the accumulator is
    /// flushed first and the change is logged at the current timestamp.
    pub fn set_reward(
        env: Env,
        caller: Address,
        reward_per_distribution: i128,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_authorized(&env, &caller, &Action::SetRate)?;
        let _guard = ReentrancyGuard::enter(&env).ok_or(ContractError::Reentrant)?;

        if reward_per_distribution < 0 {
            return Err(ContractError::InvalidAmount);
        }

        Self::update_global_reward(&env, false);
        let old_rate = checkpoint::current_rate(&env);
        checkpoint::record_rate(&env, reward_per_distribution);

        events::publish_rate_set(
            &env,
            old_rate,
            reward_per_distribution,
            env.ledger().timestamp(),
        );

        Ok(())
    }

    /// Change the unlock delay. Only affects future `unlock` calls.
    pub fn set_unlock_delay(env: Env, caller: Address, delay: u64) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_authorized(&env, &caller, &Action::Configure)?;

        let old = Self::unlock_delay(env.clone());
        env.storage().instance().set(&UNLOCK_DELAY, &delay);

        events::publish_unlock_delay_set(&env, old, delay);

        Ok(())
    }

    /// Minimum seconds between two effective accumulator refreshes.
    pub fn set_update_time_limit(
        env: Env,
        caller: Address,
        limit: u64,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_authorized(&env, &caller, &Action::Configure)?;

        let old = checkpoint::min_interval(&env);
        checkpoint::set_min_interval(&env, limit);

        events::publish_update_limit_set(&env, old, limit);

        Ok(())
    }

    pub fn pause(env: Env, caller: Address) -> Result<(), ContractError> {
        Self::set_paused(&env, caller, true)
    }

    pub fn unpause(env: Env, caller: Address) -> Result<(), ContractError> {
        Self::set_paused(&env, caller, false)
    }

    /// Grant `action` to `target`. Admin only.
    pub fn grant_role(
        env: Env,
        caller: Address,
        target: Address,
        action: Action,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_admin(&env, &caller)?;

        access::grant(&env, &target, &action);
        events::publish_role_granted(&env, target, action);

        Ok(())
    }

    /// Revoke `action` from `target`. Admin only.
    pub fn revoke_role(
        env: Env,
        caller: Address,
        target: Address,
        action: Action,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_admin(&env, &caller)?;

        access::revoke(&env, &target, &action);
        events::publish_role_revoked(&env, target, action);

        Ok(())
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    fn require_not_paused(env: &Env) -> Result<(), ContractError> {
        if pausable::is_paused(env) {
            return Err(ContractError::Paused);
        }
        Ok(())
    }

    fn require_admin(env: &Env, caller: &Address) -> Result<(), ContractError> {
        let admin = access::get_admin(env).ok_or(ContractError::NotInitialized)?;
        if *caller != admin {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    fn require_authorized(
        env: &Env,
        caller: &Address,
        action: &Action,
    ) -> Result<(), ContractError> {
        if !access::is_authorized(env, caller, action) {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    fn stored_address(env: &Env, key: &Symbol) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(key)
            .ok_or(ContractError::NotInitialized)
    }

    fn set_paused(env: &Env, caller: Address, paused: bool) -> Result<(), ContractError> {
        Self::require_initialized(env)?;
        caller.require_auth();
        Self::require_authorized(env, &caller, &Action::Pause)?;

        pausable::set_paused(env, paused);
        events::publish_paused(env, caller, paused);

        Ok(())
    }

    /// Shared body of `unlock`, `unlock_all` and `claim_and_unlock`.
    /// `None` unlocks everything and fails when nothing is locked.
    fn unlock_inner(env: &Env, user: &Address, amount: Option<i128>) -> Result<(), ContractError> {
        let mut position = Self::update_reward(env, user);
        let amount = match amount {
            Some(amount) => amount,
            None if position.locked > 0 => position.locked,
            None => return Err(ContractError::InsufficientLocked),
        };

        let delay = Self::unlock_delay(env.clone());
        position.unlock(amount, env.ledger().timestamp(), delay)?;
        timelock::store_position(env, user, &position);

        let locked = Self::total_locked(env.clone()).saturating_sub(amount);
        env.storage().instance().set(&TOTAL_LOCKED, &locked);
        let unlocking = Self::total_unlocking(env.clone()).saturating_add(amount);
        env.storage().instance().set(&TOTAL_UNLOCKING, &unlocking);

        events::publish_unlocked(env, user.clone(), amount, position.unlock_at);

        Ok(())
    }

    fn claim_inner(env: &Env, user: &Address) -> Result<i128, ContractError> {
        let mut position = Self::update_reward(env, user);
        if position.unclaimed <= 0 {
            return Err(ContractError::NothingToClaim);
        }

        let reward_token = Self::stored_address(env, &REWARD_TOKEN)?;
        let client = token::Client::new(env, &reward_token);
        let pool = client.balance(&env.current_contract_address());
        if pool <= 0 {
            return Err(ContractError::InsufficientLiquidity);
        }

        let paid = position.unclaimed.min(pool);
        position.unclaimed = position.unclaimed.saturating_sub(paid);
        timelock::store_position(env, user, &position);

        let total_paid = Self::total_distributed(env.clone()).saturating_add(paid);
        env.storage().instance().set(&TOTAL_PAID, &total_paid);

        client.transfer(&env.current_contract_address(), user, &paid);

        events::publish_claimed(env, user.clone(), paid);
        if position.unclaimed > 0 {
            log!(env, "reward pool short: paid {}, still owed {}", paid, position.unclaimed);
            events::publish_shortfall(env, user.clone(), paid, position.unclaimed);
        }

        Ok(paid)
    }

    /// Flush the global accumulator up to the current ledger time.
    ///
    /// `forced` bypasses the update time limit. Every path that settles a
    /// position or changes `TOTAL_LOCKED` forces; only `update` and rate
    /// changes may be deferred. Returns the fresh value.
    fn update_global_reward(env: &Env, forced: bool) -> i128 {
        let stored: i128 = env.storage().instance().get(&REWARD_PER_TOKEN).unwrap_or(0);

        let refresh = if forced {
            checkpoint::take_forced(env)
        } else {
            checkpoint::take(env)
        };
        match refresh {
            Refresh::Advanced { integral, .. } => {
                let total_locked = Self::total_locked(env.clone());
                let distribution_time = Self::distribution_time(env.clone());
                let next = accrual::compute_reward_per_token(
                    stored,
                    integral,
                    distribution_time,
                    total_locked,
                );
                env.storage().instance().set(&REWARD_PER_TOKEN, &next);
                next
            }
            Refresh::Deferred => {
                log!(env, "accumulator refresh deferred by update time limit");
                stored
            }
            Refresh::Current => stored,
        }
    }

    /// Full per-user reward flush.
    ///
    /// 1. Update the global accumulator, ignoring the update time limit.
    /// 2. Settle everything earned since the user's last snapshot.
    /// 3. Move the snapshot forward. The caller persists the position.
    fn update_reward(env: &Env, user: &Address) -> LockPosition {
        let current = Self::update_global_reward(env, true);

        let mut position = timelock::load_position(env, user);
        position.unclaimed = accrual::earned(
            position.locked,
            current,
            position.reward_snapshot,
            position.unclaimed,
        );
        position.reward_snapshot = current;
        position
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test;
