#![no_std]

pub mod events;
pub mod schedule;

use common::access;
use common::guard::ReentrancyGuard;
use soroban_sdk::{
    contract, contractimpl, contracttype, symbol_short, token, Address, Env, Symbol, Vec,
};

use schedule::Allocation;

const INITIALIZED: Symbol = symbol_short!("INIT");
const TOKEN: Symbol = symbol_short!("TOKEN");
const CLIFF: Symbol = symbol_short!("CLIFF");
const DURATION: Symbol = symbol_short!("DURATION");
const TOTAL_TO_PAY: Symbol = symbol_short!("TO_PAY");

/// Accounting month used to express cliffs and durations.
pub const MONTH: u64 = 2_628_000;
pub const DEFAULT_CLIFF: u64 = 6 * MONTH;
pub const DEFAULT_DURATION: u64 = 24 * MONTH;

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidAmount = 4,
    NothingToClaim = 5,
    AlreadyStarted = 6,
    UnknownUser = 7,
    ExceedsBalance = 8,
    Reentrant = 9,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserInfo {
    pub total_amount_to_pay: i128,
    pub paid_out: i128,
    pub available_amount: i128,
    pub is_started: bool,
    pub vesting_start_time: u64,
    pub vesting_end_time: u64,
}

/// Cliff-then-linear release of a pre-funded token allocation.
#[contract]
pub struct VestingContract;

#[contractimpl]
impl VestingContract {
    pub fn initialize(
        env: Env,
        owner: Address,
        token: Address,
        cliff: u64,
        duration: u64,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }
        if duration == 0 {
            return Err(ContractError::InvalidAmount);
        }

        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&TOKEN, &token);
        env.storage().instance().set(&CLIFF, &cliff);
        env.storage().instance().set(&DURATION, &duration);
        access::set_admin(&env, &owner);

        events::publish_initialized(&env, owner, token, cliff, duration);

        Ok(())
    }

    /// Register or overwrite allocations. The contract must already hold
    /// enough tokens to cover everything still owed.
    pub fn add_users(
        env: Env,
        owner: Address,
        users: Vec<Address>,
        amounts: Vec<i128>,
    ) -> Result<(), ContractError> {
        Self::require_owner(&env, &owner)?;

        if users.len() != amounts.len() {
            return Err(ContractError::InvalidAmount);
        }

        let mut total = Self::total_to_pay(env.clone());
        for (user, amount) in users.iter().zip(amounts.iter()) {
            if amount <= 0 {
                return Err(ContractError::InvalidAmount);
            }
            let previous = schedule::load_allocation(&env, &user).unwrap_or_default();
            if previous.started {
                return Err(ContractError::AlreadyStarted);
            }

            total = total.saturating_sub(previous.total).saturating_add(amount);
            schedule::store_allocation(
                &env,
                &user,
                &Allocation {
                    total: amount,
                    ..Default::default()
                },
            );
            events::publish_user_added(&env, user, amount);
        }

        let held = token::Client::new(&env, &Self::token(env.clone())?)
            .balance(&env.current_contract_address());
        if total > held {
            return Err(ContractError::ExceedsBalance);
        }
        env.storage().instance().set(&TOTAL_TO_PAY, &total);

        Ok(())
    }

    /// Start the cliff for each user. Fails atomically on the first unknown
    /// or already started entry.
    pub fn start_countdown(
        env: Env,
        owner: Address,
        users: Vec<Address>,
    ) -> Result<(), ContractError> {
        Self::require_owner(&env, &owner)?;

        let now = env.ledger().timestamp();
        let cliff = Self::cliff(env.clone());
        let duration = Self::duration(env.clone());
        for user in users.iter() {
            let mut allocation =
                schedule::load_allocation(&env, &user).ok_or(ContractError::UnknownUser)?;
            if allocation.started {
                return Err(ContractError::AlreadyStarted);
            }

            allocation.started = true;
            allocation.countdown_start = now;
            schedule::store_allocation(&env, &user, &allocation);

            let start = allocation.vesting_start(cliff);
            events::publish_countdown_started(&env, user, start, start.saturating_add(duration));
        }

        Ok(())
    }

    /// Pay out everything vested and unpaid. Returns the amount paid.
    pub fn claim(env: Env, user: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        user.require_auth();
        let _guard = ReentrancyGuard::enter(&env).ok_or(ContractError::Reentrant)?;

        let mut allocation = schedule::load_allocation(&env, &user).unwrap_or_default();
        let amount = allocation.available(
            env.ledger().timestamp(),
            Self::cliff(env.clone()),
            Self::duration(env.clone()),
        );
        if amount <= 0 {
            return Err(ContractError::NothingToClaim);
        }

        allocation.paid_out = allocation.paid_out.saturating_add(amount);
        schedule::store_allocation(&env, &user, &allocation);
        let total = Self::total_to_pay(env.clone()).saturating_sub(amount);
        env.storage().instance().set(&TOTAL_TO_PAY, &total);

        token::Client::new(&env, &Self::token(env.clone())?).transfer(
            &env.current_contract_address(),
            &user,
            &amount,
        );

        events::publish_claimed(&env, user, amount, allocation.paid_out);

        Ok(amount)
    }

    // ── Views ────────────────────────────────────────────────────────────────

    pub fn get_user_info(env: Env, user: Address) -> UserInfo {
        let cliff = Self::cliff(env.clone());
        let duration = Self::duration(env.clone());
        let allocation = schedule::load_allocation(&env, &user).unwrap_or_default();

        let (start, end) = if allocation.started {
            let start = allocation.vesting_start(cliff);
            (start, start.saturating_add(duration))
        } else {
            (0, 0)
        };

        UserInfo {
            total_amount_to_pay: allocation.total,
            paid_out: allocation.paid_out,
            available_amount: allocation.available(env.ledger().timestamp(), cliff, duration),
            is_started: allocation.started,
            vesting_start_time: start,
            vesting_end_time: end,
        }
    }

    /// Tokens still owed across all allocations.
    pub fn total_to_pay(env: Env) -> i128 {
        env.storage().instance().get(&TOTAL_TO_PAY).unwrap_or(0)
    }

    pub fn cliff(env: Env) -> u64 {
        env.storage().instance().get(&CLIFF).unwrap_or(0)
    }

    pub fn duration(env: Env) -> u64 {
        env.storage().instance().get(&DURATION).unwrap_or(0)
    }

    pub fn token(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&TOKEN)
            .ok_or(ContractError::NotInitialized)
    }

    pub fn get_owner(env: Env) -> Result<Address, ContractError> {
        access::get_admin(&env).ok_or(ContractError::NotInitialized)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    fn require_owner(env: &Env, caller: &Address) -> Result<(), ContractError> {
        caller.require_auth();
        let owner = access::get_admin(env).ok_or(ContractError::NotInitialized)?;
        if *caller != owner {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }
}
