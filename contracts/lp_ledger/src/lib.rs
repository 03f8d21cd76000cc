#![no_std]

pub mod events;
pub mod holding;
pub mod liquidity;

use common::access::{self, Action};
use common::accrual::{self, BPS_DENOMINATOR, DF_ONE};
use common::checkpoint::{self, RatePoint, Refresh};
use common::guard::ReentrancyGuard;
use common::pausable;
use common::vault::VaultClient;
use soroban_sdk::{contract, contractimpl, log, symbol_short, token, Address, Env, Symbol, Vec};

use holding::Holding;
use liquidity::Vaults;

// ── Storage key constants ────────────────────────────────────────────────────

const INITIALIZED: Symbol = symbol_short!("INIT");
const TOKEN: Symbol = symbol_short!("TOKEN");
const DF: Symbol = symbol_short!("DF");
const SUPPLY: Symbol = symbol_short!("SUPPLY");
const BUFFER_RATIO: Symbol = symbol_short!("BUF_RATIO");

/// Default gap between two effective DF refreshes.
pub const DEFAULT_UPDATE_TIME_LIMIT: u64 = 3_600;

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidAmount = 4,
    InsufficientBalance = 5,
    InsufficientAllowance = 6,
    InsufficientLiquidity = 7,
    ZeroAddress = 8,
    Paused = 9,
    Reentrant = 10,
}

// ── Contract ─────────────────────────────────────────────────────────────────

/// Interest-bearing LP ledger.
///
/// Every balance grows with a global distribution factor that compounds at
/// the annual interest rate whenever a refresh goes through. Balances are
/// stored against the DF they were last settled at and restated lazily.
#[contract]
pub struct LpLedgerContract;

#[contractimpl]
impl LpLedgerContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// * `token`        – base asset accepted for deposits.
    /// * `buffer`       – vault serving withdrawals.
    /// * `farming`      – vault holding the excess over the buffer target.
    /// * `interest`     – annual interest in basis points.
    /// * `buffer_ratio` – share of the supply kept in the buffer, in bps.
    pub fn initialize(
        env: Env,
        admin: Address,
        token: Address,
        buffer: Address,
        farming: Address,
        interest: i128,
        buffer_ratio: i128,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }
        if interest < 0 || !(0..=BPS_DENOMINATOR).contains(&buffer_ratio) {
            return Err(ContractError::InvalidAmount);
        }

        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&TOKEN, &token);
        env.storage().instance().set(&DF, &DF_ONE);
        env.storage().instance().set(&SUPPLY, &0i128);
        env.storage().instance().set(&BUFFER_RATIO, &buffer_ratio);
        liquidity::store_vaults(
            &env,
            &Vaults {
                buffer: buffer.clone(),
                farming: farming.clone(),
            },
        );

        access::set_admin(&env, &admin);
        checkpoint::init(&env, interest, DEFAULT_UPDATE_TIME_LIMIT);

        events::publish_initialized(
            &env,
            events::InitializedEvent {
                admin,
                token,
                buffer,
                farming,
                interest,
                buffer_ratio,
            },
        );

        Ok(())
    }

    // ── Custody ─────────────────────────────────────────────────────────────

    /// Deposit `amount` of the base asset and credit the same amount.
    pub fn deposit(env: Env, user: Address, amount: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        user.require_auth();
        let _guard = ReentrancyGuard::enter(&env).ok_or(ContractError::Reentrant)?;
        Self::require_not_paused(&env)?;

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        Self::refresh(&env, true);
        let mut holding = Self::settle(&env, &user);
        holding.balance = holding.balance.saturating_add(amount);
        holding::store_holding(&env, &user, &holding);
        let supply = Self::total_supply(env.clone()).saturating_add(amount);
        env.storage().instance().set(&SUPPLY, &supply);

        let vaults = liquidity::load_vaults(&env)?;
        token::Client::new(&env, &Self::token(env.clone())?).transfer(
            &user,
            &vaults.buffer,
            &amount,
        );

        let target = liquidity::buffer_target(supply, Self::buffer_ratio(env.clone()));
        let swept = liquidity::move_to_farming(&env, &vaults, target);
        if swept > 0 {
            events::publish_liquidity_moved(&env, vaults.buffer, vaults.farming, swept);
        }

        events::publish_deposited(&env, user, amount, holding.balance);

        Ok(())
    }

    /// Burn `amount` of the settled balance and pay it out in the base
    /// asset, drawing on the farming vault when the buffer is short.
    pub fn withdraw(env: Env, user: Address, amount: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        user.require_auth();
        let _guard = ReentrancyGuard::enter(&env).ok_or(ContractError::Reentrant)?;
        Self::require_not_paused(&env)?;

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        Self::refresh(&env, true);
        let mut holding = Self::settle(&env, &user);
        if holding.balance < amount {
            return Err(ContractError::InsufficientBalance);
        }
        holding.balance = holding.balance.saturating_sub(amount);
        holding::store_holding(&env, &user, &holding);
        let supply = Self::total_supply(env.clone()).saturating_sub(amount);
        env.storage().instance().set(&SUPPLY, &supply);

        let vaults = liquidity::load_vaults(&env)?;
        let pulled = liquidity::move_to_buffer(&env, &vaults, amount)?;
        if pulled > 0 {
            events::publish_liquidity_moved(
                &env,
                vaults.farming.clone(),
                vaults.buffer.clone(),
                pulled,
            );
        }
        VaultClient::new(&env, &vaults.buffer).transfer_out(&user, &amount);

        events::publish_withdrawn(&env, user, amount);

        Ok(())
    }

    /// Credit `amount` without a matching deposit (bridged supply).
    pub fn mint(
        env: Env,
        caller: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_authorized(&env, &caller, &Action::Mint)?;
        let _guard = ReentrancyGuard::enter(&env).ok_or(ContractError::Reentrant)?;
        Self::require_not_paused(&env)?;

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        if to == env.current_contract_address() {
            return Err(ContractError::ZeroAddress);
        }

        Self::refresh(&env, true);
        let mut holding = Self::settle(&env, &to);
        holding.balance = holding.balance.saturating_add(amount);
        holding::store_holding(&env, &to, &holding);
        let supply = Self::total_supply(env.clone()).saturating_add(amount);
        env.storage().instance().set(&SUPPLY, &supply);

        events::publish_minted(&env, caller, to, amount);

        Ok(())
    }

    // ── Token surface ───────────────────────────────────────────────────────

    pub fn transfer(
        env: Env,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        from.require_auth();
        let _guard = ReentrancyGuard::enter(&env).ok_or(ContractError::Reentrant)?;
        Self::require_not_paused(&env)?;

        Self::transfer_inner(&env, &from, &to, amount)
    }

    pub fn approve(
        env: Env,
        owner: Address,
        spender: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        owner.require_auth();
        Self::require_not_paused(&env)?;

        if amount < 0 {
            return Err(ContractError::InvalidAmount);
        }
        if spender == env.current_contract_address() {
            return Err(ContractError::ZeroAddress);
        }

        holding::store_allowance(&env, &owner, &spender, amount);
        events::publish_approval(&env, owner, spender, amount);

        Ok(())
    }

    pub fn allowance(env: Env, owner: Address, spender: Address) -> i128 {
        holding::load_allowance(&env, &owner, &spender)
    }

    /// Move `amount` from `from` to `to` against the allowance `from`
    /// granted to `spender`. A self-transfer leaves the allowance untouched.
    pub fn transfer_from(
        env: Env,
        spender: Address,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        spender.require_auth();
        let _guard = ReentrancyGuard::enter(&env).ok_or(ContractError::Reentrant)?;
        Self::require_not_paused(&env)?;

        let allowance = holding::load_allowance(&env, &from, &spender);
        if allowance < amount {
            return Err(ContractError::InsufficientAllowance);
        }

        Self::transfer_inner(&env, &from, &to, amount)?;
        if from != to {
            holding::store_allowance(&env, &from, &spender, allowance.saturating_sub(amount));
        }

        Ok(())
    }

    /// Realize the growth of `user`'s balance. Returns the growth, which is
    /// zero when nothing accrued since the last settlement.
    pub fn claim(env: Env, user: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        let _guard = ReentrancyGuard::enter(&env).ok_or(ContractError::Reentrant)?;
        Self::require_not_paused(&env)?;

        Self::refresh(&env, true);
        let before = holding::load_holding(&env, &user).balance;
        let holding = Self::settle(&env, &user);
        holding::store_holding(&env, &user, &holding);

        let growth = holding.balance.saturating_sub(before);
        events::publish_claimed(&env, user, growth, holding.balance);

        Ok(growth)
    }

    /// Force a DF refresh. Returns the DF after it.
    pub fn update(env: Env) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        let _guard = ReentrancyGuard::enter(&env).ok_or(ContractError::Reentrant)?;
        Self::require_not_paused(&env)?;

        Ok(Self::refresh(&env, false))
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Balance including growth not yet settled.
    pub fn balance(env: Env, user: Address) -> i128 {
        holding::load_holding(&env, &user).projected(Self::projected_df(&env))
    }

    /// Balance as of the user's last settlement.
    pub fn settled_balance(env: Env, user: Address) -> i128 {
        holding::load_holding(&env, &user).balance
    }

    /// Sum of settled balances.
    pub fn total_supply(env: Env) -> i128 {
        env.storage().instance().get(&SUPPLY).unwrap_or(0)
    }

    pub fn df(env: Env) -> i128 {
        env.storage().instance().get(&DF).unwrap_or(DF_ONE)
    }

    /// Annual interest in basis points.
    pub fn interest(env: Env) -> i128 {
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

    pub fn buffer_ratio(env: Env) -> i128 {
        env.storage().instance().get(&BUFFER_RATIO).unwrap_or(0)
    }

    pub fn get_vaults(env: Env) -> Result<Vaults, ContractError> {
        liquidity::load_vaults(&env)
    }

    pub fn token(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&TOKEN)
            .ok_or(ContractError::NotInitialized)
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

    /// Change the annual interest. Elapsed time keeps the old rate.
    pub fn set_interest(env: Env, caller: Address, interest: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_authorized(&env, &caller, &Action::SetRate)?;
        let _guard = ReentrancyGuard::enter(&env).ok_or(ContractError::Reentrant)?;

        if interest < 0 {
            return Err(ContractError::InvalidAmount);
        }

        Self::refresh(&env, false);
        let old = checkpoint::current_rate(&env);
        checkpoint::record_rate(&env, interest);

        events::publish_interest_set(&env, old, interest, env.ledger().timestamp());

        Ok(())
    }

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

        events::publish_limit_set(&env, old, limit);

        Ok(())
    }

    /// Share of the supply the buffer vault should hold, in basis points.
    pub fn set_buffer_ratio(env: Env, caller: Address, ratio: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_authorized(&env, &caller, &Action::Configure)?;

        if !(0..=BPS_DENOMINATOR).contains(&ratio) {
            return Err(ContractError::InvalidAmount);
        }

        let old = Self::buffer_ratio(env.clone());
        env.storage().instance().set(&BUFFER_RATIO, &ratio);

        events::publish_ratio_set(&env, old, ratio);

        Ok(())
    }

    /// Rewire the custody pair. Funds already held stay where they are.
    pub fn set_vaults(
        env: Env,
        caller: Address,
        buffer: Address,
        farming: Address,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_authorized(&env, &caller, &Action::Configure)?;

        liquidity::store_vaults(
            &env,
            &Vaults {
                buffer: buffer.clone(),
                farming: farming.clone(),
            },
        );

        events::publish_vaults_set(&env, buffer, farming);

        Ok(())
    }

    pub fn pause(env: Env, caller: Address) -> Result<(), ContractError> {
        Self::set_paused(&env, caller, true)
    }

    pub fn unpause(env: Env, caller: Address) -> Result<(), ContractError> {
        Self::set_paused(&env, caller, false)
    }

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

    fn set_paused(env: &Env, caller: Address, paused: bool) -> Result<(), ContractError> {
        Self::require_initialized(env)?;
        caller.require_auth();
        Self::require_authorized(env, &caller, &Action::Pause)?;

        pausable::set_paused(env, paused);
        events::publish_paused(env, caller, paused);

        Ok(())
    }

    /// Settle both sides, then move `amount`. The caller holds the guard.
    fn transfer_inner(
        env: &Env,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        if *to == env.current_contract_address() {
            return Err(ContractError::ZeroAddress);
        }

        Self::refresh(env, true);
        let mut sender = Self::settle(env, from);
        if sender.balance < amount {
            return Err(ContractError::InsufficientBalance);
        }
        if from == to {
            holding::store_holding(env, from, &sender);
            return Ok(());
        }
        sender.balance = sender.balance.saturating_sub(amount);
        holding::store_holding(env, from, &sender);

        let mut receiver = Self::settle(env, to);
        receiver.balance = receiver.balance.saturating_add(amount);
        holding::store_holding(env, to, &receiver);

        events::publish_transfer(env, from.clone(), to.clone(), amount);

        Ok(())
    }

    /// Compound the DF up to the current ledger time.
    ///
    /// Anything that settles or moves a balance passes `forced` and skips the
    /// update time limit, so a balance never starts from a stale DF. Returns
    /// the DF in force afterwards.
    fn refresh(env: &Env, forced: bool) -> i128 {
        let df = Self::df(env.clone());

        let refresh = if forced {
            checkpoint::take_forced(env)
        } else {
            checkpoint::take(env)
        };
        match refresh {
            Refresh::Advanced { from, to, integral } => {
                if Self::total_supply(env.clone()) <= 0 {
                    return df;
                }
                let next = accrual::grow_df(df, integral);
                env.storage().instance().set(&DF, &next);
                events::publish_df_updated(env, df, next, from, to);
                next
            }
            Refresh::Deferred => {
                log!(env, "df refresh deferred by update time limit");
                df
            }
            Refresh::Current => df,
        }
    }

    /// DF a refresh at the current time would produce.
    fn projected_df(env: &Env) -> i128 {
        let df = Self::df(env.clone());
        match checkpoint::peek(env) {
            Refresh::Advanced { integral, .. } if Self::total_supply(env.clone()) > 0 => {
                accrual::grow_df(df, integral)
            }
            _ => df,
        }
    }

    /// Restate `user` at the current DF and book the growth into the supply.
    /// The caller persists the returned holding.
    fn settle(env: &Env, user: &Address) -> Holding {
        let mut holding = holding::load_holding(env, user);
        let growth = holding.settle(Self::df(env.clone()));
        if growth > 0 {
            let supply = Self::total_supply(env.clone()).saturating_add(growth);
            env.storage().instance().set(&SUPPLY, &supply);
        }
        holding
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
