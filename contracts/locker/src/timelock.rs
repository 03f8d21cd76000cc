use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::ContractError;

// ── Storage key constants ───────────────────────────────────────────────────

const POSITION: Symbol = symbol_short!("POSITION");

const POSITION_TTL_THRESHOLD: u32 = 5_184_000; // ~60 days
const POSITION_TTL_EXTEND_TO: u32 = 10_368_000; // ~120 days

// ── Types ───────────────────────────────────────────────────────────────────

/// A locker's position: locked weight, the unlocking bucket and its reward
/// bookkeeping.
///
/// `locked + unlocking` is everything the account has deposited and not yet
/// withdrawn. Only `locked` earns rewards. The unlocking bucket matures as a
/// whole at `unlock_at`; every new unlock restarts that timer.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LockPosition {
    pub locked: i128,
    pub unlocking: i128,
    /// Ledger timestamp from which `unlocking` may be withdrawn.
    pub unlock_at: u64,
    /// Accumulator value at the last settlement.
    pub reward_snapshot: i128,
    /// Settled rewards not yet paid out.
    pub unclaimed: i128,
}

impl LockPosition {
    pub fn lock(&mut self, amount: i128) {
        self.locked = self.locked.saturating_add(amount);
    }

    /// Move `amount` from locked into the unlocking bucket.
    ///
    /// The delay restarts for the whole bucket, including amounts that were
    /// already maturing.
    pub fn unlock(&mut self, amount: i128, now: u64, delay: u64) -> Result<(), ContractError> {
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        if amount > self.locked {
            return Err(ContractError::InsufficientLocked);
        }

        self.locked = self.locked.saturating_sub(amount);
        self.unlocking = self.unlocking.saturating_add(amount);
        self.unlock_at = now.saturating_add(delay);
        Ok(())
    }

    /// Empty the unlocking bucket once it has matured, returning its size.
    pub fn take_withdrawable(&mut self, now: u64) -> Result<i128, ContractError> {
        if self.unlocking <= 0 {
            return Err(ContractError::NothingToWithdraw);
        }
        if now < self.unlock_at {
            return Err(ContractError::NotYetAvailable);
        }

        let amount = self.unlocking;
        self.unlocking = 0;
        Ok(amount)
    }

    /// Amount that `take_withdrawable` would release at `now`.
    pub fn withdrawable(&self, now: u64) -> i128 {
        if self.unlocking > 0 && now >= self.unlock_at {
            self.unlocking
        } else {
            0
        }
    }
}

// ── Storage helpers ─────────────────────────────────────────────────────────

fn position_key(owner: &Address) -> (Symbol, Address) {
    (POSITION, owner.clone())
}

/// Load a position; accounts that never locked read as all-zero.
pub fn load_position(env: &Env, owner: &Address) -> LockPosition {
    env.storage()
        .persistent()
        .get(&position_key(owner))
        .unwrap_or_default()
}

/// Persist a position and keep it alive. Zeroed positions are kept, never
/// removed.
pub fn store_position(env: &Env, owner: &Address, position: &LockPosition) {
    let key = position_key(owner);
    env.storage().persistent().set(&key, position);
    env.storage()
        .persistent()
        .extend_ttl(&key, POSITION_TTL_THRESHOLD, POSITION_TTL_EXTEND_TO);
}
