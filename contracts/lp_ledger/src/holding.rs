use common::accrual;
use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

const HOLDING: Symbol = symbol_short!("HOLDING");
const ALLOWANCE: Symbol = symbol_short!("ALLOW");

const TTL_THRESHOLD: u32 = 5_184_000; // ~60 days
const TTL_EXTEND_TO: u32 = 10_368_000; // ~120 days

/// A balance stated in terms of the distribution factor it was last settled
/// at. `last_df == 0` marks an account that never held anything.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Holding {
    pub balance: i128,
    pub last_df: i128,
}

impl Holding {
    /// Restate the balance at `df` and return the growth realized.
    pub fn settle(&mut self, df: i128) -> i128 {
        if self.last_df == 0 {
            self.last_df = df;
            return 0;
        }

        let before = self.balance;
        self.balance = accrual::rebase(self.balance, df, self.last_df);
        self.last_df = df;
        self.balance.saturating_sub(before)
    }

    /// Balance as it would read after settling at `df`.
    pub fn projected(&self, df: i128) -> i128 {
        if self.last_df == 0 {
            return self.balance;
        }
        accrual::rebase(self.balance, df, self.last_df)
    }
}

fn holding_key(owner: &Address) -> (Symbol, Address) {
    (HOLDING, owner.clone())
}

fn allowance_key(owner: &Address, spender: &Address) -> (Symbol, Address, Address) {
    (ALLOWANCE, owner.clone(), spender.clone())
}

pub fn load_holding(env: &Env, owner: &Address) -> Holding {
    env.storage()
        .persistent()
        .get(&holding_key(owner))
        .unwrap_or_default()
}

pub fn store_holding(env: &Env, owner: &Address, holding: &Holding) {
    let key = holding_key(owner);
    env.storage().persistent().set(&key, holding);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn load_allowance(env: &Env, owner: &Address, spender: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&allowance_key(owner, spender))
        .unwrap_or(0)
}

/// A zero allowance removes the entry.
pub fn store_allowance(env: &Env, owner: &Address, spender: &Address, amount: i128) {
    let key = allowance_key(owner, spender);
    if amount == 0 {
        env.storage().persistent().remove(&key);
        return;
    }
    env.storage().persistent().set(&key, &amount);
}
