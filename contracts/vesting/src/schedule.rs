use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

const BENEFICIARY: Symbol = symbol_short!("BENEF");

/// Allocation of one beneficiary.
///
/// `countdown_start` is meaningful only once `started` is set; the linear
/// release begins `cliff` seconds after it.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Allocation {
    pub total: i128,
    pub paid_out: i128,
    pub countdown_start: u64,
    pub started: bool,
}

impl Allocation {
    pub fn vesting_start(&self, cliff: u64) -> u64 {
        self.countdown_start.saturating_add(cliff)
    }

    /// Amount released by `now`, paid or not.
    ///
    /// ```text
    /// vested = total × clamp(now − vesting_start, 0, duration) / duration
    /// ```
    #[allow(clippy::arithmetic_side_effects)]
    pub fn vested(&self, now: u64, cliff: u64, duration: u64) -> i128 {
        if !self.started || duration == 0 {
            return 0;
        }
        let start = self.vesting_start(cliff);
        if now <= start {
            return 0;
        }
        let elapsed = (now - start).min(duration);
        self.total.saturating_mul(elapsed as i128) / duration as i128
    }

    /// Vested and not yet paid.
    pub fn available(&self, now: u64, cliff: u64, duration: u64) -> i128 {
        self.vested(now, cliff, duration)
            .saturating_sub(self.paid_out)
            .max(0)
    }
}

fn allocation_key(user: &Address) -> (Symbol, Address) {
    (BENEFICIARY, user.clone())
}

pub fn load_allocation(env: &Env, user: &Address) -> Option<Allocation> {
    env.storage().persistent().get(&allocation_key(user))
}

pub fn store_allocation(env: &Env, user: &Address, allocation: &Allocation) {
    env.storage()
        .persistent()
        .set(&allocation_key(user), allocation);
}
