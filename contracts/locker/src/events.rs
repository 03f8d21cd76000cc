use common::access::Action;
use soroban_sdk::{contracttype, symbol_short, Address, Env};

// ── Payloads ────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub lock_token: Address,
    pub reward_token: Address,
    pub reward_per_distribution: i128,
    pub distribution_time: u64,
    pub start_time: u64,
    pub unlock_delay: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LockedEvent {
    pub user: Address,
    pub amount: i128,
    pub total_locked: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnlockedEvent {
    pub user: Address,
    pub amount: i128,
    pub unlock_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawnEvent {
    pub user: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimedEvent {
    pub user: Address,
    pub amount: i128,
}

/// Emitted when a claim is capped by the reward pool. `unpaid` stays
/// claimable.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShortfallEvent {
    pub user: Address,
    pub paid: i128,
    pub unpaid: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardAddedEvent {
    pub funder: Address,
    pub amount: i128,
    pub total_funded: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RateSetEvent {
    pub old_rate: i128,
    pub new_rate: i128,
    pub effective_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigSetEvent {
    pub old_value: u64,
    pub new_value: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleEvent {
    pub target: Address,
    pub action: Action,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(env: &Env, event: InitializedEvent) {
    env.events().publish((symbol_short!("INIT"),), event);
}

pub fn publish_locked(env: &Env, user: Address, amount: i128, total_locked: i128) {
    env.events().publish(
        (symbol_short!("LOCKED"), user.clone()),
        LockedEvent {
            user,
            amount,
            total_locked,
        },
    );
}

pub fn publish_unlocked(env: &Env, user: Address, amount: i128, unlock_at: u64) {
    env.events().publish(
        (symbol_short!("UNLOCKED"), user.clone()),
        UnlockedEvent {
            user,
            amount,
            unlock_at,
        },
    );
}

pub fn publish_withdrawn(env: &Env, user: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("WITHDRAWN"), user.clone()),
        WithdrawnEvent { user, amount },
    );
}

pub fn publish_claimed(env: &Env, user: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("CLAIMED"), user.clone()),
        ClaimedEvent { user, amount },
    );
}

pub fn publish_shortfall(env: &Env, user: Address, paid: i128, unpaid: i128) {
    env.events().publish(
        (symbol_short!("SHORTFALL"), user.clone()),
        ShortfallEvent { user, paid, unpaid },
    );
}

pub fn publish_reward_added(env: &Env, funder: Address, amount: i128, total_funded: i128) {
    env.events().publish(
        (symbol_short!("RWD_ADD"), funder.clone()),
        RewardAddedEvent {
            funder,
            amount,
            total_funded,
        },
    );
}

pub fn publish_rate_set(env: &Env, old_rate: i128, new_rate: i128, effective_at: u64) {
    env.events().publish(
        (symbol_short!("RATE_SET"),),
        RateSetEvent {
            old_rate,
            new_rate,
            effective_at,
        },
    );
}

pub fn publish_unlock_delay_set(env: &Env, old_value: u64, new_value: u64) {
    env.events().publish(
        (symbol_short!("DELAY_SET"),),
        ConfigSetEvent {
            old_value,
            new_value,
        },
    );
}

pub fn publish_update_limit_set(env: &Env, old_value: u64, new_value: u64) {
    env.events().publish(
        (symbol_short!("LIMIT_SET"),),
        ConfigSetEvent {
            old_value,
            new_value,
        },
    );
}

pub fn publish_paused(env: &Env, caller: Address, paused: bool) {
    let topic = if paused {
        symbol_short!("PAUSED")
    } else {
        symbol_short!("UNPAUSED")
    };
    env.events().publish((topic,), caller);
}

pub fn publish_role_granted(env: &Env, target: Address, action: Action) {
    env.events().publish(
        (symbol_short!("ROLE_GRT"), target.clone()),
        RoleEvent { target, action },
    );
}

pub fn publish_role_revoked(env: &Env, target: Address, action: Action) {
    env.events().publish(
        (symbol_short!("ROLE_REV"), target.clone()),
        RoleEvent { target, action },
    );
}
