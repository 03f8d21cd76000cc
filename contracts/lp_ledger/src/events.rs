use common::access::Action;
use soroban_sdk::{contracttype, symbol_short, Address, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub token: Address,
    pub buffer: Address,
    pub farming: Address,
    pub interest: i128,
    pub buffer_ratio: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DepositedEvent {
    pub user: Address,
    pub amount: i128,
    pub balance: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WithdrawnEvent {
    pub user: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferEvent {
    pub from: Address,
    pub to: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApprovalEvent {
    pub owner: Address,
    pub spender: Address,
    pub amount: i128,
}

/// Growth realized into a settled balance by `claim`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimedEvent {
    pub user: Address,
    pub growth: i128,
    pub balance: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MintedEvent {
    pub minter: Address,
    pub to: Address,
    pub amount: i128,
}

/// One compounding step of the distribution factor over `[from, to)`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DfUpdatedEvent {
    pub old_df: i128,
    pub new_df: i128,
    pub from: u64,
    pub to: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InterestSetEvent {
    pub old_interest: i128,
    pub new_interest: i128,
    pub effective_at: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LimitSetEvent {
    pub old_limit: u64,
    pub new_limit: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RatioSetEvent {
    pub old_ratio: i128,
    pub new_ratio: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VaultsSetEvent {
    pub buffer: Address,
    pub farming: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LiquidityMovedEvent {
    pub from: Address,
    pub to: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RoleEvent {
    pub target: Address,
    pub action: Action,
}

pub fn publish_initialized(env: &Env, event: InitializedEvent) {
    env.events().publish((symbol_short!("INIT"),), event);
}

pub fn publish_deposited(env: &Env, user: Address, amount: i128, balance: i128) {
    env.events().publish(
        (symbol_short!("DEPOSIT"), user.clone()),
        DepositedEvent {
            user,
            amount,
            balance,
        },
    );
}

pub fn publish_withdrawn(env: &Env, user: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("WITHDRAWN"), user.clone()),
        WithdrawnEvent { user, amount },
    );
}

pub fn publish_transfer(env: &Env, from: Address, to: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("TRANSFER"), from.clone(), to.clone()),
        TransferEvent { from, to, amount },
    );
}

pub fn publish_approval(env: &Env, owner: Address, spender: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("APPROVE"), owner.clone(), spender.clone()),
        ApprovalEvent {
            owner,
            spender,
            amount,
        },
    );
}

pub fn publish_claimed(env: &Env, user: Address, growth: i128, balance: i128) {
    env.events().publish(
        (symbol_short!("CLAIMED"), user.clone()),
        ClaimedEvent {
            user,
            growth,
            balance,
        },
    );
}

pub fn publish_minted(env: &Env, minter: Address, to: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("MINTED"), to.clone()),
        MintedEvent { minter, to, amount },
    );
}

pub fn publish_df_updated(env: &Env, old_df: i128, new_df: i128, from: u64, to: u64) {
    env.events().publish(
        (symbol_short!("DF_UPD"),),
        DfUpdatedEvent {
            old_df,
            new_df,
            from,
            to,
        },
    );
}

pub fn publish_interest_set(env: &Env, old_interest: i128, new_interest: i128, effective_at: u64) {
    env.events().publish(
        (symbol_short!("RATE_SET"),),
        InterestSetEvent {
            old_interest,
            new_interest,
            effective_at,
        },
    );
}

pub fn publish_limit_set(env: &Env, old_limit: u64, new_limit: u64) {
    env.events().publish(
        (symbol_short!("LIMIT_SET"),),
        LimitSetEvent {
            old_limit,
            new_limit,
        },
    );
}

pub fn publish_ratio_set(env: &Env, old_ratio: i128, new_ratio: i128) {
    env.events().publish(
        (symbol_short!("RATIO_SET"),),
        RatioSetEvent {
            old_ratio,
            new_ratio,
        },
    );
}

pub fn publish_vaults_set(env: &Env, buffer: Address, farming: Address) {
    env.events().publish(
        (symbol_short!("VAULT_SET"),),
        VaultsSetEvent { buffer, farming },
    );
}

pub fn publish_liquidity_moved(env: &Env, from: Address, to: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("REBALANCE"),),
        LiquidityMovedEvent { from, to, amount },
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
