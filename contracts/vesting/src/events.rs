use soroban_sdk::{contracttype, symbol_short, Address, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub owner: Address,
    pub token: Address,
    pub cliff: u64,
    pub duration: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UserAddedEvent {
    pub user: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CountdownStartedEvent {
    pub user: Address,
    pub vesting_start: u64,
    pub vesting_end: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimedEvent {
    pub user: Address,
    pub amount: i128,
    pub paid_out: i128,
}

pub fn publish_initialized(env: &Env, owner: Address, token: Address, cliff: u64, duration: u64) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            owner,
            token,
            cliff,
            duration,
        },
    );
}

pub fn publish_user_added(env: &Env, user: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("USER_ADD"), user.clone()),
        UserAddedEvent { user, amount },
    );
}

pub fn publish_countdown_started(env: &Env, user: Address, vesting_start: u64, vesting_end: u64) {
    env.events().publish(
        (symbol_short!("COUNTDOWN"), user.clone()),
        CountdownStartedEvent {
            user,
            vesting_start,
            vesting_end,
        },
    );
}

pub fn publish_claimed(env: &Env, user: Address, amount: i128, paid_out: i128) {
    env.events().publish(
        (symbol_short!("CLAIMED"), user.clone()),
        ClaimedEvent {
            user,
            amount,
            paid_out,
        },
    );
}
