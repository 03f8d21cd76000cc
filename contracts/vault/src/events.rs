use soroban_sdk::{contracttype, symbol_short, Address, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub token: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolSetEvent {
    pub old_pool: Option<Address>,
    pub new_pool: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TransferredOutEvent {
    pub to: Address,
    pub amount: i128,
    pub remaining: i128,
}

pub fn publish_initialized(env: &Env, admin: Address, token: Address) {
    env.events()
        .publish((symbol_short!("INIT"),), InitializedEvent { admin, token });
}

pub fn publish_pool_set(env: &Env, old_pool: Option<Address>, new_pool: Address) {
    env.events().publish(
        (symbol_short!("POOL_SET"), new_pool.clone()),
        PoolSetEvent { old_pool, new_pool },
    );
}

pub fn publish_transferred_out(env: &Env, to: Address, amount: i128, remaining: i128) {
    env.events().publish(
        (symbol_short!("XFER_OUT"), to.clone()),
        TransferredOutEvent {
            to,
            amount,
            remaining,
        },
    );
}
