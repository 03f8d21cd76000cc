use soroban_sdk::{contractclient, Address, Env};

/// Interface a custody vault exposes to the pool that owns it.
///
/// Only the registered pool may move funds out; `balance` is the vault's
/// holding of its base asset.
#[contractclient(name = "VaultClient")]
pub trait VaultInterface {
    fn transfer_out(env: Env, to: Address, amount: i128);
    fn balance(env: Env) -> i128;
    fn token(env: Env) -> Address;
}
