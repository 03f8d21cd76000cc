#![no_std]

pub mod events;

use common::access;
use soroban_sdk::{contract, contractimpl, symbol_short, token, Address, Env, Symbol};

/// Storage keys for the contract
const INITIALIZED: Symbol = symbol_short!("INIT");
const TOKEN: Symbol = symbol_short!("TOKEN");
const POOL: Symbol = symbol_short!("POOL");

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum VaultError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidAmount = 4,
    InsufficientLiquidity = 5,
    PoolNotSet = 6,
}

/// Custody vault holding one pool's base asset.
///
/// A pool typically wires two of these: a buffer that serves withdrawals
/// and a farming vault that holds the excess.
#[contract]
pub struct VaultContract;

#[contractimpl]
impl VaultContract {
    /// Initialize the vault for `token`.
    pub fn initialize(env: Env, admin: Address, token: Address) -> Result<(), VaultError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(VaultError::AlreadyInitialized);
        }

        access::set_admin(&env, &admin);
        env.storage().instance().set(&TOKEN, &token);
        env.storage().instance().set(&INITIALIZED, &true);

        events::publish_initialized(&env, admin, token);

        Ok(())
    }

    /// Register the pool allowed to move funds out.
    pub fn set_pool(env: Env, caller: Address, pool: Address) -> Result<(), VaultError> {
        caller.require_auth();
        let admin = access::get_admin(&env).ok_or(VaultError::NotInitialized)?;
        if caller != admin {
            return Err(VaultError::Unauthorized);
        }

        let old_pool: Option<Address> = env.storage().instance().get(&POOL);
        env.storage().instance().set(&POOL, &pool);

        events::publish_pool_set(&env, old_pool, pool);

        Ok(())
    }

    /// Send `amount` of the base asset to `to`. Pool only.
    pub fn transfer_out(env: Env, to: Address, amount: i128) -> Result<(), VaultError> {
        let pool: Address = env
            .storage()
            .instance()
            .get(&POOL)
            .ok_or(VaultError::PoolNotSet)?;
        pool.require_auth();

        if amount <= 0 {
            return Err(VaultError::InvalidAmount);
        }

        let client = token::Client::new(&env, &Self::token(env.clone())?);
        let held = client.balance(&env.current_contract_address());
        if held < amount {
            return Err(VaultError::InsufficientLiquidity);
        }

        client.transfer(&env.current_contract_address(), &to, &amount);

        events::publish_transferred_out(&env, to, amount, held.saturating_sub(amount));

        Ok(())
    }

    /// Base-asset balance held by the vault.
    pub fn balance(env: Env) -> Result<i128, VaultError> {
        let token = Self::token(env.clone())?;
        Ok(token::Client::new(&env, &token).balance(&env.current_contract_address()))
    }

    pub fn token(env: Env) -> Result<Address, VaultError> {
        env.storage()
            .instance()
            .get(&TOKEN)
            .ok_or(VaultError::NotInitialized)
    }

    pub fn get_pool(env: Env) -> Option<Address> {
        env.storage().instance().get(&POOL)
    }

    pub fn get_admin(env: Env) -> Result<Address, VaultError> {
        access::get_admin(&env).ok_or(VaultError::NotInitialized)
    }
}
