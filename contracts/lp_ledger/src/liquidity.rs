use common::accrual::BPS_DENOMINATOR;
use common::vault::VaultClient;
use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::ContractError;

const VAULTS: Symbol = symbol_short!("VAULTS");

/// The custody pair behind the ledger.
///
/// Deposits land in `buffer`, which serves withdrawals. Whatever the buffer
/// holds above its target share of the supply is swept to `farming`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Vaults {
    pub buffer: Address,
    pub farming: Address,
}

pub fn load_vaults(env: &Env) -> Result<Vaults, ContractError> {
    env.storage()
        .instance()
        .get(&VAULTS)
        .ok_or(ContractError::NotInitialized)
}

pub fn store_vaults(env: &Env, vaults: &Vaults) {
    env.storage().instance().set(&VAULTS, vaults);
}

/// Buffer holding the pool aims for: `ratio_bps` of the supply.
#[allow(clippy::arithmetic_side_effects)]
pub fn buffer_target(supply: i128, ratio_bps: i128) -> i128 {
    if supply <= 0 || ratio_bps <= 0 {
        return 0;
    }
    supply.saturating_mul(ratio_bps) / BPS_DENOMINATOR
}

/// Sweep the buffer's excess over `target` into the farming vault.
/// Returns the amount moved.
pub fn move_to_farming(env: &Env, vaults: &Vaults, target: i128) -> i128 {
    let buffer = VaultClient::new(env, &vaults.buffer);
    let excess = buffer.balance().saturating_sub(target);
    if excess <= 0 {
        return 0;
    }
    buffer.transfer_out(&vaults.farming, &excess);
    excess
}

/// Top the buffer up from farming so it can pay `amount`.
///
/// Fails without moving anything when both vaults together cannot cover it.
/// Returns the amount pulled from farming.
pub fn move_to_buffer(env: &Env, vaults: &Vaults, amount: i128) -> Result<i128, ContractError> {
    let in_buffer = VaultClient::new(env, &vaults.buffer).balance();
    let missing = amount.saturating_sub(in_buffer);
    if missing <= 0 {
        return Ok(0);
    }

    let farming = VaultClient::new(env, &vaults.farming);
    if farming.balance() < missing {
        return Err(ContractError::InsufficientLiquidity);
    }
    farming.transfer_out(&vaults.buffer, &missing);
    Ok(missing)
}
