use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

const ADMIN: Symbol = symbol_short!("ADMIN");
const GRANT: Symbol = symbol_short!("GRANT");
const GRANT_TTL_THRESHOLD: u32 = 5_184_000; // ~60 days
const GRANT_TTL_EXTEND_TO: u32 = 10_368_000; // ~120 days

/// Capabilities an address can be granted on a pool.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Action {
    /// Change the emission or interest rate.
    SetRate,
    /// Change delays, throttle interval, vault wiring.
    Configure,
    /// Toggle the global circuit breaker.
    Pause,
    /// Mint bridged balances without a matching deposit.
    Mint,
}

fn grant_key(address: &Address, action: &Action) -> (Symbol, Address, Action) {
    (GRANT, address.clone(), action.clone())
}

fn extend_grant_ttl(env: &Env, key: &(Symbol, Address, Action)) {
    env.storage()
        .persistent()
        .extend_ttl(key, GRANT_TTL_THRESHOLD, GRANT_TTL_EXTEND_TO);
}

/// Stores the pool administrator. The admin is implicitly authorized for
/// every [`Action`].
pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&ADMIN, admin);
}

/// Returns the administrator, or `None` before initialization.
pub fn get_admin(env: &Env) -> Option<Address> {
    env.storage().instance().get(&ADMIN)
}

/// Grants `action` to `address`.
pub fn grant(env: &Env, address: &Address, action: &Action) {
    let key = grant_key(address, action);
    env.storage().persistent().set(&key, &true);
    extend_grant_ttl(env, &key);
}

/// Revokes `action` from `address`. Revoking a missing grant is a no-op.
pub fn revoke(env: &Env, address: &Address, action: &Action) {
    env.storage().persistent().remove(&grant_key(address, action));
}

/// Returns whether `address` holds an explicit grant for `action`.
pub fn has_grant(env: &Env, address: &Address, action: &Action) -> bool {
    let key = grant_key(address, action);
    let granted = env.storage().persistent().get(&key).unwrap_or(false);
    if granted {
        extend_grant_ttl(env, &key);
    }
    granted
}

/// Capability check used before rate changes, pausing and configuration.
pub fn is_authorized(env: &Env, caller: &Address, action: &Action) -> bool {
    match get_admin(env) {
        Some(admin) if admin == *caller => true,
        _ => has_grant(env, caller, action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soroban_sdk::{contract, testutils::Address as _};

    #[contract]
    pub struct Dummy;

    #[test]
    fn admin_is_authorized_for_everything() {
        let env = Env::default();
        let id = env.register(Dummy, ());
        let admin = Address::generate(&env);
        env.as_contract(&id, || {
            set_admin(&env, &admin);
            assert!(is_authorized(&env, &admin, &Action::SetRate));
            assert!(is_authorized(&env, &admin, &Action::Mint));
        });
    }

    #[test]
    fn grants_are_per_action() {
        let env = Env::default();
        let id = env.register(Dummy, ());
        let admin = Address::generate(&env);
        let operator = Address::generate(&env);
        env.as_contract(&id, || {
            set_admin(&env, &admin);
            assert!(!is_authorized(&env, &operator, &Action::Pause));

            grant(&env, &operator, &Action::Pause);
            assert!(is_authorized(&env, &operator, &Action::Pause));
            assert!(!is_authorized(&env, &operator, &Action::SetRate));

            revoke(&env, &operator, &Action::Pause);
            assert!(!is_authorized(&env, &operator, &Action::Pause));
        });
    }
}
