use soroban_sdk::{symbol_short, Env, Symbol};

const IN_CALL: Symbol = symbol_short!("IN_CALL");

/// Single-flight marker held for the duration of a mutating entry point.
///
/// A nested invocation of the same pool (e.g. a token hook calling back in)
/// fails to acquire the guard and must abort instead of observing
/// half-applied bookkeeping. The flag is cleared on drop.
pub struct ReentrancyGuard {
    env: Env,
}

impl ReentrancyGuard {
    /// Acquires the guard, or returns `None` when a call is already in flight.
    pub fn enter(env: &Env) -> Option<Self> {
        let busy: bool = env.storage().instance().get(&IN_CALL).unwrap_or(false);
        if busy {
            return None;
        }
        env.storage().instance().set(&IN_CALL, &true);
        Some(Self { env: env.clone() })
    }
}

impl Drop for ReentrancyGuard {
    fn drop(&mut self) {
        self.env.storage().instance().remove(&IN_CALL);
    }
}
