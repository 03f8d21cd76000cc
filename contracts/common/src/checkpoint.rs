use soroban_sdk::{contracttype, symbol_short, vec, Env, Symbol, Vec};

// ── Storage key constants ───────────────────────────────────────────────────

const RATE_HIST: Symbol = symbol_short!("RATE_HST");
const LAST_CKPT: Symbol = symbol_short!("LAST_CKP");
const MIN_INTVL: Symbol = symbol_short!("MIN_INTV");

// ── Types ───────────────────────────────────────────────────────────────────

/// One entry of the append-only rate log.
///
/// `rate` is active from `start` (inclusive) until the next entry's `start`.
/// Entries are strictly increasing in `start`; the last one is the live rate.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RatePoint {
    pub start: u64,
    pub rate: i128,
}

/// What a refresh request resolves to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Refresh {
    /// The clock has not moved past the last checkpoint.
    Current,
    /// Inside the throttle window. Elapsed time stays pending for the next
    /// effective refresh, which integrates the whole span.
    Deferred,
    /// `[from, to)` is consumed; `integral` is Σ rate × seconds across it.
    Advanced { from: u64, to: u64, integral: i128 },
}

// ── Pure scheduling ─────────────────────────────────────────────────────────

/// Σ rate × seconds over `[from, to)`, split at every rate change.
///
/// Walks the log backwards so only the entries overlapping the interval are
/// visited. Time before the first entry contributes nothing.
#[allow(clippy::arithmetic_side_effects)]
pub fn rate_integral(history: &Vec<RatePoint>, from: u64, to: u64) -> i128 {
    if to <= from {
        return 0;
    }

    let mut total: i128 = 0;
    let mut end = to;
    let mut i = history.len();
    while i > 0 {
        i -= 1;
        let Some(point) = history.get(i) else {
            break;
        };
        let lo = point.start.max(from);
        if end > lo {
            total = total.saturating_add(point.rate.saturating_mul((end - lo) as i128));
        }
        if point.start <= from {
            break;
        }
        end = end.min(point.start);
    }
    total
}

/// Decide whether `[last, now)` can be consumed now.
pub fn plan(history: &Vec<RatePoint>, last: u64, now: u64, min_interval: u64) -> Refresh {
    if now <= last {
        return Refresh::Current;
    }
    if min_interval > 0 && now.saturating_sub(last) < min_interval {
        return Refresh::Deferred;
    }
    Refresh::Advanced {
        from: last,
        to: now,
        integral: rate_integral(history, last, now),
    }
}

/// Append `rate` effective at `now`. A second change at the same timestamp
/// replaces the pending entry so `start` stays strictly increasing.
pub fn push_rate(history: &mut Vec<RatePoint>, now: u64, rate: i128) {
    if let Some(last) = history.last() {
        if last.start >= now {
            history.set(history.len() - 1, RatePoint { start: last.start, rate });
            return;
        }
    }
    history.push_back(RatePoint { start: now, rate });
}

// ── Storage-backed scheduler ────────────────────────────────────────────────

/// Start the schedule at the current ledger time with `rate` active.
pub fn init(env: &Env, rate: i128, min_interval: u64) {
    let now = env.ledger().timestamp();
    let history = vec![env, RatePoint { start: now, rate }];
    env.storage().instance().set(&RATE_HIST, &history);
    env.storage().instance().set(&LAST_CKPT, &now);
    env.storage().instance().set(&MIN_INTVL, &min_interval);
}

/// The full rate log.
pub fn history(env: &Env) -> Vec<RatePoint> {
    env.storage()
        .instance()
        .get(&RATE_HIST)
        .unwrap_or(Vec::new(env))
}

/// The rate in force right now.
pub fn current_rate(env: &Env) -> i128 {
    history(env).last().map(|p| p.rate).unwrap_or(0)
}

/// Record a rate change at the current ledger time.
///
/// Elapsed time before the change stays priced at the old rate whether or not
/// a checkpoint happens in between, including inside a throttle window.
pub fn record_rate(env: &Env, rate: i128) {
    let mut log = history(env);
    push_rate(&mut log, env.ledger().timestamp(), rate);
    env.storage().instance().set(&RATE_HIST, &log);
}

pub fn last_checkpoint(env: &Env) -> u64 {
    env.storage().instance().get(&LAST_CKPT).unwrap_or(0)
}

pub fn min_interval(env: &Env) -> u64 {
    env.storage().instance().get(&MIN_INTVL).unwrap_or(0)
}

pub fn set_min_interval(env: &Env, min_interval: u64) {
    env.storage().instance().set(&MIN_INTVL, &min_interval);
}

/// What a refresh would do right now, without consuming anything.
pub fn peek(env: &Env) -> Refresh {
    plan(
        &history(env),
        last_checkpoint(env),
        env.ledger().timestamp(),
        min_interval(env),
    )
}

/// Resolve a refresh and, when it advances, mark the interval consumed.
///
/// The caller applies `integral` to its own accumulator in the same
/// invocation.
pub fn take(env: &Env) -> Refresh {
    consume(env, peek(env))
}

/// Like [`take`] but ignores the throttle.
///
/// Must run before anything changes the weights the integral is spread
/// over, otherwise the pending span would be priced at the new weights.
pub fn take_forced(env: &Env) -> Refresh {
    let refresh = plan(
        &history(env),
        last_checkpoint(env),
        env.ledger().timestamp(),
        0,
    );
    consume(env, refresh)
}

fn consume(env: &Env, refresh: Refresh) -> Refresh {
    if let Refresh::Advanced { to, .. } = refresh {
        env.storage().instance().set(&LAST_CKPT, &to);
    }
    refresh
}

// ── Unit tests ──────────────────────────────────────────────────────────────
