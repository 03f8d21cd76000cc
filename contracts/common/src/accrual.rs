/// Fixed-point scaling factor for reward-per-weight accumulators.
///
/// Accumulator values are multiplied by this constant before storage to keep
/// sub-unit precision without floating-point arithmetic. 10^12 leaves ample
/// headroom in `i128` for 7-decimal Stellar amounts.
pub const ACC_PRECISION: i128 = 1_000_000_000_000;

/// Fixed-point representation of a distribution factor of exactly 1.0.
pub const DF_ONE: i128 = 1_000_000_000_000_000_000;

/// Interest rates are expressed in basis points per year.
pub const BPS_DENOMINATOR: i128 = 10_000;

/// Seconds in the 365-day year used to prorate annual interest.
pub const YEAR: u64 = 365 * 24 * 60 * 60;

// ── Reward-per-weight accumulator ───────────────────────────────────────────

/// Advance a reward-per-weight accumulator over one checkpoint interval.
///
/// ```text
/// Δacc = integral × ACC_PRECISION / (period × total_weight)
/// ```
///
/// `integral` is Σ rate × seconds over the interval, where `rate` is the
/// amount emitted per `period` seconds. With no weight staked the interval
/// distributes nothing and `stored` is returned unchanged.
#[allow(clippy::arithmetic_side_effects)]
pub fn compute_reward_per_token(
    stored: i128,
    integral: i128,
    period: u64,
    total_weight: i128,
) -> i128 {
    if total_weight <= 0 || period == 0 || integral <= 0 {
        return stored;
    }

    let delta =
        integral.saturating_mul(ACC_PRECISION) / (period as i128).saturating_mul(total_weight);

    stored.saturating_add(delta)
}

/// Rewards owed to one account.
///
/// ```text
/// earned = weight × (current − snapshot) / ACC_PRECISION + carry
/// ```
///
/// Only the accumulation since the account's snapshot is priced, so earlier
/// settlements are never double-counted. Truncation dust is forfeited.
#[allow(clippy::arithmetic_side_effects)]
pub fn earned(weight: i128, current: i128, snapshot: i128, carry: i128) -> i128 {
    let new_rewards = weight.saturating_mul(current.saturating_sub(snapshot)) / ACC_PRECISION;

    carry.saturating_add(new_rewards)
}

// ── Distribution factor ─────────────────────────────────────────────────────

/// Compound the distribution factor once over an interval.
///
/// ```text
/// df' = df + df × integral / (BPS_DENOMINATOR × YEAR)
/// ```
///
/// `integral` is Σ rate_bps × seconds, so an interval that crosses a rate
/// change is priced at each regime's own rate.
#[allow(clippy::arithmetic_side_effects)]
pub fn grow_df(df: i128, integral: i128) -> i128 {
    if integral <= 0 {
        return df;
    }
    let growth = df.saturating_mul(integral) / BPS_DENOMINATOR.saturating_mul(YEAR as i128);
    df.saturating_add(growth)
}

/// Restate a balance settled at `df_then` in terms of `df_now`.
#[allow(clippy::arithmetic_side_effects)]
pub fn rebase(balance: i128, df_now: i128, df_then: i128) -> i128 {
    if df_then <= 0 || df_now == df_then {
        return balance;
    }
    balance.saturating_mul(df_now) / df_then
}

// ── Unit tests ──────────────────────────────────────────────────────────────
