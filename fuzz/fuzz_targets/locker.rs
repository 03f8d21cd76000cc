#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use locker::{LockerContract, LockerContractClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token, Address, Env,
};

const UNIT: i128 = 10_000_000;
const DAY: u64 = 86_400;
const USERS: usize = 3;

#[derive(Arbitrary, Debug)]
enum Op {
    Lock { user: u8, amount: u32 },
    Unlock { user: u8, amount: u32 },
    UnlockAll { user: u8 },
    Withdraw { user: u8 },
    Claim { user: u8 },
    Advance { seconds: u32 },
    SetReward { tokens_per_day: u16 },
    SetUpdateLimit { seconds: u32 },
    Update,
}

fuzz_target!(|ops: Vec<Op>| {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().with_mut(|l| l.timestamp = 1_000);

    let admin = Address::generate(&env);
    let lock_asset = env.register_stellar_asset_contract_v2(admin.clone());
    let reward_asset = env.register_stellar_asset_contract_v2(admin.clone());
    let client = LockerContractClient::new(&env, &env.register(LockerContract, ()));
    client.initialize(
        &admin,
        &lock_asset.address(),
        &reward_asset.address(),
        &(86_400 * UNIT),
        &DAY,
        &1_000,
        &(5 * DAY),
    );

    let funding = 1_000_000_000 * UNIT;
    token::StellarAssetClient::new(&env, &reward_asset.address()).mint(&admin, &funding);
    client.add_reward(&admin, &funding);

    let users: Vec<Address> = (0..USERS)
        .map(|_| {
            let user = Address::generate(&env);
            token::StellarAssetClient::new(&env, &lock_asset.address())
                .mint(&user, &(1_000_000 * UNIT));
            user
        })
        .collect();
    let pick = |i: u8| &users[i as usize % USERS];

    // Pro-rata model: what each user should have earned, and what they took.
    let mut expected = [0i128; USERS];
    let mut paid = [0i128; USERS];
    let ops = &ops[..ops.len().min(64)];

    for op in ops.iter() {
        match *op {
            Op::Lock { user, amount } => {
                let _ = client.try_lock(pick(user), &(amount as i128));
            }
            Op::Unlock { user, amount } => {
                let _ = client.try_unlock(pick(user), &(amount as i128));
            }
            Op::UnlockAll { user } => {
                let _ = client.try_unlock_all(pick(user));
            }
            Op::Withdraw { user } => {
                let _ = client.try_withdraw(pick(user));
            }
            Op::Claim { user } => {
                if let Ok(Ok(amount)) = client.try_claim(pick(user)) {
                    paid[user as usize % USERS] += amount;
                }
            }
            Op::Advance { seconds } => {
                let dt = u64::from(seconds % (30 * DAY as u32));
                let weights: Vec<i128> = users.iter().map(|u| client.locked_of(u)).collect();
                let total: i128 = weights.iter().sum();
                if total > 0 {
                    let emitted = client.reward_rate() * dt as i128;
                    for (share, weight) in expected.iter_mut().zip(weights.iter()) {
                        *share += emitted * weight / (DAY as i128 * total);
                    }
                }
                env.ledger().with_mut(|l| l.timestamp += dt);
            }
            Op::SetReward { tokens_per_day } => {
                let _ = client.try_set_reward(&admin, &(tokens_per_day as i128 * UNIT));
            }
            Op::SetUpdateLimit { seconds } => {
                let limit = u64::from(seconds % (7 * DAY as u32));
                let _ = client.try_set_update_time_limit(&admin, &limit);
            }
            Op::Update => {
                let _ = client.try_update();
            }
        }

        let held: i128 = users
            .iter()
            .map(|u| client.locked_of(u) + client.unlocking_of(u))
            .sum();
        assert_eq!(held, client.total_supply());
        assert!(client.total_distributed() <= client.total_funded());
        assert!(
            token::Client::new(&env, &lock_asset.address()).balance(&client.address)
                >= client.total_supply()
        );
    }

    // Flush every pending span, then compare entitlements with the model.
    client.set_update_time_limit(&admin, &0);
    client.update();
    let tolerance = 2 * ops.len() as i128 + 4;
    for (i, user) in users.iter().enumerate() {
        let entitled = paid[i] + client.get_claim(user);
        assert!(
            (entitled - expected[i]).abs() <= tolerance,
            "user {i}: entitled {entitled}, pro-rata {}",
            expected[i]
        );
    }
});
