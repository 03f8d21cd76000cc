#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lp_ledger::{LpLedgerContract, LpLedgerContractClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token, Address, Env,
};
use vault::{VaultContract, VaultContractClient};

const UNIT: i128 = 10_000_000;
const USERS: usize = 3;

#[derive(Arbitrary, Debug)]
enum Op {
    Deposit { user: u8, amount: u32 },
    Withdraw { user: u8, amount: u32 },
    Transfer { from: u8, to: u8, amount: u32 },
    Claim { user: u8 },
    Advance { seconds: u32 },
    SetInterest { bps: u16 },
    SetUpdateLimit { seconds: u32 },
    Update,
}

fuzz_target!(|ops: Vec<Op>| {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().with_mut(|l| l.timestamp = 1_000);

    let admin = Address::generate(&env);
    let asset = env.register_stellar_asset_contract_v2(admin.clone());
    let minter = token::StellarAssetClient::new(&env, &asset.address());

    let buffer = VaultContractClient::new(&env, &env.register(VaultContract, ()));
    let farming = VaultContractClient::new(&env, &env.register(VaultContract, ()));
    buffer.initialize(&admin, &asset.address());
    farming.initialize(&admin, &asset.address());

    let client = LpLedgerContractClient::new(&env, &env.register(LpLedgerContract, ()));
    client.initialize(
        &admin,
        &asset.address(),
        &buffer.address,
        &farming.address,
        &800,
        &1_000,
    );
    buffer.set_pool(&admin, &client.address);
    farming.set_pool(&admin, &client.address);
    // Yield backing so withdrawals of grown balances can be served.
    minter.mint(&farming.address, &(1_000_000_000 * UNIT));

    let users: Vec<Address> = (0..USERS)
        .map(|_| {
            let user = Address::generate(&env);
            minter.mint(&user, &(1_000_000 * UNIT));
            user
        })
        .collect();
    let pick = |i: u8| &users[i as usize % USERS];

    let mut last_df = client.df();
    for op in ops.iter().take(64) {
        // Whether the op settled or moved a balance.
        let moved = match *op {
            Op::Deposit { user, amount } => {
                client.try_deposit(pick(user), &(amount as i128)).is_ok()
            }
            Op::Withdraw { user, amount } => {
                client.try_withdraw(pick(user), &(amount as i128)).is_ok()
            }
            Op::Transfer { from, to, amount } => client
                .try_transfer(pick(from), pick(to), &(amount as i128))
                .is_ok(),
            Op::Claim { user } => client.try_claim(pick(user)).is_ok(),
            Op::Advance { seconds } => {
                env.ledger().with_mut(|l| l.timestamp += u64::from(seconds));
                false
            }
            Op::SetInterest { bps } => {
                let _ = client.try_set_interest(&admin, &(bps as i128));
                false
            }
            Op::SetUpdateLimit { seconds } => {
                let _ = client.try_set_update_time_limit(&admin, &u64::from(seconds));
                false
            }
            Op::Update => {
                let _ = client.try_update();
                false
            }
        };

        // Balances are only ever restated against a DF that is current.
        if moved {
            assert_eq!(client.last_checkpoint(), env.ledger().timestamp());
        }

        let df = client.df();
        assert!(df >= last_df);
        last_df = df;

        let settled: i128 = users.iter().map(|u| client.settled_balance(u)).sum();
        assert_eq!(settled, client.total_supply());
        for user in users.iter() {
            assert!(client.balance(user) >= client.settled_balance(user));
        }
    }
});
