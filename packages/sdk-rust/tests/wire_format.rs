//! End-to-end checks of the wire format through the public API only:
//! decode a pool account, drive every instruction from it, and confirm the
//! bytes and account lists the program will see.

use solana_sdk::pubkey::Pubkey;
use token_swap_sdk::{
    build_instruction, decode_u64, encode_u64,
    instructions::{InitializeArgs, SwapArgs, INITIALIZE_DATA_LEN, IX_SWAP},
    AccountRole, AccountSet, CurveType, DepositSingleParams, Error, Fees, HostFee, Numberu64,
    PoolState, SwapCurve, SwapInstruction, SwapParams, TradeDirection, WithdrawAllParams,
    TOKEN_SWAP_LEN,
};

fn key(n: u8) -> Pubkey {
    Pubkey::new_from_array([n; 32])
}

/// A pool account as the program would have written it.
fn pool_account_bytes(program_id: &Pubkey, swap: &Pubkey) -> Vec<u8> {
    let (authority, nonce) = token_swap_sdk::find_authority(swap, program_id);
    PoolState {
        address: *swap,
        program_id: *program_id,
        authority,
        version: 1,
        nonce,
        token_program_id: key(10),
        token_account_a: key(11),
        token_account_b: key(12),
        pool_mint: key(13),
        mint_a: key(14),
        mint_b: key(15),
        fee_account: key(16),
        fees: Fees::from_array([25, 10_000, 5, 10_000, 0, 0, 20, 100].map(Numberu64::new)),
        curve: SwapCurve::new(CurveType::ConstantProduct),
    }
    .to_layout()
    .pack()
    .to_vec()
}

#[test]
fn uint64_boundaries() {
    assert_eq!(encode_u64(u64::MAX as u128).unwrap(), [0xFF; 8]);
    assert!(matches!(encode_u64(1u128 << 64), Err(Error::ValueTooLarge(_))));
    assert!(matches!(decode_u64(&[0; 7]), Err(Error::InvalidBufferLength { .. })));
    assert!(matches!(decode_u64(&[0; 9]), Err(Error::InvalidBufferLength { .. })));
    assert_eq!(decode_u64(&encode_u64(1_234_567_890_123).unwrap()).unwrap(), 1_234_567_890_123);
}

#[test]
fn initialize_scenario_payload() {
    let fees = Fees::from_array([1, 1000, 1, 1000, 1, 1000, 1, 1000].map(Numberu64::new));
    let data = SwapInstruction::Initialize(InitializeArgs {
        nonce: 7,
        fees,
        curve: SwapCurve { curve_type: CurveType::ConstantProduct, parameters: [0; 32] },
    })
    .pack();
    // opcode + nonce + 8 fee fields + curve type + 32 parameter bytes
    assert_eq!(data.len(), INITIALIZE_DATA_LEN);
    assert_eq!(data.len(), 1 + 1 + 8 * 8 + 1 + 32);
    assert_eq!(&data[..2], &[0x00, 0x07]);
}

#[test]
fn decoded_pool_drives_swap() {
    let program_id = key(99);
    let swap_addr = key(1);
    let bytes = pool_account_bytes(&program_id, &swap_addr);
    assert_eq!(bytes.len(), TOKEN_SWAP_LEN);

    let pool = PoolState::parse(&swap_addr, &program_id, &bytes).unwrap();
    assert_eq!(pool.fees.trade_fee(), (25, 10_000));

    let user = key(20);
    let params = SwapParams {
        source:             key(21),
        destination:        key(22),
        direction:          TradeDirection::BToA,
        host_fee:           HostFee::Without,
        amount_in:          Numberu64::new(500),
        minimum_amount_out: Numberu64::new(400),
    };
    let ix = token_swap_sdk::instructions::swap(&program_id, &params.accounts(&pool, user), params.args());
    assert_eq!(ix.accounts.len(), 10);
    assert_eq!(ix.accounts[1].pubkey, pool.authority);
    assert_eq!(ix.accounts[4].pubkey, pool.token_account_b);
    assert_eq!(ix.accounts[5].pubkey, pool.token_account_a);
    assert_eq!(ix.data[0], IX_SWAP);

    let with_host = SwapParams { host_fee: HostFee::With(key(23)), ..params };
    let ix = token_swap_sdk::instructions::swap(&program_id, &with_host.accounts(&pool, user), with_host.args());
    assert_eq!(ix.accounts.len(), 11);
    assert!(ix.accounts[10].is_writable && !ix.accounts[10].is_signer);
}

#[test]
fn params_and_role_map_agree() {
    let program_id = key(99);
    let swap_addr = key(1);
    let pool = PoolState::parse(&swap_addr, &program_id, &pool_account_bytes(&program_id, &swap_addr))
        .unwrap();
    let user = key(20);

    let withdraw = WithdrawAllParams {
        source:                 key(30),
        destination_a:          key(31),
        destination_b:          key(32),
        pool_token_amount:      Numberu64::new(1_000),
        minimum_token_a_amount: Numberu64::new(1),
        minimum_token_b_amount: Numberu64::new(2),
    };
    let typed = token_swap_sdk::instructions::withdraw_all_token_types(
        &program_id,
        &withdraw.accounts(&pool, user),
        withdraw.args(),
    );
    let roles = AccountSet::from_pool(&pool)
        .with(AccountRole::UserTransferAuthority, user)
        .with(AccountRole::UserPoolToken, key(30))
        .with(AccountRole::UserTokenA, key(31))
        .with(AccountRole::UserTokenB, key(32));
    let generic = build_instruction(
        &program_id,
        &SwapInstruction::WithdrawAllTokenTypes(withdraw.args()),
        &roles,
    )
    .unwrap();
    assert_eq!(typed, generic);

    let deposit = DepositSingleParams {
        source:                    key(31),
        destination:               key(30),
        source_token_amount:       Numberu64::new(10),
        minimum_pool_token_amount: Numberu64::new(1),
    };
    let err = build_instruction(
        &program_id,
        &SwapInstruction::DepositSingleTokenTypeExactAmountIn(deposit.args()),
        &AccountSet::from_pool(&pool).with(AccountRole::UserTransferAuthority, user),
    )
    .unwrap_err();
    assert!(matches!(err, Error::MissingRequiredAccount(AccountRole::UserSource)));
}

#[test]
fn uninitialized_account_is_rejected() {
    let program_id = key(99);
    let swap_addr = key(1);
    let mut bytes = pool_account_bytes(&program_id, &swap_addr);
    bytes[1] = 0;
    assert!(matches!(
        PoolState::parse(&swap_addr, &program_id, &bytes),
        Err(Error::UninitializedAccount(a)) if a == swap_addr
    ));
}

#[test]
fn swap_payload_round_trips() {
    let ix = SwapInstruction::Swap(SwapArgs {
        amount_in:          Numberu64::MAX,
        minimum_amount_out: "1".parse().unwrap(),
    });
    assert_eq!(SwapInstruction::unpack(&ix.pack()).unwrap(), ix);
}
