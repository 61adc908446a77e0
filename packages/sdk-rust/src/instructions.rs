//! Instruction encoding for the token-swap program.
//!
//! Every payload starts with a one-byte opcode followed by fixed-width
//! little-endian fields. Account order mirrors what the program reads,
//! position by position; reordering silently corrupts the call.
//!
//! | opcode | instruction | payload after opcode |
//! |---|---|---|
//! | 0 | Initialize | nonce(1) fees(64) curve_type(1) curve_parameters(32) |
//! | 1 | Swap | amount_in(8) minimum_amount_out(8) |
//! | 2 | DepositAllTokenTypes | pool_token_amount(8) maximum_token_a(8) maximum_token_b(8) |
//! | 3 | WithdrawAllTokenTypes | pool_token_amount(8) minimum_token_a(8) minimum_token_b(8) |
//! | 4 | DepositSingleTokenTypeExactAmountIn | source_token_amount(8) minimum_pool_token_amount(8) |
//! | 5 | WithdrawSingleTokenTypeExactAmountOut | destination_token_amount(8) maximum_pool_token_amount(8) |

use std::collections::BTreeMap;
use std::fmt;

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};
use tracing::debug;

use crate::amount::{Numberu64, U64_LEN};
use crate::error::{Error, Result};
use crate::state::{CurveType, Fees, PoolState, SwapCurve, CURVE_PARAMS_LEN, FEE_FIELDS};

// ─── Opcodes ──────────────────────────────────────────────────────────────────

pub const IX_INITIALIZE: u8 = 0;
pub const IX_SWAP: u8 = 1;
pub const IX_DEPOSIT_ALL_TOKEN_TYPES: u8 = 2;
pub const IX_WITHDRAW_ALL_TOKEN_TYPES: u8 = 3;
pub const IX_DEPOSIT_SINGLE_TOKEN_TYPE_EXACT_AMOUNT_IN: u8 = 4;
pub const IX_WITHDRAW_SINGLE_TOKEN_TYPE_EXACT_AMOUNT_OUT: u8 = 5;

/// opcode(1) + nonce(1) + fees(64) + curve_type(1) + curve_parameters(32)
pub const INITIALIZE_DATA_LEN: usize = 1 + 1 + FEE_FIELDS * U64_LEN + 1 + CURVE_PARAMS_LEN;

// ─── Arguments ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitializeArgs {
    /// Bump seed of the swap authority PDA.
    pub nonce: u8,
    pub fees:  Fees,
    pub curve: SwapCurve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapArgs {
    pub amount_in:          Numberu64,
    pub minimum_amount_out: Numberu64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositAllArgs {
    pub pool_token_amount:      Numberu64,
    pub maximum_token_a_amount: Numberu64,
    pub maximum_token_b_amount: Numberu64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawAllArgs {
    pub pool_token_amount:      Numberu64,
    pub minimum_token_a_amount: Numberu64,
    pub minimum_token_b_amount: Numberu64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositSingleArgs {
    pub source_token_amount:       Numberu64,
    pub minimum_pool_token_amount: Numberu64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawSingleArgs {
    pub destination_token_amount:  Numberu64,
    pub maximum_pool_token_amount: Numberu64,
}

/// A decoded instruction payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapInstruction {
    Initialize(InitializeArgs),
    Swap(SwapArgs),
    DepositAllTokenTypes(DepositAllArgs),
    WithdrawAllTokenTypes(WithdrawAllArgs),
    DepositSingleTokenTypeExactAmountIn(DepositSingleArgs),
    WithdrawSingleTokenTypeExactAmountOut(WithdrawSingleArgs),
}

impl SwapInstruction {
    pub fn opcode(&self) -> u8 {
        match self {
            Self::Initialize(_) => IX_INITIALIZE,
            Self::Swap(_) => IX_SWAP,
            Self::DepositAllTokenTypes(_) => IX_DEPOSIT_ALL_TOKEN_TYPES,
            Self::WithdrawAllTokenTypes(_) => IX_WITHDRAW_ALL_TOKEN_TYPES,
            Self::DepositSingleTokenTypeExactAmountIn(_) => IX_DEPOSIT_SINGLE_TOKEN_TYPE_EXACT_AMOUNT_IN,
            Self::WithdrawSingleTokenTypeExactAmountOut(_) => IX_WITHDRAW_SINGLE_TOKEN_TYPE_EXACT_AMOUNT_OUT,
        }
    }

    /// Serialize to the program's payload format, opcode first.
    pub fn pack(&self) -> Vec<u8> {
        let amounts = match self {
            Self::Initialize(args) => {
                let mut data = Vec::with_capacity(INITIALIZE_DATA_LEN);
                data.push(IX_INITIALIZE);
                data.push(args.nonce);
                data.extend_from_slice(&args.fees.pack());
                data.push(args.curve.curve_type.into());
                data.extend_from_slice(&args.curve.parameters);
                return data;
            }
            Self::Swap(a) => vec![a.amount_in, a.minimum_amount_out],
            Self::DepositAllTokenTypes(a) => {
                vec![a.pool_token_amount, a.maximum_token_a_amount, a.maximum_token_b_amount]
            }
            Self::WithdrawAllTokenTypes(a) => {
                vec![a.pool_token_amount, a.minimum_token_a_amount, a.minimum_token_b_amount]
            }
            Self::DepositSingleTokenTypeExactAmountIn(a) => {
                vec![a.source_token_amount, a.minimum_pool_token_amount]
            }
            Self::WithdrawSingleTokenTypeExactAmountOut(a) => {
                vec![a.destination_token_amount, a.maximum_pool_token_amount]
            }
        };
        let mut data = Vec::with_capacity(1 + amounts.len() * U64_LEN);
        data.push(self.opcode());
        for amount in amounts {
            data.extend_from_slice(&amount.to_le_bytes());
        }
        data
    }

    /// Parse a payload produced by [`SwapInstruction::pack`].
    pub fn unpack(data: &[u8]) -> Result<Self> {
        let (&opcode, rest) = data
            .split_first()
            .ok_or(Error::InvalidBufferLength { expected: 1, actual: 0 })?;

        match opcode {
            IX_INITIALIZE => {
                let expected = INITIALIZE_DATA_LEN - 1;
                if rest.len() != expected {
                    return Err(Error::InvalidBufferLength { expected: INITIALIZE_DATA_LEN, actual: data.len() });
                }
                let (nonce, rest) = (rest[0], &rest[1..]);
                let (fees, rest) = rest.split_at(FEE_FIELDS * U64_LEN);
                let (curve_type, parameters) = (rest[0], &rest[1..]);
                let mut params = [0u8; CURVE_PARAMS_LEN];
                params.copy_from_slice(parameters);
                Ok(Self::Initialize(InitializeArgs {
                    nonce,
                    fees: Fees::unpack(fees)?,
                    curve: SwapCurve {
                        curve_type: CurveType::try_from(curve_type)?,
                        parameters: params,
                    },
                }))
            }
            IX_SWAP => {
                let [a, b] = unpack_amounts(data)?;
                Ok(Self::Swap(SwapArgs { amount_in: a, minimum_amount_out: b }))
            }
            IX_DEPOSIT_ALL_TOKEN_TYPES => {
                let [p, a, b] = unpack_amounts(data)?;
                Ok(Self::DepositAllTokenTypes(DepositAllArgs {
                    pool_token_amount:      p,
                    maximum_token_a_amount: a,
                    maximum_token_b_amount: b,
                }))
            }
            IX_WITHDRAW_ALL_TOKEN_TYPES => {
                let [p, a, b] = unpack_amounts(data)?;
                Ok(Self::WithdrawAllTokenTypes(WithdrawAllArgs {
                    pool_token_amount:      p,
                    minimum_token_a_amount: a,
                    minimum_token_b_amount: b,
                }))
            }
            IX_DEPOSIT_SINGLE_TOKEN_TYPE_EXACT_AMOUNT_IN => {
                let [s, m] = unpack_amounts(data)?;
                Ok(Self::DepositSingleTokenTypeExactAmountIn(DepositSingleArgs {
                    source_token_amount:       s,
                    minimum_pool_token_amount: m,
                }))
            }
            IX_WITHDRAW_SINGLE_TOKEN_TYPE_EXACT_AMOUNT_OUT => {
                let [d, m] = unpack_amounts(data)?;
                Ok(Self::WithdrawSingleTokenTypeExactAmountOut(WithdrawSingleArgs {
                    destination_token_amount:  d,
                    maximum_pool_token_amount: m,
                }))
            }
            other => Err(Error::InvalidArgument(format!("unknown swap opcode {other}"))),
        }
    }
}

/// Read `N` amounts following the opcode byte; total length must match.
fn unpack_amounts<const N: usize>(data: &[u8]) -> Result<[Numberu64; N]> {
    let expected = 1 + N * U64_LEN;
    if data.len() != expected {
        return Err(Error::InvalidBufferLength { expected, actual: data.len() });
    }
    let mut out = [Numberu64::ZERO; N];
    for (slot, chunk) in out.iter_mut().zip(data[1..].chunks_exact(U64_LEN)) {
        *slot = Numberu64::from_le_slice(chunk)?;
    }
    Ok(out)
}

// ─── Account lists ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitializeAccounts {
    pub swap:            Pubkey,
    pub authority:       Pubkey,
    pub token_a:         Pubkey,
    pub token_b:         Pubkey,
    pub pool_mint:       Pubkey,
    pub fee_account:     Pubkey,
    /// Receives the initial pool tokens.
    pub destination:     Pubkey,
    pub token_program:   Pubkey,
}

/// Optional host fee account on [`swap`]. The program routes a share of the
/// owner trade fee to it when present, so the two shapes differ in length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostFee {
    #[default]
    Without,
    With(Pubkey),
}

impl From<Option<Pubkey>> for HostFee {
    fn from(key: Option<Pubkey>) -> Self {
        key.map_or(Self::Without, Self::With)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapAccounts {
    pub swap:                    Pubkey,
    pub authority:               Pubkey,
    pub user_transfer_authority: Pubkey,
    pub source:                  Pubkey,
    pub swap_source:             Pubkey,
    pub swap_destination:        Pubkey,
    pub destination:             Pubkey,
    pub pool_mint:               Pubkey,
    pub fee_account:             Pubkey,
    pub token_program:           Pubkey,
    pub host_fee:                HostFee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositAllAccounts {
    pub swap:                    Pubkey,
    pub authority:               Pubkey,
    pub user_transfer_authority: Pubkey,
    pub source_a:                Pubkey,
    pub source_b:                Pubkey,
    pub token_a:                 Pubkey,
    pub token_b:                 Pubkey,
    pub pool_mint:               Pubkey,
    pub destination:             Pubkey,
    pub token_program:           Pubkey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawAllAccounts {
    pub swap:                    Pubkey,
    pub authority:               Pubkey,
    pub user_transfer_authority: Pubkey,
    pub pool_mint:               Pubkey,
    pub source:                  Pubkey,
    pub token_a:                 Pubkey,
    pub token_b:                 Pubkey,
    pub destination_a:           Pubkey,
    pub destination_b:           Pubkey,
    pub fee_account:             Pubkey,
    pub token_program:           Pubkey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositSingleAccounts {
    pub swap:                    Pubkey,
    pub authority:               Pubkey,
    pub user_transfer_authority: Pubkey,
    pub source:                  Pubkey,
    pub token_a:                 Pubkey,
    pub token_b:                 Pubkey,
    pub pool_mint:               Pubkey,
    pub destination:             Pubkey,
    pub token_program:           Pubkey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawSingleAccounts {
    pub swap:                    Pubkey,
    pub authority:               Pubkey,
    pub user_transfer_authority: Pubkey,
    pub pool_mint:               Pubkey,
    pub source:                  Pubkey,
    pub token_a:                 Pubkey,
    pub token_b:                 Pubkey,
    pub destination:             Pubkey,
    pub fee_account:             Pubkey,
    pub token_program:           Pubkey,
}

// ─── Builders ─────────────────────────────────────────────────────────────────

/// Build `Initialize` (opcode 0).
///
/// The swap account must already be allocated with
/// [`TOKEN_SWAP_LEN`](crate::state::TOKEN_SWAP_LEN) bytes and owned by the
/// program, normally by a `create_account` earlier in the same transaction.
pub fn initialize(program_id: &Pubkey, accounts: &InitializeAccounts, args: InitializeArgs) -> Instruction {
    let a = accounts;
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(a.swap,                   false),  // mut
            AccountMeta::new_readonly(a.authority,     false),
            AccountMeta::new_readonly(a.token_a,       false),
            AccountMeta::new_readonly(a.token_b,       false),
            AccountMeta::new(a.pool_mint,              false),  // mut
            AccountMeta::new_readonly(a.fee_account,   false),
            AccountMeta::new(a.destination,            false),  // mut
            AccountMeta::new_readonly(a.token_program, false),
        ],
        data: SwapInstruction::Initialize(args).pack(),
    }
}

/// Build `Swap` (opcode 1): 10 accounts, 11 with a host fee account.
pub fn swap(program_id: &Pubkey, accounts: &SwapAccounts, args: SwapArgs) -> Instruction {
    let a = accounts;
    let mut metas = vec![
        AccountMeta::new_readonly(a.swap,                    false),
        AccountMeta::new_readonly(a.authority,               false),
        AccountMeta::new_readonly(a.user_transfer_authority, true),   // signer
        AccountMeta::new(a.source,                           false),  // mut
        AccountMeta::new(a.swap_source,                      false),  // mut
        AccountMeta::new(a.swap_destination,                 false),  // mut
        AccountMeta::new(a.destination,                      false),  // mut
        AccountMeta::new(a.pool_mint,                        false),  // mut
        AccountMeta::new(a.fee_account,                      false),  // mut
        AccountMeta::new_readonly(a.token_program,           false),
    ];
    if let HostFee::With(host) = a.host_fee {
        metas.push(AccountMeta::new(host, false));                    // mut
    }
    Instruction {
        program_id: *program_id,
        accounts:   metas,
        data:       SwapInstruction::Swap(args).pack(),
    }
}

/// Build `DepositAllTokenTypes` (opcode 2).
pub fn deposit_all_token_types(
    program_id: &Pubkey,
    accounts:   &DepositAllAccounts,
    args:       DepositAllArgs,
) -> Instruction {
    let a = accounts;
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(a.swap,                    false),
            AccountMeta::new_readonly(a.authority,               false),
            AccountMeta::new_readonly(a.user_transfer_authority, true),   // signer
            AccountMeta::new(a.source_a,                         false),  // mut
            AccountMeta::new(a.source_b,                         false),  // mut
            AccountMeta::new(a.token_a,                          false),  // mut
            AccountMeta::new(a.token_b,                          false),  // mut
            AccountMeta::new(a.pool_mint,                        false),  // mut
            AccountMeta::new(a.destination,                      false),  // mut
            AccountMeta::new_readonly(a.token_program,           false),
        ],
        data: SwapInstruction::DepositAllTokenTypes(args).pack(),
    }
}

/// Build `WithdrawAllTokenTypes` (opcode 3).
pub fn withdraw_all_token_types(
    program_id: &Pubkey,
    accounts:   &WithdrawAllAccounts,
    args:       WithdrawAllArgs,
) -> Instruction {
    let a = accounts;
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(a.swap,                    false),
            AccountMeta::new_readonly(a.authority,               false),
            AccountMeta::new_readonly(a.user_transfer_authority, true),   // signer
            AccountMeta::new(a.pool_mint,                        false),  // mut
            AccountMeta::new(a.source,                           false),  // mut
            AccountMeta::new(a.token_a,                          false),  // mut
            AccountMeta::new(a.token_b,                          false),  // mut
            AccountMeta::new(a.destination_a,                    false),  // mut
            AccountMeta::new(a.destination_b,                    false),  // mut
            AccountMeta::new(a.fee_account,                      false),  // mut
            AccountMeta::new_readonly(a.token_program,           false),
        ],
        data: SwapInstruction::WithdrawAllTokenTypes(args).pack(),
    }
}

/// Build `DepositSingleTokenTypeExactAmountIn` (opcode 4).
pub fn deposit_single_token_type_exact_amount_in(
    program_id: &Pubkey,
    accounts:   &DepositSingleAccounts,
    args:       DepositSingleArgs,
) -> Instruction {
    let a = accounts;
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(a.swap,                    false),
            AccountMeta::new_readonly(a.authority,               false),
            AccountMeta::new_readonly(a.user_transfer_authority, true),   // signer
            AccountMeta::new(a.source,                           false),  // mut
            AccountMeta::new(a.token_a,                          false),  // mut
            AccountMeta::new(a.token_b,                          false),  // mut
            AccountMeta::new(a.pool_mint,                        false),  // mut
            AccountMeta::new(a.destination,                      false),  // mut
            AccountMeta::new_readonly(a.token_program,           false),
        ],
        data: SwapInstruction::DepositSingleTokenTypeExactAmountIn(args).pack(),
    }
}

/// Build `WithdrawSingleTokenTypeExactAmountOut` (opcode 5).
pub fn withdraw_single_token_type_exact_amount_out(
    program_id: &Pubkey,
    accounts:   &WithdrawSingleAccounts,
    args:       WithdrawSingleArgs,
) -> Instruction {
    let a = accounts;
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(a.swap,                    false),
            AccountMeta::new_readonly(a.authority,               false),
            AccountMeta::new_readonly(a.user_transfer_authority, true),   // signer
            AccountMeta::new(a.pool_mint,                        false),  // mut
            AccountMeta::new(a.source,                           false),  // mut
            AccountMeta::new(a.token_a,                          false),  // mut
            AccountMeta::new(a.token_b,                          false),  // mut
            AccountMeta::new(a.destination,                      false),  // mut
            AccountMeta::new(a.fee_account,                      false),  // mut
            AccountMeta::new_readonly(a.token_program,           false),
        ],
        data: SwapInstruction::WithdrawSingleTokenTypeExactAmountOut(args).pack(),
    }
}

// ─── Role-keyed builder ───────────────────────────────────────────────────────

/// Named slot an address fills in an instruction's account list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AccountRole {
    Swap,
    Authority,
    UserTransferAuthority,
    /// Pool-owned token A account.
    TokenA,
    /// Pool-owned token B account.
    TokenB,
    PoolMint,
    FeeAccount,
    TokenProgram,
    /// Pool-side account the swap input lands in.
    SwapSource,
    /// Pool-side account the swap output leaves from.
    SwapDestination,
    UserSource,
    UserDestination,
    UserTokenA,
    UserTokenB,
    /// User's pool-token account: minted into on deposit, burned from on withdraw.
    UserPoolToken,
    HostFeeAccount,
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Swap => "swap",
            Self::Authority => "authority",
            Self::UserTransferAuthority => "user_transfer_authority",
            Self::TokenA => "token_a",
            Self::TokenB => "token_b",
            Self::PoolMint => "pool_mint",
            Self::FeeAccount => "fee_account",
            Self::TokenProgram => "token_program",
            Self::SwapSource => "swap_source",
            Self::SwapDestination => "swap_destination",
            Self::UserSource => "user_source",
            Self::UserDestination => "user_destination",
            Self::UserTokenA => "user_token_a",
            Self::UserTokenB => "user_token_b",
            Self::UserPoolToken => "user_pool_token",
            Self::HostFeeAccount => "host_fee_account",
        };
        f.write_str(name)
    }
}

/// Addresses keyed by role, resolved into an account list at build time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountSet(BTreeMap<AccountRole, Pubkey>);

impl AccountSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every pool-side role, taken from a decoded pool.
    pub fn from_pool(pool: &PoolState) -> Self {
        Self::new()
            .with(AccountRole::Swap, pool.address)
            .with(AccountRole::Authority, pool.authority)
            .with(AccountRole::TokenA, pool.token_account_a)
            .with(AccountRole::TokenB, pool.token_account_b)
            .with(AccountRole::PoolMint, pool.pool_mint)
            .with(AccountRole::FeeAccount, pool.fee_account)
            .with(AccountRole::TokenProgram, pool.token_program_id)
    }

    pub fn with(mut self, role: AccountRole, key: Pubkey) -> Self {
        self.0.insert(role, key);
        self
    }

    pub fn insert(&mut self, role: AccountRole, key: Pubkey) -> Option<Pubkey> {
        self.0.insert(role, key)
    }

    pub fn get(&self, role: AccountRole) -> Option<Pubkey> {
        self.0.get(&role).copied()
    }

    fn require(&self, role: AccountRole) -> Result<Pubkey> {
        self.get(role).ok_or(Error::MissingRequiredAccount(role))
    }
}

/// Build any instruction from role-keyed addresses.
///
/// Fails with [`Error::MissingRequiredAccount`] naming the first absent role;
/// no instruction is produced in that case.
pub fn build_instruction(
    program_id:  &Pubkey,
    instruction: &SwapInstruction,
    accounts:    &AccountSet,
) -> Result<Instruction> {
    use AccountRole::*;
    let r = |role| accounts.require(role);

    let ix = match *instruction {
        SwapInstruction::Initialize(args) => initialize(
            program_id,
            &InitializeAccounts {
                swap:          r(Swap)?,
                authority:     r(Authority)?,
                token_a:       r(TokenA)?,
                token_b:       r(TokenB)?,
                pool_mint:     r(PoolMint)?,
                fee_account:   r(FeeAccount)?,
                destination:   r(UserPoolToken)?,
                token_program: r(TokenProgram)?,
            },
            args,
        ),
        SwapInstruction::Swap(args) => swap(
            program_id,
            &SwapAccounts {
                swap:                    r(Swap)?,
                authority:               r(Authority)?,
                user_transfer_authority: r(UserTransferAuthority)?,
                source:                  r(UserSource)?,
                swap_source:             r(SwapSource)?,
                swap_destination:        r(SwapDestination)?,
                destination:             r(UserDestination)?,
                pool_mint:               r(PoolMint)?,
                fee_account:             r(FeeAccount)?,
                token_program:           r(TokenProgram)?,
                host_fee:                accounts.get(HostFeeAccount).into(),
            },
            args,
        ),
        SwapInstruction::DepositAllTokenTypes(args) => deposit_all_token_types(
            program_id,
            &DepositAllAccounts {
                swap:                    r(Swap)?,
                authority:               r(Authority)?,
                user_transfer_authority: r(UserTransferAuthority)?,
                source_a:                r(UserTokenA)?,
                source_b:                r(UserTokenB)?,
                token_a:                 r(TokenA)?,
                token_b:                 r(TokenB)?,
                pool_mint:               r(PoolMint)?,
                destination:             r(UserPoolToken)?,
                token_program:           r(TokenProgram)?,
            },
            args,
        ),
        SwapInstruction::WithdrawAllTokenTypes(args) => withdraw_all_token_types(
            program_id,
            &WithdrawAllAccounts {
                swap:                    r(Swap)?,
                authority:               r(Authority)?,
                user_transfer_authority: r(UserTransferAuthority)?,
                pool_mint:               r(PoolMint)?,
                source:                  r(UserPoolToken)?,
                token_a:                 r(TokenA)?,
                token_b:                 r(TokenB)?,
                destination_a:           r(UserTokenA)?,
                destination_b:           r(UserTokenB)?,
                fee_account:             r(FeeAccount)?,
                token_program:           r(TokenProgram)?,
            },
            args,
        ),
        SwapInstruction::DepositSingleTokenTypeExactAmountIn(args) => {
            deposit_single_token_type_exact_amount_in(
                program_id,
                &DepositSingleAccounts {
                    swap:                    r(Swap)?,
                    authority:               r(Authority)?,
                    user_transfer_authority: r(UserTransferAuthority)?,
                    source:                  r(UserSource)?,
                    token_a:                 r(TokenA)?,
                    token_b:                 r(TokenB)?,
                    pool_mint:               r(PoolMint)?,
                    destination:             r(UserPoolToken)?,
                    token_program:           r(TokenProgram)?,
                },
                args,
            )
        }
        SwapInstruction::WithdrawSingleTokenTypeExactAmountOut(args) => {
            withdraw_single_token_type_exact_amount_out(
                program_id,
                &WithdrawSingleAccounts {
                    swap:                    r(Swap)?,
                    authority:               r(Authority)?,
                    user_transfer_authority: r(UserTransferAuthority)?,
                    pool_mint:               r(PoolMint)?,
                    source:                  r(UserPoolToken)?,
                    token_a:                 r(TokenA)?,
                    token_b:                 r(TokenB)?,
                    destination:             r(UserDestination)?,
                    fee_account:             r(FeeAccount)?,
                    token_program:           r(TokenProgram)?,
                },
                args,
            )
        }
    };

    debug!(
        opcode = instruction.opcode(),
        accounts = ix.accounts.len(),
        data_len = ix.data.len(),
        "built swap instruction"
    );
    Ok(ix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u8) -> Pubkey {
        Pubkey::new_from_array([n; 32])
    }

    fn n(v: u64) -> Numberu64 {
        Numberu64::new(v)
    }

    fn amounts<const N: usize>(vals: [u64; N]) -> [Numberu64; N] {
        vals.map(Numberu64::new)
    }

    fn swap_accounts(host_fee: HostFee) -> SwapAccounts {
        SwapAccounts {
            swap:                    key(1),
            authority:               key(2),
            user_transfer_authority: key(3),
            source:                  key(4),
            swap_source:             key(5),
            swap_destination:        key(6),
            destination:             key(7),
            pool_mint:               key(8),
            fee_account:             key(9),
            token_program:           key(10),
            host_fee,
        }
    }

    fn flags(ix: &Instruction) -> Vec<(bool, bool)> {
        ix.accounts.iter().map(|m| (m.is_signer, m.is_writable)).collect()
    }

    #[test]
    fn test_initialize_payload_layout() {
        let fees = Fees::from_array(amounts([1, 1000, 1, 1000, 1, 1000, 1, 1000]));
        let args = InitializeArgs {
            nonce: 7,
            fees,
            curve: SwapCurve::new(CurveType::ConstantProduct),
        };
        let data = SwapInstruction::Initialize(args).pack();
        assert_eq!(data.len(), INITIALIZE_DATA_LEN);
        assert_eq!(data.len(), 99);
        assert_eq!(data[0], 0x00);
        assert_eq!(data[1], 0x07);
        assert_eq!(&data[2..10], &1u64.to_le_bytes());
        assert_eq!(&data[10..18], &1000u64.to_le_bytes());
        assert_eq!(data[66], 0);
        assert_eq!(&data[67..], &[0u8; 32]);
    }

    #[test]
    fn test_initialize_accounts() {
        let accounts = InitializeAccounts {
            swap:          key(1),
            authority:     key(2),
            token_a:       key(3),
            token_b:       key(4),
            pool_mint:     key(5),
            fee_account:   key(6),
            destination:   key(7),
            token_program: key(8),
        };
        let args = InitializeArgs {
            nonce: 255,
            fees:  Fees::default(),
            curve: SwapCurve::new(CurveType::ConstantPrice),
        };
        let ix = initialize(&key(99), &accounts, args);
        assert_eq!(ix.program_id, key(99));
        let keys: Vec<_> = ix.accounts.iter().map(|m| m.pubkey).collect();
        assert_eq!(keys, (1..=8).map(key).collect::<Vec<_>>());
        assert_eq!(
            flags(&ix),
            vec![
                (false, true),
                (false, false),
                (false, false),
                (false, false),
                (false, true),
                (false, false),
                (false, true),
                (false, false),
            ]
        );
    }

    #[test]
    fn test_swap_without_host_fee_has_ten_accounts() {
        let args = SwapArgs { amount_in: n(1_000), minimum_amount_out: n(900) };
        let ix = swap(&key(99), &swap_accounts(HostFee::Without), args);
        assert_eq!(ix.accounts.len(), 10);
        assert!(ix.accounts[2].is_signer && !ix.accounts[2].is_writable);
        assert_eq!(ix.accounts.iter().filter(|m| m.is_signer).count(), 1);
        assert_eq!(ix.data.len(), 17);
        assert_eq!(ix.data[0], IX_SWAP);
        assert_eq!(&ix.data[1..9], &1_000u64.to_le_bytes());
        assert_eq!(&ix.data[9..17], &900u64.to_le_bytes());
    }

    #[test]
    fn test_swap_with_host_fee_appends_writable_account() {
        let args = SwapArgs { amount_in: n(1), minimum_amount_out: n(0) };
        let ix = swap(&key(99), &swap_accounts(HostFee::With(key(11))), args);
        assert_eq!(ix.accounts.len(), 11);
        let host = &ix.accounts[10];
        assert_eq!(host.pubkey, key(11));
        assert!(host.is_writable);
        assert!(!host.is_signer);
    }

    #[test]
    fn test_deposit_and_withdraw_account_shapes() {
        let mut set = AccountSet::new();
        for (i, role) in [
            AccountRole::Swap,
            AccountRole::Authority,
            AccountRole::UserTransferAuthority,
            AccountRole::TokenA,
            AccountRole::TokenB,
            AccountRole::PoolMint,
            AccountRole::FeeAccount,
            AccountRole::TokenProgram,
            AccountRole::UserSource,
            AccountRole::UserDestination,
            AccountRole::UserTokenA,
            AccountRole::UserTokenB,
            AccountRole::UserPoolToken,
        ]
        .into_iter()
        .enumerate()
        {
            set.insert(role, key(i as u8 + 1));
        }
        let pid = key(99);

        let cases = [
            (
                SwapInstruction::DepositAllTokenTypes(DepositAllArgs {
                    pool_token_amount:      n(10),
                    maximum_token_a_amount: n(20),
                    maximum_token_b_amount: n(30),
                }),
                10,
                25,
            ),
            (
                SwapInstruction::WithdrawAllTokenTypes(WithdrawAllArgs {
                    pool_token_amount:      n(10),
                    minimum_token_a_amount: n(1),
                    minimum_token_b_amount: n(2),
                }),
                11,
                25,
            ),
            (
                SwapInstruction::DepositSingleTokenTypeExactAmountIn(DepositSingleArgs {
                    source_token_amount:       n(5),
                    minimum_pool_token_amount: n(1),
                }),
                9,
                17,
            ),
            (
                SwapInstruction::WithdrawSingleTokenTypeExactAmountOut(WithdrawSingleArgs {
                    destination_token_amount:  n(5),
                    maximum_pool_token_amount: n(9),
                }),
                10,
                17,
            ),
        ];
        for (instruction, n_accounts, data_len) in cases {
            let ix = build_instruction(&pid, &instruction, &set).unwrap();
            assert_eq!(ix.accounts.len(), n_accounts, "{instruction:?}");
            assert_eq!(ix.data.len(), data_len);
            assert_eq!(ix.data[0], instruction.opcode());
            assert_eq!(ix.accounts[0].pubkey, key(1));
            assert!(!ix.accounts[0].is_writable);
            assert!(ix.accounts[2].is_signer);
            assert_eq!(ix.accounts.last().unwrap().pubkey, key(8));
            assert!(!ix.accounts.last().unwrap().is_writable);
            // Everything between the signer and the token program is writable.
            let middle = &ix.accounts[3..ix.accounts.len() - 1];
            assert!(middle.iter().all(|m| m.is_writable && !m.is_signer));
        }
    }

    #[test]
    fn test_withdraw_all_account_order() {
        let accounts = WithdrawAllAccounts {
            swap:                    key(1),
            authority:               key(2),
            user_transfer_authority: key(3),
            pool_mint:               key(4),
            source:                  key(5),
            token_a:                 key(6),
            token_b:                 key(7),
            destination_a:           key(8),
            destination_b:           key(9),
            fee_account:             key(10),
            token_program:           key(11),
        };
        let args = WithdrawAllArgs {
            pool_token_amount:      n(1),
            minimum_token_a_amount: n(0),
            minimum_token_b_amount: n(0),
        };
        let ix = withdraw_all_token_types(&key(99), &accounts, args);
        let keys: Vec<_> = ix.accounts.iter().map(|m| m.pubkey).collect();
        assert_eq!(keys, (1..=11).map(key).collect::<Vec<_>>());
    }

    fn keys(ix: &Instruction) -> Vec<Pubkey> {
        ix.accounts.iter().map(|m| m.pubkey).collect()
    }

    #[test]
    fn test_swap_account_order() {
        let args = SwapArgs { amount_in: n(1), minimum_amount_out: n(0) };
        let ix = swap(&key(99), &swap_accounts(HostFee::Without), args);
        assert_eq!(keys(&ix), (1..=10).map(key).collect::<Vec<_>>());

        let ix = swap(&key(99), &swap_accounts(HostFee::With(key(11))), args);
        assert_eq!(keys(&ix), (1..=11).map(key).collect::<Vec<_>>());
    }

    #[test]
    fn test_deposit_all_account_order() {
        let accounts = DepositAllAccounts {
            swap:                    key(1),
            authority:               key(2),
            user_transfer_authority: key(3),
            source_a:                key(4),
            source_b:                key(5),
            token_a:                 key(6),
            token_b:                 key(7),
            pool_mint:               key(8),
            destination:             key(9),
            token_program:           key(10),
        };
        let args = DepositAllArgs {
            pool_token_amount:      n(1),
            maximum_token_a_amount: n(2),
            maximum_token_b_amount: n(3),
        };
        let ix = deposit_all_token_types(&key(99), &accounts, args);
        assert_eq!(keys(&ix), (1..=10).map(key).collect::<Vec<_>>());
    }

    #[test]
    fn test_deposit_single_account_order() {
        let accounts = DepositSingleAccounts {
            swap:                    key(1),
            authority:               key(2),
            user_transfer_authority: key(3),
            source:                  key(4),
            token_a:                 key(5),
            token_b:                 key(6),
            pool_mint:               key(7),
            destination:             key(8),
            token_program:           key(9),
        };
        let args = DepositSingleArgs {
            source_token_amount:       n(5),
            minimum_pool_token_amount: n(1),
        };
        let ix = deposit_single_token_type_exact_amount_in(&key(99), &accounts, args);
        assert_eq!(keys(&ix), (1..=9).map(key).collect::<Vec<_>>());
    }

    #[test]
    fn test_withdraw_single_account_order() {
        let accounts = WithdrawSingleAccounts {
            swap:                    key(1),
            authority:               key(2),
            user_transfer_authority: key(3),
            pool_mint:               key(4),
            source:                  key(5),
            token_a:                 key(6),
            token_b:                 key(7),
            destination:             key(8),
            fee_account:             key(9),
            token_program:           key(10),
        };
        let args = WithdrawSingleArgs {
            destination_token_amount:  n(5),
            maximum_pool_token_amount: n(9),
        };
        let ix = withdraw_single_token_type_exact_amount_out(&key(99), &accounts, args);
        assert_eq!(keys(&ix), (1..=10).map(key).collect::<Vec<_>>());
    }

    #[test]
    fn test_missing_role_aborts_build() {
        let set = AccountSet::new()
            .with(AccountRole::Swap, key(1))
            .with(AccountRole::Authority, key(2));
        let ix = SwapInstruction::Swap(SwapArgs { amount_in: n(1), minimum_amount_out: n(1) });
        let err = build_instruction(&key(99), &ix, &set).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingRequiredAccount(AccountRole::UserTransferAuthority)
        ));
        assert_eq!(err.to_string(), "Missing required account: user_transfer_authority");
    }

    #[test]
    fn test_host_fee_role_is_optional() {
        let base = AccountSet::new()
            .with(AccountRole::Swap, key(1))
            .with(AccountRole::Authority, key(2))
            .with(AccountRole::UserTransferAuthority, key(3))
            .with(AccountRole::UserSource, key(4))
            .with(AccountRole::SwapSource, key(5))
            .with(AccountRole::SwapDestination, key(6))
            .with(AccountRole::UserDestination, key(7))
            .with(AccountRole::PoolMint, key(8))
            .with(AccountRole::FeeAccount, key(9))
            .with(AccountRole::TokenProgram, key(10));
        let ix = SwapInstruction::Swap(SwapArgs { amount_in: n(1), minimum_amount_out: n(1) });

        let without = build_instruction(&key(99), &ix, &base).unwrap();
        assert_eq!(without, swap(&key(99), &swap_accounts(HostFee::Without), SwapArgs {
            amount_in: n(1),
            minimum_amount_out: n(1),
        }));

        let with = build_instruction(&key(99), &ix, &base.with(AccountRole::HostFeeAccount, key(11)))
            .unwrap();
        assert_eq!(with.accounts.len(), 11);
    }

    #[test]
    fn test_unpack_inverts_pack() {
        let all = [
            SwapInstruction::Initialize(InitializeArgs {
                nonce: 3,
                fees:  Fees::from_array(amounts([1, 2, 3, 4, 5, 6, 7, u64::MAX])),
                curve: SwapCurve { curve_type: CurveType::Offset, parameters: [9u8; 32] },
            }),
            SwapInstruction::Swap(SwapArgs { amount_in: n(u64::MAX), minimum_amount_out: n(0) }),
            SwapInstruction::DepositAllTokenTypes(DepositAllArgs {
                pool_token_amount:      n(1),
                maximum_token_a_amount: n(2),
                maximum_token_b_amount: n(3),
            }),
            SwapInstruction::WithdrawAllTokenTypes(WithdrawAllArgs {
                pool_token_amount:      n(4),
                minimum_token_a_amount: n(5),
                minimum_token_b_amount: n(6),
            }),
            SwapInstruction::DepositSingleTokenTypeExactAmountIn(DepositSingleArgs {
                source_token_amount:       n(7),
                minimum_pool_token_amount: n(8),
            }),
            SwapInstruction::WithdrawSingleTokenTypeExactAmountOut(WithdrawSingleArgs {
                destination_token_amount:  n(9),
                maximum_pool_token_amount: n(10),
            }),
        ];
        for ix in all {
            assert_eq!(SwapInstruction::unpack(&ix.pack()).unwrap(), ix);
        }
    }

    #[test]
    fn test_unpack_rejects_bad_payloads() {
        assert!(matches!(
            SwapInstruction::unpack(&[]),
            Err(Error::InvalidBufferLength { expected: 1, actual: 0 })
        ));
        assert!(matches!(
            SwapInstruction::unpack(&[IX_SWAP, 0, 0, 0]),
            Err(Error::InvalidBufferLength { expected: 17, actual: 4 })
        ));
        assert!(matches!(SwapInstruction::unpack(&[6]), Err(Error::InvalidArgument(_))));

        let mut init = SwapInstruction::Initialize(InitializeArgs {
            nonce: 0,
            fees:  Fees::default(),
            curve: SwapCurve::new(CurveType::ConstantProduct),
        })
        .pack();
        init[66] = 2;
        assert!(matches!(SwapInstruction::unpack(&init), Err(Error::UnknownCurveType(2))));
    }
}
