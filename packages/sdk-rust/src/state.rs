//! Swap account layout and pool-state decoding.
//!
//! A pool account is a fixed 324-byte record written by the swap program.
//! Byte offsets below are a wire contract with the deployed program:
//!
//! ```text
//! version(1)  is_initialized(1)  nonce(1)
//! token_program_id(32)  token_account_a(32)  token_account_b(32)
//! pool_mint(32)  mint_a(32)  mint_b(32)  fee_account(32)
//! trade_fee_num(8)  trade_fee_den(8)  owner_trade_fee_num(8)  owner_trade_fee_den(8)
//! owner_withdraw_fee_num(8)  owner_withdraw_fee_den(8)  host_fee_num(8)  host_fee_den(8)
//! curve_type(1)  curve_parameters(32)                                  = 324 bytes
//! ```

use serde::{Deserialize, Serialize, Serializer};
use solana_sdk::{account::Account, pubkey::Pubkey};
use tracing::debug;

use crate::amount::{Numberu64, U64_LEN};
use crate::error::{Error, Result};

// ─── Layout constants ─────────────────────────────────────────────────────────

/// Total span of a pool account; also the space allocated on creation.
pub const TOKEN_SWAP_LEN: usize = 324;
pub const PUBKEY_LEN: usize = 32;
pub const CURVE_PARAMS_LEN: usize = 32;
pub const FEE_FIELDS: usize = 8;

const VERSION_OFFSET: usize = 0;
const IS_INITIALIZED_OFFSET: usize = 1;
const NONCE_OFFSET: usize = 2;
const TOKEN_PROGRAM_OFFSET: usize = 3;
const TOKEN_ACCOUNT_A_OFFSET: usize = TOKEN_PROGRAM_OFFSET + PUBKEY_LEN;
const TOKEN_ACCOUNT_B_OFFSET: usize = TOKEN_ACCOUNT_A_OFFSET + PUBKEY_LEN;
const POOL_MINT_OFFSET: usize = TOKEN_ACCOUNT_B_OFFSET + PUBKEY_LEN;
const MINT_A_OFFSET: usize = POOL_MINT_OFFSET + PUBKEY_LEN;
const MINT_B_OFFSET: usize = MINT_A_OFFSET + PUBKEY_LEN;
const FEE_ACCOUNT_OFFSET: usize = MINT_B_OFFSET + PUBKEY_LEN;
const FEES_OFFSET: usize = FEE_ACCOUNT_OFFSET + PUBKEY_LEN;
const CURVE_TYPE_OFFSET: usize = FEES_OFFSET + FEE_FIELDS * U64_LEN;
const CURVE_PARAMS_OFFSET: usize = CURVE_TYPE_OFFSET + 1;

const _: () = assert!(CURVE_PARAMS_OFFSET + CURVE_PARAMS_LEN == TOKEN_SWAP_LEN);

// ─── Raw layout ───────────────────────────────────────────────────────────────

/// Field-by-field view of the account bytes, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSwapLayout {
    pub version:          u8,
    pub is_initialized:   u8,
    pub nonce:            u8,
    pub token_program_id: [u8; PUBKEY_LEN],
    pub token_account_a:  [u8; PUBKEY_LEN],
    pub token_account_b:  [u8; PUBKEY_LEN],
    pub pool_mint:        [u8; PUBKEY_LEN],
    pub mint_a:           [u8; PUBKEY_LEN],
    pub mint_b:           [u8; PUBKEY_LEN],
    pub fee_account:      [u8; PUBKEY_LEN],
    /// trade, owner-trade, owner-withdraw, host; numerator then denominator.
    pub fees:             [[u8; U64_LEN]; FEE_FIELDS],
    pub curve_type:       u8,
    pub curve_parameters: [u8; CURVE_PARAMS_LEN],
}

impl RawSwapLayout {
    /// Split account bytes into fields. The input must be exactly
    /// [`TOKEN_SWAP_LEN`] bytes.
    pub fn unpack(data: &[u8]) -> Result<Self> {
        if data.len() != TOKEN_SWAP_LEN {
            return Err(Error::InvalidBufferLength {
                expected: TOKEN_SWAP_LEN,
                actual:   data.len(),
            });
        }
        let mut fees = [[0u8; U64_LEN]; FEE_FIELDS];
        for (i, fee) in fees.iter_mut().enumerate() {
            *fee = read_array(data, FEES_OFFSET + i * U64_LEN)?;
        }
        Ok(Self {
            version:          data[VERSION_OFFSET],
            is_initialized:   data[IS_INITIALIZED_OFFSET],
            nonce:            data[NONCE_OFFSET],
            token_program_id: read_array(data, TOKEN_PROGRAM_OFFSET)?,
            token_account_a:  read_array(data, TOKEN_ACCOUNT_A_OFFSET)?,
            token_account_b:  read_array(data, TOKEN_ACCOUNT_B_OFFSET)?,
            pool_mint:        read_array(data, POOL_MINT_OFFSET)?,
            mint_a:           read_array(data, MINT_A_OFFSET)?,
            mint_b:           read_array(data, MINT_B_OFFSET)?,
            fee_account:      read_array(data, FEE_ACCOUNT_OFFSET)?,
            fees,
            curve_type:       data[CURVE_TYPE_OFFSET],
            curve_parameters: read_array(data, CURVE_PARAMS_OFFSET)?,
        })
    }

    /// Write the fields back in account order.
    pub fn pack(&self) -> [u8; TOKEN_SWAP_LEN] {
        let mut out = [0u8; TOKEN_SWAP_LEN];
        out[VERSION_OFFSET] = self.version;
        out[IS_INITIALIZED_OFFSET] = self.is_initialized;
        out[NONCE_OFFSET] = self.nonce;
        for (offset, key) in [
            (TOKEN_PROGRAM_OFFSET, &self.token_program_id),
            (TOKEN_ACCOUNT_A_OFFSET, &self.token_account_a),
            (TOKEN_ACCOUNT_B_OFFSET, &self.token_account_b),
            (POOL_MINT_OFFSET, &self.pool_mint),
            (MINT_A_OFFSET, &self.mint_a),
            (MINT_B_OFFSET, &self.mint_b),
            (FEE_ACCOUNT_OFFSET, &self.fee_account),
        ] {
            out[offset..offset + PUBKEY_LEN].copy_from_slice(key);
        }
        for (i, fee) in self.fees.iter().enumerate() {
            let at = FEES_OFFSET + i * U64_LEN;
            out[at..at + U64_LEN].copy_from_slice(fee);
        }
        out[CURVE_TYPE_OFFSET] = self.curve_type;
        out[CURVE_PARAMS_OFFSET..].copy_from_slice(&self.curve_parameters);
        out
    }
}

fn read_array<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N]> {
    data.get(offset..offset + N)
        .and_then(|s| s.try_into().ok())
        .ok_or(Error::InvalidBufferLength {
            expected: offset + N,
            actual:   data.len(),
        })
}

// ─── Curve ────────────────────────────────────────────────────────────────────

/// Pricing curve selected at pool initialization.
///
/// Tag 2 is not assigned by the program; it is rejected like any other
/// unknown tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CurveType {
    ConstantProduct = 0,
    ConstantPrice = 1,
    /// Constant product with a fixed offset added to the token B side.
    Offset = 3,
}

impl TryFrom<u8> for CurveType {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Self::ConstantProduct),
            1 => Ok(Self::ConstantPrice),
            3 => Ok(Self::Offset),
            other => Err(Error::UnknownCurveType(other)),
        }
    }
}

impl From<CurveType> for u8 {
    fn from(curve: CurveType) -> Self {
        curve as u8
    }
}

/// Curve tag plus its opaque 32-byte parameter blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapCurve {
    pub curve_type: CurveType,
    pub parameters: [u8; CURVE_PARAMS_LEN],
}

impl SwapCurve {
    pub fn new(curve_type: CurveType) -> Self {
        Self { curve_type, parameters: [0u8; CURVE_PARAMS_LEN] }
    }
}

// ─── Fees ─────────────────────────────────────────────────────────────────────

/// The eight fee components, in wire order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fees {
    pub trade_fee_numerator:            Numberu64,
    pub trade_fee_denominator:          Numberu64,
    pub owner_trade_fee_numerator:      Numberu64,
    pub owner_trade_fee_denominator:    Numberu64,
    pub owner_withdraw_fee_numerator:   Numberu64,
    pub owner_withdraw_fee_denominator: Numberu64,
    pub host_fee_numerator:             Numberu64,
    pub host_fee_denominator:           Numberu64,
}

impl Fees {
    pub fn to_array(&self) -> [Numberu64; FEE_FIELDS] {
        [
            self.trade_fee_numerator,
            self.trade_fee_denominator,
            self.owner_trade_fee_numerator,
            self.owner_trade_fee_denominator,
            self.owner_withdraw_fee_numerator,
            self.owner_withdraw_fee_denominator,
            self.host_fee_numerator,
            self.host_fee_denominator,
        ]
    }

    pub fn from_array(f: [Numberu64; FEE_FIELDS]) -> Self {
        Self {
            trade_fee_numerator:            f[0],
            trade_fee_denominator:          f[1],
            owner_trade_fee_numerator:      f[2],
            owner_trade_fee_denominator:    f[3],
            owner_withdraw_fee_numerator:   f[4],
            owner_withdraw_fee_denominator: f[5],
            host_fee_numerator:             f[6],
            host_fee_denominator:           f[7],
        }
    }

    /// 64 bytes, as stored in the account and in the Initialize payload.
    pub fn pack(&self) -> [u8; FEE_FIELDS * U64_LEN] {
        let mut out = [0u8; FEE_FIELDS * U64_LEN];
        for (chunk, raw) in out.chunks_exact_mut(U64_LEN).zip(self.to_raw()) {
            chunk.copy_from_slice(&raw);
        }
        out
    }

    pub fn unpack(data: &[u8]) -> Result<Self> {
        if data.len() != FEE_FIELDS * U64_LEN {
            return Err(Error::InvalidBufferLength {
                expected: FEE_FIELDS * U64_LEN,
                actual:   data.len(),
            });
        }
        let mut raw = [[0u8; U64_LEN]; FEE_FIELDS];
        for (slot, chunk) in raw.iter_mut().zip(data.chunks_exact(U64_LEN)) {
            slot.copy_from_slice(chunk);
        }
        Ok(Self::from_raw(&raw))
    }

    /// Fee fields as split out by [`RawSwapLayout`], in wire order.
    pub fn from_raw(raw: &[[u8; U64_LEN]; FEE_FIELDS]) -> Self {
        Self::from_array(raw.map(|b| Numberu64::new(u64::from_le_bytes(b))))
    }

    pub fn to_raw(&self) -> [[u8; U64_LEN]; FEE_FIELDS] {
        self.to_array().map(|f| f.to_le_bytes())
    }

    pub fn trade_fee(&self) -> (u64, u64) {
        (self.trade_fee_numerator.get(), self.trade_fee_denominator.get())
    }

    pub fn owner_trade_fee(&self) -> (u64, u64) {
        (self.owner_trade_fee_numerator.get(), self.owner_trade_fee_denominator.get())
    }

    pub fn owner_withdraw_fee(&self) -> (u64, u64) {
        (self.owner_withdraw_fee_numerator.get(), self.owner_withdraw_fee_denominator.get())
    }

    pub fn host_fee(&self) -> (u64, u64) {
        (self.host_fee_numerator.get(), self.host_fee_denominator.get())
    }
}

// ─── Pool state ───────────────────────────────────────────────────────────────

/// Decoded, immutable snapshot of a swap account.
///
/// Decode a fresh one after any state-changing instruction lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolState {
    #[serde(serialize_with = "pubkey_str")]
    pub address:          Pubkey,
    #[serde(serialize_with = "pubkey_str")]
    pub program_id:       Pubkey,
    /// Program-derived signer over the pool's token accounts; not stored in
    /// the account bytes.
    #[serde(serialize_with = "pubkey_str")]
    pub authority:        Pubkey,
    pub version:          u8,
    pub nonce:            u8,
    #[serde(serialize_with = "pubkey_str")]
    pub token_program_id: Pubkey,
    #[serde(serialize_with = "pubkey_str")]
    pub token_account_a:  Pubkey,
    #[serde(serialize_with = "pubkey_str")]
    pub token_account_b:  Pubkey,
    #[serde(serialize_with = "pubkey_str")]
    pub pool_mint:        Pubkey,
    #[serde(serialize_with = "pubkey_str")]
    pub mint_a:           Pubkey,
    #[serde(serialize_with = "pubkey_str")]
    pub mint_b:           Pubkey,
    #[serde(serialize_with = "pubkey_str")]
    pub fee_account:      Pubkey,
    pub fees:             Fees,
    pub curve:            SwapCurve,
}

impl PoolState {
    /// Decode with the program's own authority derivation.
    pub fn parse(address: &Pubkey, program_id: &Pubkey, data: &[u8]) -> Result<Self> {
        decode_pool_state(address, program_id, data, |swap| {
            find_authority(swap, program_id).0
        })
    }

    /// Decode a fetched account, refusing one the swap program does not own.
    pub fn from_account(address: &Pubkey, program_id: &Pubkey, account: &Account) -> Result<Self> {
        if account.owner != *program_id {
            return Err(Error::AccountNotOwned {
                address:  *address,
                owner:    account.owner,
                expected: *program_id,
            });
        }
        Self::parse(address, program_id, &account.data)
    }

    /// Inverse of decoding, with `is_initialized` set.
    pub fn to_layout(&self) -> RawSwapLayout {
        RawSwapLayout {
            version:          self.version,
            is_initialized:   1,
            nonce:            self.nonce,
            token_program_id: self.token_program_id.to_bytes(),
            token_account_a:  self.token_account_a.to_bytes(),
            token_account_b:  self.token_account_b.to_bytes(),
            pool_mint:        self.pool_mint.to_bytes(),
            mint_a:           self.mint_a.to_bytes(),
            mint_b:           self.mint_b.to_bytes(),
            fee_account:      self.fee_account.to_bytes(),
            fees:             self.fees.to_raw(),
            curve_type:       self.curve.curve_type.into(),
            curve_parameters: self.curve.parameters,
        }
    }
}

/// Turn raw account bytes into a [`PoolState`].
///
/// `derive_authority` maps the swap address to its authority; it must be the
/// same derivation the program uses, normally [`find_authority`].
pub fn decode_pool_state<F>(
    address:          &Pubkey,
    program_id:       &Pubkey,
    data:             &[u8],
    derive_authority: F,
) -> Result<PoolState>
where
    F: FnOnce(&Pubkey) -> Pubkey,
{
    let raw = RawSwapLayout::unpack(data)?;
    if raw.is_initialized == 0 {
        return Err(Error::UninitializedAccount(*address));
    }

    let curve = SwapCurve {
        curve_type: CurveType::try_from(raw.curve_type)?,
        parameters: raw.curve_parameters,
    };
    let authority = derive_authority(address);
    debug!(%address, %authority, curve = ?curve.curve_type, "decoded swap account");

    Ok(PoolState {
        address:          *address,
        program_id:       *program_id,
        authority,
        version:          raw.version,
        nonce:            raw.nonce,
        token_program_id: Pubkey::from(raw.token_program_id),
        token_account_a:  Pubkey::from(raw.token_account_a),
        token_account_b:  Pubkey::from(raw.token_account_b),
        pool_mint:        Pubkey::from(raw.pool_mint),
        mint_a:           Pubkey::from(raw.mint_a),
        mint_b:           Pubkey::from(raw.mint_b),
        fee_account:      Pubkey::from(raw.fee_account),
        fees:             Fees::from_raw(&raw.fees),
        curve,
    })
}

/// The swap authority PDA: seeds `[swap]`, bump returned as the nonce.
pub fn find_authority(swap: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[swap.as_ref()], program_id)
}

fn pubkey_str<S: Serializer>(key: &Pubkey, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.collect_str(key)
}
