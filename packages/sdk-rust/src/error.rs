//! SDK error type.

use solana_sdk::pubkey::Pubkey;

use crate::instructions::AccountRole;

/// All errors returned by the Token Swap SDK.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ── Codec ────────────────────────────────────────────────────────────────
    /// An integer needs more than 8 bytes of magnitude.
    #[error("Value {0} does not fit in 64 bits")]
    ValueTooLarge(String),

    /// A fixed-width decode was handed the wrong number of bytes.
    #[error("Invalid buffer length: expected {expected} bytes, got {actual}")]
    InvalidBufferLength { expected: usize, actual: usize },

    // ── Pool state ───────────────────────────────────────────────────────────
    /// The account decodes, but its `is_initialized` byte is zero.
    #[error("Swap account {0} is not initialized")]
    UninitializedAccount(Pubkey),

    #[error("Unknown curve type {0} (expected 0 = constant product, 1 = constant price, 3 = offset)")]
    UnknownCurveType(u8),

    /// The account exists but belongs to a different program.
    #[error("Account {address} is owned by {owner}, not the swap program {expected}")]
    AccountNotOwned { address: Pubkey, owner: Pubkey, expected: Pubkey },

    // ── Instruction encoding ─────────────────────────────────────────────────
    #[error("Missing required account: {0}")]
    MissingRequiredAccount(AccountRole),

    // ── RPC / network ────────────────────────────────────────────────────────
    /// A Solana JSON-RPC call failed.
    #[error("RPC error: {0}")]
    Rpc(#[from] solana_client::client_error::ClientError),

    // ── Validation ───────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience alias so every module can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;
