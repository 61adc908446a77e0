//! Token Swap Rust SDK
//!
//! Client-side codec for the SPL token-swap program: encodes the six swap
//! instructions byte-for-byte, decodes the 324-byte pool account, and wraps
//! both in a small async RPC client. Pricing and fee math stay on-chain; the
//! SDK only carries amounts the caller has already chosen.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use token_swap_sdk::{
//!     HostFee, Numberu64, SwapParams, TokenSwapClient, TradeDirection,
//! };
//! use solana_sdk::{pubkey::Pubkey, signature::Keypair};
//! use std::str::FromStr;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TokenSwapClient::devnet();
//!     let payer  = Keypair::new(); // use your funded keypair
//!
//!     let swap = Pubkey::from_str("8XJfG4mHqRZjByAd7HxHdEALfB8jVtJVQsdhGEmysTFq")?;
//!     let pool = client.load_pool(&swap).await?;
//!
//!     let sig = client.swap(&payer, &payer, &pool, SwapParams {
//!         source:             Pubkey::new_unique(),
//!         destination:        Pubkey::new_unique(),
//!         direction:          TradeDirection::AToB,
//!         host_fee:           HostFee::Without,
//!         amount_in:          Numberu64::new(1_000_000),
//!         minimum_amount_out: "990000".parse()?,
//!     }).await?;
//!     println!("Swapped! tx: {sig}");
//!
//!     Ok(())
//! }
//! ```
//!
//! # Layers
//!
//! | Module | Role |
//! |--------|------|
//! | [`amount`] | 8-byte little-endian `u64` codec |
//! | [`state`] | Pool account layout and [`PoolState`] decoding |
//! | [`instructions`] | Payloads and account lists for opcodes 0–5 |
//! | [`client`] | Fetch, create, and submit over JSON-RPC |

pub mod amount;
pub mod client;
pub mod error;
pub mod instructions;
pub mod state;
pub mod types;

pub use amount::{decode_u64, encode_u64, Numberu64};
pub use client::{TokenSwapClient, TOKEN_PROGRAM_ID, TOKEN_SWAP_PROGRAM_ID};
pub use error::{Error, Result};
pub use instructions::{build_instruction, AccountRole, AccountSet, HostFee, SwapInstruction};
pub use state::{decode_pool_state, find_authority, CurveType, Fees, PoolState, SwapCurve, TOKEN_SWAP_LEN};
pub use types::*;
