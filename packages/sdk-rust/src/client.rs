//! [`TokenSwapClient`]: async RPC wrapper around the codec.
//!
//! Fetching and submission are delegated to `solana-client`; retry, timeout
//! and confirmation policy belong to the RPC client, not to this module.

use std::str::FromStr;

use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    system_instruction,
    transaction::Transaction,
};
use tracing::info;

use crate::{
    error::Result,
    instructions::{
        deposit_all_token_types, deposit_single_token_type_exact_amount_in, initialize, swap,
        withdraw_all_token_types, withdraw_single_token_type_exact_amount_out, InitializeAccounts,
        InitializeArgs,
    },
    state::{find_authority, PoolState, TOKEN_SWAP_LEN},
    types::{
        CreatePoolParams, DepositAllParams, DepositSingleParams, SwapParams, WithdrawAllParams,
        WithdrawSingleParams,
    },
};

// ─── Constants ────────────────────────────────────────────────────────────────

/// Deployed token-swap program.
pub const TOKEN_SWAP_PROGRAM_ID: &str = "SwaPpA9LAaLfeLi3a68M4DjnLqgtticKg6CnyNwgAC8";
/// SPL Token program.
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

const DEVNET_RPC:  &str = "https://api.devnet.solana.com";
const MAINNET_RPC: &str = "https://api.mainnet-beta.solana.com";

pub fn token_swap_program_id() -> Pubkey {
    Pubkey::from_str(TOKEN_SWAP_PROGRAM_ID).expect("valid program id constant")
}

pub fn token_program_id() -> Pubkey {
    Pubkey::from_str(TOKEN_PROGRAM_ID).expect("valid program id constant")
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// Async token-swap client.
///
/// ```rust,no_run
/// # use token_swap_sdk::TokenSwapClient;
/// # use solana_sdk::pubkey::Pubkey;
/// # use std::str::FromStr;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = TokenSwapClient::devnet();
/// let swap = Pubkey::from_str("8XJfG4mHqRZjByAd7HxHdEALfB8jVtJVQsdhGEmysTFq")?;
/// let pool = client.load_pool(&swap).await?;
/// println!("trade fee {:?}", pool.fees.trade_fee());
/// # Ok(())
/// # }
/// ```
pub struct TokenSwapClient {
    rpc_url:    String,
    program_id: Pubkey,
    commitment: CommitmentConfig,
}

impl TokenSwapClient {
    /// Create a client pointing at any RPC endpoint.
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url:    rpc_url.into(),
            program_id: token_swap_program_id(),
            commitment: CommitmentConfig::confirmed(),
        }
    }

    pub fn devnet() -> Self {
        Self::new(DEVNET_RPC)
    }

    pub fn mainnet() -> Self {
        Self::new(MAINNET_RPC)
    }

    /// Override the program ID (useful for locally deployed programs in tests).
    pub fn with_program_id(mut self, program_id: Pubkey) -> Self {
        self.program_id = program_id;
        self
    }

    pub fn with_commitment(mut self, commitment: CommitmentConfig) -> Self {
        self.commitment = commitment;
        self
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    // ── Read operations ───────────────────────────────────────────────────────

    /// Fetch and decode a swap account.
    pub async fn load_pool(&self, address: &Pubkey) -> Result<PoolState> {
        let account = self.rpc().get_account(address).await?;
        PoolState::from_account(address, &self.program_id, &account)
    }

    /// Lamports a pool account needs to be rent exempt.
    pub async fn minimum_balance_for_rent_exemption(&self) -> Result<u64> {
        Ok(self
            .rpc()
            .get_minimum_balance_for_rent_exemption(TOKEN_SWAP_LEN)
            .await?)
    }

    // ── Write operations ──────────────────────────────────────────────────────

    /// Allocate `swap_account` and initialize it as a new pool in one
    /// transaction, then return the pool as decoded from the confirmed account.
    ///
    /// The authority and nonce are derived here; `token_a`, `token_b` and
    /// `pool_mint` must already be owned by that authority.
    pub async fn create_pool(
        &self,
        payer:        &Keypair,
        swap_account: &Keypair,
        params:       CreatePoolParams,
    ) -> Result<(PoolState, Signature)> {
        let rpc = self.rpc();
        let address = swap_account.pubkey();
        let ixs = self.create_pool_instructions(
            &payer.pubkey(),
            &address,
            rpc.get_minimum_balance_for_rent_exemption(TOKEN_SWAP_LEN).await?,
            &params,
        );
        let sig = self.sign_and_send(&rpc, &ixs, payer, &[swap_account]).await?;
        info!(swap = %address, %sig, "created token swap pool");
        Ok((self.load_pool(&address).await?, sig))
    }

    /// Swap tokens through `pool`. `user_transfer_authority` must be
    /// approved to move `params.amount_in` out of `params.source`.
    pub async fn swap(
        &self,
        payer:                   &Keypair,
        user_transfer_authority: &Keypair,
        pool:                    &PoolState,
        params:                  SwapParams,
    ) -> Result<Signature> {
        let ix = swap(
            &self.program_id,
            &params.accounts(pool, user_transfer_authority.pubkey()),
            params.args(),
        );
        self.submit("swap", ix, payer, user_transfer_authority).await
    }

    pub async fn deposit_all_token_types(
        &self,
        payer:                   &Keypair,
        user_transfer_authority: &Keypair,
        pool:                    &PoolState,
        params:                  DepositAllParams,
    ) -> Result<Signature> {
        let ix = deposit_all_token_types(
            &self.program_id,
            &params.accounts(pool, user_transfer_authority.pubkey()),
            params.args(),
        );
        self.submit("deposit_all_token_types", ix, payer, user_transfer_authority).await
    }

    pub async fn withdraw_all_token_types(
        &self,
        payer:                   &Keypair,
        user_transfer_authority: &Keypair,
        pool:                    &PoolState,
        params:                  WithdrawAllParams,
    ) -> Result<Signature> {
        let ix = withdraw_all_token_types(
            &self.program_id,
            &params.accounts(pool, user_transfer_authority.pubkey()),
            params.args(),
        );
        self.submit("withdraw_all_token_types", ix, payer, user_transfer_authority).await
    }

    pub async fn deposit_single_token_type_exact_amount_in(
        &self,
        payer:                   &Keypair,
        user_transfer_authority: &Keypair,
        pool:                    &PoolState,
        params:                  DepositSingleParams,
    ) -> Result<Signature> {
        let ix = deposit_single_token_type_exact_amount_in(
            &self.program_id,
            &params.accounts(pool, user_transfer_authority.pubkey()),
            params.args(),
        );
        self.submit("deposit_single_token_type_exact_amount_in", ix, payer, user_transfer_authority)
            .await
    }

    pub async fn withdraw_single_token_type_exact_amount_out(
        &self,
        payer:                   &Keypair,
        user_transfer_authority: &Keypair,
        pool:                    &PoolState,
        params:                  WithdrawSingleParams,
    ) -> Result<Signature> {
        let ix = withdraw_single_token_type_exact_amount_out(
            &self.program_id,
            &params.accounts(pool, user_transfer_authority.pubkey()),
            params.args(),
        );
        self.submit("withdraw_single_token_type_exact_amount_out", ix, payer, user_transfer_authority)
            .await
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    /// `create_account` followed by `Initialize` for a new swap account.
    pub(crate) fn create_pool_instructions(
        &self,
        payer:    &Pubkey,
        swap:     &Pubkey,
        lamports: u64,
        params:   &CreatePoolParams,
    ) -> Vec<Instruction> {
        let (authority, nonce) = find_authority(swap, &self.program_id);

        let create = system_instruction::create_account(
            payer,
            swap,
            lamports,
            TOKEN_SWAP_LEN as u64,
            &self.program_id,
        );
        let init = initialize(
            &self.program_id,
            &InitializeAccounts {
                swap:          *swap,
                authority,
                token_a:       params.token_a,
                token_b:       params.token_b,
                pool_mint:     params.pool_mint,
                fee_account:   params.fee_account,
                destination:   params.destination,
                token_program: params.token_program,
            },
            InitializeArgs { nonce, fees: params.fees, curve: params.curve },
        );
        vec![create, init]
    }

    async fn submit(
        &self,
        label:                   &str,
        ix:                      Instruction,
        payer:                   &Keypair,
        user_transfer_authority: &Keypair,
    ) -> Result<Signature> {
        let rpc = self.rpc();
        let sig = self.sign_and_send(&rpc, &[ix], payer, &[user_transfer_authority]).await?;
        info!(instruction = label, %sig, "transaction confirmed");
        Ok(sig)
    }

    fn rpc(&self) -> RpcClient {
        RpcClient::new_with_commitment(self.rpc_url.clone(), self.commitment)
    }

    async fn sign_and_send(
        &self,
        rpc:          &RpcClient,
        instructions: &[Instruction],
        payer:        &Keypair,
        extra:        &[&Keypair],
    ) -> Result<Signature> {
        let blockhash = rpc.get_latest_blockhash().await?;
        let mut signers: Vec<&dyn Signer> = vec![payer];
        for k in extra {
            if k.pubkey() != payer.pubkey() {
                signers.push(*k as &dyn Signer);
            }
        }
        let tx = Transaction::new_signed_with_payer(
            instructions,
            Some(&payer.pubkey()),
            &signers,
            blockhash,
        );
        Ok(rpc.send_and_confirm_transaction(&tx).await?)
    }
}
