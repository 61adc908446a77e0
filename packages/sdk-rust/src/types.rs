//! Parameter types for [`TokenSwapClient`](crate::TokenSwapClient) operations.
//!
//! Each params struct carries only the caller's side of an instruction; the
//! pool-side accounts come from a decoded [`PoolState`].

use solana_sdk::pubkey::Pubkey;

use crate::amount::Numberu64;
use crate::instructions::{
    DepositAllAccounts, DepositAllArgs, DepositSingleAccounts, DepositSingleArgs, HostFee,
    SwapAccounts, SwapArgs, WithdrawAllAccounts, WithdrawAllArgs, WithdrawSingleAccounts,
    WithdrawSingleArgs,
};
use crate::state::{Fees, PoolState, SwapCurve};

/// Which pool token account receives the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeDirection {
    AToB,
    BToA,
}

impl PoolState {
    /// `(swap_source, swap_destination)` for a trade direction.
    pub fn swap_vaults(&self, direction: TradeDirection) -> (Pubkey, Pubkey) {
        match direction {
            TradeDirection::AToB => (self.token_account_a, self.token_account_b),
            TradeDirection::BToA => (self.token_account_b, self.token_account_a),
        }
    }
}

/// Inputs for creating and initializing a new pool.
#[derive(Debug, Clone)]
pub struct CreatePoolParams {
    /// Pool-owned token A account, already owned by the swap authority.
    pub token_a:       Pubkey,
    pub token_b:       Pubkey,
    pub mint_a:        Pubkey,
    pub mint_b:        Pubkey,
    pub pool_mint:     Pubkey,
    pub fee_account:   Pubkey,
    /// Receives the initial pool tokens.
    pub destination:   Pubkey,
    pub token_program: Pubkey,
    pub fees:          Fees,
    pub curve:         SwapCurve,
}

#[derive(Debug, Clone)]
pub struct SwapParams {
    pub source:             Pubkey,
    pub destination:        Pubkey,
    pub direction:          TradeDirection,
    pub host_fee:           HostFee,
    pub amount_in:          Numberu64,
    pub minimum_amount_out: Numberu64,
}

impl SwapParams {
    pub fn accounts(&self, pool: &PoolState, user_transfer_authority: Pubkey) -> SwapAccounts {
        let (swap_source, swap_destination) = pool.swap_vaults(self.direction);
        SwapAccounts {
            swap: pool.address,
            authority: pool.authority,
            user_transfer_authority,
            source: self.source,
            swap_source,
            swap_destination,
            destination: self.destination,
            pool_mint: pool.pool_mint,
            fee_account: pool.fee_account,
            token_program: pool.token_program_id,
            host_fee: self.host_fee,
        }
    }

    pub fn args(&self) -> SwapArgs {
        SwapArgs { amount_in: self.amount_in, minimum_amount_out: self.minimum_amount_out }
    }
}

#[derive(Debug, Clone)]
pub struct DepositAllParams {
    pub source_a:               Pubkey,
    pub source_b:               Pubkey,
    /// User's pool-token account.
    pub destination:            Pubkey,
    pub pool_token_amount:      Numberu64,
    pub maximum_token_a_amount: Numberu64,
    pub maximum_token_b_amount: Numberu64,
}

impl DepositAllParams {
    pub fn accounts(&self, pool: &PoolState, user_transfer_authority: Pubkey) -> DepositAllAccounts {
        DepositAllAccounts {
            swap: pool.address,
            authority: pool.authority,
            user_transfer_authority,
            source_a: self.source_a,
            source_b: self.source_b,
            token_a: pool.token_account_a,
            token_b: pool.token_account_b,
            pool_mint: pool.pool_mint,
            destination: self.destination,
            token_program: pool.token_program_id,
        }
    }

    pub fn args(&self) -> DepositAllArgs {
        DepositAllArgs {
            pool_token_amount:      self.pool_token_amount,
            maximum_token_a_amount: self.maximum_token_a_amount,
            maximum_token_b_amount: self.maximum_token_b_amount,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WithdrawAllParams {
    /// User's pool-token account, burned from.
    pub source:                 Pubkey,
    pub destination_a:          Pubkey,
    pub destination_b:          Pubkey,
    pub pool_token_amount:      Numberu64,
    pub minimum_token_a_amount: Numberu64,
    pub minimum_token_b_amount: Numberu64,
}

impl WithdrawAllParams {
    pub fn accounts(&self, pool: &PoolState, user_transfer_authority: Pubkey) -> WithdrawAllAccounts {
        WithdrawAllAccounts {
            swap: pool.address,
            authority: pool.authority,
            user_transfer_authority,
            pool_mint: pool.pool_mint,
            source: self.source,
            token_a: pool.token_account_a,
            token_b: pool.token_account_b,
            destination_a: self.destination_a,
            destination_b: self.destination_b,
            fee_account: pool.fee_account,
            token_program: pool.token_program_id,
        }
    }

    pub fn args(&self) -> WithdrawAllArgs {
        WithdrawAllArgs {
            pool_token_amount:      self.pool_token_amount,
            minimum_token_a_amount: self.minimum_token_a_amount,
            minimum_token_b_amount: self.minimum_token_b_amount,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DepositSingleParams {
    /// User's token A or token B account.
    pub source:                    Pubkey,
    /// User's pool-token account.
    pub destination:               Pubkey,
    pub source_token_amount:       Numberu64,
    pub minimum_pool_token_amount: Numberu64,
}

impl DepositSingleParams {
    pub fn accounts(&self, pool: &PoolState, user_transfer_authority: Pubkey) -> DepositSingleAccounts {
        DepositSingleAccounts {
            swap: pool.address,
            authority: pool.authority,
            user_transfer_authority,
            source: self.source,
            token_a: pool.token_account_a,
            token_b: pool.token_account_b,
            pool_mint: pool.pool_mint,
            destination: self.destination,
            token_program: pool.token_program_id,
        }
    }

    pub fn args(&self) -> DepositSingleArgs {
        DepositSingleArgs {
            source_token_amount:       self.source_token_amount,
            minimum_pool_token_amount: self.minimum_pool_token_amount,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WithdrawSingleParams {
    /// User's pool-token account, burned from.
    pub source:                    Pubkey,
    /// User's token A or token B account.
    pub destination:               Pubkey,
    pub destination_token_amount:  Numberu64,
    pub maximum_pool_token_amount: Numberu64,
}

impl WithdrawSingleParams {
    pub fn accounts(&self, pool: &PoolState, user_transfer_authority: Pubkey) -> WithdrawSingleAccounts {
        WithdrawSingleAccounts {
            swap: pool.address,
            authority: pool.authority,
            user_transfer_authority,
            pool_mint: pool.pool_mint,
            source: self.source,
            token_a: pool.token_account_a,
            token_b: pool.token_account_b,
            destination: self.destination,
            fee_account: pool.fee_account,
            token_program: pool.token_program_id,
        }
    }

    pub fn args(&self) -> WithdrawSingleArgs {
        WithdrawSingleArgs {
            destination_token_amount:  self.destination_token_amount,
            maximum_pool_token_amount: self.maximum_pool_token_amount,
        }
    }
}
