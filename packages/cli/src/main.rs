use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use serde_json::json;
use solana_sdk::{
    pubkey::Pubkey,
    signature::{read_keypair_file, Keypair, Signer},
};
use std::str::FromStr;
use token_swap_sdk::{
    decode_u64, encode_u64, DepositAllParams, DepositSingleParams, HostFee, Numberu64, PoolState,
    SwapParams, TokenSwapClient, TradeDirection, WithdrawAllParams, WithdrawSingleParams,
    TOKEN_SWAP_LEN, TOKEN_SWAP_PROGRAM_ID,
};
use tracing_subscriber::EnvFilter;

// ─── Argument parsers ─────────────────────────────────────────────────────────

/// Amounts go through the SDK codec so oversize values fail before any RPC call.
fn parse_amount(s: &str) -> std::result::Result<Numberu64, String> {
    Numberu64::from_str(s).map_err(|e| e.to_string())
}

fn parse_pubkey(s: &str) -> std::result::Result<Pubkey, String> {
    Pubkey::from_str(s).map_err(|_| format!("'{s}' is not a base-58 public key"))
}

/// Expand `~/` to `$HOME/` in keypair paths.
fn expand_home(path: &str) -> String {
    if path.starts_with("~/") {
        format!("{}{}", std::env::var("HOME").unwrap_or_default(), &path[1..])
    } else {
        path.to_string()
    }
}

fn load_keypair(path: &str) -> Result<Keypair> {
    let expanded = expand_home(path);
    read_keypair_file(&expanded)
        .map_err(|e| anyhow!(
            "Cannot load keypair from '{}': {}\n  \
             Set TOKEN_SWAP_KEYPAIR or pass --keypair to specify a different path.",
            expanded, e
        ))
}

/// Hex input for `decode-u64`, with at most one optional `0x` prefix.
fn parse_hex(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).with_context(|| format!("'{s}' is not valid hex"))
}

// ─── CLI definition ───────────────────────────────────────────────────────────

/// Token Swap: command-line client for the SPL token-swap program.
///
/// Every command supports --json for machine-readable output.
/// Global options can also be set via environment variables:
///   TOKEN_SWAP_RPC_URL     Solana JSON-RPC endpoint
///   TOKEN_SWAP_KEYPAIR     path to payer keypair JSON
///   TOKEN_SWAP_PROGRAM_ID  token-swap program to talk to
#[derive(Parser)]
#[command(
    name    = "token-swap",
    version = env!("CARGO_PKG_VERSION"),
    about   = "Encode, decode, and submit SPL token-swap instructions.",
    after_help = "\
ENVIRONMENT:
  TOKEN_SWAP_RPC_URL     Solana JSON-RPC endpoint  [default: https://api.devnet.solana.com]
  TOKEN_SWAP_KEYPAIR     Path to payer keypair JSON  [default: ~/.config/solana/id.json]
  TOKEN_SWAP_PROGRAM_ID  Token-swap program id
  RUST_LOG               Log filter for stderr diagnostics  [default: warn]

QUICK START:
  token-swap pool-info --pool <SWAP>
  token-swap encode-u64 18446744073709551615
  token-swap swap --pool <SWAP> --source <ACCT> --destination <ACCT> --amount 1000000 --min-out 990000"
)]
struct Cli {
    /// Solana JSON-RPC endpoint
    #[arg(
        long,
        global        = true,
        value_name    = "URL",
        default_value = "https://api.devnet.solana.com",
        env           = "TOKEN_SWAP_RPC_URL"
    )]
    rpc_url: String,

    /// Path to the payer's keypair JSON file; also signs as transfer authority
    #[arg(
        long,
        global        = true,
        value_name    = "PATH",
        default_value = "~/.config/solana/id.json",
        env           = "TOKEN_SWAP_KEYPAIR"
    )]
    keypair: String,

    /// Token-swap program id
    #[arg(
        long,
        global        = true,
        value_name    = "PUBKEY",
        default_value = TOKEN_SWAP_PROGRAM_ID,
        value_parser  = parse_pubkey,
        env           = "TOKEN_SWAP_PROGRAM_ID"
    )]
    program_id: Pubkey,

    /// Output machine-readable JSON instead of human-readable text
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    /// Sell token A, receive token B
    AToB,
    /// Sell token B, receive token A
    BToA,
}

impl From<Direction> for TradeDirection {
    fn from(d: Direction) -> Self {
        match d {
            Direction::AToB => TradeDirection::AToB,
            Direction::BToA => TradeDirection::BToA,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a swap account: mints, token accounts, fees, and curve
    ///
    /// Read-only: no keypair required.
    PoolInfo {
        /// Swap account address
        #[arg(long, value_name = "PUBKEY", value_parser = parse_pubkey)]
        pool: Pubkey,
    },

    /// Lamports needed to keep a new swap account rent exempt
    Rent,

    /// Encode a decimal amount as 8 little-endian bytes
    EncodeU64 {
        /// Non-negative decimal integer, any length
        value: String,
    },

    /// Decode 8 little-endian bytes (hex) into a decimal amount
    DecodeU64 {
        /// Exactly 16 hex digits, optional 0x prefix
        hex: String,
    },

    /// Swap tokens through a pool
    #[command(
        after_help = "\
EXAMPLES:
  token-swap swap --pool <SWAP> --source <USER_A> --destination <USER_B> \\
    --amount 1000000 --min-out 990000

  # Route part of the owner fee to a host account (adds an 11th account)
  token-swap swap --pool <SWAP> --direction b-to-a --source <USER_B> --destination <USER_A> \\
    --amount 5000 --min-out 0 --host-fee <HOST_POOL_TOKEN_ACCT>"
    )]
    Swap {
        #[arg(long, value_name = "PUBKEY", value_parser = parse_pubkey)]
        pool: Pubkey,
        /// User token account the input leaves from
        #[arg(long, value_name = "PUBKEY", value_parser = parse_pubkey)]
        source: Pubkey,
        /// User token account the output lands in
        #[arg(long, value_name = "PUBKEY", value_parser = parse_pubkey)]
        destination: Pubkey,
        #[arg(long, value_enum, default_value = "a-to-b")]
        direction: Direction,
        /// Amount to sell (atomic units)
        #[arg(long, value_name = "AMOUNT", value_parser = parse_amount)]
        amount: Numberu64,
        /// Minimum amount to receive (atomic units)
        #[arg(long, value_name = "AMOUNT", value_parser = parse_amount)]
        min_out: Numberu64,
        /// Host pool-token account to receive a share of the fee
        #[arg(long, value_name = "PUBKEY", value_parser = parse_pubkey)]
        host_fee: Option<Pubkey>,
    },

    /// Deposit both tokens and mint an exact amount of pool tokens
    Deposit {
        #[arg(long, value_name = "PUBKEY", value_parser = parse_pubkey)]
        pool: Pubkey,
        #[arg(long, value_name = "PUBKEY", value_parser = parse_pubkey)]
        source_a: Pubkey,
        #[arg(long, value_name = "PUBKEY", value_parser = parse_pubkey)]
        source_b: Pubkey,
        /// User pool-token account
        #[arg(long, value_name = "PUBKEY", value_parser = parse_pubkey)]
        destination: Pubkey,
        #[arg(long, value_name = "AMOUNT", value_parser = parse_amount)]
        pool_tokens: Numberu64,
        #[arg(long, value_name = "AMOUNT", value_parser = parse_amount)]
        max_a: Numberu64,
        #[arg(long, value_name = "AMOUNT", value_parser = parse_amount)]
        max_b: Numberu64,
    },

    /// Burn pool tokens and withdraw both tokens
    Withdraw {
        #[arg(long, value_name = "PUBKEY", value_parser = parse_pubkey)]
        pool: Pubkey,
        /// User pool-token account
        #[arg(long, value_name = "PUBKEY", value_parser = parse_pubkey)]
        source: Pubkey,
        #[arg(long, value_name = "PUBKEY", value_parser = parse_pubkey)]
        destination_a: Pubkey,
        #[arg(long, value_name = "PUBKEY", value_parser = parse_pubkey)]
        destination_b: Pubkey,
        #[arg(long, value_name = "AMOUNT", value_parser = parse_amount)]
        pool_tokens: Numberu64,
        #[arg(long, value_name = "AMOUNT", value_parser = parse_amount, default_value = "0")]
        min_a: Numberu64,
        #[arg(long, value_name = "AMOUNT", value_parser = parse_amount, default_value = "0")]
        min_b: Numberu64,
    },

    /// Deposit an exact amount of one token
    DepositSingle {
        #[arg(long, value_name = "PUBKEY", value_parser = parse_pubkey)]
        pool: Pubkey,
        /// User token A or token B account
        #[arg(long, value_name = "PUBKEY", value_parser = parse_pubkey)]
        source: Pubkey,
        /// User pool-token account
        #[arg(long, value_name = "PUBKEY", value_parser = parse_pubkey)]
        destination: Pubkey,
        #[arg(long, value_name = "AMOUNT", value_parser = parse_amount)]
        amount: Numberu64,
        #[arg(long, value_name = "AMOUNT", value_parser = parse_amount, default_value = "0")]
        min_pool_tokens: Numberu64,
    },

    /// Withdraw an exact amount of one token
    WithdrawSingle {
        #[arg(long, value_name = "PUBKEY", value_parser = parse_pubkey)]
        pool: Pubkey,
        /// User pool-token account
        #[arg(long, value_name = "PUBKEY", value_parser = parse_pubkey)]
        source: Pubkey,
        /// User token A or token B account
        #[arg(long, value_name = "PUBKEY", value_parser = parse_pubkey)]
        destination: Pubkey,
        #[arg(long, value_name = "AMOUNT", value_parser = parse_amount)]
        amount: Numberu64,
        #[arg(long, value_name = "AMOUNT", value_parser = parse_amount)]
        max_pool_tokens: Numberu64,
    },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if std::env::args().len() == 1 {
        Cli::command().print_long_help().ok();
        println!();
        return Ok(());
    }

    let cli = Cli::parse();
    tracing::debug!(rpc = %cli.rpc_url, program = %cli.program_id, "token-swap starting");
    let client = TokenSwapClient::new(cli.rpc_url.clone()).with_program_id(cli.program_id);

    match &cli.command {
        Commands::PoolInfo { pool } => cmd_pool_info(&client, pool, cli.json).await,
        Commands::Rent => cmd_rent(&client, cli.json).await,
        Commands::EncodeU64 { value } => cmd_encode_u64(value, cli.json),
        Commands::DecodeU64 { hex } => cmd_decode_u64(hex, cli.json),
        Commands::Swap { pool, source, destination, direction, amount, min_out, host_fee } => {
            let payer = load_keypair(&cli.keypair)?;
            let state = client.load_pool(pool).await.context("load swap account")?;
            let params = SwapParams {
                source:             *source,
                destination:        *destination,
                direction:          (*direction).into(),
                host_fee:           HostFee::from(*host_fee),
                amount_in:          *amount,
                minimum_amount_out: *min_out,
            };
            let sig = client
                .swap(&payer, &payer, &state, params)
                .await
                .context("swap transaction failed")?;
            report(cli.json, "swap", &state, &sig.to_string(), &[
                ("amount_in", amount.to_string()),
                ("minimum_amount_out", min_out.to_string()),
                ("host_fee", host_fee.map(|k| k.to_string()).unwrap_or_default()),
            ]);
            Ok(())
        }
        Commands::Deposit { pool, source_a, source_b, destination, pool_tokens, max_a, max_b } => {
            let payer = load_keypair(&cli.keypair)?;
            let state = client.load_pool(pool).await.context("load swap account")?;
            let params = DepositAllParams {
                source_a:               *source_a,
                source_b:               *source_b,
                destination:            *destination,
                pool_token_amount:      *pool_tokens,
                maximum_token_a_amount: *max_a,
                maximum_token_b_amount: *max_b,
            };
            let sig = client
                .deposit_all_token_types(&payer, &payer, &state, params)
                .await
                .context("deposit transaction failed")?;
            report(cli.json, "deposit", &state, &sig.to_string(), &[
                ("pool_token_amount", pool_tokens.to_string()),
                ("maximum_token_a_amount", max_a.to_string()),
                ("maximum_token_b_amount", max_b.to_string()),
            ]);
            Ok(())
        }
        Commands::Withdraw { pool, source, destination_a, destination_b, pool_tokens, min_a, min_b } => {
            let payer = load_keypair(&cli.keypair)?;
            let state = client.load_pool(pool).await.context("load swap account")?;
            let params = WithdrawAllParams {
                source:                 *source,
                destination_a:          *destination_a,
                destination_b:          *destination_b,
                pool_token_amount:      *pool_tokens,
                minimum_token_a_amount: *min_a,
                minimum_token_b_amount: *min_b,
            };
            let sig = client
                .withdraw_all_token_types(&payer, &payer, &state, params)
                .await
                .context("withdraw transaction failed")?;
            report(cli.json, "withdraw", &state, &sig.to_string(), &[
                ("pool_token_amount", pool_tokens.to_string()),
                ("minimum_token_a_amount", min_a.to_string()),
                ("minimum_token_b_amount", min_b.to_string()),
            ]);
            Ok(())
        }
        Commands::DepositSingle { pool, source, destination, amount, min_pool_tokens } => {
            let payer = load_keypair(&cli.keypair)?;
            let state = client.load_pool(pool).await.context("load swap account")?;
            let params = DepositSingleParams {
                source:                    *source,
                destination:               *destination,
                source_token_amount:       *amount,
                minimum_pool_token_amount: *min_pool_tokens,
            };
            let sig = client
                .deposit_single_token_type_exact_amount_in(&payer, &payer, &state, params)
                .await
                .context("single-sided deposit transaction failed")?;
            report(cli.json, "deposit-single", &state, &sig.to_string(), &[
                ("source_token_amount", amount.to_string()),
                ("minimum_pool_token_amount", min_pool_tokens.to_string()),
            ]);
            Ok(())
        }
        Commands::WithdrawSingle { pool, source, destination, amount, max_pool_tokens } => {
            let payer = load_keypair(&cli.keypair)?;
            let state = client.load_pool(pool).await.context("load swap account")?;
            let params = WithdrawSingleParams {
                source:                    *source,
                destination:               *destination,
                destination_token_amount:  *amount,
                maximum_pool_token_amount: *max_pool_tokens,
            };
            let sig = client
                .withdraw_single_token_type_exact_amount_out(&payer, &payer, &state, params)
                .await
                .context("single-sided withdraw transaction failed")?;
            report(cli.json, "withdraw-single", &state, &sig.to_string(), &[
                ("destination_token_amount", amount.to_string()),
                ("maximum_pool_token_amount", max_pool_tokens.to_string()),
            ]);
            Ok(())
        }
    }
}

// ─── pool-info ───────────────────────────────────────────────────────────────

async fn cmd_pool_info(client: &TokenSwapClient, pool: &Pubkey, json_output: bool) -> Result<()> {
    let state = client
        .load_pool(pool)
        .await
        .with_context(|| format!("Cannot load swap account {pool}"))?;

    if json_output {
        println!("{}", json!({
            "status":  "ok",
            "command": "pool-info",
            "pool":    serde_json::to_value(&state)?,
        }));
        return Ok(());
    }

    println!("─── Swap Pool ────────────────────────────────────────────────────");
    println!("  Address          {}", state.address);
    println!("  Authority        {}  (nonce {})", state.authority, state.nonce);
    println!("  Version          {}", state.version);
    println!("  Curve            {:?}", state.curve.curve_type);
    println!("  Mint A           {}", state.mint_a);
    println!("  Mint B           {}", state.mint_b);
    println!("  Token account A  {}", state.token_account_a);
    println!("  Token account B  {}", state.token_account_b);
    println!("  Pool mint        {}", state.pool_mint);
    println!("  Fee account      {}", state.fee_account);
    println!("  Token program    {}", state.token_program_id);
    println!();
    println!("  ─── Fees (numerator / denominator) ──────────────");
    for (label, (num, den)) in [
        ("Trade", state.fees.trade_fee()),
        ("Owner trade", state.fees.owner_trade_fee()),
        ("Owner withdraw", state.fees.owner_withdraw_fee()),
        ("Host", state.fees.host_fee()),
    ] {
        println!("  {label:<16} {num:>20} / {den}");
    }
    Ok(())
}

// ─── rent ────────────────────────────────────────────────────────────────────

async fn cmd_rent(client: &TokenSwapClient, json_output: bool) -> Result<()> {
    let lamports = client
        .minimum_balance_for_rent_exemption()
        .await
        .context("rent-exemption query failed")?;
    if json_output {
        println!("{}", json!({
            "status":   "ok",
            "command":  "rent",
            "space":    TOKEN_SWAP_LEN,
            "lamports": lamports,
        }));
    } else {
        println!("  Swap account     {TOKEN_SWAP_LEN} bytes");
        println!("  Rent exempt at   {lamports} lamports");
    }
    Ok(())
}

// ─── encode-u64 / decode-u64 ─────────────────────────────────────────────────

fn cmd_encode_u64(value: &str, json_output: bool) -> Result<()> {
    let amount = Numberu64::from_str(value)?;
    let bytes = encode_u64(u128::from(amount.get()))?;
    if json_output {
        println!("{}", json!({
            "status":  "ok",
            "command": "encode-u64",
            "value":   amount,
            "hex":     hex::encode(bytes),
        }));
    } else {
        println!("{}", hex::encode(bytes));
    }
    Ok(())
}

fn cmd_decode_u64(hex: &str, json_output: bool) -> Result<()> {
    let value = decode_u64(&parse_hex(hex)?)?;
    if json_output {
        println!("{}", json!({
            "status":  "ok",
            "command": "decode-u64",
            "value":   value.to_string(),
        }));
    } else {
        println!("{value}");
    }
    Ok(())
}

// ─── Output ──────────────────────────────────────────────────────────────────

fn report(json_output: bool, command: &str, pool: &PoolState, tx: &str, fields: &[(&str, String)]) {
    if json_output {
        let mut out = json!({
            "status":  "ok",
            "command": command,
            "pool":    pool.address.to_string(),
            "tx":      tx,
        });
        for (k, v) in fields {
            out[*k] = json!(v);
        }
        println!("{out}");
    } else {
        println!("─── {command} ─────────────────────────────────────────────────");
        println!("  Pool             {}", pool.address);
        for (k, v) in fields {
            if !v.is_empty() {
                println!("  {k:<26} {v}");
            }
        }
        println!("  Transaction      {tx}");
    }
}
