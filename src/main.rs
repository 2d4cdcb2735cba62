/// Token Payments
///
/// Balances, memo-tagged payments, transaction inspection and signature
/// verification for a single SPL token, as a CLI and a JSON HTTP API.
mod api;
mod classify;
mod cli;
mod config;
mod error;
mod models;
mod payment;
mod rpc;
mod service;
mod signature;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use cli::{Cli, Command};
use config::Config;
use models::TransactionDetails;
use rpc::SolanaRpcClient;
use service::TokenService;
use solana_sdk::signature::{Keypair, Signer};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    cli.validate()?;

    let config = cli.apply(Config::from_env().context("Failed to load configuration")?);

    let rpc_client = SolanaRpcClient::new(config.rpc_url.clone());
    tracing::debug!("Using RPC endpoint {}", rpc_client.endpoint());

    let service = TokenService::new(rpc_client, &config.token_address, config.token_decimals)
        .context("Invalid token address")?;

    match &cli.command {
        Command::Balance { address } => {
            let balance = service.get_balance(address).await.context("Failed to get token balance")?;
            if cli.json {
                println!("{}", serde_json::json!({ "balance": balance }));
            } else {
                println!("💰 Balance of {}: {}", address, balance);
            }
        }
        Command::Tx { signature } => {
            let details =
                service.get_transaction_details(signature).await.context("Failed to get transaction details")?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&details)?);
            } else {
                print_details(&details);
            }
        }
        Command::Verify { message, signature, public_key } => {
            let is_valid = service.verify_signature(message, signature, public_key);
            if cli.json {
                println!("{}", serde_json::json!({ "isValid": is_valid }));
            } else {
                println!("{}", if is_valid { "✅ Signature is valid" } else { "❌ Signature is invalid" });
            }
        }
        Command::Sign { message, .. } => {
            let keypair = load_keypair(&config)?;
            let signature = keypair.sign_message(message.as_bytes());
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "signature": hex::encode(signature.as_ref()),
                        "publicKey": keypair.pubkey().to_string(),
                        "message": message,
                    })
                );
            } else {
                println!("{}", hex::encode(signature.as_ref()));
            }
        }
        Command::PaySol { recipient, amount, memo, .. } => {
            let keypair = load_keypair(&config)?;
            service.rpc().test_connection().await.context("Failed to connect to Solana RPC")?;
            let signature =
                service.send_sol(&keypair, recipient, *amount, memo).await.context("SOL payment failed")?;
            println!("✅ Sent {} SOL to {}: {}", amount, recipient, signature);
        }
        Command::PayToken { recipient, amount, memo, .. } => {
            let keypair = load_keypair(&config)?;
            service.rpc().test_connection().await.context("Failed to connect to Solana RPC")?;
            let signature =
                service.send_token(&keypair, recipient, *amount, memo).await.context("Token payment failed")?;
            println!("✅ Sent {} of {} to {}: {}", amount, service.token_address(), recipient, signature);
        }
        Command::Serve { .. } => {
            api::serve(service, &config.bind_addr).await.context("API server failed")?;
        }
    }

    Ok(())
}

/// Read a keypair stored as a JSON array of 64 bytes (solana-keygen format)
fn load_keypair(config: &Config) -> Result<Keypair> {
    let path = config.keypair_path.as_deref().context("No keypair given; pass --keypair or set KEYPAIR_PATH")?;

    let contents = std::fs::read_to_string(path).context(format!("Failed to read keypair file {}", path))?;
    let bytes: Vec<u8> = serde_json::from_str(&contents).context(format!("Keypair file {} is not a byte array", path))?;

    Keypair::try_from(bytes.as_slice()).context(format!("Keypair file {} does not hold a valid keypair", path))
}

fn print_details(details: &TransactionDetails) {
    let time = DateTime::<Utc>::from_timestamp(details.timestamp, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| details.timestamp.to_string());

    println!("🔍 Transaction {}", details.signature);
    println!("   Type: {}", details.kind.as_str());
    println!("   Status: {:?}", details.status);
    println!("   Amount: {}", details.amount);
    println!("   From: {}", details.from);
    println!("   To: {}", details.to);
    println!("   Memo: {}", details.memo.as_deref().unwrap_or("-"));
    println!("   ⏰ Timestamp: {}", time);
}
