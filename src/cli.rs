/// CLI Module
///
/// Command-line interface configuration using clap.
use clap::{Parser, Subcommand};

use crate::config::Config;

/// Token Payments - balances, payments and transaction inspection for one SPL token
#[derive(Parser, Debug)]
#[command(name = "token-payments")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// RPC endpoint URL (overrides SOLANA_RPC_URL env var)
    #[arg(short = 'r', long, value_name = "URL", global = true)]
    pub rpc_url: Option<String>,

    /// Token mint address (overrides TOKEN_ADDRESS env var)
    #[arg(short = 't', long, value_name = "MINT", global = true)]
    pub token_address: Option<String>,

    /// Token decimals (overrides TOKEN_DECIMALS env var)
    #[arg(long, value_name = "DECIMALS", global = true)]
    pub decimals: Option<u8>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the token balance of a wallet
    Balance {
        /// Wallet address
        address: String,
    },

    /// Show the transfer details of a transaction
    Tx {
        /// Transaction signature
        signature: String,
    },

    /// Verify a hex encoded ed25519 signature of a message
    Verify {
        message: String,
        /// Signature as 128 hex characters
        signature: String,
        /// Signer public key (base58)
        public_key: String,
    },

    /// Sign a message with the local keypair and print the hex signature
    Sign {
        message: String,

        /// Keypair file (overrides KEYPAIR_PATH env var)
        #[arg(short = 'k', long, value_name = "PATH")]
        keypair: Option<String>,
    },

    /// Send SOL with an optional memo
    PaySol {
        recipient: String,
        /// Amount in SOL
        amount: f64,

        #[arg(short = 'm', long, default_value = "")]
        memo: String,

        /// Keypair file (overrides KEYPAIR_PATH env var)
        #[arg(short = 'k', long, value_name = "PATH")]
        keypair: Option<String>,
    },

    /// Send tokens with an optional memo
    PayToken {
        recipient: String,
        /// Amount in token units
        amount: f64,

        #[arg(short = 'm', long, default_value = "")]
        memo: String,

        /// Keypair file (overrides KEYPAIR_PATH env var)
        #[arg(short = 'k', long, value_name = "PATH")]
        keypair: Option<String>,
    },

    /// Serve the HTTP API
    Serve {
        /// Listen address (overrides BIND_ADDR env var)
        #[arg(short = 'b', long, value_name = "ADDR")]
        bind: Option<String>,
    },
}

impl Cli {
    /// Validate CLI arguments
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Command::PaySol { amount, .. } | Command::PayToken { amount, .. } = &self.command {
            if !amount.is_finite() || *amount <= 0.0 {
                anyhow::bail!("Amount ({}) must be greater than 0", amount);
            }
        }

        Ok(())
    }

    /// Apply command-line overrides on top of the environment configuration
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(url) = &self.rpc_url {
            config.rpc_url = url.clone();
        }
        if let Some(token) = &self.token_address {
            config.token_address = token.clone();
        }
        if let Some(decimals) = self.decimals {
            config.token_decimals = decimals;
        }

        match &self.command {
            Command::Serve { bind: Some(bind) } => config.bind_addr = bind.clone(),
            Command::Sign { keypair: Some(path), .. }
            | Command::PaySol { keypair: Some(path), .. }
            | Command::PayToken { keypair: Some(path), .. } => config.keypair_path = Some(path.clone()),
            _ => {}
        }

        config
    }
}
