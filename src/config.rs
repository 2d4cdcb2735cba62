/// Configuration Module
///
/// Runtime settings loaded from the environment (and `.env`), overridable from the CLI.
use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_TOKEN_ADDRESS: &str = "9raUVuzeWUk53co63M4WXLWPWE4Xc6Lpn7RS9dnkpump";
pub const DEFAULT_TOKEN_DECIMALS: u8 = 6;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub rpc_url: String,
    pub token_address: String,
    pub token_decimals: u8,
    pub bind_addr: String,
    pub keypair_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            token_address: DEFAULT_TOKEN_ADDRESS.to_string(),
            token_decimals: DEFAULT_TOKEN_DECIMALS,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            keypair_path: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let rpc_url = lookup("SOLANA_RPC_URL").unwrap_or_else(|| {
            tracing::warn!("SOLANA_RPC_URL not set, using {}", DEFAULT_RPC_URL);
            defaults.rpc_url
        });

        let token_address = lookup("TOKEN_ADDRESS").unwrap_or_else(|| {
            tracing::warn!("TOKEN_ADDRESS not set, using {}", DEFAULT_TOKEN_ADDRESS);
            defaults.token_address
        });

        let token_decimals = match lookup("TOKEN_DECIMALS") {
            Some(value) => value.parse::<u8>().context(format!("TOKEN_DECIMALS is not a valid u8: {}", value))?,
            None => defaults.token_decimals,
        };

        let bind_addr = lookup("BIND_ADDR").unwrap_or(defaults.bind_addr);
        let keypair_path = lookup("KEYPAIR_PATH");

        Ok(Self { rpc_url, token_address, token_decimals, bind_addr, keypair_path })
    }
}
