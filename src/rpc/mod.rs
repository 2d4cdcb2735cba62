/// RPC Client Module
///
/// This module handles all interactions with the Solana blockchain via RPC.
/// `ChainRpc` is the capability the rest of the crate depends on; `SolanaRpcClient`
/// implements it on top of the non-blocking Solana client.
use async_trait::async_trait;
use serde_json::json;
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_config::RpcTransactionConfig,
    rpc_request::RpcRequest,
};
use solana_commitment_config::CommitmentConfig;
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use solana_transaction_status::{EncodedConfirmedTransactionWithStatusMeta, UiTransactionEncoding};
use std::str::FromStr;

use crate::classify::extract::record_from_encoded;
use crate::error::{ServiceError, ServiceResult};
use crate::models::ParsedTransactionRecord;

/// Raw balance of a token account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAccountBalance {
    Amount(u64),
    /// The account has never been created; callers treat this as a zero balance
    AccountNotFound,
}

/// Chain access needed by the token service
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Fetch a confirmed transaction in jsonParsed encoding; `None` if the node does not know it
    async fn fetch_parsed_transaction(&self, signature: &str) -> ServiceResult<Option<ParsedTransactionRecord>>;

    /// Raw balance of a token account
    async fn fetch_token_account_balance(&self, address: &Pubkey) -> ServiceResult<TokenAccountBalance>;

    /// Sign `instructions` once with `signer` as fee payer, submit and wait for confirmation
    async fn submit_instructions(&self, instructions: &[Instruction], signer: &Keypair) -> ServiceResult<String>;
}

pub struct SolanaRpcClient {
    client: RpcClient,
    endpoint: String,
}

impl SolanaRpcClient {
    /// Create a new RPC client connected to the specified endpoint
    pub fn new(endpoint: String) -> Self {
        let client = RpcClient::new_with_commitment(endpoint.clone(), CommitmentConfig::confirmed());

        Self { client, endpoint }
    }

    /// Get the endpoint URL this client is connected to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Test the RPC connection
    pub async fn test_connection(&self) -> ServiceResult<()> {
        self.client.get_version().await.map_err(rpc_error("Failed to connect to RPC endpoint"))?;
        Ok(())
    }
}

#[async_trait]
impl ChainRpc for SolanaRpcClient {
    async fn fetch_parsed_transaction(&self, signature: &str) -> ServiceResult<Option<ParsedTransactionRecord>> {
        tracing::debug!("Fetching transaction {}", signature);

        let signature =
            Signature::from_str(signature).map_err(|_| ServiceError::InvalidSignature(signature.to_string()))?;

        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::JsonParsed),
            commitment: Some(CommitmentConfig::confirmed()),
            max_supported_transaction_version: Some(0),
        };

        // getTransaction answers null for unknown signatures
        let transaction: Option<EncodedConfirmedTransactionWithStatusMeta> = self
            .client
            .send(RpcRequest::GetTransaction, json!([signature.to_string(), config]))
            .await
            .map_err(rpc_error(&format!("Failed to fetch transaction {}", signature)))?;

        let Some(transaction) = transaction else {
            tracing::info!("Transaction {} not found", signature);
            return Ok(None);
        };

        tracing::info!("Successfully fetched transaction {} at slot {}", signature, transaction.slot);
        record_from_encoded(&transaction).map(Some)
    }

    async fn fetch_token_account_balance(&self, address: &Pubkey) -> ServiceResult<TokenAccountBalance> {
        let account = self
            .client
            .get_account_with_commitment(address, CommitmentConfig::confirmed())
            .await
            .map_err(rpc_error(&format!("Failed to fetch account {}", address)))?
            .value;

        if account.is_none() {
            tracing::debug!("Token account {} does not exist", address);
            return Ok(TokenAccountBalance::AccountNotFound);
        }

        let balance = self
            .client
            .get_token_account_balance(address)
            .await
            .map_err(rpc_error(&format!("Failed to fetch token balance of {}", address)))?;

        let amount = balance
            .amount
            .parse::<u64>()
            .map_err(|e| ServiceError::Conversion(format!("Invalid token amount {}: {}", balance.amount, e)))?;

        Ok(TokenAccountBalance::Amount(amount))
    }

    async fn submit_instructions(&self, instructions: &[Instruction], signer: &Keypair) -> ServiceResult<String> {
        let blockhash =
            self.client.get_latest_blockhash().await.map_err(rpc_error("Failed to get latest blockhash"))?;

        let transaction =
            Transaction::new_signed_with_payer(instructions, Some(&signer.pubkey()), &[signer], blockhash);

        let signature = self
            .client
            .send_and_confirm_transaction(&transaction)
            .await
            .map_err(rpc_error("Failed to send transaction"))?;

        tracing::info!("Transaction {} confirmed", signature);
        Ok(signature.to_string())
    }
}

fn rpc_error(context: &str) -> impl Fn(solana_client::client_error::ClientError) -> ServiceError + '_ {
    move |e| ServiceError::Rpc(format!("{}: {}", context, e))
}
