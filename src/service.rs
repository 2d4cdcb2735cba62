/// Token Service Module
///
/// Entry point used by both the CLI and the HTTP API: balances, transaction
/// details, signature checks and payments for one configured token.
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use std::str::FromStr;

use crate::classify::classify;
use crate::error::{ServiceError, ServiceResult};
use crate::models::TransactionDetails;
use crate::payment::{associated_token_address, sol_payment_instructions, token_payment_instructions};
use crate::rpc::{ChainRpc, TokenAccountBalance};

pub struct TokenService<R> {
    rpc: R,
    mint: Pubkey,
    decimals: u8,
}

impl<R: ChainRpc> TokenService<R> {
    /// Create a service for the token minted at `token_address`
    pub fn new(rpc: R, token_address: &str, decimals: u8) -> ServiceResult<Self> {
        let mint = parse_pubkey(token_address)?;
        Ok(Self { rpc, mint, decimals })
    }

    pub fn token_address(&self) -> String {
        self.mint.to_string()
    }

    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    /// Token balance of a wallet in UI units; 0 when it has no associated token account
    pub async fn get_balance(&self, wallet_address: &str) -> ServiceResult<f64> {
        let owner = parse_pubkey(wallet_address)?;
        let token_account = associated_token_address(&owner, &self.mint);

        match self.rpc.fetch_token_account_balance(&token_account).await? {
            TokenAccountBalance::Amount(raw) => Ok(raw as f64 / 10f64.powi(i32::from(self.decimals))),
            TokenAccountBalance::AccountNotFound => {
                tracing::debug!("{} has no token account for {}", wallet_address, self.mint);
                Ok(0.0)
            }
        }
    }

    /// Fetch and classify a transaction
    pub async fn get_transaction_details(&self, signature: &str) -> ServiceResult<TransactionDetails> {
        let record = self
            .rpc
            .fetch_parsed_transaction(signature)
            .await?
            .ok_or_else(|| ServiceError::TransactionNotFound(signature.to_string()))?;

        classify(&record, &self.mint.to_string(), signature).map_err(|e| {
            tracing::warn!("{}", e);
            ServiceError::NoTransferFound(e.0)
        })
    }

    pub fn verify_signature(&self, message: &str, signature_hex: &str, public_key: &str) -> bool {
        crate::signature::verify_signature(message, signature_hex, public_key)
    }

    /// Send SOL to `recipient`, tagging the transaction with `memo` when non-empty
    pub async fn send_sol(&self, signer: &Keypair, recipient: &str, amount: f64, memo: &str) -> ServiceResult<String> {
        let recipient = parse_pubkey(recipient)?;
        let instructions = sol_payment_instructions(&signer.pubkey(), &recipient, amount, memo)?;

        self.rpc.submit_instructions(&instructions, signer).await
    }

    /// Send tokens from the signer's associated token account to the recipient's
    pub async fn send_token(&self, signer: &Keypair, recipient: &str, amount: f64, memo: &str) -> ServiceResult<String> {
        let recipient = parse_pubkey(recipient)?;
        let payer = signer.pubkey();
        let (instructions, units) =
            token_payment_instructions(&payer, &recipient, &self.mint, amount, self.decimals, memo)?;

        let source = associated_token_address(&payer, &self.mint);
        let available = match self.rpc.fetch_token_account_balance(&source).await? {
            TokenAccountBalance::Amount(raw) => raw,
            TokenAccountBalance::AccountNotFound => return Err(ServiceError::NoTokenAccount(payer.to_string())),
        };

        if available < units {
            return Err(ServiceError::InsufficientBalance { required: units, available });
        }

        self.rpc.submit_instructions(&instructions, signer).await
    }
}

fn parse_pubkey(address: &str) -> ServiceResult<Pubkey> {
    Pubkey::from_str(address).map_err(|_| ServiceError::InvalidAddress(address.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{
        FieldMap, FieldValue, Instruction as TxInstruction, ParsedPayload, ParsedTransactionRecord, TransferKind,
    };
    use async_trait::async_trait;
    use solana_sdk::instruction::Instruction;
    use std::collections::HashMap;
    use std::sync::Mutex;

    pub const MINT: &str = "9raUVuzeWUk53co63M4WXLWPWE4Xc6Lpn7RS9dnkpump";

    /// In-memory chain used by service and API tests
    #[derive(Default)]
    pub struct MockRpc {
        pub transactions: HashMap<String, ParsedTransactionRecord>,
        pub balances: HashMap<Pubkey, u64>,
        pub submitted: Mutex<Vec<Vec<Instruction>>>,
    }

    #[async_trait]
    impl ChainRpc for MockRpc {
        async fn fetch_parsed_transaction(&self, signature: &str) -> ServiceResult<Option<ParsedTransactionRecord>> {
            Ok(self.transactions.get(signature).cloned())
        }

        async fn fetch_token_account_balance(&self, address: &Pubkey) -> ServiceResult<TokenAccountBalance> {
            Ok(self
                .balances
                .get(address)
                .map(|raw| TokenAccountBalance::Amount(*raw))
                .unwrap_or(TokenAccountBalance::AccountNotFound))
        }

        async fn submit_instructions(&self, instructions: &[Instruction], _signer: &Keypair) -> ServiceResult<String> {
            let mut submitted = self.submitted.lock().map_err(|e| ServiceError::Rpc(e.to_string()))?;
            submitted.push(instructions.to_vec());
            Ok(format!("mock-signature-{}", submitted.len()))
        }
    }

    pub fn sol_transfer_record(lamports: u64) -> ParsedTransactionRecord {
        let mut info = FieldMap::new();
        info.insert("lamports".into(), FieldValue::Integer(lamports));
        info.insert("source".into(), FieldValue::Text("Payer".into()));
        info.insert("destination".into(), FieldValue::Text("Merchant".into()));

        ParsedTransactionRecord {
            instructions: vec![TxInstruction::Parsed {
                program_id: "11111111111111111111111111111111".into(),
                payload: ParsedPayload::Typed { kind: "transfer".into(), info },
            }],
            block_time: Some(1_700_000_000),
            ..Default::default()
        }
    }

    pub fn memo_only_record() -> ParsedTransactionRecord {
        ParsedTransactionRecord {
            instructions: vec![TxInstruction::Raw {
                program_id: "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr".into(),
                data: b"hello".to_vec(),
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_get_balance() {
        let owner = Pubkey::new_unique();
        let mint = Pubkey::from_str(MINT).unwrap();
        let mut rpc = MockRpc::default();
        rpc.balances.insert(associated_token_address(&owner, &mint), 10_500_000);

        let service = TokenService::new(rpc, MINT, 6).unwrap();
        assert_eq!(service.get_balance(&owner.to_string()).await.unwrap(), 10.5);
    }

    #[tokio::test]
    async fn test_get_balance_without_token_account() {
        let service = TokenService::new(MockRpc::default(), MINT, 6).unwrap();
        assert_eq!(service.get_balance(&Pubkey::new_unique().to_string()).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_get_balance_invalid_address() {
        let service = TokenService::new(MockRpc::default(), MINT, 6).unwrap();
        assert!(matches!(service.get_balance("not-an-address").await, Err(ServiceError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_get_transaction_details() {
        let mut rpc = MockRpc::default();
        rpc.transactions.insert("sol-sig".into(), sol_transfer_record(100_000_000));
        let service = TokenService::new(rpc, MINT, 6).unwrap();

        let details = service.get_transaction_details("sol-sig").await.unwrap();
        assert_eq!(details.kind, TransferKind::Native);
        assert_eq!(details.amount, 0.1);
        assert_eq!(details.signature, "sol-sig");
    }

    #[tokio::test]
    async fn test_not_found_vs_no_transfer() {
        let mut rpc = MockRpc::default();
        rpc.transactions.insert("memo-sig".into(), memo_only_record());
        let service = TokenService::new(rpc, MINT, 6).unwrap();

        assert!(matches!(
            service.get_transaction_details("missing").await,
            Err(ServiceError::TransactionNotFound(_))
        ));
        assert!(matches!(
            service.get_transaction_details("memo-sig").await,
            Err(ServiceError::NoTransferFound(_))
        ));
    }

    #[tokio::test]
    async fn test_send_sol() {
        let service = TokenService::new(MockRpc::default(), MINT, 6).unwrap();
        let signer = Keypair::new();

        let signature =
            service.send_sol(&signer, &Pubkey::new_unique().to_string(), 0.1, "order-456").await.unwrap();
        assert_eq!(signature, "mock-signature-1");

        let submitted = service.rpc().submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].len(), 2);
    }

    #[tokio::test]
    async fn test_send_token_checks_balance() {
        let signer = Keypair::new();
        let mint = Pubkey::from_str(MINT).unwrap();
        let recipient = Pubkey::new_unique().to_string();

        let service = TokenService::new(MockRpc::default(), MINT, 6).unwrap();
        assert!(matches!(
            service.send_token(&signer, &recipient, 1.0, "").await,
            Err(ServiceError::NoTokenAccount(_))
        ));

        let mut rpc = MockRpc::default();
        rpc.balances.insert(associated_token_address(&signer.pubkey(), &mint), 5_000_000);
        let service = TokenService::new(rpc, MINT, 6).unwrap();

        assert!(matches!(
            service.send_token(&signer, &recipient, 10.5, "order-123").await,
            Err(ServiceError::InsufficientBalance { required: 10_500_000, available: 5_000_000 })
        ));
        assert!(service.send_token(&signer, &recipient, 5.0, "order-123").await.is_ok());
        assert_eq!(service.rpc().submitted.lock().unwrap().len(), 1);
    }
}
