use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),
    #[error("No token or SOL transfer found in transaction {0}")]
    NoTransferFound(String),
    #[error("Invalid signature length: expected 64 bytes, got {0}")]
    InvalidSignatureLength(usize),
    #[error("Invalid transaction signature: {0}")]
    InvalidSignature(String),
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Sender {0} does not have a token account")]
    NoTokenAccount(String),
    #[error("Insufficient token balance: required {required}, available {available}")]
    InsufficientBalance { required: u64, available: u64 },
    #[error("RpcError: {0}")]
    Rpc(String),
    #[error("ConversionError: {0}")]
    Conversion(String),
}

impl ServiceError {
    /// Lookups that found nothing to report, surfaced as 404 by the API
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::TransactionNotFound(_) | Self::NoTransferFound(_))
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
