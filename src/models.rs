/// Data Models Module
///
/// This module defines the core data structures used throughout the application.
/// A `ParsedTransactionRecord` is the decoded view of a confirmed transaction that the
/// classifier works on, and `TransactionDetails` is what it reports back.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named fields of a decoded instruction (`parsed.info` in the jsonParsed encoding)
pub type FieldMap = BTreeMap<String, FieldValue>;

/// A single decoded instruction field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(u64),
    Decimal(f64),
    Map(FieldMap),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&FieldMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Integer view; numeric strings are accepted since token amounts travel as strings
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Decimal(f) => Some(*f),
            Self::Integer(n) => Some(*n as f64),
            Self::Text(s) => s.parse().ok(),
            Self::Map(_) => None,
        }
    }
}

/// Payload produced by the upstream instruction parser
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedPayload {
    /// Some programs (memo) decode to a bare string
    Text(String),
    Typed { kind: String, info: FieldMap },
}

/// A top-level transaction instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Raw { program_id: String, data: Vec<u8> },
    Parsed { program_id: String, payload: ParsedPayload },
}

impl Instruction {
    pub fn program_id(&self) -> &str {
        match self {
            Self::Raw { program_id, .. } | Self::Parsed { program_id, .. } => program_id,
        }
    }

    /// `(kind, info)` for typed parsed instructions
    pub fn typed(&self) -> Option<(&str, &FieldMap)> {
        match self {
            Self::Parsed { payload: ParsedPayload::Typed { kind, info }, .. } => Some((kind.as_str(), info)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiTokenAmount {
    #[serde(default)]
    pub decimals: Option<u8>,
    #[serde(default)]
    #[allow(dead_code)]
    pub amount: String,
}

/// Token balance of one token account before or after execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalanceSnapshot {
    pub mint: String,
    pub ui_token_amount: UiTokenAmount,
}

/// Decoded transaction as returned by the RPC node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTransactionRecord {
    pub instructions: Vec<Instruction>,
    /// Index-correlated with `post_token_balances`
    #[allow(dead_code)]
    pub pre_token_balances: Vec<TokenBalanceSnapshot>,
    pub post_token_balances: Vec<TokenBalanceSnapshot>,
    pub block_time: Option<i64>,
    pub transaction_error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Success,
    Failed,
}

/// Kinds of transfers the classifier recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferKind {
    /// Transfer of the configured SPL token
    Token,
    /// Native SOL transfer through the System Program
    Native,
}

impl TransferKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Token => "Token Transfer",
            Self::Native => "SOL Transfer",
        }
    }
}

/// Amount and parties of a single transfer found in a transaction
#[derive(Debug, Clone, PartialEq)]
pub struct TransferInfo {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

/// Classified transaction reported to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
    pub signature: String,
    pub amount: f64,
    pub memo: Option<String>,
    pub from: String,
    pub to: String,
    pub timestamp: i64,
    pub status: TransactionStatus,
    #[serde(rename = "type")]
    pub kind: TransferKind,
}
