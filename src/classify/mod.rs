/// Classification Module
///
/// Turns a decoded transaction into `TransactionDetails`:
/// - Extract: convert the RPC jsonParsed encoding into a `ParsedTransactionRecord`
/// - Parse: run the memo, token and system parsers over its instructions
/// - Classify: pick the transfer kind, token transfers taking priority over SOL
pub mod extract;
pub mod parsers;

use crate::models::{ParsedTransactionRecord, TransactionDetails, TransactionStatus, TransferKind};
use parsers::{parse_memo, parse_system_transfer, parse_token_transfer};

/// The record was fetched but holds no recognizable transfer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("No token or SOL transfer found in transaction {0}")]
pub struct NoTransferFound(pub String);

/// Classify a transaction as a token transfer of `token_address` or a SOL transfer
///
/// The memo is reported whatever the transfer kind. Classification is pure: the same
/// record always yields the same result.
pub fn classify(
    record: &ParsedTransactionRecord,
    token_address: &str,
    signature: &str,
) -> Result<TransactionDetails, NoTransferFound> {
    let memo = parse_memo(&record.instructions);

    let (kind, transfer) =
        if let Some(transfer) = parse_token_transfer(&record.instructions, &record.post_token_balances, token_address)
        {
            (TransferKind::Token, transfer)
        } else if let Some(transfer) = parse_system_transfer(&record.instructions) {
            (TransferKind::Native, transfer)
        } else {
            return Err(NoTransferFound(signature.to_string()));
        };

    let status = if record.transaction_error.is_some() { TransactionStatus::Failed } else { TransactionStatus::Success };

    tracing::debug!("Classified {} as {} ({:?})", signature, kind.as_str(), status);

    Ok(TransactionDetails {
        signature: signature.to_string(),
        amount: transfer.amount,
        memo,
        from: transfer.from,
        to: transfer.to,
        timestamp: record.block_time.unwrap_or(0),
        status,
        kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldMap, FieldValue, Instruction, ParsedPayload, TokenBalanceSnapshot, UiTokenAmount};
    use parsers::memo::MEMO_PROGRAM;
    use parsers::system::SYSTEM_PROGRAM;

    const MINT: &str = "9raUVuzeWUk53co63M4WXLWPWE4Xc6Lpn7RS9dnkpump";

    fn sol_transfer(lamports: u64) -> Instruction {
        let mut info = FieldMap::new();
        info.insert("lamports".into(), FieldValue::Integer(lamports));
        info.insert("source".into(), FieldValue::Text("Payer".into()));
        info.insert("destination".into(), FieldValue::Text("Merchant".into()));
        Instruction::Parsed {
            program_id: SYSTEM_PROGRAM.into(),
            payload: ParsedPayload::Typed { kind: "transfer".into(), info },
        }
    }

    fn token_transfer(amount: &str) -> Instruction {
        let mut info = FieldMap::new();
        info.insert("amount".into(), FieldValue::Text(amount.into()));
        info.insert("authority".into(), FieldValue::Text("Owner".into()));
        info.insert("source".into(), FieldValue::Text("OwnerAta".into()));
        info.insert("destination".into(), FieldValue::Text("MerchantAta".into()));
        Instruction::Parsed {
            program_id: "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA".into(),
            payload: ParsedPayload::Typed { kind: "transfer".into(), info },
        }
    }

    fn mint_balance() -> TokenBalanceSnapshot {
        TokenBalanceSnapshot { mint: MINT.into(), ui_token_amount: UiTokenAmount { decimals: Some(6), amount: "0".into() } }
    }

    #[test]
    fn test_classify_token_transfer_with_memo() {
        let record = ParsedTransactionRecord {
            instructions: vec![
                Instruction::Raw { program_id: MEMO_PROGRAM.into(), data: b"order-123".to_vec() },
                token_transfer("10500000"),
            ],
            pre_token_balances: vec![mint_balance()],
            post_token_balances: vec![mint_balance()],
            block_time: Some(1_700_000_000),
            transaction_error: None,
        };

        let details = classify(&record, MINT, "sig1").unwrap();
        assert_eq!(details.kind, TransferKind::Token);
        assert_eq!(details.amount, 10.5);
        assert_eq!(details.memo.as_deref(), Some("order-123"));
        assert_eq!(details.from, "Owner");
        assert_eq!(details.to, "MerchantAta");
        assert_eq!(details.timestamp, 1_700_000_000);
        assert_eq!(details.status, TransactionStatus::Success);
        assert_eq!(details.signature, "sig1");
    }

    #[test]
    fn test_classify_token_has_priority_over_sol() {
        let record = ParsedTransactionRecord {
            instructions: vec![sol_transfer(100_000_000), token_transfer("1000000")],
            post_token_balances: vec![mint_balance()],
            ..Default::default()
        };

        let details = classify(&record, MINT, "sig2").unwrap();
        assert_eq!(details.kind, TransferKind::Token);
        assert_eq!(details.amount, 1.0);
    }

    #[test]
    fn test_classify_sol_transfer() {
        let record = ParsedTransactionRecord {
            instructions: vec![sol_transfer(100_000_000)],
            transaction_error: Some(serde_json::json!({"InstructionError": [0, "Custom"]})),
            ..Default::default()
        };

        let details = classify(&record, MINT, "sig3").unwrap();
        assert_eq!(details.kind, TransferKind::Native);
        assert_eq!(details.amount, 0.1);
        assert_eq!(details.status, TransactionStatus::Failed);
        assert_eq!(details.timestamp, 0);
        assert_eq!(details.memo, None);
    }

    #[test]
    fn test_classify_token_transfer_of_other_mint_falls_back_to_sol() {
        let record = ParsedTransactionRecord {
            instructions: vec![token_transfer("1000000"), sol_transfer(5_000)],
            post_token_balances: vec![TokenBalanceSnapshot {
                mint: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".into(),
                ui_token_amount: UiTokenAmount { decimals: Some(6), amount: "0".into() },
            }],
            ..Default::default()
        };

        assert_eq!(classify(&record, MINT, "sig4").unwrap().kind, TransferKind::Native);
    }

    #[test]
    fn test_classify_no_transfer() {
        let record = ParsedTransactionRecord {
            instructions: vec![Instruction::Raw { program_id: MEMO_PROGRAM.into(), data: b"just a note".to_vec() }],
            ..Default::default()
        };

        assert_eq!(classify(&record, MINT, "sig5"), Err(NoTransferFound("sig5".into())));
    }

    #[test]
    fn test_classify_is_idempotent() {
        let record = ParsedTransactionRecord { instructions: vec![sol_transfer(42)], ..Default::default() };
        assert_eq!(classify(&record, MINT, "sig6"), classify(&record, MINT, "sig6"));
    }
}
