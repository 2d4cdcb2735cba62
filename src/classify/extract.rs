/// Extract Module
///
/// Converts a `getTransaction` response in jsonParsed encoding into the
/// `ParsedTransactionRecord` the parsers work on.
use crate::error::{ServiceError, ServiceResult};
use crate::models::{FieldMap, FieldValue, Instruction, ParsedPayload, ParsedTransactionRecord, TokenBalanceSnapshot};
use serde_json::Value;
use solana_transaction_status::EncodedConfirmedTransactionWithStatusMeta;

/// Build a record from the SDK's confirmed transaction type
pub fn record_from_encoded(tx: &EncodedConfirmedTransactionWithStatusMeta) -> ServiceResult<ParsedTransactionRecord> {
    let tx_json = serde_json::to_value(tx)
        .map_err(|e| ServiceError::Conversion(format!("Failed to serialize transaction to JSON: {}", e)))?;

    record_from_json(&tx_json)
}

/// Build a record from the raw `getTransaction` result object
pub fn record_from_json(tx_json: &Value) -> ServiceResult<ParsedTransactionRecord> {
    let message = tx_json
        .get("transaction")
        .and_then(|t| t.get("message"))
        .ok_or_else(|| ServiceError::Conversion("Transaction has no message".to_string()))?;

    let account_keys = extract_account_keys(message);

    let instructions = message
        .get("instructions")
        .and_then(|i| i.as_array())
        .map(|list| {
            list.iter()
                .enumerate()
                .filter_map(|(index, ix)| {
                    let converted = convert_instruction(ix, &account_keys);
                    if converted.is_none() {
                        tracing::warn!("Skipping undecodable instruction at index {}", index);
                    }
                    converted
                })
                .collect()
        })
        .unwrap_or_default();

    let meta = tx_json.get("meta").filter(|m| !m.is_null());
    if meta.is_none() {
        tracing::warn!("Transaction has no metadata, token balances and status unavailable");
    }

    let pre_token_balances = token_balances(meta, "preTokenBalances")?;
    let post_token_balances = token_balances(meta, "postTokenBalances")?;
    let transaction_error = meta.and_then(|m| m.get("err")).filter(|e| !e.is_null()).cloned();
    let block_time = tx_json.get("blockTime").and_then(|t| t.as_i64());

    Ok(ParsedTransactionRecord { instructions, pre_token_balances, post_token_balances, block_time, transaction_error })
}

/// Extract account keys from the message; parsed messages carry `{pubkey, ...}` objects
fn extract_account_keys(message: &Value) -> Vec<String> {
    let mut keys = Vec::new();

    if let Some(account_keys) = message.get("accountKeys").and_then(|a| a.as_array()) {
        for key in account_keys {
            if let Some(pubkey) = key.get("pubkey").and_then(|p| p.as_str()) {
                keys.push(pubkey.to_string());
            } else if let Some(pubkey_str) = key.as_str() {
                keys.push(pubkey_str.to_string());
            }
        }
    }

    keys
}

fn convert_instruction(instruction: &Value, account_keys: &[String]) -> Option<Instruction> {
    // For compiled instructions, use programIdIndex to look up in accountKeys
    let program_id = match instruction.get("programId").and_then(|p| p.as_str()) {
        Some(id) => id.to_string(),
        None => {
            let index = instruction.get("programIdIndex").and_then(|i| i.as_u64())?;
            account_keys.get(usize::try_from(index).ok()?)?.clone()
        }
    };

    if let Some(parsed) = instruction.get("parsed") {
        let payload = match parsed {
            Value::String(text) => ParsedPayload::Text(text.clone()),
            Value::Object(_) => ParsedPayload::Typed {
                kind: parsed.get("type").and_then(|t| t.as_str()).unwrap_or_default().to_string(),
                info: parsed.get("info").and_then(convert_map).unwrap_or_default(),
            },
            _ => return None,
        };
        return Some(Instruction::Parsed { program_id, payload });
    }

    // Undecoded instruction data is base58 in both the json and jsonParsed encodings
    let data = instruction.get("data").and_then(|d| d.as_str())?;
    let data = bs58::decode(data).into_vec().ok()?;

    Some(Instruction::Raw { program_id, data })
}

fn convert_map(value: &Value) -> Option<FieldMap> {
    let object = value.as_object()?;
    Some(object.iter().filter_map(|(key, v)| convert_value(v).map(|fv| (key.clone(), fv))).collect())
}

/// Values outside the supported set (null, bool, arrays, negative numbers) are dropped
fn convert_value(value: &Value) -> Option<FieldValue> {
    match value {
        Value::String(s) => Some(FieldValue::Text(s.clone())),
        Value::Number(n) => {
            if let Some(integer) = n.as_u64() {
                Some(FieldValue::Integer(integer))
            } else if n.is_f64() {
                n.as_f64().map(FieldValue::Decimal)
            } else {
                None
            }
        }
        Value::Object(_) => convert_map(value).map(FieldValue::Map),
        _ => None,
    }
}

fn token_balances(meta: Option<&Value>, key: &str) -> ServiceResult<Vec<TokenBalanceSnapshot>> {
    match meta.and_then(|m| m.get(key)).filter(|b| !b.is_null()) {
        Some(balances) => serde_json::from_value(balances.clone())
            .map_err(|e| ServiceError::Conversion(format!("Failed to parse {}: {}", key, e))),
        None => Ok(Vec::new()),
    }
}
