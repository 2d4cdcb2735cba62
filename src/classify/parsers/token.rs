/// SPL Token Program Instruction Parser
///
/// Parses token transfers for a single configured mint. Handles both the
/// `transfer` and `transferChecked` instruction types.
use crate::models::{FieldMap, Instruction, TokenBalanceSnapshot, TransferInfo};

/// Decimals assumed when a balance snapshot does not report them
pub const DEFAULT_TOKEN_DECIMALS: u8 = 6;

/// Find the first transfer of `mint` in an instruction list
///
/// An instruction matches when it is a parsed `transfer`/`transferChecked` carrying
/// an `authority` or `source` field and the post-execution token balances contain an
/// account of `mint`. The first matching instruction paired with the first matching
/// balance index wins; multiple transfers in one transaction are not aggregated.
///
/// Instructions whose amount cannot be read are skipped, so a SOL `transfer` ahead of
/// the token transfer does not hide it. Returns None if no pair matches.
pub fn parse_token_transfer(
    instructions: &[Instruction],
    post_token_balances: &[TokenBalanceSnapshot],
    mint: &str,
) -> Option<TransferInfo> {
    'instructions: for instruction in instructions {
        let Some((kind, info)) = instruction.typed() else {
            continue;
        };

        if kind != "transfer" && kind != "transferChecked" {
            continue;
        }

        for balance in post_token_balances {
            if balance.mint != mint {
                continue;
            }

            // The signer or source account must be present to attribute the transfer
            if !info.contains_key("authority") && !info.contains_key("source") {
                continue;
            }

            let decimals = balance.ui_token_amount.decimals.unwrap_or(DEFAULT_TOKEN_DECIMALS);
            let Some(amount) = resolve_amount(info, decimals) else {
                tracing::warn!("Token {} instruction has no readable amount", kind);
                continue 'instructions;
            };

            let from = text_field(info, "authority").or_else(|| text_field(info, "source")).unwrap_or_default();
            let to = text_field(info, "destination").unwrap_or_default();

            tracing::debug!("Parsed token transfer: amount={}, from={}, to={}", amount, from, to);

            return Some(TransferInfo { amount, from, to });
        }
    }

    None
}

/// UI amount from `tokenAmount` when the parser computed one, otherwise the raw
/// `amount` scaled by the mint decimals
fn resolve_amount(info: &FieldMap, decimals: u8) -> Option<f64> {
    if let Some(token_amount) = info.get("tokenAmount") {
        let token_amount = token_amount.as_map()?;
        return token_amount
            .get("uiAmount")
            .or_else(|| token_amount.get("uiAmountString"))
            .and_then(|v| v.as_f64());
    }

    let raw = info.get("amount").and_then(|v| v.as_u64())?;
    Some(raw as f64 / 10f64.powi(i32::from(decimals)))
}

fn text_field(info: &FieldMap, key: &str) -> Option<String> {
    info.get(key).and_then(|v| v.as_str()).map(str::to_string)
}
