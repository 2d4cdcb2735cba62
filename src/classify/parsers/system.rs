/// System Program Instruction Parser
///
/// Parses instructions from the Solana System Program (11111111111111111111111111111111).
use crate::models::{Instruction, TransferInfo};

pub const SYSTEM_PROGRAM: &str = "11111111111111111111111111111111";

/// Lamports per SOL is fixed by the protocol
const NATIVE_DECIMALS: i32 = 9;

/// Find the first SOL transfer in an instruction list
///
/// Matches a parsed `transfer` issued by the System Program that carries a
/// non-zero `lamports` amount:
/// - Amount in SOL (lamports / 10^9)
/// - Source account (from)
/// - Destination account (to)
///
/// Returns None if no instruction is a SOL transfer (e.g. advanceNonce, createAccount).
pub fn parse_system_transfer(instructions: &[Instruction]) -> Option<TransferInfo> {
    instructions.iter().find_map(|instruction| {
        if instruction.program_id() != SYSTEM_PROGRAM {
            return None;
        }

        let (kind, info) = instruction.typed()?;
        if kind != "transfer" {
            return None;
        }

        let lamports = info.get("lamports").and_then(|v| v.as_u64()).filter(|lamports| *lamports > 0)?;
        let from = info.get("source").and_then(|v| v.as_str()).unwrap_or_default().to_string();
        let to = info.get("destination").and_then(|v| v.as_str()).unwrap_or_default().to_string();

        tracing::debug!("Parsed SOL transfer: lamports={}, from={}, to={}", lamports, from, to);

        Some(TransferInfo { amount: lamports as f64 / 10f64.powi(NATIVE_DECIMALS), from, to })
    })
}
