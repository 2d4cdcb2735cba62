/// Payment Module
///
/// Builds the instruction sets for memo-tagged SOL and token payments. Signing and
/// submission happen in a single call through `ChainRpc::submit_instructions`.
use solana_sdk::{instruction::Instruction, pubkey::Pubkey};
use solana_system_interface::instruction as system_instruction;
use spl_associated_token_account_interface::address::get_associated_token_address;
use spl_token_interface::instruction as token_instruction;

use crate::error::{ServiceError, ServiceResult};

pub const MEMO_PROGRAM_ID: Pubkey = Pubkey::from_str_const("MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr");

const NATIVE_DECIMALS: u8 = 9;

/// Derive the associated token account of `owner` for `mint`
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address(owner, mint)
}

/// Convert a UI amount to base units, rounding down
pub fn to_base_units(amount: f64, decimals: u8) -> ServiceResult<u64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ServiceError::InvalidAmount(format!("{} must be a positive number", amount)));
    }

    let units = (amount * 10f64.powi(i32::from(decimals))).floor();
    if units < 1.0 || units > u64::MAX as f64 {
        return Err(ServiceError::InvalidAmount(format!("{} is out of range for {} decimals", amount, decimals)));
    }

    Ok(units as u64)
}

pub fn memo_instruction(memo: &str) -> Instruction {
    Instruction::new_with_bytes(MEMO_PROGRAM_ID, memo.as_bytes(), Vec::new())
}

/// Memo (if any) followed by a System Program transfer
pub fn sol_payment_instructions(
    payer: &Pubkey,
    recipient: &Pubkey,
    amount_sol: f64,
    memo: &str,
) -> ServiceResult<Vec<Instruction>> {
    let lamports = to_base_units(amount_sol, NATIVE_DECIMALS)?;
    let transfer = system_instruction::transfer(payer, recipient, lamports);

    Ok(with_memo(memo, transfer))
}

/// Memo (if any) followed by an SPL Token transfer between associated token accounts
pub fn token_payment_instructions(
    payer: &Pubkey,
    recipient: &Pubkey,
    mint: &Pubkey,
    amount: f64,
    decimals: u8,
    memo: &str,
) -> ServiceResult<(Vec<Instruction>, u64)> {
    let units = to_base_units(amount, decimals)?;
    let source = associated_token_address(payer, mint);
    let destination = associated_token_address(recipient, mint);

    let transfer = token_instruction::transfer(&spl_token_interface::ID, &source, &destination, payer, &[], units)
        .map_err(|e| ServiceError::Conversion(format!("Failed to build token transfer: {}", e)))?;

    Ok((with_memo(memo, transfer), units))
}

/// Prefix `instruction` with a memo instruction unless the memo is empty
pub fn with_memo(memo: &str, instruction: Instruction) -> Vec<Instruction> {
    if memo.is_empty() {
        vec![instruction]
    } else {
        vec![memo_instruction(memo), instruction]
    }
}
