/// Signature Verification Module
///
/// Verifies detached ed25519 signatures produced by a wallet's `signMessage`.
use solana_sdk::{pubkey::Pubkey, signature::Signature};
use std::str::FromStr;

use crate::error::ServiceError;

const SIGNATURE_LENGTH: usize = 64;

/// Verify a hex encoded signature of `message` against a base58 public key
///
/// Malformed input (bad hex, wrong length, invalid address) yields `false`.
pub fn verify_signature(message: &str, signature_hex: &str, public_key: &str) -> bool {
    match try_verify(message, signature_hex, public_key) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!("Error verifying signature: {}", e);
            false
        }
    }
}

fn try_verify(message: &str, signature_hex: &str, public_key: &str) -> Result<bool, ServiceError> {
    let signature_bytes =
        hex::decode(signature_hex).map_err(|e| ServiceError::Conversion(format!("Invalid signature hex: {}", e)))?;

    if signature_bytes.len() != SIGNATURE_LENGTH {
        return Err(ServiceError::InvalidSignatureLength(signature_bytes.len()));
    }

    let signature = Signature::try_from(signature_bytes.as_slice())
        .map_err(|e| ServiceError::Conversion(format!("Invalid signature bytes: {}", e)))?;
    let public_key = Pubkey::from_str(public_key).map_err(|_| ServiceError::InvalidAddress(public_key.to_string()))?;

    Ok(signature.verify(public_key.as_ref(), message.as_bytes()))
}
