//! Wallet Signature Module
//!
//! Recovers the signer of an Ethereum `personal_sign` message so a caller can
//! prove control of the wallet address it claims.

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::error::{AuthError, AuthResult};

// == Wallet Proof ==
/// Signature over a previously issued challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletProof {
    /// Nonce of the challenge that was signed
    pub nonce: String,
    /// 65-byte `r || s || v` signature, hex with optional `0x`
    pub signature: String,
}

impl WalletProof {
    pub fn new(nonce: impl Into<String>, signature: impl Into<String>) -> Self {
        Self {
            nonce: nonce.into(),
            signature: signature.into(),
        }
    }
}

/// EIP-191 digest: keccak256 of the prefixed message.
pub fn personal_message_hash(message: &str) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(format!("\x19Ethereum Signed Message:\n{}", message.len()).as_bytes());
    hasher.update(message.as_bytes());
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hasher.finalize());
    digest
}

/// Lowercase `0x` address of a public key.
pub fn address_of(key: &VerifyingKey) -> String {
    let encoded = key.to_encoded_point(false);
    // Skip the 0x04 uncompressed-point tag
    let digest = Keccak256::digest(&encoded.as_bytes()[1..]);
    format!("0x{}", hex::encode(&digest[12..]))
}

/// Recovers the address that produced `signature` over `message`.
pub fn recover_address(message: &str, signature: &str) -> AuthResult<String> {
    let bytes = hex::decode(signature.trim().trim_start_matches("0x"))
        .map_err(|_| AuthError::Authentication("signature is not valid hex".to_string()))?;
    if bytes.len() != 65 {
        return Err(AuthError::Authentication(format!(
            "signature must be 65 bytes, got {}",
            bytes.len()
        )));
    }

    let v = match bytes[64] {
        v @ (0 | 1) => v,
        v @ (27 | 28) => v - 27,
        other => {
            return Err(AuthError::Authentication(format!(
                "unsupported recovery id {}",
                other
            )))
        }
    };
    let signature = Signature::from_slice(&bytes[..64])
        .map_err(|_| AuthError::Authentication("malformed signature".to_string()))?;
    let recovery_id = RecoveryId::from_byte(v)
        .ok_or_else(|| AuthError::Authentication("malformed recovery id".to_string()))?;

    // Wallets may hand back high-s signatures; flip to low-s and the parity with it
    let (signature, recovery_id) = match signature.normalize_s() {
        Some(normalized) => (
            normalized,
            RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
        ),
        None => (signature, recovery_id),
    };

    let digest = personal_message_hash(message);
    let key = VerifyingKey::recover_from_prehash(&digest, &signature, recovery_id)
        .map_err(|_| AuthError::Authentication("signature does not recover a key".to_string()))?;
    Ok(address_of(&key))
}

/// Checks that `signature` over `message` was produced by `identity`.
pub fn verify_personal_signature(identity: &str, message: &str, signature: &str) -> AuthResult<()> {
    let signer = recover_address(message, signature)?;
    if signer.eq_ignore_ascii_case(identity) {
        Ok(())
    } else {
        Err(AuthError::Authentication(
            "signature was not produced by the claimed wallet".to_string(),
        ))
    }
}
