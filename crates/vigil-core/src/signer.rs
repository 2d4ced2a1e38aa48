//! Challenge signing with the registry's recoverable-signature convention.
//!
//! The registry verifies signatures the way Ethereum wallets produce them: the
//! challenge is prefixed with a fixed tag and its decimal length, hashed with
//! keccak-256, and signed with recoverable ECDSA over secp256k1. The recovery
//! id in the final byte is shifted by 27 to match the verifier.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};

use crate::error::{VigilError, VigilResult};
use crate::identity::Address;

/// Domain-separation tag applied before hashing a challenge. The decimal
/// length of the message follows the tag, so signatures over messages of
/// different lengths can never collide.
const MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Offset added to the recovery id in the last signature byte.
pub const RECOVERY_ID_OFFSET: u8 = 27;

/// Sign a challenge string.
///
/// Returns `0x` followed by the lowercase hex encoding of r ‖ s ‖ v
/// (65 bytes), where v is the recovery id plus [`RECOVERY_ID_OFFSET`].
/// Signing is deterministic (RFC 6979): identical (message, key) pairs always
/// produce identical signatures, which the login step relies on.
pub fn sign_challenge(key: &SigningKey, message: &str) -> VigilResult<String> {
    let (signature, recovery_id) = key
        .sign_digest_recoverable(challenge_digest(message))
        .map_err(|e| VigilError::key(format!("signing failed: {}", e)))?;

    let mut bytes = [0u8; 65];
    bytes[..64].copy_from_slice(signature.to_bytes().as_slice());
    bytes[64] = recovery_id.to_byte() + RECOVERY_ID_OFFSET;

    Ok(format!("0x{}", hex::encode(bytes)))
}

/// Recover the signer's address from a challenge and a signature produced by
/// [`sign_challenge`]. This is the verifier side of the scheme; the client
/// itself only needs it in tests, but a service stub does exactly this.
pub fn recover_address(message: &str, signature_hex: &str) -> VigilResult<Address> {
    let hex_body = signature_hex
        .strip_prefix("0x")
        .ok_or_else(|| VigilError::protocol("signature missing 0x prefix"))?;
    let bytes = hex::decode(hex_body)
        .map_err(|e| VigilError::protocol(format!("signature is not hex: {}", e)))?;
    if bytes.len() != 65 {
        return Err(VigilError::protocol(format!(
            "signature must be 65 bytes, got {}",
            bytes.len()
        )));
    }

    let recovery_id = RecoveryId::from_byte(bytes[64].wrapping_sub(RECOVERY_ID_OFFSET))
        .ok_or_else(|| VigilError::protocol("signature recovery byte out of range"))?;
    let signature = Signature::from_slice(&bytes[..64])
        .map_err(|e| VigilError::protocol(format!("invalid signature encoding: {}", e)))?;

    let key = VerifyingKey::recover_from_digest(challenge_digest(message), &signature, recovery_id)
        .map_err(|e| VigilError::protocol(format!("signature recovery failed: {}", e)))?;

    Ok(Address::from_verifying_key(&key))
}

/// Keccak digest of the length-prefixed challenge payload.
fn challenge_digest(message: &str) -> Keccak256 {
    let mut hasher = Keccak256::new();
    hasher.update(MESSAGE_PREFIX.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message.as_bytes());
    hasher
}
