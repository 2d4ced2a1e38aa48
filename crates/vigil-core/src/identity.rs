//! Operator identity: secp256k1 key material and its derived registry address.

use k256::ecdsa::{SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use sha3::{Digest, Keccak256};

use crate::error::{VigilError, VigilResult};
use crate::signer;

/// 20-byte account address derived from a secp256k1 public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    /// Derive the address for a public key: keccak-256 of the uncompressed
    /// point (without the SEC1 tag byte), last 20 bytes.
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);
        let digest = Keccak256::digest(&point.as_bytes()[1..]);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&digest.as_slice()[12..]);
        Address(bytes)
    }

    /// Raw address bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Render with the mixed-case checksum the registry expects: a hex digit
    /// is uppercased when the matching nibble of keccak-256 over the lowercase
    /// hex address is >= 8.
    pub fn to_checksum_string(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = Keccak256::digest(lower.as_bytes());
        let hash = hash.as_slice();

        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_checksum_string())
    }
}

/// Operator key pair. Owns the private scalar for the lifetime of one
/// invocation; never persisted by this crate.
pub struct Identity {
    signing_key: SigningKey,
    address: Address,
}

impl Identity {
    /// Parse a hex-encoded secp256k1 private key, with or without a `0x`
    /// prefix. Fails before any network I/O can happen.
    pub fn from_hex(hex_key: &str) -> VigilResult<Self> {
        let trimmed = hex_key.trim();
        let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);

        let bytes = hex::decode(trimmed)
            .map_err(|e| VigilError::key(format!("invalid hex private key: {}", e)))?;
        let signing_key = SigningKey::from_slice(&bytes)
            .map_err(|e| VigilError::key(format!("invalid secp256k1 private key: {}", e)))?;
        let address = Address::from_verifying_key(signing_key.verifying_key());

        Ok(Self {
            signing_key,
            address,
        })
    }

    /// The registry address derived from this key pair.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Sign a challenge string with this identity's private key.
    pub fn sign(&self, message: &str) -> VigilResult<String> {
        signer::sign_challenge(&self.signing_key, message)
    }
}

impl std::fmt::Debug for Identity {
    // Never print key material
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("address", &self.address.to_checksum_string())
            .finish_non_exhaustive()
    }
}
