use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::error::{VerdictError, VerdictResult};

type HmacSha256 = Hmac<Sha256>;

/// Algorithm tag prefixed onto every signature so the scheme can be rotated
/// without ambiguity about how an old record was signed.
pub const SIGNATURE_ALGORITHM: &str = "hmac-sha256";

/// Minimum accepted signing secret length in bytes.
pub const MIN_SECRET_LEN: usize = 16;

/// Keyed signer for audit records: HMAC-SHA-256 over canonical bytes.
///
/// The secret is read-only after construction and the signer is a pure
/// function of secret + bytes, so one instance can be shared by any number
/// of concurrent callers with no locking.
pub struct Signer {
    secret: Zeroizing<Vec<u8>>,
}

impl Signer {
    pub fn from_secret(secret: impl AsRef<[u8]>) -> VerdictResult<Self> {
        let secret = secret.as_ref();
        if secret.len() < MIN_SECRET_LEN {
            return Err(VerdictError::InvalidSecret(format!(
                "signing secret must be at least {} bytes, got {}",
                MIN_SECRET_LEN,
                secret.len()
            )));
        }
        Ok(Self {
            secret: Zeroizing::new(secret.to_vec()),
        })
    }

    /// Sign canonical bytes, producing `hmac-sha256:<lowercase hex>`.
    pub fn sign(&self, bytes: &[u8]) -> String {
        let digest = self.compute_digest(bytes);
        format!("{}:{}", SIGNATURE_ALGORITHM, hex::encode(digest))
    }

    /// Recompute and compare in constant time. A signature with an unknown
    /// algorithm tag or malformed hex verifies false rather than erroring:
    /// from the caller's point of view both are simply "not authentic".
    pub fn verify(&self, bytes: &[u8], signature: &str) -> bool {
        let encoded = match signature
            .strip_prefix(SIGNATURE_ALGORITHM)
            .and_then(|rest| rest.strip_prefix(':'))
        {
            Some(hex_part) => hex_part,
            None => return false,
        };
        let provided = match hex::decode(encoded) {
            Ok(decoded) => decoded,
            Err(_) => return false,
        };
        let expected = self.compute_digest(bytes);
        if provided.len() != expected.len() {
            return false;
        }
        expected.as_slice().ct_eq(provided.as_slice()).into()
    }

    fn compute_digest(&self, bytes: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC can accept any key length, validated secret is always valid");
        mac.update(bytes);
        mac.finalize().into_bytes().to_vec()
    }
}

/// One-way digest of raw submitted content. The ledger stores only this,
/// never the content itself.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
