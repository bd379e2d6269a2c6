//! Password hashing: PBKDF2-HMAC-SHA256 with a per-account random salt.

use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

const ALGORITHM: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Stored form of a password. Plaintext is never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialHash {
    pub algorithm: String,
    pub iterations: u32,
    /// Hex-encoded salt.
    pub salt: String,
    /// Hex-encoded derived key.
    pub hash: String,
}

impl CredentialHash {
    /// Hash `password` under a fresh random salt.
    pub fn derive(password: &str, iterations: u32) -> Self {
        let salt: [u8; SALT_LEN] = rand::random();
        Self::with_salt(password, &salt, iterations)
    }

    pub fn with_salt(password: &str, salt: &[u8], iterations: u32) -> Self {
        let iterations = iterations.max(1);
        Self {
            algorithm: ALGORITHM.to_string(),
            iterations,
            salt: hex::encode(salt),
            hash: hex::encode(derive_key(password.as_bytes(), salt, iterations)),
        }
    }

    /// Recompute with the stored salt and iteration count and compare in
    /// constant time. Malformed records never verify.
    pub fn verify(&self, password: &str) -> bool {
        if self.algorithm != ALGORITHM {
            return false;
        }
        let (Ok(salt), Ok(expected)) = (hex::decode(&self.salt), hex::decode(&self.hash)) else {
            return false;
        };
        let actual = derive_key(password.as_bytes(), &salt, self.iterations.max(1));
        actual[..].ct_eq(&expected[..]).into()
    }
}

fn derive_key(password: &[u8], salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut key);
    key
}
